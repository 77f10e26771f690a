//! Error types for the mull CLI.

use mull_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Failures raised by the command layer itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("errors on {failed} of {total} matters")]
    BatchFailed { failed: usize, total: usize },
}

impl CliError {
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::BatchFailed { .. } => "batch_failed",
        }
    }
}

/// JSON written to stderr when a command fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: &'static str,
}

impl ErrorPayload {
    /// The kind comes from the first store or CLI error in the chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let kind = err
            .chain()
            .find_map(|cause| {
                cause
                    .downcast_ref::<StoreError>()
                    .map(StoreError::kind)
                    .or_else(|| cause.downcast_ref::<CliError>().map(CliError::kind))
            })
            .unwrap_or("error");

        Self {
            error: format!("{err:#}"),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_payload_from_store_error() {
        let err = anyhow::Error::new(StoreError::not_found("ab12"));
        let payload = ErrorPayload::from_error(&err);
        assert_eq!(payload.kind, "not_found");
        assert_eq!(payload.error, "matter not found: ab12");
    }

    #[test]
    fn test_payload_keeps_context() {
        let result: Result<(), StoreError> = Err(StoreError::not_found("zzzz"));
        let err = result
            .context("matter ab12 created but link failed")
            .unwrap_err();
        let payload = ErrorPayload::from_error(&err);
        assert_eq!(payload.kind, "not_found");
        assert_eq!(
            payload.error,
            "matter ab12 created but link failed: matter not found: zzzz"
        );
    }

    #[test]
    fn test_payload_batch_failed() {
        let err = anyhow::Error::new(CliError::BatchFailed { failed: 1, total: 2 });
        let payload = ErrorPayload::from_error(&err);
        assert_eq!(payload.kind, "batch_failed");
        assert_eq!(payload.error, "errors on 1 of 2 matters");
    }

    #[test]
    fn test_payload_unknown_error() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(ErrorPayload::from_error(&err).kind, "error");
    }
}
