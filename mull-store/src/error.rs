//! Error types for mull-store

use thiserror::Error;

use crate::codec::DecodeError;

/// Errors that can occur in the matter store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No matter file for this identifier
    #[error("matter not found: {0}")]
    NotFound(String),

    /// No docket entry for this identifier
    #[error("not in docket: {0}")]
    NotInDocket(String),

    /// Identifier already present where it must be unique
    #[error("already in docket: {0}")]
    DuplicateEntry(String),

    /// Positional anchor for a docket insert/move is missing
    #[error("after-id not found in docket: {0}")]
    AfterIdNotFound(String),

    /// Relationship type outside relates/blocks/needs/parent
    #[error("invalid relationship type: {0}")]
    InvalidRelationType(String),

    /// Status outside the five known values
    #[error("invalid status {0:?}: must be one of raw, refined, planned, done, dropped")]
    InvalidStatus(String),

    /// Key is maintained by the store and cannot be set directly
    #[error("{0} is managed by the store and cannot be set directly")]
    ReservedKey(String),

    /// A matter file exists but its metadata block cannot be read
    #[error("decoding {file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: DecodeError,
    },

    /// Second write of a two-file link failed; the first file was restored
    #[error("linking failed, rolled back {id}: {source}")]
    LinkingFailed {
        id: String,
        #[source]
        source: Box<StoreError>,
    },

    /// Every identifier candidate collided with an existing matter
    #[error("could not generate unique ID after {0} attempts")]
    IdExhausted(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a duplicate entry error
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateEntry(id.into())
    }

    /// Create a missing anchor error
    pub fn after_id_not_found(id: impl Into<String>) -> Self {
        Self::AfterIdNotFound(id.into())
    }

    /// Create a decode error for a named file
    pub fn decode(file: impl Into<String>, source: DecodeError) -> Self {
        Self::Decode {
            file: file.into(),
            source,
        }
    }

    /// Wrap the cause of a failed two-file write
    pub fn linking_failed(id: impl Into<String>, cause: StoreError) -> Self {
        Self::LinkingFailed {
            id: id.into(),
            source: Box::new(cause),
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::NotInDocket(_) => "not_found",
            Self::DuplicateEntry(_) => "duplicate_entry",
            Self::AfterIdNotFound(_) => "after_id_not_found",
            Self::InvalidRelationType(_) => "invalid_relation_type",
            Self::InvalidStatus(_) => "invalid_status",
            Self::ReservedKey(_) => "reserved_key",
            Self::Decode { .. } => "decode_error",
            Self::LinkingFailed { .. } => "linking_failed",
            Self::IdExhausted(_) => "id_exhausted",
            Self::Io(_) => "io",
            Self::Yaml(_) => "yaml",
            Self::Json(_) => "json",
        }
    }

    /// True for the `NotFound` kind, matter or docket
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NotInDocket(_))
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found("ab12");
        assert_eq!(err.to_string(), "matter not found: ab12");
        assert_eq!(err.kind(), "not_found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_linking_failed_names_cause() {
        let cause = StoreError::Io(std::io::Error::other("disk full"));
        let err = StoreError::linking_failed("ab12", cause);
        assert_eq!(err.kind(), "linking_failed");
        assert!(err.to_string().contains("rolled back ab12"));
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_kind() {
        let err = StoreError::decode(
            "ab12-x.md",
            DecodeError::MalformedMetadata("bad".into()),
        );
        assert_eq!(err.kind(), "decode_error");
        assert!(err.to_string().starts_with("decoding ab12-x.md"));
    }
}
