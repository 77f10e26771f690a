//! Store configuration
//!
//! Where a store lives on disk and how identifiers are minted.

use std::path::{Path, PathBuf};

/// Name of the store directory created inside a project
pub const STORE_DIR: &str = ".mull";

/// Configuration for a [`crate::MatterStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store root, normally `<project>/.mull`
    pub root: PathBuf,
    /// Directory under `root` holding one file per matter
    pub matters_dir: String,
    /// Matter file extension, without the dot
    pub extension: String,
    /// Docket file under `root`
    pub docket_file: String,
    /// Identifier width in hex characters; values outside 1..=64 are clamped
    pub id_width: usize,
    /// Identifier candidates tried before giving up
    pub max_id_attempts: usize,
}

impl StoreConfig {
    /// Defaults for a store inside `project_dir`
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self::at_root(project_dir.as_ref().join(STORE_DIR))
    }

    /// Defaults for a store rooted exactly at `root`
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            matters_dir: "matters".to_string(),
            extension: "md".to_string(),
            docket_file: "docket.yml".to_string(),
            id_width: 4,
            max_id_attempts: 100,
        }
    }

    pub fn with_id_width(mut self, width: usize) -> Self {
        self.id_width = width.clamp(1, 64);
        self
    }

    pub fn with_max_id_attempts(mut self, attempts: usize) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_docket_file(mut self, name: impl Into<String>) -> Self {
        self.docket_file = name.into();
        self
    }

    pub fn matters_path(&self) -> PathBuf {
        self.root.join(&self.matters_dir)
    }

    pub fn docket_path(&self) -> PathBuf {
        self.root.join(&self.docket_file)
    }
}
