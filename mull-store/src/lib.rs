//! Mull Matter Store
//!
//! Flat-file storage for small, cross-referenced work items ("matters").
//! Each matter is one markdown file with a YAML metadata block; together
//! the files behave like one relational graph without any central index.
//!
//! ## Features
//!
//! - **Plain files** - `<id>-<slug>.md`, readable and editable by hand
//! - **Bidirectional links** - `relates`, `blocks`/`needs` written on both sides, with rollback
//! - **Docket** - a manually ordered queue kept in its own small file
//! - **Doctor** - audit and repair drift between files
//!
//! ## Example
//!
//! ```ignore
//! use mull_store::{MatterMeta, MatterStore, RelationType, StoreConfig};
//!
//! let store = MatterStore::open(StoreConfig::new("."))?;
//! let feed = store.create("Add an RSS feed", &MatterMeta::new().effort("small"))?;
//! let dark = store.create("Dark mode", &MatterMeta::new())?;
//!
//! store.link(&feed.id, RelationType::Blocks, &dark.id)?;
//! store.docket().add(&feed.id, None, None)?;
//!
//! let report = store.audit(false)?;
//! assert!(report.is_clean());
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod docket;
pub mod doctor;
pub mod error;
pub mod graph;
mod links;
pub mod matter;
pub mod overview;
pub mod repository;
pub mod search;

// Re-exports for convenience
pub use backend::{Backend, FsBackend};
pub use codec::DecodeError;
pub use config::StoreConfig;
pub use docket::{Docket, DocketEntry};
pub use doctor::{AuditReport, Check, Issue};
pub use error::{Result, StoreError};
pub use graph::{Graph, GraphEdge, GraphNode};
pub use matter::{Matter, MatterMeta, MetaValue, RelationType, Stamp, Status};
pub use overview::{FieldSchema, Overview, OverviewEntry, Schema};
pub use repository::{slugify, EpicSummary, MatterStore};
pub use search::MatterFilter;
