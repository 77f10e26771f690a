//! Docket: the manually ordered queue of matters
//!
//! Stored as one YAML sequence. Every operation loads the whole list,
//! edits it in memory and writes it back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// One queued matter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocketEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DocketEntry {
    pub fn new(id: impl Into<String>, note: Option<String>) -> Self {
        Self {
            id: id.into(),
            note: note.filter(|n| !n.is_empty()),
        }
    }
}

/// Handle on a docket file
#[derive(Debug, Clone)]
pub struct Docket {
    path: PathBuf,
}

impl Docket {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entries; an absent or empty file is an empty docket
    pub fn load(&self) -> Result<Vec<DocketEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entries: Option<Vec<DocketEntry>> = serde_yaml::from_str(&text)?;
        Ok(entries.unwrap_or_default())
    }

    /// Replace the file with `entries`
    pub fn save(&self, entries: &[DocketEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = if entries.is_empty() {
            "[]\n".to_string()
        } else {
            serde_yaml::to_string(entries)?
        };
        log::debug!("writing docket with {} entries", entries.len());
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Alias for [`Self::load`]
    pub fn entries(&self) -> Result<Vec<DocketEntry>> {
        self.load()
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(position(&self.load()?, id).is_some())
    }

    /// Queue `id`, appended or directly after `after`
    pub fn add(&self, id: &str, after: Option<&str>, note: Option<String>) -> Result<()> {
        let mut entries = self.load()?;
        if position(&entries, id).is_some() {
            return Err(StoreError::duplicate(id));
        }

        let entry = DocketEntry::new(id, note);
        match after.filter(|a| !a.is_empty()) {
            None => entries.push(entry),
            Some(after) => {
                let idx = position(&entries, after)
                    .ok_or_else(|| StoreError::after_id_not_found(after))?;
                entries.insert(idx + 1, entry);
            }
        }
        self.save(&entries)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let mut entries = self.load()?;
        let idx = position(&entries, id).ok_or_else(|| StoreError::NotInDocket(id.to_string()))?;
        entries.remove(idx);
        self.save(&entries)
    }

    /// Move `id` to directly after `after`. The anchor is located once
    /// `id` has been taken out, so moving an entry after itself fails
    /// without touching the file.
    pub fn move_after(&self, id: &str, after: &str) -> Result<()> {
        let mut entries = self.load()?;
        let idx = position(&entries, id).ok_or_else(|| StoreError::NotInDocket(id.to_string()))?;
        let entry = entries.remove(idx);

        let anchor =
            position(&entries, after).ok_or_else(|| StoreError::after_id_not_found(after))?;
        entries.insert(anchor + 1, entry);
        self.save(&entries)
    }
}

fn position(entries: &[DocketEntry], id: &str) -> Option<usize> {
    entries.iter().position(|e| e.id == id)
}
