//! Filtering and full-text search over matters

use crate::error::Result;
use crate::matter::{Matter, Status};
use crate::repository::MatterStore;

/// Equality filters for [`MatterStore::list`]; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatterFilter {
    pub status: Option<Status>,
    pub tag: Option<String>,
    pub effort: Option<String>,
    pub epic: Option<String>,
}

impl MatterFilter {
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_effort(mut self, effort: impl Into<String>) -> Self {
        self.effort = Some(effort.into());
        self
    }

    pub fn with_epic(mut self, epic: impl Into<String>) -> Self {
        self.epic = Some(epic.into());
        self
    }

    pub fn matches(&self, matter: &Matter) -> bool {
        if self.status.is_some_and(|s| s != matter.status) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !matter.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(effort) = &self.effort {
            if matter.effort.as_ref() != Some(effort) {
                return false;
            }
        }
        if let Some(epic) = &self.epic {
            if matter.epic.as_ref() != Some(epic) {
                return false;
            }
        }
        true
    }
}

impl MatterStore {
    /// Case-insensitive substring match over title and body
    pub fn search(&self, query: &str) -> Result<Vec<Matter>> {
        let needle = query.to_lowercase();
        let matters = self.list(&MatterFilter::default())?;
        Ok(matters
            .into_iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&needle) || m.body.to_lowercase().contains(&needle)
            })
            .collect())
    }
}
