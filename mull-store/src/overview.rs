//! Whole-store summaries: the field schema and the open-matter overview

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::matter::{Matter, RelationType, Status};
use crate::repository::MatterStore;
use crate::search::MatterFilter;

/// Shape of one settable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<&'static str>,
}

impl FieldSchema {
    fn optional(kind: &'static str) -> Self {
        Self {
            required: false,
            kind,
            values: Vec::new(),
        }
    }
}

/// Valid statuses, fields and relationship types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub statuses: Vec<&'static str>,
    pub fields: BTreeMap<&'static str, FieldSchema>,
    pub links: Vec<&'static str>,
}

impl Schema {
    pub fn current() -> Self {
        let statuses: Vec<&'static str> = Status::ALL.iter().map(Status::as_str).collect();

        let mut fields = BTreeMap::new();
        fields.insert(
            "title",
            FieldSchema {
                required: true,
                ..FieldSchema::optional("string")
            },
        );
        fields.insert(
            "status",
            FieldSchema {
                required: true,
                kind: "enum",
                values: statuses.clone(),
            },
        );
        fields.insert("tags", FieldSchema::optional("string[]"));
        fields.insert("effort", FieldSchema::optional("string"));
        fields.insert("epic", FieldSchema::optional("string"));
        fields.insert("plan", FieldSchema::optional("string"));
        fields.insert("parent", FieldSchema::optional("id"));

        Self {
            statuses,
            fields,
            links: RelationType::ALL.iter().map(RelationType::as_str).collect(),
        }
    }
}

/// An open matter without its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewEntry {
    pub id: String,
    pub title: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl From<Matter> for OverviewEntry {
    fn from(matter: Matter) -> Self {
        Self {
            id: matter.id,
            title: matter.title,
            status: matter.status,
            tags: matter.tags,
            epic: matter.epic,
            relates: matter.relates,
            blocks: matter.blocks,
            needs: matter.needs,
            parent: matter.parent,
        }
    }
}

/// Compact picture of the open work: every non-terminal matter, the
/// docket order and counts by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub matters: Vec<OverviewEntry>,
    pub docket: Vec<String>,
    pub counts: BTreeMap<String, usize>,
}

impl MatterStore {
    pub fn overview(&self) -> Result<Overview> {
        let mut overview = Overview::default();
        for matter in self.list(&MatterFilter::default())? {
            if matter.is_terminal() {
                continue;
            }
            *overview
                .counts
                .entry(matter.status.to_string())
                .or_insert(0) += 1;
            overview.matters.push(matter.into());
        }
        overview.docket = self.docket().load()?.into_iter().map(|e| e.id).collect();
        Ok(overview)
    }
}
