//! Matter types and metadata builders
//!
//! Core types for representing matters and the metadata applied to them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Result, StoreError};

/// Lifecycle state of a matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Raw,
    Refined,
    Planned,
    Done,
    Dropped,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Raw,
        Status::Refined,
        Status::Planned,
        Status::Done,
        Status::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Refined => "refined",
            Self::Planned => "planned",
            Self::Done => "done",
            Self::Dropped => "dropped",
        }
    }

    /// Done and dropped matters are closed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Dropped)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StoreError::InvalidStatus(s.to_string()))
    }
}

/// Kind of link between two matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// Symmetric: both sides list each other
    Relates,
    /// A blocks B, mirrored as B needs A
    Blocks,
    /// A needs B, mirrored as B blocks A
    Needs,
    /// One-way, single-valued
    Parent,
}

impl RelationType {
    pub const ALL: [RelationType; 4] = [
        RelationType::Relates,
        RelationType::Blocks,
        RelationType::Needs,
        RelationType::Parent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relates => "relates",
            Self::Blocks => "blocks",
            Self::Needs => "needs",
            Self::Parent => "parent",
        }
    }

    /// The relation the counterpart must hold for this one to be reciprocated.
    /// `None` for `parent`, which is one-way.
    pub fn inverse(&self) -> Option<RelationType> {
        match self {
            Self::Relates => Some(Self::Relates),
            Self::Blocks => Some(Self::Needs),
            Self::Needs => Some(Self::Blocks),
            Self::Parent => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relates" => Ok(Self::Relates),
            "blocks" => Ok(Self::Blocks),
            "needs" => Ok(Self::Needs),
            "parent" => Ok(Self::Parent),
            other => Err(StoreError::InvalidRelationType(other.to_string())),
        }
    }
}

/// Today's date in local time, the granularity of `created`/`updated`
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Format of dates the store writes itself
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A `created`/`updated` value.
///
/// Hand-edited files may carry timestamps or other text there; anything
/// that is not a plain `YYYY-MM-DD` date is kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stamp {
    Date(NaiveDate),
    Text(String),
}

impl Stamp {
    pub fn parse(raw: &str) -> Self {
        match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => Self::Date(date),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Text(_) => None,
        }
    }
}

impl From<NaiveDate> for Stamp {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A single trackable work item, stored as one file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matter {
    /// Short hex identifier, the filename prefix
    pub id: String,
    /// File name inside the matters directory
    #[serde(rename = "file")]
    pub filename: String,
    pub title: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Stamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<Stamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Unrecognized metadata, kept verbatim and in file order
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl Matter {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Bump `updated` to today
    pub fn touch(&mut self) {
        self.updated = Some(today().into());
    }

    /// Targets of one relation; `parent` yields zero or one id
    pub fn relation(&self, rel: RelationType) -> &[String] {
        match rel {
            RelationType::Relates => &self.relates,
            RelationType::Blocks => &self.blocks,
            RelationType::Needs => &self.needs,
            RelationType::Parent => self.parent.as_slice(),
        }
    }

    pub(crate) fn relation_mut(&mut self, rel: RelationType) -> Option<&mut Vec<String>> {
        match rel {
            RelationType::Relates => Some(&mut self.relates),
            RelationType::Blocks => Some(&mut self.blocks),
            RelationType::Needs => Some(&mut self.needs),
            RelationType::Parent => None,
        }
    }

    /// Every outgoing reference as (relation, target id)
    pub fn references(&self) -> impl Iterator<Item = (RelationType, &str)> + '_ {
        RelationType::ALL
            .into_iter()
            .flat_map(move |rel| self.relation(rel).iter().map(move |id| (rel, id.as_str())))
    }

    /// Drop every reference to `id`; true when anything changed
    pub fn strip_references(&mut self, id: &str) -> bool {
        let mut changed = false;
        for list in [&mut self.relates, &mut self.blocks, &mut self.needs] {
            let before = list.len();
            list.retain(|r| r != id);
            changed |= list.len() != before;
        }
        if self.parent.as_deref() == Some(id) {
            self.parent = None;
            changed = true;
        }
        changed
    }

    /// Apply one metadata key. Known keys are validated and typed;
    /// anything else lands in `extra`.
    pub fn apply_meta(&mut self, key: &str, value: &MetaValue) -> Result<()> {
        match key {
            "status" => self.status = value.as_text().parse()?,
            "effort" => self.effort = value.non_empty(),
            "plan" => self.plan = value.non_empty(),
            "epic" => self.epic = value.non_empty(),
            "parent" => self.parent = value.non_empty(),
            "tags" => self.tags = value.to_list(),
            "created" | "updated" | "relates" | "blocks" | "needs" => {
                return Err(StoreError::ReservedKey(key.to_string()));
            }
            _ => {
                self.extra
                    .insert(Value::String(key.to_string()), value.to_yaml());
            }
        }
        Ok(())
    }
}

/// A metadata value as supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }

    fn non_empty(&self) -> Option<String> {
        Some(self.as_text()).filter(|s| !s.is_empty())
    }

    /// Lists pass through; text is split on commas and trimmed
    fn to_list(&self) -> Vec<String> {
        let items: Vec<String> = match self {
            Self::List(items) => items.iter().map(|s| s.trim().to_string()).collect(),
            Self::Text(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
        };
        items.into_iter().filter(|s| !s.is_empty()).collect()
    }

    fn to_yaml(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Sequence(items.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Ordered set of metadata to apply when creating a matter
#[derive(Debug, Clone, Default)]
pub struct MatterMeta {
    entries: Vec<(String, MetaValue)>,
}

impl MatterMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary key
    pub fn set(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn status(self, status: Status) -> Self {
        self.set("status", status.as_str())
    }

    pub fn effort(self, effort: impl Into<String>) -> Self {
        self.set("effort", effort.into())
    }

    pub fn plan(self, plan: impl Into<String>) -> Self {
        self.set("plan", plan.into())
    }

    pub fn epic(self, epic: impl Into<String>) -> Self {
        self.set("epic", epic.into())
    }

    pub fn parent(self, parent: impl Into<String>) -> Self {
        self.set("parent", parent.into())
    }

    pub fn tags(self, tags: Vec<String>) -> Self {
        self.set("tags", tags)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("planned".parse::<Status>().unwrap(), Status::Planned);
        let err = "wip".parse::<Status>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidStatus(s) if s == "wip"));
    }

    #[test]
    fn test_stamp_parse() {
        let date = Stamp::parse("2026-01-02");
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2026, 1, 2));
        assert_eq!(date.to_string(), "2026-01-02");

        let text = Stamp::parse("2026-01-02T10:00:00Z");
        assert_eq!(text, Stamp::Text("2026-01-02T10:00:00Z".into()));
        assert_eq!(text.date(), None);
        assert_eq!(text.to_string(), "2026-01-02T10:00:00Z");
        assert_eq!(serde_json::to_value(&text).unwrap(), "2026-01-02T10:00:00Z");
        assert_eq!(serde_json::to_value(&date).unwrap(), "2026-01-02");
    }

    #[test]
    fn test_status_terminal() {
        assert!(Status::Done.is_terminal());
        assert!(Status::Dropped.is_terminal());
        assert!(!Status::Raw.is_terminal());
        assert!(!Status::Planned.is_terminal());
    }

    #[test]
    fn test_relation_type_parse() {
        assert_eq!("blocks".parse::<RelationType>().unwrap(), RelationType::Blocks);
        assert!(matches!(
            "invalid".parse::<RelationType>(),
            Err(StoreError::InvalidRelationType(_))
        ));
    }

    #[test]
    fn test_relation_inverse() {
        assert_eq!(RelationType::Blocks.inverse(), Some(RelationType::Needs));
        assert_eq!(RelationType::Needs.inverse(), Some(RelationType::Blocks));
        assert_eq!(RelationType::Relates.inverse(), Some(RelationType::Relates));
        assert_eq!(RelationType::Parent.inverse(), None);
    }

    #[test]
    fn test_apply_meta_tags_from_text() {
        let mut matter = Matter::default();
        matter.apply_meta("tags", &" ui , backend,, ".into()).unwrap();
        assert_eq!(matter.tags, vec!["ui", "backend"]);
    }

    #[test]
    fn test_apply_meta_unknown_goes_to_extra() {
        let mut matter = Matter::default();
        matter.apply_meta("priority", &"high".into()).unwrap();
        assert_eq!(
            matter.extra.get("priority"),
            Some(&Value::String("high".into()))
        );
    }

    #[test]
    fn test_apply_meta_empty_clears_optional() {
        let mut matter = Matter {
            effort: Some("small".into()),
            ..Default::default()
        };
        matter.apply_meta("effort", &"".into()).unwrap();
        assert_eq!(matter.effort, None);
    }

    #[test]
    fn test_apply_meta_invalid_status() {
        let mut matter = Matter::default();
        let err = matter.apply_meta("status", &"later".into()).unwrap_err();
        assert_eq!(err.kind(), "invalid_status");
        assert_eq!(matter.status, Status::Raw);
    }

    #[test]
    fn test_apply_meta_rejects_managed_keys() {
        let mut matter = Matter::default();
        for key in ["created", "updated", "relates", "blocks", "needs"] {
            let err = matter.apply_meta(key, &"x".into()).unwrap_err();
            assert_eq!(err.kind(), "reserved_key");
        }
        assert!(matter.extra.is_empty());
    }

    #[test]
    fn test_strip_references() {
        let mut matter = Matter {
            relates: vec!["aaaa".into(), "bbbb".into()],
            needs: vec!["aaaa".into()],
            parent: Some("aaaa".into()),
            ..Default::default()
        };
        assert!(matter.strip_references("aaaa"));
        assert_eq!(matter.relates, vec!["bbbb"]);
        assert!(matter.needs.is_empty());
        assert_eq!(matter.parent, None);
        assert!(!matter.strip_references("aaaa"));
    }

    #[test]
    fn test_references_lists_every_edge() {
        let matter = Matter {
            relates: vec!["r1".into()],
            blocks: vec!["b1".into(), "b2".into()],
            parent: Some("p1".into()),
            ..Default::default()
        };
        let refs: Vec<_> = matter.references().collect();
        assert_eq!(
            refs,
            vec![
                (RelationType::Relates, "r1"),
                (RelationType::Blocks, "b1"),
                (RelationType::Blocks, "b2"),
                (RelationType::Parent, "p1"),
            ]
        );
    }

    #[test]
    fn test_matter_json_omits_empty_fields() {
        let matter = Matter {
            id: "ab12".into(),
            filename: "ab12-x.md".into(),
            title: "X".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&matter).unwrap();
        assert_eq!(json["status"], "raw");
        assert_eq!(json["file"], "ab12-x.md");
        assert!(json.get("tags").is_none());
        assert!(json.get("extra").is_none());
    }
}
