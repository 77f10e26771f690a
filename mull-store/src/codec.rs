//! Matter file codec
//!
//! A matter file is a YAML front-matter block between `---` lines, a blank
//! line, a `# Title` heading and the markdown body:
//!
//! ```text
//! ---
//! status: planned
//! tags: [ui, feeds]
//! created: 2026-10-19
//! updated: 2026-10-19
//! relates: [3f1c]
//! priority: high
//! ---
//!
//! # Add an RSS feed
//!
//! Body text.
//! ```
//!
//! Keys the store does not understand are carried in [`Matter::extra`] and
//! written back after the known keys, in the order they were read.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::matter::{Matter, Stamp, Status};

const DELIMITER: &str = "---";

/// Errors raised while decoding a matter file
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The front-matter block is present but is not a YAML mapping
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// `status` holds a value outside the known set
    #[error("invalid status {0:?}")]
    InvalidStatus(String),

    /// The file is not UTF-8 text
    #[error("not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// A known key holds a value of the wrong shape
    #[error("invalid value for {0}")]
    InvalidField(String),
}

/// Decode a matter file. `id` and `filename` are left empty for the caller.
///
/// Text without a front-matter block decodes to a default matter. A block
/// that is present but unparseable is an error.
pub fn decode(text: &str) -> Result<Matter, DecodeError> {
    let mut matter = Matter::default();

    let Some((header, rest)) = split_front_matter(text) else {
        return Ok(matter);
    };

    let mapping = if header.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(header) {
            Ok(Value::Mapping(mapping)) => mapping,
            Ok(Value::Null) => Mapping::new(),
            Ok(_) => {
                return Err(DecodeError::MalformedMetadata(
                    "front matter is not a mapping".into(),
                ))
            }
            Err(e) => return Err(DecodeError::MalformedMetadata(e.to_string())),
        }
    };

    for (key, value) in mapping {
        let unknown = match &key {
            Value::String(name) => apply_known(&mut matter, name, value)?,
            _ => Some(value),
        };
        if let Some(value) = unknown {
            matter.extra.insert(key, value);
        }
    }

    let (title, body) = split_heading(rest);
    matter.title = title;
    matter.body = body;
    Ok(matter)
}

/// Encode a matter in its on-disk form
pub fn encode(matter: &Matter) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');

    push_scalar(&mut out, "status", Some(matter.status.as_str()));
    push_list(&mut out, "tags", &matter.tags);
    push_scalar(&mut out, "effort", matter.effort.as_deref());
    push_stamp(&mut out, "created", matter.created.as_ref());
    push_stamp(&mut out, "updated", matter.updated.as_ref());
    push_scalar(&mut out, "plan", matter.plan.as_deref());
    push_scalar(&mut out, "epic", matter.epic.as_deref());
    push_list(&mut out, "relates", &matter.relates);
    push_list(&mut out, "blocks", &matter.blocks);
    push_list(&mut out, "needs", &matter.needs);
    push_scalar(&mut out, "parent", matter.parent.as_deref());

    if !matter.extra.is_empty() {
        match serde_yaml::to_string(&matter.extra) {
            Ok(extra) => out.push_str(&extra),
            Err(e) => log::warn!("dropping unserializable extra metadata: {}", e),
        }
    }

    out.push_str(DELIMITER);
    out.push_str("\n\n# ");
    out.push_str(&matter.title);
    out.push('\n');
    if !matter.body.is_empty() {
        out.push('\n');
        out.push_str(&matter.body);
        out.push('\n');
    }
    out
}

/// Split `---\n<yaml>\n---\n<rest>`; `None` when the text has no block
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let after_open = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &after_open[..offset];
            let rest = &after_open[offset + line.len()..];
            return Some((header, rest));
        }
        offset += line.len();
    }
    None
}

/// Title from a leading `# ` heading, body is the remainder without
/// surrounding blank lines. A bare `#` line is a heading with an empty title.
fn split_heading(rest: &str) -> (String, String) {
    let content = skip_blank_lines(rest);
    let (first, remainder) = content.split_once('\n').unwrap_or((content, ""));
    let first = first.trim_end();
    let title = if first == "#" {
        Some("")
    } else {
        first.strip_prefix("# ")
    };
    match title {
        Some(title) => (title.to_string(), trim_blank_lines(remainder).to_string()),
        None => (String::new(), trim_blank_lines(content).to_string()),
    }
}

fn skip_blank_lines(text: &str) -> &str {
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    &text[start..]
}

fn trim_blank_lines(text: &str) -> &str {
    skip_blank_lines(text).trim_end()
}

/// Set a known key on `matter`; unknown keys hand their value back
fn apply_known(
    matter: &mut Matter,
    key: &str,
    value: Value,
) -> Result<Option<Value>, DecodeError> {
    match key {
        "status" => {
            let raw = scalar(key, &value)?.unwrap_or_default();
            matter.status = raw
                .parse::<Status>()
                .map_err(|_| DecodeError::InvalidStatus(raw))?;
        }
        "tags" => matter.tags = list(key, value)?,
        "relates" => matter.relates = list(key, value)?,
        "blocks" => matter.blocks = list(key, value)?,
        "needs" => matter.needs = list(key, value)?,
        "effort" => matter.effort = scalar(key, &value)?,
        "plan" => matter.plan = scalar(key, &value)?,
        "epic" => matter.epic = scalar(key, &value)?,
        "parent" => matter.parent = scalar(key, &value)?,
        "created" => matter.created = stamp(key, &value)?,
        "updated" => matter.updated = stamp(key, &value)?,
        _ => return Ok(Some(value)),
    }
    Ok(None)
}

fn scalar(key: &str, value: &Value) -> Result<Option<String>, DecodeError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => return scalar(key, &tagged.value),
        _ => return Err(DecodeError::InvalidField(key.to_string())),
    };
    Ok(Some(text).filter(|s| !s.is_empty()))
}

fn list(key: &str, value: Value) -> Result<Vec<String>, DecodeError> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| scalar(key, item).transpose())
            .collect(),
        other => Ok(scalar(key, &other)?.into_iter().collect()),
    }
}

fn stamp(key: &str, value: &Value) -> Result<Option<Stamp>, DecodeError> {
    Ok(scalar(key, value)?.map(|raw| Stamp::parse(&raw)))
}

fn push_scalar(out: &mut String, key: &str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return;
    };
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&quote(value));
    out.push('\n');
}

fn push_stamp(out: &mut String, key: &str, value: Option<&Stamp>) {
    if let Some(stamp) = value {
        push_scalar(out, key, Some(&stamp.to_string()));
    }
}

/// Lists are written in flow style: `key: [a, b]`
fn push_list(out: &mut String, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    out.push_str(key);
    out.push_str(": [");
    out.push_str(&items.join(", "));
    out.push_str("]\n");
}

/// Plain scalar when YAML reads it back as the same string, else a
/// double-quoted scalar (JSON string syntax is valid YAML)
fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric())
        && value == value.trim()
        && value.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '/' | '+' | '(' | ')')
        })
        && matches!(serde_yaml::from_str::<Value>(value), Ok(Value::String(ref s)) if s == value);

    if plain {
        value.to_string()
    } else {
        serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<Stamp> {
        NaiveDate::from_ymd_opt(y, m, d).map(Stamp::Date)
    }

    fn sample() -> Matter {
        let mut extra = Mapping::new();
        extra.insert("priority".into(), "high".into());
        extra.insert(
            "owners".into(),
            Value::Sequence(vec!["ana".into(), "li".into()]),
        );
        Matter {
            title: "Add an RSS feed".into(),
            status: Status::Planned,
            created: date(2026, 10, 1),
            updated: date(2026, 10, 19),
            tags: vec!["feeds".into(), "ui work".into()],
            effort: Some("small".into()),
            plan: Some("Render items: title, link".into()),
            epic: Some("syndication".into()),
            relates: vec!["3f1c".into()],
            blocks: vec!["0a9b".into(), "77e2".into()],
            needs: vec![],
            parent: Some("c0de".into()),
            extra,
            body: "First paragraph.\n\n    indented code".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let matter = sample();
        let decoded = decode(&encode(&matter)).unwrap();
        assert_eq!(decoded, matter);
    }

    #[test]
    fn test_encode_key_order() {
        let text = encode(&sample());
        let keys: Vec<&str> = text
            .lines()
            .skip(1)
            .take_while(|l| *l != "---")
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(
            keys,
            vec![
                "status", "tags", "effort", "created", "updated", "plan", "epic", "relates",
                "blocks", "parent", "priority", "owners"
            ]
        );
    }

    #[test]
    fn test_encode_flow_lists_and_omits_empty() {
        let text = encode(&sample());
        assert!(text.contains("tags: [feeds, ui work]\n"));
        assert!(text.contains("blocks: [0a9b, 77e2]\n"));
        assert!(!text.contains("needs"));
        assert!(text.contains("created: 2026-10-01\n"));
        assert!(text.ends_with("\n# Add an RSS feed\n\nFirst paragraph.\n\n    indented code\n"));
    }

    #[test]
    fn test_encode_without_body() {
        let matter = Matter {
            title: "Dark mode".into(),
            ..Default::default()
        };
        assert_eq!(encode(&matter), "---\nstatus: raw\n---\n\n# Dark mode\n");
    }

    #[test]
    fn test_quotes_ambiguous_scalars() {
        let matter = Matter {
            effort: Some("3".into()),
            epic: Some("true".into()),
            plan: Some("step one: two\nstep three".into()),
            tags: vec!["a,b".into(), "[x]".into()],
            ..Default::default()
        };
        let text = encode(&matter);
        assert!(text.contains("effort: \"3\"\n"));
        assert!(text.contains("epic: \"true\"\n"));
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.effort.as_deref(), Some("3"));
        assert_eq!(decoded.epic.as_deref(), Some("true"));
        assert_eq!(decoded.plan.as_deref(), Some("step one: two\nstep three"));
        assert_eq!(decoded.tags, vec!["a,b", "[x]"]);
    }

    #[test]
    fn test_decode_hand_written_file() {
        let text = "---\nstatus: refined\ntags:\n  - api\n  - auth\nreviewer: sam\nestimate: 3\ncreated: 2026-01-02\n---\n\n# Token refresh\n\nRefresh tokens before expiry.\n";
        let matter = decode(text).unwrap();
        assert_eq!(matter.status, Status::Refined);
        assert_eq!(matter.tags, vec!["api", "auth"]);
        assert_eq!(matter.title, "Token refresh");
        assert_eq!(matter.body, "Refresh tokens before expiry.");
        assert_eq!(matter.created, date(2026, 1, 2));
        assert_eq!(matter.extra.get("reviewer"), Some(&Value::from("sam")));
        assert_eq!(matter.extra.get("estimate"), Some(&Value::from(3)));

        // unknown keys survive a read-then-write cycle
        let again = decode(&encode(&matter)).unwrap();
        assert_eq!(again.extra, matter.extra);
        let keys: Vec<_> = again.extra.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Value::from("reviewer"), Value::from("estimate")]);
    }

    #[test]
    fn test_decode_without_front_matter() {
        let matter = decode("# Just a heading\n\nSome text\n").unwrap();
        assert_eq!(matter, Matter::default());
    }

    #[test]
    fn test_decode_without_heading() {
        let matter = decode("---\nstatus: raw\n---\n\nLoose notes\n").unwrap();
        assert_eq!(matter.title, "");
        assert_eq!(matter.body, "Loose notes");
    }

    #[test]
    fn test_decode_empty_block() {
        let matter = decode("---\n---\n\n# Empty\n").unwrap();
        assert_eq!(matter.title, "Empty");
        assert_eq!(matter.status, Status::Raw);
    }

    #[test]
    fn test_decode_malformed_metadata() {
        let err = decode("---\nstatus: [unclosed\n---\n\n# X\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));

        let err = decode("---\n- just\n- a list\n---\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMetadata(_)));
    }

    #[test]
    fn test_round_trip_empty_title() {
        let matter = Matter::default();
        let text = encode(&matter);
        assert_eq!(text, "---\nstatus: raw\n---\n\n# \n");
        assert_eq!(decode(&text).unwrap(), matter);

        let with_body = Matter {
            body: "Only a body".into(),
            ..Default::default()
        };
        assert_eq!(decode(&encode(&with_body)).unwrap(), with_body);
    }

    #[test]
    fn test_decode_bare_hash_heading() {
        let matter = decode("---\nstatus: raw\n---\n\n#\n\nNotes\n").unwrap();
        assert_eq!(matter.title, "");
        assert_eq!(matter.body, "Notes");

        // a hashtag-style line is body text, not a heading
        let matter = decode("---\nstatus: raw\n---\n\n#tag\n").unwrap();
        assert_eq!(matter.title, "");
        assert_eq!(matter.body, "#tag");
    }

    #[test]
    fn test_decode_invalid_status() {
        assert!(matches!(
            decode("---\nstatus: wip\n---\n"),
            Err(DecodeError::InvalidStatus(s)) if s == "wip"
        ));
    }

    #[test]
    fn test_decode_keeps_non_date_stamps() {
        let text = "---\nstatus: raw\ncreated: 2026-01-02T10:00:00Z\nupdated: yesterday\n---\n\n# Imported\n";
        let matter = decode(text).unwrap();
        assert_eq!(matter.created, Some(Stamp::Text("2026-01-02T10:00:00Z".into())));
        assert_eq!(matter.updated, Some(Stamp::Text("yesterday".into())));
        assert_eq!(matter.title, "Imported");

        let again = decode(&encode(&matter)).unwrap();
        assert_eq!(again, matter);
    }

    #[test]
    fn test_decode_trims_blank_lines_only() {
        let matter = decode("---\nstatus: raw\n---\n\n# T\n\n\n  indented first\nlast\n\n\n").unwrap();
        assert_eq!(matter.body, "  indented first\nlast");
    }
}
