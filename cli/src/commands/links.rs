//! Link and unlink commands

use std::io::Write;

use anyhow::Result;
use mull_store::{MatterStore, RelationType};
use serde::Serialize;

use super::emit;
use crate::cli::LinkArgs;

#[derive(Serialize)]
struct LinkRecord<'a> {
    from: &'a str,
    #[serde(rename = "type")]
    rel: RelationType,
    to: &'a str,
}

pub fn link(store: &MatterStore, args: LinkArgs, out: &mut dyn Write) -> Result<()> {
    apply(store, &args, "linked", MatterStore::link, out)
}

pub fn unlink(store: &MatterStore, args: LinkArgs, out: &mut dyn Write) -> Result<()> {
    apply(store, &args, "unlinked", MatterStore::unlink, out)
}

/// Stops at the first failing target. A single target prints one record,
/// several print an array.
fn apply(
    store: &MatterStore,
    args: &LinkArgs,
    label: &str,
    op: fn(&MatterStore, &str, RelationType, &str) -> mull_store::Result<()>,
    out: &mut dyn Write,
) -> Result<()> {
    let rel: RelationType = args.rel.parse()?;

    let mut records = Vec::with_capacity(args.targets.len());
    for target in &args.targets {
        op(store, &args.id, rel, target)?;
        records.push(LinkRecord {
            from: &args.id,
            rel,
            to: target,
        });
    }

    let mut doc = serde_json::Map::new();
    let value = match records.as_slice() {
        [single] => serde_json::to_value(single)?,
        _ => serde_json::to_value(&records)?,
    };
    doc.insert(label.to_string(), value);
    emit(out, &doc)
}
