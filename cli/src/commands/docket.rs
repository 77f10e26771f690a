//! Docket commands

use std::collections::HashSet;
use std::io::Write;

use anyhow::Result;
use mull_store::{MatterFilter, MatterStore, Status};
use serde::Serialize;
use serde_json::json;

use super::emit;
use crate::cli::{DocketAction, DocketArgs};

/// Docket entry joined with its matter, when the matter still exists
#[derive(Serialize)]
struct DocketRow {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    epic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

pub fn run(store: &MatterStore, args: DocketArgs, out: &mut dyn Write) -> Result<()> {
    let docket = store.docket();
    match args.action {
        Some(DocketAction::Add { id, after, note }) => {
            docket.add(&id, after.as_deref(), note)?;
            emit(out, &json!({ "status": "added", "id": id }))
        }
        Some(DocketAction::Rm { id }) => {
            docket.remove(&id)?;
            emit(out, &json!({ "status": "removed", "id": id }))
        }
        Some(DocketAction::Move { id, after }) => {
            docket.move_after(&id, &after)?;
            emit(out, &json!({ "status": "moved", "id": id }))
        }
        None if args.invert => undocketed(store, args.all, out),
        None => show(store, out),
    }
}

fn show(store: &MatterStore, out: &mut dyn Write) -> Result<()> {
    let mut rows = Vec::new();
    for entry in store.docket().load()? {
        let matter = store.get(&entry.id).ok();
        rows.push(DocketRow {
            title: matter.as_ref().map(|m| m.title.clone()),
            status: matter.as_ref().map(|m| m.status),
            epic: matter.and_then(|m| m.epic),
            id: entry.id,
            note: entry.note,
        });
    }
    emit(out, &rows)
}

/// Matters not on the docket, open ones only unless `all`
fn undocketed(store: &MatterStore, all: bool, out: &mut dyn Write) -> Result<()> {
    let queued: HashSet<String> = store.docket().load()?.into_iter().map(|e| e.id).collect();
    let matters: Vec<_> = store
        .list(&MatterFilter::default())?
        .into_iter()
        .filter(|m| all || !m.is_terminal())
        .filter(|m| !queued.contains(&m.id))
        .collect();
    emit(out, &matters)
}
