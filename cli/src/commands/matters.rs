//! Matter CRUD commands

use std::io::Write;

use anyhow::{Context, Result};
use mull_store::{MatterFilter, MatterMeta, MatterStore, RelationType, Status, StoreError};
use serde::Serialize;
use serde_json::json;

use super::emit;
use crate::cli::{AddArgs, ListArgs};
use crate::error::CliError;

pub fn add(store: &MatterStore, args: AddArgs, out: &mut dyn Write) -> Result<()> {
    let mut meta = MatterMeta::new();
    if !args.tags.is_empty() {
        meta = meta.tags(args.tags);
    }
    if let Some(status) = args.status {
        meta = meta.set("status", status);
    }
    if let Some(effort) = args.effort {
        meta = meta.effort(effort);
    }
    if let Some(epic) = args.epic {
        meta = meta.epic(epic);
    }
    if let Some(plan) = args.plan {
        meta = meta.plan(plan);
    }

    let mut matter = store.create(&args.title, &meta)?;
    let id = matter.id.clone();
    tracing::debug!(id = %id, "created matter");

    if let Some(body) = args.body.filter(|b| !b.is_empty()) {
        matter = store
            .append_body(&id, &body)
            .with_context(|| format!("matter {id} created but body failed"))?;
    }

    let links = [
        (RelationType::Relates, args.relates),
        (RelationType::Blocks, args.blocks),
        (RelationType::Needs, args.needs),
        (RelationType::Parent, args.parent.into_iter().collect()),
    ];
    let mut linked = false;
    for (rel, targets) in links {
        for target in targets {
            store
                .link(&id, rel, &target)
                .with_context(|| format!("matter {id} created but link failed"))?;
            linked = true;
        }
    }
    if linked {
        matter = store.get(&id)?;
    }

    if args.docket {
        store
            .docket()
            .add(&id, None, None)
            .with_context(|| format!("matter {id} created but docket add failed"))?;
    }

    emit(out, &matter)
}

pub fn show(store: &MatterStore, id: &str, md: bool, out: &mut dyn Write) -> Result<()> {
    if md {
        let raw = store.read_raw(id)?;
        out.write_all(raw.as_bytes())?;
        return Ok(());
    }
    emit(out, &store.get(id)?)
}

pub fn list(store: &MatterStore, args: ListArgs, out: &mut dyn Write) -> Result<()> {
    let filter = MatterFilter {
        status: args.status.map(|s| s.parse::<Status>()).transpose()?,
        tag: args.tag,
        effort: args.effort,
        epic: args.epic,
    };
    emit(out, &store.list(&filter)?)
}

pub fn search(store: &MatterStore, query: &str, out: &mut dyn Write) -> Result<()> {
    emit(out, &store.search(query)?)
}

/// Outcome for one id of a batch `set`
#[derive(Serialize)]
#[serde(untagged)]
enum SetResult {
    Updated(Box<mull_store::Matter>),
    Failed { id: String, error: String },
}

/// `set <id>... <key> <value>`: one id prints the matter, several print
/// a per-id result array and fail if any id failed.
pub fn set(store: &MatterStore, args: &[String], out: &mut dyn Write) -> Result<()> {
    let [ids @ .., key, value] = args else {
        anyhow::bail!("set needs at least one id, a key and a value");
    };
    if let [id] = ids {
        return emit(out, &store.update(id, key, value)?);
    }

    let mut results = Vec::with_capacity(ids.len());
    let mut failed = 0;
    for id in ids {
        match store.update(id, key, value) {
            Ok(matter) => results.push(SetResult::Updated(Box::new(matter))),
            Err(e) => {
                failed += 1;
                results.push(SetResult::Failed {
                    id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    emit(out, &results)?;

    if failed > 0 {
        return Err(CliError::BatchFailed {
            failed,
            total: ids.len(),
        }
        .into());
    }
    Ok(())
}

pub fn append(store: &MatterStore, id: &str, text: &str, out: &mut dyn Write) -> Result<()> {
    emit(out, &store.append_body(id, text)?)
}

pub fn remove(store: &MatterStore, id: &str, clean_refs: bool, out: &mut dyn Write) -> Result<()> {
    store.delete(id)?;
    if !clean_refs {
        return emit(out, &json!({ "deleted": id }));
    }
    let cleaned = store
        .remove_all_references(id)
        .with_context(|| format!("matter {id} deleted but reference cleanup failed"))?;
    emit(out, &json!({ "deleted": id, "cleaned": cleaned }))
}

pub fn plan(store: &MatterStore, id: &str, out: &mut dyn Write) -> Result<()> {
    emit(out, &store.update(id, "status", Status::Planned.as_str())?)
}

/// Terminal status shortcut; the matter also leaves the docket.
pub fn close(store: &MatterStore, id: &str, status: Status, out: &mut dyn Write) -> Result<()> {
    let matter = store.update(id, "status", status.as_str())?;
    match store.docket().remove(id) {
        Ok(()) => tracing::debug!(id, "removed from docket"),
        Err(StoreError::NotInDocket(_)) => {}
        Err(e) => return Err(e).context(format!("matter {id} is {status} but docket update failed")),
    }
    emit(out, &matter)
}
