//! Read-mostly reports: epics, graph, doctor, prime and schema

use std::io::Write;

use anyhow::Result;
use mull_store::{Graph, MatterStore, Schema};

use super::emit;

pub fn epics(store: &MatterStore, all: bool, out: &mut dyn Write) -> Result<()> {
    emit(out, &store.epics(all)?)
}

pub fn graph(store: &MatterStore, id: Option<&str>, all: bool, out: &mut dyn Write) -> Result<()> {
    let graph = match id {
        Some(id) => Graph::around(store, id)?,
        None if all => Graph::all(store)?,
        None => Graph::docket(store)?,
    };
    emit(out, &graph)
}

pub fn doctor(store: &MatterStore, fix: bool, out: &mut dyn Write) -> Result<()> {
    let report = store.audit(fix)?;
    tracing::debug!(count = report.count, fixed = ?report.fixed, "doctor finished");
    emit(out, &report)
}

pub fn prime(store: &MatterStore, out: &mut dyn Write) -> Result<()> {
    emit(out, &store.overview()?)
}

pub fn schema(out: &mut dyn Write) -> Result<()> {
    emit(out, &Schema::current())
}
