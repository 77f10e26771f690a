//! Command handlers
//!
//! Each handler runs one command against the store and writes a single
//! JSON document to `out`.

pub mod docket;
pub mod links;
pub mod matters;
pub mod report;

use std::io::Write;

use anyhow::Result;
use mull_store::MatterStore;
use serde::Serialize;

use crate::cli::Command;

/// Route a parsed command to its handler.
pub fn dispatch(store: &MatterStore, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Add(args) => matters::add(store, args, out),
        Command::Show { id, md } => matters::show(store, &id, md, out),
        Command::List(args) => matters::list(store, args, out),
        Command::Search { query } => matters::search(store, &query, out),
        Command::Set { args } => matters::set(store, &args, out),
        Command::Append { id, text } => matters::append(store, &id, &text, out),
        Command::Rm { id, clean_refs } => matters::remove(store, &id, clean_refs, out),
        Command::Plan { id } => matters::plan(store, &id, out),
        Command::Done { id } => matters::close(store, &id, mull_store::Status::Done, out),
        Command::Drop { id } => matters::close(store, &id, mull_store::Status::Dropped, out),
        Command::Link(args) => links::link(store, args, out),
        Command::Unlink(args) => links::unlink(store, args, out),
        Command::Docket(args) => docket::run(store, args, out),
        Command::Epics { all } => report::epics(store, all, out),
        Command::Graph { id, all } => report::graph(store, id.as_deref(), all, out),
        Command::Doctor { fix } => report::doctor(store, fix, out),
        Command::Prime => report::prime(store, out),
        Command::Schema => report::schema(out),
    }
}

/// Write `value` as one line of compact JSON.
pub(crate) fn emit<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
