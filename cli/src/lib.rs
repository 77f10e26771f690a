//! Mull command-line interface
//!
//! A thin JSON surface over `mull_store`: every command prints one JSON
//! document on stdout, and failures print `{"error", "kind"}` on stderr.

pub mod cli;
pub mod commands;
pub mod error;

use std::io::Write;

use mull_store::{MatterStore, StoreConfig};

pub use cli::{Cli, Command};
pub use error::{CliError, ErrorPayload};

/// Open the store under `cli.dir` and run the parsed command.
pub fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    // needs no store, so it must not create one
    if let Command::Schema = cli.command {
        return commands::report::schema(out);
    }
    let config = StoreConfig::new(&cli.dir);
    tracing::debug!("using store at {}", config.root.display());
    let store = MatterStore::open(config)?;
    commands::dispatch(&store, cli.command, out)
}
