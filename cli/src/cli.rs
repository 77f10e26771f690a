//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mull")]
#[command(about = "Track ideas and features for solo projects. All output is JSON.")]
#[command(version)]
pub struct Cli {
    /// Project directory holding the .mull store
    #[arg(long, global = true, env = "MULL_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Log store activity to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new matter
    Add(AddArgs),

    /// Show a matter by ID
    Show {
        id: String,
        /// Print the stored markdown instead of JSON
        #[arg(long)]
        md: bool,
    },

    /// List matters with optional filters
    List(ListArgs),

    /// Full-text search across titles and bodies
    Search { query: String },

    /// Set a metadata field on one or more matters
    Set {
        /// One or more IDs followed by the key and the value
        #[arg(value_name = "ID... KEY VALUE", num_args = 3.., required = true)]
        args: Vec<String>,
    },

    /// Append text to a matter's body
    Append { id: String, text: String },

    /// Permanently delete a matter
    Rm {
        id: String,
        /// Also strip references to it from every other matter
        #[arg(long)]
        clean_refs: bool,
    },

    /// Create relationships: relates, blocks, needs or parent
    Link(LinkArgs),

    /// Remove relationships: relates, blocks, needs or parent
    Unlink(LinkArgs),

    /// Mark a matter as planned
    Plan { id: String },

    /// Mark a matter as done and take it off the docket
    Done { id: String },

    /// Mark a matter as dropped and take it off the docket
    Drop { id: String },

    /// Show or edit the prioritized work queue
    Docket(DocketArgs),

    /// List epics with matter counts by status
    Epics {
        /// Include done and dropped matters
        #[arg(long)]
        all: bool,
    },

    /// Show the dependency graph of the docket, every matter, or one matter
    Graph {
        id: Option<String>,
        /// Every matter instead of just the docket
        #[arg(long, short)]
        all: bool,
    },

    /// Check data integrity and report problems
    Doctor {
        /// Repair what can be repaired
        #[arg(long)]
        fix: bool,
    },

    /// Compact summary of open matters, the docket and counts by status
    Prime,

    /// Show valid fields, statuses and relationship types
    Schema,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub title: String,

    /// Tag (repeatable or comma-separated)
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Vec<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub effort: Option<String>,

    #[arg(long)]
    pub epic: Option<String>,

    #[arg(long)]
    pub plan: Option<String>,

    #[arg(long)]
    pub body: Option<String>,

    /// Matters this one relates to
    #[arg(long, value_delimiter = ',')]
    pub relates: Vec<String>,

    /// Matters this one blocks
    #[arg(long, value_delimiter = ',')]
    pub blocks: Vec<String>,

    /// Matters this one needs
    #[arg(long, value_delimiter = ',')]
    pub needs: Vec<String>,

    #[arg(long)]
    pub parent: Option<String>,

    /// Append the new matter to the docket
    #[arg(long)]
    pub docket: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long)]
    pub effort: Option<String>,

    #[arg(long)]
    pub epic: Option<String>,
}

#[derive(Debug, Args)]
pub struct LinkArgs {
    pub id: String,

    /// relates, blocks, needs or parent
    #[arg(value_name = "TYPE")]
    pub rel: String,

    #[arg(required = true)]
    pub targets: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DocketArgs {
    #[command(subcommand)]
    pub action: Option<DocketAction>,

    /// Show matters that are NOT on the docket
    #[arg(long)]
    pub invert: bool,

    /// With --invert, include done and dropped matters
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Subcommand)]
pub enum DocketAction {
    /// Add a matter to the docket
    Add {
        id: String,
        /// Insert after this ID instead of appending
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Remove a matter from the docket
    Rm { id: String },

    /// Move a matter to just after another
    Move {
        id: String,
        #[arg(long, required = true)]
        after: String,
    },
}
