use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "invokeai-models")]
#[command(about = "Reconcile local model files with the InvokeAI database", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a snapshot of the InvokeAI database
    CreateSnapshot,

    /// List all available snapshots
    #[command(alias = "ls")]
    ListSnapshots,

    /// Delete one or more snapshots by name
    DeleteSnapshot {
        /// Snapshot names (see list-snapshots)
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// Restore a snapshot over the live database
    RestoreSnapshot {
        /// Snapshot name (see list-snapshots)
        name: String,
    },

    /// List local model files
    LocalModels {
        /// Show a detail block per model
        #[arg(short, long)]
        tree: bool,

        /// Bypass the cache and rescan
        #[arg(short, long)]
        refresh: bool,
    },

    /// List models in the database
    DatabaseModels {
        /// Bypass the cache and re-read the table
        #[arg(short, long)]
        refresh: bool,
    },

    /// Preview which database models are missing on disk
    Compare {
        /// Apply the sync plan after previewing it
        #[arg(long)]
        sync: bool,
    },

    /// Sync the database with local model files
    Sync {
        /// Compute and show the plan without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete database rows by model name
    DeleteModels {
        /// Model names as stored in the database
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,

        /// Show what would be deleted without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// Force-refresh both cached listings
    CacheUpdate,
}
