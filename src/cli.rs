use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nsync")]
#[command(about = "Synchronize a notes folder through a git remote")]
pub struct Cli {
    /// Path to the notes repository (created if missing)
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Config file, defaults to notesync.json inside the .git directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Commit every change in the notes folder
    Commit {
        /// Commit message
        message: String,
        /// Create a commit even when nothing changed
        #[arg(long)]
        allow_empty: bool,
    },
    /// Download the remote state without touching local notes
    Fetch,
    /// Fetch and rebase local commits onto the remote
    Pull {
        /// Integrate with a merge instead of a rebase (not supported)
        #[arg(long)]
        merge: bool,
    },
    /// Push the current branch
    Push {
        /// Overwrite the remote branch
        #[arg(long)]
        force: bool,
    },
    /// Fetch, rebase and push in one go
    Sync {
        /// Stop on every conflict instead of keeping local edits
        #[arg(long)]
        manual: bool,
    },
    /// Show the note history, newest first
    Log,
    /// Show the changed paths of a commit, or between two commits
    Diff {
        /// Commit to inspect, or the older side when a second commit is given
        first: String,
        /// Newer side of the comparison
        second: Option<String>,
    },
    /// List paths that would conflict when integrating a commit
    Conflicts {
        /// Commit or ref, e.g. origin/master
        commit: String,
    },
    /// Configure the single remote
    Remote {
        /// Remote name, e.g. origin
        name: String,
        /// SSH URL of the remote
        url: String,
    },
    /// Abandon a stopped rebase and restore local history
    Abort,
}
