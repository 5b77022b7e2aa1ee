//! Git synchronization engine
//!
//! This module is organised by concern, all as `impl GitRepo` blocks:
//!
//! - `repository`: Opening the on-disk repository, identity, process lock
//! - `commits`: Staging every change and committing it
//! - `history`: Branch tips, first-parent walks, merge bases, tree diffs
//! - `merge`: In-memory conflict detection and merge strategies
//! - `rebase`: Replaying local history onto a remote tip
//! - `remotes`: The single SSH remote, fetch, push and the sync round

pub mod commits;
pub mod error;
pub mod history;
pub mod merge;
pub mod rebase;
pub mod remotes;
pub mod repository;
pub mod types;

// Re-export the main types
pub use error::{ErrorKind, SyncError};
pub use merge::strategy::MergeStrategy;
pub use repository::core::GitRepo;
pub use repository::lock::{LockError, RepoLock};
pub use types::{
    Author, Branch, Change, Commit, FetchResult, MergeConflict, PullResult, PushResult,
    RebaseResult, RebaseState, Remote, SshPrivateKey, SyncResult, SyncStage, TreeDiff,
    UtcTimestamp,
};
