//! Error taxonomy for the synchronization engine.
//!
//! Only misuse of the engine, broken collaborator contracts and unexpected
//! storage failures are errors. Expected outcomes such as network failures,
//! merge conflicts or an already up-to-date remote are reported through the
//! result enums in [`crate::git::types`] instead.

use thiserror::Error;

/// Broad category of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller used the engine in a way it does not support.
    Precondition,
    /// A collaborator (libgit2 or the caller's own state) broke its contract.
    InternalConsistency,
    /// An expected condition the caller should branch on.
    Operational,
    /// Unexpected failure of the underlying object store.
    Storage,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("multiple remotes aren't supported: '{existing}' already exists, refusing to add '{requested}'")]
    MultipleRemotes { existing: String, requested: String },

    #[error("no remote has been configured")]
    NoRemote,

    #[error("HEAD is detached and isn't pointing to any branch")]
    DetachedHead,

    #[error("repository is corrupt and has no HEAD")]
    CorruptHead,

    #[error("expected exactly one push result, got {count}: {updates:?}")]
    UnexpectedPushResults { count: usize, updates: Vec<String> },

    #[error("a rebase is in progress; resolve or abort it first")]
    RebaseInProgress,

    #[error("no rebase is in progress")]
    NoRebaseInProgress,

    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("merge will fail despite having zero conflicts between {ours} and {theirs}")]
    UnmergeableWithoutConflicts { ours: String, theirs: String },

    #[error("commits ({from} and {to}) aren't in the same branch. Walked log: {log:?}")]
    AncestryViolation {
        from: String,
        to: String,
        log: Vec<String>,
    },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::MultipleRemotes { .. }
            | SyncError::NoRemote
            | SyncError::DetachedHead
            | SyncError::CorruptHead
            | SyncError::UnexpectedPushResults { .. }
            | SyncError::RebaseInProgress
            | SyncError::NoRebaseInProgress => ErrorKind::Precondition,
            SyncError::UnmergeableWithoutConflicts { .. } | SyncError::AncestryViolation { .. } => {
                ErrorKind::InternalConsistency
            }
            SyncError::NothingToCommit => ErrorKind::Operational,
            SyncError::Git(_) => ErrorKind::Storage,
        }
    }

    /// True for errors that must terminate the current operation and never be
    /// retried.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Precondition | ErrorKind::InternalConsistency
        )
    }
}
