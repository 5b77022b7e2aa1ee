//! Values that cross the synchronization boundary.
//!
//! Nothing in here borrows from a `git2::Repository`, so these can be sent
//! back to a UI thread once a blocking operation has finished.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Identity used for authoring commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A UTC instant with second precision, which is what git stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_seconds(seconds: i64) -> Option<Self> {
        Utc.timestamp_opt(seconds, 0).single().map(Self)
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    pub fn seconds(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for UtcTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// An immutable snapshot of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub parent_ids: Vec<String>,
    pub author: Author,
    /// When the commit was created, from the committer signature. A rebase
    /// keeps the author time of replayed commits but stamps a new committer
    /// time, so this is the instant that follows parent order.
    pub timestamp: UtcTimestamp,
    /// Original authoring instant, preserved across rebases.
    pub authored_at: UtcTimestamp,
    pub message: String,
    pub tree_id: String,
}

impl Commit {
    pub(crate) fn from_git2(commit: &git2::Commit<'_>) -> Self {
        let signature = commit.author();
        let instant = |time: git2::Time| {
            UtcTimestamp::from_seconds(time.seconds())
                .unwrap_or_else(|| UtcTimestamp(DateTime::default()))
        };

        Self {
            id: commit.id().to_string(),
            parent_ids: commit.parent_ids().map(|id| id.to_string()).collect(),
            author: Author {
                name: String::from_utf8_lossy(signature.name_bytes()).into_owned(),
                email: String::from_utf8_lossy(signature.email_bytes()).into_owned(),
            },
            timestamp: instant(commit.committer().when()),
            authored_at: instant(signature.when()),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            tree_id: commit.tree_id().to_string(),
        }
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }
}

/// A named branch that HEAD points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
}

impl Branch {
    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

/// A single path-level difference between two trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Change {
    Add { path: String },
    Modify { path: String },
    Delete { path: String },
    Rename { from: String, to: String },
    Copy { from: String, to: String },
}

impl Change {
    /// The path this change leaves behind in the newer tree, or the removed
    /// path for deletions.
    pub fn path(&self) -> &str {
        match self {
            Change::Add { path } | Change::Modify { path } | Change::Delete { path } => path,
            Change::Rename { to, .. } | Change::Copy { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDiff {
    pub changes: Vec<Change>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// A path that could not be merged automatically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MergeConflict {
    pub path: String,
}

impl MergeConflict {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RebaseResult {
    Success,
    /// The rebase is left in progress on disk.
    Stopped {
        conflicts: Vec<MergeConflict>,
        uncommitted_changes: Vec<String>,
    },
    Aborted {
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebaseState {
    Idle,
    Rebasing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    Success { received_objects: usize },
    Failure { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PullResult {
    Success,
    Stopped { conflicts: Vec<MergeConflict> },
    Failure { reason: String },
    Unsupported { feature: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushResult {
    Success,
    AlreadyUpToDate,
    Failure { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Fetch,
    Integrate,
    Push,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            SyncStage::Fetch => "fetch",
            SyncStage::Integrate => "integrate",
            SyncStage::Push => "push",
        };
        f.write_str(stage)
    }
}

/// Outcome of a full fetch, integrate and push round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncResult {
    Synced { push: PushResult },
    Conflicted { conflicts: Vec<MergeConflict> },
    Failure { stage: SyncStage, reason: String },
}

/// Private key material for the single SSH remote.
///
/// The key is handed to libgit2 from memory on every network call.
#[derive(Clone)]
pub struct SshPrivateKey {
    key: String,
}

impl SshPrivateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub(crate) fn expose(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for SshPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SshPrivateKey(<redacted>)")
    }
}
