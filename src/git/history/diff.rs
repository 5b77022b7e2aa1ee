use git2::{Delta, DiffDelta, DiffFindOptions, DiffOptions};
use tracing::debug;

use crate::git::error::SyncError;
use crate::git::repository::core::GitRepo;
use crate::git::types::{Change, Commit, TreeDiff};

impl GitRepo {
    /// Changes introduced by `commit` relative to its first parent.
    ///
    /// Merge commits are only compared against their first parent; changes
    /// brought in from other parents are not reported.
    pub fn changes_in(&self, commit: &Commit) -> Result<TreeDiff, SyncError> {
        let raw = self.find_commit(commit)?;
        let parent = raw.parents().next().map(|parent| Commit::from_git2(&parent));
        self.diff_between(parent.as_ref(), commit)
    }

    /// Path-level differences between two snapshots. `from = None` compares
    /// against the empty tree, so every path of `to` is an [`Change::Add`].
    pub fn diff_between(&self, from: Option<&Commit>, to: &Commit) -> Result<TreeDiff, SyncError> {
        let from_tree = match from {
            Some(commit) => Some(self.find_commit(commit)?.tree()?),
            None => None,
        };
        let to_tree = self.find_commit(to)?.tree()?;

        let mut options = DiffOptions::new();
        options.include_typechange(true);
        let mut diff =
            self.repo()
                .diff_tree_to_tree(from_tree.as_ref(), Some(&to_tree), Some(&mut options))?;

        let mut find_options = DiffFindOptions::new();
        find_options.renames(true).copies(true);
        diff.find_similar(Some(&mut find_options))?;

        let changes: Vec<Change> = diff.deltas().filter_map(|delta| to_change(&delta)).collect();
        debug!(count = changes.len(), to = %to.short_id(), "computed tree diff");
        Ok(TreeDiff { changes })
    }
}

fn to_change(delta: &DiffDelta<'_>) -> Option<Change> {
    let old_path = delta
        .old_file()
        .path()
        .map(|path| path.to_string_lossy().into_owned());
    let new_path = delta
        .new_file()
        .path()
        .map(|path| path.to_string_lossy().into_owned());

    let change = match delta.status() {
        Delta::Added => Change::Add { path: new_path? },
        Delta::Deleted => Change::Delete { path: old_path? },
        Delta::Modified | Delta::Typechange => Change::Modify { path: old_path? },
        Delta::Renamed => Change::Rename {
            from: old_path?,
            to: new_path?,
        },
        Delta::Copied => Change::Copy {
            from: old_path?,
            to: new_path?,
        },
        // Tree-to-tree diffs never produce these
        Delta::Unmodified
        | Delta::Ignored
        | Delta::Untracked
        | Delta::Unreadable
        | Delta::Conflicted => return None,
    };
    Some(change)
}
