use git2::{Index, MergeOptions};
use tracing::{debug, warn};

use crate::git::error::SyncError;
use crate::git::repository::core::GitRepo;
use crate::git::types::{Commit, MergeConflict};

impl GitRepo {
    /// Paths that would conflict when merging `candidate` into the current
    /// branch.
    ///
    /// The three-way merge runs entirely in memory; the working tree, index
    /// and refs are left untouched. Without a head commit there is nothing
    /// to conflict with.
    pub fn merge_conflicts(&self, candidate: &Commit) -> Result<Vec<MergeConflict>, SyncError> {
        let head = match self.head_commit(None)? {
            Some(head) => head,
            None => return Ok(Vec::new()),
        };

        let ours = self.find_commit(&head)?;
        let theirs = self.find_commit(candidate)?;

        let index = self
            .repo()
            .merge_commits(&ours, &theirs, Some(&MergeOptions::new()))?;

        if !index.has_conflicts() {
            debug!(head = %head.short_id(), candidate = %candidate.short_id(), "merge is clean");
            return Ok(Vec::new());
        }

        let conflicts = conflicting_paths(&index)?;
        if conflicts.is_empty() {
            return Err(SyncError::UnmergeableWithoutConflicts {
                ours: head.id,
                theirs: candidate.id.clone(),
            });
        }

        warn!(count = conflicts.len(), candidate = %candidate.short_id(), "merge has conflicts");
        Ok(conflicts)
    }
}

/// Sorted, de-duplicated paths of every conflict entry in `index`.
pub(crate) fn conflicting_paths(index: &Index) -> Result<Vec<MergeConflict>, SyncError> {
    let mut conflicts = Vec::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        let entry = conflict
            .our
            .as_ref()
            .or(conflict.their.as_ref())
            .or(conflict.ancestor.as_ref());
        if let Some(entry) = entry {
            conflicts.push(MergeConflict::new(
                String::from_utf8_lossy(&entry.path).into_owned(),
            ));
        }
    }

    conflicts.sort();
    conflicts.dedup();
    Ok(conflicts)
}
