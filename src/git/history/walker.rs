use git2::{ErrorCode, Oid, Sort};
use tracing::debug;

use crate::git::error::SyncError;
use crate::git::repository::core::GitRepo;
use crate::git::types::Commit;

impl GitRepo {
    /// Tip of `branch`, or of the current branch when `None`.
    ///
    /// Short names are resolved the way git does, so `origin/master` works
    /// as well. An unborn branch has no tip and yields `None`.
    pub fn head_commit(&self, branch: Option<&str>) -> Result<Option<Commit>, SyncError> {
        let name = match branch {
            Some(name) => name.to_string(),
            None => self.current_branch()?.refname(),
        };

        let reference = match self.repo().resolve_reference_from_short_name(&name) {
            Ok(reference) => reference,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let commit = reference.peel_to_commit()?;
        Ok(Some(Commit::from_git2(&commit)))
    }

    /// Resolve a revision (full or abbreviated id, branch or tracking ref) to
    /// a commit. Unknown revisions yield `None`.
    pub fn resolve_commit(&self, revision: &str) -> Result<Option<Commit>, SyncError> {
        let object = match self.repo().revparse_single(revision) {
            Ok(object) => object,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let commit = object.peel_to_commit()?;
        Ok(Some(Commit::from_git2(&commit)))
    }

    /// Commits from `from` (inclusive) up to `to_inclusive`, oldest first
    /// with every parent before its children. Merge commits are followed
    /// through all of their parents. Without `from` the walk runs to the
    /// root.
    ///
    /// A `from` that is never reached is reported as
    /// [`SyncError::AncestryViolation`]; a partial list is never returned.
    pub fn commits_between(
        &self,
        from: Option<&Commit>,
        to_inclusive: &Commit,
    ) -> Result<Vec<Commit>, SyncError> {
        let from_id = from.map(|commit| Oid::from_str(&commit.id)).transpose()?;

        let mut revwalk = self.repo().revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(Oid::from_str(&to_inclusive.id)?)?;

        let mut commits = Vec::new();
        let mut reached = from_id.is_none();
        for oid in revwalk {
            let oid = oid?;
            commits.push(Commit::from_git2(&self.repo().find_commit(oid)?));
            if Some(oid) == from_id {
                reached = true;
                break;
            }
        }

        if !reached {
            let log = commits
                .iter()
                .map(|commit| format!("{} {}", commit.short_id(), commit.summary()))
                .collect();
            return Err(SyncError::AncestryViolation {
                from: from.map(|commit| commit.id.clone()).unwrap_or_default(),
                to: to_inclusive.id.clone(),
                log,
            });
        }

        debug!(count = commits.len(), to = %to_inclusive.short_id(), "walked history");
        commits.reverse();
        Ok(commits)
    }

    /// Merge base of two commits, or `None` when their histories never meet.
    pub fn common_ancestor(&self, first: &Commit, second: &Commit) -> Result<Option<Commit>, SyncError> {
        let first = Oid::from_str(&first.id)?;
        let second = Oid::from_str(&second.id)?;

        match self.repo().merge_base(first, second) {
            Ok(base) => Ok(Some(Commit::from_git2(&self.repo().find_commit(base)?))),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
