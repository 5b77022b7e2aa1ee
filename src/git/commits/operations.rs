use git2::{IndexAddOption, Sort};
use tracing::{debug, info};

use crate::git::error::SyncError;
use crate::git::repository::core::GitRepo;
use crate::git::types::{Author, Commit, UtcTimestamp};

/// First line of the empty commit placed underneath the first real commit.
pub const SYNTHETIC_ROOT_TITLE: &str = "Synthetic root commit";

const SYNTHETIC_ROOT_MESSAGE: &str = "Synthetic root commit

Rebasing can drop commits that have no parent, which is always true for
the first commit of a repository. This empty commit sits underneath the
first real commit so that every note commit has an ancestor.
";

impl GitRepo {
    /// Stage every change in the working tree, deletions included, and commit
    /// it on the current branch.
    ///
    /// The first commit of a repository is preceded by an empty synthetic
    /// root commit. Without `allow_empty`, an unchanged tree fails with
    /// [`SyncError::NothingToCommit`].
    pub fn commit_all(
        &mut self,
        message: &str,
        author: Option<&Author>,
        timestamp: Option<UtcTimestamp>,
        allow_empty: bool,
    ) -> Result<Commit, SyncError> {
        if self.is_rebasing() {
            return Err(SyncError::RebaseInProgress);
        }

        let signature = self.create_signature(author, timestamp)?;
        let branch = self.current_branch()?;

        let mut index = self.repo().index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        // add_all leaves files removed from disk in the index
        index.update_all(["*"], None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo().find_tree(tree_id)?;

        let mut parent = match self.head_commit(None)? {
            Some(head) => Some(self.find_commit(&head)?),
            None => None,
        };

        let empty_tree_id = self.repo().treebuilder(None)?.write()?;
        let base_tree_id = parent.as_ref().map_or(empty_tree_id, |p| p.tree_id());
        if !allow_empty && base_tree_id == tree_id {
            return Err(SyncError::NothingToCommit);
        }

        if parent.is_none() {
            let empty_tree = self.repo().find_tree(empty_tree_id)?;
            let root_id = self.repo().commit(
                Some(&branch.refname()),
                &signature,
                &signature,
                SYNTHETIC_ROOT_MESSAGE,
                &empty_tree,
                &[],
            )?;
            debug!(commit = %root_id, "created synthetic root commit");
            parent = Some(self.repo().find_commit(root_id)?);
        }

        let parents: Vec<_> = parent.iter().collect();
        let commit_id = self.repo().commit(
            Some(&branch.refname()),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        info!(commit = %commit_id, branch = %branch.name, "committed changes");
        Ok(Commit::from_git2(&self.repo().find_commit(commit_id)?))
    }

    /// Commits reachable from HEAD, newest first, without the synthetic root.
    pub fn list_commits(&self) -> Result<Vec<Commit>, SyncError> {
        let head = match self.head_commit(None)? {
            Some(head) => head,
            None => return Ok(Vec::new()),
        };

        let mut revwalk = self.repo().revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(git2::Oid::from_str(&head.id)?)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo().find_commit(oid?)?;
            if is_synthetic_root(&commit) {
                continue;
            }
            commits.push(Commit::from_git2(&commit));
        }

        Ok(commits)
    }
}

pub(crate) fn is_synthetic_root(commit: &git2::Commit<'_>) -> bool {
    commit.parent_count() == 0
        && commit
            .summary_bytes()
            .is_some_and(|summary| summary == SYNTHETIC_ROOT_TITLE.as_bytes())
}
