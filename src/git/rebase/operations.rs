use git2::build::CheckoutBuilder;
use git2::{ErrorCode, Oid, Rebase, RebaseOptions, Signature, Status, StatusOptions};
use tracing::{debug, info, warn};

use crate::git::error::SyncError;
use crate::git::merge::operations::conflicting_paths;
use crate::git::merge::strategy::MergeStrategy;
use crate::git::repository::core::GitRepo;
use crate::git::types::{Branch, Commit, MergeConflict, RebaseResult, RebaseState};

impl GitRepo {
    /// Replay the local commits that `onto` does not contain on top of
    /// `onto`.
    ///
    /// An up-to-date branch is left alone and a branch that is strictly
    /// behind (or unborn) is fast-forwarded. A conflict stops the rebase and
    /// leaves it in progress on disk; any other failure rolls it back and is
    /// reported as [`RebaseResult::Aborted`].
    pub fn rebase(&mut self, onto: &Commit, strategy: MergeStrategy) -> Result<RebaseResult, SyncError> {
        if self.is_rebasing() {
            return Err(SyncError::RebaseInProgress);
        }

        let branch = self.current_branch()?;
        let target = self.find_commit(onto)?;

        let head = match self.head_commit(None)? {
            Some(head) => Oid::from_str(&head.id)?,
            None => return Ok(self.fast_forward(&branch, &target)),
        };

        if head == target.id() || self.repo().graph_descendant_of(head, target.id())? {
            debug!(onto = %onto.short_id(), "branch already contains rebase target");
            return Ok(RebaseResult::Success);
        }

        if self.repo().graph_descendant_of(target.id(), head)? {
            return Ok(self.fast_forward(&branch, &target));
        }

        let committer = self.create_signature(None, None)?;
        self.replay(&branch, &target, strategy, &committer)
    }

    pub fn rebase_state(&self) -> RebaseState {
        if self.is_rebasing() {
            RebaseState::Rebasing
        } else {
            RebaseState::Idle
        }
    }

    /// Throw away a stopped rebase and restore the branch as it was before.
    pub fn abort_rebase(&mut self) -> Result<(), SyncError> {
        if !self.is_rebasing() {
            return Err(SyncError::NoRebaseInProgress);
        }

        self.repo().open_rebase(None)?.abort()?;
        info!("aborted rebase");
        Ok(())
    }

    fn fast_forward(&self, branch: &Branch, target: &git2::Commit<'_>) -> RebaseResult {
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();

        let result = self
            .repo()
            .checkout_tree(target.as_object(), Some(&mut checkout))
            .and_then(|_| {
                self.repo()
                    .reference(&branch.refname(), target.id(), true, "notesync: fast-forward")
            });

        match result {
            Ok(_) => {
                info!(branch = %branch.name, to = %target.id(), "fast-forwarded branch");
                RebaseResult::Success
            }
            Err(err) => {
                warn!(error = %err, "fast-forward failed");
                RebaseResult::Aborted {
                    reason: format!("fast-forward to {} failed: {}", target.id(), err.message()),
                }
            }
        }
    }

    fn replay(
        &self,
        branch: &Branch,
        target: &git2::Commit<'_>,
        strategy: MergeStrategy,
        committer: &Signature<'_>,
    ) -> Result<RebaseResult, SyncError> {
        let branch_ref = self.repo().find_reference(&branch.refname())?;
        let local = self.repo().reference_to_annotated_commit(&branch_ref)?;
        let upstream = self.repo().find_annotated_commit(target.id())?;

        let mut options = RebaseOptions::new();
        options.merge_options(strategy.merge_options());

        let mut rebase = match self
            .repo()
            .rebase(Some(&local), Some(&upstream), None, Some(&mut options))
        {
            Ok(rebase) => rebase,
            Err(err) => {
                warn!(error = %err, "rebase could not start");
                return Ok(RebaseResult::Aborted {
                    reason: format!("rebase could not start: {}", err.message()),
                });
            }
        };

        let outcome = self
            .apply_operations(&mut rebase, target.id(), committer)
            .and_then(|stopped| match stopped {
                Some(conflicts) => Ok(Some(conflicts)),
                None => {
                    rebase.finish(Some(committer))?;
                    Ok(None)
                }
            });

        match outcome {
            Ok(None) => {
                info!(branch = %branch.name, onto = %target.id(), ?strategy, "rebase succeeded");
                Ok(RebaseResult::Success)
            }
            Ok(Some(conflicts)) => {
                let uncommitted_changes = self.uncommitted_changes()?;
                warn!(count = conflicts.len(), "rebase stopped on conflicts");
                Ok(RebaseResult::Stopped {
                    conflicts,
                    uncommitted_changes,
                })
            }
            Err(err) => {
                let failing = self.uncommitted_changes().unwrap_or_default();
                if let Err(abort_err) = rebase.abort() {
                    warn!(error = %abort_err, "could not roll back failed rebase");
                }
                if err.is_invariant_violation() {
                    return Err(err);
                }
                warn!(error = %err, "rebase aborted");
                Ok(RebaseResult::Aborted {
                    reason: format!("{err}; uncommitted paths at failure: {failing:?}"),
                })
            }
        }
    }

    /// Apply every pending operation. Returns the conflicting paths of the
    /// operation that could not be applied cleanly, if any.
    fn apply_operations(
        &self,
        rebase: &mut Rebase<'_>,
        onto: Oid,
        committer: &Signature<'_>,
    ) -> Result<Option<Vec<MergeConflict>>, SyncError> {
        while let Some(operation) = rebase.next() {
            let operation_id = operation?.id();

            let index = self.repo().index()?;
            if index.has_conflicts() {
                let conflicts = conflicting_paths(&index)?;
                if conflicts.is_empty() {
                    return Err(SyncError::UnmergeableWithoutConflicts {
                        ours: onto.to_string(),
                        theirs: operation_id.to_string(),
                    });
                }
                return Ok(Some(conflicts));
            }

            match rebase.commit(None, committer, None) {
                Ok(new_id) => debug!(from = %operation_id, to = %new_id, "replayed commit"),
                Err(err) if err.code() == ErrorCode::Applied => {
                    debug!(commit = %operation_id, "skipping patch already present upstream")
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(None)
    }

    /// Paths with staged or unstaged changes that are not conflicted.
    fn uncommitted_changes(&self) -> Result<Vec<String>, SyncError> {
        let mut options = StatusOptions::new();
        options.include_untracked(false);
        let statuses = self.repo().statuses(Some(&mut options))?;

        Ok(statuses
            .iter()
            .filter(|entry| !entry.status().contains(Status::CONFLICTED))
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::git::error::SyncError;
    use crate::git::merge::strategy::MergeStrategy;
    use crate::git::types::{MergeConflict, RebaseResult, RebaseState};
    use crate::test_utils::{create_test_repo, RepoAssertions, RepoTestOperations};

    #[test]
    fn non_conflicting_history_is_replayed_linearly() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("base.md", "base", "base")?;
        repo.create_and_checkout_branch("remote")?;
        repo.add_file_and_commit("theirs.md", "theirs", "their note")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.add_file_and_commit("mine.md", "mine", "my note")?;

        assert!(repo.merge_conflicts(&onto)?.is_empty());
        let result = repo.rebase(&onto, MergeStrategy::PreferLocal)?;

        assert_eq!(result, RebaseResult::Success);
        let head = repo.head_commit(None)?.unwrap();
        assert_eq!(head.summary(), "my note");
        assert_eq!(head.parent_ids, vec![onto.id.clone()]);
        assert_eq!(repo.rebase_state(), RebaseState::Idle);
        repo.assert_current_branch("master")
            .assert_file_exists("theirs.md")
            .assert_file_exists("mine.md")
            .assert_commit_messages(&["my note", "their note", "base"]);
        Ok(())
    }

    #[test]
    fn up_to_date_branch_is_untouched() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("a.md", "a", "one")?;
        let older = repo.head_commit(None)?.unwrap();
        repo.add_file_and_commit("b.md", "b", "two")?;
        let head = repo.head_commit(None)?.unwrap();

        assert_eq!(repo.rebase(&older, MergeStrategy::Manual)?, RebaseResult::Success);
        assert_eq!(repo.rebase(&head, MergeStrategy::Manual)?, RebaseResult::Success);
        assert_eq!(repo.head_commit(None)?.unwrap(), head);
        Ok(())
    }

    #[test]
    fn branch_behind_is_fast_forwarded() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("a.md", "a", "one")?;
        repo.create_and_checkout_branch("ahead")?;
        repo.add_file_and_commit("b.md", "b", "two")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.assert_file_not_exists("b.md");

        assert_eq!(repo.rebase(&onto, MergeStrategy::Manual)?, RebaseResult::Success);
        assert_eq!(repo.head_commit(None)?.unwrap().id, onto.id);
        repo.assert_file_exists("b.md");
        assert!(!repo.is_staging_area_dirty()?);
        Ok(())
    }

    #[test]
    fn unborn_branch_is_fast_forwarded() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir_a, mut other) = create_test_repo();
        other.add_file_and_commit("a.md", "a", "from other device")?;
        let onto = other.head_commit(None)?.unwrap();

        let (_dir_b, mut repo) = create_test_repo();
        repo.add_local_remote("origin", &other)?;
        repo.fetch()?;

        assert_eq!(repo.rebase(&onto, MergeStrategy::PreferLocal)?, RebaseResult::Success);
        assert_eq!(repo.head_commit(None)?.unwrap().id, onto.id);
        repo.assert_current_branch("master")
            .assert_file_content("a.md", "a");
        Ok(())
    }

    #[test]
    fn conflict_stops_and_can_be_aborted() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("note.md", "original\n", "base")?;
        repo.create_and_checkout_branch("remote")?;
        repo.add_file_and_commit("note.md", "theirs\n", "their edit")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.add_file_and_commit("note.md", "ours\n", "our edit")?;
        let local = repo.head_commit(None)?.unwrap();

        let result = repo.rebase(&onto, MergeStrategy::Manual)?;

        match result {
            RebaseResult::Stopped { conflicts, .. } => {
                assert_eq!(conflicts, vec![MergeConflict::new("note.md")]);
            }
            other => panic!("expected rebase to stop, got {other:?}"),
        }
        assert_eq!(repo.rebase_state(), RebaseState::Rebasing);
        // the branch being rebased is still reported and still at its old tip
        assert_eq!(repo.current_branch()?.name, "master");
        assert_eq!(repo.head_commit(None)?.unwrap().id, local.id);
        assert_eq!(
            repo.merge_conflicts(&onto)?,
            vec![MergeConflict::new("note.md")]
        );
        assert!(matches!(
            repo.rebase(&onto, MergeStrategy::Manual),
            Err(SyncError::RebaseInProgress)
        ));
        assert!(matches!(
            repo.commit_all("while stopped", None, None, true),
            Err(SyncError::RebaseInProgress)
        ));

        repo.abort_rebase()?;

        assert_eq!(repo.rebase_state(), RebaseState::Idle);
        assert_eq!(repo.head_commit(None)?.unwrap().id, local.id);
        repo.assert_current_branch("master")
            .assert_file_content("note.md", "ours\n");
        assert!(matches!(
            repo.abort_rebase(),
            Err(SyncError::NoRebaseInProgress)
        ));
        Ok(())
    }

    #[test]
    fn uncommitted_edit_aborts_replay() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("note.md", "original\n", "base")?;
        repo.create_and_checkout_branch("remote")?;
        repo.add_file_and_commit("theirs.md", "theirs", "their note")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.add_file_and_commit("mine.md", "mine", "my note")?;
        let local = repo.head_commit(None)?.unwrap();
        repo.add_file("note.md", "still typing\n")?;

        let result = repo.rebase(&onto, MergeStrategy::PreferLocal)?;

        match result {
            RebaseResult::Aborted { reason } => {
                assert!(reason.starts_with("rebase could not start"), "{reason}");
            }
            other => panic!("expected rebase to abort, got {other:?}"),
        }
        assert_eq!(repo.rebase_state(), RebaseState::Idle);
        assert_eq!(repo.head_commit(None)?.unwrap().id, local.id);
        repo.assert_current_branch("master")
            .assert_file_content("note.md", "still typing\n")
            .assert_file_not_exists("theirs.md");
        Ok(())
    }

    #[test]
    fn untracked_file_in_the_way_aborts_fast_forward() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("a.md", "a", "one")?;
        let local = repo.head_commit(None)?.unwrap();
        repo.create_and_checkout_branch("ahead")?;
        repo.add_file_and_commit("b.md", "from remote", "two")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.add_file("b.md", "local draft")?;

        let result = repo.rebase(&onto, MergeStrategy::PreferLocal)?;

        match result {
            RebaseResult::Aborted { reason } => {
                assert!(reason.starts_with("fast-forward"), "{reason}");
                assert!(reason.contains(&onto.id));
            }
            other => panic!("expected fast-forward to abort, got {other:?}"),
        }
        assert_eq!(repo.rebase_state(), RebaseState::Idle);
        assert_eq!(repo.head_commit(None)?.unwrap().id, local.id);
        repo.assert_file_content("b.md", "local draft");
        Ok(())
    }

    #[test]
    fn prefer_local_resolves_overlapping_edits() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("note.md", "original\n", "base")?;
        repo.create_and_checkout_branch("remote")?;
        repo.add_file_and_commit("note.md", "theirs\n", "their edit")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.add_file_and_commit("note.md", "ours\n", "our edit")?;

        let result = repo.rebase(&onto, MergeStrategy::PreferLocal)?;

        assert_eq!(result, RebaseResult::Success);
        let head = repo.head_commit(None)?.unwrap();
        assert_eq!(head.parent_ids, vec![onto.id.clone()]);
        repo.assert_file_content("note.md", "ours\n");
        Ok(())
    }

    #[test]
    fn patches_already_upstream_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let (_temp_dir, mut repo) = create_test_repo();
        repo.add_file_and_commit("base.md", "base", "base")?;
        repo.create_and_checkout_branch("remote")?;
        repo.add_file_and_commit("same.md", "same", "same change upstream")?;
        let onto = repo.head_commit(None)?.unwrap();
        repo.checkout_branch("master")?;
        repo.add_file_and_commit("same.md", "same", "same change locally")?
            .add_file_and_commit("mine.md", "mine", "my note")?;

        assert_eq!(repo.rebase(&onto, MergeStrategy::Manual)?, RebaseResult::Success);
        repo.assert_commit_messages(&["my note", "same change upstream", "base"]);
        Ok(())
    }
}
