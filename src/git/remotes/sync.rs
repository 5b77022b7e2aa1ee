use tracing::{debug, info, warn};

use crate::git::error::SyncError;
use crate::git::merge::strategy::MergeStrategy;
use crate::git::repository::core::GitRepo;
use crate::git::types::{
    FetchResult, PullResult, PushResult, RebaseResult, SyncResult, SyncStage,
};

impl GitRepo {
    /// Fetch, then rebase the current branch onto the remote tip. Every
    /// conflict stops the rebase.
    ///
    /// Merge-based integration is not implemented and is reported as
    /// [`PullResult::Unsupported`] before any network access.
    pub fn pull(&mut self, rebase: bool) -> Result<PullResult, SyncError> {
        if !rebase {
            warn!("merge-based pull requested");
            return Ok(PullResult::Unsupported {
                feature: "merge-based pull".to_string(),
            });
        }

        if let FetchResult::Failure { reason } = self.fetch()? {
            return Ok(PullResult::Failure { reason });
        }

        let result = match self.integrate(MergeStrategy::Manual)? {
            RebaseResult::Success => PullResult::Success,
            RebaseResult::Stopped { conflicts, .. } => PullResult::Stopped { conflicts },
            RebaseResult::Aborted { reason } => PullResult::Failure { reason },
        };
        info!(?result, "pull finished");
        Ok(result)
    }

    /// One full round: fetch, integrate remote history with `strategy`, then
    /// push. Nothing is pushed unless integration succeeded.
    pub fn sync(&mut self, strategy: MergeStrategy) -> Result<SyncResult, SyncError> {
        if self.is_rebasing() {
            return Err(SyncError::RebaseInProgress);
        }

        if let FetchResult::Failure { reason } = self.fetch()? {
            return Ok(SyncResult::Failure {
                stage: SyncStage::Fetch,
                reason,
            });
        }

        match self.integrate(strategy)? {
            RebaseResult::Success => {}
            RebaseResult::Stopped { conflicts, .. } => {
                warn!(count = conflicts.len(), "sync stopped on conflicts, not pushing");
                return Ok(SyncResult::Conflicted { conflicts });
            }
            RebaseResult::Aborted { reason } => {
                return Ok(SyncResult::Failure {
                    stage: SyncStage::Integrate,
                    reason,
                });
            }
        }

        let push = self.push(false)?;
        if let PushResult::Failure { reason } = push {
            return Ok(SyncResult::Failure {
                stage: SyncStage::Push,
                reason,
            });
        }

        info!(?push, "sync finished");
        Ok(SyncResult::Synced { push })
    }

    fn integrate(&mut self, strategy: MergeStrategy) -> Result<RebaseResult, SyncError> {
        match self.remote_head()? {
            Some(tip) => self.rebase(&tip, strategy),
            None => {
                debug!("remote has no history for this branch yet");
                Ok(RebaseResult::Success)
            }
        }
    }
}
