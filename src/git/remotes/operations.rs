use git2::{FetchOptions, Oid, PushOptions};
use tracing::{debug, info, warn};

use super::transport::session_callbacks;
use crate::git::error::SyncError;
use crate::git::repository::core::GitRepo;
use crate::git::types::{Commit, FetchResult, PushResult, Remote};

impl GitRepo {
    /// Configure the single remote. Adding the same remote again is a no-op;
    /// adding a different one fails with [`SyncError::MultipleRemotes`].
    pub fn add_remote(&mut self, name: &str, url: &str) -> Result<Remote, SyncError> {
        if let Some(existing) = self.remote()? {
            if existing.name == name && existing.url == url {
                debug!(name, url, "remote already configured");
                return Ok(existing);
            }
            return Err(SyncError::MultipleRemotes {
                existing: existing.name,
                requested: name.to_string(),
            });
        }

        self.repo().remote(name, url)?;
        info!(name, url, "added remote");

        Ok(Remote {
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    /// The configured remote, if any.
    pub fn remote(&self) -> Result<Option<Remote>, SyncError> {
        let names = self.repo().remotes()?;
        let mut names = names.iter().flatten();

        let name = match names.next() {
            Some(name) => name,
            None => return Ok(None),
        };
        if let Some(other) = names.next() {
            return Err(SyncError::MultipleRemotes {
                existing: name.to_string(),
                requested: other.to_string(),
            });
        }

        let remote = self.repo().find_remote(name)?;
        Ok(Some(Remote {
            name: name.to_string(),
            url: remote.url().unwrap_or_default().to_string(),
        }))
    }

    /// Last fetched tip of the current branch on the remote.
    pub fn remote_head(&self) -> Result<Option<Commit>, SyncError> {
        let remote = self.remote()?.ok_or(SyncError::NoRemote)?;
        let branch = self.current_branch()?;
        self.head_commit(Some(&format!(
            "refs/remotes/{}/{}",
            remote.name, branch.name
        )))
    }

    /// Download every ref of the remote and update the tracking refs. The
    /// local branch and working tree are left alone.
    pub fn fetch(&mut self) -> Result<FetchResult, SyncError> {
        let info = self.remote()?.ok_or(SyncError::NoRemote)?;
        let mut remote = self.repo().find_remote(&info.name)?;

        let mut options = FetchOptions::new();
        options.remote_callbacks(session_callbacks(self.ssh_key()));

        match remote.fetch(&[] as &[&str], Some(&mut options), Some("notesync: fetch")) {
            Ok(()) => {
                let received_objects = remote.stats().received_objects();
                info!(remote = %info.name, received_objects, "fetched");
                Ok(FetchResult::Success { received_objects })
            }
            Err(err) => {
                warn!(remote = %info.name, error = %err, "fetch failed");
                Ok(FetchResult::Failure {
                    reason: err.message().to_string(),
                })
            }
        }
    }

    /// Push the current branch to the same ref on the remote.
    ///
    /// A branch whose tip matches the remote-tracking ref is reported as
    /// [`PushResult::AlreadyUpToDate`] without connecting. `fetch` and every
    /// successful push move that ref. Exactly one ref update is expected back
    /// from a real push.
    pub fn push(&mut self, force: bool) -> Result<PushResult, SyncError> {
        if self.is_rebasing() {
            return Err(SyncError::RebaseInProgress);
        }

        let info = self.remote()?.ok_or(SyncError::NoRemote)?;
        let branch = self.current_branch()?;
        let refname = branch.refname();
        let local_tip = self
            .head_commit(None)?
            .map(|commit| Oid::from_str(&commit.id))
            .transpose()?;

        let remote_tip = self
            .remote_head()?
            .map(|commit| Oid::from_str(&commit.id))
            .transpose()?;

        if local_tip == remote_tip {
            debug!(remote = %info.name, branch = %branch.name, "remote already up to date");
            return Ok(PushResult::AlreadyUpToDate);
        }
        if local_tip.is_none() {
            return Ok(PushResult::Failure {
                reason: format!("branch '{}' has no commits to push", branch.name),
            });
        }

        let refspec = if force {
            format!("+{refname}:{refname}")
        } else {
            format!("{refname}:{refname}")
        };

        let mut remote = self.repo().find_remote(&info.name)?;
        let mut updates: Vec<(String, Option<String>)> = Vec::new();
        let pushed = {
            let mut callbacks = session_callbacks(self.ssh_key());
            callbacks.push_update_reference(|updated, status| {
                updates.push((updated.to_string(), status.map(str::to_string)));
                Ok(())
            });
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut options))
        };

        if let Err(err) = pushed {
            warn!(remote = %info.name, error = %err, "push failed");
            return Ok(PushResult::Failure {
                reason: err.message().to_string(),
            });
        }

        let update = match updates.as_slice() {
            [update] => update,
            _ => {
                return Err(SyncError::UnexpectedPushResults {
                    count: updates.len(),
                    updates: updates
                        .iter()
                        .map(|(name, status)| format!("{name}: {}", status.as_deref().unwrap_or("ok")))
                        .collect(),
                })
            }
        };

        match &update.1 {
            Some(rejection) => {
                warn!(remote = %info.name, reference = %update.0, %rejection, "push rejected");
                Ok(PushResult::Failure {
                    reason: format!("{} rejected: {rejection}", update.0),
                })
            }
            None => {
                info!(remote = %info.name, branch = %branch.name, force, "pushed");
                Ok(PushResult::Success)
            }
        }
    }
}
