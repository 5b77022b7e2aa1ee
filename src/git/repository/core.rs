use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, RepositoryState};
use tracing::{debug, info};

use crate::git::error::SyncError;
use crate::git::types::{Branch, Commit, SshPrivateKey};

/// Branch that a freshly initialized repository points HEAD at.
pub const DEFAULT_BRANCH: &str = "master";

/// Owner of the single on-disk repository (working tree, index, refs and
/// object store).
///
/// Mutating operations take `&mut self` and read-only graph queries take
/// `&self`, so a handle can never be written to while a query is running.
pub struct GitRepo {
    path: PathBuf,
    repo: Repository,
    ssh_key: Option<SshPrivateKey>,
}

impl GitRepo {
    /// Open the repository at `path`, initializing one if the directory does
    /// not contain a repository yet. Opening an existing repository never
    /// re-initializes it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let path_ref = path.as_ref();

        let repo = match Repository::open(path_ref) {
            Ok(repo) => {
                debug!(path = %path_ref.display(), "opened existing repository");
                repo
            }
            Err(err) if err.code() == ErrorCode::NotFound => {
                let repo = Repository::init(path_ref)?;
                // The branch itself is created by the first commit
                repo.set_head(&format!("refs/heads/{DEFAULT_BRANCH}"))?;
                info!(path = %path_ref.display(), "initialized repository");
                repo
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path: path_ref.to_path_buf(),
            repo,
            ssh_key: None,
        })
    }

    /// Open the repository at `path` without ever initializing one.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let path_ref = path.as_ref();
        let repo = Repository::open(path_ref)?;
        debug!(path = %path_ref.display(), "opened existing repository");

        Ok(Self {
            path: path_ref.to_path_buf(),
            repo,
            ssh_key: None,
        })
    }

    /// Initialize a new bare repository, usable as a remote.
    pub fn init_bare<P: AsRef<Path>>(path: P) -> Result<Self, SyncError> {
        let path_ref = path.as_ref();
        let repo = Repository::init_bare(path_ref)?;
        repo.set_head(&format!("refs/heads/{DEFAULT_BRANCH}"))?;

        Ok(Self {
            path: path_ref.to_path_buf(),
            repo,
            ssh_key: None,
        })
    }

    /// Attach the deploy key used for every fetch and push of this handle.
    pub fn with_ssh_key(mut self, key: SshPrivateKey) -> Self {
        self.ssh_key = Some(key);
        self
    }

    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `.git` directory, or the repository itself when bare.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    pub(crate) fn ssh_key(&self) -> Option<&SshPrivateKey> {
        self.ssh_key.as_ref()
    }

    /// Write the default commit identity into the repository config.
    pub fn set_user_config(&mut self, name: &str, email: &str) -> Result<(), SyncError> {
        let mut config = self.repo.config()?;
        config.set_str("user.name", name)?;
        config.set_str("user.email", email)?;
        Ok(())
    }

    /// Whether the index or working tree differ from HEAD, including
    /// untracked files.
    pub fn is_staging_area_dirty(&self) -> Result<bool, SyncError> {
        let mut options = git2::StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    /// Branch that HEAD points to.
    ///
    /// While a rebase is in progress libgit2 detaches HEAD; the branch being
    /// rebased is reported in that case. Any other detached HEAD is fatal.
    pub fn current_branch(&self) -> Result<Branch, SyncError> {
        let head = self
            .repo
            .find_reference("HEAD")
            .map_err(|_| SyncError::CorruptHead)?;

        if let Some(target) = head.symbolic_target() {
            return match target.strip_prefix("refs/heads/") {
                Some(name) => Ok(Branch {
                    name: name.to_string(),
                }),
                None => Err(SyncError::DetachedHead),
            };
        }

        if self.is_rebasing() {
            let rebase = self.repo.open_rebase(None)?;
            if let Some(name) = rebase
                .orig_head_name()
                .and_then(|name| name.strip_prefix("refs/heads/"))
            {
                return Ok(Branch {
                    name: name.to_string(),
                });
            }
        }

        Err(SyncError::DetachedHead)
    }

    pub(crate) fn is_rebasing(&self) -> bool {
        matches!(
            self.repo.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
                | RepositoryState::ApplyMailboxOrRebase
        )
    }

    pub(crate) fn find_commit(&self, commit: &Commit) -> Result<git2::Commit<'_>, SyncError> {
        let oid = git2::Oid::from_str(&commit.id)?;
        Ok(self.repo.find_commit(oid)?)
    }
}
