pub mod commit;
pub mod history;
pub mod remote;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use tracing::debug;

use notesync::config::SyncConfig;
use notesync::git::{GitRepo, RepoLock};

/// Whether a command changes the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Where the repository and its config live, as given on the command line.
#[derive(Debug, Clone)]
pub struct Location {
    pub repo: PathBuf,
    pub config: Option<PathBuf>,
}

/// An opened repository together with its settings. Writers hold the
/// repository lock exclusively and readers hold it shared for as long as the
/// session lives.
pub struct Session {
    pub repo: GitRepo,
    pub config: SyncConfig,
    config_path: PathBuf,
    _lock: RepoLock,
}

impl Session {
    fn open(location: &Location, access: Access) -> Result<Self, Error> {
        let repo = match access {
            Access::Write => GitRepo::open(&location.repo),
            Access::Read => GitRepo::open_existing(&location.repo),
        }
        .with_context(|| {
            format!("Cannot open notes repository at '{}'", location.repo.display())
        })?;

        let lock = match access {
            Access::Write => RepoLock::acquire(repo.git_dir()),
            Access::Read => RepoLock::acquire_shared(repo.git_dir()),
        }
        .context("Failed to lock repository")?;

        let config_path = location
            .config
            .clone()
            .unwrap_or_else(|| SyncConfig::default_path(repo.git_dir()));
        let config = SyncConfig::load(&config_path)?;

        let mut repo = match config.ssh_key()? {
            Some(key) => repo.with_ssh_key(key),
            None => repo,
        };

        if access == Access::Write {
            if let Some(author) = &config.author {
                repo.set_user_config(&author.name, &author.email)
                    .context("Failed to apply configured author")?;
            }
            if let Some(remote) = &config.remote {
                repo.add_remote(&remote.name, &remote.url)
                    .context("Configured remote does not match the repository")?;
            }
        }

        debug!(repo = %location.repo.display(), ?access, "opened session");
        Ok(Self {
            repo,
            config,
            config_path,
            _lock: lock,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Open a session and run `operation` on the blocking pool. The typed
/// result comes back through the join handle.
pub async fn with_session<T, F>(location: &Location, access: Access, operation: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce(&mut Session) -> Result<T, Error> + Send + 'static,
{
    let location = location.clone();
    tokio::task::spawn_blocking(move || {
        let mut session = Session::open(&location, access)?;
        operation(&mut session)
    })
    .await
    .context("Repository task panicked")?
}
