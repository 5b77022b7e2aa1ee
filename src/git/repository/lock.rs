//! Cross-process lock on a repository.
//!
//! Mutating operations (commit, fetch, rebase, pull, push) must not overlap
//! with anything else, while reads may overlap with other reads. Inside one
//! process `&mut GitRepo` already guarantees that; writers take this lock
//! exclusively and readers take it shared to extend the guarantee to several
//! processes touching the same path. The lock lives at
//! `<gitdir>/notesync.lock` and is released on drop.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("repository at {0} is locked by another process")]
    AlreadyLocked(PathBuf),

    #[error("lock i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    file: File,
}

impl RepoLock {
    /// Acquire the writer lock without blocking. `git_dir` is the
    /// repository's `.git` directory (or the repository itself when bare).
    pub fn acquire(git_dir: &Path) -> Result<Self, LockError> {
        Self::lock(git_dir, true)
    }

    /// Acquire a reader lock without blocking. Fails while a writer holds
    /// the repository.
    pub fn acquire_shared(git_dir: &Path) -> Result<Self, LockError> {
        Self::lock(git_dir, false)
    }

    fn lock(git_dir: &Path, exclusive: bool) -> Result<Self, LockError> {
        let path = git_dir.join("notesync.lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        let locked = if exclusive {
            FileExt::try_lock_exclusive(&file)
        } else {
            FileExt::try_lock_shared(&file)
        };
        if locked.is_err() {
            return Err(LockError::AlreadyLocked(git_dir.to_path_buf()));
        }

        debug!(path = %path.display(), exclusive, "acquired repository lock");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
