//! Per-repository settings for the `nsync` binary.
//!
//! Stored as JSON in `notesync.json` inside the `.git` directory, so it is
//! never committed along with the notes. Every field is optional; a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

use crate::git::{Author, MergeStrategy, SshPrivateKey};

pub const CONFIG_FILE_NAME: &str = "notesync.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl From<&AuthorConfig> for Author {
    fn from(value: &AuthorConfig) -> Self {
        Author::new(&value.name, &value.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorConfig>,
    pub strategy: MergeStrategy,
}

impl SyncConfig {
    /// Default location of the config file for a repository.
    pub fn default_path(git_dir: &Path) -> PathBuf {
        git_dir.join(CONFIG_FILE_NAME)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file '{}'", path.display()))
    }

    /// Read the configured deploy key, if one is set.
    pub fn ssh_key(&self) -> Result<Option<SshPrivateKey>, Error> {
        let path = match &self.ssh_key_path {
            Some(path) => path,
            None => return Ok(None),
        };

        let key = fs::read_to_string(path)
            .with_context(|| format!("Failed to read SSH key '{}'", path.display()))?;
        Ok(Some(SshPrivateKey::new(key)))
    }
}
