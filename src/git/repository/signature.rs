use git2::{Signature, Time};

use super::core::GitRepo;
use crate::git::error::SyncError;
use crate::git::types::{Author, UtcTimestamp};

impl GitRepo {
    /// Identity configured through `user.name` and `user.email`.
    pub fn default_author(&self) -> Result<Author, SyncError> {
        let config = self.repo().config()?;
        let name = config.get_string("user.name")?;
        let email = config.get_string("user.email")?;
        Ok(Author { name, email })
    }

    /// Build a UTC signature. Explicit values win over the configured
    /// identity and the current time.
    pub(crate) fn create_signature(
        &self,
        author: Option<&Author>,
        timestamp: Option<UtcTimestamp>,
    ) -> Result<Signature<'static>, SyncError> {
        let author = match author {
            Some(author) => author.clone(),
            None => self.default_author()?,
        };
        let timestamp = timestamp.unwrap_or_else(UtcTimestamp::now);

        Ok(Signature::new(
            &author.name,
            &author.email,
            &Time::new(timestamp.seconds(), 0),
        )?)
    }
}
