use anyhow::{anyhow, Error};

use super::{with_session, Access, Location};
use crate::tui::sync_display;
use notesync::git::{Commit, GitRepo};

pub async fn handle_log(location: &Location) -> Result<(), Error> {
    let commits = with_session(location, Access::Read, |session| Ok(session.repo.list_commits()?)).await?;

    sync_display::display_commits(&commits);
    Ok(())
}

/// With one revision, the changes it introduced; with two, the changes
/// from the first to the second.
pub async fn handle_diff(location: &Location, first: String, second: Option<String>) -> Result<(), Error> {
    let diff = with_session(location, Access::Read, move |session| {
        let repo = &session.repo;
        let diff = match second {
            Some(second) => {
                let from = resolve(repo, &first)?;
                let to = resolve(repo, &second)?;
                repo.diff_between(Some(&from), &to)?
            }
            None => repo.changes_in(&resolve(repo, &first)?)?,
        };
        Ok(diff)
    })
    .await?;

    sync_display::display_diff(&diff);
    Ok(())
}

pub async fn handle_conflicts(location: &Location, revision: String) -> Result<(), Error> {
    let conflicts = with_session(location, Access::Read, move |session| {
        let candidate = resolve(&session.repo, &revision)?;
        Ok(session.repo.merge_conflicts(&candidate)?)
    })
    .await?;

    sync_display::display_conflicts(&conflicts);
    Ok(())
}

fn resolve(repo: &GitRepo, revision: &str) -> Result<Commit, Error> {
    repo.resolve_commit(revision)?
        .ok_or_else(|| anyhow!("Unknown revision '{revision}'"))
}
