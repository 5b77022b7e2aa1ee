use anyhow::Error;
use console::style;

use super::{with_session, Access, Location};
use crate::tui::sync_display;
use notesync::git::SyncError;

pub async fn handle_commit(location: &Location, message: String, allow_empty: bool) -> Result<(), Error> {
    let committed = with_session(location, Access::Write, move |session| {
        match session.repo.commit_all(&message, None, None, allow_empty) {
            Ok(commit) => Ok(Some(commit)),
            Err(SyncError::NothingToCommit) => Ok(None),
            Err(err) => Err(err.into()),
        }
    })
    .await?;

    match committed {
        Some(commit) => sync_display::display_commit_created(&commit),
        None => println!("{} Nothing to commit", style("✨").green()),
    }
    Ok(())
}
