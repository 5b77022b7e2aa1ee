use anyhow::{bail, Error};
use console::style;

use super::{with_session, Access, Location};
use crate::tui::sync_display;
use notesync::git::{FetchResult, MergeStrategy, PullResult, PushResult, SyncResult};

pub async fn handle_fetch(location: &Location) -> Result<(), Error> {
    let result = with_session(location, Access::Write, |session| Ok(session.repo.fetch()?)).await?;

    sync_display::display_fetch(&result);
    if let FetchResult::Failure { .. } = result {
        bail!("fetch failed");
    }
    Ok(())
}

pub async fn handle_pull(location: &Location, merge: bool) -> Result<(), Error> {
    let result =
        with_session(location, Access::Write, move |session| Ok(session.repo.pull(!merge)?)).await?;

    sync_display::display_pull(&result);
    match result {
        PullResult::Failure { .. } => bail!("pull failed"),
        PullResult::Unsupported { feature } => bail!("{feature} is not supported"),
        PullResult::Success | PullResult::Stopped { .. } => Ok(()),
    }
}

pub async fn handle_push(location: &Location, force: bool) -> Result<(), Error> {
    let result =
        with_session(location, Access::Write, move |session| Ok(session.repo.push(force)?)).await?;

    sync_display::display_push(&result);
    if let PushResult::Failure { .. } = result {
        bail!("push failed");
    }
    Ok(())
}

/// Fetch, integrate and push. `--manual` overrides the configured strategy.
pub async fn handle_sync(location: &Location, manual: bool) -> Result<(), Error> {
    let result = with_session(location, Access::Write, move |session| {
        let strategy = if manual {
            MergeStrategy::Manual
        } else {
            session.config.strategy
        };
        Ok(session.repo.sync(strategy)?)
    })
    .await?;

    sync_display::display_sync(&result);
    if let SyncResult::Failure { stage, .. } = result {
        bail!("sync failed during {stage}");
    }
    Ok(())
}

pub async fn handle_abort(location: &Location) -> Result<(), Error> {
    with_session(location, Access::Write, |session| Ok(session.repo.abort_rebase()?)).await?;

    println!(
        "{} Rebase aborted, local history restored",
        style("✓").green().bold()
    );
    Ok(())
}
