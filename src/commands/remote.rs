use anyhow::{Context, Error};
use console::style;

use super::{with_session, Access, Location};
use notesync::config::RemoteConfig;

/// Add the remote to the repository and remember it in the config file.
pub async fn handle_remote(location: &Location, name: String, url: String) -> Result<(), Error> {
    let remote = with_session(location, Access::Write, move |session| {
        let remote = session.repo.add_remote(&name, &url)?;
        session.config.remote = Some(RemoteConfig {
            name: remote.name.clone(),
            url: remote.url.clone(),
        });
        session
            .config
            .save(session.config_path())
            .context("Failed to record remote in config")?;
        Ok(remote)
    })
    .await?;

    println!(
        "{} Remote {} → {}",
        style("✓").green().bold(),
        style(&remote.name).cyan(),
        style(&remote.url).dim()
    );
    Ok(())
}
