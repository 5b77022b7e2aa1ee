mod cli;
mod commands;
mod tui;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Location;
use console::style;
use notesync::logging::setup_logging;

#[tokio::main]
async fn main() {
    setup_logging();
    let cli = Cli::parse();
    let location = Location {
        repo: cli.repo,
        config: cli.config,
    };

    let result = match cli.command {
        Commands::Commit {
            message,
            allow_empty,
        } => commands::commit::handle_commit(&location, message, allow_empty).await,
        Commands::Fetch => commands::sync::handle_fetch(&location).await,
        Commands::Pull { merge } => commands::sync::handle_pull(&location, merge).await,
        Commands::Push { force } => commands::sync::handle_push(&location, force).await,
        Commands::Sync { manual } => commands::sync::handle_sync(&location, manual).await,
        Commands::Log => commands::history::handle_log(&location).await,
        Commands::Diff { first, second } => {
            commands::history::handle_diff(&location, first, second).await
        }
        Commands::Conflicts { commit } => {
            commands::history::handle_conflicts(&location, commit).await
        }
        Commands::Remote { name, url } => commands::remote::handle_remote(&location, name, url).await,
        Commands::Abort => commands::sync::handle_abort(&location).await,
    };

    if let Err(e) = result {
        eprintln!("{} Error: {:#}", style("✗").red().bold(), e);
        std::process::exit(1);
    }
}
