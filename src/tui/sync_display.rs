use console::style;

use notesync::git::{
    Change, Commit, FetchResult, MergeConflict, PullResult, PushResult, SyncResult, TreeDiff,
};

/// Display the user-visible history, newest first
pub fn display_commits(commits: &[Commit]) {
    if commits.is_empty() {
        println!("{} No commits yet", style("⚠").yellow());
        return;
    }

    for commit in commits {
        println!(
            "{} {} {}",
            style(commit.short_id()).yellow(),
            style(&commit.timestamp).dim(),
            commit.summary()
        );
        println!(
            "        {} {}",
            style(&commit.author.name).cyan(),
            style(format!("<{}>", commit.author.email)).dim()
        );
    }
}

pub fn display_commit_created(commit: &Commit) {
    println!(
        "{} Committed {} {}",
        style("✓").green().bold(),
        style(commit.short_id()).yellow(),
        commit.summary()
    );
}

/// Display every change of a tree diff, one path per line
pub fn display_diff(diff: &TreeDiff) {
    if diff.is_empty() {
        println!("{} No changes", style("✨").green());
        return;
    }

    for change in &diff.changes {
        display_change(change);
    }
}

fn display_change(change: &Change) {
    match change {
        Change::Add { path } => println!("  {} {}", style("A").green().bold(), path),
        Change::Modify { path } => println!("  {} {}", style("M").yellow().bold(), path),
        Change::Delete { path } => println!("  {} {}", style("D").red().bold(), path),
        Change::Rename { from, to } => println!(
            "  {} {} {} {}",
            style("R").cyan().bold(),
            from,
            style("→").dim(),
            to
        ),
        Change::Copy { from, to } => println!(
            "  {} {} {} {}",
            style("C").cyan().bold(),
            from,
            style("→").dim(),
            to
        ),
    }
}

pub fn display_conflicts(conflicts: &[MergeConflict]) {
    if conflicts.is_empty() {
        println!("{} No conflicts", style("✓").green().bold());
        return;
    }

    println!(
        "{} {} conflicting path(s):",
        style("⚠").yellow().bold(),
        conflicts.len()
    );
    for conflict in conflicts {
        println!("  {} {}", style("✗").red(), style(&conflict.path).red());
    }
}

pub fn display_fetch(result: &FetchResult) {
    match result {
        FetchResult::Success { received_objects } => println!(
            "{} Fetched ({} objects received)",
            style("✓").green().bold(),
            received_objects
        ),
        FetchResult::Failure { reason } => display_failure("Fetch", reason),
    }
}

pub fn display_push(result: &PushResult) {
    match result {
        PushResult::Success => println!("{} Pushed", style("✓").green().bold()),
        PushResult::AlreadyUpToDate => {
            println!("{} Remote already up to date", style("✨").green())
        }
        PushResult::Failure { reason } => display_failure("Push", reason),
    }
}

pub fn display_pull(result: &PullResult) {
    match result {
        PullResult::Success => println!("{} Pulled", style("✓").green().bold()),
        PullResult::Stopped { conflicts } => {
            display_conflicts(conflicts);
            display_stopped_hint();
        }
        PullResult::Failure { reason } => display_failure("Pull", reason),
        PullResult::Unsupported { feature } => println!(
            "{} {} is not supported, use a rebase pull",
            style("⚠").yellow().bold(),
            style(feature).yellow()
        ),
    }
}

pub fn display_sync(result: &SyncResult) {
    match result {
        SyncResult::Synced { push } => {
            println!("{} Synced", style("✓").green().bold());
            display_push(push);
        }
        SyncResult::Conflicted { conflicts } => {
            display_conflicts(conflicts);
            display_stopped_hint();
        }
        SyncResult::Failure { stage, reason } => {
            display_failure(&format!("Sync ({stage})"), reason)
        }
    }
}

fn display_stopped_hint() {
    println!(
        "{} Rebase stopped. Resolve the files above or run {}",
        style("ℹ").blue(),
        style("nsync abort").cyan()
    );
}

fn display_failure(what: &str, reason: &str) {
    eprintln!(
        "{} {} failed: {}",
        style("✗").red().bold(),
        what,
        style(reason).red()
    );
}
