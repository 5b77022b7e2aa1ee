use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `notesync=debug`.
pub const LOG_ENV: &str = "NOTESYNC_LOG";

const DEFAULT_FILTER: &str = "notesync=info";

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(filter_from_env())
        .init();
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into())
}
