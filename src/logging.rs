//! stderr logging for the CLI.

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "AGENDA_LOG";

/// Install the global subscriber. `AGENDA_LOG` takes precedence over `--verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "agenda_core=debug,agenda=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
