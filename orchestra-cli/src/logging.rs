//! Logging setup for the `orchestra` binary
//!
//! Logs go to stderr so that stdout only carries command output.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV_VAR: &str = "ORCHESTRA_LOG";

/// Level selected by the verbosity flags, `--quiet` winning over the others
pub fn level_from_flags(quiet: bool, debug: bool, verbose: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if debug {
        Level::DEBUG
    } else if verbose {
        Level::TRACE
    } else {
        Level::INFO
    }
}

/// Filter directive: `ORCHESTRA_LOG` when set, otherwise the flag level
pub fn filter_directive(env_value: Option<&str>, level: Level) -> String {
    match env_value.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => level.to_string().to_lowercase(),
    }
}

/// Install the global subscriber
pub fn init(quiet: bool, debug: bool, verbose: bool) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let directive = filter_directive(env_value.as_deref(), level_from_flags(quiet, debug, verbose));
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
