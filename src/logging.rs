//! Logging configuration for db-xl-dump.
//!
//! Logs go to stderr so they never mix with the command's stdout output.

use tracing_subscriber::EnvFilter;

/// Returns the default log level for the given debug setting.
pub fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Builds the log filter. `RUST_LOG` overrides the default level.
pub fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(debug)))
}

/// Initializes logging to stderr.
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_logging(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
