//! Tracing subscriber setup for the host binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! binary. Output goes to stderr because stdout carries the RPC stream.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `browsershell=debug`.
pub const LOG_ENV: &str = "BROWSERSHELL_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Builds the filter from `BROWSERSHELL_LOG`, falling back to `warn`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
