//! Tracing setup: subscriber initialization and span definitions.

pub mod spans;

use tracing_subscriber::EnvFilter;

use empathy_core::config::ObservabilityConfig;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "EMPATHY_LOG";

/// Install the global subscriber.
///
/// `EMPATHY_LOG` wins over `config.log_level` when set. Safe to call more than
/// once: only the first call installs anything. Returns whether this call did.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_logs {
        builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
            .is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::debug!(level = %config.log_level, json = config.json_logs, "tracing initialized");
    }
    installed
}

/// Initialize with a custom filter string (for tests or embedding).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .with_test_writer()
        .try_init()
        .is_ok()
}
