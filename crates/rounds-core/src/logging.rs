//! `tracing` subscriber bootstrap for hosts that do not install their own.
use crate::settings::HostSettings;
use tracing_subscriber::EnvFilter;

/// [`try_init_logging`] with the filter from `settings`.
pub fn init_logging(settings: &HostSettings) -> bool {
    try_init_logging(&settings.log_filter)
}

/// Installs a global fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Returns `false` when a global subscriber was already set.
pub fn try_init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
