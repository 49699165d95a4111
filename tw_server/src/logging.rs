//! Structured logging configuration.
//!
//! The library logs through the `log` facade; `init` installs a tracing
//! subscriber that also captures those records.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when `RUST_LOG` isn't set.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Builds the filter from `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVES`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Initialize structured logging
///
/// Configurable log levels via RUST_LOG env var.
///
/// # Example
///
/// ```no_run
/// logging::init();
/// tracing::info!("Server starting");
/// ```
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}
