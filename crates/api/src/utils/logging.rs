use std::time::Duration;

use calsync_domain::{CalSyncError, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// The level filter comes from `RUST_LOG` (default `info`); `config.json`
/// switches the formatter to one JSON object per line. Calling this twice is
/// harmless: the second install attempt is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if installed.is_ok() {
        info!(json = config.json, "tracing initialised");
    }
}

/// Log the outcome of a request handler with structured fields.
///
/// `route` must be a stable identifier; failures carry the error label.
#[inline]
pub fn log_request_outcome(route: &str, elapsed: Duration, error: Option<&CalSyncError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(route, duration_ms, "request_success"),
        Some(err) => {
            warn!(route, duration_ms, error_type = err.label(), error = %err, "request_failure")
        }
    }
}
