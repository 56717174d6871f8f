//! Logging bootstrap and structured request outcome helpers

use std::time::Duration;

use ssogate_domain::SsoError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting the output format (`json` or plain).
pub const LOG_FORMAT_ENV: &str = "SSOGATE_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`). Setting
/// `SSOGATE_LOG_FORMAT=json` switches to one JSON object per event.
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if result.is_err() {
        warn!("tracing subscriber already installed");
    }
}

/// Log the outcome of a route with structured fields.
///
/// `route` and `provider_id` must not carry secrets. `error` is a stable
/// label from [`error_label`].
#[inline]
pub fn log_request_outcome(
    route: &str,
    provider_id: Option<&str>,
    elapsed: Duration,
    error: Option<&'static str>,
) {
    let duration_ms = elapsed.as_millis() as u64;
    let provider_id = provider_id.unwrap_or_default();

    match error {
        None => info!(route, provider_id, duration_ms, "request_success"),
        Some(error_type) => {
            warn!(route, provider_id, duration_ms, error_type, "request_failure");
        }
    }
}

/// Convert an `SsoError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &SsoError) -> &'static str {
    error.label()
}
