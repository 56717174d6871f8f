//! Redirect URI validation
//!
//! A client-supplied redirect URI is accepted when it points at the origin
//! the request arrived on, or at one of the configured allowed origins.
//! Hostnames compare case-insensitively and exactly; ports are ignored for
//! the expected origin. HTTPS satisfies an expected HTTP origin (TLS
//! terminating proxies), never the reverse.

use ssogate_domain::RedirectValidationResult;
use tracing::{debug, warn};
use url::Url;

/// Validate `provided_uri` against the expected origin and allow-list.
///
/// `expected_protocol` may carry a trailing `:`. `expected_host` may carry
/// a port. The returned `validated_uri` is the caller's input verbatim on
/// success and the expected base URL otherwise.
#[must_use]
pub fn validate_redirect_uri(
    provided_uri: Option<&str>,
    expected_protocol: &str,
    expected_host: Option<&str>,
    allowed_origins: Option<&[String]>,
) -> RedirectValidationResult {
    let expected_protocol = normalize_protocol(expected_protocol);
    let expected_base = expected_host
        .filter(|host| !host.is_empty())
        .map(|host| format!("{expected_protocol}://{host}"));

    let Some(provided) = provided_uri.filter(|uri| !uri.is_empty()) else {
        return match expected_base {
            Some(base) => RedirectValidationResult::defaulted(
                base,
                "No redirect_uri provided; using expected base URL",
            ),
            None => RedirectValidationResult::invalid(
                "",
                "No redirect_uri provided and no expected host available",
            ),
        };
    };

    let fallback = expected_base.clone().unwrap_or_default();

    let Ok(provided_url) = Url::parse(provided) else {
        warn!(redirect_uri = provided, "Rejected malformed redirect_uri");
        return RedirectValidationResult::invalid(fallback, "Invalid redirect_uri format");
    };
    let provided_protocol = provided_url.scheme().to_ascii_lowercase();
    let provided_hostname = hostname(&provided_url);

    let expected_hostname = expected_base
        .as_deref()
        .and_then(|base| Url::parse(base).ok())
        .map(|url| hostname(&url));

    if let Some(expected_hostname) = expected_hostname.as_deref() {
        if provided_hostname == expected_hostname
            && protocol_satisfies(&expected_protocol, &provided_protocol)
        {
            debug!(redirect_uri = provided, "redirect_uri matches request origin");
            return RedirectValidationResult::valid(provided);
        }
    }

    if let Some(origins) = allowed_origins {
        for origin in origins {
            if matches_allowed_origin(provided, &provided_url, origin) {
                debug!(redirect_uri = provided, allowed_origin = %origin, "redirect_uri matches allowed origin");
                return RedirectValidationResult::valid(provided);
            }
        }
    }

    let reason = format!(
        "Redirect URI hostname/protocol mismatch: expected {expected_protocol}://{}, got {provided_protocol}://{provided_hostname}",
        expected_hostname.as_deref().unwrap_or("<unknown>"),
    );
    warn!(
        redirect_uri = provided,
        expected_protocol = %expected_protocol,
        expected_host = expected_host.unwrap_or_default(),
        "Rejected redirect_uri"
    );
    RedirectValidationResult::invalid(fallback, reason)
}

/// Try the three allow-list strategies in order: exact or path prefix,
/// origin tuple, then hostname and protocol ignoring the port.
fn matches_allowed_origin(provided: &str, provided_url: &Url, origin: &str) -> bool {
    let Ok(allowed_url) = Url::parse(origin) else {
        warn!(allowed_origin = origin, "Skipping malformed allowed origin");
        return false;
    };

    if provided == origin {
        return true;
    }
    let has_path = !matches!(allowed_url.path(), "" | "/");
    if has_path && origin.ends_with('/') && provided.starts_with(origin) {
        return true;
    }

    let allowed_protocol = allowed_url.scheme().to_ascii_lowercase();
    let provided_protocol = provided_url.scheme().to_ascii_lowercase();
    let protocol_ok = protocol_satisfies(&allowed_protocol, &provided_protocol);
    let hostname_ok = hostname(&allowed_url) == hostname(provided_url);

    if protocol_ok && hostname_ok && allowed_url.port() == provided_url.port() {
        return true;
    }

    // Hostname-only match, port ignored. Broader than the origin tuple check.
    protocol_ok && hostname_ok
}

fn protocol_satisfies(expected: &str, provided: &str) -> bool {
    expected == provided || (expected == "http" && provided == "https")
}

fn normalize_protocol(protocol: &str) -> String {
    protocol.trim().trim_end_matches(':').to_ascii_lowercase()
}

fn hostname(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_ascii_lowercase()
}
