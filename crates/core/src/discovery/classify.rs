//! Failure classification for discovery requests.
//!
//! HTTP clients surface failures in many shapes (status codes, OS error
//! codes, nested causes), so classification looks only at the status and
//! the flattened text of an [`ExtractedError`], never at concrete types.

use ssogate_domain::ExtractedError;

use super::error::{DiscoveryError, DiscoveryErrorKind};

const DNS_PATTERNS: &[&str] = &[
    "enotfound",
    "eai_again",
    "getaddrinfo",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];

const TIMEOUT_PATTERNS: &[&str] = &["etimedout", "timed out", "timeout", "deadline has elapsed"];

const SSL_PATTERNS: &[&str] = &[
    "certificate",
    "cert_",
    "ssl",
    "tls",
    "self signed",
    "self-signed",
    "unable to verify",
    "unknownissuer",
    "handshake",
];

const CONNECTION_PATTERNS: &[&str] = &[
    "econnrefused",
    "econnreset",
    "connection refused",
    "connection reset",
    "connection closed",
    "error trying to connect",
    "tcp connect error",
    "network is unreachable",
    "ehostunreach",
];

const JSON_PATTERNS: &[&str] = &[
    "invalid json",
    "unexpected token",
    "expected value",
    "error decoding response body",
    "json",
];

const DOCUMENT_PATTERNS: &[&str] = &[
    "missing required field",
    "invalid discovery document",
    "issuer mismatch",
    "unexpected issuer",
];

fn contains_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| text.contains(pattern))
}

/// Lowercased diagnostic text with URLs removed.
///
/// reqwest echoes the request URL in its messages, and a hostname such as
/// `ssl-idp.example.com` must not read as a TLS failure.
fn classification_text(err: &ExtractedError) -> String {
    err.diagnostic_text()
        .split_whitespace()
        .filter(|word| !word.contains("://"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Category for a discovery failure.
///
/// Status codes win over text, and a timeout code wins over the rest.
/// Document problems are checked before JSON problems because serde
/// messages for missing fields mention neither. A connect failure whose
/// causes name no specific reason is a connection error.
#[must_use]
pub fn classify_error(err: &ExtractedError) -> DiscoveryErrorKind {
    match err.status {
        Some(404) => return DiscoveryErrorKind::DiscoveryNotFound,
        Some(401 | 403) => return DiscoveryErrorKind::AuthenticationError,
        Some(status) if !(200..300).contains(&status) => {
            return DiscoveryErrorKind::HttpStatusError
        }
        _ => {}
    }

    let code = err.code.as_deref();
    if code == Some("ETIMEDOUT") {
        return DiscoveryErrorKind::TimeoutError;
    }

    let text = classification_text(err);
    if contains_any(&text, DNS_PATTERNS) {
        DiscoveryErrorKind::DnsError
    } else if contains_any(&text, TIMEOUT_PATTERNS) {
        DiscoveryErrorKind::TimeoutError
    } else if contains_any(&text, SSL_PATTERNS) {
        DiscoveryErrorKind::SslError
    } else if contains_any(&text, CONNECTION_PATTERNS) {
        DiscoveryErrorKind::ConnectionError
    } else if contains_any(&text, DOCUMENT_PATTERNS) {
        DiscoveryErrorKind::InvalidOidcDocument
    } else if contains_any(&text, JSON_PATTERNS) {
        DiscoveryErrorKind::InvalidJson
    } else if code == Some("CONNECT") {
        DiscoveryErrorKind::ConnectionError
    } else if text.contains("404") || text.contains("not found") {
        DiscoveryErrorKind::DiscoveryNotFound
    } else if text.contains("401") || text.contains("403") || text.contains("unauthorized") {
        DiscoveryErrorKind::AuthenticationError
    } else {
        DiscoveryErrorKind::Unknown
    }
}

/// Administrator-facing message for `kind`.
#[must_use]
pub fn message_for(
    kind: DiscoveryErrorKind,
    discovery_url: &str,
    status: Option<u16>,
    raw: &str,
) -> String {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    match kind {
        DiscoveryErrorKind::MissingIssuer => "Issuer URL is required".to_string(),
        DiscoveryErrorKind::InvalidUrl => format!("Invalid issuer URL: {raw}"),
        DiscoveryErrorKind::DnsError => format!(
            "Cannot resolve the provider hostname. Check the issuer URL for typos and make sure the server can reach DNS. Tried {discovery_url}"
        ),
        DiscoveryErrorKind::ConnectionError => format!(
            "Connection to the provider was refused or reset at {discovery_url}. Check that the provider is running and reachable from this server"
        ),
        DiscoveryErrorKind::TimeoutError => format!(
            "Timed out fetching the discovery document from {discovery_url}. The provider may be slow or blocked by a firewall"
        ),
        DiscoveryErrorKind::DiscoveryNotFound => format!(
            "OIDC discovery document not found (404) at {discovery_url}. Verify the issuer URL is the provider's issuer and has no trailing slash"
        ),
        DiscoveryErrorKind::AuthenticationError => format!(
            "The provider rejected the discovery request with HTTP {status} at {discovery_url}. The discovery endpoint must be publicly readable"
        ),
        DiscoveryErrorKind::HttpStatusError => {
            format!("The provider returned HTTP {status} for {discovery_url}")
        }
        DiscoveryErrorKind::SslError => format!(
            "TLS certificate verification failed for {discovery_url}. The provider must present a certificate trusted by this server"
        ),
        DiscoveryErrorKind::InvalidJson => format!(
            "The discovery endpoint at {discovery_url} did not return valid JSON. Check that the issuer URL points at an OIDC provider"
        ),
        DiscoveryErrorKind::InvalidOidcDocument => format!(
            "The discovery document at {discovery_url} is not a valid OIDC configuration: {raw}"
        ),
        DiscoveryErrorKind::Unknown => raw.to_string(),
    }
}

/// Classify `err` and attach the URL, status and raw text.
#[must_use]
pub fn to_discovery_error(err: &ExtractedError, discovery_url: &str) -> DiscoveryError {
    let kind = classify_error(err);
    DiscoveryError::new(kind, message_for(kind, discovery_url, err.status, &err.message))
        .with_discovery_url(discovery_url)
        .with_raw_error(err.message.clone())
        .with_status(err.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(message: &str) -> ExtractedError {
        ExtractedError::new("reqwest::Error", message)
    }

    #[test]
    fn test_status_classification() {
        let err = |status| text("HTTP error").with_status(status, None);
        assert_eq!(classify_error(&err(404)), DiscoveryErrorKind::DiscoveryNotFound);
        assert_eq!(classify_error(&err(401)), DiscoveryErrorKind::AuthenticationError);
        assert_eq!(classify_error(&err(403)), DiscoveryErrorKind::AuthenticationError);
        assert_eq!(classify_error(&err(500)), DiscoveryErrorKind::HttpStatusError);
    }

    #[test]
    fn test_text_classification() {
        let cases = [
            ("getaddrinfo ENOTFOUND idp.invalid", DiscoveryErrorKind::DnsError),
            ("dns error: failed to lookup address information", DiscoveryErrorKind::DnsError),
            ("connect ECONNREFUSED 127.0.0.1:8080", DiscoveryErrorKind::ConnectionError),
            ("tcp connect error: Connection refused (os error 111)", DiscoveryErrorKind::ConnectionError),
            ("operation timed out", DiscoveryErrorKind::TimeoutError),
            ("invalid peer certificate: UnknownIssuer", DiscoveryErrorKind::SslError),
            ("Unexpected token < in JSON at position 0", DiscoveryErrorKind::InvalidJson),
            ("expected value at line 1 column 1", DiscoveryErrorKind::InvalidJson),
            ("issuer mismatch: expected a, got b", DiscoveryErrorKind::InvalidOidcDocument),
            ("something odd happened", DiscoveryErrorKind::Unknown),
        ];
        for (message, expected) in cases {
            assert_eq!(classify_error(&text(message)), expected, "{message}");
        }
    }

    #[test]
    fn test_cause_chain_is_searched() {
        let mut err = text("error sending request for url (https://idp.invalid/.well-known/openid-configuration)");
        err.cause_chain.push("client error (Connect)".into());
        err.cause_chain.push("dns error: Name or service not known".into());
        assert_eq!(classify_error(&err), DiscoveryErrorKind::DnsError);
    }

    #[test]
    fn test_messages_include_url() {
        let url = "https://idp.example.com/.well-known/openid-configuration";
        let err = to_discovery_error(&text("HTTP error").with_status(404, None), url);
        assert_eq!(err.kind, DiscoveryErrorKind::DiscoveryNotFound);
        assert!(err.message.contains(url));
        assert_eq!(err.discovery_url.as_deref(), Some(url));

        let status = message_for(DiscoveryErrorKind::HttpStatusError, url, Some(502), "");
        assert!(status.contains("502"));

        assert_eq!(message_for(DiscoveryErrorKind::Unknown, url, None, "raw text"), "raw text");
    }

    #[test]
    fn test_hostname_in_url_does_not_drive_classification() {
        let mut refused = text(
            "error sending request for url (https://ssl-idp.example.com/.well-known/openid-configuration)",
        )
        .with_code("CONNECT");
        refused.cause_chain.push("tcp connect error: Connection refused (os error 111)".into());
        assert_eq!(classify_error(&refused), DiscoveryErrorKind::ConnectionError);

        let bare = text("error sending request for url (https://tls.cert-handshake.example/x)")
            .with_code("CONNECT");
        assert_eq!(classify_error(&bare), DiscoveryErrorKind::ConnectionError);

        let mut untrusted = text("error sending request for url (https://idp.example.com/)")
            .with_code("CONNECT");
        untrusted.cause_chain.push("invalid peer certificate: UnknownIssuer".into());
        assert_eq!(classify_error(&untrusted), DiscoveryErrorKind::SslError);
    }

    #[test]
    fn test_timeout_code_wins_over_text() {
        let err = text("error sending request for url (https://ssl.example.com/)")
            .with_code("ETIMEDOUT");
        assert_eq!(classify_error(&err), DiscoveryErrorKind::TimeoutError);
    }
}
