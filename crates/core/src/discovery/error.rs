//! Discovery failure categories

use std::fmt;

use serde::Serialize;
use ssogate_domain::SsoError;
use thiserror::Error;

/// Category of a discovery or provider validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoveryErrorKind {
    MissingIssuer,
    InvalidUrl,
    DnsError,
    ConnectionError,
    TimeoutError,
    DiscoveryNotFound,
    AuthenticationError,
    HttpStatusError,
    SslError,
    InvalidJson,
    InvalidOidcDocument,
    Unknown,
}

impl DiscoveryErrorKind {
    /// Wire code, e.g. `DNS_ERROR`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIssuer => "MISSING_ISSUER",
            Self::InvalidUrl => "INVALID_URL",
            Self::DnsError => "DNS_ERROR",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::DiscoveryNotFound => "DISCOVERY_NOT_FOUND",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::HttpStatusError => "HTTP_STATUS_ERROR",
            Self::SslError => "SSL_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidOidcDocument => "INVALID_OIDC_DOCUMENT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DiscoveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified discovery failure.
///
/// `message` is safe to show to an administrator; `raw_error` keeps the
/// transport text for operators. Neither ever contains the client secret.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct DiscoveryError {
    pub kind: DiscoveryErrorKind,
    pub message: String,
    pub discovery_url: Option<String>,
    pub raw_error: Option<String>,
    pub status: Option<u16>,
}

impl DiscoveryError {
    pub fn new(kind: DiscoveryErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), discovery_url: None, raw_error: None, status: None }
    }

    #[must_use]
    pub fn with_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_raw_error(mut self, raw: impl Into<String>) -> Self {
        self.raw_error = Some(raw.into());
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }
}

impl From<DiscoveryError> for SsoError {
    fn from(err: DiscoveryError) -> Self {
        match err.kind {
            DiscoveryErrorKind::MissingIssuer | DiscoveryErrorKind::InvalidUrl => {
                Self::Config(err.message)
            }
            _ => Self::Discovery(err.message),
        }
    }
}
