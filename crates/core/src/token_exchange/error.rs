//! Errors produced by the authorization code grant

use ssogate_domain::{ExtractedError, SsoError};
use thiserror::Error;

/// Failure of an authorization code grant.
///
/// Adapters produce these; the core passes them through untouched so
/// callers can branch on OAuth error codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("state mismatch: authorization response state does not match the expected state")]
    StateMismatch,

    #[error("issuer mismatch in authorization response: expected {expected}, got {actual}")]
    IssuerMismatch { expected: String, actual: String },

    #[error("authorization response is missing the '{0}' parameter")]
    MissingParameter(String),

    #[error("invalid redirect_uri: {0}")]
    InvalidRedirectUri(String),

    #[error("OAuth error response: {error}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    OAuth { error: String, description: Option<String>, status: Option<u16> },

    #[error("invalid response from token endpoint (HTTP {status}, content-type {content_type}): expected a JSON token response")]
    InvalidResponse { status: u16, content_type: String, body: String },

    #[error("invalid ID token: {0}")]
    InvalidIdToken(String),

    #[error("unexpected JWT claim value '{claim}': expected {expected}, got {actual}")]
    UnexpectedClaim { claim: String, expected: String, actual: String },

    #[error("refusing plain HTTP token endpoint without the insecure transport opt-in")]
    InsecureTransport,

    #[error("token request failed: {0}")]
    Transport(ExtractedError),
}

impl GrantError {
    /// Stable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StateMismatch => "state_mismatch",
            Self::IssuerMismatch { .. } => "issuer_mismatch",
            Self::MissingParameter(_) => "missing_parameter",
            Self::InvalidRedirectUri(_) => "invalid_redirect_uri",
            Self::OAuth { .. } => "oauth_error",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::InvalidIdToken(_) => "invalid_id_token",
            Self::UnexpectedClaim { .. } => "unexpected_claim",
            Self::InsecureTransport => "insecure_transport",
            Self::Transport(_) => "transport",
        }
    }

    /// Normalized view for logging and pattern matching.
    #[must_use]
    pub fn extract(&self) -> ExtractedError {
        if let Self::Transport(inner) = self {
            return inner.clone();
        }

        let base = ExtractedError::new(self.kind(), self.to_string()).with_code(self.kind());
        match self {
            Self::OAuth { error, description, status } => {
                let extracted = base.with_oauth_error(error.clone(), description.clone());
                match status {
                    Some(status) => extracted.with_status(*status, None),
                    None => extracted,
                }
            }
            Self::InvalidResponse { status, content_type, body } => base
                .with_status(*status, None)
                .with_response_body(body)
                .with_response_headers(vec![("content-type".to_string(), content_type.clone())]),
            Self::UnexpectedClaim { claim, expected, actual } => base
                .with_property("claim", claim.clone())
                .with_property("expected", expected.clone())
                .with_property("actual", actual.clone()),
            Self::IssuerMismatch { expected, actual } => base
                .with_property("expected", expected.clone())
                .with_property("actual", actual.clone()),
            _ => base,
        }
    }
}

impl From<GrantError> for SsoError {
    fn from(err: GrantError) -> Self {
        match err {
            GrantError::Transport(_) => Self::Network(err.to_string()),
            _ => Self::TokenExchange(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_display() {
        let err = GrantError::OAuth {
            error: "invalid_grant".into(),
            description: Some("code expired".into()),
            status: Some(400),
        };
        assert_eq!(err.to_string(), "OAuth error response: invalid_grant (code expired)");

        let extracted = err.extract();
        assert_eq!(extracted.error.as_deref(), Some("invalid_grant"));
        assert_eq!(extracted.status, Some(400));
    }

    #[test]
    fn test_invalid_response_extract() {
        let err = GrantError::InvalidResponse {
            status: 200,
            content_type: "text/html".into(),
            body: "<html>login</html>".into(),
        };
        let extracted = err.extract();
        assert_eq!(extracted.header("Content-Type"), Some("text/html"));
        assert_eq!(extracted.response_body.as_deref(), Some("<html>login</html>"));
        assert_eq!(extracted.code.as_deref(), Some("invalid_response"));
    }

    #[test]
    fn test_transport_extract_is_passthrough() {
        let inner = ExtractedError::new("reqwest::Error", "connection reset");
        let err = GrantError::Transport(inner.clone());
        assert_eq!(err.extract(), inner);
        assert!(matches!(SsoError::from(err), SsoError::Network(_)));
    }
}
