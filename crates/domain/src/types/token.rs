//! OAuth 2.0 token types
//!
//! `TokenResponse` is the wire shape returned by a token endpoint (RFC 6749
//! §5.1); `TokenSet` is what the callback hands to the session collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token response from the authorization server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Tokens issued at the end of a successful code exchange
///
/// Same content as [`TokenResponse`] plus an absolute expiry computed at
/// receipt time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (JWT) containing user claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    pub token_type: String,

    /// Absolute expiration timestamp (UTC), when the provider sent `expires_in`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Build from a token response received at `received_at`.
    #[must_use]
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| received_at + chrono::Duration::seconds(secs));

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            token_type: response.token_type,
            expires_at,
            scope: response.scope,
        }
    }

    /// Check if the access token is expired or will expire within the
    /// threshold. Tokens without an expiry are never considered expired.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self::from_response(response, Utc::now())
    }
}
