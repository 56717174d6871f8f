//! Outcome of redirect URI validation

use serde::Serialize;

/// Result of checking a client-supplied redirect URI
///
/// `validated_uri` is either the approved client URI (verbatim) or the safe
/// fallback base URL. `reason` is present when the URI was rejected or when
/// no URI was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectValidationResult {
    pub is_valid: bool,
    pub validated_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RedirectValidationResult {
    /// An approved redirect target.
    #[must_use]
    pub fn valid(validated_uri: impl Into<String>) -> Self {
        Self { is_valid: true, validated_uri: validated_uri.into(), reason: None }
    }

    /// No URI was supplied, so the expected base URL is used.
    #[must_use]
    pub fn defaulted(base_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { is_valid: true, validated_uri: base_url.into(), reason: Some(reason.into()) }
    }

    /// A rejected redirect target with the fallback to use instead.
    #[must_use]
    pub fn invalid(fallback: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { is_valid: false, validated_uri: fallback.into(), reason: Some(reason.into()) }
    }
}
