//! OIDC issuer URL pattern.
//!
//! Issuers are concatenated with `/.well-known/openid-configuration` during
//! discovery. A trailing slash yields `//.well-known/...`, which several
//! providers (Google among them) answer with 404, so it is rejected here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::validators::FieldValidator;

/// Raw issuer pattern: `http`/`https`, no whitespace, no trailing slash.
pub const ISSUER_URL_PATTERN: &str = r"^https?://[^/\s]+(?:/[^/\s]*)*[^/\s]$";

/// Compiled [`ISSUER_URL_PATTERN`].
pub static ISSUER_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(ISSUER_URL_PATTERN).expect("ISSUER_URL_REGEX should compile - this is a bug")
});

/// Issuers accepted by [`is_valid_issuer_url`].
pub const VALID_ISSUER_EXAMPLES: &[&str] = &[
    "https://accounts.google.com",
    "https://auth.example.com",
    "https://dev-123456.okta.com/oauth2/default",
    "https://login.microsoftonline.com/common/v2.0",
    "http://localhost:8080/realms/master",
];

/// Issuers rejected by [`is_valid_issuer_url`].
pub const INVALID_ISSUER_EXAMPLES: &[&str] = &[
    "https://accounts.google.com/",
    "https://auth.example.com/.well-known/",
    "ftp://auth.example.com",
    "https://auth example.com",
    "accounts.google.com",
    "",
];

/// Whether `url` is a well-formed issuer without a trailing slash.
#[must_use]
pub fn is_valid_issuer_url(url: &str) -> bool {
    ISSUER_URL_REGEX.is_match(url)
}

/// [`FieldValidator`] wrapper around [`is_valid_issuer_url`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuerUrlValidator;

impl FieldValidator<str> for IssuerUrlValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if is_valid_issuer_url(value) {
            return Ok(());
        }
        if value.ends_with('/') {
            return Err(format!(
                "Issuer URL '{value}' must not end with a trailing slash"
            ));
        }
        Err(format!(
            "Issuer URL '{value}' must be an http(s) URL without whitespace"
        ))
    }
}

impl FieldValidator<String> for IssuerUrlValidator {
    fn validate(&self, value: &String) -> Result<(), String> {
        FieldValidator::<str>::validate(self, value.as_str())
    }
}
