//! Diagnostics for failed code exchanges.
//!
//! These only inspect the normalized error; they never change what the
//! caller receives.

use ssogate_domain::ExtractedError;

const MALFORMED_RESPONSE_MARKERS: &[&str] = &[
    "invalid response",
    "unexpected token",
    "expected value",
    "not valid json",
    "expected a json",
    "error decoding response body",
];

/// Likely causes of a non-JSON or malformed token endpoint response.
///
/// Returns `None` when `err` does not look like a malformed response.
#[must_use]
pub fn malformed_response_checklist(err: &ExtractedError) -> Option<Vec<String>> {
    let text = err.diagnostic_text();
    let content_type = err.header("content-type").unwrap_or_default().to_ascii_lowercase();
    let non_json_body = !content_type.is_empty() && !content_type.contains("json");
    if !non_json_body && !MALFORMED_RESPONSE_MARKERS.iter().any(|m| text.contains(m)) {
        return None;
    }

    let mut checklist = vec![
        "The token endpoint URL may be wrong (check the discovery document or explicit tokenEndpoint)".to_string(),
        "The provider may have returned an HTML error or login page instead of JSON".to_string(),
        "The client ID or client secret may be invalid".to_string(),
        "A reverse proxy or firewall may be intercepting the request".to_string(),
        "The provider may be returning malformed JSON".to_string(),
    ];
    if content_type.contains("html") {
        checklist.insert(0, format!("Response content-type was '{content_type}'"));
    }
    Some(checklist)
}

/// Hint for an `iss` claim that differs from the configured issuer.
///
/// Returns `None` unless `err` is an unexpected JWT claim error.
#[must_use]
pub fn issuer_mismatch_hint(err: &ExtractedError, configured_issuer: Option<&str>) -> Option<String> {
    let text = err.diagnostic_text();
    let is_claim_error = err.additional_properties.contains_key("claim")
        || (text.contains("unexpected") && text.contains("claim"));
    if !is_claim_error {
        return None;
    }

    let claim = err.additional_properties.get("claim").map_or("unknown", String::as_str);
    let actual = err.additional_properties.get("actual").map_or("unknown", String::as_str);
    let configured = configured_issuer.unwrap_or("<not configured>");
    Some(format!(
        "ID token claim '{claim}' did not match. Token issuer was '{actual}' but the provider is configured with issuer '{configured}'. \
         The configured issuer must exactly match the issuer in the provider's discovery document"
    ))
}
