//! Reconstruction of the callback URL presented to the token endpoint

use ssogate_domain::constants::PRESERVED_CALLBACK_PARAMS;
use url::Url;

use super::error::GrantError;

/// Build the URL the grant validates: `redirect_uri` with `code` and
/// `state` set, auxiliary provider parameters copied from the inbound
/// callback when absent, and `iss` filled from the configured issuer.
///
/// # Errors
/// [`GrantError::InvalidRedirectUri`] if `redirect_uri` or the inbound
/// callback URL does not parse.
pub fn build_token_request_url(
    redirect_uri: &str,
    code: &str,
    state: &str,
    full_callback_url: Option<&str>,
    issuer: Option<&str>,
) -> Result<Url, GrantError> {
    let mut url =
        Url::parse(redirect_uri).map_err(|e| GrantError::InvalidRedirectUri(format!("{redirect_uri}: {e}")))?;

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "code" && key != "state")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.push(("code".to_string(), code.to_string()));
    pairs.push(("state".to_string(), state.to_string()));

    if let Some(callback) = full_callback_url {
        let callback = Url::parse(callback)
            .map_err(|e| GrantError::InvalidRedirectUri(format!("{callback}: {e}")))?;
        for (key, value) in callback.query_pairs() {
            let preserved = PRESERVED_CALLBACK_PARAMS.iter().any(|param| *param == key);
            if preserved && !pairs.iter().any(|(existing, _)| *existing == key) {
                pairs.push((key.into_owned(), value.into_owned()));
            }
        }
    }

    if let Some(issuer) = issuer.filter(|issuer| !issuer.is_empty()) {
        if !pairs.iter().any(|(key, _)| key == "iss") {
            pairs.push(("iss".to_string(), issuer.to_string()));
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url)
}
