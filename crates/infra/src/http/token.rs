//! reqwest adapter for the token endpoint port
//!
//! Performs the checks an OIDC client library runs on the authorization
//! response (state, `error`, `iss`) before posting the code, then checks
//! the ID token claims of the response.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use ssogate_common::{constant_time_eq, Clock, SystemClock};
use ssogate_core::{
    decode_id_token_claims, validate_id_token_claims, ClientAuthMethod, GrantError, GrantRequest,
    TokenEndpointClient,
};
use ssogate_domain::{ExtractedError, TokenResponse};
use tracing::{debug, warn};
use url::Url;

use super::client::{transport_allowed, HttpClient};
use crate::errors::extract_http_error;

/// OAuth error document (RFC 6749 §5.2)
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Runs the authorization code grant over HTTP.
#[derive(Clone)]
pub struct ReqwestTokenClient {
    http: HttpClient,
    clock: Arc<dyn Clock>,
}

impl ReqwestTokenClient {
    pub fn new(http: HttpClient) -> Self {
        Self::with_clock(http, Arc::new(SystemClock))
    }

    /// Use `clock` for ID token expiry checks.
    pub fn with_clock(http: HttpClient, clock: Arc<dyn Clock>) -> Self {
        Self { http, clock }
    }

    fn check_id_token(&self, tokens: &TokenResponse, request: &GrantRequest) -> Result<(), GrantError> {
        let Some(id_token) = tokens.id_token.as_deref() else {
            return Ok(());
        };
        let claims = decode_id_token_claims(id_token)?;
        validate_id_token_claims(
            &claims,
            request.expected_issuer.as_deref(),
            &request.client_id,
            self.clock.seconds_since_epoch(),
        )
    }
}

#[async_trait]
impl TokenEndpointClient for ReqwestTokenClient {
    async fn authorization_code_grant(
        &self,
        request: &GrantRequest,
    ) -> Result<TokenResponse, GrantError> {
        let code = check_authorization_response(request)?;

        let endpoint = Url::parse(&request.token_endpoint).map_err(|e| {
            GrantError::Transport(
                ExtractedError::from_error(&e).with_property("url", request.token_endpoint.as_str()),
            )
        })?;
        if !transport_allowed(&endpoint, request.allow_insecure) {
            return Err(GrantError::InsecureTransport);
        }

        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code),
            ("redirect_uri", request.redirect_uri.clone()),
            ("client_id", request.client_id.clone()),
        ];
        if request.auth_method == ClientAuthMethod::ClientSecretPost {
            if let Some(secret) = &request.client_secret {
                form.push(("client_secret", secret.expose().to_string()));
            }
        }

        let builder = self
            .http
            .request(Method::POST, endpoint.clone())
            .header(ACCEPT, "application/json")
            .form(&form);
        let response = self
            .http
            .send(builder)
            .await
            .map_err(|e| GrantError::Transport(extract_http_error(&e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| GrantError::Transport(extract_http_error(&e)))?;
        debug!(token_endpoint = %endpoint, %status, %content_type, "Token endpoint responded");

        let tokens = parse_token_response(status.as_u16(), &content_type, body)?;
        self.check_id_token(&tokens, request)?;
        Ok(tokens)
    }
}

/// Validate the callback parameters and return the authorization code.
fn check_authorization_response(request: &GrantRequest) -> Result<String, GrantError> {
    let callback = Url::parse(&request.callback_url)
        .map_err(|e| GrantError::InvalidRedirectUri(format!("{}: {e}", request.callback_url)))?;
    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };

    let state = param("state").ok_or_else(|| GrantError::MissingParameter("state".into()))?;
    if !constant_time_eq(state.as_bytes(), request.expected_state.as_bytes()) {
        warn!("Authorization response state does not match the expected state");
        return Err(GrantError::StateMismatch);
    }

    if let Some(error) = param("error") {
        return Err(GrantError::OAuth { error, description: param("error_description"), status: None });
    }

    if let (Some(expected), Some(actual)) = (request.expected_issuer.as_deref(), param("iss")) {
        if actual != expected {
            return Err(GrantError::IssuerMismatch { expected: expected.to_string(), actual });
        }
    }

    param("code").ok_or_else(|| GrantError::MissingParameter("code".into()))
}

/// Interpret a token endpoint response.
fn parse_token_response(status: u16, content_type: &str, body: String) -> Result<TokenResponse, GrantError> {
    if let Ok(oauth) = serde_json::from_str::<OAuthErrorBody>(&body) {
        return Err(GrantError::OAuth {
            error: oauth.error,
            description: oauth.error_description,
            status: Some(status),
        });
    }

    let invalid = |body: String| GrantError::InvalidResponse {
        status,
        content_type: content_type.to_string(),
        body,
    };

    if !(200..300).contains(&status) || !content_type.to_ascii_lowercase().contains("json") {
        return Err(invalid(body));
    }

    serde_json::from_str::<TokenResponse>(&body).map_err(|_| invalid(body))
}
