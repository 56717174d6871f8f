//! Token exchange orchestration

use std::sync::Arc;

use ssogate_domain::{OidcProvider, TokenResponse};
use tracing::{debug, error, info, instrument, warn};

use super::callback_url::build_token_request_url;
use super::diagnostics::{issuer_mismatch_hint, malformed_response_checklist};
use super::error::GrantError;
use super::ports::{GrantRequest, TokenEndpointClient};
use crate::discovery::ProviderConfiguration;

/// Runs the code grant for a validated callback.
pub struct TokenExchangeService {
    client: Arc<dyn TokenEndpointClient>,
}

impl TokenExchangeService {
    pub fn new(client: Arc<dyn TokenEndpointClient>) -> Self {
        Self { client }
    }

    /// Exchange `code` for tokens.
    ///
    /// `redirect_uri` must be the value sent to the authorization endpoint.
    /// `full_callback_url` is the inbound callback, used only to copy
    /// auxiliary provider parameters.
    ///
    /// # Errors
    /// The grant's [`GrantError`], exactly as the client produced it.
    #[instrument(skip_all, fields(provider_id = %provider.id))]
    pub async fn exchange_code_for_tokens(
        &self,
        config: &ProviderConfiguration,
        provider: &OidcProvider,
        code: &str,
        state: &str,
        redirect_uri: &str,
        full_callback_url: Option<&str>,
    ) -> Result<TokenResponse, GrantError> {
        let issuer = provider.issuer.as_deref().or(config.issuer.as_deref());
        let callback_url = build_token_request_url(redirect_uri, code, state, full_callback_url, issuer)?;

        let allow_insecure = config.allow_insecure
            || issuer.is_some_and(|issuer| issuer.starts_with("http://"));
        if allow_insecure {
            warn!(token_endpoint = %config.token_endpoint, "Allowing insecure HTTP token exchange for this request");
        }

        let request = GrantRequest {
            token_endpoint: config.token_endpoint.clone(),
            callback_url: callback_url.to_string(),
            redirect_uri: redirect_uri.to_string(),
            expected_state: state.to_string(),
            expected_issuer: issuer.map(str::to_string),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_method: config.client_auth_method,
            allow_insecure,
        };
        debug!(
            token_endpoint = %request.token_endpoint,
            auth_method = request.auth_method.as_str(),
            "Starting authorization code grant"
        );

        match self.client.authorization_code_grant(&request).await {
            Ok(tokens) => {
                info!(has_id_token = tokens.id_token.is_some(), "Authorization code exchanged");
                Ok(tokens)
            }
            Err(err) => {
                log_diagnostics(&err, &request);
                Err(err)
            }
        }
    }
}

fn log_diagnostics(err: &GrantError, request: &GrantRequest) {
    let extracted = err.extract();
    error!(
        error_kind = err.kind(),
        error = %extracted.message,
        status = extracted.status,
        oauth_error = extracted.error.as_deref().unwrap_or_default(),
        oauth_error_description = extracted.error_description.as_deref().unwrap_or_default(),
        cause_chain = ?extracted.cause_chain,
        token_endpoint = %request.token_endpoint,
        "Token exchange failed"
    );

    if let Some(checklist) = malformed_response_checklist(&extracted) {
        error!(
            response_body = extracted.response_body.as_deref().unwrap_or_default(),
            checklist = ?checklist,
            "Token endpoint returned a non-JSON or malformed response"
        );
    }

    if let Some(hint) = issuer_mismatch_hint(&extracted, request.expected_issuer.as_deref()) {
        warn!(hint = %hint, "Possible issuer mismatch");
    }
}
