//! OIDC sign-in orchestration

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ssogate_common::Clock;
use ssogate_domain::constants::CALLBACK_PATH;
use ssogate_domain::{OidcProvider, Result, SsoError, TokenSet};
use tracing::{info, instrument, warn};
use url::form_urlencoded::byte_serialize;
use url::Url;

use super::ports::ProviderRepository;
use crate::authorization::{evaluate_rules, AuthorizationDecision};
use crate::claims::{decode_id_token_claims, IdTokenClaims};
use crate::discovery::{DiscoveryService, ProviderConfiguration, ProviderValidation};
use crate::redirect::validate_redirect_uri;
use crate::request::{
    extract_request_info, validate_authorize_params, validate_callback_params, InboundRequest,
};
use crate::state::{extract_provider_from_state, SecureStateService, StateError};
use crate::token_exchange::TokenExchangeService;

/// Where to send the browser after `authorize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRedirect {
    /// Provider authorization URL
    pub location: String,
    /// Signed state token embedded in `location`
    pub state: String,
    /// Callback URI registered for this flow
    pub callback_uri: String,
}

/// Result of a successful callback.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub provider_id: String,
    pub client_state: String,
    /// Callback URI the code was issued for
    pub redirect_uri: String,
    pub tokens: TokenSet,
    pub claims: IdTokenClaims,
}

/// Canonical callback URI on the origin of `validated_uri`.
///
/// # Errors
/// [`SsoError::InvalidInput`] unless `validated_uri` is an absolute
/// http(s) URL.
pub fn callback_uri_for(validated_uri: &str) -> Result<String> {
    let url = Url::parse(validated_uri)
        .map_err(|_| SsoError::InvalidInput("Invalid redirect_uri format".to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SsoError::InvalidInput(format!(
            "Unsupported redirect_uri scheme '{}'",
            url.scheme()
        )));
    }
    Ok(format!("{}{CALLBACK_PATH}", url.origin().ascii_serialization()))
}

/// `{origin of base}/login#{key}={value}` with `value` form-encoded.
///
/// Falls back to a relative `/login` when `base` does not parse.
pub fn login_redirect(base: &str, key: &str, value: &str) -> String {
    let origin = Url::parse(base)
        .ok()
        .map(|url| url.origin())
        .filter(url::Origin::is_tuple)
        .map(|origin| origin.ascii_serialization())
        .unwrap_or_default();
    let value: String = byte_serialize(value.as_bytes()).collect();
    format!("{origin}/login#{key}={value}")
}

/// Runs the authorize and callback legs of the sign-in flow.
pub struct OidcAuthService {
    providers: Arc<dyn ProviderRepository>,
    state: Arc<SecureStateService>,
    discovery: Arc<DiscoveryService>,
    token_exchange: TokenExchangeService,
    clock: Arc<dyn Clock>,
}

impl OidcAuthService {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        state: Arc<SecureStateService>,
        discovery: Arc<DiscoveryService>,
        token_exchange: TokenExchangeService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { providers, state, discovery, token_exchange, clock }
    }

    pub const fn discovery(&self) -> &Arc<DiscoveryService> {
        &self.discovery
    }

    pub const fn state(&self) -> &Arc<SecureStateService> {
        &self.state
    }

    /// Validate the request and build the provider authorization URL.
    ///
    /// # Errors
    /// `InvalidInput` for missing parameters or a rejected redirect URI,
    /// `NotFound` for an unknown provider, `Discovery`/`Config` when the
    /// provider configuration cannot be resolved.
    #[instrument(skip_all, fields(provider_id = provider_id.unwrap_or_default()))]
    pub async fn authorize(
        &self,
        request: &InboundRequest,
        provider_id: Option<&str>,
        client_state: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<AuthorizeRedirect> {
        let params = validate_authorize_params(provider_id, client_state, redirect_uri)?;
        let provider = self.load_provider(&params.provider_id).await?;

        let info = extract_request_info(request);
        let allowed_origins = self.providers.default_allowed_origins().await?;
        let validation = validate_redirect_uri(
            Some(&params.redirect_uri),
            &info.protocol,
            Some(&info.host),
            Some(&allowed_origins),
        );
        if !validation.is_valid {
            let reason = validation.reason.unwrap_or_else(|| "Invalid redirect_uri".to_string());
            return Err(SsoError::InvalidInput(reason));
        }

        let callback_uri = callback_uri_for(&validation.validated_uri)?;
        let config = self.discovery.configuration(&provider).await?;
        let state =
            self.state.generate_secure_state(&provider.id, &params.state, Some(&callback_uri));
        let location = authorization_url(&config, &provider, &callback_uri, &state)?;

        info!(callback_uri = %callback_uri, "Redirecting to identity provider");
        Ok(AuthorizeRedirect { location, state, callback_uri })
    }

    /// Validate state, exchange the code and apply authorization rules.
    ///
    /// # Errors
    /// `InvalidInput`/`State` for bad parameters or state, `Discovery`,
    /// `TokenExchange` or `Network` for provider failures, and
    /// `Unauthorized` when rules deny the user.
    #[instrument(skip_all)]
    pub async fn callback(
        &self,
        request: &InboundRequest,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<CallbackOutcome> {
        let params = validate_callback_params(code, state)?;
        let provider_id = extract_provider_from_state(&params.state)
            .filter(|id| !id.is_empty())
            .ok_or(StateError::InvalidFormat)?;
        let provider = self.load_provider(provider_id).await?;

        let validated = self.state.validate_secure_state(&params.state, &provider.id)?;
        let config = self.discovery.configuration(&provider).await?;

        let info = extract_request_info(request);
        let redirect_uri = validated
            .redirect_uri
            .clone()
            .unwrap_or_else(|| format!("{}{CALLBACK_PATH}", info.base_url));

        let response = self
            .token_exchange
            .exchange_code_for_tokens(
                &config,
                &provider,
                &params.code,
                &params.state,
                &redirect_uri,
                Some(&info.full_url),
            )
            .await?;

        let id_token = response.id_token.as_deref().ok_or_else(|| {
            SsoError::TokenExchange("Token response did not include an id_token".to_string())
        })?;
        let claims = decode_id_token_claims(id_token)?;

        if let AuthorizationDecision::Denied(reason) = evaluate_rules(&provider, &claims) {
            return Err(SsoError::Unauthorized(reason));
        }

        let received_at: DateTime<Utc> = self.clock.system_time().into();
        info!(
            provider_id = %provider.id,
            subject = claims.subject().unwrap_or_default(),
            "OIDC sign-in completed"
        );
        Ok(CallbackOutcome {
            provider_id: provider.id,
            client_state: validated.client_state,
            redirect_uri,
            tokens: TokenSet::from_response(response, received_at),
            claims,
        })
    }

    /// Fresh discovery against `provider` for a "test connection" check.
    pub async fn validate_provider(&self, provider: &OidcProvider) -> ProviderValidation {
        self.discovery.validate_provider(provider).await
    }

    async fn load_provider(&self, provider_id: &str) -> Result<OidcProvider> {
        self.providers.provider(provider_id).await?.ok_or_else(|| {
            warn!(provider_id, "Unknown OIDC provider");
            SsoError::NotFound(format!("Provider {provider_id} not found"))
        })
    }
}

fn authorization_url(
    config: &ProviderConfiguration,
    provider: &OidcProvider,
    callback_uri: &str,
    state: &str,
) -> Result<String> {
    let mut url = Url::parse(&config.authorization_endpoint).map_err(|e| {
        SsoError::Discovery(format!(
            "Invalid authorization endpoint '{}': {e}",
            config.authorization_endpoint
        ))
    })?;

    let mut pairs: Vec<(String, String)> =
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    let mut set = |key: &str, value: &str| {
        match pairs.iter_mut().find(|(existing, _)| existing == key) {
            Some(pair) => pair.1 = value.to_string(),
            None => pairs.push((key.to_string(), value.to_string())),
        }
    };

    set("response_type", "code");
    set("client_id", &config.client_id);
    set("redirect_uri", callback_uri);
    set("scope", &provider.scope_string());
    set("state", state);
    for (key, value) in &provider.custom_auth_params {
        set(key, value);
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}
