//! Resolved provider configuration

use serde::Serialize;
use ssogate_domain::{OidcProvider, SecretString};

use super::ports::ProviderMetadata;

/// How the client authenticates at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    ClientSecretPost,
    None,
}

impl ClientAuthMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSecretPost => "client_secret_post",
            Self::None => "none",
        }
    }

    fn for_provider(provider: &OidcProvider) -> Self {
        if provider.has_client_secret() {
            Self::ClientSecretPost
        } else {
            Self::None
        }
    }
}

/// Endpoints and client credentials for one provider, ready for a flow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfiguration {
    pub provider_id: String,
    pub issuer: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: Option<String>,
    pub userinfo_endpoint: Option<String>,
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<SecretString>,
    pub client_auth_method: ClientAuthMethod,
    /// Plain HTTP issuer opted into insecure transport
    pub allow_insecure: bool,
}

impl ProviderConfiguration {
    /// Configuration from explicitly configured endpoints.
    ///
    /// Returns `None` unless both authorization and token endpoints are set.
    #[must_use]
    pub fn from_explicit(provider: &OidcProvider) -> Option<Self> {
        let authorization_endpoint = provider.authorization_endpoint.clone()?;
        let token_endpoint = provider.token_endpoint.clone()?;
        let allow_insecure = is_http(&token_endpoint)
            || provider.issuer.as_deref().is_some_and(is_http);
        Some(Self {
            provider_id: provider.id.clone(),
            issuer: provider.issuer.clone(),
            authorization_endpoint,
            token_endpoint,
            jwks_uri: provider.jwks_uri.clone(),
            userinfo_endpoint: None,
            client_id: provider.client_id.clone(),
            client_secret: provider.client_secret.clone(),
            client_auth_method: ClientAuthMethod::for_provider(provider),
            allow_insecure,
        })
    }

    /// Configuration from a validated discovery document. Explicit
    /// endpoints on the provider take precedence over discovered ones.
    pub(crate) fn from_metadata(
        provider: &OidcProvider,
        metadata: ProviderMetadata,
        authorization_endpoint: String,
        token_endpoint: String,
        allow_insecure: bool,
    ) -> Self {
        Self {
            provider_id: provider.id.clone(),
            issuer: metadata.issuer.or_else(|| provider.issuer.clone()),
            authorization_endpoint: provider
                .authorization_endpoint
                .clone()
                .unwrap_or(authorization_endpoint),
            token_endpoint: provider.token_endpoint.clone().unwrap_or(token_endpoint),
            jwks_uri: provider.jwks_uri.clone().or(metadata.jwks_uri),
            userinfo_endpoint: metadata.userinfo_endpoint,
            client_id: provider.client_id.clone(),
            client_secret: provider.client_secret.clone(),
            client_auth_method: ClientAuthMethod::for_provider(provider),
            allow_insecure,
        }
    }
}

fn is_http(url: &str) -> bool {
    url.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://"))
}
