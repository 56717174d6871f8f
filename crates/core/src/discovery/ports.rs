//! Port for fetching discovery documents

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ssogate_domain::ExtractedError;

/// Subset of the OpenID Provider Metadata document used by the gateway.
///
/// Every field is optional at this layer; required fields are checked by
/// the discovery service so a nonconformant document is classified rather
/// than failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    #[serde(default)]
    pub token_endpoint_auth_methods_supported: Vec<String>,
}

/// Fetches `{issuer}/.well-known/openid-configuration`.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Fetch and parse the document at `discovery_url`.
    ///
    /// `allow_insecure` must be true for `http:` URLs; adapters refuse
    /// plain HTTP otherwise. Failures are reported as an [`ExtractedError`]
    /// carrying whatever status, body and cause text was available.
    async fn fetch_metadata(
        &self,
        discovery_url: &str,
        allow_insecure: bool,
    ) -> Result<ProviderMetadata, ExtractedError>;
}
