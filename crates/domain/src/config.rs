//! Configuration structures
//!
//! `SsoConfig` is the persisted provider configuration owned by the
//! administrative collaborator; `ServerConfig` carries process settings.
//! Loading lives in `ssogate-infra::config`.

use serde::Deserialize;

use crate::types::{OidcProvider, SecretString};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sso: SsoConfig,
}

/// Provider list plus the origins every provider may redirect back to
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoConfig {
    #[serde(default)]
    pub providers: Vec<OidcProvider>,
    #[serde(default)]
    pub default_allowed_origins: Vec<String>,
}

impl SsoConfig {
    /// Look up a provider by id.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&OidcProvider> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP surface binds to
    pub bind_addr: String,

    /// Public origin to use instead of request headers (e.g. behind a fixed proxy)
    pub public_origin: Option<String>,

    /// Hex or raw key used to sign state tokens; random per process if unset
    pub state_secret: Option<SecretString>,

    pub http_timeout_secs: u64,
    pub discovery_cache_ttl_secs: u64,
    pub discovery_cache_capacity: u64,
    pub state_sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            public_origin: None,
            state_secret: None,
            http_timeout_secs: 30,
            discovery_cache_ttl_secs: 300,
            discovery_cache_capacity: 256,
            state_sweep_interval_secs: crate::constants::STATE_SWEEP_INTERVAL.as_secs(),
        }
    }
}
