//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use ssogate_common::{Clock, StateSigner, SystemClock};
use ssogate_core::discovery::DiscoveryCacheConfig;
use ssogate_core::{
    DiscoveryClient, DiscoveryService, EphemeralSessionIssuer, OidcAuthService,
    SecureStateService, SessionIssuer, StateStore, StateSweeper, TokenEndpointClient,
    TokenExchangeService,
};
use ssogate_domain::constants::STATE_TTL;
use ssogate_domain::{AppConfig, Result, ServerConfig, SsoError};
use ssogate_infra::{HttpClient, ReqwestDiscoveryClient, ReqwestTokenClient, StaticProviderRepository};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Outbound collaborators of the sign-in flow.
///
/// [`AppContext::new`] wires the reqwest adapters; tests substitute stubs
/// through [`AppContext::with_adapters`].
pub struct Adapters {
    pub discovery: Arc<dyn DiscoveryClient>,
    pub tokens: Arc<dyn TokenEndpointClient>,
    pub sessions: Arc<dyn SessionIssuer>,
    pub clock: Arc<dyn Clock>,
}

impl Adapters {
    /// reqwest-backed adapters honouring the configured HTTP timeout.
    ///
    /// # Errors
    /// `Config` if the HTTP client cannot be built.
    pub fn reqwest(server: &ServerConfig) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let http = outbound_http(server)?;

        Ok(Self {
            discovery: Arc::new(ReqwestDiscoveryClient::new(http.clone())),
            tokens: Arc::new(ReqwestTokenClient::with_clock(http, Arc::clone(&clock))),
            sessions: Arc::new(EphemeralSessionIssuer),
            clock,
        })
    }
}

/// Single-attempt client shared by discovery and token calls; failures go
/// straight back to the caller within the configured timeout.
fn outbound_http(server: &ServerConfig) -> Result<HttpClient> {
    let timeout = Duration::from_secs(server.http_timeout_secs.max(1));
    HttpClient::builder().timeout(timeout).max_attempts(1).build()
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: ServerConfig,
    pub providers: Arc<StaticProviderRepository>,
    pub auth: Arc<OidcAuthService>,
    pub sessions: Arc<dyn SessionIssuer>,
    pub state_store: Arc<StateStore>,
    sweeper: Mutex<StateSweeper>,
}

impl AppContext {
    /// Build the context with the production adapters.
    ///
    /// Must be called inside a tokio runtime; the state sweeper is started
    /// before this returns.
    ///
    /// # Errors
    /// `Config` for an unusable state secret or HTTP client settings.
    pub fn new(config: AppConfig) -> Result<Self> {
        let adapters = Adapters::reqwest(&config.server)?;
        Self::with_adapters(config, adapters)
    }

    /// Build the context around caller supplied adapters.
    ///
    /// # Errors
    /// `Config` for an unusable state secret, `Internal` if the sweeper
    /// fails to start.
    pub fn with_adapters(config: AppConfig, adapters: Adapters) -> Result<Self> {
        let AppConfig { server, sso } = config;

        let signer = build_signer(&server)?;
        let state_store = Arc::new(StateStore::new(Arc::clone(&adapters.clock), STATE_TTL));
        let state = Arc::new(SecureStateService::new(signer, Arc::clone(&state_store)));

        let cache_config = DiscoveryCacheConfig {
            ttl: Duration::from_secs(server.discovery_cache_ttl_secs),
            max_capacity: server.discovery_cache_capacity,
        };
        let discovery = Arc::new(DiscoveryService::new(adapters.discovery, cache_config));
        let token_exchange = TokenExchangeService::new(adapters.tokens);

        let provider_count = sso.providers.len();
        let providers = Arc::new(StaticProviderRepository::new(sso));
        let auth = Arc::new(OidcAuthService::new(
            Arc::<StaticProviderRepository>::clone(&providers),
            state,
            discovery,
            token_exchange,
            adapters.clock,
        ));

        let sweep_interval = Duration::from_secs(server.state_sweep_interval_secs.max(1));
        let mut sweeper = StateSweeper::new(Arc::clone(&state_store), sweep_interval);
        sweeper.start().map_err(|err| {
            error!(error = %err, "failed to start state sweeper");
            SsoError::Internal(format!("failed to start state sweeper: {err}"))
        })?;

        info!(providers = provider_count, bind_addr = %server.bind_addr, "AppContext initialized");
        Ok(Self {
            config: server,
            providers,
            auth,
            sessions: adapters.sessions,
            state_store,
            sweeper: Mutex::new(sweeper),
        })
    }

    /// Component health for `GET /health`.
    ///
    /// Providers and the sweeper count toward the score; the state store
    /// reports its pending flow count.
    pub async fn health_check(&self) -> HealthStatus {
        let configured = self.providers.snapshot().providers.len();
        let providers = if configured == 0 {
            ComponentHealth::down("providers", "no providers configured")
        } else {
            ComponentHealth::up_with("providers", format!("{configured} configured"))
        };

        let sweeper = if self.sweeper.lock().await.is_running() {
            ComponentHealth::up("state_sweeper")
        } else {
            ComponentHealth::down("state_sweeper", "not running")
        };

        let store =
            ComponentHealth::up_with("state_store", format!("{} pending", self.state_store.len()));

        HealthStatus::from_components(vec![providers, sweeper, store])
    }

    /// Stop the state sweeper.
    ///
    /// Idempotent; a second call only logs that the sweeper was already
    /// stopped. Pending state records are dropped with the context.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        let mut sweeper = self.sweeper.lock().await;
        if !sweeper.is_running() {
            info!(component = "StateSweeper", "already stopped");
            return Ok(());
        }

        sweeper.stop().await.map_err(|err| {
            error!(error = %err, "failed to stop state sweeper");
            SsoError::Internal(format!("failed to stop state sweeper: {err}"))
        })?;

        info!(pending_states = self.state_store.len(), "AppContext shut down");
        Ok(())
    }
}

fn build_signer(server: &ServerConfig) -> Result<StateSigner> {
    match server.state_secret.as_ref().filter(|secret| !secret.is_empty()) {
        Some(secret) => StateSigner::from_secret(secret.expose())
            .map_err(|err| SsoError::Config(format!("Invalid state secret: {err}"))),
        None => {
            warn!("No state secret configured; state tokens will not survive a restart");
            StateSigner::generate()
                .map_err(|err| SsoError::Internal(format!("failed to generate state key: {err}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_http_does_not_retry() {
        let server = ServerConfig { http_timeout_secs: 0, ..ServerConfig::default() };
        let http = outbound_http(&server).unwrap();
        assert_eq!(http.max_attempts(), 1);
    }
}
