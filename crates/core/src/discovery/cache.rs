//! Discovery configuration caching with moka
//!
//! Resolved configurations are cached per `issuer|client_id` so authorize
//! and callback requests do not repeat the discovery round trip. Failures
//! are never cached. Two requests racing on a cold key may both fetch;
//! the later insert wins, which is harmless because the values agree.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use ssogate_domain::OidcProvider;
use tracing::{debug, info};

use super::config::ProviderConfiguration;

/// Default TTL for cached configurations (5 minutes)
pub const DEFAULT_DISCOVERY_CACHE_TTL_SECONDS: u64 = 300;

/// Default max capacity for the configuration cache
pub const DEFAULT_DISCOVERY_CACHE_MAX_CAPACITY: u64 = 256;

/// Discovery cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryCacheConfig {
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for DiscoveryCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_DISCOVERY_CACHE_TTL_SECONDS),
            max_capacity: DEFAULT_DISCOVERY_CACHE_MAX_CAPACITY,
        }
    }
}

impl DiscoveryCacheConfig {
    /// Config with a custom TTL (useful for testing)
    #[must_use]
    pub const fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, max_capacity: DEFAULT_DISCOVERY_CACHE_MAX_CAPACITY }
    }
}

/// Cache of resolved provider configurations.
#[derive(Clone)]
pub struct DiscoveryCache {
    inner: Cache<String, Arc<ProviderConfiguration>>,
}

impl DiscoveryCache {
    pub fn new(config: DiscoveryCacheConfig) -> Self {
        info!(
            ttl_seconds = config.ttl.as_secs(),
            max_capacity = config.max_capacity,
            "Discovery cache configuration loaded"
        );
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();
        Self { inner }
    }

    /// Cache key for a provider: `issuer|client_id`.
    #[must_use]
    pub fn key_for(provider: &OidcProvider) -> String {
        format!("{}|{}", provider.issuer.as_deref().unwrap_or_default(), provider.client_id)
    }

    pub async fn get(&self, provider: &OidcProvider) -> Option<Arc<ProviderConfiguration>> {
        let hit = self.inner.get(&Self::key_for(provider)).await;
        debug!(provider_id = %provider.id, hit = hit.is_some(), "Discovery cache lookup");
        hit
    }

    pub async fn insert(&self, provider: &OidcProvider, config: Arc<ProviderConfiguration>) {
        self.inner.insert(Self::key_for(provider), config).await;
    }

    /// Drop the cached configuration for `provider`.
    pub async fn invalidate(&self, provider: &OidcProvider) {
        self.inner.invalidate(&Self::key_for(provider)).await;
        debug!(provider_id = %provider.id, "Discovery cache entry invalidated");
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate entry count; pending maintenance may lag.
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl std::fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryCache").field("entries", &self.inner.entry_count()).finish()
    }
}
