//! In-memory provider repository
//!
//! Serves a snapshot of [`SsoConfig`]. The administrative side swaps in a
//! new snapshot with [`StaticProviderRepository::replace`]; flows already in
//! progress keep the provider record they loaded.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use ssogate_core::ProviderRepository;
use ssogate_domain::{OidcProvider, Result, SsoConfig};
use tracing::info;

/// [`ProviderRepository`] backed by a swappable configuration snapshot.
#[derive(Debug, Default)]
pub struct StaticProviderRepository {
    snapshot: RwLock<Arc<SsoConfig>>,
}

impl StaticProviderRepository {
    pub fn new(config: SsoConfig) -> Self {
        Self { snapshot: RwLock::new(Arc::new(config)) }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<SsoConfig> {
        Arc::clone(&self.snapshot.read())
    }

    /// Replace the configuration atomically.
    pub fn replace(&self, config: SsoConfig) {
        let providers = config.providers.len();
        *self.snapshot.write() = Arc::new(config);
        info!(providers, "Provider configuration replaced");
    }
}

#[async_trait]
impl ProviderRepository for StaticProviderRepository {
    async fn provider(&self, id: &str) -> Result<Option<OidcProvider>> {
        Ok(self.snapshot().provider(id).cloned())
    }

    async fn default_allowed_origins(&self) -> Result<Vec<String>> {
        Ok(self.snapshot().default_allowed_origins.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ids: &[&str]) -> SsoConfig {
        SsoConfig {
            providers: ids
                .iter()
                .map(|id| OidcProvider::new(*id, "client", Some(format!("https://{id}.example.com"))))
                .collect(),
            default_allowed_origins: vec!["https://tower.local".to_string()],
        }
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let repo = StaticProviderRepository::new(config(&["okta", "google"]));

        let provider = repo.provider("google").await.unwrap().unwrap();
        assert_eq!(provider.issuer.as_deref(), Some("https://google.example.com"));
        assert!(repo.provider("azure").await.unwrap().is_none());
        assert_eq!(repo.default_allowed_origins().await.unwrap(), vec!["https://tower.local"]);
    }

    /// Validates `StaticProviderRepository::replace` behavior for the
    /// snapshot swap scenario.
    ///
    /// Assertions:
    /// - Confirms a snapshot taken before the swap is unaffected.
    /// - Confirms lookups after the swap see the new providers.
    #[tokio::test]
    async fn test_replace_swaps_snapshot() {
        let repo = StaticProviderRepository::new(config(&["okta"]));
        let before = repo.snapshot();

        repo.replace(config(&["google"]));

        assert!(before.provider("okta").is_some());
        assert!(repo.provider("okta").await.unwrap().is_none());
        assert!(repo.provider("google").await.unwrap().is_some());
    }
}
