//! Discovery and provider validation service

use std::sync::Arc;

use serde::Serialize;
use ssogate_domain::constants::WELL_KNOWN_PATH;
use ssogate_domain::OidcProvider;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::cache::{DiscoveryCache, DiscoveryCacheConfig};
use super::classify::{message_for, to_discovery_error};
use super::config::ProviderConfiguration;
use super::error::{DiscoveryError, DiscoveryErrorKind};
use super::ports::{DiscoveryClient, ProviderMetadata};

/// Result of an administrative "test connection".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderValidation {
    pub is_valid: bool,
    pub error: Option<String>,
    pub details: Option<DiscoveryError>,
}

impl ProviderValidation {
    fn valid() -> Self {
        Self { is_valid: true, error: None, details: None }
    }

    fn invalid(err: DiscoveryError) -> Self {
        Self { is_valid: false, error: Some(err.message.clone()), details: Some(err) }
    }
}

/// Discovery document URL for `issuer`.
///
/// Issuers that already point at the document are returned unchanged.
#[must_use]
pub fn build_well_known_url(issuer: &str) -> String {
    if issuer.ends_with(WELL_KNOWN_PATH) {
        return issuer.to_string();
    }
    format!("{}{WELL_KNOWN_PATH}", issuer.trim_end_matches('/'))
}

/// Performs discovery and caches resolved provider configurations.
pub struct DiscoveryService {
    client: Arc<dyn DiscoveryClient>,
    cache: DiscoveryCache,
}

impl DiscoveryService {
    pub fn new(client: Arc<dyn DiscoveryClient>, cache_config: DiscoveryCacheConfig) -> Self {
        Self { client, cache: DiscoveryCache::new(cache_config) }
    }

    pub const fn cache(&self) -> &DiscoveryCache {
        &self.cache
    }

    /// Fresh discovery for an administrative check. Never reads or writes
    /// the cache.
    #[instrument(skip(self, provider), fields(provider_id = %provider.id))]
    pub async fn validate_provider(&self, provider: &OidcProvider) -> ProviderValidation {
        match self.discover(provider).await {
            Ok(_) => {
                info!("Provider validation succeeded");
                ProviderValidation::valid()
            }
            Err(err) => {
                warn!(
                    error_kind = %err.kind,
                    discovery_url = err.discovery_url.as_deref().unwrap_or_default(),
                    raw_error = err.raw_error.as_deref().unwrap_or_default(),
                    "Provider validation failed"
                );
                ProviderValidation::invalid(err)
            }
        }
    }

    /// Configuration for a flow: explicit endpoints, else cached or fresh
    /// discovery.
    ///
    /// # Errors
    /// The classified [`DiscoveryError`] when discovery fails.
    pub async fn configuration(
        &self,
        provider: &OidcProvider,
    ) -> Result<Arc<ProviderConfiguration>, DiscoveryError> {
        if let Some(config) = ProviderConfiguration::from_explicit(provider) {
            debug!(provider_id = %provider.id, "Using explicit provider endpoints");
            return Ok(Arc::new(config));
        }
        if let Some(config) = self.cache.get(provider).await {
            return Ok(config);
        }

        let config = Arc::new(self.discover(provider).await?);
        self.cache.insert(provider, Arc::clone(&config)).await;
        Ok(config)
    }

    pub async fn invalidate(&self, provider: &OidcProvider) {
        self.cache.invalidate(provider).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Fetch and validate the discovery document without touching the cache.
    ///
    /// # Errors
    /// `MISSING_ISSUER`/`INVALID_URL` before any request, otherwise the
    /// classified fetch or document failure.
    pub async fn discover(
        &self,
        provider: &OidcProvider,
    ) -> Result<ProviderConfiguration, DiscoveryError> {
        let issuer = preflight(provider)?;
        let allow_insecure = issuer.scheme() == "http";
        if allow_insecure {
            warn!(provider_id = %provider.id, issuer = %issuer, "Allowing insecure HTTP discovery");
        }

        let issuer_str = provider.issuer.as_deref().unwrap_or_default();
        let discovery_url = build_well_known_url(issuer_str);
        debug!(provider_id = %provider.id, discovery_url = %discovery_url, "Fetching discovery document");

        let metadata = self
            .client
            .fetch_metadata(&discovery_url, allow_insecure)
            .await
            .map_err(|err| to_discovery_error(&err, &discovery_url))?;

        let (authorization_endpoint, token_endpoint) =
            validate_document(&metadata, issuer_str)
                .map_err(|raw| document_error(&discovery_url, &raw))?;

        info!(
            provider_id = %provider.id,
            token_endpoint = %token_endpoint,
            "Discovery succeeded"
        );
        Ok(ProviderConfiguration::from_metadata(
            provider,
            metadata,
            authorization_endpoint,
            token_endpoint,
            allow_insecure,
        ))
    }
}

fn preflight(provider: &OidcProvider) -> Result<Url, DiscoveryError> {
    let issuer = provider
        .issuer
        .as_deref()
        .filter(|issuer| !issuer.trim().is_empty())
        .ok_or_else(|| {
            DiscoveryError::new(
                DiscoveryErrorKind::MissingIssuer,
                message_for(DiscoveryErrorKind::MissingIssuer, "", None, ""),
            )
        })?;

    let invalid = |raw: String| {
        DiscoveryError::new(
            DiscoveryErrorKind::InvalidUrl,
            message_for(DiscoveryErrorKind::InvalidUrl, "", None, &raw),
        )
        .with_raw_error(raw)
    };

    let url = Url::parse(issuer).map_err(|e| invalid(format!("{issuer} ({e})")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("{issuer} (unsupported scheme '{}')", url.scheme())));
    }
    Ok(url)
}

fn validate_document(metadata: &ProviderMetadata, issuer: &str) -> Result<(String, String), String> {
    let required = |field: &Option<String>, name: &str| {
        field
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| format!("missing required field '{name}'"))
    };

    let authorization_endpoint = required(&metadata.authorization_endpoint, "authorization_endpoint")?;
    let token_endpoint = required(&metadata.token_endpoint, "token_endpoint")?;
    let document_issuer = required(&metadata.issuer, "issuer")?;

    if document_issuer.trim_end_matches('/') != issuer.trim_end_matches('/') {
        return Err(format!("issuer mismatch: expected {issuer}, got {document_issuer}"));
    }
    Ok((authorization_endpoint, token_endpoint))
}

fn document_error(discovery_url: &str, raw: &str) -> DiscoveryError {
    let kind = DiscoveryErrorKind::InvalidOidcDocument;
    DiscoveryError::new(kind, message_for(kind, discovery_url, None, raw))
        .with_discovery_url(discovery_url)
        .with_raw_error(raw)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ssogate_domain::ExtractedError;

    use super::*;

    struct StubClient {
        response: Result<ProviderMetadata, ExtractedError>,
        calls: AtomicUsize,
        last_insecure: AtomicBool,
    }

    impl StubClient {
        fn new(response: Result<ProviderMetadata, ExtractedError>) -> Arc<Self> {
            Arc::new(Self { response, calls: AtomicUsize::new(0), last_insecure: AtomicBool::new(false) })
        }
    }

    #[async_trait]
    impl DiscoveryClient for StubClient {
        async fn fetch_metadata(
            &self,
            _discovery_url: &str,
            allow_insecure: bool,
        ) -> Result<ProviderMetadata, ExtractedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_insecure.store(allow_insecure, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn metadata(issuer: &str) -> ProviderMetadata {
        ProviderMetadata {
            issuer: Some(issuer.to_string()),
            authorization_endpoint: Some(format!("{issuer}/authorize")),
            token_endpoint: Some(format!("{issuer}/token")),
            ..ProviderMetadata::default()
        }
    }

    fn service(client: Arc<StubClient>) -> DiscoveryService {
        DiscoveryService::new(client, DiscoveryCacheConfig::default())
    }

    #[test]
    fn test_well_known_url() {
        assert_eq!(
            build_well_known_url("https://accounts.google.com"),
            "https://accounts.google.com/.well-known/openid-configuration"
        );
        assert_eq!(
            build_well_known_url("https://idp.example.com/realms/main/"),
            "https://idp.example.com/realms/main/.well-known/openid-configuration"
        );
        let already = "https://idp.example.com/.well-known/openid-configuration";
        assert_eq!(build_well_known_url(already), already);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_issuer_fail_fast() {
        let client = StubClient::new(Ok(metadata("https://idp.example.com")));
        let svc = service(client.clone());

        let missing = svc.validate_provider(&OidcProvider::new("p", "c", None)).await;
        assert!(!missing.is_valid);
        assert_eq!(missing.details.unwrap().kind, DiscoveryErrorKind::MissingIssuer);

        let invalid = svc.validate_provider(&OidcProvider::new("p", "c", Some("not a url".into()))).await;
        assert_eq!(invalid.details.unwrap().kind, DiscoveryErrorKind::InvalidUrl);

        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_http_issuer_opts_into_insecure() {
        let client = StubClient::new(Ok(metadata("http://localhost:8080/realms/dev")));
        let svc = service(client.clone());
        let provider = OidcProvider::new("dev", "c", Some("http://localhost:8080/realms/dev".into()));

        let result = svc.validate_provider(&provider).await;
        assert!(result.is_valid, "{result:?}");
        assert!(client.last_insecure.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_document_validation() {
        let mut doc = metadata("https://idp.example.com");
        doc.token_endpoint = None;
        let svc = service(StubClient::new(Ok(doc)));
        let provider = OidcProvider::new("p", "c", Some("https://idp.example.com".into()));
        let result = svc.validate_provider(&provider).await;
        let details = result.details.unwrap();
        assert_eq!(details.kind, DiscoveryErrorKind::InvalidOidcDocument);
        assert!(details.message.contains("token_endpoint"));

        let svc = service(StubClient::new(Ok(metadata("https://evil.example.com"))));
        let result = svc.validate_provider(&provider).await;
        assert!(result.error.unwrap().contains("issuer mismatch"));
    }

    #[tokio::test]
    async fn test_transport_errors_are_classified() {
        let err = ExtractedError::new("reqwest::Error", "HTTP status client error").with_status(404, None);
        let svc = service(StubClient::new(Err(err)));
        let provider = OidcProvider::new("p", "c", Some("https://idp.example.com".into()));
        let result = svc.validate_provider(&provider).await;
        let details = result.details.unwrap();
        assert_eq!(details.kind, DiscoveryErrorKind::DiscoveryNotFound);
        assert_eq!(
            details.discovery_url.as_deref(),
            Some("https://idp.example.com/.well-known/openid-configuration")
        );
    }

    #[tokio::test]
    async fn test_configuration_is_cached_and_validate_bypasses_cache() {
        let client = StubClient::new(Ok(metadata("https://idp.example.com")));
        let svc = service(client.clone());
        let mut provider = OidcProvider::new("p", "c", Some("https://idp.example.com".into()));
        provider.client_secret = Some("s".into());

        let first = svc.configuration(&provider).await.unwrap();
        let second = svc.configuration(&provider).await.unwrap();
        assert_eq!(first.token_endpoint, "https://idp.example.com/token");
        assert_eq!(second.client_auth_method.as_str(), "client_secret_post");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        assert!(svc.validate_provider(&provider).await.is_valid);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);

        svc.invalidate(&provider).await;
        svc.configuration(&provider).await.unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_explicit_endpoints_skip_discovery() {
        let client = StubClient::new(Err(ExtractedError::new("x", "unreachable")));
        let svc = service(client.clone());
        let mut provider = OidcProvider::new("p", "c", None);
        provider.authorization_endpoint = Some("https://idp/auth".into());
        provider.token_endpoint = Some("https://idp/token".into());

        let config = svc.configuration(&provider).await.unwrap();
        assert_eq!(config.authorization_endpoint, "https://idp/auth");
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
