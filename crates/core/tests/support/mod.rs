//! Shared test helpers for `ssogate-core` integration tests.
//!
//! Lightweight in-memory implementations of the core ports so flow tests
//! can focus on behaviour instead of wiring.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use ssogate_common::{MockClock, StateSigner};
use ssogate_core::discovery::DiscoveryCacheConfig;
use ssogate_core::{
    DiscoveryClient, DiscoveryService, GrantError, GrantRequest, OidcAuthService,
    ProviderMetadata, ProviderRepository, SecureStateService, StateStore, TokenEndpointClient,
    TokenExchangeService,
};
use ssogate_domain::constants::STATE_TTL;
use ssogate_domain::{ExtractedError, OidcProvider, Result, TokenResponse};

pub const ISSUER: &str = "https://idp.example.com";

/// Provider repository backed by a map.
#[derive(Default)]
pub struct InMemoryProviders {
    pub providers: HashMap<String, OidcProvider>,
    pub allowed_origins: Vec<String>,
}

impl InMemoryProviders {
    pub fn with(providers: Vec<OidcProvider>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.id.clone(), p)).collect(),
            allowed_origins: Vec::new(),
        }
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviders {
    async fn provider(&self, id: &str) -> Result<Option<OidcProvider>> {
        Ok(self.providers.get(id).cloned())
    }

    async fn default_allowed_origins(&self) -> Result<Vec<String>> {
        Ok(self.allowed_origins.clone())
    }
}

/// Discovery client returning a fixed document for any URL.
pub struct StaticDiscovery {
    pub metadata: ProviderMetadata,
    pub calls: AtomicUsize,
}

impl StaticDiscovery {
    pub fn for_issuer(issuer: &str) -> Arc<Self> {
        Arc::new(Self {
            metadata: ProviderMetadata {
                issuer: Some(issuer.to_string()),
                authorization_endpoint: Some(format!("{issuer}/authorize")),
                token_endpoint: Some(format!("{issuer}/token")),
                jwks_uri: Some(format!("{issuer}/jwks")),
                ..ProviderMetadata::default()
            },
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryClient for StaticDiscovery {
    async fn fetch_metadata(
        &self,
        _discovery_url: &str,
        _allow_insecure: bool,
    ) -> std::result::Result<ProviderMetadata, ExtractedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.clone())
    }
}

/// Token endpoint returning a scripted result and recording requests.
pub struct ScriptedTokenEndpoint {
    pub result: Mutex<std::result::Result<TokenResponse, GrantError>>,
    pub requests: Mutex<Vec<GrantRequest>>,
}

impl ScriptedTokenEndpoint {
    pub fn returning(result: std::result::Result<TokenResponse, GrantError>) -> Arc<Self> {
        Arc::new(Self { result: Mutex::new(result), requests: Mutex::new(Vec::new()) })
    }

    pub fn last_request(&self) -> Option<GrantRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TokenEndpointClient for ScriptedTokenEndpoint {
    async fn authorization_code_grant(
        &self,
        request: &GrantRequest,
    ) -> std::result::Result<TokenResponse, GrantError> {
        self.requests.lock().unwrap().push(request.clone());
        self.result.lock().unwrap().clone()
    }
}

/// Unsigned compact JWT with `payload` as its claims.
pub fn id_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{header}.{body}.sig")
}

pub fn token_response(id_token: Option<String>) -> TokenResponse {
    TokenResponse {
        access_token: "access-token".into(),
        token_type: "Bearer".into(),
        expires_in: Some(3600),
        refresh_token: None,
        id_token,
        scope: Some("openid email".into()),
    }
}

pub fn state_service(clock: &MockClock) -> Arc<SecureStateService> {
    let store = Arc::new(StateStore::new(Arc::new(clock.clone()), STATE_TTL));
    let signer = StateSigner::new(b"integration-test-signing-key-0001").unwrap();
    Arc::new(SecureStateService::new(signer, store))
}

/// Fully wired service plus handles to its stubs.
pub struct Harness {
    pub service: OidcAuthService,
    pub discovery: Arc<StaticDiscovery>,
    pub endpoint: Arc<ScriptedTokenEndpoint>,
    pub clock: MockClock,
}

pub fn harness(
    providers: InMemoryProviders,
    token_result: std::result::Result<TokenResponse, GrantError>,
) -> Harness {
    let clock = MockClock::new();
    let discovery = StaticDiscovery::for_issuer(ISSUER);
    let endpoint = ScriptedTokenEndpoint::returning(token_result);
    let discovery_service = Arc::new(DiscoveryService::new(
        discovery.clone(),
        DiscoveryCacheConfig::with_ttl(Duration::from_secs(60)),
    ));
    let service = OidcAuthService::new(
        Arc::new(providers),
        state_service(&clock),
        discovery_service,
        TokenExchangeService::new(endpoint.clone()),
        Arc::new(clock.clone()),
    );
    Harness { service, discovery, endpoint, clock }
}
