//! Shared helpers for `ssogate-api` integration tests.
//!
//! Builds an `AppContext` around in-memory adapters so the router can be
//! driven with `tower::ServiceExt::oneshot` without any network access.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use ssogate_api::{Adapters, AppContext};
use ssogate_common::SystemClock;
use ssogate_core::{
    CallbackOutcome, DiscoveryClient, GrantError, GrantRequest, ProviderMetadata, SessionIssuer,
    TokenEndpointClient,
};
use ssogate_domain::{
    AppConfig, AuthorizationRule, ExtractedError, OidcProvider, Result, RuleOperator, SecretString,
    ServerConfig, SsoConfig, TokenResponse,
};

pub const ISSUER: &str = "https://idp.example.com";
pub const ORIGIN: &str = "https://tower.local";
pub const SESSION_TOKEN: &str = "session-token-123";

/// Discovery client returning a fixed document, or a fixed failure.
pub struct StubDiscovery {
    pub result: std::result::Result<ProviderMetadata, ExtractedError>,
    pub calls: AtomicUsize,
}

impl StubDiscovery {
    pub fn document() -> Arc<Self> {
        Arc::new(Self {
            result: Ok(ProviderMetadata {
                issuer: Some(ISSUER.to_string()),
                authorization_endpoint: Some(format!("{ISSUER}/authorize")),
                token_endpoint: Some(format!("{ISSUER}/token")),
                ..ProviderMetadata::default()
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: ExtractedError) -> Arc<Self> {
        Arc::new(Self { result: Err(err), calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryClient for StubDiscovery {
    async fn fetch_metadata(
        &self,
        _discovery_url: &str,
        _allow_insecure: bool,
    ) -> std::result::Result<ProviderMetadata, ExtractedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Token endpoint issuing an ID token for `email` and recording requests.
pub struct StubTokens {
    pub email: String,
    pub requests: Mutex<Vec<GrantRequest>>,
}

impl StubTokens {
    pub fn for_email(email: &str) -> Arc<Self> {
        Arc::new(Self { email: email.to_string(), requests: Mutex::new(Vec::new()) })
    }

    pub fn requests(&self) -> Vec<GrantRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenEndpointClient for StubTokens {
    async fn authorization_code_grant(
        &self,
        request: &GrantRequest,
    ) -> std::result::Result<TokenResponse, GrantError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(TokenResponse {
            access_token: "access-token".into(),
            token_type: "Bearer".into(),
            expires_in: Some(3600),
            refresh_token: None,
            id_token: Some(id_token(&json!({
                "iss": ISSUER,
                "aud": "tower-client",
                "sub": "user-1",
                "email": self.email,
            }))),
            scope: Some("openid email".into()),
        })
    }
}

/// Session issuer returning [`SESSION_TOKEN`].
pub struct FixedSessions;

#[async_trait]
impl SessionIssuer for FixedSessions {
    async fn issue(&self, _outcome: &CallbackOutcome) -> Result<String> {
        Ok(SESSION_TOKEN.to_string())
    }
}

pub fn id_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{header}.{body}.sig")
}

/// `okta` provider admitting `@example.com` addresses.
pub fn provider() -> OidcProvider {
    let mut provider = OidcProvider::new("okta", "tower-client", Some(ISSUER.to_string()));
    provider.client_secret = Some(SecretString::new("client-secret"));
    provider.authorization_rules = vec![AuthorizationRule {
        claim: "email".into(),
        operator: RuleOperator::EndsWith,
        value: vec!["@example.com".into()],
    }];
    provider
}

pub fn config(providers: Vec<OidcProvider>) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            state_secret: Some(SecretString::new("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef")),
            ..ServerConfig::default()
        },
        sso: SsoConfig { providers, default_allowed_origins: vec![ORIGIN.to_string()] },
    }
}

pub fn context(
    config: AppConfig,
    discovery: Arc<StubDiscovery>,
    tokens: Arc<StubTokens>,
) -> Arc<AppContext> {
    let adapters = Adapters {
        discovery,
        tokens,
        sessions: Arc::new(FixedSessions),
        clock: Arc::new(SystemClock),
    };
    Arc::new(AppContext::with_adapters(config, adapters).expect("context"))
}

/// GET `uri` as if proxied for `https://tower.local`.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "tower.local")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap()
}

pub fn location<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of query parameter `name` in `url`.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
