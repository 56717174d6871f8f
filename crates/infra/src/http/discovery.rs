//! reqwest adapter for the discovery port

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, Response};
use ssogate_core::{DiscoveryClient, ProviderMetadata};
use ssogate_domain::ExtractedError;
use tracing::debug;
use url::Url;

use super::client::{transport_allowed, HttpClient};
use crate::errors::extract_http_error;

/// Fetches discovery documents over HTTP.
#[derive(Clone)]
pub struct ReqwestDiscoveryClient {
    http: HttpClient,
}

impl ReqwestDiscoveryClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DiscoveryClient for ReqwestDiscoveryClient {
    async fn fetch_metadata(
        &self,
        discovery_url: &str,
        allow_insecure: bool,
    ) -> Result<ProviderMetadata, ExtractedError> {
        let url = Url::parse(discovery_url).map_err(|e| {
            ExtractedError::from_error(&e).with_property("url", discovery_url)
        })?;
        if !transport_allowed(&url, allow_insecure) {
            return Err(ExtractedError::new(
                "InsecureTransport",
                format!("refusing {} discovery request to {url} without the insecure transport opt-in", url.scheme()),
            )
            .with_code("INSECURE_TRANSPORT"));
        }

        let request = self.http.request(Method::GET, url.clone()).header(ACCEPT, "application/json");
        let response = self.http.send(request).await.map_err(|e| extract_http_error(&e))?;

        let status = response.status();
        let headers = header_pairs(response.headers());
        let body = read_body(response).await?;
        debug!(%url, %status, body_len = body.len(), "Discovery response received");

        if !status.is_success() {
            return Err(ExtractedError::new(
                "HttpStatusError",
                format!("unexpected HTTP status {status} from {url}"),
            )
            .with_status(status.as_u16(), status.canonical_reason().map(str::to_string))
            .with_response_body(&body)
            .with_response_headers(headers));
        }

        serde_json::from_str::<ProviderMetadata>(&body).map_err(|e| {
            let mut extracted = ExtractedError::from_error(&e)
                .with_status(status.as_u16(), status.canonical_reason().map(str::to_string))
                .with_response_body(&body)
                .with_response_headers(headers);
            extracted.message = format!("invalid JSON in discovery document: {e}");
            extracted
        })
    }
}

async fn read_body(response: Response) -> Result<String, ExtractedError> {
    response.text().await.map_err(|e| extract_http_error(&e))
}

/// Response headers as owned pairs; non-UTF-8 values are dropped.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn adapter() -> ReqwestDiscoveryClient {
        ReqwestDiscoveryClient::new(HttpClient::new().expect("http client"))
    }

    #[tokio::test]
    async fn test_parses_metadata_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "issuer": server.uri(),
                "authorization_endpoint": format!("{}/authorize", server.uri()),
                "token_endpoint": format!("{}/token", server.uri()),
                "scopes_supported": ["openid", "email"],
            })))
            .mount(&server)
            .await;

        let url = format!("{}/.well-known/openid-configuration", server.uri());
        let metadata = adapter().fetch_metadata(&url, true).await.unwrap();

        assert_eq!(metadata.issuer.as_deref(), Some(server.uri().as_str()));
        assert_eq!(metadata.scopes_supported, vec!["openid", "email"]);
        assert!(metadata.jwks_uri.is_none());
    }

    #[tokio::test]
    async fn test_refuses_plain_http_without_opt_in() {
        let err = adapter()
            .fetch_metadata("http://idp.local/.well-known/openid-configuration", false)
            .await
            .unwrap_err();

        assert_eq!(err.code.as_deref(), Some("INSECURE_TRANSPORT"));
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such tenant"))
            .mount(&server)
            .await;

        let err = adapter()
            .fetch_metadata(&format!("{}/.well-known/openid-configuration", server.uri()), true)
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(404));
        assert_eq!(err.response_body.as_deref(), Some("no such tenant"));
    }
}
