//! OIDC authorize, callback and provider validation routes

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use ssogate_core::flow::login_redirect;
use ssogate_core::{extract_request_info, InboundRequest, ProviderValidation};
use ssogate_domain::{ServerConfig, SsoError};
use tracing::warn;
use url::Url;

use super::error::ApiError;
use crate::utils::logging::{error_label, log_request_outcome};
use crate::AppContext;

#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeQuery {
    pub state: Option<String>,
    #[serde(alias = "redirectUri")]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user denied consent or login failed
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /graphql/api/auth/oidc/authorize/{provider_id}`
pub async fn authorize(
    State(ctx): State<Arc<AppContext>>,
    Path(provider_id): Path<String>,
    Query(query): Query<AuthorizeQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let request = inbound_request(&ctx.config, &headers, &uri);

    let result = ctx
        .auth
        .authorize(
            &request,
            Some(provider_id.as_str()),
            query.state.as_deref(),
            query.redirect_uri.as_deref(),
        )
        .await;

    log_request_outcome(
        "authorize",
        Some(provider_id.as_str()),
        started.elapsed(),
        result.as_ref().err().map(error_label),
    );

    let redirect = result?;
    Ok(found(&redirect.location))
}

/// `GET /graphql/api/auth/oidc/callback`
///
/// Always answers with a redirect to the login page: a session token in
/// the fragment on success, an error message otherwise.
pub async fn callback(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let started = Instant::now();
    let request = inbound_request(&ctx.config, &headers, &uri);
    let base_url = extract_request_info(&request).base_url;

    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        let message = query.error_description.as_deref().unwrap_or(error);
        warn!(error, "Identity provider returned an error to the callback");
        log_request_outcome("callback", None, started.elapsed(), Some("provider_error"));
        return found(&login_redirect(&base_url, "error", message));
    }

    let result = complete_sign_in(&ctx, &request, &query).await;
    let provider_id = result.as_ref().ok().map(|(provider_id, _)| provider_id.as_str());
    log_request_outcome(
        "callback",
        provider_id,
        started.elapsed(),
        result.as_ref().err().map(error_label),
    );

    match result {
        Ok((_, location)) => found(&location),
        Err(err) => found(&login_redirect(&base_url, "error", err.message())),
    }
}

/// `GET /graphql/api/auth/oidc/providers/{provider_id}/validate`
///
/// Fresh discovery against a configured provider, bypassing the cache.
pub async fn validate_provider(
    State(ctx): State<Arc<AppContext>>,
    Path(provider_id): Path<String>,
) -> Result<Json<ProviderValidation>, ApiError> {
    let provider = ctx
        .providers
        .snapshot()
        .provider(&provider_id)
        .cloned()
        .ok_or_else(|| SsoError::NotFound(format!("Provider {provider_id} not found")))?;

    Ok(Json(ctx.auth.validate_provider(&provider).await))
}

/// Run the callback and issue a session; returns the provider id and the
/// login redirect carrying the session token.
async fn complete_sign_in(
    ctx: &AppContext,
    request: &InboundRequest,
    query: &CallbackQuery,
) -> Result<(String, String), SsoError> {
    let outcome =
        ctx.auth.callback(request, query.code.as_deref(), query.state.as_deref()).await?;
    let token = ctx.sessions.issue(&outcome).await?;
    let location = login_redirect(&outcome.redirect_uri, "token", &token);
    Ok((outcome.provider_id, location))
}

fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string()), (header::CACHE_CONTROL, "no-store".to_string())],
    )
        .into_response()
}

/// Framework-neutral copy of the request.
///
/// A configured public origin is added first so it takes precedence over
/// anything the client or proxy sent.
pub(crate) fn inbound_request(config: &ServerConfig, headers: &HeaderMap, uri: &Uri) -> InboundRequest {
    let path_and_query = uri.path_and_query().map_or_else(|| uri.path().to_string(), ToString::to_string);
    let mut request = InboundRequest::new(path_and_query).with_protocol("http");

    if let Some(origin) = config.public_origin.as_deref().and_then(|o| Url::parse(o).ok()) {
        if let Some(host) = origin.host_str() {
            let host = origin.port().map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
            request = request
                .with_header("x-forwarded-proto", origin.scheme())
                .with_header("x-forwarded-host", host);
        }
    }

    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }
    request
}
