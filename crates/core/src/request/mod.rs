//! Request origin extraction and parameter validation
//!
//! Handlers translate their framework request into an [`InboundRequest`]
//! so origin resolution stays independent of the HTTP server.

use std::collections::BTreeMap;

use ssogate_domain::constants::{DEFAULT_HOST, DEFAULT_PROTOCOL};
use ssogate_domain::SsoError;
use thiserror::Error;

/// Missing or empty request parameters
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Provider ID is required")]
    MissingProviderId,

    #[error("State parameter is required")]
    MissingState,

    #[error("Redirect URI is required")]
    MissingRedirectUri,

    #[error("Missing required parameters")]
    MissingCallbackParams,
}

impl From<RequestError> for SsoError {
    fn from(err: RequestError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Framework-neutral view of an inbound HTTP request.
///
/// Header names are stored lowercase; a header may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    headers: BTreeMap<String, Vec<String>>,
    protocol: Option<String>,
    path_and_query: String,
}

impl InboundRequest {
    pub fn new(path_and_query: impl Into<String>) -> Self {
        Self { path_and_query: path_and_query.into(), ..Self::default() }
    }

    /// Append a header value.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.entry(name.to_ascii_lowercase()).or_default().push(value.into());
        self
    }

    /// Protocol the server itself saw (without `:`), e.g. from the listener.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// First value of `name`, with comma-joined lists cut at the first entry.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(|value| value.split(',').next().unwrap_or_default().trim())
            .filter(|value| !value.is_empty())
    }

    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }
}

/// Origin of a request as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub protocol: String,
    pub host: String,
    /// `{protocol}://{host}{path+query}`
    pub full_url: String,
    /// `{protocol}://{host}`
    pub base_url: String,
}

/// Resolve protocol and host, honouring reverse proxy headers first.
pub fn extract_request_info(request: &InboundRequest) -> RequestInfo {
    let protocol = request
        .header("x-forwarded-proto")
        .or_else(|| request.protocol().filter(|p| !p.is_empty()))
        .unwrap_or(DEFAULT_PROTOCOL)
        .trim_end_matches(':')
        .to_string();
    let host = request
        .header("x-forwarded-host")
        .or_else(|| request.header("host"))
        .unwrap_or(DEFAULT_HOST)
        .to_string();

    let base_url = format!("{protocol}://{host}");
    let full_url = format!("{base_url}{}", request.path_and_query());
    RequestInfo { protocol, host, full_url, base_url }
}

/// Validated authorize parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeParams {
    pub provider_id: String,
    pub state: String,
    pub redirect_uri: String,
}

/// Validated callback parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Require provider id, state and redirect URI, checked in that order.
///
/// # Errors
/// The [`RequestError`] for the first missing field.
pub fn validate_authorize_params(
    provider_id: Option<&str>,
    state: Option<&str>,
    redirect_uri: Option<&str>,
) -> Result<AuthorizeParams, RequestError> {
    let provider_id = present(provider_id).ok_or(RequestError::MissingProviderId)?;
    let state = present(state).ok_or(RequestError::MissingState)?;
    let redirect_uri = present(redirect_uri).ok_or(RequestError::MissingRedirectUri)?;
    Ok(AuthorizeParams {
        provider_id: provider_id.to_string(),
        state: state.to_string(),
        redirect_uri: redirect_uri.to_string(),
    })
}

/// Require both `code` and `state`.
///
/// # Errors
/// [`RequestError::MissingCallbackParams`] if either is absent or empty.
pub fn validate_callback_params(
    code: Option<&str>,
    state: Option<&str>,
) -> Result<CallbackParams, RequestError> {
    match (present(code), present(state)) {
        (Some(code), Some(state)) => {
            Ok(CallbackParams { code: code.to_string(), state: state.to_string() })
        }
        _ => Err(RequestError::MissingCallbackParams),
    }
}
