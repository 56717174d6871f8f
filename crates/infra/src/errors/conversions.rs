//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use ssogate_domain::{ExtractedError, SsoError};

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SsoError);

impl From<InfraError> for SsoError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SsoError> for InfraError {
    fn from(value: SsoError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSsoError {
    fn into_sso(self) -> SsoError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SsoError */
/* -------------------------------------------------------------------------- */

impl IntoSsoError for HttpError {
    fn into_sso(self) -> SsoError {
        if self.is_builder() {
            return SsoError::Config(format!("invalid HTTP client configuration: {self}"));
        }

        if self.is_timeout() {
            return SsoError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SsoError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => SsoError::Unauthorized(message),
                404 => SsoError::NotFound(message),
                _ => SsoError::Network(message),
            };
        }

        SsoError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_sso())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ExtractedError */
/* -------------------------------------------------------------------------- */

/// Flatten a reqwest failure for classification and diagnostics.
///
/// reqwest hides the OS-level reason (refused, DNS, certificate) in its
/// source chain, so the chain is captured whole and a coarse code is added
/// from the error's own predicates.
#[must_use]
pub fn extract_http_error(err: &HttpError) -> ExtractedError {
    let mut extracted = ExtractedError::from_error(err);

    let code = if err.is_timeout() {
        Some("ETIMEDOUT")
    } else if err.is_connect() {
        Some("CONNECT")
    } else if err.is_decode() {
        Some("DECODE")
    } else if err.is_body() {
        Some("BODY")
    } else if err.is_redirect() {
        Some("REDIRECT")
    } else if err.is_request() {
        Some("REQUEST")
    } else {
        None
    };
    if let Some(code) = code {
        extracted = extracted.with_code(code);
    }

    if let Some(status) = err.status() {
        extracted = extracted
            .with_status(status.as_u16(), status.canonical_reason().map(str::to_string));
    }

    if let Some(url) = err.url() {
        extracted = extracted.with_property("url", url.as_str());
    }

    extracted
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_401_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let extracted = extract_http_error(&error);
        assert_eq!(extracted.status, Some(401));
        assert_eq!(extracted.status_text.as_deref(), Some("Unauthorized"));

        let mapped: SsoError = InfraError::from(error).into();
        match mapped {
            SsoError::Unauthorized(msg) => assert!(msg.contains("401")),
            other => panic!("expected unauthorized error, got {other:?}"),
        }
    }

    /// Validates `extract_http_error` behavior for the refused connection
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the connect code is attached.
    /// - Confirms the cause chain is captured and the URL is recorded.
    #[tokio::test]
    async fn refused_connection_keeps_cause_chain() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}/x")).send().await.unwrap_err();

        let extracted = extract_http_error(&error);
        assert_eq!(extracted.code.as_deref(), Some("CONNECT"));
        assert!(!extracted.cause_chain.is_empty());
        assert!(extracted.additional_properties["url"].ends_with("/x"));

        let mapped: SsoError = InfraError::from(error).into();
        assert!(matches!(mapped, SsoError::Network(_)));
    }
}
