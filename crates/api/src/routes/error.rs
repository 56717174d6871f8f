//! HTTP mapping of gateway errors

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ssogate_domain::SsoError;
use tracing::error;

/// Error returned by the JSON/plain-text routes.
///
/// Validation and state failures are `401`; provider-side failures are
/// `502` with the classified message; anything unexpected is a bare `500`.
#[derive(Debug)]
pub struct ApiError(pub SsoError);

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self.0 {
            SsoError::InvalidInput(_)
            | SsoError::State(_)
            | SsoError::Unauthorized(_)
            | SsoError::NotFound(_) => StatusCode::UNAUTHORIZED,
            SsoError::Discovery(_)
            | SsoError::TokenExchange(_)
            | SsoError::Network(_)
            | SsoError::Config(_) => StatusCode::BAD_GATEWAY,
            SsoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SsoError> for ApiError {
    fn from(err: SsoError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            SsoError::Internal(detail) => {
                error!(detail = %detail, "internal error while handling request");
                "Internal server error".to_string()
            }
            other => other.message().to_string(),
        };

        (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let status = |err: SsoError| ApiError(err).status();

        assert_eq!(status(SsoError::InvalidInput("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(SsoError::State("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(SsoError::NotFound("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(SsoError::Discovery("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status(SsoError::Config("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status(SsoError::Internal("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let response = ApiError(SsoError::Internal("mutex poisoned".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
