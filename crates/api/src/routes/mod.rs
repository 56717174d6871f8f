//! axum router for the gateway's HTTP surface

pub mod auth;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use ssogate_domain::constants::{AUTHORIZE_PATH_PREFIX, CALLBACK_PATH};

pub use error::ApiError;

use crate::AppContext;

/// Path of the administrative provider check.
pub const VALIDATE_PATH: &str = "/graphql/api/auth/oidc/providers/{provider_id}/validate";

pub fn create_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(&format!("{AUTHORIZE_PATH_PREFIX}/{{provider_id}}"), get(auth::authorize))
        .route(CALLBACK_PATH, get(auth::callback))
        .route(VALIDATE_PATH, get(auth::validate_provider))
        .with_state(ctx)
}
