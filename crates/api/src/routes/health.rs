use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::AppContext;

/// `GET /health`: 200 when healthy, 503 otherwise, component detail as JSON.
pub async fn health_check(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let status = ctx.health_check().await;
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
