//! Liveness endpoint, `GET /health_check`.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[allow(clippy::unused_async)]
pub async fn handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}
