//! The HTTP tracker routes.
use std::sync::Arc;

use axum::http::header::SERVER;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use super::handlers::{announce, health_check};
use crate::core::Tracker;
use crate::servers::http::SERVER_BANNER;

/// The router serving the announce protocol.
///
/// Unknown paths fall through to axum's default `404`; every known route
/// answers `200`, protocol errors included.
#[must_use]
pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route("/health_check", get(health_check::handler))
        .route("/announce", get(announce::handle).with_state(tracker))
        .layer(SetResponseHeaderLayer::overriding(
            SERVER,
            HeaderValue::from_static(SERVER_BANNER),
        ))
}
