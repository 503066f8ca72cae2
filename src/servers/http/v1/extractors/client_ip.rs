//! Axum extractor for the client's IP address, taken from the connection
//! info.
//!
//! The tracker prefers the request's source address over anything the client
//! claims, unless the announce request carries an explicit `ip` param (which
//! the handler resolves, not this extractor).
use std::net::{IpAddr, SocketAddr};

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::servers::http::v1::responses;

/// Extractor for the IP the request came from.
pub struct Extract(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for Extract
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Ok(Extract(addr.ip())),
            None => Err(responses::error::Error {
                failure_reason: "cannot get the client IP from the connection info".to_owned(),
            }
            .into_response()),
        }
    }
}
