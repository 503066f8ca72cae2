//! Axum extractors for the announce endpoint.
pub mod announce_request;
pub mod client_ip;
