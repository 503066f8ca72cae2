//! Request handlers for the announce endpoint.
pub mod announce;
pub mod health_check;
