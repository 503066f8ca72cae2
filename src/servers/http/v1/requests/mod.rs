//! Request models for the HTTP announce protocol.
pub mod announce;
