//! Bencoded response bodies for the HTTP announce protocol.
pub mod announce;
pub mod error;
