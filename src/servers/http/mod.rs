//! The HTTP tracker: the delivery layer speaking the `BitTorrent` HTTP
//! announce protocol on top of the [`core`](crate::core) tracker.
//!
//! The wire contract:
//!
//! - `GET /announce` with the standard announce query parameters
//!   (`info_hash` and `peer_id` are percent-encoded raw bytes, not UTF-8
//!   text).
//! - Responses are bencoded with `Content-Type: text/plain`.
//! - Protocol-level failures come back as a bencoded
//!   `{"failure reason": ...}` dictionary with HTTP status `200`, per
//!   `BitTorrent` convention. Only unknown paths get a `404`.
pub mod percent_encoding;
pub mod server;
pub mod v1;

/// Value of the `Server:` header on every response.
pub const SERVER_BANNER: &str = concat!("BitTorrent Tracker (ttorrent/", env!("CARGO_PKG_VERSION"), ")");
