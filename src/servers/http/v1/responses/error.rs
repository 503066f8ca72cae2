//! The `failure reason` error response.
//!
//! From [BEP 03. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html):
//!
//! _"Tracker responses are bencoded dictionaries. If a tracker response has a
//! key failure reason, then that maps to a human readable string which
//! explains why the query failed, and no other keys are required."_
//!
//! Error responses are bencoded and always use a `200 OK` status code;
//! protocol-level failures are not HTTP failures.
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ttorrent_bencode::{ben_bytes, ben_map};

/// A protocol-level error, surfaced to the client as `failure reason`.
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    /// Human readable string explaining why the request failed.
    pub failure_reason: String,
}

impl Error {
    /// The bencoded body of the error response.
    ///
    /// ```rust
    /// use ttorrent::servers::http::v1::responses::error::Error;
    ///
    /// let err = Error {
    ///     failure_reason: "error message".to_owned(),
    /// };
    ///
    /// assert_eq!(err.body(), b"d14:failure reason13:error messagee");
    /// ```
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        (ben_map! {
            "failure reason" => ben_bytes!(self.failure_reason.clone())
        })
        .encode()
    }
}

impl From<crate::core::error::Error> for Error {
    fn from(err: crate::core::error::Error) -> Self {
        Error {
            failure_reason: format!("Tracker error: {err}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], self.body()).into_response()
    }
}
