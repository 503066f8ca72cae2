//! Axum extractor for the [`Announce`] request.
//!
//! It parses the raw URL query into an [`Announce`] value. Any parse failure
//! is rejected with a bencoded `failure reason` response (HTTP `200`, per
//! `BitTorrent` convention), e.g. for a request with no query params:
//!
//! ```text
//! d14:failure reason...:Cannot parse query params for announce request: missing query params for announce request ...e
//! ```
use std::panic::Location;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::requests::announce::{Announce, ParseAnnounceQueryError};
use crate::servers::http::v1::responses;

/// Extractor for the [`Announce`] request.
pub struct ExtractRequest(pub Announce);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match extract_announce_from(parts.uri.query()) {
            Ok(announce_request) => Ok(ExtractRequest(announce_request)),
            Err(error) => Err(error.into_response()),
        }
    }
}

fn extract_announce_from(maybe_raw_query: Option<&str>) -> Result<Announce, responses::error::Error> {
    let Some(raw_query) = maybe_raw_query else {
        return Err(responses::error::Error::from(ParseAnnounceQueryError::MissingParams {
            location: Location::caller(),
        }));
    };

    let query = raw_query.parse::<Query>().map_err(responses::error::Error::from)?;

    let announce_request = Announce::try_from(query).map_err(responses::error::Error::from)?;

    Ok(announce_request)
}
