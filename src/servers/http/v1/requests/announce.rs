//! The `announce` request: parsing the query parameters into domain types.
use std::fmt;
use std::net::IpAddr;
use std::panic::Location;
use std::str::FromStr;

use thiserror::Error;
use ttorrent_primitives::info_hash::{self, InfoHash};
use ttorrent_primitives::peer::{self, IdConversionError};
use ttorrent_primitives::NumberOfBytes;

use crate::servers::http::percent_encoding::{percent_decode_info_hash, percent_decode_peer_id};
use crate::servers::http::v1::query::{ParseQueryError, Query};
use crate::servers::http::v1::responses;

// Query param names.
const INFO_HASH: &str = "info_hash";
const PEER_ID: &str = "peer_id";
const PORT: &str = "port";
const UPLOADED: &str = "uploaded";
const DOWNLOADED: &str = "downloaded";
const LEFT: &str = "left";
const EVENT: &str = "event";
const COMPACT: &str = "compact";
const NUMWANT: &str = "numwant";
const IP: &str = "ip";

/// An `announce` request with all query params parsed into domain types.
///
/// `info_hash`, `peer_id`, `port`, `uploaded`, `downloaded` and `left` are
/// mandatory; the rest are optional. The peer `ip` param is honored when
/// present, otherwise the tracker uses the request's source address.
#[derive(Debug, PartialEq, Eq)]
pub struct Announce {
    // Mandatory params
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub port: u16,
    pub uploaded: NumberOfBytes,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,

    // Optional params
    pub event: Option<Event>,
    pub compact: Option<Compact>,
    pub numwant: Option<u64>,
    pub ip: Option<IpAddr>,
}

/// Errors parsing an [`Announce`] request from the query params.
#[derive(Error, Debug)]
pub enum ParseAnnounceQueryError {
    /// The request carried no query string at all.
    #[error("missing query params for announce request in {location}")]
    MissingParams { location: &'static Location<'static> },

    /// A mandatory param is absent.
    #[error("missing param {param_name} in {location}")]
    MissingParam {
        location: &'static Location<'static>,
        param_name: String,
    },

    /// A param value cannot be parsed into its domain type.
    #[error("invalid param value {param_value} for {param_name} in {location}")]
    InvalidParam {
        param_name: String,
        param_value: String,
        location: &'static Location<'static>,
    },

    /// The event value is not one of `started`, `stopped`, `completed`.
    #[error("invalid event {param_value} in {location}")]
    InvalidEvent {
        param_value: String,
        location: &'static Location<'static>,
    },

    /// The peer's contact data (port or ip) failed validation.
    #[error("invalid peer: param value {param_value} for {param_name} in {location}")]
    InvalidPeer {
        param_name: String,
        param_value: String,
        location: &'static Location<'static>,
    },

    #[error("invalid param value {param_value} for {param_name}: {source}")]
    InvalidInfoHashParam {
        param_name: String,
        param_value: String,
        source: info_hash::ConversionError,
    },

    #[error("invalid param value {param_value} for {param_name}: {source}")]
    InvalidPeerIdParam {
        param_name: String,
        param_value: String,
        source: IdConversionError,
    },
}

/// The event the peer is reporting: `started`, `stopped` or `completed`.
///
/// An absent or empty event means a regular interval announce.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Event {
    Started,
    Stopped,
    Completed,
}

impl FromStr for Event {
    type Err = ParseAnnounceQueryError;

    fn from_str(raw_param: &str) -> Result<Self, Self::Err> {
        match raw_param {
            "started" => Ok(Self::Started),
            "stopped" => Ok(Self::Stopped),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseAnnounceQueryError::InvalidEvent {
                param_value: raw_param.to_owned(),
                location: Location::caller(),
            }),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Started => write!(f, "started"),
            Event::Stopped => write!(f, "stopped"),
            Event::Completed => write!(f, "completed"),
        }
    }
}

/// Whether the client asked for the compact (BEP 23) response form.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Compact {
    /// The client prefers the compact packed-string form.
    Accepted = 1,
    /// The client prefers the original dictionary form.
    NotAccepted = 0,
}

impl FromStr for Compact {
    type Err = ParseAnnounceQueryError;

    fn from_str(raw_param: &str) -> Result<Self, Self::Err> {
        match raw_param {
            "1" => Ok(Self::Accepted),
            "0" => Ok(Self::NotAccepted),
            _ => Err(ParseAnnounceQueryError::InvalidParam {
                param_name: COMPACT.to_owned(),
                param_value: raw_param.to_owned(),
                location: Location::caller(),
            }),
        }
    }
}

impl From<ParseQueryError> for responses::error::Error {
    fn from(err: ParseQueryError) -> Self {
        responses::error::Error {
            failure_reason: format!("Cannot parse query params: {err}"),
        }
    }
}

impl From<ParseAnnounceQueryError> for responses::error::Error {
    fn from(err: ParseAnnounceQueryError) -> Self {
        responses::error::Error {
            failure_reason: format!("Cannot parse query params for announce request: {err}"),
        }
    }
}

impl TryFrom<Query> for Announce {
    type Error = ParseAnnounceQueryError;

    fn try_from(query: Query) -> Result<Self, Self::Error> {
        Ok(Self {
            info_hash: extract_info_hash(&query)?,
            peer_id: extract_peer_id(&query)?,
            port: extract_port(&query)?,
            uploaded: extract_number_of_bytes(UPLOADED, &query)?,
            downloaded: extract_number_of_bytes(DOWNLOADED, &query)?,
            left: extract_number_of_bytes(LEFT, &query)?,
            event: extract_event(&query)?,
            compact: extract_compact(&query)?,
            numwant: extract_numwant(&query)?,
            ip: extract_ip(&query)?,
        })
    }
}

// Mandatory params

fn extract_info_hash(query: &Query) -> Result<InfoHash, ParseAnnounceQueryError> {
    match query.get_param(INFO_HASH) {
        Some(raw_param) => {
            Ok(
                percent_decode_info_hash(&raw_param).map_err(|err| ParseAnnounceQueryError::InvalidInfoHashParam {
                    param_name: INFO_HASH.to_owned(),
                    param_value: raw_param.clone(),
                    source: err,
                })?,
            )
        }
        None => Err(ParseAnnounceQueryError::MissingParam {
            location: Location::caller(),
            param_name: INFO_HASH.to_owned(),
        }),
    }
}

fn extract_peer_id(query: &Query) -> Result<peer::Id, ParseAnnounceQueryError> {
    match query.get_param(PEER_ID) {
        Some(raw_param) => Ok(
            percent_decode_peer_id(&raw_param).map_err(|err| ParseAnnounceQueryError::InvalidPeerIdParam {
                param_name: PEER_ID.to_owned(),
                param_value: raw_param.clone(),
                source: err,
            })?,
        ),
        None => Err(ParseAnnounceQueryError::MissingParam {
            location: Location::caller(),
            param_name: PEER_ID.to_owned(),
        }),
    }
}

fn extract_port(query: &Query) -> Result<u16, ParseAnnounceQueryError> {
    match query.get_param(PORT) {
        Some(raw_param) => {
            let port = u16::from_str(&raw_param).map_err(|_| ParseAnnounceQueryError::InvalidParam {
                param_name: PORT.to_owned(),
                param_value: raw_param.clone(),
                location: Location::caller(),
            })?;

            // A peer cannot be contacted on port zero.
            if port == 0 {
                return Err(ParseAnnounceQueryError::InvalidPeer {
                    param_name: PORT.to_owned(),
                    param_value: raw_param,
                    location: Location::caller(),
                });
            }

            Ok(port)
        }
        None => Err(ParseAnnounceQueryError::MissingParam {
            location: Location::caller(),
            param_name: PORT.to_owned(),
        }),
    }
}

fn extract_number_of_bytes(param_name: &str, query: &Query) -> Result<NumberOfBytes, ParseAnnounceQueryError> {
    match query.get_param(param_name) {
        Some(raw_param) => u64::from_str(&raw_param).map_err(|_| ParseAnnounceQueryError::InvalidParam {
            param_name: param_name.to_owned(),
            param_value: raw_param.clone(),
            location: Location::caller(),
        }),
        None => Err(ParseAnnounceQueryError::MissingParam {
            location: Location::caller(),
            param_name: param_name.to_owned(),
        }),
    }
}

// Optional params

fn extract_event(query: &Query) -> Result<Option<Event>, ParseAnnounceQueryError> {
    match query.get_param(EVENT) {
        // An empty event is the same as an absent one.
        Some(raw_param) if raw_param.is_empty() => Ok(None),
        Some(raw_param) => Ok(Some(Event::from_str(&raw_param)?)),
        None => Ok(None),
    }
}

fn extract_compact(query: &Query) -> Result<Option<Compact>, ParseAnnounceQueryError> {
    match query.get_param(COMPACT) {
        Some(raw_param) => Ok(Some(Compact::from_str(&raw_param)?)),
        None => Ok(None),
    }
}

fn extract_numwant(query: &Query) -> Result<Option<u64>, ParseAnnounceQueryError> {
    match query.get_param(NUMWANT) {
        Some(raw_param) => Ok(Some(u64::from_str(&raw_param).map_err(|_| {
            ParseAnnounceQueryError::InvalidParam {
                param_name: NUMWANT.to_owned(),
                param_value: raw_param.clone(),
                location: Location::caller(),
            }
        })?)),
        None => Ok(None),
    }
}

fn extract_ip(query: &Query) -> Result<Option<IpAddr>, ParseAnnounceQueryError> {
    match query.get_param(IP) {
        Some(raw_param) => Ok(Some(IpAddr::from_str(&raw_param).map_err(|_| {
            ParseAnnounceQueryError::InvalidPeer {
                param_name: IP.to_owned(),
                param_value: raw_param.clone(),
                location: Location::caller(),
            }
        })?)),
        None => Ok(None),
    }
}
