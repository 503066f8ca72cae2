//! The URL query component of an announce request, parsed but not yet
//! interpreted.
//!
//! Values stay percent-encoded here: `info_hash` and `peer_id` carry raw
//! bytes that only the request layer knows how to decode.
use std::panic::Location;
use std::str::FromStr;

use multimap::MultiMap;
use thiserror::Error;

type ParamName = String;
type ParamValue = String;

/// A parsed URL query: a multimap from parameter names to values.
#[derive(Debug)]
pub struct Query {
    params: MultiMap<ParamName, NameValuePair>,
}

impl Query {
    /// The first value of a parameter, if the parameter is present.
    ///
    /// ```rust
    /// use ttorrent::servers::http::v1::query::Query;
    ///
    /// let query = "port=6881&numwant=50".parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("port").unwrap(), "6881");
    /// assert_eq!(query.get_param("numwant").unwrap(), "50");
    /// assert!(query.get_param("event").is_none());
    /// ```
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).map(|pair| pair.value.clone())
    }
}

/// Errors parsing a [`Query`] from a string.
#[derive(Error, Debug)]
pub enum ParseQueryError {
    /// A param with an unescaped `=` in its value, for example
    /// `"name=value=value"`.
    #[error("invalid param {raw_param} in {location}")]
    InvalidParam {
        location: &'static Location<'static>,
        raw_param: String,
    },
}

impl FromStr for Query {
    type Err = ParseQueryError;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        for raw_param in raw_query.trim().trim_start_matches('?').split('&') {
            let pair: NameValuePair = raw_param.parse()?;
            let param_name = pair.name.clone();
            params.insert(param_name, pair);
        }

        Ok(Self { params })
    }
}

impl From<Vec<(&str, &str)>> for Query {
    fn from(raw_params: Vec<(&str, &str)>) -> Self {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        for (name, value) in raw_params {
            params.insert(name.to_owned(), NameValuePair::new(name, value));
        }

        Self { params }
    }
}

#[derive(Debug, PartialEq, Clone)]
struct NameValuePair {
    name: ParamName,
    value: ParamValue,
}

impl NameValuePair {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

impl FromStr for NameValuePair {
    type Err = ParseQueryError;

    fn from_str(raw_param: &str) -> Result<Self, Self::Err> {
        let pair = raw_param.split('=').collect::<Vec<&str>>();

        if pair.len() != 2 {
            return Err(ParseQueryError::InvalidParam {
                location: Location::caller(),
                raw_param: raw_param.to_owned(),
            });
        }

        Ok(Self::new(pair[0], pair[1]))
    }
}
