//! Configuration for the tracker.
//!
//! The whole configuration can be loaded from a TOML file; every field has a
//! default, so an empty file (or no file at all) yields a working test-scale
//! tracker on the standard `BitTorrent` tracker port `6969`.
//!
//! ```toml
//! [core]
//! announce_interval = 60
//! max_peer_timeout = 120
//! peer_collection_interval = 15
//!
//! [http_tracker]
//! bind_address = "0.0.0.0:6969"
//! ```
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cap on the number of peers returned in one announce response.
pub const TORRENT_PEERS_LIMIT: usize = 74;

/// The whole tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Configuration {
    #[serde(default)]
    pub core: Core,
    #[serde(default)]
    pub http_tracker: HttpTracker,
}

impl Configuration {
    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return an error if the file cannot be read or does not contain a
    /// valid configuration.
    pub fn load_from_file(path: &Path) -> Result<Configuration, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::UnableToLoadFromFile {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| Error::UnableToParse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Errors loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to read configuration file {path}: {source}")]
    UnableToLoadFromFile {
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse configuration file {path}: {source}")]
    UnableToParse {
        path: String,
        source: toml::de::Error,
    },
}

/// Core (delivery-layer independent) tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Core {
    /// Verbosity of the logs written to standard output.
    #[serde(default = "Core::default_log_level")]
    pub log_level: Option<LogLevel>,

    /// Announce policy returned to clients.
    #[serde(default = "Core::default_announce_policy")]
    pub announce_policy: AnnouncePolicy,

    /// Peer freshness and eviction policy.
    #[serde(default = "Core::default_tracker_policy")]
    pub tracker_policy: TrackerPolicy,

    /// Interval in seconds between sweeps of the peer collector, which
    /// removes peers that have not announced within `max_peer_timeout`.
    #[serde(default = "Core::default_peer_collection_interval")]
    pub peer_collection_interval: u64,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            announce_policy: Self::default_announce_policy(),
            tracker_policy: Self::default_tracker_policy(),
            peer_collection_interval: Self::default_peer_collection_interval(),
        }
    }
}

impl Core {
    fn default_log_level() -> Option<LogLevel> {
        Some(LogLevel::Info)
    }

    fn default_announce_policy() -> AnnouncePolicy {
        AnnouncePolicy::default()
    }

    fn default_tracker_policy() -> TrackerPolicy {
        TrackerPolicy::default()
    }

    fn default_peer_collection_interval() -> u64 {
        15
    }
}

/// Announce intervals returned to clients.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct AnnouncePolicy {
    /// Seconds a client should wait between regular announces.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// Minimum seconds between announces; clients must not announce more
    /// frequently than this.
    #[serde(default = "AnnouncePolicy::default_interval_min")]
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            interval_min: Self::default_interval_min(),
        }
    }
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        60
    }

    fn default_interval_min() -> u32 {
        60
    }
}

/// Peer freshness policy.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct TrackerPolicy {
    /// Seconds without an announce after which a peer is no longer fresh and
    /// gets evicted. Must be strictly greater than the announce interval so
    /// that a peer re-announcing on schedule stays fresh.
    #[serde(default = "TrackerPolicy::default_max_peer_timeout")]
    pub max_peer_timeout: u32,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            max_peer_timeout: Self::default_max_peer_timeout(),
        }
    }
}

impl TrackerPolicy {
    fn default_max_peer_timeout() -> u32 {
        120
    }
}

/// HTTP tracker (delivery layer) configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct HttpTracker {
    /// The address the HTTP announce endpoint binds to. The default port is
    /// the `BitTorrent` tracker convention, `6969`.
    #[serde(default = "HttpTracker::default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for HttpTracker {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
        }
    }
}

impl HttpTracker {
    fn default_bind_address() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 6969)
    }
}

/// Verbosity levels for the logs.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[cfg(test)]
mod tests {
    use crate::Configuration;

    #[test]
    fn configuration_should_have_a_complete_default() {
        let configuration = Configuration::default();

        assert_eq!(configuration.core.announce_policy.interval, 60);
        assert_eq!(configuration.core.tracker_policy.max_peer_timeout, 120);
        assert_eq!(configuration.core.peer_collection_interval, 15);
        assert_eq!(configuration.http_tracker.bind_address.port(), 6969);
    }

    #[test]
    fn freshness_window_should_exceed_the_announce_interval() {
        let configuration = Configuration::default();

        assert!(configuration.core.tracker_policy.max_peer_timeout > configuration.core.announce_policy.interval);
    }

    #[test]
    fn configuration_should_be_parsed_from_toml() {
        let toml = r#"
            [core]
            peer_collection_interval = 5

            [core.announce_policy]
            interval = 1800
            interval_min = 900

            [http_tracker]
            bind_address = "127.0.0.1:7070"
        "#;

        let configuration: Configuration = toml::from_str(toml).unwrap();

        assert_eq!(configuration.core.announce_policy.interval, 1800);
        assert_eq!(configuration.core.announce_policy.interval_min, 900);
        assert_eq!(configuration.core.peer_collection_interval, 5);
        assert_eq!(configuration.http_tracker.bind_address.port(), 7070);
        // Unspecified sections keep their defaults.
        assert_eq!(configuration.core.tracker_policy.max_peer_timeout, 120);
    }
}
