//! Tracker configurations for tests.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ttorrent_configuration::Configuration;

/// A configuration for an ephemeral test tracker: it binds to a free port on
/// the loopback interface and uses short intervals so tests do not have to
/// wait long for freshness-based behavior.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut configuration = Configuration::default();

    // Port 0 means the OS assigns a free port.
    configuration.http_tracker.bind_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);

    configuration.core.announce_policy.interval = 1;
    configuration.core.announce_policy.interval_min = 1;
    configuration.core.tracker_policy.max_peer_timeout = 2;
    configuration.core.peer_collection_interval = 1;

    configuration
}
