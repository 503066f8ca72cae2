//! The `announce` response bodies: the dictionary form and the compact (BEP
//! 23) packed form.
use std::io::Write;
use std::net::IpAddr;
use std::panic::Location;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use ttorrent_bencode::{ben_bytes, ben_int, ben_list, ben_map, BMutAccess, BencodeMut};
use ttorrent_configuration::AnnouncePolicy;
use ttorrent_primitives::peer;
use ttorrent_primitives::swarm_metadata::SwarmMetadata;

use crate::core::AnnounceData;
use crate::servers::http::v1::responses;

/// The dictionary (non compact) `announce` response.
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr};
/// use ttorrent::servers::http::v1::responses::announce::{Normal, NormalPeer};
/// use ttorrent_configuration::AnnouncePolicy;
/// use ttorrent_primitives::swarm_metadata::SwarmMetadata;
///
/// let response = Normal {
///     policy: AnnouncePolicy {
///         interval: 111,
///         interval_min: 222,
///     },
///     stats: SwarmMetadata {
///         complete: 333,
///         incomplete: 444,
///     },
///     peers: vec![NormalPeer {
///         peer_id: *b"-qB00000000000000001",
///         ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)), // 105.105.105.105
///         port: 0x7070,                                          // 28784
///     }],
/// };
///
/// let expected = b"d8:completei333e10:incompletei444e8:intervali111e12:min intervali222e5:peersld2:ip15:105.105.105.1057:peer id20:-qB000000000000000014:porti28784eeee";
///
/// assert_eq!(response.body(), expected.to_vec());
/// ```
#[derive(Debug, PartialEq)]
pub struct Normal {
    pub policy: AnnouncePolicy,
    pub stats: SwarmMetadata,
    pub peers: Vec<NormalPeer>,
}

/// One peer entry in the [`Normal`] response.
#[derive(Debug, PartialEq, Eq)]
pub struct NormalPeer {
    pub peer_id: [u8; 20],
    pub ip: IpAddr,
    pub port: u16,
}

impl NormalPeer {
    #[must_use]
    pub fn ben_map(&self) -> BencodeMut<'_> {
        ben_map! {
            "peer id" => ben_bytes!(self.peer_id.to_vec()),
            "ip" => ben_bytes!(self.ip.to_string()),
            "port" => ben_int!(i64::from(self.port))
        }
    }
}

impl From<peer::Peer> for NormalPeer {
    fn from(peer: peer::Peer) -> Self {
        NormalPeer {
            peer_id: peer.peer_id.0,
            ip: peer.peer_addr.ip(),
            port: peer.peer_addr.port(),
        }
    }
}

impl Normal {
    /// The bencoded body of the dictionary response.
    ///
    /// # Panics
    ///
    /// Only if the freshly built list were not a list, which it is.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let mut peers_list = ben_list!();
        let peers_list_mut = peers_list.list_mut().expect("it should access the peer list");
        for peer in &self.peers {
            peers_list_mut.push(peer.ben_map());
        }

        (ben_map! {
            "complete" => ben_int!(i64::from(self.stats.complete)),
            "incomplete" => ben_int!(i64::from(self.stats.incomplete)),
            "interval" => ben_int!(i64::from(self.policy.interval)),
            "min interval" => ben_int!(i64::from(self.policy.interval_min)),
            "peers" => peers_list.clone()
        })
        .encode()
    }
}

impl IntoResponse for Normal {
    fn into_response(self) -> Response {
        (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], self.body()).into_response()
    }
}

impl From<AnnounceData> for Normal {
    fn from(data: AnnounceData) -> Self {
        let peers: Vec<NormalPeer> = data.peers.iter().map(|peer| NormalPeer::from(**peer)).collect();

        Self {
            policy: data.policy,
            stats: data.stats,
            peers,
        }
    }
}

/// The compact `announce` response.
///
/// _"To reduce the size of tracker responses and to reduce memory and
/// computational requirements in trackers, trackers may return peers as a
/// packed string rather than as a bencoded list."_
///
/// IPv4 peers go into `peers` as 6 bytes each (4 address + 2 port, network
/// byte order); IPv6 peers go into `peers6` as 18 bytes each.
///
/// Refer to the official BEPs for more information:
///
/// - [BEP 23: Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
/// - [BEP 07: IPv6 Tracker Extension](https://www.bittorrent.org/beps/bep_0007.html)
#[derive(Debug, PartialEq)]
pub struct Compact {
    pub policy: AnnouncePolicy,
    pub stats: SwarmMetadata,
    pub peers: Vec<CompactPeer>,
}

/// One peer entry in the [`Compact`] response: address and port only, no
/// peer id.
#[derive(Debug, PartialEq, Eq)]
pub struct CompactPeer {
    pub ip: IpAddr,
    pub port: u16,
}

impl CompactPeer {
    /// The packed byte form of this peer.
    ///
    /// # Errors
    ///
    /// Will return `Err` if writing into the in-memory buffer fails.
    pub fn bytes(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut bytes: Vec<u8> = Vec::new();
        match self.ip {
            IpAddr::V4(ip) => {
                bytes.write_all(&u32::from(ip).to_be_bytes())?;
            }
            IpAddr::V6(ip) => {
                bytes.write_all(&u128::from(ip).to_be_bytes())?;
            }
        }
        bytes.write_all(&self.port.to_be_bytes())?;
        Ok(bytes)
    }
}

impl From<peer::Peer> for CompactPeer {
    fn from(peer: peer::Peer) -> Self {
        CompactPeer {
            ip: peer.peer_addr.ip(),
            port: peer.peer_addr.port(),
        }
    }
}

impl Compact {
    /// The bencoded body of the compact response.
    ///
    /// # Errors
    ///
    /// Will return `Err` if writing into the in-memory buffer fails.
    pub fn body(&self) -> Result<Vec<u8>, std::io::Error> {
        let bytes = (ben_map! {
            "complete" => ben_int!(i64::from(self.stats.complete)),
            "incomplete" => ben_int!(i64::from(self.stats.incomplete)),
            "interval" => ben_int!(i64::from(self.policy.interval)),
            "min interval" => ben_int!(i64::from(self.policy.interval_min)),
            "peers" => ben_bytes!(self.peers_v4_bytes()?),
            "peers6" => ben_bytes!(self.peers_v6_bytes()?)
        })
        .encode();

        Ok(bytes)
    }

    fn peers_v4_bytes(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut bytes: Vec<u8> = Vec::new();
        for compact_peer in &self.peers {
            if compact_peer.ip.is_ipv4() {
                bytes.write_all(&compact_peer.bytes()?)?;
            }
        }
        Ok(bytes)
    }

    fn peers_v6_bytes(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut bytes: Vec<u8> = Vec::new();
        for compact_peer in &self.peers {
            if compact_peer.ip.is_ipv6() {
                bytes.write_all(&compact_peer.bytes()?)?;
            }
        }
        Ok(bytes)
    }
}

/// `Compact` response serialization error.
#[derive(Error, Debug)]
pub enum CompactSerializationError {
    #[error("cannot write bytes: {inner_error} in {location}")]
    CannotWriteBytes {
        location: &'static Location<'static>,
        inner_error: String,
    },
}

impl From<CompactSerializationError> for responses::error::Error {
    fn from(err: CompactSerializationError) -> Self {
        responses::error::Error {
            failure_reason: format!("{err}"),
        }
    }
}

impl IntoResponse for Compact {
    fn into_response(self) -> Response {
        match self.body() {
            Ok(bytes) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], bytes).into_response(),
            Err(err) => responses::error::Error::from(CompactSerializationError::CannotWriteBytes {
                location: Location::caller(),
                inner_error: format!("{err}"),
            })
            .into_response(),
        }
    }
}

impl From<AnnounceData> for Compact {
    fn from(data: AnnounceData) -> Self {
        let peers: Vec<CompactPeer> = data.peers.iter().map(|peer| CompactPeer::from(**peer)).collect();

        Self {
            policy: data.policy,
            stats: data.stats,
            peers,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use ttorrent_configuration::AnnouncePolicy;
    use ttorrent_primitives::swarm_metadata::SwarmMetadata;

    use super::{Compact, CompactPeer, Normal, NormalPeer};

    // The IP addresses and port numbers are chosen so that their bencoded
    // representation is also a valid string, which keeps the asserts
    // readable: 0x69 is 'i', 0x70 is 'p'.

    fn sample_policy() -> AnnouncePolicy {
        AnnouncePolicy {
            interval: 111,
            interval_min: 222,
        }
    }

    fn sample_stats() -> SwarmMetadata {
        SwarmMetadata {
            complete: 333,
            incomplete: 444,
        }
    }

    #[test]
    fn the_dictionary_response_can_be_bencoded() {
        let response = Normal {
            policy: sample_policy(),
            stats: sample_stats(),
            peers: vec![
                // IPV4
                NormalPeer {
                    peer_id: *b"-qB00000000000000001",
                    ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)), // 105.105.105.105
                    port: 0x7070,                                          // 28784
                },
                // IPV6
                NormalPeer {
                    peer_id: *b"-qB00000000000000002",
                    ip: IpAddr::V6(Ipv6Addr::new(0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969)),
                    port: 0x7070,
                },
            ],
        };

        let expected = b"d8:completei333e10:incompletei444e8:intervali111e12:min intervali222e5:peersld2:ip15:105.105.105.1057:peer id20:-qB000000000000000014:porti28784eed2:ip39:6969:6969:6969:6969:6969:6969:6969:69697:peer id20:-qB000000000000000024:porti28784eeee";

        assert_eq!(
            String::from_utf8(response.body()).unwrap(),
            String::from_utf8(expected.to_vec()).unwrap()
        );
    }

    #[test]
    fn an_empty_peer_list_bencodes_to_an_empty_list() {
        let response = Normal {
            policy: sample_policy(),
            stats: SwarmMetadata::zeroed(),
            peers: vec![],
        };

        assert_eq!(
            String::from_utf8(response.body()).unwrap(),
            "d8:completei0e10:incompletei0e8:intervali111e12:min intervali222e5:peerslee"
        );
    }

    #[test]
    fn the_compact_response_can_be_bencoded() {
        let response = Compact {
            policy: sample_policy(),
            stats: sample_stats(),
            peers: vec![
                // IPV4
                CompactPeer {
                    ip: IpAddr::V4(Ipv4Addr::new(0x69, 0x69, 0x69, 0x69)),
                    port: 0x7070,
                },
                // IPV6
                CompactPeer {
                    ip: IpAddr::V6(Ipv6Addr::new(0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969, 0x6969)),
                    port: 0x7070,
                },
            ],
        };

        let expected =
            b"d8:completei333e10:incompletei444e8:intervali111e12:min intervali222e5:peers6:iiiipp6:peers618:iiiiiiiiiiiiiiiippe";

        assert_eq!(
            String::from_utf8(response.body().unwrap()).unwrap(),
            String::from_utf8(expected.to_vec()).unwrap()
        );
    }
}
