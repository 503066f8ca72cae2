//! Peer types used by the tracker core.
//!
//! A peer is identified inside one swarm by its 20-byte [`Id`]; everything
//! else about it comes from the latest `announce` request it sent.
use std::net::{IpAddr, SocketAddr};
use std::panic::Location;

use thiserror::Error;

use crate::announce_event::AnnounceEvent;
use crate::{DurationSinceUnixEpoch, NumberOfBytes};

pub const PEER_ID_BYTES_LEN: usize = 20;

/// A peer's 20-byte identifier, unique within a torrent's peer table.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Id(pub [u8; PEER_ID_BYTES_LEN]);

impl Id {
    /// The peer id as a lowercase hex string.
    ///
    /// # Panics
    ///
    /// Only if the fixed-size output buffer were too small, which it is not.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut chars = [0u8; PEER_ID_BYTES_LEN * 2];
        binascii::bin2hex(&self.0, &mut chars).expect("it should fit the output buffer");
        std::str::from_utf8(&chars).expect("hex digits are valid utf8").to_owned()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl std::str::FromStr for Id {
    type Err = IdConversionError;

    /// Parses the raw 20-byte client id, e.g. `-qB00000000000000001`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Id::try_from(s.as_bytes().to_vec())
    }
}

impl From<[u8; PEER_ID_BYTES_LEN]> for Id {
    fn from(bytes: [u8; PEER_ID_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

/// Errors converting another type into an [`Id`]. A peer id is exactly 20
/// bytes.
#[derive(Error, Debug)]
pub enum IdConversionError {
    #[error("not enough bytes for peer id: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    #[error("too many bytes for peer id: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

impl TryFrom<Vec<u8>> for Id {
    type Error = IdConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < PEER_ID_BYTES_LEN {
            return Err(IdConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), PEER_ID_BYTES_LEN},
            });
        }
        if bytes.len() > PEER_ID_BYTES_LEN {
            return Err(IdConversionError::TooManyBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), PEER_ID_BYTES_LEN},
            });
        }

        let mut id = [0u8; PEER_ID_BYTES_LEN];
        id.copy_from_slice(&bytes);
        Ok(Self(id))
    }
}

/// A peer participating in a swarm, as last reported by its `announce`
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    /// Id chosen by the peer itself.
    pub peer_id: Id,
    /// The IP and port the peer is listening on.
    pub peer_addr: SocketAddr,
    /// Last time the tracker received an announce from this peer.
    pub updated: DurationSinceUnixEpoch,
    /// Total bytes uploaded by this peer so far.
    pub uploaded: NumberOfBytes,
    /// Total bytes downloaded by this peer so far.
    pub downloaded: NumberOfBytes,
    /// Bytes this peer still has to download.
    pub left: NumberOfBytes,
    /// The last announce event reported by the peer.
    pub event: AnnounceEvent,
}

impl Peer {
    /// A seeder has the complete data: nothing left to download.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left == 0 && self.event != AnnounceEvent::Stopped
    }

    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.peer_addr.ip()
    }

    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.peer_addr = SocketAddr::new(*new_ip, self.peer_addr.port());
    }
}

impl Ord for Peer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.peer_id.cmp(&other.peer_id)
    }
}

impl PartialOrd for Peer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use super::{Id, Peer};
    use crate::announce_event::AnnounceEvent;
    use crate::DurationSinceUnixEpoch;

    #[derive(PartialEq, Debug)]
    pub struct PeerBuilder {
        peer: Peer,
    }

    impl Default for PeerBuilder {
        fn default() -> Self {
            Self {
                peer: Peer {
                    peer_id: Id(*b"-qB00000000000000000"),
                    peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                    updated: DurationSinceUnixEpoch::new(1_669_397_478, 0),
                    uploaded: 0,
                    downloaded: 0,
                    left: 0,
                    event: AnnounceEvent::Started,
                },
            }
        }
    }

    impl PeerBuilder {
        #[must_use]
        pub fn seeder() -> Self {
            Self::default()
                .with_peer_id(&Id(*b"-qB00000000000000001"))
                .with_no_bytes_pending_to_download()
                .with_event(AnnounceEvent::Completed)
        }

        #[must_use]
        pub fn leecher() -> Self {
            Self::default()
                .with_peer_id(&Id(*b"-qB00000000000000002"))
                .with_bytes_pending_to_download(10)
                .with_event(AnnounceEvent::Started)
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: &Id) -> Self {
            self.peer.peer_id = *peer_id;
            self
        }

        #[must_use]
        pub fn with_peer_addr(mut self, peer_addr: &SocketAddr) -> Self {
            self.peer.peer_addr = *peer_addr;
            self
        }

        #[must_use]
        pub fn with_event(mut self, event: AnnounceEvent) -> Self {
            self.peer.event = event;
            self
        }

        #[must_use]
        pub fn with_bytes_pending_to_download(mut self, left: u64) -> Self {
            self.peer.left = left;
            self
        }

        #[must_use]
        pub fn with_no_bytes_pending_to_download(mut self) -> Self {
            self.peer.left = 0;
            self
        }

        #[must_use]
        pub fn last_updated_on(mut self, updated: DurationSinceUnixEpoch) -> Self {
            self.peer.updated = updated;
            self
        }

        #[must_use]
        pub fn build(self) -> Peer {
            self.peer
        }
    }
}

#[cfg(test)]
mod tests {
    mod peer_id {
        use crate::peer::Id;

        #[test]
        fn it_should_fail_converting_from_a_byte_vector_with_less_than_20_bytes() {
            assert!(Id::try_from([0; 19].to_vec()).is_err());
        }

        #[test]
        fn it_should_fail_converting_from_a_byte_vector_with_more_than_20_bytes() {
            assert!(Id::try_from([0; 21].to_vec()).is_err());
        }

        #[test]
        fn it_should_be_converted_to_a_hex_string() {
            let id = Id(*b"-qB00000000000000000");
            assert_eq!(id.to_hex_string(), "2d71423030303030303030303030303030303030");

            let id = Id([0, 159, 146, 150, 0, 159, 146, 150, 0, 159, 146, 150, 0, 159, 146, 150, 0, 159, 146, 150]);
            assert_eq!(id.to_hex_string(), "009f9296009f9296009f9296009f9296009f9296");
        }
    }

    mod peer {
        use crate::announce_event::AnnounceEvent;
        use crate::peer::fixture::PeerBuilder;

        #[test]
        fn it_should_be_a_seeder_with_nothing_left_to_download() {
            let peer = PeerBuilder::default().with_no_bytes_pending_to_download().build();

            assert!(peer.is_seeder());
        }

        #[test]
        fn it_should_not_be_a_seeder_with_bytes_left_to_download() {
            let peer = PeerBuilder::default().with_bytes_pending_to_download(1).build();

            assert!(!peer.is_seeder());
        }

        #[test]
        fn it_should_not_be_a_seeder_after_announcing_it_stopped() {
            let peer = PeerBuilder::default()
                .with_no_bytes_pending_to_download()
                .with_event(AnnounceEvent::Stopped)
                .build();

            assert!(!peer.is_seeder());
        }
    }
}
