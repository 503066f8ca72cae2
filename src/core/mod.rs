//! The core tracker logic, independent of the delivery layer.
//!
//! The [`Tracker`] is a **closed** tracker: it only serves torrents that the
//! operator has admitted with [`Tracker::announce_torrent`]. Peers for
//! anything else get an [`error::Error::UnknownTorrent`] back, which the HTTP
//! layer turns into a `failure reason` response.
//!
//! Handling a peer announce is the hot path:
//!
//! 1. look the torrent up by info-hash (shared read lock, no write),
//! 2. apply the announce to that torrent's peer table (per-torrent mutex),
//! 3. read the swarm statistics and the peer list for the response.
//!
//! The peer table mutation and the statistics snapshot happen under one lock
//! acquisition, so the `complete`/`incomplete` counts a client observes are
//! consistent with its own announce having been applied.
pub mod error;
pub mod torrent;

use std::net::SocketAddr;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use ttorrent_configuration::{AnnouncePolicy, Configuration, TrackerPolicy, TORRENT_PEERS_LIMIT};
use ttorrent_primitives::info_hash::InfoHash;
use ttorrent_primitives::peer;
use ttorrent_primitives::swarm_metadata::SwarmMetadata;
use ttorrent_clock::clock::Time;

use self::error::Error;
use self::torrent::{TrackedTorrent, Torrents};
use crate::metainfo::Torrent;
use crate::CurrentClock;

/// The closed `BitTorrent` tracker.
pub struct Tracker {
    announce_policy: AnnouncePolicy,
    policy: TrackerPolicy,
    torrents: Torrents,
}

/// What an accepted peer announce returns: the data the response is built
/// from.
#[derive(Clone, Debug)]
pub struct AnnounceData {
    /// Swarm peers, excluding the requesting peer.
    pub peers: Vec<Arc<peer::Peer>>,
    /// Swarm statistics after the announce was applied.
    pub stats: SwarmMetadata,
    /// The announce intervals the client should honor.
    pub policy: AnnouncePolicy,
}

impl Tracker {
    #[must_use]
    pub fn new(config: &Configuration) -> Self {
        Self {
            announce_policy: config.core.announce_policy,
            policy: config.core.tracker_policy,
            torrents: Torrents::default(),
        }
    }

    #[must_use]
    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.announce_policy
    }

    /// Admits a torrent: from now on, announces for its info-hash are served.
    ///
    /// Admissions are serialized. If a torrent with the same info-hash is
    /// already tracked, the existing tracked torrent is returned and the
    /// argument is dropped, so peer tables survive re-admission.
    pub fn announce_torrent(&self, torrent: Torrent) -> Arc<TrackedTorrent> {
        let (tracked, inserted) = self.torrents.insert_if_absent(TrackedTorrent::new(torrent));

        if inserted {
            info!("registered new torrent '{}' with hash {}", tracked.name(), tracked.info_hash());
        } else {
            warn!(
                "torrent '{}' with hash {} was already announced to this tracker",
                tracked.name(),
                tracked.info_hash()
            );
        }

        tracked
    }

    /// Stops tracking a torrent.
    pub fn remove_torrent(&self, info_hash: &InfoHash) -> Option<Arc<TrackedTorrent>> {
        self.torrents.remove(info_hash)
    }

    /// All torrents currently tracked.
    #[must_use]
    pub fn tracked_torrents(&self) -> Vec<Arc<TrackedTorrent>> {
        self.torrents.entries()
    }

    #[must_use]
    pub fn torrents_count(&self) -> usize {
        self.torrents.len()
    }

    /// Handles a peer announce for a tracked torrent.
    ///
    /// `numwant` caps the returned peer list; the effective limit never
    /// exceeds [`TORRENT_PEERS_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTorrent`] when the info-hash has not been
    /// admitted by the operator.
    pub fn announce(&self, info_hash: &InfoHash, peer: &peer::Peer, numwant: Option<usize>) -> Result<AnnounceData, Error> {
        let Some(torrent) = self.torrents.get(info_hash) else {
            return Err(Error::UnknownTorrent {
                info_hash: *info_hash,
                location: Location::caller(),
            });
        };

        debug!("announce from peer {} for torrent {}", peer.peer_id, info_hash);

        torrent.insert_or_update_peer(peer);

        let limit = numwant.unwrap_or(TORRENT_PEERS_LIMIT).min(TORRENT_PEERS_LIMIT);
        let stats = torrent.get_stats();
        let peers = torrent.get_peers_for_client(&peer.peer_addr, Some(limit));

        Ok(AnnounceData {
            peers,
            stats,
            policy: self.announce_policy,
        })
    }

    /// Removes peers that have not announced within the freshness window,
    /// torrent by torrent. Announces for other torrents are never blocked by
    /// the sweep.
    pub fn cleanup_torrents(&self) {
        let cutoff =
            CurrentClock::now_sub(&Duration::from_secs(u64::from(self.policy.max_peer_timeout))).unwrap_or_default();

        for torrent in self.torrents.entries() {
            torrent.remove_inactive_peers(cutoff);
        }
    }

    /// The peers currently known for a torrent, capped as for a response.
    #[must_use]
    pub fn get_torrent_peers(&self, info_hash: &InfoHash) -> Vec<Arc<peer::Peer>> {
        match self.torrents.get(info_hash) {
            None => vec![],
            Some(torrent) => torrent.get_peers(Some(TORRENT_PEERS_LIMIT)),
        }
    }

    /// The peers for a torrent excluding a given client address.
    #[must_use]
    pub fn get_torrent_peers_for_client(&self, info_hash: &InfoHash, client: &SocketAddr) -> Vec<Arc<peer::Peer>> {
        match self.torrents.get(info_hash) {
            None => vec![],
            Some(torrent) => torrent.get_peers_for_client(client, Some(TORRENT_PEERS_LIMIT)),
        }
    }
}
