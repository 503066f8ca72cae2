use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use ttorrent_primitives::announce_event::AnnounceEvent;
use ttorrent_primitives::peer;
use ttorrent_primitives::swarm_metadata::SwarmMetadata;
use ttorrent_primitives::DurationSinceUnixEpoch;

/// The swarm of one tracked torrent: the peers downloading or seeding it,
/// keyed by peer id.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    pub(crate) peers: BTreeMap<peer::Id, Arc<peer::Peer>>,
}

impl Entry {
    /// Applies one announce to the peer table.
    ///
    /// - `stopped` removes a known peer and ignores an unknown one.
    /// - An absent event on a peer's first announce is stored as `started`;
    ///   on a known peer it is a regular update that keeps the stored state.
    /// - Everything else inserts or updates the peer as announced.
    ///
    /// The peer's `updated` timestamp is whatever the caller put in `peer`,
    /// which for live announces is the request time.
    pub fn insert_or_update_peer(&mut self, peer: &peer::Peer) {
        match peer.event {
            AnnounceEvent::Stopped => {
                drop(self.peers.remove(&peer.peer_id));
            }
            AnnounceEvent::None => {
                let mut stored = *peer;
                stored.event = match self.peers.get(&peer.peer_id) {
                    Some(known) => known.event,
                    None => AnnounceEvent::Started,
                };
                drop(self.peers.insert(stored.peer_id, Arc::new(stored)));
            }
            _ => {
                drop(self.peers.insert(peer.peer_id, Arc::new(*peer)));
            }
        }
    }

    /// Swarm statistics derived from the peer table.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn get_stats(&self) -> SwarmMetadata {
        let complete: u32 = self.peers.values().filter(|peer| peer.is_seeder()).count() as u32;
        let incomplete: u32 = self.peers.len() as u32 - complete;

        SwarmMetadata { complete, incomplete }
    }

    /// Number of peers with nothing left to download.
    #[must_use]
    pub fn seeders(&self) -> u32 {
        self.get_stats().complete
    }

    /// Number of peers still downloading.
    #[must_use]
    pub fn leechers(&self) -> u32 {
        self.get_stats().incomplete
    }

    #[must_use]
    pub fn peers_count(&self) -> usize {
        self.peers.len()
    }

    /// All swarm peers, optionally limited.
    #[must_use]
    pub fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        match limit {
            Some(limit) => self.peers.values().take(limit).cloned().collect(),
            None => self.peers.values().cloned().collect(),
        }
    }

    /// The peers to hand to a requesting client: everyone in the swarm except
    /// the client itself, up to `limit`.
    #[must_use]
    pub fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        match limit {
            Some(limit) => self
                .peers
                .values()
                .filter(|peer| peer.peer_addr != *client)
                .take(limit)
                .cloned()
                .collect(),
            None => self.peers.values().filter(|peer| peer.peer_addr != *client).cloned().collect(),
        }
    }

    /// Removes peers whose last announce is older than the cutoff.
    pub fn remove_inactive_peers(&mut self, cutoff: DurationSinceUnixEpoch) {
        self.peers.retain(|_, peer| peer.updated > cutoff);
    }
}

#[cfg(test)]
mod tests {

    mod torrent_entry {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        use std::time::Duration;

        use ttorrent_clock::clock::{self, Time};
        use ttorrent_primitives::announce_event::AnnounceEvent;
        use ttorrent_primitives::peer::fixture::PeerBuilder;
        use ttorrent_primitives::peer::{self, Peer};

        use crate::core::torrent::entry::Entry;

        fn a_peer() -> Peer {
            PeerBuilder::default().build()
        }

        fn peer_id_from_i32(number: i32) -> peer::Id {
            let bytes = number.to_le_bytes();
            peer::Id([
                0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, bytes[0], bytes[1], bytes[2],
                bytes[3],
            ])
        }

        #[test]
        fn a_new_entry_should_have_an_empty_peer_table() {
            let entry = Entry::default();

            assert_eq!(entry.peers_count(), 0);
        }

        #[test]
        fn a_first_announce_should_insert_the_peer() {
            let mut entry = Entry::default();

            entry.insert_or_update_peer(&a_peer());

            assert_eq!(entry.peers_count(), 1);
        }

        #[test]
        fn a_first_announce_without_an_event_should_store_the_peer_as_started() {
            let mut entry = Entry::default();

            entry.insert_or_update_peer(&PeerBuilder::default().with_event(AnnounceEvent::None).build());

            assert_eq!(entry.get_peers(None)[0].event, AnnounceEvent::Started);
        }

        #[test]
        fn an_announce_without_an_event_should_keep_the_stored_state_of_a_known_peer() {
            let mut entry = Entry::default();

            entry.insert_or_update_peer(&PeerBuilder::default().with_event(AnnounceEvent::Completed).build());
            entry.insert_or_update_peer(&PeerBuilder::default().with_event(AnnounceEvent::None).build());

            assert_eq!(entry.get_peers(None)[0].event, AnnounceEvent::Completed);
        }

        #[test]
        fn a_completed_announce_should_update_the_stored_state() {
            let mut entry = Entry::default();
            let mut peer = a_peer();

            entry.insert_or_update_peer(&peer);

            peer.event = AnnounceEvent::Completed;
            entry.insert_or_update_peer(&peer);

            assert_eq!(entry.get_peers(None)[0].event, AnnounceEvent::Completed);
        }

        #[test]
        fn a_stopped_announce_should_remove_a_known_peer() {
            let mut entry = Entry::default();
            let mut peer = a_peer();

            entry.insert_or_update_peer(&peer);
            peer.event = AnnounceEvent::Stopped;
            entry.insert_or_update_peer(&peer);

            assert_eq!(entry.peers_count(), 0);
        }

        #[test]
        fn a_stopped_announce_from_an_unknown_peer_should_be_ignored() {
            let mut entry = Entry::default();

            entry.insert_or_update_peer(&PeerBuilder::default().with_event(AnnounceEvent::Stopped).build());

            assert_eq!(entry.peers_count(), 0);
        }

        #[test]
        fn seeders_are_peers_with_nothing_left_to_download() {
            let mut entry = Entry::default();

            entry.insert_or_update_peer(&PeerBuilder::seeder().build());
            entry.insert_or_update_peer(&PeerBuilder::leecher().build());

            assert_eq!(entry.seeders(), 1);
            assert_eq!(entry.leechers(), 1);

            let stats = entry.get_stats();
            assert_eq!(stats.complete, 1);
            assert_eq!(stats.incomplete, 1);
        }

        #[test]
        fn the_peer_list_for_a_client_should_not_include_the_client_itself() {
            let mut entry = Entry::default();
            let client_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);

            entry.insert_or_update_peer(&PeerBuilder::default().with_peer_addr(&client_addr).build());

            assert_eq!(entry.get_peers_for_client(&client_addr, None).len(), 0);
        }

        #[test]
        fn two_peers_on_the_same_ip_but_different_ports_are_different_peers() {
            let mut entry = Entry::default();
            let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

            let peer_1 = PeerBuilder::default()
                .with_peer_id(&peer_id_from_i32(1))
                .with_peer_addr(&SocketAddr::new(ip, 8080))
                .build();
            let peer_2 = PeerBuilder::default()
                .with_peer_id(&peer_id_from_i32(2))
                .with_peer_addr(&SocketAddr::new(ip, 8081))
                .build();

            entry.insert_or_update_peer(&peer_1);
            entry.insert_or_update_peer(&peer_2);

            let peers = entry.get_peers_for_client(&peer_1.peer_addr, None);

            assert_eq!(peers.len(), 1);
            assert_eq!(peers[0].peer_addr.port(), 8081);
        }

        #[test]
        fn the_peer_list_should_be_truncated_to_the_given_limit() {
            let mut entry = Entry::default();

            for number in 1..=75 {
                entry.insert_or_update_peer(&PeerBuilder::default().with_peer_id(&peer_id_from_i32(number)).build());
            }

            assert_eq!(entry.get_peers(Some(74)).len(), 74);
        }

        #[test]
        fn peers_older_than_the_cutoff_should_be_removed() {
            let mut entry = Entry::default();
            let now = clock::Working::now();

            let stale = PeerBuilder::default()
                .with_peer_id(&peer_id_from_i32(1))
                .last_updated_on(now - Duration::from_secs(121))
                .build();
            let fresh = PeerBuilder::default()
                .with_peer_id(&peer_id_from_i32(2))
                .last_updated_on(now)
                .build();

            entry.insert_or_update_peer(&stale);
            entry.insert_or_update_peer(&fresh);

            entry.remove_inactive_peers(now - Duration::from_secs(120));

            assert_eq!(entry.peers_count(), 1);
            assert_eq!(entry.get_peers(None)[0].peer_id, peer_id_from_i32(2));
        }
    }
}
