//! Data structures for the torrents the tracker is willing to serve.
//!
//! A [`TrackedTorrent`] pairs a torrent's metainfo with its swarm (the
//! [`entry::Entry`] peer table). The [`Torrents`] repository indexes tracked
//! torrents by info-hash: admissions are serialized behind a write lock while
//! lookups share a read lock, and each swarm has its own mutex so mutating one
//! torrent's peer table never blocks announces for another torrent.
pub mod entry;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, RwLock};

use ttorrent_primitives::info_hash::InfoHash;
use ttorrent_primitives::peer;
use ttorrent_primitives::swarm_metadata::SwarmMetadata;
use ttorrent_primitives::DurationSinceUnixEpoch;

use crate::metainfo::Torrent;

/// A torrent announced to the tracker by the operator, together with the
/// swarm of peers announcing for it.
pub struct TrackedTorrent {
    torrent: Torrent,
    swarm: Mutex<entry::Entry>,
}

impl TrackedTorrent {
    #[must_use]
    pub fn new(torrent: Torrent) -> Self {
        Self {
            torrent,
            swarm: Mutex::new(entry::Entry::default()),
        }
    }

    /// The metainfo this torrent was admitted with.
    #[must_use]
    pub fn torrent(&self) -> &Torrent {
        &self.torrent
    }

    #[must_use]
    pub fn info_hash(&self) -> InfoHash {
        self.torrent.info_hash()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.torrent.name()
    }

    /// Applies one peer announce to the swarm.
    pub fn insert_or_update_peer(&self, peer: &peer::Peer) {
        self.lock_swarm().insert_or_update_peer(peer);
    }

    #[must_use]
    pub fn get_stats(&self) -> SwarmMetadata {
        self.lock_swarm().get_stats()
    }

    #[must_use]
    pub fn seeders(&self) -> u32 {
        self.lock_swarm().seeders()
    }

    #[must_use]
    pub fn leechers(&self) -> u32 {
        self.lock_swarm().leechers()
    }

    #[must_use]
    pub fn peers_count(&self) -> usize {
        self.lock_swarm().peers_count()
    }

    #[must_use]
    pub fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.lock_swarm().get_peers(limit)
    }

    #[must_use]
    pub fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.lock_swarm().get_peers_for_client(client, limit)
    }

    /// Removes peers whose last announce is older than the cutoff.
    pub fn remove_inactive_peers(&self, cutoff: DurationSinceUnixEpoch) {
        self.lock_swarm().remove_inactive_peers(cutoff);
    }

    fn lock_swarm(&self) -> std::sync::MutexGuard<'_, entry::Entry> {
        self.swarm.lock().expect("it should lock the swarm")
    }
}

/// The tracker's torrent registry.
#[derive(Default)]
pub struct Torrents {
    torrents: RwLock<BTreeMap<InfoHash, Arc<TrackedTorrent>>>,
}

impl Torrents {
    /// Looks up a tracked torrent by info-hash.
    #[must_use]
    pub fn get(&self, info_hash: &InfoHash) -> Option<Arc<TrackedTorrent>> {
        self.read().get(info_hash).cloned()
    }

    /// All tracked torrents.
    #[must_use]
    pub fn entries(&self) -> Vec<Arc<TrackedTorrent>> {
        self.read().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Inserts a torrent unless one with the same info-hash is already
    /// tracked. Returns the tracked torrent (the existing one on collision)
    /// and whether the insert happened.
    pub fn insert_if_absent(&self, torrent: TrackedTorrent) -> (Arc<TrackedTorrent>, bool) {
        let mut torrents = self.write();

        match torrents.get(&torrent.info_hash()) {
            Some(existing) => (existing.clone(), false),
            None => {
                let tracked = Arc::new(torrent);
                torrents.insert(tracked.info_hash(), tracked.clone());
                (tracked, true)
            }
        }
    }

    /// Stops tracking a torrent, returning it if it was tracked.
    pub fn remove(&self, info_hash: &InfoHash) -> Option<Arc<TrackedTorrent>> {
        self.write().remove(info_hash)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<InfoHash, Arc<TrackedTorrent>>> {
        self.torrents.read().expect("it should get a read lock on the registry")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<InfoHash, Arc<TrackedTorrent>>> {
        self.torrents.write().expect("it should get a write lock on the registry")
    }
}
