//! `ttorrent` is a `BitTorrent` tracker and metainfo engine, used as the
//! dependency-distribution substrate for a build tool.
//!
//! It has three tightly coupled subsystems:
//!
//! - The **metainfo engine** ([`metainfo`]): parses and builds `.torrent`
//!   metainfo, deriving the canonical info-hash, with a parallel SHA-1
//!   piece-hashing pipeline for torrent creation.
//! - The **closed tracker core** ([`core`]): an in-memory registry of
//!   operator-admitted torrents, each with its swarm of peers; only announce
//!   requests for admitted torrents are accepted.
//! - The **HTTP delivery layer** ([`servers::http`]): the `GET /announce`
//!   endpoint speaking the `BitTorrent` HTTP announce protocol.
//!
//! The [`storage`] module is the thin byte-storage contract consumed by
//! downloading clients; the piece-exchange client itself lives elsewhere.
pub mod app;
pub mod bootstrap;
pub mod core;
pub mod metainfo;
pub mod servers;
pub mod storage;

/// Working clock in production, stopped clock under test.
#[cfg(not(test))]
pub(crate) type CurrentClock = ttorrent_clock::clock::Working;

#[cfg(test)]
pub(crate) type CurrentClock = ttorrent_clock::clock::Stopped;
