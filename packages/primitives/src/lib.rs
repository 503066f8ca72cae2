//! Primitive types shared by the tracker core, the metainfo engine and the
//! delivery layers.
use std::time::Duration;

pub mod announce_event;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;

/// Duration since the Unix Epoch (a timestamp).
pub type DurationSinceUnixEpoch = Duration;

/// Number of bytes uploaded, downloaded or left to download.
pub type NumberOfBytes = u64;
