//! Errors raised by the tracker core while handling announce requests.
use std::panic::Location;

use thiserror::Error;
use ttorrent_primitives::info_hash::InfoHash;

/// This is a closed tracker: announces are only accepted for torrents the
/// operator has admitted.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("unknown torrent: {info_hash}, in {location}")]
    UnknownTorrent {
        info_hash: InfoHash,
        location: &'static Location<'static>,
    },
}
