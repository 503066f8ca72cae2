use derive_more::Constructor;

/// Swarm statistics for one torrent.
///
/// Field names follow the announce response dictionary: `complete` is the
/// number of seeders, `incomplete` the number of leechers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Constructor)]
pub struct SwarmMetadata {
    /// Active peers that have completed downloading (seeders).
    pub complete: u32,
    /// Active peers that have not completed downloading (leechers).
    pub incomplete: u32,
}

impl SwarmMetadata {
    #[must_use]
    pub fn zeroed() -> Self {
        Self::default()
    }
}
