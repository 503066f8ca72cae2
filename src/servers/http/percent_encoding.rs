//! Percent decoding of the binary announce parameters.
//!
//! `info_hash` and `peer_id` are percent-encoded byte arrays, not UTF-8
//! strings: decoding them must collect raw bytes. Percent-encoding crates
//! that insist on well-formed UTF-8 output cannot be used for this, which is
//! the whole reason these two helpers exist.
use ttorrent_primitives::info_hash::{self, InfoHash};
use ttorrent_primitives::peer;

/// Percent-decodes an info-hash query parameter into its 20-byte form.
///
/// For example, the info-hash `3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0` is
/// transmitted as `%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0`.
///
/// # Errors
///
/// Will return an error if the decoded bytes are not exactly 20.
pub fn percent_decode_info_hash(raw_info_hash: &str) -> Result<InfoHash, info_hash::ConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_info_hash).collect::<Vec<u8>>();
    InfoHash::try_from(bytes)
}

/// Percent-decodes a peer id query parameter into its 20-byte form.
///
/// # Errors
///
/// Will return an error if the decoded bytes are not exactly 20.
pub fn percent_decode_peer_id(raw_peer_id: &str) -> Result<peer::Id, peer::IdConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_peer_id).collect::<Vec<u8>>();
    peer::Id::try_from(bytes)
}
