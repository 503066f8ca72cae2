//! A `BitTorrent` info-hash: the 20-byte SHA-1 of the bencoded `info`
//! substructure of a torrent's metainfo. It is the identity of a swarm.
//!
//! Typically surfaced as a 40-character hex string, internally a 20-byte
//! array.
use std::panic::Location;

use thiserror::Error;

pub const INFO_HASH_BYTES_LEN: usize = 20;

/// `BitTorrent` info-hash v1.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; INFO_HASH_BYTES_LEN]);

impl InfoHash {
    /// The internal byte array.
    #[must_use]
    pub fn bytes(&self) -> [u8; INFO_HASH_BYTES_LEN] {
        self.0
    }

    /// The info-hash as an uppercase 40-character hex string.
    ///
    /// # Panics
    ///
    /// Only if the fixed-size output buffer were too small, which it is not.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut chars = [0u8; INFO_HASH_BYTES_LEN * 2];
        binascii::bin2hex(&self.0, &mut chars).expect("it should fit the output buffer");
        std::str::from_utf8(&chars)
            .expect("hex digits are valid utf8")
            .to_uppercase()
    }
}

impl std::fmt::Display for InfoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chars = [0u8; INFO_HASH_BYTES_LEN * 2];
        binascii::bin2hex(&self.0, &mut chars).expect("it should fit the output buffer");
        write!(f, "{}", std::str::from_utf8(&chars).expect("hex digits are valid utf8"))
    }
}

impl std::str::FromStr for InfoHash {
    type Err = binascii::ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != INFO_HASH_BYTES_LEN * 2 {
            return Err(binascii::ConvertError::InvalidInputLength);
        }
        let mut info_hash = Self::default();
        binascii::hex2bin(s.as_bytes(), &mut info_hash.0)?;
        Ok(info_hash)
    }
}

impl From<[u8; INFO_HASH_BYTES_LEN]> for InfoHash {
    fn from(bytes: [u8; INFO_HASH_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

/// Errors converting a byte vector into an [`InfoHash`]. An info-hash is
/// exactly 20 bytes.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("not enough bytes for infohash: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    #[error("too many bytes for infohash: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

impl TryFrom<Vec<u8>> for InfoHash {
    type Error = ConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < INFO_HASH_BYTES_LEN {
            return Err(ConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), INFO_HASH_BYTES_LEN},
            });
        }
        if bytes.len() > INFO_HASH_BYTES_LEN {
            return Err(ConversionError::TooManyBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), INFO_HASH_BYTES_LEN},
            });
        }

        let mut info_hash = Self::default();
        info_hash.0.copy_from_slice(&bytes);
        Ok(info_hash)
    }
}
