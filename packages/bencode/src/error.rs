use thiserror::Error;

/// Result of a decode operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors raised while decoding bencoded bytes.
///
/// Every variant carries `pos`, the byte offset in the input at which the
/// problem was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unexpected end of input at byte {pos}")]
    UnexpectedEof { pos: usize },

    #[error("invalid value prefix byte at {pos}")]
    InvalidByte { pos: usize },

    #[error("integer without terminating delimiter at {pos}")]
    UnterminatedInt { pos: usize },

    #[error("negative zero integer at {pos}")]
    NegativeZeroInt { pos: usize },

    #[error("zero padded integer at {pos}")]
    ZeroPaddedInt { pos: usize },

    #[error("integer failed to parse at {pos}")]
    UnparsableInt { pos: usize },

    #[error("negative byte string length at {pos}")]
    NegativeLength { pos: usize },

    #[error("byte string length overflows remaining input at {pos}")]
    LengthOverflow { pos: usize },

    #[error("dictionary keys out of order at {pos} for key {key:?}")]
    UnsortedKeys { pos: usize, key: Vec<u8> },

    #[error("duplicate dictionary key at {pos} for key {key:?}")]
    DuplicateKey { pos: usize, key: Vec<u8> },

    #[error("recursion limit of {max} exceeded at {pos}")]
    RecursionLimitExceeded { pos: usize, max: usize },

    #[error("trailing bytes after the decoded value at {pos}")]
    TrailingBytes { pos: usize },
}
