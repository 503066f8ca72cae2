const DEFAULT_MAX_RECURSION: usize = 50;
const DEFAULT_CHECK_KEY_SORT: bool = false;
const DEFAULT_ENFORCE_FULL_DECODE: bool = true;

/// Options controlling decode behavior.
#[derive(Copy, Clone, Debug)]
pub struct BDecodeOpt {
    max_recursion: usize,
    check_key_sort: bool,
    enforce_full_decode: bool,
}

impl BDecodeOpt {
    #[must_use]
    pub fn new(max_recursion: usize, check_key_sort: bool, enforce_full_decode: bool) -> BDecodeOpt {
        BDecodeOpt {
            max_recursion,
            check_key_sort,
            enforce_full_decode,
        }
    }

    /// Options for a strict decode: out-of-order dictionary keys are rejected
    /// and the whole input must be consumed. Inputs accepted under these
    /// options round-trip byte-for-byte through the encoder.
    #[must_use]
    pub fn strict() -> BDecodeOpt {
        BDecodeOpt::new(DEFAULT_MAX_RECURSION, true, true)
    }

    /// Maximum nesting depth allowed while decoding.
    #[must_use]
    pub fn max_recursion(&self) -> usize {
        self.max_recursion
    }

    /// Whether out-of-order dictionary keys are an error.
    ///
    /// Duplicate keys are always an error regardless of this option.
    #[must_use]
    pub fn check_key_sort(&self) -> bool {
        self.check_key_sort
    }

    /// Whether the decoded value must consume the whole input.
    ///
    /// Disable this when the bencoded value is a prefix of a larger payload;
    /// the length of the decoded prefix is then `bencode.buffer().len()`.
    #[must_use]
    pub fn enforce_full_decode(&self) -> bool {
        self.enforce_full_decode
    }
}

impl Default for BDecodeOpt {
    fn default() -> BDecodeOpt {
        BDecodeOpt::new(DEFAULT_MAX_RECURSION, DEFAULT_CHECK_KEY_SORT, DEFAULT_ENFORCE_FULL_DECODE)
    }
}
