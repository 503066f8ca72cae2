//! Deterministic pseudo-random data for test fixtures.
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A buffer of `len` pseudo-random bytes derived from `seed`. The same seed
/// always yields the same bytes, so fixtures built from it are reproducible.
#[must_use]
pub fn seeded_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}
