//! Deterministic random number generation.
//!
//! RULE: Nothing in the scheduler may call a platform RNG.
//! Every draw flows through a JitterRng seeded either from a
//! configured master seed or from a stable hash of an address.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A seeded PCG stream.
pub struct JitterRng {
    inner: Pcg64Mcg,
}

impl JitterRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Seed from a string key. Same key, same stream, on every platform.
    pub fn for_key(key: &str) -> Self {
        Self::new(fnv1a_64(key.as_bytes()))
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Centred offset in [-span/2, span/2).
    pub fn offset(&mut self, span: f64) -> f64 {
        (self.next_f64() - 0.5) * span
    }
}

/// FNV-1a, 64-bit. Stable across releases, unlike std's DefaultHasher.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(PRIME)
    })
}
