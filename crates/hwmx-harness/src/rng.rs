//! Seeded RNG streams for matrix generation.
//!
//! Each numeric kind draws from its own PCG32 stream derived from the run's
//! base seed, so a failing kind can be reproduced without replaying the
//! kinds tested before it.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::kind::NumericKind;

/// Creates a PCG32 RNG from a 64-bit seed.
pub fn create_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Derives the seed for one kind's stream from the base seed.
///
/// BLAKE3 over the little-endian base seed followed by the kind index,
/// truncated to the first 8 bytes.
pub fn derive_kind_seed(base_seed: u64, kind: NumericKind) -> u64 {
    let mut input = Vec::with_capacity(12);
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(&kind.index().to_le_bytes());

    let hash = blake3::hash(&input);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Creates the RNG stream for one kind.
pub fn create_kind_rng(base_seed: u64, kind: NumericKind) -> Pcg32 {
    create_rng(derive_kind_seed(base_seed, kind))
}

/// Seed taken from wall-clock seconds, used when none is given.
pub fn seed_from_clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
