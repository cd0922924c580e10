//! Deterministic simulation RNG.
//!
//! Wraps `ChaCha8Rng` for cross-platform deterministic randomness. All
//! simulation randomness flows through either a [`SimRng`] owned by the
//! caller or a per-tile stream from [`tile_rng`], so identical seeds produce
//! identical simulation output — including under parallel chunk updates,
//! where each tile derives its own independent stream.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Deterministic RNG for single-threaded simulation randomness.
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    /// Create a new `SimRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Derive an independent RNG stream for one tile update.
///
/// The stream depends only on the world seed, the owning chunk's
/// coordinates, the tile index, and the tick, so a tile update produces the
/// same values no matter which worker runs it or in what order.
pub fn tile_rng(world_seed: u64, cx: u16, cy: u16, tile: usize, tick: u64) -> ChaCha8Rng {
    let mut h = world_seed ^ 0x9E37_79B9_7F4A_7C15;
    for v in [cx as u64, cy as u64, tile as u64, tick] {
        h ^= v
            .wrapping_add(0x9E37_79B9_7F4A_7C15)
            .wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h = h.rotate_left(27);
    }
    ChaCha8Rng::seed_from_u64(h)
}
