//! Seeded randomness shared by every hook of a run.
//!
//! A run owns exactly one generator, created from the configured seed and
//! handed by `&mut` to each hook in call order. Two runs with the same seed
//! and the same hooks therefore draw the same numbers.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator type passed to hooks.
pub type SimRng = ChaCha8Rng;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0;

/// Create the generator for a run.
pub fn seeded(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}
