//! Seeded PCG32 streams for the learner.
//!
//! Every random choice the synthesizer makes (root flip, candidate sampling,
//! tie-breaking) draws from a `Pcg32` seeded here, so a run is reproducible
//! from its base seed. Windows get independent streams derived with BLAKE3.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a PCG32 RNG from a 64-bit seed.
pub fn create_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Derives the seed for one window of a longer recording.
///
/// Hashes the base seed concatenated with the window index, so successive
/// windows draw from unrelated streams.
pub fn derive_window_seed(base_seed: u64, window_index: u64) -> u64 {
    let mut input = [0u8; 16];
    input[..8].copy_from_slice(&base_seed.to_le_bytes());
    input[8..].copy_from_slice(&window_index.to_le_bytes());

    let hash = blake3::hash(&input);

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Creates the RNG for a specific window.
pub fn create_window_rng(base_seed: u64, window_index: u64) -> Pcg32 {
    create_rng(derive_window_seed(base_seed, window_index))
}
