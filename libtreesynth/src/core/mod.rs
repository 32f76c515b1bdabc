pub mod analysis;
pub mod error;
pub mod rng;

pub use analysis::{level_energy, spectral_similarity, SpectralProfile, PROFILE_BANDS};
pub use error::{SynthError, SynthResult};
pub use rng::{create_rng, create_window_rng, derive_window_seed};
