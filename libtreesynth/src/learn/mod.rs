//! Wavelet tree learning and synthesis
//!
//! Each coefficient in the learned levels is replaced by a source
//! coefficient whose ancestors and left neighbours match what has already
//! been written to the new tree, drawn from the best match and any
//! candidate within the configured tolerance of it. The coarsest pair is seeded from
//! the source so the result keeps the window's overall level and shape.

pub mod config;
pub mod synth;

pub use config::{LearnerConfig, MatchPolicy};
pub use synth::{TreeSynthesizer, PREDECESSOR_WINDOW};
