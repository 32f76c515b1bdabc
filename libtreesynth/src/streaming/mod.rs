//! Window-by-window resynthesis of long recordings
//!
//! A recording is cut into fixed-size windows; each window is transformed,
//! learned and inverse-transformed on its own with a seed derived from the
//! window index. No state carries from one window to the next.
mod reader;
mod resynth;
mod types;

pub use reader::WindowReader;
pub use resynth::Resynthesizer;
pub use types::{SynthConfig, SynthReport, WindowPolicy, DEFAULT_WINDOW_LEVELS};
