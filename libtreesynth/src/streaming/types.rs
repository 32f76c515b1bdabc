//! Driver-facing configuration and run statistics

use crate::core::{SynthError, SynthResult};
use crate::learn::LearnerConfig;
use crate::tree::MAX_TREE_LEVELS;
use crate::wavelet::FilterChoice;
use serde::{Deserialize, Serialize};

/// Window size used by default: 2^13 = 8192 samples
pub const DEFAULT_WINDOW_LEVELS: usize = 13;

/// What to do with a final window shorter than a power of two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Keep the largest power-of-two prefix and drop the tail
    #[default]
    Truncate,
    /// Zero-pad up to the next power of two, emit only the real samples
    Pad,
}

/// Everything one resynthesis run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub filter: FilterChoice,
    /// Each window holds `2^window_levels` samples
    pub window_levels: usize,
    pub window_policy: WindowPolicy,
    pub learner: LearnerConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            filter: FilterChoice::default(),
            window_levels: DEFAULT_WINDOW_LEVELS,
            window_policy: WindowPolicy::default(),
            learner: LearnerConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(text: &str) -> SynthResult<Self> {
        let config: SynthConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SynthResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Samples per full window
    pub fn window_len(&self) -> usize {
        1 << self.window_levels
    }

    /// Reject configs that could never run, before any audio is touched
    pub fn validate(&self) -> SynthResult<()> {
        if self.window_levels == 0 || self.window_levels > MAX_TREE_LEVELS {
            return Err(SynthError::invalid_param(
                "window_levels",
                format!(
                    "{} must be within 1..={}",
                    self.window_levels, MAX_TREE_LEVELS
                ),
            ));
        }
        self.learner.validate()?;
        self.learner.sweep(self.window_levels)?;
        Ok(())
    }
}

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynthReport {
    /// Windows read from the input
    pub windows: u32,
    /// Windows too short to transform, copied through
    pub passthrough_windows: u32,
    pub samples_in: u64,
    pub samples_out: u64,
    /// Tail samples dropped by [`WindowPolicy::Truncate`]
    pub dropped_samples: u64,
}
