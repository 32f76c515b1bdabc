//! Error types for the transform and the tree learner.

use thiserror::Error;

/// Result type for treesynth operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur while transforming or synthesizing a window.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// Filter bank requested with a tap count outside {4, 10, 12}.
    #[error("unsupported filter length {taps}: expected 4, 10 or 12 taps")]
    UnsupportedFilterLength {
        /// Requested tap count.
        taps: usize,
    },

    /// Buffer length is zero or not a power of two.
    #[error("invalid buffer size {len}: length must be a non-zero power of two")]
    InvalidBufferSize {
        /// Offending length.
        len: usize,
    },

    /// Start/stop levels do not describe a sweep inside the tree.
    #[error("invalid level range {start}..={stop} for a tree with {levels} levels")]
    InvalidLevelRange {
        /// Configured start level.
        start: i32,
        /// Configured stop level.
        stop: i32,
        /// Level count of the tree being synthesized.
        levels: usize,
    },

    /// The source tree has no levels to learn from.
    #[error("source tree has no levels")]
    EmptySourceTree,

    /// The scratch buffer for a transform step could not be allocated.
    #[error("failed to allocate a scratch buffer of {len} samples")]
    AllocationFailure {
        /// Requested scratch length.
        len: usize,
    },

    /// A configuration value is outside its domain.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SynthError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Short stable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            SynthError::UnsupportedFilterLength { .. } => "TS_001",
            SynthError::InvalidBufferSize { .. } => "TS_002",
            SynthError::InvalidLevelRange { .. } => "TS_003",
            SynthError::EmptySourceTree => "TS_004",
            SynthError::AllocationFailure { .. } => "TS_005",
            SynthError::InvalidParameter { .. } => "TS_006",
            SynthError::Config(_) => "TS_007",
        }
    }
}

impl From<serde_json::Error> for SynthError {
    fn from(e: serde_json::Error) -> Self {
        SynthError::Config(e.to_string())
    }
}
