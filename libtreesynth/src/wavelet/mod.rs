//! Periodic wavelet pyramid transform over power-of-two buffers
//!
//! Two step kernels are available: the closed-form Daubechies 4-tap step and
//! a general step driven by a [`FilterBank`] with 4, 10 or 12 taps.

pub mod filter;
pub mod transform;

pub use filter::{FilterBank, SUPPORTED_TAPS};
pub use transform::{Direction, Wavelet};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which step kernel a run uses
///
/// Serialized as `"daub4"` or `{"filter_bank": {"taps": 10}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterChoice {
    /// Fixed 4-tap step
    Daub4,
    /// General filter-bank step
    FilterBank { taps: usize },
}

impl Default for FilterChoice {
    fn default() -> Self {
        FilterChoice::FilterBank { taps: 10 }
    }
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::Daub4 => write!(f, "daub4"),
            FilterChoice::FilterBank { taps } => write!(f, "pwt{}", taps),
        }
    }
}

impl FromStr for FilterChoice {
    type Err = String;

    /// Accepts `daub4`, or `pwt<taps>` / `bank<taps>` for a filter bank
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower == "daub4" {
            return Ok(FilterChoice::Daub4);
        }

        let digits = lower
            .strip_prefix("pwt")
            .or_else(|| lower.strip_prefix("bank"))
            .ok_or_else(|| format!("unknown filter '{}': use daub4, pwt4, pwt10 or pwt12", s))?;

        let taps: usize = digits
            .parse()
            .map_err(|_| format!("invalid tap count in filter '{}'", s))?;

        Ok(FilterChoice::FilterBank { taps })
    }
}
