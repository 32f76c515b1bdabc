use crate::core::{SynthError, SynthResult};
use serde::{Deserialize, Serialize};

/// How a target node picks its source coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Best match of ancestor and predecessor context
    #[default]
    Similarity,
    /// Copy the coefficient at the same position, reproducing the source
    ExactPosition,
}

/// Knobs of one learning/synthesis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Fraction of a level kept after ranking by the primary context.
    /// 0 keeps every candidate.
    pub candidate_factor: f32,
    /// Swap the two root coefficients with probability 1/2
    pub randomize_root_order: bool,
    /// Fraction of each source level considered as candidates, in [0, 1]
    pub sampling_percentage: f32,
    /// Rank candidates by ancestors first (otherwise by predecessors)
    pub ancestors_first: bool,
    /// First level to learn
    pub start_level: i32,
    /// Last level to learn
    pub stop_level: i32,
    /// Draw among equally good candidates instead of taking the first
    pub randomize_ties: bool,
    /// Candidates within `best + match_tolerance * mean` of the best
    /// distance count as equally good. 0 keeps exact ties only.
    pub match_tolerance: f32,
    pub match_policy: MatchPolicy,
    /// Base seed of every random choice
    pub seed: u64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            candidate_factor: 1.0,
            randomize_root_order: true,
            sampling_percentage: 1.0,
            ancestors_first: true,
            start_level: 1,
            stop_level: 9,
            randomize_ties: true,
            match_tolerance: 0.1,
            match_policy: MatchPolicy::Similarity,
            seed: 0,
        }
    }
}

/// Level sweep resolved against a concrete tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LevelSweep {
    pub first: usize,
    pub last: usize,
}

impl LevelSweep {
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }
}

impl LearnerConfig {
    /// Config that reproduces the source tree exactly
    pub fn exact() -> Self {
        Self {
            randomize_root_order: false,
            sampling_percentage: 1.0,
            randomize_ties: false,
            match_tolerance: 0.0,
            match_policy: MatchPolicy::ExactPosition,
            ..Default::default()
        }
    }

    pub fn with_levels(mut self, start_level: i32, stop_level: i32) -> Self {
        self.start_level = start_level;
        self.stop_level = stop_level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the tree-independent fields
    pub fn validate(&self) -> SynthResult<()> {
        if !self.candidate_factor.is_finite() || self.candidate_factor < 0.0 {
            return Err(SynthError::invalid_param(
                "candidate_factor",
                format!("{} must be a finite value >= 0", self.candidate_factor),
            ));
        }
        if !self.match_tolerance.is_finite() || self.match_tolerance < 0.0 {
            return Err(SynthError::invalid_param(
                "match_tolerance",
                format!("{} must be a finite value >= 0", self.match_tolerance),
            ));
        }
        if !(0.0..=1.0).contains(&self.sampling_percentage) {
            return Err(SynthError::invalid_param(
                "sampling_percentage",
                format!("{} must be within [0, 1]", self.sampling_percentage),
            ));
        }
        Ok(())
    }

    /// Resolve start/stop against a tree of `levels` levels.
    ///
    /// `start_level == levels` is the empty sweep. Level 0 is always seeded,
    /// so the sweep begins at level 1 at the earliest.
    pub(crate) fn sweep(&self, levels: usize) -> SynthResult<LevelSweep> {
        let invalid = || SynthError::InvalidLevelRange {
            start: self.start_level,
            stop: self.stop_level,
            levels,
        };

        if self.start_level < 0 || self.stop_level < 0 {
            return Err(invalid());
        }
        let start = self.start_level as usize;
        let stop = self.stop_level as usize;

        if start > levels || stop >= levels {
            return Err(invalid());
        }
        if start == levels {
            return Ok(LevelSweep {
                first: levels,
                last: levels - 1,
            });
        }
        if stop < start {
            return Err(invalid());
        }

        Ok(LevelSweep {
            first: start.max(1),
            last: stop,
        })
    }

    /// Copy with the level range squeezed into a tree of `levels` levels.
    ///
    /// Used by the driver when a short final window yields a smaller tree.
    pub fn fitted_to(&self, levels: usize) -> Self {
        let levels = levels as i32;
        let mut fitted = self.clone();
        fitted.stop_level = fitted.stop_level.min(levels - 1).max(0);
        fitted.start_level = fitted.start_level.min(levels).max(0);
        if fitted.start_level < levels && fitted.stop_level < fitted.start_level {
            fitted.start_level = levels;
        }
        fitted
    }
}
