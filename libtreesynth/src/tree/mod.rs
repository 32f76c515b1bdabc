//! Binary tree view over a transformed buffer
//!
//! A buffer of `N = 2^L` coefficients after a full forward pyramid holds the
//! scaling coefficient at index 0, the coarsest detail at index 1 and, for
//! every finer scale, twice as many details as the scale before. The tree
//! keeps that layout implicit:
//!
//! | Level | Flat range            | Contents                          |
//! |-------|-----------------------|-----------------------------------|
//! | 0     | `[0, 2)`              | scaling coefficient + root detail |
//! | l ≥ 1 | `[2^l, 2^(l+1))`      | `2^l` detail coefficients         |
//!
//! Detail coefficients form a heap: the parent of flat index `i >= 2` is
//! `i / 2`.

use crate::core::{SynthError, SynthResult};
use crate::wavelet::Wavelet;
use std::ops::Range;

/// Largest tree the driver will allocate (16M coefficients)
pub const MAX_TREE_LEVELS: usize = 24;

/// Contiguous slice of the flat buffer holding one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    /// Level index, 0 is the coarsest
    pub level: usize,
    /// First flat index of the level
    pub start: usize,
    /// Number of coefficients at this level
    pub len: usize,
}

impl LevelRange {
    /// Descriptor of `level`; does not check it against any tree
    pub fn of(level: usize) -> Self {
        if level == 0 {
            LevelRange {
                level,
                start: 0,
                len: 2,
            }
        } else {
            LevelRange {
                level,
                start: 1 << level,
                len: 1 << level,
            }
        }
    }

    /// One past the last flat index
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Half-open flat range
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Address of one coefficient as (level, offset within level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub level: usize,
    pub offset: usize,
}

impl NodeRef {
    pub fn new(level: usize, offset: usize) -> Self {
        Self { level, offset }
    }

    /// Position in the flat buffer
    pub fn flat_index(self) -> usize {
        LevelRange::of(self.level).start + self.offset
    }

    /// Node stored at a flat index
    pub fn from_flat(index: usize) -> Self {
        if index < 2 {
            return NodeRef::new(0, index);
        }
        let level = (usize::BITS - 1 - index.leading_zeros()) as usize;
        NodeRef::new(level, index - (1 << level))
    }

    /// Coarser coefficient whose support contains this one
    ///
    /// Level-1 nodes hang off the root detail; level 0 has no parent.
    pub fn parent(self) -> Option<NodeRef> {
        match self.level {
            0 => None,
            1 => Some(NodeRef::new(0, 1)),
            _ => Some(NodeRef::new(self.level - 1, self.offset >> 1)),
        }
    }

    /// Parent, grandparent, ... up to the root detail
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef> {
        std::iter::successors(self.parent(), |node| node.parent())
    }
}

/// Owned coefficient buffer with an implicit per-level map
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTree {
    values: Vec<f32>,
    levels: usize,
}

impl CoefficientTree {
    /// Wrap a buffer whose length is a power of two
    pub fn build(values: Vec<f32>) -> SynthResult<Self> {
        let levels = level_count(values.len())?;
        Ok(Self { values, levels })
    }

    /// Copy samples into a new tree
    pub fn from_samples(samples: &[f32]) -> SynthResult<Self> {
        Self::build(samples.to_vec())
    }

    /// Zeroed tree of `2^levels` coefficients
    pub fn with_levels(levels: usize) -> SynthResult<Self> {
        if levels > MAX_TREE_LEVELS {
            return Err(SynthError::invalid_param(
                "window_levels",
                format!("{} exceeds the maximum of {}", levels, MAX_TREE_LEVELS),
            ));
        }
        Ok(Self {
            values: vec![0.0; 1 << levels],
            levels,
        })
    }

    /// Number of levels, `log2(len)`
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of coefficients
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a tree holds at least one coefficient
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Range of `level`, or None past the finest level
    pub fn level_range(&self, level: usize) -> Option<LevelRange> {
        (level < self.levels).then(|| LevelRange::of(level))
    }

    /// All level ranges, coarsest first
    pub fn level_ranges(&self) -> impl Iterator<Item = LevelRange> {
        (0..self.levels).map(LevelRange::of)
    }

    /// Coefficients of one level
    pub fn level(&self, level: usize) -> Option<&[f32]> {
        self.level_range(level).map(|r| &self.values[r.range()])
    }

    /// Mutable coefficients of one level
    pub fn level_mut(&mut self, level: usize) -> Option<&mut [f32]> {
        self.level_range(level).map(move |r| &mut self.values[r.range()])
    }

    pub fn get(&self, node: NodeRef) -> f32 {
        self.values[node.flat_index()]
    }

    pub fn set(&mut self, node: NodeRef, value: f32) {
        self.values[node.flat_index()] = value;
    }

    /// Rebuild the level map for a new buffer length.
    ///
    /// Existing coefficients are kept up to the new length and any new
    /// space is zeroed.
    pub fn resize(&mut self, new_len: usize) -> SynthResult<()> {
        let levels = level_count(new_len)?;
        self.values.resize(new_len, 0.0);
        self.levels = levels;
        Ok(())
    }

    /// Resize to `samples.len()` and copy the samples in
    pub fn load(&mut self, samples: &[f32]) -> SynthResult<()> {
        self.resize(samples.len())?;
        self.values.copy_from_slice(samples);
        Ok(())
    }

    /// Zero every coefficient
    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }

    /// Forward transform the buffer in place
    pub fn forward(&mut self, wavelet: &Wavelet) -> SynthResult<()> {
        wavelet.forward(&mut self.values)
    }

    /// Inverse transform the buffer in place
    pub fn inverse(&mut self, wavelet: &Wavelet) -> SynthResult<()> {
        wavelet.inverse(&mut self.values)
    }
}

fn level_count(len: usize) -> SynthResult<usize> {
    if len == 0 || !len.is_power_of_two() {
        return Err(SynthError::InvalidBufferSize { len });
    }
    Ok(len.trailing_zeros() as usize)
}

/// Largest power of two not above `len` (0 for 0)
pub fn floor_power_of_two(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - len.leading_zeros())
    }
}
