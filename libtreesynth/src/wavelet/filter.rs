//! Daubechies filter banks for the general pyramid step.
//!
//! Forward taps are the Numerical Recipes tables for 4, 10 and 12
//! coefficients. Reverse taps follow the quadrature mirror relation
//! `reverse[taps - 1 - k] = (-1)^(k + 1) * forward[k]` (0-based).

use crate::core::{SynthError, SynthResult};

/// Tap counts a filter bank can be built with.
pub const SUPPORTED_TAPS: [usize; 3] = [4, 10, 12];

const DAUB4: [f32; 4] = [
    0.482_962_913_144_534_1,
    0.836_516_303_737_807_9,
    0.224_143_868_042_013_4,
    -0.129_409_522_551_260_4,
];

const DAUB10: [f32; 10] = [
    0.160_102_397_974_20,
    0.603_829_269_797_19,
    0.724_308_528_437_77,
    0.138_428_145_901_32,
    -0.242_294_887_066_38,
    -0.032_244_869_584_63,
    0.077_571_493_840_04,
    -0.006_241_490_212_79,
    -0.012_580_751_999_08,
    0.003_335_725_285_47,
];

const DAUB12: [f32; 12] = [
    0.111_540_743_350,
    0.494_623_890_398,
    0.751_133_908_021,
    0.315_250_351_709,
    -0.226_264_693_965,
    -0.129_766_867_567,
    0.097_501_605_587,
    0.027_522_865_530,
    -0.031_582_039_318,
    0.000_553_842_201,
    0.004_777_257_511,
    -0.001_077_301_085,
];

/// Forward/reverse taps and centering offsets of one wavelet filter.
///
/// Built once per chosen filter and shared read-only by every transform
/// that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    forward: Vec<f32>,
    reverse: Vec<f32>,
    forward_offset: isize,
    reverse_offset: isize,
}

impl FilterBank {
    /// Builds the filter bank for `taps` coefficients.
    pub fn new(taps: usize) -> SynthResult<Self> {
        let forward: &[f32] = match taps {
            4 => &DAUB4,
            10 => &DAUB10,
            12 => &DAUB12,
            _ => return Err(SynthError::UnsupportedFilterLength { taps }),
        };

        let mut reverse = vec![0.0f32; taps];
        let mut sign = -1.0f32;
        for (k, &c) in forward.iter().enumerate() {
            reverse[taps - 1 - k] = sign * c;
            sign = -sign;
        }

        // Centers the support of the wavelets at each level.
        let offset = -((taps >> 1) as isize);

        Ok(Self {
            forward: forward.to_vec(),
            reverse,
            forward_offset: offset,
            reverse_offset: offset,
        })
    }

    /// Number of taps.
    pub fn taps(&self) -> usize {
        self.forward.len()
    }

    /// Smoothing (scaling) filter.
    pub fn forward_taps(&self) -> &[f32] {
        &self.forward
    }

    /// Detail (wavelet) filter derived from the smoothing filter.
    pub fn reverse_taps(&self) -> &[f32] {
        &self.reverse
    }

    /// Centering offset applied to the smoothing filter.
    pub fn forward_offset(&self) -> isize {
        self.forward_offset
    }

    /// Centering offset applied to the detail filter.
    pub fn reverse_offset(&self) -> isize {
        self.reverse_offset
    }
}
