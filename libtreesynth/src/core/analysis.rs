//! Statistics used to judge how close a resynthesized texture is to its source

use crate::tree::CoefficientTree;
use rustfft::num_complex::Complex;
use rustfft::FftDirection;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Number of bands in a spectral profile
pub const PROFILE_BANDS: usize = 16;

const FFT_SIZE: usize = 512;
const HOP_SIZE: usize = 256;

/// Averaged magnitude spectrum of a signal, folded into equal-width bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralProfile {
    /// BLAKE3 hash of the samples
    pub hash: [u8; 32],
    /// Number of analysis frames
    pub frames: u32,
    /// Band energies normalized to sum to 1 (all zero for silence)
    pub bands: [f32; PROFILE_BANDS],
}

impl SpectralProfile {
    /// Analyze mono samples with 512-point Hann frames, 50% overlap
    pub fn from_samples(samples: &[f32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(samples.len() as u64).to_le_bytes());
        for s in samples {
            hasher.update(&s.to_le_bytes());
        }
        let hash = hasher.finalize().into();

        let mut bands = [0.0f32; PROFILE_BANDS];
        if samples.is_empty() {
            return Self {
                hash,
                frames: 0,
                bands,
            };
        }

        let mut planner = rustfft::FftPlanner::<f32>::new();
        let fft = planner.plan_fft(FFT_SIZE, FftDirection::Forward);
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / FFT_SIZE as f32).cos())
            .collect();
        let mut buffer = vec![Complex { re: 0.0, im: 0.0 }; FFT_SIZE];

        let bins_per_band = (FFT_SIZE / 2) / PROFILE_BANDS;
        let mut frames = 0u32;
        let mut start = 0;

        loop {
            // short signals are analyzed as one zero-padded frame
            for i in 0..FFT_SIZE {
                let s = samples.get(start + i).copied().unwrap_or(0.0);
                buffer[i] = Complex {
                    re: s * window[i],
                    im: 0.0,
                };
            }
            fft.process(&mut buffer);

            for (band, energy) in bands.iter_mut().enumerate() {
                let lo = band * bins_per_band;
                *energy += buffer[lo..lo + bins_per_band]
                    .iter()
                    .map(|c| c.norm_sqr())
                    .sum::<f32>();
            }
            frames += 1;

            start += HOP_SIZE;
            if start + FFT_SIZE > samples.len() {
                break;
            }
        }

        let total: f32 = bands.iter().sum();
        if total > 0.0 {
            for energy in &mut bands {
                *energy /= total;
            }
        }

        Self {
            hash,
            frames,
            bands,
        }
    }
}

/// Cosine similarity of two profiles
///
/// # Returns
/// Score between 0.0 (unrelated) and 1.0 (identical band distribution)
pub fn spectral_similarity(a: &SpectralProfile, b: &SpectralProfile) -> f32 {
    if a.hash == b.hash {
        return 1.0;
    }

    let dot: f32 = a.bands.iter().zip(&b.bands).map(|(x, y)| x * y).sum();
    let norm_a = a.bands.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.bands.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        // silence only matches silence
        return if norm_a == norm_b { 1.0 } else { 0.0 };
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Sum of squared coefficients per tree level, coarsest first
pub fn level_energy(tree: &CoefficientTree) -> Vec<f32> {
    tree.level_ranges()
        .map(|r| tree.values()[r.range()].iter().map(|c| c * c).sum())
        .collect()
}
