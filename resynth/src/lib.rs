//! resynth - audio texture resynthesis library
//!
//! Decodes a recording, resynthesizes it window by window with
//! `libtreesynth` and writes the result as a float WAV. Works on native
//! targets and can be compiled to WebAssembly.
//!

pub mod audio;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

use anyhow::{bail, Context, Result};
use libtreesynth::{Resynthesizer, SynthReport, WindowReader};
use std::io::{Seek, Write};
use std::path::Path;
use tracing::{info, warn};

/// Re-export libtreesynth config types
pub use libtreesynth::{FilterChoice, LearnerConfig, MatchPolicy, SynthConfig, WindowPolicy};

/// Write attempts per output window before giving up
pub const DEFAULT_WRITE_RETRIES: u32 = 3;

/// Options for one resynthesis run
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthOptions {
    /// Transform, windowing and learner settings
    #[serde(flatten)]
    pub config: SynthConfig,
    /// Write attempts per output window (at least 1)
    pub write_retries: u32,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            config: SynthConfig::default(),
            write_retries: DEFAULT_WRITE_RETRIES,
        }
    }
}

impl SynthOptions {
    /// Options from a JSON document; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let options: SynthOptions =
            serde_json::from_str(text).context("Failed to parse options JSON")?;
        options.validate()?;
        Ok(options)
    }

    /// Builders store values as given; out-of-range ones are rejected here
    pub fn validate(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid options: {}", e))?;
        if self.write_retries == 0 {
            anyhow::bail!("Invalid options: write_retries must be at least 1");
        }
        Ok(())
    }

    /// Options read from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize options")
    }

    /// Options that reproduce the input (up to transform rounding)
    pub fn exact() -> Self {
        let mut options = Self::default();
        let levels = options.config.window_levels as i32;
        options.config.learner = LearnerConfig::exact().with_levels(1, levels - 1);
        options
    }

    pub fn with_filter(mut self, filter: FilterChoice) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.learner.seed = seed;
        self
    }

    /// Set first and last learned level
    pub fn with_levels(mut self, start_level: i32, stop_level: i32) -> Self {
        self.config.learner.start_level = start_level;
        self.config.learner.stop_level = stop_level;
        self
    }

    /// Set window size as a power of two (1-24)
    pub fn with_window_levels(mut self, window_levels: usize) -> Self {
        self.config.window_levels = window_levels;
        self
    }

    /// Lower the last learned level so the sweep fits the current window
    pub fn with_stop_level_fitted(mut self) -> Self {
        let top = self.config.window_levels as i32 - 1;
        let learner = &mut self.config.learner;
        learner.stop_level = learner.stop_level.min(top);
        self
    }

    pub fn with_window_policy(mut self, policy: WindowPolicy) -> Self {
        self.config.window_policy = policy;
        self
    }

    /// Fraction of each level considered as candidates (0.0-1.0)
    pub fn with_sampling(mut self, percentage: f32) -> Self {
        self.config.learner.sampling_percentage = percentage;
        self
    }

    pub fn with_candidate_factor(mut self, factor: f32) -> Self {
        self.config.learner.candidate_factor = factor;
        self
    }

    pub fn with_match_tolerance(mut self, tolerance: f32) -> Self {
        self.config.learner.match_tolerance = tolerance;
        self
    }

    pub fn with_randomize_root_order(mut self, randomize: bool) -> Self {
        self.config.learner.randomize_root_order = randomize;
        self
    }

    pub fn with_randomize_ties(mut self, randomize: bool) -> Self {
        self.config.learner.randomize_ties = randomize;
        self
    }

    pub fn with_ancestors_first(mut self, ancestors_first: bool) -> Self {
        self.config.learner.ancestors_first = ancestors_first;
        self
    }

    /// Set write attempts per window (at least 1)
    pub fn with_write_retries(mut self, retries: u32) -> Self {
        self.write_retries = retries;
        self
    }
}

/// Where resynthesized windows go
pub trait WindowSink {
    /// Write one window. A failed call may be retried with the same samples
    /// and must not leave a partial copy behind.
    fn write_window(&mut self, samples: &[f32]) -> std::io::Result<()>;
}

impl WindowSink for Vec<f32> {
    fn write_window(&mut self, samples: &[f32]) -> std::io::Result<()> {
        self.extend_from_slice(samples);
        Ok(())
    }
}

impl<W: Write + Seek> WindowSink for audio::WavWriter<W> {
    fn write_window(&mut self, samples: &[f32]) -> std::io::Result<()> {
        self.append(samples)
    }
}

/// Keeps a copy of everything written for the similarity report
struct RecordingSink<S> {
    inner: S,
    recorded: Vec<f32>,
}

impl<S: WindowSink> WindowSink for RecordingSink<S> {
    fn write_window(&mut self, samples: &[f32]) -> std::io::Result<()> {
        self.inner.write_window(samples)?;
        self.recorded.extend_from_slice(samples);
        Ok(())
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, serde::Serialize)]
pub struct SynthSummary {
    pub sample_rate: u32,
    pub source_channels: usize,
    pub windows: u32,
    pub samples_in: u64,
    pub samples_out: u64,
    pub dropped_samples: u64,
    /// Spectral similarity of output vs. input (0.0-1.0)
    pub similarity: f32,
}

impl SynthSummary {
    fn new(report: &SynthReport, sample_rate: u32, source_channels: usize, similarity: f32) -> Self {
        Self {
            sample_rate,
            source_channels,
            windows: report.windows,
            samples_in: report.samples_in,
            samples_out: report.samples_out,
            dropped_samples: report.dropped_samples,
            similarity,
        }
    }
}

/// Resynthesize mono samples window by window into `sink`
///
/// Each window is written with up to `options.write_retries` attempts; the
/// run fails once a window exhausts them.
pub fn run_windows<S: WindowSink>(
    samples: &[f32],
    options: &SynthOptions,
    sink: &mut S,
) -> Result<SynthReport> {
    options.validate()?;
    let mut resynth = Resynthesizer::new(options.config.clone())
        .map_err(|e| anyhow::anyhow!("Invalid options: {}", e))?;
    let mut reader = WindowReader::new(samples, resynth.window_len());
    let mut window = vec![0.0f32; resynth.window_len()];
    let attempts = options.write_retries;

    loop {
        let read = reader.read_window(&mut window);
        if read == 0 {
            break;
        }

        let output = resynth
            .process_window(&window[..read])
            .map_err(|e| anyhow::anyhow!("Resynthesis failed: {}", e))?;

        let mut attempt = 1;
        while let Err(e) = sink.write_window(&output) {
            if attempt >= attempts {
                return Err(e).with_context(|| {
                    format!(
                        "Failed to write window {} after {} attempts",
                        resynth.report().windows - 1,
                        attempts
                    )
                });
            }
            warn!(attempt, error = %e, "window write failed, retrying");
            attempt += 1;
        }

        info!(
            window = resynth.report().windows - 1,
            position = reader.position(),
            total = samples.len(),
            "window written"
        );
    }

    Ok(resynth.report().clone())
}

/// Resynthesize mono samples in memory
///
/// # Returns
/// Tuple of (samples, summary)
pub fn resynthesize_samples(
    samples: &[f32],
    sample_rate: u32,
    options: &SynthOptions,
) -> Result<(Vec<f32>, SynthSummary)> {
    let mut output = Vec::with_capacity(samples.len());
    let report = run_windows(samples, options, &mut output)?;
    let similarity = libtreesynth::similarity(samples, &output);
    Ok((output, SynthSummary::new(&report, sample_rate, 1, similarity)))
}

/// Resynthesize an audio file held in memory
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
/// * `options` - Resynthesis options
///
/// # Returns
/// Tuple of (mono float WAV bytes, summary)
pub fn resynthesize_from_audio(
    audio_bytes: &[u8],
    options: &SynthOptions,
) -> Result<(Vec<u8>, SynthSummary)> {
    let decoded = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;
    let (output, mut summary) = resynthesize_samples(&decoded.samples, decoded.sample_rate, options)?;
    summary.source_channels = decoded.source_channels;

    let wav = audio::write_wav_to_bytes(&output, decoded.sample_rate, 1)
        .context("Failed to write WAV data")?;
    Ok((wav, summary))
}

/// Resynthesize `input` into a mono float WAV at `output`
///
/// Output is written window by window as it is produced.
pub fn resynthesize_file(input: &Path, output: &Path, options: &SynthOptions) -> Result<SynthSummary> {
    let decoded = audio::read_audio_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    if decoded.samples.is_empty() {
        bail!("{} contains no audio", input.display());
    }

    info!(
        input = %input.display(),
        samples = decoded.samples.len(),
        sample_rate = decoded.sample_rate,
        channels = decoded.source_channels,
        "source decoded"
    );

    let writer = audio::WavWriter::create(output, decoded.sample_rate)?;
    let mut sink = RecordingSink {
        inner: writer,
        recorded: Vec::with_capacity(decoded.samples.len()),
    };
    let report = run_windows(&decoded.samples, options, &mut sink)?;
    sink.inner.finish()?;

    let similarity = libtreesynth::similarity(&decoded.samples, &sink.recorded);
    Ok(SynthSummary::new(
        &report,
        decoded.sample_rate,
        decoded.source_channels,
        similarity,
    ))
}

/// Information about a decoded audio file
#[derive(Debug, Clone, serde::Serialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f32,
    /// Mono samples after down-mixing
    pub samples: usize,
    pub source_format: Option<String>,
    /// Full windows at the default window size
    pub full_windows: usize,
    /// Samples left over for a short final window
    pub tail_samples: usize,
}

/// Get information about an audio file
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
///
/// # Returns
/// Audio information
pub fn get_audio_info(audio_bytes: &[u8]) -> Result<AudioInfo> {
    let decoded = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;
    Ok(audio_info(&decoded, SynthConfig::default().window_len()))
}

/// Same as [`get_audio_info`] for a file on disk
pub fn get_audio_file_info(path: &Path, window_len: usize) -> Result<AudioInfo> {
    let decoded = audio::read_audio_file(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(audio_info(&decoded, window_len))
}

fn audio_info(decoded: &audio::DecodedAudio, window_len: usize) -> AudioInfo {
    let window_len = window_len.max(1);
    AudioInfo {
        sample_rate: decoded.sample_rate,
        channels: decoded.source_channels,
        duration_secs: decoded.duration_secs(),
        samples: decoded.samples.len(),
        source_format: decoded.source_format.clone(),
        full_windows: decoded.samples.len() / window_len,
        tail_samples: decoded.samples.len() % window_len,
    }
}

/// Spectral similarity of two audio files held in memory (0.0-1.0)
pub fn compare_audio(a_bytes: &[u8], b_bytes: &[u8]) -> Result<f32> {
    let a = audio::read_audio_from_bytes(a_bytes).context("Failed to read first audio file")?;
    let b = audio::read_audio_from_bytes(b_bytes).context("Failed to read second audio file")?;
    Ok(libtreesynth::similarity(&a.samples, &b.samples))
}
