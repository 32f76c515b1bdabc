use super::reader::WindowReader;
use super::types::{SynthConfig, SynthReport, WindowPolicy};
use crate::core::{create_window_rng, SynthError, SynthResult};
use crate::learn::TreeSynthesizer;
use crate::tree::{floor_power_of_two, CoefficientTree};
use crate::wavelet::Wavelet;
use tracing::{debug, info, warn};

/// Resynthesizes a recording one window at a time
///
/// The coefficient tree is allocated once at full window size and resized
/// for short windows. Every window gets its own RNG derived from the base
/// seed and the window index, so output does not depend on how the caller
/// feeds windows in.
pub struct Resynthesizer {
    config: SynthConfig,
    wavelet: Wavelet,
    tree: CoefficientTree,
    window_index: u64,
    report: SynthReport,
}

impl Resynthesizer {
    /// Validate the config and allocate the working tree
    pub fn new(config: SynthConfig) -> SynthResult<Self> {
        config.validate()?;
        let wavelet = Wavelet::from_choice(config.filter)?;
        let tree = CoefficientTree::with_levels(config.window_levels)?;

        debug!(
            filter = %config.filter,
            window_len = config.window_len(),
            "resynthesizer ready"
        );

        Ok(Self {
            config,
            wavelet,
            tree,
            window_index: 0,
            report: SynthReport::default(),
        })
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Samples per full window
    pub fn window_len(&self) -> usize {
        self.config.window_len()
    }

    /// Counters since construction or the last [`reset`](Self::reset)
    pub fn report(&self) -> &SynthReport {
        &self.report
    }

    /// Start over at window 0 with cleared counters
    pub fn reset(&mut self) {
        self.window_index = 0;
        self.report = SynthReport::default();
    }

    /// Resynthesize one window.
    ///
    /// Windows shorter than 2 samples are returned as they are. A window
    /// whose length is not a power of two is handled per the configured
    /// [`WindowPolicy`]; with `Truncate` the returned buffer is shorter
    /// than the input.
    pub fn process_window(&mut self, window: &[f32]) -> SynthResult<Vec<f32>> {
        if window.len() > self.window_len() {
            return Err(SynthError::InvalidBufferSize { len: window.len() });
        }

        let index = self.window_index;
        self.window_index += 1;
        self.report.windows += 1;
        self.report.samples_in += window.len() as u64;

        if window.len() < 2 {
            self.report.passthrough_windows += 1;
            self.report.samples_out += window.len() as u64;
            debug!(window = index, samples = window.len(), "window passed through");
            return Ok(window.to_vec());
        }

        let (tree_len, emit_len) = match self.config.window_policy {
            WindowPolicy::Truncate => {
                let len = floor_power_of_two(window.len());
                (len, len)
            }
            WindowPolicy::Pad => (window.len().next_power_of_two(), window.len()),
        };
        let dropped = window.len() - emit_len;

        self.tree.resize(tree_len)?;
        self.tree.reset();
        let copied = window.len().min(tree_len);
        self.tree.values_mut()[..copied].copy_from_slice(&window[..copied]);
        self.tree.forward(&self.wavelet)?;

        let levels = self.tree.levels();
        let learner = TreeSynthesizer::new(self.config.learner.fitted_to(levels))?;
        let mut rng = create_window_rng(self.config.learner.seed, index);
        let mut learned = learner.synthesize_with_rng(&self.tree, &mut rng)?;
        learned.inverse(&self.wavelet)?;

        let mut output = learned.into_values();
        output.truncate(emit_len);

        if dropped > 0 {
            warn!(window = index, dropped, "short window truncated");
            self.report.dropped_samples += dropped as u64;
        }
        self.report.samples_out += output.len() as u64;
        debug!(window = index, samples = window.len(), levels, "window resynthesized");

        Ok(output)
    }

    /// Resynthesize a whole buffer window by window
    pub fn process(&mut self, samples: &[f32]) -> SynthResult<Vec<f32>> {
        let mut reader = WindowReader::new(samples, self.window_len());
        let mut window = vec![0.0f32; self.window_len()];
        let mut output = Vec::with_capacity(samples.len());

        loop {
            let read = reader.read_window(&mut window);
            if read == 0 {
                break;
            }
            output.extend(self.process_window(&window[..read])?);
        }

        info!(
            windows = self.report.windows,
            samples_in = self.report.samples_in,
            samples_out = self.report.samples_out,
            "resynthesis complete"
        );
        Ok(output)
    }
}
