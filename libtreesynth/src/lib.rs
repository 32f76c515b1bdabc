#![allow(clippy::needless_range_loop)]

use wasm_bindgen::prelude::*;

pub mod core;
pub mod learn;
pub mod streaming;
pub mod tree;
pub mod wavelet;

pub use crate::core::{
    create_rng, create_window_rng, derive_window_seed, level_energy, spectral_similarity,
    SpectralProfile, SynthError, SynthResult, PROFILE_BANDS,
};
pub use learn::{LearnerConfig, MatchPolicy, TreeSynthesizer, PREDECESSOR_WINDOW};
pub use streaming::{
    Resynthesizer, SynthConfig, SynthReport, WindowPolicy, WindowReader, DEFAULT_WINDOW_LEVELS,
};
pub use tree::{CoefficientTree, LevelRange, NodeRef, MAX_TREE_LEVELS};
pub use wavelet::{Direction, FilterBank, FilterChoice, Wavelet, SUPPORTED_TAPS};

// native api

/// Resynthesize a whole mono buffer with one config
pub fn resynthesize_samples(samples: &[f32], config: &SynthConfig) -> SynthResult<Vec<f32>> {
    Resynthesizer::new(config.clone())?.process(samples)
}

/// Same as [`resynthesize_samples`], also returning the run counters
pub fn resynthesize_with_report(
    samples: &[f32],
    config: &SynthConfig,
) -> SynthResult<(Vec<f32>, SynthReport)> {
    let mut resynth = Resynthesizer::new(config.clone())?;
    let output = resynth.process(samples)?;
    Ok((output, resynth.report().clone()))
}

/// Forward pyramid transform of a copy of `samples`
pub fn forward_transform(samples: &[f32], filter: FilterChoice) -> SynthResult<Vec<f32>> {
    let mut data = samples.to_vec();
    Wavelet::from_choice(filter)?.forward(&mut data)?;
    Ok(data)
}

/// Inverse pyramid transform of a copy of `coefficients`
pub fn inverse_transform(coefficients: &[f32], filter: FilterChoice) -> SynthResult<Vec<f32>> {
    let mut data = coefficients.to_vec();
    Wavelet::from_choice(filter)?.inverse(&mut data)?;
    Ok(data)
}

/// Spectral similarity of two signals, 0.0 to 1.0
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    spectral_similarity(
        &SpectralProfile::from_samples(a),
        &SpectralProfile::from_samples(b),
    )
}

// result helpers

/// turn an error into js
fn to_js_err(e: SynthError) -> JsValue {
    JsValue::from_str(&format!("[{}] {}", e.code(), e))
}

fn config_from_js(config: JsValue) -> Result<SynthConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(SynthConfig::default());
    }
    let config: SynthConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
    config.validate().map_err(to_js_err)?;
    Ok(config)
}

fn parse_filter(filter: &str) -> Result<FilterChoice, JsValue> {
    filter.parse().map_err(|e: String| JsValue::from_str(&e))
}

// wasm api

/// resynthesize mono samples
///
/// # Arguments
/// * `samples` - Mono audio samples (f32, -1.0 to 1.0)
/// * `config` - Config object, or null/undefined for defaults
///
/// # Returns
/// New samples; a truncated final window makes this shorter than the input
#[wasm_bindgen]
pub fn resynthesize(samples: &[f32], config: JsValue) -> Result<Vec<f32>, JsValue> {
    let config = config_from_js(config)?;
    resynthesize_samples(samples, &config).map_err(to_js_err)
}

/// resynthesize with a JSON config string
#[wasm_bindgen]
pub fn resynthesize_json(samples: &[f32], config_json: &str) -> Result<Vec<f32>, JsValue> {
    let config = SynthConfig::from_json(config_json).map_err(to_js_err)?;
    resynthesize_samples(samples, &config).map_err(to_js_err)
}

/// default config as pretty JSON
#[wasm_bindgen]
pub fn default_config_json() -> Result<String, JsValue> {
    SynthConfig::default().to_json().map_err(to_js_err)
}

/// forward wavelet transform
///
/// # Arguments
/// * `samples` - Power-of-two number of samples
/// * `filter` - `daub4`, `pwt4`, `pwt10` or `pwt12`
#[wasm_bindgen]
pub fn wavelet_forward(samples: &[f32], filter: &str) -> Result<Vec<f32>, JsValue> {
    forward_transform(samples, parse_filter(filter)?).map_err(to_js_err)
}

/// inverse wavelet transform
#[wasm_bindgen]
pub fn wavelet_inverse(coefficients: &[f32], filter: &str) -> Result<Vec<f32>, JsValue> {
    inverse_transform(coefficients, parse_filter(filter)?).map_err(to_js_err)
}

/// spectral similarity of two signals (0.0 - 1.0)
#[wasm_bindgen]
pub fn spectral_similarity_score(a: &[f32], b: &[f32]) -> f32 {
    similarity(a, b)
}

/// spectral profile of a signal as an object
#[wasm_bindgen]
pub fn spectral_profile(samples: &[f32]) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&SpectralProfile::from_samples(samples))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// number of tree levels for a power-of-two length
#[wasm_bindgen]
pub fn tree_levels(len: usize) -> Result<u32, JsValue> {
    if len == 0 || !len.is_power_of_two() {
        return Err(to_js_err(SynthError::InvalidBufferSize { len }));
    }
    Ok(len.trailing_zeros())
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// route panics to the browser console
#[wasm_bindgen]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

// window-by-window wasm api

#[wasm_bindgen]
pub struct WasmResynthesizer {
    inner: Resynthesizer,
}

#[wasm_bindgen]
impl WasmResynthesizer {
    /// new resynthesizer, config may be null for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmResynthesizer, JsValue> {
        let config = config_from_js(config)?;
        Ok(Self {
            inner: Resynthesizer::new(config).map_err(to_js_err)?,
        })
    }

    /// Resynthesize the next window
    ///
    /// Feed at most `window_len()` samples per call:
    /// ```js
    /// for (let i = 0; i < samples.length; i += synth.window_len()) {
    ///     play(synth.process_window(samples.subarray(i, i + synth.window_len())));
    /// }
    /// ```
    #[wasm_bindgen]
    pub fn process_window(&mut self, window: &[f32]) -> Result<Vec<f32>, JsValue> {
        self.inner.process_window(window).map_err(to_js_err)
    }

    /// samples per full window
    #[wasm_bindgen]
    pub fn window_len(&self) -> usize {
        self.inner.window_len()
    }

    /// windows processed so far
    #[wasm_bindgen]
    pub fn windows(&self) -> u32 {
        self.inner.report().windows
    }

    /// Run counters as an object
    #[wasm_bindgen]
    pub fn report(&self) -> Result<JsValue, JsValue> {
        let report = self.inner.report();
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"windows".into(), &report.windows.into())?;
        js_sys::Reflect::set(
            &obj,
            &"passthrough_windows".into(),
            &report.passthrough_windows.into(),
        )?;
        js_sys::Reflect::set(
            &obj,
            &"samples_in".into(),
            &(report.samples_in as f64).into(),
        )?;
        js_sys::Reflect::set(
            &obj,
            &"samples_out".into(),
            &(report.samples_out as f64).into(),
        )?;
        js_sys::Reflect::set(
            &obj,
            &"dropped_samples".into(),
            &(report.dropped_samples as f64).into(),
        )?;
        Ok(obj.into())
    }

    /// Start again from window 0
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
