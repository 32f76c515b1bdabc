#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
fn options_from_js(options: JsValue) -> Result<crate::SynthOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(crate::SynthOptions::default());
    }
    let options: crate::SynthOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?;
    options
        .config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(options)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn resynthesize_audio_to_wav(audio_bytes: &[u8], options: JsValue) -> Result<Vec<u8>, JsValue> {
    let options = options_from_js(options)?;
    crate::resynthesize_from_audio(audio_bytes, &options)
        .map(|(wav, _)| wav)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn resynthesize_audio_with_seed(audio_bytes: &[u8], seed: u64) -> Result<Vec<u8>, JsValue> {
    let options = crate::SynthOptions::default().with_seed(seed);
    crate::resynthesize_from_audio(audio_bytes, &options)
        .map(|(wav, _)| wav)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn resynthesize_audio_to_samples(
    audio_bytes: &[u8],
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    let decoded = crate::audio::read_audio_from_bytes(audio_bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let (samples, summary) =
        crate::resynthesize_samples(&decoded.samples, decoded.sample_rate, &options)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("samples"),
        &js_sys::Float32Array::from(&samples[..]).into(),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleRate"),
        &JsValue::from_f64(decoded.sample_rate as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("windows"),
        &JsValue::from_f64(summary.windows as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("similarity"),
        &JsValue::from_f64(summary.similarity as f64),
    )?;
    Ok(obj.into())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn get_audio_file_info(audio_bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info =
        crate::get_audio_info(audio_bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn compare_audio_files(a_bytes: &[u8], b_bytes: &[u8]) -> Result<f32, JsValue> {
    crate::compare_audio(a_bytes, b_bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn default_options_json() -> Result<String, JsValue> {
    crate::SynthOptions::default()
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
