pub mod analysis;
pub mod buffer;
pub mod decode;
pub mod dsp;
pub mod enhancer;
pub mod error;
pub mod session;
pub mod settings;
pub mod wav;

pub use crate::buffer::AudioBuffer;
pub use crate::enhancer::{Enhancer, ProcessReport, ProcessingStatus};
pub use crate::error::{EnhanceError, Result};
pub use crate::session::Session;
pub use crate::settings::EnhanceSettings;

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the sonic-enhancer version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Decode `bytes` and run the enhancement chain, returning WAV bytes.
pub fn enhance(bytes: &[u8], settings: &EnhanceSettings) -> Result<Vec<u8>> {
    let source = decode::decode(bytes)?;
    let mut settings = settings.clone();
    if settings.auto_level {
        analysis::analyze_levels(&source).apply_to(&mut settings);
    }
    Ok(Enhancer::new(settings).process(&source)?.wav)
}

/// WASM-exposed: the default settings as JSON.
#[wasm_bindgen]
pub fn default_settings() -> String {
    EnhanceSettings::default().to_json()
}

/// WASM-exposed: enhance an uploaded audio file. `settings_json` may be
/// empty to use the defaults. Returns the processed file as WAV bytes.
#[wasm_bindgen]
pub fn enhance_audio(bytes: &[u8], settings_json: &str) -> std::result::Result<Vec<u8>, JsValue> {
    let settings = if settings_json.trim().is_empty() {
        EnhanceSettings::default()
    } else {
        EnhanceSettings::from_json(settings_json).map_err(|e| JsValue::from_str(&format!("{e}")))?
    };
    enhance(bytes, &settings).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: run auto-level analysis and return the suggested levels.
#[wasm_bindgen]
pub fn analyze_audio(bytes: &[u8]) -> std::result::Result<JsValue, JsValue> {
    let source = decode::decode(bytes).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let analysis = analysis::analyze_levels(&source);
    serde_wasm_bindgen::to_value(&analysis).map_err(|e| JsValue::from_str(&format!("{e}")))
}
