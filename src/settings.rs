//! Enhancement settings.
//!
//! Serialized as camelCase JSON so the same document drives the CLI
//! (`--config`) and the WASM host (`enhance_audio`).

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

pub const VOICE_BOOST_STEP: f32 = 0.2;
pub const VOICE_BOOST_MAX: f32 = 2.5;
pub const VOLUME_STEP: f32 = 0.2;
pub const VOLUME_MAX: f32 = 2.0;
pub const CLARITY_STEP: f32 = 0.2;
pub const CLARITY_MAX: f32 = 2.0;
pub const NOISE_REDUCTION_STEP: f32 = 0.1;
pub const NOISE_REDUCTION_MAX: f32 = 0.9;

/// Which channels survive the post-filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputChannels {
    /// First channel only.
    #[default]
    Mono,
    Preserve,
}

/// Source of the noise floor subtracted by the noise suppressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseProfileMode {
    /// Constant 0.01 per bin.
    #[default]
    Flat,
    /// Measured from the quietest frames of the input.
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhanceSettings {
    /// Final linear gain applied after the post-filters.
    pub voice_boost: f32,
    /// Linear gain at the end of the filter graph.
    pub volume: f32,
    /// Scales the presence peak and the formant gain.
    pub clarity: f32,
    /// Fraction of the noise profile subtracted, in [0, 1].
    pub noise_reduction: f32,
    /// Octaves relative to A4; zero disables the allpass stage.
    pub pitch_correction: f32,
    pub auto_level: bool,
    pub output_channels: OutputChannels,
    pub noise_profile: NoiseProfileMode,
}

impl Default for EnhanceSettings {
    fn default() -> Self {
        Self {
            voice_boost: 1.2,
            volume: 1.0,
            clarity: 1.0,
            noise_reduction: 0.5,
            pitch_correction: 0.0,
            auto_level: false,
            output_channels: OutputChannels::Mono,
            noise_profile: NoiseProfileMode::Flat,
        }
    }
}

impl EnhanceSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        // A struct of plain numbers and unit enums always serializes.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn increase_voice_boost(&mut self) {
        self.voice_boost = (self.voice_boost + VOICE_BOOST_STEP).min(VOICE_BOOST_MAX);
    }

    pub fn increase_volume(&mut self) {
        self.volume = (self.volume + VOLUME_STEP).min(VOLUME_MAX);
    }

    pub fn increase_clarity(&mut self) {
        self.clarity = (self.clarity + CLARITY_STEP).min(CLARITY_MAX);
    }

    pub fn increase_noise_reduction(&mut self) {
        self.noise_reduction =
            (self.noise_reduction + NOISE_REDUCTION_STEP).min(NOISE_REDUCTION_MAX);
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("voiceBoost", self.voice_boost),
            ("volume", self.volume),
            ("clarity", self.clarity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::OutOfRange { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.noise_reduction) {
            return Err(SettingsError::OutOfRange {
                field: "noiseReduction",
                value: self.noise_reduction,
            });
        }
        if !self.pitch_correction.is_finite() {
            return Err(SettingsError::OutOfRange {
                field: "pitchCorrection",
                value: self.pitch_correction,
            });
        }
        Ok(())
    }

    /// Allpass centre frequency for the pitch stage, if enabled.
    pub fn pitch_frequency(&self) -> Option<f64> {
        (self.pitch_correction != 0.0).then(|| 440.0 * 2f64.powf(self.pitch_correction as f64))
    }
}
