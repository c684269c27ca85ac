//! Auto-level analysis: derives enhancement settings from the source.

use log::debug;
use serde::Serialize;

use crate::buffer::AudioBuffer;
use crate::dsp::tuner::{correction_octaves, detect_pitch};
use crate::settings::{CLARITY_MAX, EnhanceSettings, NOISE_REDUCTION_MAX, VOLUME_MAX};

/// Lowest pitch the detector looks for; sets the analysis window length.
const MIN_PITCH_HZ: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelAnalysis {
    /// Mean absolute sample value of the first channel.
    pub average_volume: f32,
    /// Detected fundamental in Hz; 0 when none was found.
    pub pitch_hz: f64,
    pub pitch_confidence: f64,
    pub volume: f32,
    pub pitch_correction: f32,
    pub noise_reduction: f32,
    pub clarity: f32,
}

impl LevelAnalysis {
    /// Copy the suggested levels into `settings`.
    pub fn apply_to(&self, settings: &mut EnhanceSettings) {
        settings.volume = self.volume;
        settings.pitch_correction = self.pitch_correction;
        settings.noise_reduction = self.noise_reduction;
        settings.clarity = self.clarity;
    }
}

pub fn analyze_levels(buffer: &AudioBuffer) -> LevelAnalysis {
    let samples = buffer.channel(0).unwrap_or(&[]);
    let sample_rate = buffer.sample_rate();

    let average_volume = if samples.is_empty() {
        0.0
    } else {
        (samples.iter().map(|s| s.abs() as f64).sum::<f64>() / samples.len() as f64) as f32
    };

    let window = loudest_window(samples, (2.0 * sample_rate as f64 / MIN_PITCH_HZ) as usize);
    let pitch = detect_pitch(window, sample_rate, Some(MIN_PITCH_HZ), None);
    debug!(
        "pitch {:.1} Hz (confidence {:.2}) over {} samples",
        pitch.frequency,
        pitch.confidence,
        window.len()
    );

    // A silent source divides by zero; the caps absorb the infinity.
    LevelAnalysis {
        average_volume,
        volume: (1.0 / average_volume).min(VOLUME_MAX),
        pitch_correction: correction_octaves(pitch.frequency) as f32,
        noise_reduction: (average_volume * 2.0).min(NOISE_REDUCTION_MAX),
        clarity: (1.5 / average_volume).min(CLARITY_MAX),
        pitch_hz: pitch.frequency,
        pitch_confidence: pitch.confidence,
    }
}

/// The `len`-sample slice with the highest energy, stepping by half a window.
fn loudest_window(samples: &[f32], len: usize) -> &[f32] {
    if len == 0 || samples.len() <= len {
        return samples;
    }
    let hop = (len / 2).max(1);
    let mut best = (0usize, -1.0f32);
    let mut start = 0;
    while start + len <= samples.len() {
        let energy = samples[start..start + len].iter().map(|s| s * s).sum::<f32>();
        if energy > best.1 {
            best = (start, energy);
        }
        start += hop;
    }
    &samples[best.0..best.0 + len]
}
