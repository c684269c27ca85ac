//! Pitch detection for auto-leveling.
//!
//! Uses autocorrelation-based pitch detection (YIN-inspired) to estimate
//! the fundamental frequency of a recording, and converts that into the
//! octave offset the pitch stage uses.

/// Reference pitch the correction is measured against (A4).
pub const REFERENCE_HZ: f64 = 440.0;

/// Result of pitch detection on a block of audio.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchEstimate {
    /// Estimated fundamental frequency in Hz (0 when none was found).
    pub frequency: f64,
    /// Confidence in [0, 1] — higher is better.
    pub confidence: f64,
    /// Nearest MIDI note number.
    pub midi_note: u8,
    /// Offset in cents from the nearest MIDI note.
    pub cents: f64,
    /// Whether the audio appears to be unpitched (noise, silence).
    pub is_noise: bool,
}

impl PitchEstimate {
    fn none() -> Self {
        Self {
            frequency: 0.0,
            confidence: 0.0,
            midi_note: 0,
            cents: 0.0,
            is_noise: true,
        }
    }
}

/// Detect the fundamental frequency of a mono block.
///
/// - `samples`: mono audio data
/// - `sample_rate`: audio sample rate in Hz
/// - `min_freq`: minimum detectable frequency (default: 50 Hz)
/// - `max_freq`: maximum detectable frequency (default: 2000 Hz)
pub fn detect_pitch(
    samples: &[f32],
    sample_rate: u32,
    min_freq: Option<f64>,
    max_freq: Option<f64>,
) -> PitchEstimate {
    let sr = sample_rate as f64;
    let min_f = min_freq.unwrap_or(50.0);
    let max_f = max_freq.unwrap_or(2000.0);

    let min_lag = ((sr / max_f).ceil() as usize).max(2);
    let max_lag = (sr / min_f).floor() as usize;

    if samples.is_empty() || max_lag <= min_lag || samples.len() < max_lag * 2 {
        return PitchEstimate::none();
    }

    let window_size = max_lag;

    // Difference function
    let mut diff = vec![0.0f64; window_size + 1];
    for tau in 1..=window_size {
        let mut sum = 0.0;
        for j in 0..window_size {
            let d = samples[j] as f64 - samples[j + tau] as f64;
            sum += d * d;
        }
        diff[tau] = sum;
    }

    // Cumulative mean normalized difference
    let mut cmnd = vec![1.0f64; window_size + 1];
    let mut running_sum = 0.0;
    for tau in 1..=window_size {
        running_sum += diff[tau];
        if running_sum > 0.0 {
            cmnd[tau] = diff[tau] * tau as f64 / running_sum;
        }
    }

    // Absolute threshold: first dip below it, then walk to the local minimum
    let threshold = 0.15;
    let mut best_tau = 0usize;
    let mut best_val = 1.0f64;

    for tau in min_lag..=window_size {
        if cmnd[tau] < threshold {
            let mut t = tau;
            while t < window_size && cmnd[t + 1] < cmnd[t] {
                t += 1;
            }
            best_tau = t;
            best_val = cmnd[t];
            break;
        }
    }

    // Fallback: global minimum
    if best_tau == 0 {
        for tau in min_lag..=window_size {
            if cmnd[tau] < best_val {
                best_val = cmnd[tau];
                best_tau = tau;
            }
        }
    }

    if best_tau == 0 {
        return PitchEstimate::none();
    }

    // Parabolic interpolation for sub-sample accuracy
    let tau_refined = if best_tau < window_size {
        let alpha = cmnd[best_tau - 1];
        let beta = cmnd[best_tau];
        let gamma = cmnd[best_tau + 1];
        let denom = alpha - 2.0 * beta + gamma;
        if denom.abs() > 1e-12 {
            best_tau as f64 + 0.5 * (alpha - gamma) / denom
        } else {
            best_tau as f64
        }
    } else {
        best_tau as f64
    };

    let frequency = sr / tau_refined;
    let confidence = 1.0 - best_val;
    let (midi_note, cents) = freq_to_midi_cents(frequency, REFERENCE_HZ);

    PitchEstimate {
        frequency,
        confidence,
        midi_note,
        cents,
        is_noise: confidence < 0.5,
    }
}

/// Convert a frequency to the nearest MIDI note + cents.
pub fn freq_to_midi_cents(freq: f64, a4_freq: f64) -> (u8, f64) {
    if freq <= 0.0 {
        return (0, 0.0);
    }
    let midi_float = 69.0 + 12.0 * (freq / a4_freq).log2();
    let midi_note = midi_float.round() as i32;
    let cents = (midi_float - midi_note as f64) * 100.0;

    (midi_note.clamp(0, 127) as u8, cents)
}

/// Octaves from `freq` up to A4; zero when no pitch was found.
pub fn correction_octaves(freq: f64) -> f64 {
    if freq > 0.0 {
        (REFERENCE_HZ / freq).log2()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn generate_sine(freq: f64, sample_rate: u32, duration: f64) -> Vec<f32> {
        let num_samples = (sample_rate as f64 * duration) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * PI * freq * t).sin() as f32
            })
            .collect()
    }

    #[test]
    fn detect_a4_440hz() {
        let samples = generate_sine(440.0, 44100, 0.5);
        let result = detect_pitch(&samples, 44100, None, None);

        assert!(!result.is_noise, "Pure sine should not be noise");
        assert!(result.confidence > 0.8, "Confidence should be high: {}", result.confidence);
        assert!((result.frequency - 440.0).abs() < 5.0, "Expected ~440Hz, got {}", result.frequency);
        assert_eq!(result.midi_note, 69);
        assert!(result.cents.abs() < 20.0);
    }

    #[test]
    fn detect_low_voice() {
        let samples = generate_sine(110.0, 44100, 0.5); // A2
        let result = detect_pitch(&samples, 44100, None, None);

        assert!(!result.is_noise);
        assert!((result.frequency - 110.0).abs() < 2.0, "Expected ~110Hz, got {}", result.frequency);
        assert_eq!(result.midi_note, 45);
    }

    #[test]
    fn noise_detection() {
        let mut rng: u64 = 12345;
        let samples: Vec<f32> = (0..44100)
            .map(|_| {
                rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((rng as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
            })
            .collect();

        let result = detect_pitch(&samples, 44100, None, None);
        assert!(result.confidence < 0.6, "Noise should have low confidence: {}", result.confidence);
    }

    #[test]
    fn too_short_or_empty() {
        assert!(detect_pitch(&[], 44100, None, None).is_noise);
        let short = generate_sine(440.0, 44100, 0.01);
        assert_eq!(detect_pitch(&short, 44100, None, None).frequency, 0.0);
    }

    #[test]
    fn midi_conversion() {
        let (note, cents) = freq_to_midi_cents(432.0, 440.0);
        assert_eq!(note, 69);
        assert!((cents - (-31.77)).abs() < 1.0, "Expected ~-31.8 cents, got {cents}");
        assert_eq!(freq_to_midi_cents(0.0, 440.0), (0, 0.0));
    }

    #[test]
    fn correction_towards_a4() {
        assert!((correction_octaves(220.0) - 1.0).abs() < 1e-12);
        assert!((correction_octaves(880.0) + 1.0).abs() < 1e-12);
        assert_eq!(correction_octaves(0.0), 0.0);
    }
}
