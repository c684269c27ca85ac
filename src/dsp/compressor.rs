//! Compressor effect — dynamics processing for audio leveling.
//!
//! Implements a feed-forward compressor with threshold, ratio, knee,
//! attack, and release parameters matching the WebAudio DynamicsCompressorNode.
//! Channels are linked: one detector follows the loudest channel and the
//! same gain is applied to all of them, so the stereo image does not wander.

/// Exponent applied to the full-scale gain reduction when deriving the
/// automatic makeup gain (same curve Chromium uses for its compressor node).
const MAKEUP_EXPONENT: f64 = 0.6;

/// A channel-linked dynamics compressor.
#[derive(Debug, Clone)]
pub struct Compressor {
    sample_rate: f64,

    /// Threshold in dB (typical: -50 to 0).
    pub threshold: f64,
    /// Compression ratio (e.g., 4.0 = 4:1 compression).
    pub ratio: f64,
    /// Knee width in dB (0 = hard knee, higher = softer transition).
    pub knee: f64,
    /// Attack time in seconds.
    pub attack: f64,
    /// Release time in seconds.
    pub release: f64,
    /// Makeup gain in dB.
    pub makeup_gain: f64,

    // Internal state
    envelope: f64, // Current envelope level (linear)
}

impl Compressor {
    /// Create a new compressor with WebAudio's default settings.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            threshold: -24.0,
            ratio: 12.0,
            knee: 30.0,
            attack: 0.003,  // 3ms
            release: 0.25,  // 250ms
            makeup_gain: 0.0,
            envelope: 0.0,
        }
    }

    /// Create a compressor with specific parameters.
    pub fn with_params(
        sample_rate: f64,
        threshold: f64,
        knee: f64,
        ratio: f64,
        attack: f64,
        release: f64,
    ) -> Self {
        let mut c = Self::new(sample_rate);
        c.threshold = threshold.clamp(-100.0, 0.0);
        c.knee = knee.clamp(0.0, 40.0);
        c.ratio = ratio.clamp(1.0, 20.0);
        c.attack = attack.clamp(0.0001, 1.0);
        c.release = release.clamp(0.001, 5.0);
        c
    }

    /// The leveling stage of the enhancement chain: -24 dB threshold,
    /// 30 dB knee, 12:1, 3 ms attack, 250 ms release, automatic makeup.
    pub fn enhancement(sample_rate: f64) -> Self {
        let mut c = Self::with_params(sample_rate, -24.0, 30.0, 12.0, 0.003, 0.25);
        c.makeup_gain = c.auto_makeup_gain();
        c
    }

    /// Makeup gain (dB) that restores part of the reduction a 0 dBFS
    /// signal would receive.
    pub fn auto_makeup_gain(&self) -> f64 {
        -self.compute_gain(0.0) * MAKEUP_EXPONENT
    }

    /// Convert linear amplitude to dB.
    #[inline]
    fn linear_to_db(linear: f64) -> f64 {
        if linear <= 0.0 {
            -120.0
        } else {
            20.0 * linear.log10()
        }
    }

    /// Convert dB to linear amplitude.
    #[inline]
    fn db_to_linear(db: f64) -> f64 {
        10.0_f64.powf(db / 20.0)
    }

    /// Compute gain reduction for a given input level (in dB).
    #[inline]
    fn compute_gain(&self, input_db: f64) -> f64 {
        let threshold = self.threshold;
        let slope = 1.0 - 1.0 / self.ratio;
        let knee = self.knee;

        if knee <= 0.0 {
            if input_db <= threshold {
                0.0
            } else {
                (threshold - input_db) * slope
            }
        } else {
            let half_knee = knee / 2.0;
            let knee_start = threshold - half_knee;
            let knee_end = threshold + half_knee;

            if input_db <= knee_start {
                0.0
            } else if input_db >= knee_end {
                (threshold - input_db) * slope
            } else {
                // Quadratic interpolation across the knee
                let x = input_db - knee_start;
                let knee_factor = x / knee;
                -knee_factor * knee_factor * slope * half_knee
            }
        }
    }

    #[inline]
    fn coefficients(&self) -> (f64, f64) {
        let attack_coef = (-1.0 / (self.attack * self.sample_rate)).exp();
        let release_coef = (-1.0 / (self.release * self.sample_rate)).exp();
        (attack_coef, release_coef)
    }

    #[inline]
    fn next_gain(&mut self, input_level: f64, attack_coef: f64, release_coef: f64) -> f32 {
        let coef = if input_level > self.envelope {
            attack_coef
        } else {
            release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * input_level;

        let gain_reduction_db = self.compute_gain(Self::linear_to_db(self.envelope));
        Self::db_to_linear(gain_reduction_db + self.makeup_gain) as f32
    }

    /// Process one frame (one sample per channel) in place.
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32]) {
        let (attack_coef, release_coef) = self.coefficients();
        let input_level = frame.iter().fold(0.0f32, |m, s| m.max(s.abs())) as f64;
        let gain = self.next_gain(input_level, attack_coef, release_coef);
        for s in frame.iter_mut() {
            *s *= gain;
        }
    }

    /// Process planar channels in place.
    pub fn process_block(&mut self, channels: &mut [Vec<f32>]) {
        let (attack_coef, release_coef) = self.coefficients();
        let len = channels.iter().map(Vec::len).min().unwrap_or(0);
        for i in 0..len {
            let input_level = channels
                .iter()
                .fold(0.0f32, |m, ch| m.max(ch[i].abs())) as f64;
            let gain = self.next_gain(input_level, attack_coef, release_coef);
            for ch in channels.iter_mut() {
                ch[i] *= gain;
            }
        }
    }

    /// Reset the compressor state.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    /// Get the current gain reduction in dB (for metering).
    pub fn gain_reduction_db(&self) -> f64 {
        let envelope_db = Self::linear_to_db(self.envelope);
        -self.compute_gain(envelope_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(threshold: f64, ratio: f64, attack: f64, release: f64) -> Compressor {
        Compressor::with_params(44100.0, threshold, 0.0, ratio, attack, release)
    }

    #[test]
    fn test_compressor_passthrough_below_threshold() {
        let mut comp = plain(-20.0, 4.0, 0.001, 0.1);

        for _ in 0..1000 {
            comp.process_frame(&mut [0.05, 0.05]); // -26 dB, below -20 threshold
        }

        let mut frame = [0.05, 0.05];
        comp.process_frame(&mut frame);
        assert!(
            (frame[0] - 0.05).abs() < 0.01,
            "Below threshold, output should be close to input: got {}",
            frame[0]
        );
        assert!((frame[1] - 0.05).abs() < 0.01);
    }

    #[test]
    fn test_compressor_reduces_loud_signals() {
        let mut comp = plain(-12.0, 4.0, 0.001, 0.1);

        for _ in 0..5000 {
            comp.process_frame(&mut [1.0, 1.0]);
        }

        let mut frame = [1.0, 1.0];
        comp.process_frame(&mut frame);

        // 4:1 ratio at 12dB above threshold should reduce by 9dB (~0.35)
        assert!(frame[0] < 0.5, "Compressor should reduce loud signals: got {}", frame[0]);
        assert!(frame[0] > 0.1, "Compressor should not over-compress: got {}", frame[0]);
        assert!((comp.gain_reduction_db() - 9.0).abs() < 0.5);
    }

    #[test]
    fn test_compressor_attack_time() {
        let mut comp = plain(-20.0, 10.0, 0.01, 0.5);

        let mut first = [1.0f32];
        comp.process_frame(&mut first);

        for _ in 0..500 {
            comp.process_frame(&mut [1.0]);
        }
        let mut later = [1.0f32];
        comp.process_frame(&mut later);

        assert!(
            first[0] > later[0],
            "First sample should be louder than after attack: first={}, later={}",
            first[0],
            later[0]
        );
    }

    #[test]
    fn test_compressor_release_time() {
        let mut comp = plain(-20.0, 10.0, 0.001, 0.05);

        for _ in 0..1000 {
            comp.process_frame(&mut [1.0]);
        }

        let mut compressed = [0.1f32];
        comp.process_frame(&mut compressed);

        for _ in 0..5000 {
            comp.process_frame(&mut [0.1]);
        }

        let mut released = [0.1f32];
        comp.process_frame(&mut released);

        assert!(
            released[0] > compressed[0],
            "After release, gain should recover: compressed={}, released={}",
            compressed[0],
            released[0]
        );
    }

    #[test]
    fn channels_are_linked() {
        let mut comp = plain(-20.0, 8.0, 0.001, 0.1);
        let mut channels = vec![vec![0.9f32; 4000], vec![0.01f32; 4000]];
        comp.process_block(&mut channels);
        // The quiet channel is pulled down by the loud one's detector.
        let ratio = channels[1][3999] / 0.01;
        let loud_ratio = channels[0][3999] / 0.9;
        assert!(ratio < 0.9);
        assert!((ratio - loud_ratio).abs() < 1e-4);
    }

    #[test]
    fn soft_knee_is_continuous() {
        let comp = Compressor::with_params(44100.0, -24.0, 30.0, 12.0, 0.003, 0.25);
        let below = comp.compute_gain(-9.0001);
        let above = comp.compute_gain(-8.9999);
        assert!((below - above).abs() < 1e-3);
        assert_eq!(comp.compute_gain(-39.0), 0.0);
    }

    #[test]
    fn enhancement_preset_has_makeup() {
        let comp = Compressor::enhancement(48000.0);
        assert_eq!(comp.threshold, -24.0);
        assert_eq!(comp.knee, 30.0);
        assert_eq!(comp.ratio, 12.0);
        // 0 dBFS is reduced by 22 dB; 60% of that comes back.
        assert!((comp.makeup_gain - 13.2).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_envelope() {
        let mut comp = Compressor::enhancement(44100.0);
        for _ in 0..1000 {
            comp.process_frame(&mut [1.0]);
        }
        assert!(comp.gain_reduction_db() > 0.0);
        comp.reset();
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }
}
