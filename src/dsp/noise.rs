//! Spectral-subtraction noise suppression.
//!
//! 1024-point STFT, periodic Hann analysis window, 50% hop, magnitude
//! subtraction with the phase kept, overlap-add resynthesis.

use log::debug;

use super::spectrum::{hann_window, window_norm, Fft};

pub const FRAME_SIZE: usize = 1024;
pub const HOP: usize = FRAME_SIZE / 2;
/// Per-sample amplitude of the flat noise floor.
pub const DEFAULT_NOISE_LEVEL: f32 = 0.01;
/// Fraction of the quietest frames averaged by [`NoiseProfile::estimate`].
const QUIET_FRACTION: f32 = 0.1;

/// Noise floor per frequency bin, in per-sample amplitude units.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseProfile {
    levels: Vec<f32>,
}

impl NoiseProfile {
    pub fn flat(level: f32, bins: usize) -> Self {
        Self {
            levels: vec![level; bins.max(1)],
        }
    }

    /// Average spectrum of the quietest frames of `samples`.
    pub fn estimate(samples: &[f32], bins: usize) -> Self {
        let bins = bins.max(2);
        if samples.is_empty() {
            return Self::flat(0.0, bins);
        }

        let fft = Fft::new(bins);
        let window = hann_window(bins);
        let norm = window_norm(&window);
        let hop = bins / 2;

        // Only whole frames; a zero-padded tail would read as silence.
        // Input shorter than one frame is analysed as a single padded frame.
        let starts: Vec<usize> = if samples.len() < bins {
            vec![0]
        } else {
            (0..=samples.len() - bins).step_by(hop).collect()
        };
        let mut frames: Vec<(f32, Vec<f32>)> = starts
            .into_iter()
            .map(|start| {
                let end = (start + bins).min(samples.len());
                let spectrum = fft.spectrum(&samples[start..end], &window);
                let mags: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();
                let energy = mags.iter().map(|m| m * m).sum::<f32>();
                (energy, mags)
            })
            .collect();

        frames.sort_by(|a, b| a.0.total_cmp(&b.0));
        let take = ((frames.len() as f32 * QUIET_FRACTION).ceil() as usize).max(1);
        let mut levels = vec![0.0f32; bins];
        for (_, mags) in frames.iter().take(take) {
            for (l, m) in levels.iter_mut().zip(mags) {
                *l += m;
            }
        }
        let scale = 1.0 / (take as f32 * norm);
        levels.iter_mut().for_each(|l| *l *= scale);

        debug!("estimated noise profile from {take} of {} frames", frames.len());
        Self { levels }
    }

    pub fn bins(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Level for FFT bin `k`; profiles of another size wrap around.
    fn level(&self, k: usize) -> f32 {
        self.levels[k % self.levels.len()]
    }
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self::flat(DEFAULT_NOISE_LEVEL, FRAME_SIZE)
    }
}

/// Subtract `amount` times the noise profile from every STFT frame of
/// `samples`. Output has the same length as the input.
pub fn spectral_subtraction(samples: &[f32], profile: &NoiseProfile, amount: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let fft = Fft::new(FRAME_SIZE);
    let window = hann_window(FRAME_SIZE);
    let norm = window_norm(&window);
    let floor: Vec<f32> = (0..FRAME_SIZE)
        .map(|k| amount * profile.level(k) * norm)
        .collect();

    // Pad by one hop in front so the first samples are covered by two frames.
    let last_frame = (samples.len() - 1 + HOP) / HOP;
    let padded_len = last_frame * HOP + FRAME_SIZE;
    let mut padded = vec![0.0f32; padded_len];
    padded[HOP..HOP + samples.len()].copy_from_slice(samples);

    let mut output = vec![0.0f32; padded_len];
    for frame in 0..=last_frame {
        let start = frame * HOP;
        let mut spectrum = fft.spectrum(&padded[start..start + FRAME_SIZE], &window);
        for (bin, f) in spectrum.iter_mut().zip(&floor) {
            let mag = bin.norm();
            if mag > 0.0 {
                let cleaned = (mag - f).max(0.0);
                *bin *= cleaned / mag;
            }
        }
        fft.inverse(&mut spectrum);
        for (o, c) in output[start..start + FRAME_SIZE].iter_mut().zip(&spectrum) {
            *o += c.re;
        }
    }

    output.drain(..HOP);
    output.truncate(samples.len());
    output
}
