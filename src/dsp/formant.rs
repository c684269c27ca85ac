//! Formant enhancement — per-frame gain driven by the spectral centroid.
//!
//! Bright frames (centroid well above 1 kHz) are lifted up to 1.5x, dull
//! frames are held at 0.8x, and the whole curve is scaled by clarity.

use super::spectrum::{hann_window, Fft};

pub const FRAME_SIZE: usize = 512;
pub const MIN_FACTOR: f32 = 0.8;
pub const MAX_FACTOR: f32 = 1.5;
/// Centroid (Hz) that maps to unity gain.
pub const CENTROID_REFERENCE_HZ: f32 = 1000.0;

/// Amplitude-weighted mean frequency of `frame` in Hz. Zero for silence.
pub fn spectral_centroid(fft: &Fft, window: &[f32], frame: &[f32], sample_rate: u32) -> f32 {
    let spectrum = fft.spectrum(frame, window);
    let bin_hz = sample_rate as f32 / fft.size() as f32;

    let (weighted, total) = spectrum[..=fft.size() / 2]
        .iter()
        .enumerate()
        .fold((0.0f32, 0.0f32), |(w, t), (k, c)| {
            let mag = c.norm();
            (w + k as f32 * bin_hz * mag, t + mag)
        });

    if total > 0.0 { weighted / total } else { 0.0 }
}

/// Gain factor for each `FRAME_SIZE` frame of `samples`.
pub fn frame_factors(samples: &[f32], sample_rate: u32, clarity: f32) -> Vec<f32> {
    let fft = Fft::new(FRAME_SIZE);
    let window = hann_window(FRAME_SIZE);
    samples
        .chunks(FRAME_SIZE)
        .map(|frame| {
            let centroid = spectral_centroid(&fft, &window, frame, sample_rate);
            (centroid / CENTROID_REFERENCE_HZ).clamp(MIN_FACTOR, MAX_FACTOR) * clarity
        })
        .collect()
}

/// Apply the per-frame formant gain. The gain ramps linearly from the
/// previous frame's factor across each frame.
pub fn enhance_formants(samples: &[f32], sample_rate: u32, clarity: f32) -> Vec<f32> {
    let factors = frame_factors(samples, sample_rate, clarity);
    let mut output = Vec::with_capacity(samples.len());
    let mut previous = factors.first().copied().unwrap_or(clarity);

    for (frame, &factor) in samples.chunks(FRAME_SIZE).zip(&factors) {
        let len = frame.len() as f32;
        for (j, &s) in frame.iter().enumerate() {
            let t = (j + 1) as f32 / len;
            output.push(s * (previous + (factor - previous) * t));
        }
        previous = factor;
    }

    output
}
