//! FFT plumbing shared by the noise suppressor and the formant stage.

use std::f32::consts::TAU;
use std::sync::Arc;

use rustfft::num_complex::Complex32;

/// Forward/inverse transforms planned once for a fixed size.
pub struct Fft {
    size: usize,
    forward: Arc<dyn rustfft::Fft<f32>>,
    inverse: Arc<dyn rustfft::Fft<f32>>,
}

impl Fft {
    pub fn new(size: usize) -> Self {
        let mut planner = rustfft::FftPlanner::new();
        Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Window `frame` (zero-padded to the FFT size) and transform it.
    pub fn spectrum(&self, frame: &[f32], window: &[f32]) -> Vec<Complex32> {
        let mut buf = vec![Complex32::new(0.0, 0.0); self.size];
        for ((dst, &x), &w) in buf.iter_mut().zip(frame).zip(window) {
            dst.re = x * w;
        }
        self.forward.process(&mut buf);
        buf
    }

    /// Inverse transform, scaled so that `inverse(spectrum(x)) == x`.
    pub fn inverse(&self, buf: &mut [Complex32]) {
        self.inverse.process(buf);
        let scale = 1.0 / self.size as f32;
        for x in buf.iter_mut() {
            *x *= scale;
        }
    }
}

/// Periodic Hann window; sums to one at 50% overlap.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (i as f32 * TAU / size as f32).cos()))
        .collect()
}

/// sqrt(sum w^2): converts a per-sample noise amplitude into the expected
/// magnitude of one bin of the windowed transform.
pub fn window_norm(window: &[f32]) -> f32 {
    window.iter().map(|w| w * w).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_overlap_adds_to_one() {
        let w = hann_window(64);
        for i in 0..32 {
            assert!((w[i] + w[i + 32] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn transform_roundtrip() {
        let fft = Fft::new(16);
        let frame: Vec<f32> = (0..16).map(|i| (i as f32 * 0.3).sin()).collect();
        let mut spec = fft.spectrum(&frame, &[1.0; 16]);
        fft.inverse(&mut spec);
        for (a, b) in spec.iter().zip(&frame) {
            assert!((a.re - b).abs() < 1e-5);
        }
    }

    #[test]
    fn short_frame_is_zero_padded() {
        let fft = Fft::new(8);
        let spec = fft.spectrum(&[1.0, 1.0], &[1.0; 8]);
        // DC bin is the plain sum
        assert!((spec[0].re - 2.0).abs() < 1e-6);
    }
}
