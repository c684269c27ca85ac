//! Planar audio buffer shared by every pipeline stage.

use crate::error::{EnhanceError, Result};

/// Decoded audio, one `Vec<f32>` per channel, all of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(EnhanceError::InvalidBuffer("sample rate is zero".into()));
        }
        let Some(first) = channels.first() else {
            return Err(EnhanceError::InvalidBuffer("no channels".into()));
        };
        let len = first.len();
        if let Some(i) = channels.iter().position(|c| c.len() != len) {
            return Err(EnhanceError::InvalidBuffer(format!(
                "channel {i} has {} samples, expected {len}",
                channels[i].len()
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    /// Split interleaved frames into planar channels.
    pub fn from_interleaved(sample_rate: u32, channels: usize, data: &[f32]) -> Result<Self> {
        if channels == 0 {
            return Err(EnhanceError::InvalidBuffer("no channels".into()));
        }
        let frames = data.len() / channels;
        let mut planar = vec![Vec::with_capacity(frames); channels];
        for frame in data.chunks_exact(channels) {
            for (ch, &s) in planar.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::new(sample_rate, planar)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channel_data(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Interleave channels frame by frame.
    pub fn interleaved(&self) -> Vec<f32> {
        let n = self.len();
        let mut out = Vec::with_capacity(n * self.channels());
        for i in 0..n {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }
}
