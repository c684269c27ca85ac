//! WAV encoder — canonical 44-byte header, 16-bit little-endian PCM.

use crate::buffer::AudioBuffer;

pub const HEADER_LEN: usize = 44;

/// Convert a float sample to 16-bit PCM. Clamped to [-1, 1]; negative values
/// scale by 0x8000 and positive by 0x7FFF so both extremes are reachable.
#[inline]
pub fn to_i16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a buffer as a 16-bit PCM WAV file, channels interleaved.
pub fn encode_wav(buffer: &AudioBuffer) -> Vec<u8> {
    let pcm: Vec<i16> = buffer.interleaved().into_iter().map(to_i16).collect();
    encode_pcm(&pcm, buffer.sample_rate(), buffer.channels() as u16)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_pcm(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let block_align = channels.saturating_mul(bits_per_sample / 8);
    // Header fields are 32-bit; absurd rates saturate instead of wrapping.
    let byte_rate = sample_rate.saturating_mul(block_align as u32);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
