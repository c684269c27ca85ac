//! Input decoding: WAV via `hound`, MPEG audio via `minimp3`.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::debug;

use crate::buffer::AudioBuffer;
use crate::error::{DecodeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Wav,
    Mpeg,
    Unknown,
}

/// Guess the container from the first bytes.
pub fn sniff(bytes: &[u8]) -> Container {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        Container::Wav
    } else if bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0) {
        Container::Mpeg
    } else {
        Container::Unknown
    }
}

/// Decode an in-memory audio file.
pub fn decode(bytes: &[u8]) -> Result<AudioBuffer> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty.into());
    }
    let container = sniff(bytes);
    debug!("decoding {} bytes as {container:?}", bytes.len());
    match container {
        Container::Wav => decode_wav(bytes),
        // Headerless MPEG streams can start with junk; let the decoder resync.
        Container::Mpeg | Container::Unknown => decode_mpeg(bytes, container),
    }
}

pub fn decode_file(path: impl AsRef<Path>) -> Result<AudioBuffer> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer> {
    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(DecodeError::from)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(DecodeError::from)?,
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(DecodeError::from)?
        }
        (format, bits) => {
            return Err(DecodeError::UnsupportedSampleFormat {
                bits,
                float: format == SampleFormat::Float,
            }
            .into());
        }
    };

    AudioBuffer::from_interleaved(spec.sample_rate, spec.channels as usize, &interleaved)
}

#[cfg(feature = "mp3")]
fn decode_mpeg(bytes: &[u8], container: Container) -> Result<AudioBuffer> {
    use minimp3::{Decoder, Error, Frame};

    let mut decoder = Decoder::new(Cursor::new(bytes));
    let mut interleaved = Vec::new();
    let mut layout: Option<(u32, usize)> = None;

    loop {
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate,
                channels,
                ..
            }) => {
                let (_, expected_channels) =
                    *layout.get_or_insert((sample_rate as u32, channels));
                if channels != expected_channels {
                    return Err(DecodeError::Mpeg(format!(
                        "channel count changed from {expected_channels} to {channels}"
                    ))
                    .into());
                }
                interleaved.extend(data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(Error::SkippedData) => continue,
            Err(Error::Eof) | Err(Error::InsufficientData) => break,
            Err(Error::Io(e)) => return Err(DecodeError::Mpeg(e.to_string()).into()),
        }
    }

    match layout {
        Some((sample_rate, channels)) => {
            AudioBuffer::from_interleaved(sample_rate, channels, &interleaved)
        }
        None if container == Container::Unknown => Err(DecodeError::UnsupportedFormat.into()),
        None => Err(DecodeError::NoAudio.into()),
    }
}

#[cfg(not(feature = "mp3"))]
fn decode_mpeg(_bytes: &[u8], _container: Container) -> Result<AudioBuffer> {
    Err(DecodeError::UnsupportedFormat.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnhanceError;
    use hound::{WavSpec, WavWriter};

    fn write_wav(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn sniffs_containers() {
        assert_eq!(sniff(b"RIFF\0\0\0\0WAVEfmt "), Container::Wav);
        assert_eq!(sniff(b"ID3\x04\0"), Container::Mpeg);
        assert_eq!(sniff(&[0xFF, 0xFB, 0x90]), Container::Mpeg);
        assert_eq!(sniff(b"OggS"), Container::Unknown);
    }

    #[test]
    fn decodes_stereo_16_bit() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = write_wav(spec, |w| {
            for _ in 0..100 {
                w.write_sample(16384i16).unwrap();
                w.write_sample(-32768i16).unwrap();
            }
        });
        let buf = decode(&bytes).unwrap();
        assert_eq!(buf.sample_rate(), 22050);
        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.len(), 100);
        assert_eq!(buf.channel(0).unwrap()[0], 0.5);
        assert_eq!(buf.channel(1).unwrap()[99], -1.0);
    }

    #[test]
    fn decodes_float_and_24_bit() {
        let float = write_wav(
            WavSpec {
                channels: 1,
                sample_rate: 48000,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
            |w| w.write_sample(0.25f32).unwrap(),
        );
        assert_eq!(decode(&float).unwrap().channel(0).unwrap(), &[0.25]);

        let int24 = write_wav(
            WavSpec {
                channels: 1,
                sample_rate: 48000,
                bits_per_sample: 24,
                sample_format: SampleFormat::Int,
            },
            |w| w.write_sample(-4194304i32).unwrap(),
        );
        assert_eq!(decode(&int24).unwrap().channel(0).unwrap(), &[-0.5]);
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(
            decode(&[]),
            Err(EnhanceError::Decode(DecodeError::Empty))
        ));
        assert!(matches!(decode(b"not audio at all"), Err(EnhanceError::Decode(_))));
    }

    #[test]
    fn truncated_wav_is_an_error() {
        let mut bytes = b"RIFF\x24\0\0\0WAVE".to_vec();
        bytes.extend_from_slice(b"fmt ");
        assert!(matches!(decode(&bytes), Err(EnhanceError::Decode(DecodeError::Wav(_)))));
    }
}
