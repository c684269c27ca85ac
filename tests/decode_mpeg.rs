//! MPEG input through minimp3, using a short Layer III clip
//! (22.05 kHz mono, ID3v2 tag, LAME info frame).
#![cfg(feature = "mp3")]

use sonic_enhancer::decode::{decode, decode_file, sniff, Container};
use sonic_enhancer::error::{DecodeError, EnhanceError};
use sonic_enhancer::{ProcessingStatus, Session};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/mono-22k.mp3");
/// First byte after the ID3v2 tag.
const AUDIO_START: usize = 32;

fn fixture() -> Vec<u8> {
    std::fs::read(FIXTURE).unwrap()
}

#[test]
fn decodes_tagged_mp3() {
    let bytes = fixture();
    assert_eq!(sniff(&bytes), Container::Mpeg);

    let buffer = decode_file(FIXTURE).unwrap();
    assert_eq!(buffer.sample_rate(), 22050);
    assert_eq!(buffer.channels(), 1);
    assert!(buffer.len() > 10_000, "only {} samples", buffer.len());
    let samples = buffer.channel(0).unwrap();
    assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
}

#[test]
fn resyncs_past_leading_junk() {
    let clean = decode(&fixture()).unwrap();

    let mut bytes = b"junk".to_vec();
    bytes.extend_from_slice(&fixture()[AUDIO_START..]);
    assert_eq!(sniff(&bytes), Container::Unknown);

    let buffer = decode(&bytes).unwrap();
    assert_eq!(buffer.sample_rate(), 22050);
    assert_eq!(buffer.channels(), 1);
    assert!(buffer.len() > 10_000);
    // At most one frame lost while resyncing.
    assert!(clean.len().abs_diff(buffer.len()) <= 1152);
}

#[test]
fn tag_without_frames_has_no_audio() {
    let mut bytes = b"ID3\x04\0\0\0\0\0\0".to_vec();
    bytes.extend_from_slice(&[0u8; 4096]);
    assert!(matches!(
        decode(&bytes),
        Err(EnhanceError::Decode(DecodeError::NoAudio))
    ));
}

#[test]
fn session_enhances_mp3() {
    let mut session = Session::default();
    session.load(&fixture()).unwrap();
    let input_len = session.source().unwrap().len();

    let report = session.process().unwrap();
    assert_eq!(report.output.len(), input_len);
    assert_eq!(report.output.sample_rate(), 22050);
    assert_eq!(report.wav.len(), 44 + input_len * 2);
    assert_eq!(session.status(), ProcessingStatus::Complete);
}
