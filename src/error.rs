use std::fmt;

#[derive(Debug)]
pub enum EnhanceError {
    Decode(DecodeError),
    Settings(SettingsError),
    InvalidBuffer(String),
    NoSource,
    NoOutput,
    Io(std::io::Error),
}

#[derive(Debug)]
pub enum DecodeError {
    Empty,
    UnsupportedFormat,
    UnsupportedSampleFormat { bits: u16, float: bool },
    Wav(hound::Error),
    Mpeg(String),
    NoAudio,
}

#[derive(Debug)]
pub enum SettingsError {
    OutOfRange { field: &'static str, value: f32 },
    Json(serde_json::Error),
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhanceError::Decode(e) => write!(f, "Decode error: {e}"),
            EnhanceError::Settings(e) => write!(f, "Settings error: {e}"),
            EnhanceError::InvalidBuffer(msg) => write!(f, "Invalid audio buffer: {msg}"),
            EnhanceError::NoSource => write!(f, "No audio loaded"),
            EnhanceError::NoOutput => write!(f, "No processed audio available"),
            EnhanceError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EnhanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnhanceError::Decode(e) => Some(e),
            EnhanceError::Settings(e) => Some(e),
            EnhanceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "input is empty"),
            DecodeError::UnsupportedFormat => write!(f, "unrecognised audio container"),
            DecodeError::UnsupportedSampleFormat { bits, float } => {
                let kind = if *float { "float" } else { "integer" };
                write!(f, "unsupported {bits}-bit {kind} samples")
            }
            DecodeError::Wav(e) => write!(f, "WAV: {e}"),
            DecodeError::Mpeg(msg) => write!(f, "MPEG: {msg}"),
            DecodeError::NoAudio => write!(f, "stream contains no audio frames"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::OutOfRange { field, value } => {
                write!(f, "'{field}' out of range: {value}")
            }
            SettingsError::Json(e) => write!(f, "invalid settings JSON: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<DecodeError> for EnhanceError {
    fn from(e: DecodeError) -> Self {
        EnhanceError::Decode(e)
    }
}

impl From<SettingsError> for EnhanceError {
    fn from(e: SettingsError) -> Self {
        EnhanceError::Settings(e)
    }
}

impl From<hound::Error> for DecodeError {
    fn from(e: hound::Error) -> Self {
        DecodeError::Wav(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl From<std::io::Error> for EnhanceError {
    fn from(e: std::io::Error) -> Self {
        EnhanceError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, EnhanceError>;
