//! Headless control surface: one loaded source, the current settings, and
//! the last processed result.

use std::path::Path;
use std::time::Duration;

use log::{info, warn};

use crate::analysis::{analyze_levels, LevelAnalysis};
use crate::buffer::AudioBuffer;
use crate::decode::{decode, decode_file};
use crate::enhancer::{Enhancer, ProcessReport, ProcessingStatus};
use crate::error::{EnhanceError, Result};
use crate::settings::EnhanceSettings;

pub const DEFAULT_OUTPUT_NAME: &str = "enhanced-audio.wav";

#[derive(Debug, Default)]
pub struct Session {
    settings: EnhanceSettings,
    source: Option<AudioBuffer>,
    last: Option<ProcessReport>,
    analysis: Option<LevelAnalysis>,
    status: ProcessingStatus,
}

impl Session {
    pub fn new(settings: EnhanceSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &EnhanceSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EnhanceSettings {
        &mut self.settings
    }

    pub fn source(&self) -> Option<&AudioBuffer> {
        self.source.as_ref()
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn analysis(&self) -> Option<&LevelAnalysis> {
        self.analysis.as_ref()
    }

    pub fn processing_time(&self) -> Option<Duration> {
        self.last.as_ref().map(|r| r.elapsed)
    }

    /// Decode `bytes` as the new source. A previous result is discarded.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let buffer = decode(bytes)?;
        self.set_source(buffer);
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let buffer = decode_file(path)?;
        self.set_source(buffer);
        Ok(())
    }

    pub fn set_source(&mut self, buffer: AudioBuffer) {
        info!(
            "loaded {:.2}s of audio ({} ch @ {} Hz)",
            buffer.duration_secs(),
            buffer.channels(),
            buffer.sample_rate()
        );
        self.source = Some(buffer);
        self.last = None;
        self.analysis = None;
        self.status = ProcessingStatus::Idle;
        if self.settings.auto_level {
            self.auto_level();
        }
    }

    /// Flip auto-leveling; turning it on analyses the loaded source at once.
    pub fn toggle_auto_level(&mut self) -> bool {
        self.settings.auto_level = !self.settings.auto_level;
        if self.settings.auto_level {
            self.auto_level();
        }
        self.settings.auto_level
    }

    fn auto_level(&mut self) {
        let Some(source) = &self.source else {
            return;
        };
        self.status = ProcessingStatus::Analyzing;
        info!("{}", self.status);
        let analysis = analyze_levels(source);
        analysis.apply_to(&mut self.settings);
        self.analysis = Some(analysis);
        self.status = ProcessingStatus::AutoLevelsOptimized;
        info!("{}", self.status);
    }

    /// Run the pipeline over the loaded source with the current settings.
    pub fn process(&mut self) -> Result<&ProcessReport> {
        let Some(source) = &self.source else {
            return Err(EnhanceError::NoSource);
        };
        match Enhancer::new(self.settings.clone()).process(source) {
            Ok(report) => {
                self.status = ProcessingStatus::Complete;
                Ok(self.last.insert(report))
            }
            Err(e) => {
                self.status = ProcessingStatus::Failed;
                Err(e)
            }
        }
    }

    pub fn increase_voice_boost(&mut self) -> Result<Option<&ProcessReport>> {
        self.settings.increase_voice_boost();
        self.reprocess()
    }

    pub fn increase_volume(&mut self) -> Result<Option<&ProcessReport>> {
        self.settings.increase_volume();
        self.reprocess()
    }

    pub fn increase_clarity(&mut self) -> Result<Option<&ProcessReport>> {
        self.settings.increase_clarity();
        self.reprocess()
    }

    pub fn increase_noise_reduction(&mut self) -> Result<Option<&ProcessReport>> {
        self.settings.increase_noise_reduction();
        self.reprocess()
    }

    /// Re-run after a setting change; a no-op until a source is loaded.
    fn reprocess(&mut self) -> Result<Option<&ProcessReport>> {
        if self.source.is_none() {
            return Ok(None);
        }
        self.process().map(Some)
    }

    pub fn processed_wav(&self) -> Option<&[u8]> {
        self.last.as_ref().map(|r| r.wav.as_slice())
    }

    /// Write the last result to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let Some(wav) = self.processed_wav() else {
            warn!("nothing to save: no processed audio");
            return Err(EnhanceError::NoOutput);
        };
        std::fs::write(path.as_ref(), wav)?;
        info!("wrote {} bytes to {}", wav.len(), path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_wav;
    use std::f32::consts::PI;

    fn tone_wav(amp: f32) -> Vec<u8> {
        let samples = (0..8000)
            .map(|i| amp * (2.0 * PI * 220.0 * i as f32 / 8000.0).sin())
            .collect();
        encode_wav(&AudioBuffer::mono(8000, samples).unwrap())
    }

    #[test]
    fn process_without_source_fails() {
        let mut session = Session::default();
        assert!(matches!(session.process(), Err(EnhanceError::NoSource)));
        assert!(matches!(session.save("unused.wav"), Err(EnhanceError::NoOutput)));
    }

    #[test]
    fn increases_without_source_only_change_settings() {
        let mut session = Session::default();
        assert!(session.increase_clarity().unwrap().is_none());
        assert!((session.settings().clarity - 1.2).abs() < 1e-6);
        assert_eq!(session.status(), ProcessingStatus::Idle);
    }

    #[test]
    fn increase_reprocesses_loaded_source() {
        let mut session = Session::default();
        session.load(&tone_wav(0.3)).unwrap();
        let report = session.increase_voice_boost().unwrap().unwrap();
        assert_eq!(report.output.len(), 8000);
        assert!((session.settings().voice_boost - 1.4).abs() < 1e-6);
        assert_eq!(session.status(), ProcessingStatus::Complete);
        assert!(session.processing_time().is_some());
    }

    #[test]
    fn auto_level_on_load() {
        let mut session = Session::new(EnhanceSettings {
            auto_level: true,
            ..Default::default()
        });
        session.load(&tone_wav(0.1)).unwrap();
        let analysis = session.analysis().unwrap();
        assert_eq!(session.settings().volume, analysis.volume);
        assert_eq!(session.settings().volume, 2.0);
        assert_eq!(session.status(), ProcessingStatus::AutoLevelsOptimized);
    }

    #[test]
    fn toggling_auto_level_analyses_immediately() {
        let mut session = Session::default();
        session.load(&tone_wav(0.5)).unwrap();
        assert!(session.analysis().is_none());
        assert!(session.toggle_auto_level());
        assert!(session.analysis().is_some());
        assert_eq!(session.status(), ProcessingStatus::AutoLevelsOptimized);
        assert!(!session.toggle_auto_level());
    }

    #[test]
    fn failing_process_marks_failed() {
        let mut session = Session::default();
        session.load(&tone_wav(0.3)).unwrap();
        session.process().unwrap();
        session.settings_mut().clarity = f32::NAN;
        assert!(matches!(session.process(), Err(EnhanceError::Settings(_))));
        assert_eq!(session.status(), ProcessingStatus::Failed);
        // The earlier result survives a failed run.
        assert!(session.processed_wav().is_some());
    }

    #[test]
    fn loading_clears_previous_result() {
        let mut session = Session::default();
        session.load(&tone_wav(0.3)).unwrap();
        session.process().unwrap();
        assert!(session.processed_wav().is_some());
        session.load(&tone_wav(0.2)).unwrap();
        assert!(session.processed_wav().is_none());
    }

    #[test]
    fn bad_bytes_keep_previous_source() {
        let mut session = Session::default();
        session.load(&tone_wav(0.3)).unwrap();
        assert!(session.load(b"garbage").is_err());
        assert!(session.source().is_some());
    }
}
