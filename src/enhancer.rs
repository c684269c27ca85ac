//! The enhancement pipeline:
//! decode -> offline filter graph -> time-domain post-filters -> encode.

use std::fmt;
use std::time::Duration;

use log::{debug, error, info};
use serde::Serialize;

use crate::buffer::AudioBuffer;
use crate::dsp::formant::enhance_formants;
use crate::dsp::graph::FilterGraph;
use crate::dsp::noise::{spectral_subtraction, NoiseProfile, FRAME_SIZE};
use crate::error::Result;
use crate::settings::{EnhanceSettings, NoiseProfileMode, OutputChannels};
use crate::wav::encode_wav;

/// Where a processing run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Analyzing,
    AutoLevelsOptimized,
    Optimizing,
    ApplyingEnhancements,
    Complete,
    Failed,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ProcessingStatus::Idle => "",
            ProcessingStatus::Analyzing => "Analyzing audio characteristics...",
            ProcessingStatus::AutoLevelsOptimized => "Auto-levels optimized for best quality",
            ProcessingStatus::Optimizing => "Optimizing audio...",
            ProcessingStatus::ApplyingEnhancements => "Applying enhancements...",
            ProcessingStatus::Complete => "Processing complete!",
            ProcessingStatus::Failed => "Error processing audio",
        };
        f.write_str(msg)
    }
}

/// Output of one successful run.
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub output: AudioBuffer,
    /// `output` encoded as 16-bit PCM WAV.
    pub wav: Vec<u8>,
    pub elapsed: Duration,
    /// Statuses passed through, in order.
    pub statuses: Vec<ProcessingStatus>,
}

/// Wall-clock timer; wasm32 has no monotonic clock, so it reports zero there.
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed()
        }
        #[cfg(target_arch = "wasm32")]
        {
            Duration::ZERO
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Enhancer {
    settings: EnhanceSettings,
}

impl Enhancer {
    pub fn new(settings: EnhanceSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EnhanceSettings {
        &self.settings
    }

    /// Run the full chain over `source`.
    pub fn process(&self, source: &AudioBuffer) -> Result<ProcessReport> {
        let stopwatch = Stopwatch::start();
        let mut statuses = Vec::new();

        match self.run(source, &mut statuses) {
            Ok(output) => {
                let wav = encode_wav(&output);
                let elapsed = stopwatch.elapsed();
                set_status(&mut statuses, ProcessingStatus::Complete);
                info!("processed in {:.2} seconds", elapsed.as_secs_f64());
                Ok(ProcessReport {
                    output,
                    wav,
                    elapsed,
                    statuses,
                })
            }
            Err(e) => {
                error!("error processing audio: {e}");
                Err(e)
            }
        }
    }

    fn run(&self, source: &AudioBuffer, statuses: &mut Vec<ProcessingStatus>) -> Result<AudioBuffer> {
        let settings = &self.settings;
        settings.validate()?;

        set_status(statuses, ProcessingStatus::Optimizing);
        let sample_rate = source.sample_rate();
        let rendered = FilterGraph::enhancement(settings, sample_rate as f64).render(source)?;

        set_status(statuses, ProcessingStatus::ApplyingEnhancements);
        let mut channels = rendered.into_channels();
        if settings.output_channels == OutputChannels::Mono {
            channels.truncate(1);
        }

        for channel in channels.iter_mut() {
            let profile = match settings.noise_profile {
                NoiseProfileMode::Flat => NoiseProfile::default(),
                NoiseProfileMode::Estimated => NoiseProfile::estimate(channel, FRAME_SIZE),
            };
            let denoised = spectral_subtraction(channel, &profile, settings.noise_reduction);
            let mut enhanced = enhance_formants(&denoised, sample_rate, settings.clarity);
            for s in enhanced.iter_mut() {
                *s *= settings.voice_boost;
            }
            *channel = enhanced;
        }
        debug!("post-filters applied to {} channel(s)", channels.len());

        AudioBuffer::new(sample_rate, channels)
    }
}

fn set_status(statuses: &mut Vec<ProcessingStatus>, status: ProcessingStatus) {
    info!("{status}");
    statuses.push(status);
}
