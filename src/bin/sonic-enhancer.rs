//! Command-line front end for the enhancement pipeline.
//!
//! **Usage:**
//! ```bash
//! sonic-enhancer input.mp3 -o enhanced.wav --clarity 1.4 --auto-level
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use sonic_enhancer::session::DEFAULT_OUTPUT_NAME;
use sonic_enhancer::settings::{NoiseProfileMode, OutputChannels};
use sonic_enhancer::{EnhanceSettings, Session};

/// Enhance a recording and export it as 16-bit WAV
#[derive(Parser, Debug)]
#[clap(name = "sonic-enhancer", version)]
#[clap(about = "Compress, equalize, denoise, and boost an audio file")]
struct Args {
    /// Input audio file (WAV or MP3)
    input: PathBuf,

    /// Output WAV path
    #[clap(short, long, default_value = DEFAULT_OUTPUT_NAME)]
    output: PathBuf,

    /// Settings JSON; flags below override it
    #[clap(long, value_name = "FILE", env = "SONIC_ENHANCER_CONFIG")]
    config: Option<PathBuf>,

    /// Final gain after the post-filters
    #[clap(long)]
    voice_boost: Option<f32>,

    /// Gain at the end of the filter graph
    #[clap(long)]
    volume: Option<f32>,

    /// Presence and formant emphasis
    #[clap(long)]
    clarity: Option<f32>,

    /// Noise suppression amount (0.0 - 1.0)
    #[clap(long)]
    noise_reduction: Option<f32>,

    /// Pitch stage offset in octaves relative to A4
    #[clap(long, allow_hyphen_values = true)]
    pitch_correction: Option<f32>,

    /// Derive volume, clarity, noise reduction, and pitch from the input
    #[clap(long)]
    auto_level: bool,

    /// Keep every input channel instead of exporting the first one
    #[clap(long)]
    preserve_channels: bool,

    /// Measure the noise floor from the quietest frames
    #[clap(long)]
    estimate_noise: bool,
}

impl Args {
    fn settings(&self) -> Result<EnhanceSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                EnhanceSettings::from_json(&json)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => EnhanceSettings::default(),
        };

        if let Some(v) = self.voice_boost {
            settings.voice_boost = v;
        }
        if let Some(v) = self.volume {
            settings.volume = v;
        }
        if let Some(v) = self.clarity {
            settings.clarity = v;
        }
        if let Some(v) = self.noise_reduction {
            settings.noise_reduction = v;
        }
        if let Some(v) = self.pitch_correction {
            settings.pitch_correction = v;
        }
        if self.auto_level {
            settings.auto_level = true;
        }
        if self.preserve_channels {
            settings.output_channels = OutputChannels::Preserve;
        }
        if self.estimate_noise {
            settings.noise_profile = NoiseProfileMode::Estimated;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut session = Session::new(args.settings()?);

    session
        .load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    if let Some(analysis) = session.analysis() {
        info!(
            "auto-level: avg volume {:.4}, pitch {:.1} Hz",
            analysis.average_volume, analysis.pitch_hz
        );
    }

    let elapsed = session.process().context("processing audio")?.elapsed;
    session
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Processed in {:.2} seconds -> {}",
        elapsed.as_secs_f64(),
        args.output.display()
    );
    Ok(())
}
