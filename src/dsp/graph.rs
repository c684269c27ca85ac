//! Offline filter graph — the fixed enhancement chain rendered in one pass.
//!
//! ```text
//! source -> compressor -> lowshelf 200 Hz -> peaking 1.5 kHz -> highshelf 3 kHz
//!        -> [allpass at the pitch frequency] -> gain -> destination
//! ```

use log::debug;

use crate::buffer::AudioBuffer;
use crate::error::Result;
use crate::settings::EnhanceSettings;

use super::compressor::Compressor;
use super::filter::{BiquadFilter, FilterType};

pub const LOW_SHELF_HZ: f64 = 200.0;
pub const LOW_SHELF_DB: f64 = 3.0;
pub const PRESENCE_HZ: f64 = 1500.0;
pub const PRESENCE_Q: f64 = 1.0;
/// Presence boost per unit of clarity.
pub const PRESENCE_DB: f64 = 6.0;
pub const HIGH_SHELF_HZ: f64 = 3000.0;
pub const HIGH_SHELF_DB: f64 = 2.0;

/// One stage of the chain, described independently of filter state so a
/// fresh set of filters can be instantiated per channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Biquad {
        filter_type: FilterType,
        frequency: f64,
        q: f64,
        gain_db: f64,
    },
    Gain(f32),
}

#[derive(Debug, Clone)]
pub struct FilterGraph {
    sample_rate: f64,
    compressor: Option<Compressor>,
    stages: Vec<Stage>,
}

impl FilterGraph {
    /// An empty graph that passes audio through unchanged.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            compressor: None,
            stages: Vec::new(),
        }
    }

    /// The enhancement chain for the given settings.
    pub fn enhancement(settings: &EnhanceSettings, sample_rate: f64) -> Self {
        let mut graph = Self::new(sample_rate)
            .with_compressor(Compressor::enhancement(sample_rate))
            .with_biquad(FilterType::LowShelf, LOW_SHELF_HZ, 1.0, LOW_SHELF_DB)
            .with_biquad(
                FilterType::Peaking,
                PRESENCE_HZ,
                PRESENCE_Q,
                PRESENCE_DB * settings.clarity as f64,
            )
            .with_biquad(FilterType::HighShelf, HIGH_SHELF_HZ, 1.0, HIGH_SHELF_DB);

        if let Some(freq) = settings.pitch_frequency() {
            graph = graph.with_biquad(FilterType::Allpass, freq, 1.0, 0.0);
        }

        graph.with_gain(settings.volume)
    }

    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn with_biquad(mut self, filter_type: FilterType, frequency: f64, q: f64, gain_db: f64) -> Self {
        self.stages.push(Stage::Biquad {
            filter_type,
            frequency,
            q,
            gain_db,
        });
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.stages.push(Stage::Gain(gain));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn has_compressor(&self) -> bool {
        self.compressor.is_some()
    }

    /// Render the whole buffer through the graph. Output has the input's
    /// length, channel count, and sample rate.
    pub fn render(&self, input: &AudioBuffer) -> Result<AudioBuffer> {
        debug!(
            "rendering {} frames x {} channels through {} stages",
            input.len(),
            input.channels(),
            self.stages.len() + usize::from(self.compressor.is_some())
        );

        let mut channels = input.channel_data().to_vec();

        if let Some(compressor) = &self.compressor {
            let mut compressor = compressor.clone();
            compressor.reset();
            compressor.process_block(&mut channels);
        }

        for channel in channels.iter_mut() {
            for stage in &self.stages {
                match *stage {
                    Stage::Biquad {
                        filter_type,
                        frequency,
                        q,
                        gain_db,
                    } => {
                        let mut filter = BiquadFilter::with_params(
                            filter_type,
                            frequency,
                            q,
                            gain_db,
                            self.sample_rate,
                        );
                        filter.process_block(channel);
                    }
                    Stage::Gain(gain) => channel.iter_mut().for_each(|s| *s *= gain),
                }
            }
        }

        AudioBuffer::new(input.sample_rate(), channels)
    }
}
