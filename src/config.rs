//! Engine configuration.
//!
//! Everything that is fixed for the lifetime of an [`Engine`](crate::Engine):
//! sample rate, block size, queue capacity, and the starting state of the
//! envelope and the six channels. Values that stay live-adjustable afterwards
//! (cutoff, mixes, per-channel ratio/pan/level/waveform, ADSR times) are seeded
//! from here into the [`ParameterBus`](crate::ParameterBus).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::envelope::EnvelopeCurve, dsp::oscillator::Waveform, error::ConfigError};
use crate::{MAX_BLOCK_SIZE, NUM_CHANNELS};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub curve: EnvelopeCurve,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.7,
            release: 0.01,
            curve: EnvelopeCurve::Linear,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    /// Multiplier applied to the played note's pitch.
    pub frequency_ratio: f32,
    pub waveform: Waveform,
    /// 0.0 = hard left, 0.5 = centre, 1.0 = hard right.
    pub pan: f32,
    pub level: f32,
}

impl ChannelConfig {
    pub fn with_ratio(frequency_ratio: f32) -> Self {
        Self {
            frequency_ratio,
            waveform: Waveform::Sine,
            pan: 0.5,
            level: 1.0,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::with_ratio(1.0)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub block_size: usize,
    pub note_queue_capacity: usize,
    /// Ramp length for every smoothed parameter.
    pub smoothing_ms: f32,
    /// Selector crossfade length when switching waveforms.
    pub crossfade_ms: f32,
    pub envelope: EnvelopeConfig,
    pub channels: Vec<ChannelConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 256,
            note_queue_capacity: 256,
            smoothing_ms: 20.0,
            crossfade_ms: 20.0,
            envelope: EnvelopeConfig::default(),
            channels: (1..=NUM_CHANNELS)
                .map(|ratio| ChannelConfig::with_ratio(ratio as f32))
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeConfig) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_channel(mut self, index: usize, channel: ChannelConfig) -> Self {
        if let Some(slot) = self.channels.get_mut(index) {
            *slot = channel;
        }
        self
    }

    /// Block period in seconds (the real-time deadline per block).
    pub fn block_period(&self) -> f32 {
        self.block_size as f32 / self.sample_rate
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        if self.note_queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity(self.note_queue_capacity));
        }
        if self.channels.len() != NUM_CHANNELS {
            return Err(ConfigError::InvalidChannelCount(self.channels.len()));
        }
        for (channel, cfg) in self.channels.iter().enumerate() {
            if !(cfg.frequency_ratio.is_finite() && cfg.frequency_ratio > 0.0) {
                return Err(ConfigError::InvalidFrequencyRatio {
                    channel,
                    ratio: cfg.frequency_ratio,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.channels.len(), NUM_CHANNELS);
        assert_eq!(config.channels[5].frequency_ratio, 6.0);
    }

    #[test]
    fn rejects_bad_values() {
        let config = EngineConfig::default().with_sample_rate(0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidSampleRate(0.0)));

        let config = EngineConfig::default().with_block_size(MAX_BLOCK_SIZE + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBlockSize(_))
        ));

        let config = EngineConfig::default().with_channel(3, ChannelConfig::with_ratio(0.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrequencyRatio { channel: 3, .. })
        ));

        let mut config = EngineConfig::default();
        config.channels.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidChannelCount(5))
        ));
    }

    #[test]
    fn block_period_matches_block_size() {
        let config = EngineConfig::default().with_block_size(480);
        assert!((config.block_period() - 0.01).abs() < 1e-6);
    }
}
