use std::fmt;

/// Configuration errors, raised at the control boundary before anything
/// reaches the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidSampleRate(f32),
    InvalidBlockSize(usize),
    InvalidQueueCapacity(usize),
    InvalidChannelCount(usize),
    InvalidFrequencyRatio { channel: usize, ratio: f32 },
    InvalidOutputChannels(usize),
    WaveformOutOfRange(u8),
    ChannelOutOfRange(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleRate(rate) => {
                write!(f, "sample rate must be positive and finite, got {rate}")
            }
            ConfigError::InvalidBlockSize(size) => write!(
                f,
                "block size must be between 1 and {}, got {size}",
                crate::MAX_BLOCK_SIZE
            ),
            ConfigError::InvalidQueueCapacity(cap) => {
                write!(f, "note queue capacity must be non-zero, got {cap}")
            }
            ConfigError::InvalidChannelCount(count) => write!(
                f,
                "expected {} channel configs, got {count}",
                crate::NUM_CHANNELS
            ),
            ConfigError::InvalidFrequencyRatio { channel, ratio } => {
                write!(f, "channel {channel}: frequency ratio must be positive, got {ratio}")
            }
            ConfigError::InvalidOutputChannels(count) => {
                write!(f, "output must have at least one channel, got {count}")
            }
            ConfigError::WaveformOutOfRange(index) => {
                write!(f, "waveform index {index} out of range (expected 0..=3)")
            }
            ConfigError::ChannelOutOfRange(channel) => write!(
                f,
                "channel {channel} out of range (expected 0..{})",
                crate::NUM_CHANNELS
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
