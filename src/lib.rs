pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Per-channel nodes and the fixed channel pipeline
pub mod io;
pub mod params; // Wait-free control → audio parameter bus
pub mod synth; // Note queue and monophonic voice control

pub use config::{ChannelConfig, EngineConfig, EnvelopeConfig};
pub use engine::{DeadlineMonitor, Engine, EngineHandle};
pub use error::ConfigError;
pub use params::{ParamId, ParameterBus};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const NUM_CHANNELS: usize = 6;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
