//! Wait-free parameter bus shared between the control thread and the audio
//! thread.
//!
//! Every value is an `f32` stored as raw bits in an `AtomicU32`. Writers clamp
//! to the declared range before storing; the audio thread takes one
//! [`ParamSnapshot`] per block and smooths toward it per sample. Neither side
//! ever waits on the other.
//!
//! ```text
//!  control thread                        audio thread
//!  ──────────────                        ────────────
//!  set(Cutoff, 25_000.0)
//!    └─ clamp → 20_000.0
//!       └─ store(bits, Relaxed) ──────►  snapshot() once per block
//!                                          └─ load(bits, Relaxed)
//!                                             └─ SmoothedValue::set_target
//! ```
//!
//! Relaxed ordering is enough: each parameter is independent and a value that
//! lands one block late is indistinguishable from one written a block later.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::config::{ChannelConfig, EngineConfig};
use crate::dsp::oscillator::Waveform;
use crate::error::ConfigError;
use crate::NUM_CHANNELS;

/// Name, range and default of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamSpec {
    const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    /// Clamp into range. NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Engine-wide controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Cutoff,
    Resonance,
    ReverbSize,
    ReverbDamping,
    ReverbMix,
    ChorusDepth,
    ChorusFeedback,
    ChorusMix,
    Attack,
    Decay,
    Sustain,
    Release,
}

const NUM_PARAMS: usize = 12;

const GLOBAL_SPECS: [ParamSpec; NUM_PARAMS] = [
    ParamSpec::new("cutoff", 20.0, 20_000.0, 1_000.0),
    ParamSpec::new("resonance", 0.0, 1.0, 0.0),
    ParamSpec::new("reverb_size", 0.0, 1.0, 0.5),
    ParamSpec::new("reverb_damping", 0.0, 1.0, 0.5),
    ParamSpec::new("reverb_mix", 0.0, 1.0, 0.25),
    ParamSpec::new("chorus_depth", 0.0, 1.0, 0.1),
    ParamSpec::new("chorus_feedback", 0.0, 0.95, 0.5),
    ParamSpec::new("chorus_mix", 0.0, 1.0, 0.0),
    ParamSpec::new("attack", 0.001, 10.0, 0.005),
    ParamSpec::new("decay", 0.001, 10.0, 0.1),
    ParamSpec::new("sustain", 0.0, 1.0, 0.7),
    ParamSpec::new("release", 0.001, 10.0, 0.01),
];

pub const CHANNEL_RATIO: ParamSpec = ParamSpec::new("channel_ratio", 0.5, 32.0, 1.0);
pub const CHANNEL_PAN: ParamSpec = ParamSpec::new("channel_pan", 0.0, 1.0, 0.5);
pub const CHANNEL_LEVEL: ParamSpec = ParamSpec::new("channel_level", 0.0, 1.0, 1.0);

impl ParamId {
    pub const ALL: [ParamId; NUM_PARAMS] = [
        ParamId::Cutoff,
        ParamId::Resonance,
        ParamId::ReverbSize,
        ParamId::ReverbDamping,
        ParamId::ReverbMix,
        ParamId::ChorusDepth,
        ParamId::ChorusFeedback,
        ParamId::ChorusMix,
        ParamId::Attack,
        ParamId::Decay,
        ParamId::Sustain,
        ParamId::Release,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ParamSpec {
        &GLOBAL_SPECS[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct ChannelSlot {
    ratio: AtomicF32,
    pan: AtomicF32,
    level: AtomicF32,
    waveform: AtomicU8,
}

impl ChannelSlot {
    fn from_config(cfg: &ChannelConfig) -> Self {
        Self {
            ratio: AtomicF32::new(CHANNEL_RATIO.clamp(cfg.frequency_ratio)),
            pan: AtomicF32::new(CHANNEL_PAN.clamp(cfg.pan)),
            level: AtomicF32::new(CHANNEL_LEVEL.clamp(cfg.level)),
            waveform: AtomicU8::new(cfg.waveform.index()),
        }
    }

    fn load(&self) -> ChannelParams {
        ChannelParams {
            ratio: self.ratio.load(),
            pan: self.pan.load(),
            level: self.level.load(),
            waveform: Waveform::try_from(self.waveform.load(Ordering::Relaxed))
                .unwrap_or_default(),
        }
    }
}

/// Per-channel values in one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelParams {
    pub ratio: f32,
    pub pan: f32,
    pub level: f32,
    pub waveform: Waveform,
}

/// Every control value at one instant. `Copy`, so taking one on the audio
/// thread costs a handful of atomic loads and no allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub cutoff: f32,
    pub resonance: f32,
    pub reverb_size: f32,
    pub reverb_damp: f32,
    pub reverb_mix: f32,
    pub chorus_depth: f32,
    pub chorus_feedback: f32,
    pub chorus_mix: f32,
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub channels: [ChannelParams; NUM_CHANNELS],
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        ParameterBus::new().snapshot()
    }
}

pub struct ParameterBus {
    globals: [AtomicF32; NUM_PARAMS],
    channels: [ChannelSlot; NUM_CHANNELS],
}

impl ParameterBus {
    /// Bus holding the declared defaults.
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    /// Bus seeded from `config`'s envelope and channel settings. Values are
    /// clamped into range the same way writes are.
    pub fn from_config(config: &EngineConfig) -> Self {
        let globals = std::array::from_fn(|i| AtomicF32::new(GLOBAL_SPECS[i].default));
        let channels = std::array::from_fn(|i| {
            let cfg = config
                .channels
                .get(i)
                .copied()
                .unwrap_or_else(|| ChannelConfig::with_ratio((i + 1) as f32));
            ChannelSlot::from_config(&cfg)
        });
        let bus = Self { globals, channels };

        let env = &config.envelope;
        bus.set(ParamId::Attack, env.attack);
        bus.set(ParamId::Decay, env.decay);
        bus.set(ParamId::Sustain, env.sustain);
        bus.set(ParamId::Release, env.release);
        bus
    }

    /// Clamp and store. Returns the value actually stored.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let spec = id.spec();
        let clamped = spec.clamp(value);
        if clamped != value {
            log::debug!("{} = {value} clamped to {clamped}", spec.name);
        }
        self.globals[id.index()].store(clamped);
        clamped
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.globals[id.index()].load()
    }

    fn channel(&self, channel: usize) -> Result<&ChannelSlot, ConfigError> {
        self.channels
            .get(channel)
            .ok_or(ConfigError::ChannelOutOfRange(channel))
    }

    fn store_channel(
        &self,
        channel: usize,
        spec: &ParamSpec,
        value: f32,
        field: fn(&ChannelSlot) -> &AtomicF32,
    ) -> Result<f32, ConfigError> {
        let slot = self.channel(channel)?;
        let clamped = spec.clamp(value);
        if clamped != value {
            log::debug!("channel {channel} {} = {value} clamped to {clamped}", spec.name);
        }
        field(slot).store(clamped);
        Ok(clamped)
    }

    pub fn set_channel_ratio(&self, channel: usize, ratio: f32) -> Result<f32, ConfigError> {
        self.store_channel(channel, &CHANNEL_RATIO, ratio, |slot| &slot.ratio)
    }

    pub fn set_channel_pan(&self, channel: usize, pan: f32) -> Result<f32, ConfigError> {
        self.store_channel(channel, &CHANNEL_PAN, pan, |slot| &slot.pan)
    }

    pub fn set_channel_level(&self, channel: usize, level: f32) -> Result<f32, ConfigError> {
        self.store_channel(channel, &CHANNEL_LEVEL, level, |slot| &slot.level)
    }

    /// Select a channel's waveform by index. Unknown indices are rejected and
    /// never stored.
    pub fn set_waveform(&self, channel: usize, index: u8) -> Result<Waveform, ConfigError> {
        let slot = self.channel(channel)?;
        let waveform = Waveform::try_from(index)?;
        slot.waveform.store(index, Ordering::Relaxed);
        Ok(waveform)
    }

    pub fn channel_params(&self, channel: usize) -> Result<ChannelParams, ConfigError> {
        self.channel(channel).map(ChannelSlot::load)
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            cutoff: self.get(ParamId::Cutoff),
            resonance: self.get(ParamId::Resonance),
            reverb_size: self.get(ParamId::ReverbSize),
            reverb_damp: self.get(ParamId::ReverbDamping),
            reverb_mix: self.get(ParamId::ReverbMix),
            chorus_depth: self.get(ParamId::ChorusDepth),
            chorus_feedback: self.get(ParamId::ChorusFeedback),
            chorus_mix: self.get(ParamId::ChorusMix),
            attack: self.get(ParamId::Attack),
            decay: self.get(ParamId::Decay),
            sustain: self.get(ParamId::Sustain),
            release: self.get(ParamId::Release),
            channels: std::array::from_fn(|i| self.channels[i].load()),
        }
    }
}

impl Default for ParameterBus {
    fn default() -> Self {
        Self::new()
    }
}
