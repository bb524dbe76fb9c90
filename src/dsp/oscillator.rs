use std::f32::consts::{PI, TAU};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::node::RenderCtx;

/*
Oscillator Waveforms
====================

Four generators, all driven by a frequency in Hz and advanced one sample at a
time. A channel keeps one of each and a selector decides which one is heard.

  Sine       Phase accumulator into sin(). A single partial, nothing to alias.

  SuperSaw   Seven sawtooths at fixed detune offsets, summed with fixed
             weights (centre voice loudest) and divided by the weight sum.
             Each saw is PolyBLEP-corrected at its wrap, so the step is
             smeared over two samples instead of aliasing.

  Blit       Band-limited impulse train. A closed-form sum of N equal cosine
             harmonics (the Dirichlet kernel), with N picked so the highest
             harmonic is under Nyquist:

                 y(φ) = sin(M π φ) / (M sin(π φ)),   M = 2N + 1

             Peaks at 1.0 once per period. The DC term 1/M is removed.

  RcOsc      White noise through a narrow two-pole resonator tuned to the
             pitch. The tone wanders in amplitude and phase like an unstable
             analog oscillator and is never exactly periodic. A slow
             power follower normalizes the level and tanh() bounds it.


PolyBLEP
--------

`poly_blep(t, dt)` is the polynomial band-limited step residual: subtracting
it from a naive saw around the discontinuity removes most of the aliasing at a
cost of two multiplies per sample.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    SuperSaw,
    Blit,
    RcOsc,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::SuperSaw,
        Waveform::Blit,
        Waveform::RcOsc,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Waveform {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Waveform::ALL
            .get(index as usize)
            .copied()
            .ok_or(ConfigError::WaveformOutOfRange(index))
    }
}

#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[inline]
fn advance_phase(phase: &mut f32, inc: f32) {
    *phase += inc;
    if *phase >= 1.0 {
        *phase -= phase.floor();
    }
}

#[derive(Debug, Clone, Default)]
pub struct SineOsc {
    phase: f32,
}

impl SineOsc {
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = (TAU * self.phase).sin();
        advance_phase(&mut self.phase, frequency / sample_rate);
        out
    }
}

const SAW_VOICES: usize = 7;
const SAW_DETUNE_CENTS: [f32; SAW_VOICES] = [-24.0, -14.0, -5.0, 0.0, 5.0, 14.0, 24.0];
const SAW_WEIGHTS: [f32; SAW_VOICES] = [0.6, 0.6, 0.6, 1.0, 0.6, 0.6, 0.6];
const SAW_START_PHASES: [f32; SAW_VOICES] = [0.0, 0.31, 0.62, 0.13, 0.44, 0.75, 0.91];

#[derive(Debug, Clone)]
pub struct SuperSawOsc {
    phases: [f32; SAW_VOICES],
    ratios: [f32; SAW_VOICES],
    norm: f32,
}

impl SuperSawOsc {
    pub fn new() -> Self {
        let ratios = SAW_DETUNE_CENTS.map(|cents| 2.0_f32.powf(cents / 1200.0));
        let norm = 1.0 / SAW_WEIGHTS.iter().sum::<f32>();
        Self {
            phases: SAW_START_PHASES,
            ratios,
            norm,
        }
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let mut sum = 0.0;
        for voice in 0..SAW_VOICES {
            // Clamp keeps the BLEP window inside one period at extreme pitches.
            let dt = (frequency * self.ratios[voice] / sample_rate).clamp(0.0, 0.5);
            let phase = self.phases[voice];
            let saw = 2.0 * phase - 1.0 - poly_blep(phase, dt);
            sum += saw * SAW_WEIGHTS[voice];
            advance_phase(&mut self.phases[voice], dt);
        }
        sum * self.norm
    }
}

impl Default for SuperSawOsc {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper bound on BLIT harmonics; keeps low notes from becoming needle-thin.
pub const MAX_BLIT_HARMONICS: u32 = 64;

#[derive(Debug, Clone)]
pub struct BlitOsc {
    phase: f32,
    frequency: f32,
    sample_rate: f32,
    m: f32,
}

impl BlitOsc {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            frequency: 0.0,
            sample_rate: 0.0,
            m: 3.0,
        }
    }

    /// Number of harmonics that fit strictly below Nyquist.
    pub fn harmonics_for(frequency: f32, sample_rate: f32) -> u32 {
        if frequency <= 0.0 {
            return 1;
        }
        let nyquist = 0.5 * sample_rate;
        let below = ((nyquist / frequency).ceil() as u32).saturating_sub(1);
        below.clamp(1, MAX_BLIT_HARMONICS)
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        if frequency != self.frequency || sample_rate != self.sample_rate {
            self.frequency = frequency;
            self.sample_rate = sample_rate;
            self.m = (2 * Self::harmonics_for(frequency, sample_rate) + 1) as f32;
        }

        let denom = self.m * (PI * self.phase).sin();
        let pulse = if denom.abs() < 1e-6 {
            1.0
        } else {
            (PI * self.m * self.phase).sin() / denom
        };

        advance_phase(&mut self.phase, frequency / sample_rate);
        pulse - 1.0 / self.m
    }
}

impl Default for BlitOsc {
    fn default() -> Self {
        Self::new()
    }
}

/// Resonator bandwidth as a fraction of the pitch (constant Q of 40).
const RC_BANDWIDTH: f32 = 1.0 / 40.0;
/// Output level the power follower settles to before saturation.
const RC_TARGET_RMS: f32 = 0.5;
/// Power follower time constant in seconds.
const RC_FOLLOWER_TIME: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct RcOsc {
    rng: SmallRng,
    y1: f32,
    y2: f32,
    power: f32,
    frequency: f32,
    sample_rate: f32,
    b1: f32,
    b2: f32,
    gain: f32,
    follow: f32,
}

impl RcOsc {
    /// Seeded from OS entropy: every run sounds slightly different.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic noise source, for tests and offline comparisons.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            y1: 0.0,
            y2: 0.0,
            power: RC_TARGET_RMS * RC_TARGET_RMS,
            frequency: 0.0,
            sample_rate: 0.0,
            b1: 0.0,
            b2: 0.0,
            gain: 0.0,
            follow: 0.0,
        }
    }

    fn retune(&mut self, frequency: f32, sample_rate: f32) {
        self.frequency = frequency;
        self.sample_rate = sample_rate;

        let nyquist = 0.5 * sample_rate;
        let centre = frequency.clamp(1.0, nyquist * 0.95);
        let bandwidth = (centre * RC_BANDWIDTH).max(1.0);
        let r = (1.0 - PI * bandwidth / sample_rate).clamp(0.0, 0.9999);
        let w = TAU * centre / sample_rate;

        self.b1 = 2.0 * r * w.cos();
        self.b2 = -r * r;
        self.gain = 1.0 - r;
        self.follow = 1.0 - (-1.0 / (RC_FOLLOWER_TIME * sample_rate)).exp();
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        if frequency != self.frequency || sample_rate != self.sample_rate {
            self.retune(frequency, sample_rate);
        }

        let noise: f32 = self.rng.random_range(-1.0..1.0);
        let y = self.gain * noise + self.b1 * self.y1 + self.b2 * self.y2;
        self.y2 = self.y1;
        self.y1 = y;

        self.power += (y * y - self.power) * self.follow;
        let normalized = y * RC_TARGET_RMS / (self.power.sqrt() + 1e-6);
        normalized.tanh()
    }
}

impl Default for RcOsc {
    fn default() -> Self {
        Self::new()
    }
}

/// One generator of each waveform, dispatched by [`Waveform`].
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    sine: SineOsc,
    supersaw: SuperSawOsc,
    blit: BlitOsc,
    rc: RcOsc,
}

impl OscillatorBlock {
    pub fn new() -> Self {
        Self::from_rc(RcOsc::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rc(RcOsc::with_seed(seed))
    }

    fn from_rc(rc: RcOsc) -> Self {
        Self {
            sine: SineOsc::default(),
            supersaw: SuperSawOsc::new(),
            blit: BlitOsc::new(),
            rc,
        }
    }

    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform, frequency: f32, sample_rate: f32) -> f32 {
        match waveform {
            Waveform::Sine => self.sine.next_sample(frequency, sample_rate),
            Waveform::SuperSaw => self.supersaw.next_sample(frequency, sample_rate),
            Waveform::Blit => self.blit.next_sample(frequency, sample_rate),
            Waveform::RcOsc => self.rc.next_sample(frequency, sample_rate),
        }
    }

    /// Fill `out` with one waveform at `ctx.frequency`.
    pub fn render(&mut self, waveform: Waveform, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(waveform, ctx.frequency, ctx.sample_rate);
        }
    }
}

impl Default for OscillatorBlock {
    fn default() -> Self {
        Self::new()
    }
}
