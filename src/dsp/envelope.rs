#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{graph::node::RenderCtx, MIN_TIME};

/*
ADSR Envelope Implementation
============================

The amplitude envelope shared by every channel of the instrument. One gate
sequence (note on with velocity, note off) turns into a smooth level between
0.0 and 1.0 that scales the oscillators.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release.

  peak        The level Attack ramps to: the note's velocity (0.0 to 1.0).
              Sustain is held at sustain_level * peak, so velocity scales the
              whole shape.

  segment     One ramp between two levels over a whole number of samples.
              Attack, Decay and Release are all segments; Sustain is a hold.


The Shape
---------

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

Segments are either LINEAR or EXPONENTIAL. The exponential curve is a
normalized 1 - e^(-kx) so it still hits its end point exactly at the last
sample of the segment:

    shape(p) = (1 - e^(-k p)) / (1 - e^(-k)),   p = elapsed / total


Sample Accuracy
---------------

Every segment is counted in samples, not in level increments. When the
counter reaches the segment length the level is snapped to the segment's end
value and the next stage starts on the very next sample, regardless of where
the block boundary falls.


Retrigger and Release
---------------------

A gate-on while the envelope is still sounding restarts Attack from the
CURRENT level, never from zero, so repeated notes do not click. Attack keeps a
constant slope: ramping the full 0 → 1 range takes attack_time, so a retrigger
from 0.6 to 1.0 takes 40% of it.

A gate-off from Attack, Decay or Sustain snapshots the current level and ramps
it to zero over release_time.
*/

/// Exponential segment curvature.
const EXP_CURVATURE: f32 = 5.0;

/// Time constant for gliding to a new sustain level while held.
const SUSTAIN_GLIDE_TIME: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeCurve {
    #[default]
    Linear,
    Exponential,
}

impl EnvelopeCurve {
    #[inline]
    fn shape(self, progress: f32) -> f32 {
        match self {
            EnvelopeCurve::Linear => progress,
            EnvelopeCurve::Exponential => {
                (1.0 - (-EXP_CURVATURE * progress).exp()) / (1.0 - (-EXP_CURVATURE).exp())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: f32,
    end: f32,
    total: u32,
    elapsed: u32,
}

impl Segment {
    fn new(start: f32, end: f32, seconds: f32, sample_rate: f32) -> Self {
        Self {
            start,
            end,
            total: (seconds * sample_rate).round().max(1.0) as u32,
            elapsed: 0,
        }
    }

    /// Advance one sample. Returns the new level and whether the segment ended.
    #[inline]
    fn advance(&mut self, curve: EnvelopeCurve) -> (f32, bool) {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= self.total {
            return (self.end, true);
        }
        let progress = self.elapsed as f32 / self.total as f32;
        (self.start + (self.end - self.start) * curve.shape(progress), false)
    }
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,
    curve: EnvelopeCurve,

    stage: EnvelopeStage,
    level: f32,
    peak: f32,
    segment: Segment,
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.005, 0.1, 0.7, 0.01)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),
            curve: EnvelopeCurve::Linear,

            stage: EnvelopeStage::Idle,
            level: 0.0,
            peak: 1.0,
            segment: Segment {
                start: 0.0,
                end: 0.0,
                total: 1,
                elapsed: 0,
            },
        }
    }

    pub fn with_curve(mut self, curve: EnvelopeCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Update stage times. A segment already running keeps its length; the
    /// new times apply from the next stage entry.
    pub fn set_times(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(MIN_TIME);
        self.decay_time = decay.max(MIN_TIME);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(MIN_TIME);
    }

    /// Gate high: (re)start Attack from the current level toward `ctx.velocity`.
    pub fn note_on(&mut self, ctx: &RenderCtx) {
        self.peak = ctx.velocity.clamp(0.0, 1.0);
        let distance = (self.peak - self.level).abs();
        self.segment = Segment::new(
            self.level,
            self.peak,
            self.attack_time * distance,
            ctx.sample_rate,
        );
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: ramp from the current level to zero.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.segment = Segment::new(self.level, 0.0, self.release_time, ctx.sample_rate);
        self.stage = EnvelopeStage::Release;
    }

    /// Advance the envelope by one sample.
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                let (level, done) = self.segment.advance(self.curve);
                self.level = level;
                if done {
                    let sustain = self.sustain_level * self.peak;
                    self.segment = Segment::new(self.peak, sustain, self.decay_time, ctx.sample_rate);
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let (level, done) = self.segment.advance(self.curve);
                self.level = level;
                if done {
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                let target = self.sustain_level * self.peak;
                let diff = target - self.level;
                if diff.abs() < 1e-6 {
                    self.level = target;
                } else {
                    let coeff = 1.0 - (-1.0 / (SUSTAIN_GLIDE_TIME * ctx.sample_rate)).exp();
                    self.level += diff * coeff;
                }
            }

            EnvelopeStage::Release => {
                let (level, done) = self.segment.advance(self.curve);
                self.level = level.max(0.0);
                if done {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
