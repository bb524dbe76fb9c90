use std::f32::consts::{FRAC_PI_2, TAU};

use crate::dsp::delay::DelayLine;
use crate::dsp::smooth::SmoothedValue;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::params::ParamSnapshot;

/*
Chorus Effect
=============

Chorus thickens a sound by mixing the dry signal with slightly delayed,
pitch-modulated copies. The modulation creates subtle detuning that makes
one voice sound like several playing together.

How It Works
------------

One delay line, two read taps. Each tap's delay is swept by its own sine LFO
around a 20 ms centre:

  tap A: 20 ms + excursion · sin(2π · 0.8 Hz · t)
  tap B: 20 ms + excursion · sin(2π · 1.1 Hz · t + π/2)

  x ──┬──────────────────────────────────────────┐ dry
      │                                           │
      └──►(+)──► [ delay line ] ──► tap A ─┐      ▼
           ▲                    └─► tap B ─┴─►(avg)──► wet ──► mix ──► y
           └──────────── × feedback ◄──────────────┘

The averaged taps are fed back into the line, which adds a faint flanged
resonance at high feedback. Reads interpolate linearly between samples so
the sweeping delay does not crackle.

Parameters
----------

Depth (0.0 - 1.0):
  Maps to an excursion of 0-5 ms around the centre delay.

Feedback (0.0 - 0.95):
  Clamped to 0.95 so the loop always decays.

Mix (0.0 - 1.0):
  Linear dry/wet blend.
*/

const BASE_DELAY_MS: f32 = 20.0;
const MAX_EXCURSION_MS: f32 = 5.0;
const LFO_RATES: [f32; 2] = [0.8, 1.1];
pub const MAX_FEEDBACK: f32 = 0.95;

pub struct ChorusNode {
    delay_line: DelayLine,
    lfo_phases: [f32; 2],
    depth: SmoothedValue,
    feedback: SmoothedValue,
    mix: SmoothedValue,
}

impl ChorusNode {
    pub fn new(depth: f32, feedback: f32, mix: f32, smoothing_ms: f32, sample_rate: f32) -> Self {
        let smoothed = |value: f32, max: f32| {
            SmoothedValue::new(value.clamp(0.0, max), smoothing_ms, sample_rate)
        };
        Self {
            delay_line: DelayLine::with_max_delay_ms(BASE_DELAY_MS + MAX_EXCURSION_MS, sample_rate),
            // Quadrature: tap B starts a quarter cycle ahead.
            lfo_phases: [0.0, FRAC_PI_2],
            depth: smoothed(depth, 1.0),
            feedback: smoothed(feedback, MAX_FEEDBACK),
            mix: smoothed(mix, 1.0),
        }
    }

    pub fn feedback(&self) -> f32 {
        self.feedback.current()
    }
}

impl GraphNode for ChorusNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let sample_rate = ctx.sample_rate;
        let ms_to_samples = sample_rate * 0.001;
        let phase_incs = LFO_RATES.map(|rate| TAU * rate / sample_rate);

        for sample in out.iter_mut() {
            let excursion = self.depth.next() * MAX_EXCURSION_MS;
            let feedback = self.feedback.next();
            let mix = self.mix.next();

            let mut wet = 0.0;
            for phase in &self.lfo_phases {
                let delay_ms = BASE_DELAY_MS + excursion * phase.sin();
                wet += self.delay_line.read_interpolated(delay_ms * ms_to_samples);
            }
            wet *= 0.5;

            let dry = *sample;
            self.delay_line.write(dry + wet * feedback);
            *sample = dry * (1.0 - mix) + wet * mix;

            for (phase, inc) in self.lfo_phases.iter_mut().zip(phase_incs) {
                *phase += inc;
                if *phase >= TAU {
                    *phase -= TAU;
                }
            }
        }
    }

    fn update_params(&mut self, params: &ParamSnapshot) {
        self.depth.set_target(params.chorus_depth.clamp(0.0, 1.0));
        self.feedback
            .set_target(params.chorus_feedback.clamp(0.0, MAX_FEEDBACK));
        self.mix.set_target(params.chorus_mix.clamp(0.0, 1.0));
    }

    fn settle(&mut self) {
        self.depth.settle();
        self.feedback.settle();
        self.mix.settle();
    }

    fn reset(&mut self) {
        self.delay_line.reset();
    }
}
