use crate::{
    dsp::{filter::LadderFilter, smooth::SmoothedValue},
    graph::node::{GraphNode, RenderCtx},
    params::ParamSnapshot,
};

/*
Resonant Low-Pass
=================

The channel's tone control: a 24 dB/octave ladder low-pass after the
oscillators.

Cutoff (Hz): where the filter starts to roll off.
  - 200 Hz:    Muffled, like through a wall
  - 1000 Hz:   Warm, round
  - 5000 Hz:   Present, clear
  - above sample_rate/4: clamped, the filter is effectively open

Resonance (0.0 - 1.0): emphasis at the cutoff.
  - 0.0:  No emphasis
  - 0.5:  Slight peak
  - 1.0:  Strong ringing peak, stops short of self-oscillation

Both follow the parameter bus through linear ramps. Coefficients are
recomputed every sample only while a ramp is running.
*/

pub struct FilterNode {
    filter: LadderFilter,
    cutoff: SmoothedValue,
    resonance: SmoothedValue,
}

impl FilterNode {
    pub fn new(cutoff_hz: f32, resonance: f32, smoothing_ms: f32, sample_rate: f32) -> Self {
        let mut filter = LadderFilter::new(cutoff_hz);
        filter.set_resonance(resonance);
        Self {
            cutoff: SmoothedValue::new(cutoff_hz, smoothing_ms, sample_rate),
            resonance: SmoothedValue::new(filter.resonance, smoothing_ms, sample_rate),
            filter,
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff.current()
    }

    pub fn resonance(&self) -> f32 {
        self.resonance.current()
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.cutoff.is_smoothing() && !self.resonance.is_smoothing() {
            self.filter.render(out, ctx);
            return;
        }

        for sample in out.iter_mut() {
            let cutoff = self.cutoff.next();
            let resonance = self.resonance.next();
            let coeffs = LadderFilter::coefficients(cutoff, resonance, ctx.sample_rate);
            *sample = self.filter.next_sample(*sample, &coeffs);
        }
        self.filter.set_cutoff(self.cutoff.current());
        self.filter.set_resonance(self.resonance.current());
    }

    fn update_params(&mut self, params: &ParamSnapshot) {
        self.cutoff.set_target(params.cutoff);
        self.resonance.set_target(params.resonance);
    }

    fn settle(&mut self) {
        self.cutoff.settle();
        self.resonance.settle();
        self.filter.set_cutoff(self.cutoff.current());
        self.filter.set_resonance(self.resonance.current());
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
