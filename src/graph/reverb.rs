use crate::dsp::reverb::Freeverb;
use crate::dsp::smooth::SmoothedValue;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::params::ParamSnapshot;

/*
Reverb Node
===========

Places the channel in a room. The signal is split: the dry part passes
untouched and the wet part runs through a Freeverb network (eight damped
combs, four allpass diffusers).

Parameters
----------

Room Size (0.0 - 1.0):
  Comb feedback, so the length of the tail.
  0.0 = small room, 1.0 = large hall (still decays)

Damping (0.0 - 1.0):
  High-frequency absorption inside the combs.
  0.0 = bright, metallic    1.0 = dark, muffled

Mix (0.0 - 1.0):
  Linear dry/wet blend. 0.0 = all dry, 1.0 = all wet.

The tail is never reset on note-on: it rings out across notes.
*/

pub struct ReverbNode {
    reverb: Freeverb,
    room_size: SmoothedValue,
    damping: SmoothedValue,
    mix: SmoothedValue,
}

impl ReverbNode {
    pub fn new(
        room_size: f32,
        damping: f32,
        mix: f32,
        smoothing_ms: f32,
        sample_rate: f32,
    ) -> Self {
        let room_size = room_size.clamp(0.0, 1.0);
        let damping = damping.clamp(0.0, 1.0);

        let mut reverb = Freeverb::new(sample_rate);
        reverb.set_room_size(room_size);
        reverb.set_damping(damping);

        Self {
            reverb,
            room_size: SmoothedValue::new(room_size, smoothing_ms, sample_rate),
            damping: SmoothedValue::new(damping, smoothing_ms, sample_rate),
            mix: SmoothedValue::new(mix.clamp(0.0, 1.0), smoothing_ms, sample_rate),
        }
    }

    pub fn mix(&self) -> f32 {
        self.mix.current()
    }
}

impl GraphNode for ReverbNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        let retune = self.room_size.is_smoothing() || self.damping.is_smoothing();

        for sample in out.iter_mut() {
            if retune {
                self.reverb.set_room_size(self.room_size.next());
                self.reverb.set_damping(self.damping.next());
            }
            let mix = self.mix.next();
            let dry = *sample;
            let wet = self.reverb.process(dry);
            *sample = dry * (1.0 - mix) + wet * mix;
        }
    }

    fn update_params(&mut self, params: &ParamSnapshot) {
        self.room_size.set_target(params.reverb_size);
        self.damping.set_target(params.reverb_damp);
        self.mix.set_target(params.reverb_mix);
    }

    fn settle(&mut self) {
        self.room_size.settle();
        self.damping.settle();
        self.mix.settle();
        self.reverb.set_room_size(self.room_size.current());
        self.reverb.set_damping(self.damping.current());
    }

    fn reset(&mut self) {
        self.reverb.reset();
    }
}
