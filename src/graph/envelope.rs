use crate::{
    config::EnvelopeConfig,
    dsp::envelope::{Envelope, EnvelopeStage},
    graph::node::{GraphNode, RenderCtx},
    params::ParamSnapshot,
};

/// Amplitude envelope of one channel. `render_block` overwrites the buffer
/// with per-sample levels in `[0, 1]`.
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    pub fn new() -> Self {
        Self {
            env: Envelope::new(),
        }
    }

    pub fn from_config(config: &EnvelopeConfig) -> Self {
        let env = Envelope::adsr(config.attack, config.decay, config.sustain, config.release)
            .with_curve(config.curve);
        Self { env }
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.env.stage()
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }
}

impl Default for EnvNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx);
    }

    fn update_params(&mut self, params: &ParamSnapshot) {
        self.env
            .set_times(params.attack, params.decay, params.sustain, params.release);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.env.note_off(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.env.level())
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }

    fn reset(&mut self) {
        self.env.reset();
    }
}
