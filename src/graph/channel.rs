use crate::config::EngineConfig;
use crate::dsp::envelope::EnvelopeStage;
use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::graph::{
    chorus::ChorusNode,
    envelope::EnvNode,
    filter::FilterNode,
    node::{GraphNode, RenderCtx},
    oscillator::OscillatorBank,
    reverb::ReverbNode,
};
use crate::params::{ParamSnapshot, ParameterBus};

/*
Channel Strip
=============

One timbral channel. The pipeline is fixed and runs in place on a single
buffer:

  [EnvNode] ──► [OscillatorBank] ──► [FilterNode] ──► [ReverbNode] ──► [ChorusNode] ──► out
   levels        × envelope           ladder LPF       Freeverb          2-tap chorus

The envelope fills the buffer with levels, the oscillator bank multiplies its
selected waveform into them, and each effect then transforms the result.
Effects keep running after the envelope goes idle so reverb and chorus tails
ring out.
*/

pub struct ChannelStrip {
    index: usize,
    envelope: EnvNode,
    oscillators: OscillatorBank,
    filter: FilterNode,
    reverb: ReverbNode,
    chorus: ChorusNode,
}

impl ChannelStrip {
    pub fn new(index: usize, config: &EngineConfig) -> Self {
        Self::with_oscillators(index, config, OscillatorBlock::new())
    }

    /// Strip whose noise source is seeded, for reproducible renders.
    pub fn with_seed(index: usize, config: &EngineConfig, seed: u64) -> Self {
        Self::with_oscillators(index, config, OscillatorBlock::with_seed(seed))
    }

    fn with_oscillators(index: usize, config: &EngineConfig, block: OscillatorBlock) -> Self {
        let sr = config.sample_rate;
        let ms = config.smoothing_ms;
        let channel = config.channels.get(index).copied().unwrap_or_default();
        // Same starting values the engine's bus is seeded with.
        let params = ParameterBus::from_config(config).snapshot();

        Self {
            index,
            envelope: EnvNode::from_config(&config.envelope),
            oscillators: OscillatorBank::with_oscillators(block, &channel, ms, config.crossfade_ms, sr),
            filter: FilterNode::new(params.cutoff, params.resonance, ms, sr),
            reverb: ReverbNode::new(params.reverb_size, params.reverb_damp, params.reverb_mix, ms, sr),
            chorus: ChorusNode::new(
                params.chorus_depth,
                params.chorus_feedback,
                params.chorus_mix,
                ms,
                sr,
            ),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn waveform(&self) -> Waveform {
        self.oscillators.waveform()
    }
}

impl GraphNode for ChannelStrip {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.envelope.render_block(out, ctx);
        self.oscillators.render_block(out, ctx);
        self.filter.render_block(out, ctx);
        self.reverb.render_block(out, ctx);
        self.chorus.render_block(out, ctx);
    }

    fn update_params(&mut self, params: &ParamSnapshot) {
        self.envelope.update_params(params);
        if let Some(channel) = params.channels.get(self.index) {
            self.oscillators.set_channel(channel);
        }
        self.filter.update_params(params);
        self.reverb.update_params(params);
        self.chorus.update_params(params);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.envelope.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.envelope.note_off(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.envelope.get_envelope_level()
    }

    fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    fn settle(&mut self) {
        self.oscillators.settle();
        self.filter.settle();
        self.reverb.settle();
        self.chorus.settle();
    }

    fn reset(&mut self) {
        self.envelope.reset();
        self.filter.reset();
        self.reverb.reset();
        self.chorus.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn dry_params() -> ParamSnapshot {
        ParamSnapshot {
            reverb_mix: 0.0,
            chorus_mix: 0.0,
            ..ParamSnapshot::default()
        }
    }

    #[test]
    fn test_silent_until_note_on() {
        let config = EngineConfig::default();
        let mut strip = ChannelStrip::with_seed(0, &config, 1);
        let ctx = RenderCtx::from_note(SAMPLE_RATE, 60, 1.0);

        let mut buffer = [1.0f32; 256];
        strip.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|&x| x == 0.0));
        assert!(!strip.is_active());
    }

    #[test]
    fn test_note_runs_through_pipeline() {
        let config = EngineConfig::default();
        let mut strip = ChannelStrip::with_seed(0, &config, 1);
        strip.update_params(&dry_params());
        let ctx = RenderCtx::from_note(SAMPLE_RATE, 57, 1.0);

        strip.note_on(&ctx);
        assert_eq!(strip.stage(), EnvelopeStage::Attack);

        let mut peak = 0.0f32;
        for _ in 0..40 {
            let mut buffer = [0.0f32; 256];
            strip.render_block(&mut buffer, &ctx);
            assert!(buffer.iter().all(|x| x.is_finite()));
            peak = buffer.iter().fold(peak, |a, &x| a.max(x.abs()));
        }
        assert!(peak > 0.3, "peak {peak}");
        assert_eq!(strip.stage(), EnvelopeStage::Sustain);

        strip.note_off(&ctx);
        for _ in 0..20 {
            let mut buffer = [0.0f32; 256];
            strip.render_block(&mut buffer, &ctx);
        }
        assert!(!strip.is_active());
    }

    #[test]
    fn test_reads_its_own_channel_params() {
        let config = EngineConfig::default();
        let mut strip = ChannelStrip::with_seed(3, &config, 1);
        let mut params = ParamSnapshot::default();
        params.channels[3].waveform = Waveform::Blit;
        params.channels[2].waveform = Waveform::RcOsc;
        strip.update_params(&params);
        assert_eq!(strip.index(), 3);
        assert_eq!(strip.waveform(), Waveform::Blit);
    }
}
