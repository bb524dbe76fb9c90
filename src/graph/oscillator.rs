use crate::config::ChannelConfig;
use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::dsp::smooth::SmoothedValue;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::selector::Selector;
use crate::params::{ChannelParams, CHANNEL_RATIO};

/*
Oscillator Bank
===============

One channel's sound source: all four generators, the selector that decides
which of them is heard, and the channel's frequency ratio.

  pitch = note frequency × ratio          (ratio smoothed per sample)

  ┌────────────┐
  │ Sine       │──┐
  │ SuperSaw   │──┤   equal-power
  │ Blit       │──┼──► crossfade ──► × envelope ──► out
  │ RcOsc      │──┘
  └────────────┘

`render_block` is an amplify stage: the buffer comes in holding the envelope
levels and goes out holding the enveloped oscillator signal. Each generator's
output is scaled by the envelope before it reaches the filter.

Ratio 1 plays the note as written; 2 an octave up; 1.5 a fifth up. Non-integer
ratios give inharmonic, bell-like layers when several channels sound together.
*/

pub struct OscillatorBank {
    oscillators: OscillatorBlock,
    selector: Selector,
    ratio: SmoothedValue,
}

impl OscillatorBank {
    pub fn new(channel: &ChannelConfig, smoothing_ms: f32, crossfade_ms: f32, sample_rate: f32) -> Self {
        Self::with_oscillators(
            OscillatorBlock::new(),
            channel,
            smoothing_ms,
            crossfade_ms,
            sample_rate,
        )
    }

    /// Bank built around a given generator block (e.g. a seeded one).
    pub fn with_oscillators(
        oscillators: OscillatorBlock,
        channel: &ChannelConfig,
        smoothing_ms: f32,
        crossfade_ms: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            oscillators,
            selector: Selector::new(channel.waveform, crossfade_ms, sample_rate),
            ratio: SmoothedValue::new(
                CHANNEL_RATIO.clamp(channel.frequency_ratio),
                smoothing_ms,
                sample_rate,
            ),
        }
    }

    /// Pick up this channel's ratio and waveform from the block snapshot.
    pub fn set_channel(&mut self, params: &ChannelParams) {
        self.ratio.set_target(params.ratio);
        self.selector.select(params.waveform);
    }

    pub fn waveform(&self) -> Waveform {
        self.selector.active()
    }

    pub fn ratio(&self) -> f32 {
        self.ratio.current()
    }
}

impl GraphNode for OscillatorBank {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let Self {
            oscillators,
            selector,
            ratio,
        } = self;

        for sample in out.iter_mut() {
            let envelope = *sample;
            let frequency = ctx.frequency * ratio.next();
            *sample = selector.next(|waveform| {
                envelope * oscillators.next_sample(waveform, frequency, ctx.sample_rate)
            });
        }
    }

    fn settle(&mut self) {
        self.ratio.settle();
        self.selector.settle();
    }
}
