use std::f32::consts::{FRAC_PI_2, SQRT_2};

use crate::config::ChannelConfig;
use crate::dsp::smooth::SmoothedValue;
use crate::params::{ParamSnapshot, CHANNEL_LEVEL, CHANNEL_PAN};
use crate::NUM_CHANNELS;

/*
Stereo Mixing
=============

Every channel strip is mono. The mixer places each one in the stereo field
and sums them onto the output bus.

Equal-Power Pan
---------------

  left  = cos(pan · π/2)
  right = sin(pan · π/2)

  pan = 0.0 → hard left   (1.000, 0.000)
  pan = 0.5 → centre      (0.707, 0.707)
  pan = 1.0 → hard right  (0.000, 1.000)

left² + right² = 1 at every position, so a sound keeps its loudness as it
moves across the field. Linear pan (1 - pan, pan) would dip 3 dB in the
middle.

Headroom
--------

Six channels centred at unity level and unity envelope would reach
6 · 0.707 ≈ 4.2 on each side. Every channel is scaled by

  headroom = 1 / (NUM_CHANNELS · cos(π/4)) = √2 / NUM_CHANNELS

so the worst case sums to exactly full scale.

Pan and level follow the parameter bus through linear ramps. Gains are
recomputed per sample only while a ramp is running.
*/

pub const HEADROOM: f32 = SQRT_2 / NUM_CHANNELS as f32;

/// Equal-power gains `(left, right)` for `pan` in `[0, 1]`.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = pan.clamp(0.0, 1.0) * FRAC_PI_2;
    (angle.cos(), angle.sin())
}

struct ChannelGain {
    pan: SmoothedValue,
    level: SmoothedValue,
}

impl ChannelGain {
    #[inline]
    fn next(&mut self) -> (f32, f32) {
        let (l, r) = pan_gains(self.pan.next());
        let level = self.level.next() * HEADROOM;
        (l * level, r * level)
    }

    fn is_smoothing(&self) -> bool {
        self.pan.is_smoothing() || self.level.is_smoothing()
    }
}

pub struct StereoMixer {
    channels: [ChannelGain; NUM_CHANNELS],
}

impl StereoMixer {
    pub fn new(channels: &[ChannelConfig], smoothing_ms: f32, sample_rate: f32) -> Self {
        let channels = std::array::from_fn(|i| {
            let cfg = channels
                .get(i)
                .copied()
                .unwrap_or_else(|| ChannelConfig::with_ratio((i + 1) as f32));
            ChannelGain {
                pan: SmoothedValue::new(CHANNEL_PAN.clamp(cfg.pan), smoothing_ms, sample_rate),
                level: SmoothedValue::new(CHANNEL_LEVEL.clamp(cfg.level), smoothing_ms, sample_rate),
            }
        });
        Self { channels }
    }

    pub fn update_params(&mut self, params: &ParamSnapshot) {
        for (gain, channel) in self.channels.iter_mut().zip(params.channels.iter()) {
            gain.pan.set_target(channel.pan);
            gain.level.set_target(channel.level);
        }
    }

    /// Finish every pan and level ramp immediately.
    pub fn settle(&mut self) {
        for gain in &mut self.channels {
            gain.pan.settle();
            gain.level.settle();
        }
    }

    /// Current `(left, right)` gain of `channel`, headroom included.
    pub fn gains(&self, channel: usize) -> (f32, f32) {
        self.channels.get(channel).map_or((0.0, 0.0), |gain| {
            let (l, r) = pan_gains(gain.pan.current());
            let level = gain.level.current() * HEADROOM;
            (l * level, r * level)
        })
    }

    /// Pan `input` and add it onto `left`/`right`.
    pub fn mix_channel(&mut self, channel: usize, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        let steady = self.gains(channel);
        let Some(gain) = self.channels.get_mut(channel) else {
            return;
        };

        let frames = input.iter().zip(left.iter_mut().zip(right.iter_mut()));
        if gain.is_smoothing() {
            for (x, (l, r)) in frames {
                let (gl, gr) = gain.next();
                *l += x * gl;
                *r += x * gr;
            }
        } else {
            let (gl, gr) = steady;
            if gl == 0.0 && gr == 0.0 {
                return;
            }
            for (x, (l, r)) in frames {
                *l += x * gl;
                *r += x * gr;
            }
        }
    }
}
