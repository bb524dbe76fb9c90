use std::f32::consts::PI;

use crate::graph::node::RenderCtx;

/*
4-Pole Ladder Low-Pass
======================

Four one-pole low-pass stages in series with the output fed back, inverted,
to the input. Each stage rolls off 6 dB/octave, so the cascade gives
24 dB/octave. At the cutoff each stage shifts phase by 45°, the four together
by 180°, and the inverted feedback turns into positive feedback there: that
is the resonant peak.

                  ┌─────────────── × k ◄──────────────────┐
                  ▼                                        │
  x ── × comp ──(−)──► [LP1] ──► [LP2] ──► [LP3] ──► [LP4] ┴──► y

Zero-Delay Feedback
-------------------

A naive digital ladder puts a unit delay in the feedback path, which detunes
the resonance and goes unstable below k = 4. Here each stage is a
topology-preserving (trapezoidal) one-pole and the feedback loop is solved
instantaneously. With G = g / (1 + g) and each stage's state contribution
S_i = s_i / (1 + g), the output satisfies

    y = G⁴·u + G³·S₁ + G²·S₂ + G·S₃ + S₄,    u = comp·x − k·y

so

    y = (G⁴·comp·x + Σ) / (1 + k·G⁴)

This linear structure is stable for every k < 4 at every cutoff, which is why
resonance is capped at k = 3.96 rather than being detected after the fact.

Passband Compensation
---------------------

Feedback also subtracts from the passband: DC gain is 1 / (1 + k). The input is
scaled by (1 + k/2) to win some of that back. The same gain would multiply the
resonant peak, which near k = 4 is already 0.25 / (1 - k/4) at the cutoff, so
the compensation tapers to unity as k approaches the ceiling:

    comp = 1 + (k/2)·(1 - (k / 3.96)⁴)

At k = 3.96 the worst-case gain over all frequencies is then about 35.4
instead of over 100.
*/

/// Feedback ceiling, just under the self-oscillation point k = 4.
pub const MAX_FEEDBACK: f32 = 3.96;
pub const MIN_CUTOFF: f32 = 20.0;

/// Cutoff limited to `[20 Hz, sample_rate / 4]`.
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    cutoff_hz.clamp(MIN_CUTOFF, (sample_rate * 0.25).max(MIN_CUTOFF))
}

/// Input gain for feedback `k`. Roughly `1 + k/2` at moderate resonance,
/// back to unity at [`MAX_FEEDBACK`].
pub fn passband_compensation(k: f32) -> f32 {
    let k = k.clamp(0.0, MAX_FEEDBACK);
    1.0 + 0.5 * k * (1.0 - (k / MAX_FEEDBACK).powi(4))
}

#[derive(Debug, Clone, Copy)]
pub struct LadderCoefficients {
    big_g: f32,
    k: f32,
    comp: f32,
}

pub struct LadderFilter {
    stages: [f32; 4],

    pub cutoff_hz: f32,
    pub resonance: f32,
}

impl LadderFilter {
    pub fn new(cutoff_hz: f32) -> Self {
        Self {
            stages: [0.0; 4],
            cutoff_hz,
            resonance: 0.0,
        }
    }

    pub fn coefficients(cutoff_hz: f32, resonance: f32, sample_rate: f32) -> LadderCoefficients {
        let cutoff = clamp_cutoff(cutoff_hz, sample_rate);
        let g = (PI * cutoff / sample_rate).tan();
        let k = (4.0 * resonance.clamp(0.0, 1.0)).min(MAX_FEEDBACK);
        LadderCoefficients {
            big_g: g / (1.0 + g),
            k,
            comp: passband_compensation(k),
        }
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32, coeffs: &LadderCoefficients) -> f32 {
        let g = coeffs.big_g;
        let one_minus_g = 1.0 - g;
        let [s1, s2, s3, s4] = self.stages;

        let sigma = one_minus_g * (g * (g * (g * s1 + s2) + s3) + s4);
        let g4 = g * g * g * g;
        let x = input * coeffs.comp;
        let y = (g4 * x + sigma) / (1.0 + coeffs.k * g4);

        let mut u = x - coeffs.k * y;
        for state in self.stages.iter_mut() {
            let v = (u - *state) * g;
            let lp = v + *state;
            *state = lp + v;
            u = lp;
        }
        u
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let coeffs = Self::coefficients(self.cutoff_hz, self.resonance, ctx.sample_rate);
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, &coeffs);
        }
    }

    pub fn reset(&mut self) {
        self.stages = [0.0; 4];
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 1.0);
    }
}
