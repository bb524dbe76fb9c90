//! Freeverb-style room reverb.
//!
//! ```text
//! Input × 0.015 ──┬──→ [Comb 1] ──┐
//!                 ├──→ [Comb 2] ──┤
//!                 │      ...      ├──→ (+) ──→ [AP 1] → [AP 2] → [AP 3] → [AP 4] ──→ Wet
//!                 └──→ [Comb 8] ──┘
//! ```
//!
//! Each comb is a feedback delay with a one-pole low-pass in the loop:
//!
//! ```text
//! y[n]      = buf[n - D]
//! lp[n]     = y[n]·(1 - d) + lp[n-1]·d
//! buf[n]    = x[n] + lp[n]·feedback
//! ```
//!
//! The low-pass makes high frequencies decay faster than low ones (damping).
//! The allpasses (fixed gain 0.5) smear the comb echoes into a dense tail
//! without coloring the spectrum.
//!
//! Delay lengths are the classic 44.1 kHz tunings, scaled to the running
//! sample rate so the room sounds the same at any rate.
//!
//! - **Room size** maps to comb feedback `0.7 + 0.28·size`.
//! - **Damping** maps to the loop low-pass coefficient `0.4·damp`.

const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];
const TUNING_RATE: f32 = 44_100.0;

const FIXED_GAIN: f32 = 0.015;
const WET_SCALE: f32 = 3.0;
const ALLPASS_FEEDBACK: f32 = 0.5;

const ROOM_OFFSET: f32 = 0.7;
const ROOM_SCALE: f32 = 0.28;
const DAMP_SCALE: f32 = 0.4;

fn scaled_length(tuning: usize, sample_rate: f32) -> usize {
    ((tuning as f32 * sample_rate / TUNING_RATE).round() as usize).max(1)
}

/// Feedback comb with a damping low-pass in the loop. Buffer is allocated
/// once at construction.
pub struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
            feedback: ROOM_OFFSET + ROOM_SCALE * 0.5,
            damp: DAMP_SCALE * 0.5,
            filter_state: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.index] = input + self.filter_state * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.index = 0;
    }
}

/// Schroeder allpass diffuser with fixed feedback.
pub struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            index: 0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.index];
        let output = delayed - input;
        self.buffer[self.index] = input + delayed * ALLPASS_FEEDBACK;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

/// Eight parallel combs into four series allpasses. Returns the wet signal
/// only; dry/wet blending happens in the graph node.
pub struct Freeverb {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
    build_up: usize,
}

impl Freeverb {
    pub fn new(sample_rate: f32) -> Self {
        let combs: Vec<CombFilter> = COMB_TUNINGS
            .iter()
            .map(|&t| CombFilter::new(scaled_length(t, sample_rate)))
            .collect();
        let allpasses: Vec<AllpassFilter> = ALLPASS_TUNINGS
            .iter()
            .map(|&t| AllpassFilter::new(scaled_length(t, sample_rate)))
            .collect();

        let longest_comb = combs.iter().map(|c| c.buffer.len()).max().unwrap_or(1);
        let diffusion: usize = allpasses.iter().map(|a| a.buffer.len()).sum();

        Self {
            combs,
            allpasses,
            build_up: longest_comb + diffusion,
        }
    }

    /// Samples before every comb and allpass has contributed to the tail.
    pub fn build_up_samples(&self) -> usize {
        self.build_up
    }

    pub fn set_room_size(&mut self, size: f32) {
        let feedback = ROOM_OFFSET + size.clamp(0.0, 1.0) * ROOM_SCALE;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    pub fn set_damping(&mut self, damp: f32) {
        let coeff = damp.clamp(0.0, 1.0) * DAMP_SCALE;
        for comb in &mut self.combs {
            comb.set_damp(coeff);
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let scaled = input * FIXED_GAIN;
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(scaled);
        }
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output * WET_SCALE
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}
