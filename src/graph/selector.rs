use std::f32::consts::FRAC_PI_2;

use crate::dsp::oscillator::Waveform;

/*
Waveform Selector
=================

Exactly one waveform is selected per channel. Switching never cuts: each
waveform owns a fade position p in [0, 1] and is heard at gain sin(p · π/2).
The selected waveform's position climbs toward 1, every other position falls
toward 0, both at 1 / crossfade_samples per sample.

For a single switch from A to B this is the equal-power law

    gain_B = sin(t · π/2),   gain_A = sin((1 - t) · π/2) = cos(t · π/2)

and a switch arriving mid-fade simply redirects the positions from wherever
they are, so every gain stays continuous. Waveforms at position 0 are not
evaluated at all.
*/

const WAVEFORMS: usize = Waveform::ALL.len();

#[derive(Debug, Clone)]
pub struct Selector {
    active: Waveform,
    positions: [f32; WAVEFORMS],
    step: f32,
}

impl Selector {
    pub fn new(initial: Waveform, crossfade_ms: f32, sample_rate: f32) -> Self {
        let samples = (crossfade_ms * 0.001 * sample_rate).round().max(1.0);
        let mut positions = [0.0; WAVEFORMS];
        positions[initial.index() as usize] = 1.0;
        Self {
            active: initial,
            positions,
            step: 1.0 / samples,
        }
    }

    pub fn active(&self) -> Waveform {
        self.active
    }

    pub fn select(&mut self, waveform: Waveform) {
        self.active = waveform;
    }

    /// Cut straight to the selected waveform, abandoning any fade.
    pub fn settle(&mut self) {
        self.positions = [0.0; WAVEFORMS];
        self.positions[self.active.index() as usize] = 1.0;
    }

    pub fn is_fading(&self) -> bool {
        Waveform::ALL.iter().any(|&w| {
            let pos = self.positions[w.index() as usize];
            if w == self.active {
                pos < 1.0
            } else {
                pos > 0.0
            }
        })
    }

    /// Current gain of `waveform`.
    pub fn gain(&self, waveform: Waveform) -> f32 {
        let pos = self.positions[waveform.index() as usize];
        if pos >= 1.0 {
            1.0
        } else {
            (pos * FRAC_PI_2).sin()
        }
    }

    /// Advance one sample and blend. `source` is called once for every
    /// waveform currently audible.
    #[inline]
    pub fn next(&mut self, mut source: impl FnMut(Waveform) -> f32) -> f32 {
        let mut out = 0.0;
        for waveform in Waveform::ALL {
            let pos = &mut self.positions[waveform.index() as usize];
            if waveform == self.active {
                if *pos < 1.0 {
                    *pos = (*pos + self.step).min(1.0);
                }
            } else if *pos > 0.0 {
                *pos = (*pos - self.step).max(0.0);
            }

            if *pos > 0.0 {
                out += self.gain(waveform) * source(waveform);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    /// Constant, distinct level per waveform, so any step in the output is
    /// the selector's own.
    fn constant(waveform: Waveform) -> f32 {
        match waveform {
            Waveform::Sine => 1.0,
            Waveform::SuperSaw => -1.0,
            Waveform::Blit => 0.5,
            Waveform::RcOsc => -0.5,
        }
    }

    #[test]
    fn test_every_ordered_switch_is_click_free() {
        let threshold = 0.01;
        for from in Waveform::ALL {
            for to in Waveform::ALL {
                if from == to {
                    continue;
                }
                let mut selector = Selector::new(from, 20.0, SAMPLE_RATE);
                let mut prev = selector.next(constant);
                assert_eq!(prev, constant(from));

                selector.select(to);
                for _ in 0..2_000 {
                    let sample = selector.next(constant);
                    assert!(
                        (sample - prev).abs() < threshold,
                        "{from:?} -> {to:?} jumped {prev} -> {sample}"
                    );
                    prev = sample;
                }
                assert!(!selector.is_fading());
                assert_eq!(prev, constant(to));
            }
        }
    }

    #[test]
    fn test_crossfade_is_equal_power() {
        let mut selector = Selector::new(Waveform::Sine, 20.0, SAMPLE_RATE);
        selector.select(Waveform::Blit);
        for _ in 0..960 {
            selector.next(|_| 0.0);
            let a = selector.gain(Waveform::Sine);
            let b = selector.gain(Waveform::Blit);
            assert!((a * a + b * b - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_switch_mid_fade_stays_continuous() {
        let mut selector = Selector::new(Waveform::Sine, 20.0, SAMPLE_RATE);
        let mut prev = selector.next(constant);

        selector.select(Waveform::SuperSaw);
        for _ in 0..300 {
            prev = selector.next(constant);
        }
        selector.select(Waveform::Blit);
        for _ in 0..300 {
            let sample = selector.next(constant);
            assert!((sample - prev).abs() < 0.01);
            prev = sample;
        }
        selector.select(Waveform::Sine);
        for _ in 0..2_000 {
            let sample = selector.next(constant);
            assert!((sample - prev).abs() < 0.01);
            prev = sample;
        }
        assert_eq!(selector.active(), Waveform::Sine);
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn test_settle_cuts_to_selected_waveform() {
        let mut selector = Selector::new(Waveform::Sine, 20.0, SAMPLE_RATE);
        selector.select(Waveform::Square);
        selector.next(|_| 1.0);
        assert!(selector.is_fading());

        selector.settle();
        assert!(!selector.is_fading());
        assert_eq!(selector.gain(Waveform::Square), 1.0);
        assert_eq!(selector.gain(Waveform::Sine), 0.0);
    }

    #[test]
    fn test_silent_waveforms_are_not_evaluated() {
        let mut selector = Selector::new(Waveform::Blit, 20.0, SAMPLE_RATE);
        let mut calls = 0;
        selector.next(|w| {
            calls += 1;
            assert_eq!(w, Waveform::Blit);
            0.0
        });
        assert_eq!(calls, 1);
    }
}
