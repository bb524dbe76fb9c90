/*
Parameter Smoothing
===================

Control values arrive once per block from the parameter bus. Applying them
instantly makes audible "zipper" steps (and clicks, for gains), so every
control a node reads goes through a linear ramp:

  target changes  →  step = (target - current) / ramp_samples
  each sample     →  current += step, until ramp_samples have elapsed

The ramp always lands exactly on the target, and a new target arriving mid-ramp
starts a fresh ramp from wherever the value currently is.
*/

#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32, ramp_ms: f32, sample_rate: f32) -> Self {
        let ramp_samples = (ramp_ms * 0.001 * sample_rate).round().max(1.0) as u32;
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f32;
    }

    /// Jump straight to `value` with no ramp.
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.remaining = 0;
        self.step = 0.0;
    }

    /// Finish a running ramp immediately.
    pub fn settle(&mut self) {
        self.current = self.target;
        self.remaining = 0;
        self.step = 0.0;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_linearly_onto_target() {
        // 10 ms at 1 kHz = 10 samples
        let mut value = SmoothedValue::new(0.0, 10.0, 1_000.0);
        value.set_target(1.0);

        let ramp: Vec<f32> = (0..10).map(|_| value.next()).collect();
        for pair in ramp.windows(2) {
            assert!((pair[1] - pair[0] - 0.1).abs() < 1e-5);
        }
        assert_eq!(ramp[9], 1.0);
        assert!(!value.is_smoothing());
        assert_eq!(value.next(), 1.0);
    }

    #[test]
    fn retarget_mid_ramp_starts_from_current() {
        let mut value = SmoothedValue::new(0.0, 10.0, 1_000.0);
        value.set_target(1.0);
        for _ in 0..5 {
            value.next();
        }
        let midway = value.current();
        value.set_target(0.0);
        let next = value.next();
        assert!(next < midway);
        assert!((midway - next) <= midway / 10.0 + 1e-6);
    }

    #[test]
    fn settle_lands_on_pending_target() {
        let mut value = SmoothedValue::new(0.0, 10.0, 1_000.0);
        value.set_target(0.4);
        value.next();
        value.settle();
        assert!(!value.is_smoothing());
        assert_eq!(value.current(), 0.4);
        assert_eq!(value.next(), 0.4);
    }

    #[test]
    fn reset_skips_ramp() {
        let mut value = SmoothedValue::new(0.0, 10.0, 1_000.0);
        value.reset(0.75);
        assert_eq!(value.next(), 0.75);
        assert!(!value.is_smoothing());
    }
}
