/// Circular delay buffer. Allocated once at construction; reads and writes
/// never allocate.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(2)],
            write_pos: 0,
        }
    }

    /// Buffer sized for `max_delay_ms` at `sample_rate`.
    pub fn with_max_delay_ms(max_delay_ms: f32, sample_rate: f32) -> Self {
        Self::new((max_delay_ms * 0.001 * sample_rate).ceil() as usize + 2)
    }

    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read `delay_samples` back from the write head (1.0 = the most recent
    /// write), linearly interpolated. Clamped to `[1, len - 1]`.
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1.0, (len - 1) as f32);
        let whole = delay.floor() as usize;
        let frac = delay - whole as f32;

        let newer = (self.write_pos + len - whole) % len;
        let older = (newer + len - 1) % len;
        self.buffer[newer] * (1.0 - frac) + self.buffer[older] * frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
