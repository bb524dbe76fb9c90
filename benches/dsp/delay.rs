//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sextet::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        // Generate a test signal
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // Interpolated read + write (fractional delay, chorus-like sweep)
        let mut delay = DelayLine::with_max_delay_ms(25.0, 48_000.0);
        group.bench_with_input(BenchmarkId::new("read_write", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in input.iter().enumerate() {
                    let delay_time = 960.0 + (i as f32 * 0.01).sin() * 240.0;
                    sum += delay.read_interpolated(black_box(delay_time));
                    delay.write(sample);
                }
                sum
            })
        });
    }

    group.finish();
}
