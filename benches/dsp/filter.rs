//! Benchmarks for the ladder low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sextet::dsp::filter::LadderFilter;
use sextet::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed coefficients: one tan() per block
        let mut filter = LadderFilter::new(1000.0);
        filter.set_resonance(0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("ladder", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Sweeping cutoff: coefficients recomputed every sample
        let mut filter = LadderFilter::new(1000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("ladder_sweep", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let cutoff = 500.0 + i as f32 * 10.0;
                    let coeffs = LadderFilter::coefficients(cutoff, 0.9, ctx.sample_rate);
                    *sample = filter.next_sample(*sample, &coeffs);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
