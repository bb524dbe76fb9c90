//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sextet::dsp::oscillator::{OscillatorBlock, Waveform};
use sextet::graph::node::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine - one sin() per sample
        // SuperSaw - seven PolyBLEP saws
        // Blit - two sin() per sample, harmonic count cached per pitch
        // RcOsc - PRNG, two-pole resonator, sqrt and tanh
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::with_seed(1);
            let name = format!("{waveform:?}").to_lowercase();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(waveform, black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
