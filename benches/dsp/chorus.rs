//! Benchmarks for the two-tap chorus node.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sextet::graph::chorus::ChorusNode;
use sextet::graph::node::{GraphNode, RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_chorus(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/chorus");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();

        let mut chorus = ChorusNode::new(0.5, 0.5, 0.5, 20.0, ctx.sample_rate);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("two_tap", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                chorus.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
