//! Benchmarks for the channel pipeline and the complete engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sextet::dsp::Waveform;
use sextet::graph::channel::ChannelStrip;
use sextet::graph::node::{GraphNode, RenderCtx};
use sextet::params::ParamSnapshot;
use sextet::{Engine, EngineConfig, ParamId, NUM_CHANNELS};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let ctx = RenderCtx::from_note(48_000.0, 45, 1.0); // A2

    for &size in BLOCK_SIZES {
        let config = EngineConfig::default().with_block_size(size);

        // === ONE CHANNEL ===
        // envelope → supersaw → ladder → reverb → chorus, all wet
        let mut strip = ChannelStrip::with_seed(0, &config, 1);
        let mut params = ParamSnapshot {
            chorus_mix: 0.5,
            ..ParamSnapshot::default()
        };
        params.channels[0].waveform = Waveform::SuperSaw;
        strip.update_params(&params);
        strip.note_on(&ctx);
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("channel_strip", size), &size, |b, _| {
            b.iter(|| {
                strip.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === FULL ENGINE ===
        // six channels, mixed waveforms, every effect wet, while notes
        // arrive and the cutoff moves
        let Ok((mut engine, mut handle)) = Engine::with_seed(config, 1) else {
            continue;
        };
        for channel in 0..NUM_CHANNELS {
            let _ = handle.set_waveform(channel, (channel % 4) as u8);
        }
        handle.set_param(ParamId::ChorusMix, 0.5);
        handle.note_on(45, 1.0);

        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];
        let mut cutoff = 200.0f32;
        group.bench_with_input(BenchmarkId::new("six_channels", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 8_000.0 { 200.0 } else { cutoff * 1.01 };
                handle.set_param(ParamId::Cutoff, cutoff);
                engine.process_block(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    group.finish();
}
