//! Real-world scenario benchmarks.
//!
//! A single channel strip with the full effect chain, and the whole
//! six-channel engine as the audio callback would drive it.

mod engine;

pub use engine::bench_engine;
