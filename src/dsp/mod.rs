//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Everything here allocates at construction only. Per-sample and per-block
//! methods are safe to call from the audio callback.

/// Fractional delay line.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Zero-delay-feedback 4-pole ladder low-pass.
pub mod filter;
/// Sine, SuperSaw, BLIT and resonant-noise generators.
pub mod oscillator;
/// Freeverb-style comb/allpass reverb.
pub mod reverb;
/// Linear parameter ramps.
pub mod smooth;

pub use envelope::{Envelope, EnvelopeCurve, EnvelopeStage};
pub use oscillator::Waveform;
pub use smooth::SmoothedValue;
