//! The per-channel signal graph.
//!
//! Graph nodes wrap the low-level DSP primitives with what a running
//! instrument needs: gate events, per-block parameter snapshots and in-place
//! block rendering. The topology is fixed: [`channel::ChannelStrip`] chains
//! the nodes in order and [`mix::StereoMixer`] pans the strips onto the
//! output bus.

/// Fixed envelope → oscillator → filter → reverb → chorus pipeline.
pub mod channel;
/// Two-tap modulated delay chorus.
pub mod chorus;
/// Envelope generator node exposing ADSR state.
pub mod envelope;
/// Ladder low-pass node with smoothed cutoff and resonance.
pub mod filter;
/// Equal-power pan and headroom mixing onto the stereo bus.
pub mod mix;
/// Core traits shared by all graph nodes.
pub mod node;
/// The four generators of a channel behind a waveform selector.
pub mod oscillator;
/// Freeverb node with dry/wet blend.
pub mod reverb;
/// Equal-power crossfading between waveforms.
pub mod selector;
