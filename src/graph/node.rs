use crate::io::converter::midi_note_to_freq;
use crate::params::ParamSnapshot;

/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch of the sounding note before channel ratios (Hz)
/// - velocity: Note intensity, 0.0-1.0
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
}

impl RenderCtx {
    /// Create context from a MIDI note number.
    pub fn from_note(sample_rate: f32, note: u8, velocity: f32) -> Self {
        Self::from_freq(sample_rate, midi_note_to_freq(note), velocity)
    }

    /// Create context from a frequency in Hz.
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
        }
    }
}

/// Core trait for the nodes of a channel pipeline
///
/// Nodes render audio in place and respond to gate events. Control values
/// arrive once per block through `update_params`.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Pick up the block's parameter snapshot. Nodes ramp toward the new
    /// values while rendering.
    fn update_params(&mut self, _params: &ParamSnapshot) {}

    /// Triggered when a note starts
    ///
    /// Default implementation does nothing (effect nodes).
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Triggered when a note is released
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }

    /// Jump every smoothed control to its latest target. The engine calls
    /// this once, before its first block.
    fn settle(&mut self) {}

    /// Clear all internal state (delay lines, filter memory, envelopes).
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_note_uses_a440_tuning() {
        let ctx = RenderCtx::from_note(48_000.0, 69, 1.0);
        assert!((ctx.frequency - 440.0).abs() < 1e-3);

        let ctx = RenderCtx::from_note(48_000.0, 60, 0.5);
        assert!((ctx.frequency - 261.6256).abs() < 1e-2);
        assert_eq!(ctx.velocity, 0.5);
    }
}
