use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rtrb::Producer;

use crate::dsp::oscillator::Waveform;
use crate::error::ConfigError;
use crate::io::{converter::midi_to_synth, midi::MidiEvent};
use crate::params::{ParamId, ParameterBus};
use crate::synth::message::{NoteEvent, SynthMessage};

/// Control-side end of an [`Engine`](crate::Engine).
///
/// Owned by the control thread (MIDI decoding, UI, automation). Every method
/// is wait-free: notes go through a bounded SPSC queue, parameters through
/// atomic stores on the shared [`ParameterBus`].
pub struct EngineHandle {
    tx: Producer<SynthMessage>,
    params: Arc<ParameterBus>,
    dropped: u64,
    underruns: Arc<AtomicU64>,
}

impl EngineHandle {
    pub(crate) fn new(
        tx: Producer<SynthMessage>,
        params: Arc<ParameterBus>,
        underruns: Arc<AtomicU64>,
    ) -> Self {
        Self {
            tx,
            params,
            dropped: 0,
            underruns,
        }
    }

    /// Queue a message for the audio thread. When the queue is full the new
    /// message is dropped and counted; already queued messages are untouched.
    pub fn send_message(&mut self, message: SynthMessage) -> bool {
        match self.tx.push(message) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                log::debug!("note queue full, dropped {message:?} ({} total)", self.dropped);
                false
            }
        }
    }

    pub fn send(&mut self, event: NoteEvent) -> bool {
        self.send_message(SynthMessage::Note(event))
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) -> bool {
        self.send(NoteEvent::on(note, velocity))
    }

    pub fn note_off(&mut self, note: u8) -> bool {
        self.send(NoteEvent::off(note))
    }

    pub fn all_notes_off(&mut self) -> bool {
        self.send_message(SynthMessage::AllNotesOff)
    }

    /// Forward a decoded MIDI message on `channel_filter`. Returns `false` if
    /// it was ignored or dropped.
    pub fn midi(&mut self, event: MidiEvent, channel_filter: u8) -> bool {
        match midi_to_synth(event, channel_filter) {
            Some(message) => self.send_message(message),
            None => false,
        }
    }

    /// Clamp and store. Returns the value actually stored.
    pub fn set_param(&self, id: ParamId, value: f32) -> f32 {
        self.params.set(id, value)
    }

    pub fn set_waveform(&self, channel: usize, index: u8) -> Result<Waveform, ConfigError> {
        self.params.set_waveform(channel, index)
    }

    pub fn set_channel_ratio(&self, channel: usize, ratio: f32) -> Result<f32, ConfigError> {
        self.params.set_channel_ratio(channel, ratio)
    }

    pub fn set_channel_pan(&self, channel: usize, pan: f32) -> Result<f32, ConfigError> {
        self.params.set_channel_pan(channel, pan)
    }

    pub fn set_channel_level(&self, channel: usize, level: f32) -> Result<f32, ConfigError> {
        self.params.set_channel_level(channel, level)
    }

    pub fn params(&self) -> &Arc<ParameterBus> {
        &self.params
    }

    /// Messages dropped because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped
    }

    /// Audio callbacks that missed their deadline.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    fn handle(capacity: usize) -> (EngineHandle, rtrb::Consumer<SynthMessage>) {
        let (tx, rx) = RingBuffer::new(capacity);
        let handle = EngineHandle::new(
            tx,
            Arc::new(ParameterBus::new()),
            Arc::new(AtomicU64::new(0)),
        );
        (handle, rx)
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (mut handle, mut rx) = handle(2);
        assert!(handle.note_on(60, 1.0));
        assert!(handle.note_on(62, 1.0));
        assert!(!handle.note_on(64, 1.0));
        assert_eq!(handle.dropped_events(), 1);

        assert_eq!(rx.pop(), Ok(SynthMessage::Note(NoteEvent::on(60, 1.0))));
        assert_eq!(rx.pop(), Ok(SynthMessage::Note(NoteEvent::on(62, 1.0))));
        assert!(rx.pop().is_err());
    }

    #[test]
    fn test_midi_forwarding() {
        let (mut handle, mut rx) = handle(8);
        let on = MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 0,
        };
        assert!(handle.midi(on, 0));
        assert!(!handle.midi(on, 5));
        assert_eq!(rx.pop(), Ok(SynthMessage::Note(NoteEvent::off(60))));
    }

    #[test]
    fn test_params_reach_shared_bus() {
        let (handle, _rx) = handle(8);
        assert_eq!(handle.set_param(ParamId::ReverbMix, 3.0), 1.0);
        assert_eq!(handle.params().get(ParamId::ReverbMix), 1.0);
        assert_eq!(handle.set_waveform(1, 3), Ok(Waveform::RcOsc));
        assert!(handle.set_waveform(1, 9).is_err());
        assert_eq!(handle.underruns(), 0);
    }
}
