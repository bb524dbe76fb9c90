use crate::io::converter::midi_note_to_freq;
use crate::synth::message::{Gate, NoteEvent};

/// Held-note capacity. Pressing more keys forgets the oldest.
pub const MAX_HELD_NOTES: usize = 16;

/// What the channel strips should do after a note event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoiceAction {
    None,
    /// Gate on at this pitch and velocity (restarts Attack from the current level).
    Trigger { note: u8, velocity: f32 },
    /// Change pitch to a still-held note without retriggering.
    Glide { note: u8 },
    /// Gate off.
    Release,
}

/// Monophonic, last-note-priority voice control shared by all six channels.
///
/// Keeps a fixed stack of held keys. Releasing the sounding key falls back to
/// the most recent key still held; releasing the last one gates off. Nothing
/// here allocates.
#[derive(Debug, Clone)]
pub struct MidiVoiceController {
    held: [u8; MAX_HELD_NOTES],
    len: usize,
    pitch_note: u8,
    velocity: f32,
    gate: bool,
}

impl MidiVoiceController {
    pub fn new() -> Self {
        Self {
            held: [0; MAX_HELD_NOTES],
            len: 0,
            pitch_note: 69,
            velocity: 0.0,
            gate: false,
        }
    }

    pub fn handle(&mut self, event: &NoteEvent) -> VoiceAction {
        match event.gate {
            Gate::On => self.press(event.note, event.velocity),
            Gate::Off => self.release(event.note),
        }
    }

    fn press(&mut self, note: u8, velocity: f32) -> VoiceAction {
        self.remove(note);
        if self.len == MAX_HELD_NOTES {
            self.held.copy_within(1.., 0);
            self.len -= 1;
        }
        self.held[self.len] = note;
        self.len += 1;

        self.pitch_note = note;
        self.velocity = velocity;
        self.gate = true;
        VoiceAction::Trigger { note, velocity }
    }

    fn release(&mut self, note: u8) -> VoiceAction {
        let was_top = self.held().last() == Some(&note);
        if !self.remove(note) || !was_top {
            return VoiceAction::None;
        }

        match self.held().last() {
            Some(&fallback) => {
                self.pitch_note = fallback;
                VoiceAction::Glide { note: fallback }
            }
            None => {
                self.gate = false;
                VoiceAction::Release
            }
        }
    }

    fn remove(&mut self, note: u8) -> bool {
        match self.held().iter().position(|&n| n == note) {
            Some(pos) => {
                self.held.copy_within(pos + 1..self.len, pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Clear every held key and gate off if sounding.
    pub fn all_notes_off(&mut self) -> VoiceAction {
        self.len = 0;
        if std::mem::replace(&mut self.gate, false) {
            VoiceAction::Release
        } else {
            VoiceAction::None
        }
    }

    /// Keys currently held, oldest first.
    pub fn held(&self) -> &[u8] {
        &self.held[..self.len]
    }

    /// The sounding key, if the gate is on.
    pub fn note(&self) -> Option<u8> {
        self.gate.then_some(self.pitch_note)
    }

    /// Pitch of the last sounding key. Stays put through the release tail.
    pub fn frequency(&self) -> f32 {
        midi_note_to_freq(self.pitch_note)
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }
}

impl Default for MidiVoiceController {
    fn default() -> Self {
        Self::new()
    }
}
