use crate::{
    io::midi::{MidiEvent, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF},
    synth::message::{NoteEvent, SynthMessage},
};

/// Convert a note message on `channel_filter` into a [`NoteEvent`].
///
/// A NoteOn with velocity 0 is a NoteOff. Other channels and non-note
/// messages yield `None`.
pub fn midi_to_note_event(midi: MidiEvent, channel_filter: u8) -> Option<NoteEvent> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(if velocity == 0 {
            NoteEvent::off(key)
        } else {
            NoteEvent::on(key, velocity as f32 / 127.0)
        }),
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(NoteEvent::off(key))
        }
        _ => None,
    }
}

/// Like [`midi_to_note_event`], and additionally maps the All Notes Off /
/// All Sound Off controllers.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::ControlChange {
            channel,
            controller,
            ..
        } if channel == channel_filter
            && (controller == CC_ALL_NOTES_OFF || controller == CC_ALL_SOUND_OFF) =>
        {
            Some(SynthMessage::AllNotesOff)
        }
        _ => midi_to_note_event(midi, channel_filter).map(SynthMessage::Note),
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
