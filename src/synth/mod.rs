// Purpose: note transport and monophonic voice control
// This layer sits between the control thread and the channel strips

pub mod message;
pub mod voice;

pub use message::{Gate, MessageReceiver, NoteEvent, SynthMessage};
pub use voice::{MidiVoiceController, VoiceAction};
