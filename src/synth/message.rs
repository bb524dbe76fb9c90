use rtrb::Consumer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    On,
    Off,
}

/// One note transition, already decoded from MIDI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub note: u8,
    /// 0.0 to 1.0. Ignored for `Gate::Off`.
    pub velocity: f32,
    pub gate: Gate,
}

impl NoteEvent {
    pub fn on(note: u8, velocity: f32) -> Self {
        Self {
            note,
            velocity: velocity.clamp(0.0, 1.0),
            gate: Gate::On,
        }
    }

    pub fn off(note: u8) -> Self {
        Self {
            note,
            velocity: 0.0,
            gate: Gate::Off,
        }
    }
}

/// What travels over the note queue from the control thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    Note(NoteEvent),
    AllNotesOff,
}

impl From<NoteEvent> for SynthMessage {
    fn from(event: NoteEvent) -> Self {
        SynthMessage::Note(event)
    }
}

/// Audio-side end of the note queue.
pub trait MessageReceiver {
    /// Next queued message, or `None` once the queue is drained.
    fn recv(&mut self) -> Option<SynthMessage>;
}

impl MessageReceiver for Consumer<SynthMessage> {
    fn recv(&mut self) -> Option<SynthMessage> {
        self.pop().ok()
    }
}
