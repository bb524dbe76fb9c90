pub mod handle;
pub mod monitor;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use rtrb::{Consumer, RingBuffer};

pub use self::{handle::EngineHandle, monitor::DeadlineMonitor};

use crate::{
    config::EngineConfig,
    error::ConfigError,
    graph::{
        channel::ChannelStrip,
        mix::StereoMixer,
        node::{GraphNode, RenderCtx},
    },
    params::ParameterBus,
    synth::{
        message::{MessageReceiver, SynthMessage},
        voice::{MidiVoiceController, VoiceAction},
    },
    NUM_CHANNELS,
};

/*
Engine
======

The audio-thread context object. Owns every piece of DSP state; the control
thread talks to it only through an EngineHandle.

  control thread                               audio thread
  ──────────────                               ────────────
  EngineHandle ── note queue (rtrb) ──────────► Engine::process_block
       │                                          │  drain queue → voice controller
       └───── ParameterBus (atomics) ───────────► │  snapshot → strips + mixer
                                                  │  6 × ChannelStrip::render_block
                                                  └─ StereoMixer → left / right

Each call is cut into sub-blocks of at most `block_size` frames. Queued notes
and one parameter snapshot are applied at the start of every sub-block. All
buffers are sized at construction; processing never allocates, locks or
blocks.
*/

pub struct Engine {
    config: EngineConfig,
    strips: Vec<ChannelStrip>,
    mixer: StereoMixer,
    voice: MidiVoiceController,
    rx: Consumer<SynthMessage>,
    params: Arc<ParameterBus>,
    scratch: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,
    underruns: Arc<AtomicU64>,
    frames_rendered: u64,
    started: bool,
}

impl Engine {
    /// Validate `config` and build the engine plus its control handle.
    pub fn new(config: EngineConfig) -> Result<(Engine, EngineHandle), ConfigError> {
        Self::build(config, |index, config| ChannelStrip::new(index, config))
    }

    /// Like [`Engine::new`], with every channel's noise source seeded from
    /// `seed` so renders are reproducible.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<(Engine, EngineHandle), ConfigError> {
        Self::build(config, |index, config| {
            ChannelStrip::with_seed(index, config, seed.wrapping_add(index as u64))
        })
    }

    fn build(
        config: EngineConfig,
        strip: impl Fn(usize, &EngineConfig) -> ChannelStrip,
    ) -> Result<(Engine, EngineHandle), ConfigError> {
        config.validate()?;

        let params = Arc::new(ParameterBus::from_config(&config));
        let underruns = Arc::new(AtomicU64::new(0));
        let (tx, rx) = RingBuffer::new(config.note_queue_capacity);

        let strips = (0..NUM_CHANNELS).map(|i| strip(i, &config)).collect();
        let mixer = StereoMixer::new(&config.channels, config.smoothing_ms, config.sample_rate);

        log::info!(
            "engine ready: {} Hz, {}-frame blocks ({:.2} ms), {} channels, queue {}",
            config.sample_rate,
            config.block_size,
            config.block_period() * 1_000.0,
            NUM_CHANNELS,
            config.note_queue_capacity
        );

        let engine = Engine {
            strips,
            mixer,
            voice: MidiVoiceController::new(),
            rx,
            params: Arc::clone(&params),
            scratch: vec![0.0; config.block_size],
            left: vec![0.0; config.block_size],
            right: vec![0.0; config.block_size],
            underruns: Arc::clone(&underruns),
            frames_rendered: 0,
            started: false,
            config,
        };
        let handle = EngineHandle::new(tx, params, underruns);
        Ok((engine, handle))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &Arc<ParameterBus> {
        &self.params
    }

    /// Monitor sharing its miss counter with the handle's `underruns()`.
    pub fn deadline_monitor(&self) -> DeadlineMonitor {
        DeadlineMonitor::new(self.config.sample_rate, Arc::clone(&self.underruns))
    }

    pub fn voice(&self) -> &MidiVoiceController {
        &self.voice
    }

    pub fn strips(&self) -> &[ChannelStrip] {
        &self.strips
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Render `min(left.len(), right.len())` frames of stereo output.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let block_size = self.config.block_size;

        let mut offset = 0;
        while offset < frames {
            let len = block_size.min(frames - offset);
            self.render_sub_block(&mut left[offset..offset + len], &mut right[offset..offset + len]);
            offset += len;
        }
    }

    /// Render into an interleaved host buffer. Channels 0/1 get left/right,
    /// any further channels get the mono sum `(l + r) / 2`; a mono host gets
    /// the mono sum too. A trailing partial frame is zeroed.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) -> Result<(), ConfigError> {
        if channels == 0 {
            return Err(ConfigError::InvalidOutputChannels(channels));
        }

        let block_size = self.config.block_size;
        for chunk in data.chunks_mut(block_size * channels) {
            let frames = chunk.len() / channels;
            let (chunk, partial) = chunk.split_at_mut(frames * channels);
            partial.fill(0.0);
            if frames == 0 {
                continue;
            }

            let mut left = std::mem::take(&mut self.left);
            let mut right = std::mem::take(&mut self.right);
            self.render_sub_block(&mut left[..frames], &mut right[..frames]);

            for (frame, (&l, &r)) in chunk
                .chunks_exact_mut(channels)
                .zip(left.iter().zip(right.iter()))
            {
                let mono = 0.5 * (l + r);
                match frame {
                    [only] => *only = mono,
                    [fl, fr, rest @ ..] => {
                        *fl = l;
                        *fr = r;
                        rest.fill(mono);
                    }
                    [] => {}
                }
            }

            self.left = left;
            self.right = right;
        }
        Ok(())
    }

    fn drain_notes(&mut self, ctx: &RenderCtx) {
        while let Some(message) = self.rx.recv() {
            let action = match message {
                SynthMessage::Note(event) => self.voice.handle(&event),
                SynthMessage::AllNotesOff => self.voice.all_notes_off(),
            };

            match action {
                VoiceAction::Trigger { note, velocity } => {
                    let on = RenderCtx::from_note(ctx.sample_rate, note, velocity);
                    for strip in &mut self.strips {
                        strip.note_on(&on);
                    }
                }
                VoiceAction::Release => {
                    for strip in &mut self.strips {
                        strip.note_off(ctx);
                    }
                }
                VoiceAction::Glide { .. } | VoiceAction::None => {}
            }
        }
    }

    fn render_sub_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len();
        let sample_rate = self.config.sample_rate;

        let ctx = RenderCtx::from_freq(sample_rate, self.voice.frequency(), self.voice.velocity());
        self.drain_notes(&ctx);

        let snapshot = self.params.snapshot();
        for strip in &mut self.strips {
            strip.update_params(&snapshot);
        }
        self.mixer.update_params(&snapshot);

        // Writes made before the first block apply at once instead of ramping.
        if !self.started {
            for strip in &mut self.strips {
                strip.settle();
            }
            self.mixer.settle();
            self.started = true;
        }

        let ctx = RenderCtx::from_freq(sample_rate, self.voice.frequency(), self.voice.velocity());

        left.fill(0.0);
        right.fill(0.0);
        let scratch = &mut self.scratch[..frames];
        for (index, strip) in self.strips.iter_mut().enumerate() {
            strip.render_block(scratch, &ctx);
            self.mixer.mix_channel(index, scratch, left, right);
        }

        self.frames_rendered += frames as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeStage;
    use crate::params::ParamId;

    fn engine() -> (Engine, EngineHandle) {
        let config = EngineConfig::default().with_block_size(128);
        Engine::with_seed(config, 3).expect("valid config")
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_block_size(0);
        assert!(matches!(
            Engine::new(config),
            Err(ConfigError::InvalidBlockSize(0))
        ));
    }

    #[test]
    fn test_silence_without_notes() {
        let (mut engine, _handle) = engine();
        let mut left = vec![1.0f32; 1_000];
        let mut right = vec![1.0f32; 1_000];
        engine.process_block(&mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|&x| x == 0.0));
        assert_eq!(engine.frames_rendered(), 1_000);
    }

    #[test]
    fn test_note_gates_every_channel() {
        let (mut engine, mut handle) = engine();
        handle.note_on(60, 1.0);

        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        engine.process_block(&mut left, &mut right);
        assert_eq!(engine.voice().note(), Some(60));
        assert!(engine
            .strips()
            .iter()
            .all(|s| s.stage() != EnvelopeStage::Idle));
        assert!(left.iter().any(|&x| x != 0.0));

        handle.note_off(60);
        for _ in 0..20 {
            engine.process_block(&mut left, &mut right);
        }
        assert!(engine.strips().iter().all(|s| !s.is_active()));
    }

    #[test]
    fn test_params_set_before_first_block_apply_at_once() {
        let (mut engine, mut handle) = engine();
        for ch in 0..NUM_CHANNELS {
            handle.set_channel_level(ch, 0.0).expect("valid channel");
        }
        handle.set_param(ParamId::Cutoff, 300.0);
        handle.note_on(60, 1.0);

        let mut left = vec![1.0f32; 128];
        let mut right = vec![1.0f32; 128];
        engine.process_block(&mut left, &mut right);
        assert!(engine.strips().iter().all(|s| s.is_active()));
        assert!(left.iter().chain(right.iter()).all(|&x| x == 0.0));
    }

    #[test]
    fn test_output_stays_in_range_with_all_channels() {
        let (mut engine, mut handle) = engine();
        handle.set_param(ParamId::Cutoff, 20_000.0);
        handle.set_param(ParamId::ReverbMix, 0.0);
        for ch in 0..NUM_CHANNELS {
            handle.set_channel_ratio(ch, 1.0).expect("valid channel");
        }
        handle.note_on(69, 1.0);

        let mut left = vec![0.0f32; 4_800];
        let mut right = vec![0.0f32; 4_800];
        for _ in 0..5 {
            engine.process_block(&mut left, &mut right);
            for &x in left.iter().chain(right.iter()) {
                assert!(x.abs() <= 1.05, "sample {x} exceeds full scale");
            }
        }
    }

    #[test]
    fn test_interleaved_layouts() {
        let (mut engine, mut handle) = engine();
        handle.set_channel_pan(0, 0.0).expect("valid channel");
        handle.note_on(60, 1.0);

        let mut stereo = vec![0.0f32; 2 * 512];
        engine.process_interleaved(&mut stereo, 2).expect("stereo");
        assert!(stereo.iter().any(|&x| x != 0.0));

        let mut quad = vec![0.0f32; 4 * 300];
        engine.process_interleaved(&mut quad, 4).expect("quad");
        for frame in quad.chunks_exact(4) {
            let mono = 0.5 * (frame[0] + frame[1]);
            assert_eq!(frame[2], mono);
            assert_eq!(frame[3], mono);
        }

        let mut mono = vec![0.0f32; 200];
        engine.process_interleaved(&mut mono, 1).expect("mono");
        assert!(mono.iter().any(|&x| x != 0.0));

        assert_eq!(
            engine.process_interleaved(&mut mono, 0),
            Err(ConfigError::InvalidOutputChannels(0))
        );
    }

    #[test]
    fn test_interleaved_partial_frame_is_zeroed() {
        let (mut engine, mut handle) = engine();
        handle.note_on(60, 1.0);

        // 100 stereo frames plus one stray sample, within and across sub-blocks.
        for len in [201, 2 * 128 + 1, 1] {
            let mut data = vec![7.0f32; len];
            engine.process_interleaved(&mut data, 2).expect("stereo");
            assert_eq!(data[len - 1], 0.0, "stray sample kept stale data at len {len}");
            assert!(data.iter().all(|&x| x.abs() <= 1.05));
        }
        assert_eq!(engine.frames_rendered(), 100 + 128);
    }

    #[test]
    fn test_deadline_monitor_feeds_handle() {
        let (engine, handle) = engine();
        let monitor = engine.deadline_monitor();
        monitor.record(128, std::time::Duration::from_secs(1));
        assert_eq!(handle.underruns(), 1);
    }
}
