//! Demo host: cpal output stream on the audio side, a scripted performer on
//! the control side.

use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use sextet::{dsp::Waveform, Engine, EngineConfig, EngineHandle, ParamId, NUM_CHANNELS};

/// Minor-seventh arpeggio, MIDI note numbers.
const ARPEGGIO: [u8; 8] = [48, 55, 58, 63, 60, 58, 55, 51];
/// Stereo spread for the six channels.
const PANS: [f32; NUM_CHANNELS] = [0.5, 0.3, 0.7, 0.15, 0.85, 0.5];
/// Channel levels; upper partials quieter.
const LEVELS: [f32; NUM_CHANNELS] = [1.0, 0.6, 0.45, 0.35, 0.25, 0.2];

pub struct Demo {
    bpm: f32,
}

impl Demo {
    pub fn new() -> Self {
        Self { bpm: 120.0 }
    }

    pub fn bpm(mut self, bpm: f32) -> Self {
        self.bpm = bpm;
        self
    }

    /// Play until `seconds` have elapsed, or forever.
    pub fn run(self, seconds: Option<f32>) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;

        let config = EngineConfig::default().with_sample_rate(sample_rate);
        let (mut engine, mut handle) =
            Engine::new(config).wrap_err("failed to build the synth engine")?;
        let monitor = engine.deadline_monitor();

        log::info!(
            "output: {} ({} Hz, {} channels)",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            sample_rate,
            channels
        );

        let stream = device
            .build_output_stream(
                &supported.into(),
                move |data: &mut [f32], _| {
                    let frames = data.len() / channels.max(1);
                    monitor.time(frames, || {
                        if engine.process_interleaved(data, channels).is_err() {
                            data.fill(0.0);
                        }
                    });
                },
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        self.perform(&mut handle, seconds)?;

        handle.all_notes_off();
        std::thread::sleep(Duration::from_millis(500));
        Ok(())
    }

    fn perform(&self, handle: &mut EngineHandle, seconds: Option<f32>) -> EyreResult<()> {
        for channel in 0..NUM_CHANNELS {
            handle.set_channel_pan(channel, PANS[channel])?;
            handle.set_channel_level(channel, LEVELS[channel])?;
        }
        handle.set_param(ParamId::Resonance, 0.4);
        handle.set_param(ParamId::ReverbMix, 0.3);
        handle.set_param(ParamId::ChorusMix, 0.35);
        handle.set_param(ParamId::Release, 0.25);

        let step = Duration::from_secs_f32(60.0 / self.bpm / 2.0);
        let start = Instant::now();
        let mut reported_drops = 0;
        let mut reported_underruns = 0;

        for tick in 0usize.. {
            let elapsed = start.elapsed().as_secs_f32();
            if seconds.is_some_and(|limit| elapsed >= limit) {
                break;
            }

            // New waveform on every channel each two bars.
            if tick % 32 == 0 {
                let waveform = Waveform::ALL[(tick / 32) % Waveform::ALL.len()];
                for channel in 0..NUM_CHANNELS {
                    handle.set_waveform(channel, waveform.index())?;
                }
                log::info!("waveform: {waveform:?}");
            }

            // Slow cutoff sweep, 300 Hz to 6 kHz.
            let sweep = 0.5 - 0.5 * (elapsed * 0.25).cos();
            handle.set_param(ParamId::Cutoff, 300.0 * 20.0_f32.powf(sweep));

            let note = ARPEGGIO[tick % ARPEGGIO.len()];
            let velocity = if tick % 4 == 0 { 1.0 } else { 0.7 };
            handle.note_on(note, velocity);
            std::thread::sleep(step.mul_f32(0.8));
            handle.note_off(note);
            std::thread::sleep(step.mul_f32(0.2));

            if handle.dropped_events() != reported_drops {
                reported_drops = handle.dropped_events();
                log::warn!("{reported_drops} note events dropped (queue full)");
            }
            if handle.underruns() != reported_underruns {
                reported_underruns = handle.underruns();
                log::warn!("{reported_underruns} audio callbacks missed their deadline");
            }
        }
        Ok(())
    }
}

impl Default for Demo {
    fn default() -> Self {
        Self::new()
    }
}
