use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, StreamConfig};
use emotion_canvas::collab::{AudioSink, NoteEvent, Recorder, RecordingArtifact};
use tracing::{debug, error, info, warn};

use crate::state::{SynthState, Voice};

/// Voices beyond this are dropped, oldest first.
const MAX_VOICES: usize = 32;

/// Opens the default output device and renders `state`'s voices on it until
/// the process exits. Failures are logged and leave `running` unset, so
/// sessions refuse to start.
pub async fn run_audio_engine(state: Arc<SynthState>) {
    let result = tokio::task::spawn_blocking(move || {
        let stream = match open_output_stream(&state) {
            Ok(stream) => stream,
            Err(e) => {
                error!("Audio output unavailable: {:#}", e);
                return;
            }
        };
        state.running.store(true, Ordering::Release);

        // The stream stops when dropped.
        let _stream = stream;
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    })
    .await;

    if let Err(e) = result {
        error!("Audio engine task failed: {}", e);
    }
}

fn open_output_stream(state: &Arc<SynthState>) -> anyhow::Result<cpal::Stream> {
    let device = cpal::default_host()
        .default_output_device()
        .context("no output device found")?;
    info!(
        "Output device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );

    let supported = device
        .default_output_config()
        .context("no default output config")?;
    let config = StreamConfig {
        channels: supported.channels(),
        sample_rate: supported.sample_rate(),
        buffer_size: cpal::BufferSize::Default,
    };
    info!("Output stream: {:?}", config);
    state.sample_rate.store(config.sample_rate.0, Ordering::Release);
    state.channels.store(config.channels, Ordering::Release);

    let callback_state = state.clone();
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0 as f32;
    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                process_audio_data(data, &callback_state, channels, sample_rate);
            },
            |err| error!("Output stream error: {}", err),
            None,
        )
        .context("failed to build output stream")?;
    stream.play().context("failed to start output stream")?;
    Ok(stream)
}

/// Renders the scheduled voices into the output buffer
fn process_audio_data(data: &mut [f32], state: &SynthState, channels: usize, sample_rate: f32) {
    let Ok(mut voices) = state.voices.lock() else {
        data.fill(0.0);
        return;
    };
    let mut clock = state.sample_clock.load(Ordering::Acquire);
    let mut recording = state.recording.lock().ok();

    for frame in data.chunks_mut(channels.max(1)) {
        let mut sample_value: f32 = 0.0;

        for voice in voices.iter_mut() {
            if clock < voice.start || clock >= voice.end {
                continue;
            }
            let freq = midi_note_to_freq(voice.pitch);
            voice.phase = (voice.phase + freq / sample_rate) % 1.0;
            let phase = voice.phase;

            let square_wave = if phase < 0.5 { 1.0 } else { -1.0 };
            let sine_wave = (2.0 * std::f32::consts::PI * phase).sin();
            let sawtooth_wave = 2.0 * phase - 1.0;
            let triangle_wave = (2.0 * phase - 1.0).abs() * 2.0 - 1.0;

            let mixed_wave = 0.3 * sine_wave + 0.3 * square_wave + 0.2 * sawtooth_wave + 0.2 * triangle_wave;

            // Short linear fade at both ends to avoid clicks
            let fade_len = (sample_rate * 0.005) as u64;
            let from_start = clock - voice.start;
            let to_end = voice.end - clock;
            let envelope = (from_start.min(to_end) as f32 / fade_len.max(1) as f32).min(1.0);

            let volume = voice.velocity as f32 / 127.0;
            sample_value += mixed_wave * volume * envelope * 0.25;
        }

        sample_value = sample_value.clamp(-1.0, 1.0);

        for sample in frame.iter_mut() {
            *sample = Sample::from_sample(sample_value);
        }
        if let Some(Some(buffer)) = recording.as_deref_mut() {
            buffer.extend_from_slice(frame);
        }
        clock += 1;
    }

    voices.retain(|voice| voice.end > clock);
    state.sample_clock.store(clock, Ordering::Release);
}

fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * (2.0_f32).powf((note as f32 - 69.0) / 12.0)
}

/// Plays notes on the built-in synthesizer.
pub struct SynthSink {
    state: Arc<SynthState>,
}

impl SynthSink {
    pub fn new(state: Arc<SynthState>) -> Self {
        Self { state }
    }
}

impl AudioSink for SynthSink {
    fn resume(&mut self) -> anyhow::Result<()> {
        if self.state.is_running() {
            Ok(())
        } else {
            anyhow::bail!("audio output stream is not running")
        }
    }

    fn play_note(&mut self, note: &NoteEvent) {
        let rate = self.state.sample_rate.load(Ordering::Acquire) as f64;
        let now = self.state.sample_clock.load(Ordering::Acquire);
        let start = now.saturating_add((note.offset * rate) as u64);
        let end = start.saturating_add(((note.duration * rate) as u64).max(1));

        let Ok(mut voices) = self.state.voices.lock() else {
            warn!("Voice list poisoned; dropping note {}", note.pitch);
            return;
        };
        if voices.len() >= MAX_VOICES {
            voices.remove(0);
        }
        voices.push(Voice {
            pitch: note.pitch,
            velocity: note.velocity,
            start,
            end,
            phase: 0.0,
        });
        debug!("Scheduled note {} vel {} at frame {}", note.pitch, note.velocity, start);
    }
}

/// Captures whatever the built-in synthesizer renders.
pub struct TapRecorder {
    state: Arc<SynthState>,
}

impl TapRecorder {
    pub fn new(state: Arc<SynthState>) -> Self {
        Self { state }
    }
}

impl Recorder for TapRecorder {
    fn is_ready(&self) -> bool {
        self.state.is_running()
    }

    fn start(&mut self) -> anyhow::Result<()> {
        let mut recording = self
            .state
            .recording
            .lock()
            .map_err(|_| anyhow::anyhow!("recording buffer poisoned"))?;
        *recording = Some(Vec::new());
        info!("Recording started");
        Ok(())
    }

    fn stop(&mut self) -> Option<RecordingArtifact> {
        let samples = self.state.recording.lock().ok()?.take()?;
        Some(RecordingArtifact {
            samples,
            sample_rate: self.state.sample_rate.load(Ordering::Acquire),
            channels: self.state.channels.load(Ordering::Acquire),
        })
    }
}
