//! Collaborators the session drives but does not implement: sound output,
//! audio capture, the remote session log, and the mood display.
//!
//! Everything runs on the host's event thread, so the traits take `&mut self`
//! and need not be `Send`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::mood::Mood;

/// A note to be played. Emitted, never stored by the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI pitch, always inside the configured pitch range.
    pub pitch: u8,
    /// MIDI velocity in `[1, 127]`.
    pub velocity: u8,
    /// Seconds, strictly positive.
    pub duration: f64,
    /// Seconds from now before the note starts.
    pub offset: f64,
}

/// One accepted cell entry, as reported to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellEvent {
    pub x: u32,
    pub y: u32,
    pub emotion: Mood,
    pub intensity: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl CellEvent {
    pub fn now(x: u32, y: u32, emotion: Mood, intensity: f64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            x,
            y,
            emotion,
            intensity,
            timestamp,
        }
    }
}

/// Captured audio handed back when recording stops.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingArtifact {
    /// Interleaved samples.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RecordingArtifact {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

pub trait AudioSink {
    /// Asks the audio context to run. Notes are only sent after this succeeds.
    fn resume(&mut self) -> anyhow::Result<()>;

    /// Fire-and-forget.
    fn play_note(&mut self, note: &NoteEvent);
}

pub trait Recorder {
    fn is_ready(&self) -> bool;
    fn start(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self) -> Option<RecordingArtifact>;
}

/// Remote session log. Calls must return immediately; delivery happens (or
/// fails) in the background and its outcome never reaches the session.
pub trait BackendNotifier {
    fn open_session(&mut self, _grid_width: u32, _grid_height: u32) {}
    fn notify_cell(&mut self, event: &CellEvent);
    fn clear_session(&mut self) {}
}

/// The region indicator / current-mood display.
pub trait MoodIndicator {
    fn on_mood_changed(&mut self, mood: Option<Mood>);
}

/// A recorder for hosts that cannot capture audio. Never ready.
#[derive(Debug, Default)]
pub struct NoRecorder;

impl Recorder for NoRecorder {
    fn is_ready(&self) -> bool {
        false
    }

    fn start(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("no recording device")
    }

    fn stop(&mut self) -> Option<RecordingArtifact> {
        None
    }
}

/// A notifier for sessions without a backend.
#[derive(Debug, Default)]
pub struct NoBackend;

impl BackendNotifier for NoBackend {
    fn notify_cell(&mut self, _event: &CellEvent) {}
}
