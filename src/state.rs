use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A scheduled note, in output-stream sample time.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub pitch: u8,
    pub velocity: u8,
    /// First frame at which the voice sounds.
    pub start: u64,
    /// First frame at which it no longer sounds.
    pub end: u64,
    pub phase: f32,
}

/// State shared between the UI thread, which schedules notes, and the audio
/// callback, which renders them.
#[derive(Debug)]
pub struct SynthState {
    /// Scheduled and sounding voices.
    pub voices: Mutex<Vec<Voice>>,

    /// Captured output while a recording is in progress.
    pub recording: Mutex<Option<Vec<f32>>>,

    /// Frames rendered since the stream started.
    pub sample_clock: AtomicU64,
    pub sample_rate: AtomicU32,
    pub channels: AtomicU16,

    /// Set once the output stream is playing.
    pub running: AtomicBool,
}

impl SynthState {
    /// Create a new `SynthState` with default values.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            voices: Mutex::new(Vec::new()),
            recording: Mutex::new(None),
            sample_clock: AtomicU64::new(0),
            sample_rate: AtomicU32::new(44_100),
            channels: AtomicU16::new(2),
            running: AtomicBool::new(false),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
