//! The composing/recording session.
//!
//! ```text
//!   Idle ──start()──▶ Composing ──stop()──▶ Stopped ──start()──▶ ...
//!     │                  (or Recording when recording is enabled)
//!     └─ start() fails (recorder/audio unavailable): stays Idle
//! ```
//!
//! The controller is the only owner of [`SessionState`]. Pointer input is
//! ignored outside Composing/Recording, so no note, highlight or backend
//! notification can leak out of an inactive session.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::collab::{
    AudioSink, BackendNotifier, CellEvent, MoodIndicator, NoteEvent, Recorder, RecordingArtifact,
};
use crate::config::{CanvasConfig, MoodLibrary, ResolvedMood};
use crate::coords::{CoordinateMapper, GridCell, Viewport};
use crate::effects::{EffectHandle, EffectScheduler};
use crate::error::SessionError;
use crate::expression;
use crate::harmony::{chord_intervals, embellish};
use crate::mood::Mood;
use crate::pitch::map_pitch;
use crate::quantize::GridQuantizer;

/// Pointer cell entries always play at full intensity.
const INTENSITY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Composing,
    Recording,
    Stopped,
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Composing | Phase::Recording)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub step_counter: u64,
    pub active_mood: Option<Mood>,
    pub last_cell: Option<GridCell>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            step_counter: 0,
            active_mood: None,
            last_cell: None,
        }
    }
}

/// The host-provided implementations the controller drives.
pub struct Collaborators {
    pub audio: Box<dyn AudioSink>,
    pub recorder: Box<dyn Recorder>,
    pub backend: Box<dyn BackendNotifier>,
    pub indicator: Box<dyn MoodIndicator>,
}

/// What a single pointer sample amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// No session running.
    Inactive,
    /// The pointer is outside the grid.
    OutOfBounds,
    /// Still inside the previously entered cell.
    SameCell(GridCell),
    /// A new cell, but no mood region is active yet.
    NoMood(GridCell),
    /// The active mood has no usable config; nothing sounds.
    Silent { cell: GridCell, mood: Mood },
    /// An accepted entry. `notes` is empty when the step gate held it back.
    Entered {
        cell: GridCell,
        mood: Mood,
        step: u64,
        notes: Vec<NoteEvent>,
    },
}

pub struct SessionController {
    config: CanvasConfig,
    mapper: CoordinateMapper,
    library: MoodLibrary,
    quantizer: GridQuantizer,
    effects: EffectScheduler,
    state: SessionState,
    rng: StdRng,
    collab: Collaborators,
    trail: Vec<CellEvent>,
    last_recording: Option<RecordingArtifact>,
}

impl SessionController {
    pub fn new(config: CanvasConfig, library: MoodLibrary, mut collab: Collaborators) -> Self {
        let mapper = CoordinateMapper::new(
            config.design_width,
            config.design_height,
            config.grid_width,
            config.grid_height,
        );
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        collab
            .backend
            .open_session(config.grid_width, config.grid_height);

        Self {
            effects: EffectScheduler::new(config.effect_lifetime),
            config,
            mapper,
            library,
            quantizer: GridQuantizer::new(),
            state: SessionState::default(),
            rng,
            collab,
            trail: Vec::new(),
            last_recording: None,
        }
    }

    /// Begins composing, and recording if the config asks for it.
    ///
    /// On failure the controller is left Idle with the step counter untouched
    /// and the error describes what the user should be told.
    pub fn start(&mut self) -> Result<Phase, SessionError> {
        if self.state.phase.is_active() {
            return Err(SessionError::AlreadyActive);
        }

        if self.config.record && !self.collab.recorder.is_ready() {
            self.state.phase = Phase::Idle;
            warn!("Recorder not ready; refusing to start");
            return Err(SessionError::RecorderUnavailable(
                "recorder is not ready".to_string(),
            ));
        }

        if let Err(e) = self.collab.audio.resume() {
            self.state.phase = Phase::Idle;
            warn!("Audio context did not resume: {}", e);
            return Err(SessionError::AudioUnavailable(e.to_string()));
        }

        let phase = if self.config.record {
            if let Err(e) = self.collab.recorder.start() {
                self.state.phase = Phase::Idle;
                warn!("Recorder failed to start: {}", e);
                return Err(SessionError::RecorderUnavailable(e.to_string()));
            }
            Phase::Recording
        } else {
            Phase::Composing
        };

        self.quantizer.reset();
        self.state.phase = phase;
        info!("Session started ({:?})", phase);
        Ok(phase)
    }

    /// Ends the session. Safe to call from any phase: afterwards no effect is
    /// pending and no mood is active.
    pub fn stop(&mut self) {
        let was = self.state.phase;

        let cancelled = self.effects.clear_all();
        self.quantizer.reset();
        self.state.active_mood = None;
        self.state.last_cell = None;
        self.collab.indicator.on_mood_changed(None);

        if was == Phase::Recording {
            match self.collab.recorder.stop() {
                Some(artifact) => {
                    info!("Recording finished ({:.1}s)", artifact.duration_secs());
                    self.last_recording = Some(artifact);
                }
                None => warn!("Recorder returned no audio"),
            }
        }

        if was.is_active() {
            self.state.phase = Phase::Stopped;
            info!(
                "Session stopped after {} steps, {} effects cancelled",
                self.state.step_counter, cancelled
            );
        }
    }

    /// Wipes the step counter, the cell trail and any highlight state.
    /// Stops a composing session first; refused while recording.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        match self.state.phase {
            Phase::Recording => return Err(SessionError::ClearWhileRecording),
            Phase::Composing => self.stop(),
            Phase::Idle | Phase::Stopped => {}
        }

        self.state.step_counter = 0;
        self.state.last_cell = None;
        self.trail.clear();
        self.effects.clear_all();
        self.quantizer.reset();
        self.collab.backend.clear_session();
        info!("Canvas cleared");
        Ok(())
    }

    /// Feeds one pointer sample, given in screen coordinates.
    pub fn pointer_move(
        &mut self,
        client_x: f32,
        client_y: f32,
        viewport: Viewport,
        now: Instant,
    ) -> MoveOutcome {
        if !self.state.phase.is_active() {
            return MoveOutcome::Inactive;
        }

        let point = self.mapper.to_design(client_x, client_y, viewport);
        let (nx, ny) = self.mapper.normalize(point);
        let region = self.config.regions.classify(nx, ny);
        if self.quantizer.observe_region(region) {
            debug!("Pointer region now {:?}", region);
        }
        if let Some(mood) = region {
            self.set_mood(Some(mood));
        }

        let Some(cell) = self.mapper.cell_at(point) else {
            debug!("Pointer at ({:.1}, {:.1}) is outside the grid", point.x, point.y);
            return MoveOutcome::OutOfBounds;
        };
        if self.quantizer.observe(cell).is_none() {
            return MoveOutcome::SameCell(cell);
        }
        self.state.last_cell = Some(cell);

        let Some(mood) = self.state.active_mood else {
            return MoveOutcome::NoMood(cell);
        };

        self.effects.trigger(cell, mood, now);
        let event = CellEvent::now(cell.col, cell.row, mood, INTENSITY);
        self.collab.backend.notify_cell(&event);
        self.trail.push(event);

        let Some(resolved) = self.library.get(mood) else {
            warn!("No usable config for mood {}; skipping note", mood);
            return MoveOutcome::Silent { cell, mood };
        };

        self.state.step_counter += 1;
        let step = self.state.step_counter;
        if step % resolved.config.step_divisor as u64 != 0 {
            return MoveOutcome::Entered {
                cell,
                mood,
                step,
                notes: Vec::new(),
            };
        }

        let notes = render_notes(cell, resolved, &self.config, &mut self.rng);
        for note in &notes {
            self.collab.audio.play_note(note);
        }
        debug!(
            "Step {} in {}: ({}, {}) → {:?}",
            step,
            mood,
            cell.col,
            cell.row,
            notes.iter().map(|n| n.pitch).collect::<Vec<_>>()
        );

        MoveOutcome::Entered {
            cell,
            mood,
            step,
            notes,
        }
    }

    /// Pointer left the canvas: forget the last cell, drop highlights and the
    /// active mood. The phase is unchanged.
    pub fn pointer_leave(&mut self) {
        self.quantizer.reset();
        self.state.last_cell = None;
        self.effects.clear_all();
        self.set_mood(None);
    }

    /// Expires highlight effects whose lifetime has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<EffectHandle> {
        self.effects.expire(now)
    }

    fn set_mood(&mut self, mood: Option<Mood>) {
        if self.state.active_mood == mood {
            return;
        }
        self.state.active_mood = mood;
        self.collab.indicator.on_mood_changed(mood);
        match mood {
            Some(mood) => info!("Entered mood region: {}", mood),
            None => debug!("Mood cleared"),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn step_counter(&self) -> u64 {
        self.state.step_counter
    }

    pub fn active_mood(&self) -> Option<Mood> {
        self.state.active_mood
    }

    pub fn effects(&self) -> &EffectScheduler {
        &self.effects
    }

    /// Every accepted cell entry since the last clear.
    pub fn trail(&self) -> &[CellEvent] {
        &self.trail
    }

    pub fn last_recording(&self) -> Option<&RecordingArtifact> {
        self.last_recording.as_ref()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn library(&self) -> &MoodLibrary {
        &self.library
    }
}

/// Root note for `cell` plus whatever chord tones the embellisher adds.
fn render_notes(
    cell: GridCell,
    resolved: &ResolvedMood,
    config: &CanvasConfig,
    rng: &mut StdRng,
) -> Vec<NoteEvent> {
    let pitch = map_pitch(
        cell,
        &resolved.scale,
        config.grid_width,
        config.grid_height,
        &config.pitch,
    );
    let root = NoteEvent {
        pitch,
        velocity: expression::velocity(&resolved.config, INTENSITY, &config.expression, rng),
        duration: expression::duration(&resolved.config, &config.expression, rng),
        offset: 0.0,
    };

    let intervals = chord_intervals(&resolved.config, &resolved.scale);
    let mut notes = vec![root];
    notes.extend(embellish(
        &root,
        &intervals,
        resolved.config.embellish_probability,
        &config.pitch.range,
        &config.embellish,
        rng,
    ));
    notes
}
