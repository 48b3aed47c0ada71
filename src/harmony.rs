//! Probabilistic chord tones layered over a root note.

use rand::Rng;

use crate::collab::NoteEvent;
use crate::config::{MoodConfig, Scale, ScaleKind};
use crate::pitch::PitchRange;

pub const MAJOR_TRIAD: [i32; 3] = [0, 4, 7];
pub const MINOR_TRIAD: [i32; 3] = [0, 3, 7];

/// Timing and dynamics of chord tones relative to their root.
///
/// Tone `i` starts `stagger_base + i * stagger_step` seconds after the root,
/// lasts `duration_factor` of the root's duration, and is played at
/// `velocity_base + i * velocity_step` of the root's velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbellishConfig {
    pub stagger_base: f64,
    pub stagger_step: f64,
    pub duration_factor: f64,
    pub velocity_base: f64,
    pub velocity_step: f64,
}

impl Default for EmbellishConfig {
    fn default() -> Self {
        Self {
            stagger_base: 0.05,
            stagger_step: 0.02,
            duration_factor: 0.6,
            velocity_base: 0.3,
            velocity_step: 0.15,
        }
    }
}

/// The mood's configured chord, or the triad matching the scale's quality.
pub fn chord_intervals(config: &MoodConfig, scale: &Scale) -> Vec<i32> {
    match &config.chord_intervals {
        Some(intervals) if !intervals.is_empty() => intervals.clone(),
        _ => match scale.kind() {
            ScaleKind::Minor => MINOR_TRIAD.to_vec(),
            ScaleKind::Major | ScaleKind::Other => MAJOR_TRIAD.to_vec(),
        },
    }
}

/// With probability `probability`, returns one note per interval above `root`.
/// Tones outside `range` are left out rather than clamped.
pub fn embellish<R: Rng>(
    root: &NoteEvent,
    intervals: &[i32],
    probability: f64,
    range: &PitchRange,
    config: &EmbellishConfig,
    rng: &mut R,
) -> Vec<NoteEvent> {
    if probability.is_nan() || !rng.gen_bool(probability.clamp(0.0, 1.0)) {
        return Vec::new();
    }

    intervals
        .iter()
        .enumerate()
        .filter_map(|(index, &interval)| {
            let pitch = root.pitch as i32 + interval;
            if !range.contains(pitch) {
                return None;
            }
            let i = index as f64;
            let gain = config.velocity_base + i * config.velocity_step;
            let velocity = (root.velocity as f64 * gain).round().clamp(1.0, 127.0) as u8;
            Some(NoteEvent {
                pitch: pitch as u8,
                velocity,
                duration: root.duration * config.duration_factor,
                offset: root.offset + config.stagger_base + i * config.stagger_step,
            })
        })
        .collect()
}
