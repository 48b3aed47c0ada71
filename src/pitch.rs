//! Deterministic cell → pitch mapping.
//!
//! Columns walk through the scale left to right; rows pick an octave band,
//! with the highest band at the top of the canvas.

use crate::config::Scale;
use crate::coords::GridCell;

/// Inclusive MIDI pitch bounds for emitted notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchRange {
    low: u8,
    high: u8,
}

impl PitchRange {
    /// Bounds are clamped into `[0, 127]` and swapped if given in reverse.
    pub fn new(low: u8, high: u8) -> Self {
        let (low, high) = (low.min(127), high.min(127));
        if low <= high {
            Self { low, high }
        } else {
            Self { low: high, high: low }
        }
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn clamp(&self, pitch: i32) -> u8 {
        pitch.clamp(self.low as i32, self.high as i32) as u8
    }

    pub fn contains(&self, pitch: i32) -> bool {
        (self.low as i32..=self.high as i32).contains(&pitch)
    }
}

impl Default for PitchRange {
    fn default() -> Self {
        Self::new(48, 84)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchConfig {
    pub range: PitchRange,
    /// Number of octave bands stacked vertically.
    pub octave_bands: u32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            range: PitchRange::default(),
            octave_bands: 3,
        }
    }
}

/// Scale degree from the column, octave band from the row, clamped to the
/// configured range. Unlike the bare `floor((1 - row / height) * bands)`, row 0
/// stays in the top band instead of reaching one band past it.
pub fn map_pitch(
    cell: GridCell,
    scale: &Scale,
    grid_width: u32,
    grid_height: u32,
    config: &PitchConfig,
) -> u8 {
    let len = scale.notes().len();
    let grid_width = grid_width.max(1);
    let grid_height = grid_height.max(1);

    let index = ((cell.col as f64 / grid_width as f64) * len as f64).floor() as usize;
    let base = scale.notes()[index.min(len - 1)];

    // The top row would land one band past the last; keep it in the top band.
    let bands = config.octave_bands.max(1);
    let band = ((1.0 - cell.row as f64 / grid_height as f64) * bands as f64).floor() as u32;
    let octave_offset = band.min(bands - 1) as i32 * 12;

    config.range.clamp(base as i32 + octave_offset)
}
