//! Self-expiring highlight effects, one slot per cell.
//!
//! The scheduler is an arena keyed by cell. "Cancelling a timer" means
//! dropping the slot: an expired or replaced handle can never fire later
//! because expiry only looks at what is still in the arena.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::coords::GridCell;
use crate::mood::Mood;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectHandle {
    pub cell: GridCell,
    pub mood: Mood,
    /// Distinguishes a re-trigger from the effect it replaced.
    pub id: u64,
    pub started_at: Instant,
    pub expires_at: Instant,
}

impl EffectHandle {
    /// Fraction of the lifetime already elapsed, in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.expires_at.saturating_duration_since(self.started_at);
        if total.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
    }
}

#[derive(Debug)]
pub struct EffectScheduler {
    lifetime: Duration,
    pending: HashMap<GridCell, EffectHandle>,
    next_id: u64,
}

impl EffectScheduler {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Starts a highlight on `cell`, cancelling any still-pending one there.
    pub fn trigger(&mut self, cell: GridCell, mood: Mood, now: Instant) -> EffectHandle {
        let handle = EffectHandle {
            cell,
            mood,
            id: self.next_id,
            started_at: now,
            expires_at: now + self.lifetime,
        };
        self.next_id += 1;
        if let Some(old) = self.pending.insert(cell, handle) {
            debug!("Replaced effect {} on ({}, {})", old.id, cell.col, cell.row);
        }
        handle
    }

    /// Removes and returns every effect whose lifetime has elapsed by `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<EffectHandle> {
        let mut expired = Vec::new();
        self.pending.retain(|_, handle| {
            if handle.expires_at <= now {
                expired.push(*handle);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Cancels every pending effect; returns how many there were.
    pub fn clear_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn get(&self, cell: GridCell) -> Option<&EffectHandle> {
        self.pending.get(&cell)
    }

    pub fn active(&self) -> impl Iterator<Item = &EffectHandle> {
        self.pending.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIFETIME: Duration = Duration::from_millis(1500);

    #[test]
    fn retrigger_replaces_instead_of_stacking() {
        let mut fx = EffectScheduler::new(LIFETIME);
        let t0 = Instant::now();
        let cell = GridCell::new(2, 3);
        let first = fx.trigger(cell, Mood::Happy, t0);
        let second = fx.trigger(cell, Mood::Calm, t0 + Duration::from_millis(500));
        assert_eq!(fx.pending(), 1);
        assert_ne!(first.id, second.id);
        assert_eq!(fx.get(cell).unwrap().mood, Mood::Calm);

        // The first trigger's deadline passes without anything expiring.
        assert!(fx.expire(t0 + LIFETIME).is_empty());
        let expired = fx.expire(t0 + Duration::from_millis(2000));
        assert_eq!(expired, vec![second]);
        assert_eq!(fx.pending(), 0);
    }

    #[test]
    fn expiry_is_per_cell() {
        let mut fx = EffectScheduler::new(LIFETIME);
        let t0 = Instant::now();
        fx.trigger(GridCell::new(0, 0), Mood::Sad, t0);
        fx.trigger(GridCell::new(1, 0), Mood::Sad, t0 + Duration::from_millis(1000));
        let expired = fx.expire(t0 + Duration::from_millis(1600));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].cell, GridCell::new(0, 0));
        assert!(fx.get(GridCell::new(1, 0)).is_some());
    }

    #[test]
    fn clear_all_empties_the_arena() {
        let mut fx = EffectScheduler::new(LIFETIME);
        let t0 = Instant::now();
        for col in 0..5 {
            fx.trigger(GridCell::new(col, 1), Mood::Tense, t0);
        }
        assert_eq!(fx.clear_all(), 5);
        assert_eq!(fx.pending(), 0);
        assert!(fx.expire(t0 + LIFETIME * 2).is_empty());
    }

    #[test]
    fn progress_runs_from_zero_to_one() {
        let mut fx = EffectScheduler::new(LIFETIME);
        let t0 = Instant::now();
        let handle = fx.trigger(GridCell::new(0, 0), Mood::Happy, t0);
        assert_eq!(handle.progress(t0), 0.0);
        assert!((handle.progress(t0 + Duration::from_millis(750)) - 0.5).abs() < 1e-3);
        assert_eq!(handle.progress(t0 + LIFETIME * 3), 1.0);
    }
}
