use crate::coords::GridCell;
use crate::mood::Mood;

/// Collapses a stream of pointer samples into discrete cell entries.
///
/// A sample only counts as an entry when it resolves to a different cell than
/// the last entry. Leaving the canvas forgets the last cell, so coming back
/// into the same cell triggers again.
#[derive(Debug, Default, Clone)]
pub struct GridQuantizer {
    last_cell: Option<GridCell>,
    last_region: Option<Mood>,
}

impl GridQuantizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell if this sample enters it.
    pub fn observe(&mut self, cell: GridCell) -> Option<GridCell> {
        if self.last_cell == Some(cell) {
            return None;
        }
        self.last_cell = Some(cell);
        Some(cell)
    }

    /// Records the region of the latest sample; returns `true` if it changed.
    pub fn observe_region(&mut self, region: Option<Mood>) -> bool {
        let changed = self.last_region != region;
        self.last_region = region;
        changed
    }

    pub fn last_cell(&self) -> Option<GridCell> {
        self.last_cell
    }

    pub fn last_region(&self) -> Option<Mood> {
        self.last_region
    }

    /// Pointer left the canvas.
    pub fn reset(&mut self) {
        self.last_cell = None;
        self.last_region = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_in_same_cell_are_suppressed() {
        let mut q = GridQuantizer::new();
        let a = GridCell::new(3, 4);
        assert_eq!(q.observe(a), Some(a));
        assert_eq!(q.observe(a), None);
        assert_eq!(q.observe(a), None);
        let b = GridCell::new(4, 4);
        assert_eq!(q.observe(b), Some(b));
        assert_eq!(q.observe(a), Some(a));
    }

    #[test]
    fn reset_allows_immediate_retrigger() {
        let mut q = GridQuantizer::new();
        let a = GridCell::new(0, 0);
        q.observe(a);
        q.reset();
        assert_eq!(q.last_cell(), None);
        assert_eq!(q.observe(a), Some(a));
    }

    #[test]
    fn region_changes_are_reported_once() {
        let mut q = GridQuantizer::new();
        assert!(q.observe_region(Some(Mood::Calm)));
        assert!(!q.observe_region(Some(Mood::Calm)));
        assert!(q.observe_region(None));
        assert_eq!(q.last_region(), None);
    }
}
