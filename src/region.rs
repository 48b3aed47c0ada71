//! Which mood region a normalized canvas position falls in.
//!
//! All strategies are pure. Positions are normalized so that `(0, 0)` is the
//! top-left corner and `(1, 1)` the bottom-right; anything outside that square
//! (or non-finite) classifies as no mood. Region predicates are closed, so a
//! point on a boundary belongs to every adjacent region, and the first of them
//! in [`Mood::ALL`] order wins.

use crate::mood::Mood;

/// Anchors for [`RegionStrategy::AnchorDistance`], as offsets from `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorLayout {
    pub origin: (f32, f32),
    pub anchors: [(Mood, (f32, f32)); 4],
}

impl Default for AnchorLayout {
    /// Happy above the centre, calm right, tense below, sad left.
    fn default() -> Self {
        Self {
            origin: (0.5, 0.5),
            anchors: [
                (Mood::Happy, (0.0, -0.1)),
                (Mood::Calm, (0.1, 0.0)),
                (Mood::Tense, (0.0, 0.1)),
                (Mood::Sad, (-0.1, 0.0)),
            ],
        }
    }
}

/// The region partitioning policy, chosen once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionStrategy {
    /// Nearest anchor to the offset from a drag origin.
    AnchorDistance(AnchorLayout),
    /// Four triangles cut by both diagonals: happy top, calm right, tense
    /// bottom, sad left.
    Diagonal,
    /// Happy top-right, calm bottom-right, tense bottom-left, sad top-left.
    Quadrant,
    /// The axis with the larger offset from the centre decides: up happy,
    /// down sad, left calm, right tense.
    AxisDominance,
}

impl RegionStrategy {
    pub fn classify(&self, x: f32, y: f32) -> Option<Mood> {
        if !(x.is_finite() && y.is_finite()) || !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return None;
        }
        match self {
            RegionStrategy::AnchorDistance(layout) => nearest_anchor(layout, x, y),
            _ => Mood::ALL.into_iter().find(|&mood| self.contains(mood, x, y)),
        }
    }

    fn contains(&self, mood: Mood, x: f32, y: f32) -> bool {
        match self {
            RegionStrategy::Diagonal => {
                // `s` is the anti-diagonal side, `d` the main-diagonal side.
                let s = x + y - 1.0;
                let d = x - y;
                match mood {
                    Mood::Happy => s <= 0.0 && d >= 0.0,
                    Mood::Calm => s >= 0.0 && d >= 0.0,
                    Mood::Tense => s >= 0.0 && d <= 0.0,
                    Mood::Sad => s <= 0.0 && d <= 0.0,
                }
            }
            RegionStrategy::Quadrant => match mood {
                Mood::Happy => x >= 0.5 && y <= 0.5,
                Mood::Calm => x >= 0.5 && y >= 0.5,
                Mood::Tense => x <= 0.5 && y >= 0.5,
                Mood::Sad => x <= 0.5 && y <= 0.5,
            },
            RegionStrategy::AxisDominance => {
                let dx = x - 0.5;
                let dy = y - 0.5;
                let vertical = dy.abs() >= dx.abs();
                let horizontal = dx.abs() >= dy.abs();
                match mood {
                    Mood::Happy => vertical && dy <= 0.0,
                    Mood::Sad => vertical && dy >= 0.0,
                    Mood::Tense => horizontal && dx >= 0.0,
                    Mood::Calm => horizontal && dx <= 0.0,
                }
            }
            RegionStrategy::AnchorDistance(_) => false,
        }
    }
}

fn nearest_anchor(layout: &AnchorLayout, x: f32, y: f32) -> Option<Mood> {
    let offset = (x - layout.origin.0, y - layout.origin.1);
    let mut best: Option<(Mood, f32)> = None;
    for mood in Mood::ALL {
        let Some(&(_, anchor)) = layout.anchors.iter().find(|(m, _)| *m == mood) else {
            continue;
        };
        let distance = (offset.0 - anchor.0).hypot(offset.1 - anchor.1);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((mood, distance));
        }
    }
    best.map(|(mood, _)| mood)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_regions() {
        let q = RegionStrategy::Quadrant;
        assert_eq!(q.classify(0.8, 0.2), Some(Mood::Happy));
        assert_eq!(q.classify(0.8, 0.8), Some(Mood::Calm));
        assert_eq!(q.classify(0.2, 0.8), Some(Mood::Tense));
        assert_eq!(q.classify(0.2, 0.2), Some(Mood::Sad));
    }

    #[test]
    fn boundaries_resolve_in_declaration_order() {
        assert_eq!(RegionStrategy::Quadrant.classify(0.5, 0.5), Some(Mood::Happy));
        assert_eq!(RegionStrategy::Quadrant.classify(0.2, 0.5), Some(Mood::Tense));
        assert_eq!(RegionStrategy::Diagonal.classify(0.5, 0.5), Some(Mood::Happy));
        assert_eq!(RegionStrategy::AxisDominance.classify(0.5, 0.5), Some(Mood::Happy));
        // On the lower-left diagonal both calm and sad apply.
        assert_eq!(RegionStrategy::AxisDominance.classify(0.25, 0.75), Some(Mood::Calm));
        let anchors = RegionStrategy::AnchorDistance(AnchorLayout::default());
        assert_eq!(anchors.classify(0.5, 0.5), Some(Mood::Happy));
    }

    #[test]
    fn diagonal_triangles() {
        let d = RegionStrategy::Diagonal;
        assert_eq!(d.classify(0.5, 0.1), Some(Mood::Happy));
        assert_eq!(d.classify(0.9, 0.5), Some(Mood::Calm));
        assert_eq!(d.classify(0.5, 0.9), Some(Mood::Tense));
        assert_eq!(d.classify(0.1, 0.5), Some(Mood::Sad));
    }

    #[test]
    fn axis_dominance() {
        let a = RegionStrategy::AxisDominance;
        assert_eq!(a.classify(0.55, 0.05), Some(Mood::Happy));
        assert_eq!(a.classify(0.45, 0.95), Some(Mood::Sad));
        assert_eq!(a.classify(0.05, 0.45), Some(Mood::Calm));
        assert_eq!(a.classify(0.95, 0.55), Some(Mood::Tense));
    }

    #[test]
    fn anchor_distance_picks_nearest() {
        let a = RegionStrategy::AnchorDistance(AnchorLayout::default());
        assert_eq!(a.classify(0.5, 0.1), Some(Mood::Happy));
        assert_eq!(a.classify(0.9, 0.45), Some(Mood::Calm));
        assert_eq!(a.classify(0.52, 0.9), Some(Mood::Tense));
        assert_eq!(a.classify(0.0, 0.5), Some(Mood::Sad));
    }

    #[test]
    fn outside_unit_square_is_no_mood() {
        for strategy in [
            RegionStrategy::Quadrant,
            RegionStrategy::Diagonal,
            RegionStrategy::AxisDominance,
            RegionStrategy::AnchorDistance(AnchorLayout::default()),
        ] {
            assert_eq!(strategy.classify(1.2, 0.5), None);
            assert_eq!(strategy.classify(0.5, -0.01), None);
            assert_eq!(strategy.classify(f32::NAN, 0.5), None);
        }
    }
}
