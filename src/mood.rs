use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The emotional regions of the canvas.
///
/// Declaration order matters: whenever a position sits exactly on a region
/// boundary, classifiers resolve the tie in favour of the mood that comes first
/// in [`Mood::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Tense,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Calm, Mood::Tense, Mood::Sad];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Tense => "tense",
            Mood::Sad => "sad",
        }
    }

    /// Text shown by the mood display.
    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Tense => "Tense",
            Mood::Sad => "Sad",
        }
    }

    /// Highlight colour as RGB.
    pub fn color(self) -> [u8; 3] {
        match self {
            Mood::Happy => [255, 213, 79],
            Mood::Calm => [79, 195, 247],
            Mood::Tense => [244, 67, 54],
            Mood::Sad => [92, 107, 192],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mood '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Happy".parse::<Mood>(), Ok(Mood::Happy));
        assert_eq!("sad".parse::<Mood>(), Ok(Mood::Sad));
        assert!("excited".parse::<Mood>().is_err());
    }

    #[test]
    fn declaration_order_is_tie_break_order() {
        assert!(Mood::Happy < Mood::Calm);
        assert!(Mood::Tense < Mood::Sad);
        assert_eq!(Mood::ALL[0], Mood::Happy);
    }
}
