//! Mood and scale tables, plus the canvas-wide configuration.
//!
//! Mood tables come from a [`ConfigSource`]. Whatever the source, every entry
//! is validated before use: a mood whose entry lacks one of the required
//! fields (scale, bpm, step, vel, legato) or names an unknown scale stays
//! unresolved, and cell entries in that mood are silent.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::expression::ExpressionConfig;
use crate::harmony::EmbellishConfig;
use crate::mood::Mood;
use crate::pitch::PitchConfig;
use crate::region::RegionStrategy;

/// Whether a scale is heard as major or minor; picks the default triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Major,
    Minor,
    #[default]
    #[serde(other)]
    Other,
}

/// An ascending sequence of MIDI pitches reachable in one mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    notes: Vec<u8>,
    kind: ScaleKind,
}

impl Scale {
    pub fn new(notes: Vec<u8>, kind: ScaleKind) -> Result<Self, ConfigError> {
        if notes.is_empty() {
            return Err(ConfigError::Invalid("scale has no notes".into()));
        }
        if notes.iter().any(|&n| n > 127) {
            return Err(ConfigError::Invalid("scale note outside MIDI range".into()));
        }
        Ok(Self { notes, kind })
    }

    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Note at `index`, wrapping around the scale length.
    pub fn note(&self, index: usize) -> u8 {
        self.notes[index % self.notes.len()]
    }
}

/// Validated musical settings for one mood. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodConfig {
    pub scale_name: String,
    pub tempo_bpm: f64,
    pub step_divisor: u32,
    pub velocity_range: (u8, u8),
    pub legato: f64,
    pub chord_intervals: Option<Vec<i32>>,
    pub embellish_probability: f64,
}

impl MoodConfig {
    /// Checks the values every note computation relies on: a positive tempo
    /// and legato, a non-zero step divisor, an ordered velocity range and a
    /// probability in `[0, 1]`.
    pub fn check(&self, mood: Mood) -> Result<(), ConfigError> {
        let invalid = |what: String| Err(ConfigError::Invalid(format!("{mood}: {what}")));

        if !(self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0) {
            return invalid("bpm must be positive".into());
        }
        if self.step_divisor == 0 {
            return invalid("step must be at least 1".into());
        }
        let (min_vel, max_vel) = self.velocity_range;
        if min_vel > max_vel || max_vel > 127 {
            return invalid(format!(
                "velocity range [{min_vel}, {max_vel}] is not within [0, 127]"
            ));
        }
        if !(self.legato.is_finite() && self.legato > 0.0) {
            return invalid("legato must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.embellish_probability) {
            return invalid("embellish must be within [0, 1]".into());
        }
        Ok(())
    }
}

/// A mood entry as delivered by a source, before validation.
///
/// Field names follow the `/moods` payload (`bpm`, `step`, `scale`, `vel`,
/// `legato`); unknown keys such as `palette` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMoodConfig {
    pub scale: Option<String>,
    pub bpm: Option<f64>,
    pub step: Option<u32>,
    pub vel: Option<[u8; 2]>,
    pub legato: Option<f64>,
    #[serde(default)]
    pub chord: Option<Vec<i32>>,
    #[serde(default)]
    pub embellish: Option<f64>,
}

impl RawMoodConfig {
    pub fn validate(&self, mood: Mood) -> Result<MoodConfig, ConfigError> {
        let missing = |field: &str| ConfigError::Invalid(format!("{mood}: missing '{field}'"));

        let scale_name = self.scale.clone().ok_or_else(|| missing("scale"))?;
        let tempo_bpm = self.bpm.ok_or_else(|| missing("bpm"))?;
        let step_divisor = self.step.ok_or_else(|| missing("step"))?;
        let [min_vel, max_vel] = self.vel.ok_or_else(|| missing("vel"))?;
        let legato = self.legato.ok_or_else(|| missing("legato"))?;

        let embellish_probability = match self.embellish {
            Some(p) if p.is_nan() => {
                return Err(ConfigError::Invalid(format!("{mood}: embellish is not a number")))
            }
            Some(p) => p.clamp(0.0, 1.0),
            None => default_embellish_probability(mood),
        };

        let config = MoodConfig {
            scale_name,
            tempo_bpm,
            step_divisor,
            velocity_range: (min_vel, max_vel),
            legato,
            chord_intervals: self.chord.clone(),
            embellish_probability,
        };
        config.check(mood)?;
        Ok(config)
    }
}

/// Chance that a sounding note also gets chord tones.
pub fn default_embellish_probability(mood: Mood) -> f64 {
    match mood {
        Mood::Happy => 0.35,
        Mood::Calm => 0.25,
        Mood::Tense => 0.3,
        Mood::Sad => 0.2,
    }
}

/// Where mood and scale tables come from. Either call may fail; the caller
/// recovers with the built-in table.
pub trait ConfigSource {
    fn mood_configs(&self) -> Result<HashMap<Mood, RawMoodConfig>, ConfigError>;
    fn scale(&self, name: &str) -> Result<Scale, ConfigError>;
}

/// The table used when no other source is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConfig;

fn raw(scale: &str, bpm: f64, step: u32, vel: [u8; 2], legato: f64) -> RawMoodConfig {
    RawMoodConfig {
        scale: Some(scale.to_string()),
        bpm: Some(bpm),
        step: Some(step),
        vel: Some(vel),
        legato: Some(legato),
        chord: None,
        embellish: None,
    }
}

impl ConfigSource for BuiltinConfig {
    fn mood_configs(&self) -> Result<HashMap<Mood, RawMoodConfig>, ConfigError> {
        Ok(HashMap::from([
            (Mood::Happy, raw("C_major", 120.0, 1, [70, 85], 0.7)),
            (Mood::Calm, raw("G_major", 80.0, 2, [50, 65], 1.2)),
            (Mood::Tense, raw("E_minor", 100.0, 1, [60, 75], 0.5)),
            (Mood::Sad, raw("A_minor", 70.0, 2, [45, 60], 1.0)),
        ]))
    }

    fn scale(&self, name: &str) -> Result<Scale, ConfigError> {
        let (notes, kind): (&[u8], ScaleKind) = match name {
            "C_ionian" => (&[60, 62, 64, 65, 67, 69, 71], ScaleKind::Major),
            "G_pentatonic" => (&[55, 57, 59, 62, 64], ScaleKind::Major),
            "E_phrygian" => (&[64, 65, 67, 69, 71, 72, 74], ScaleKind::Minor),
            "A_aeolian" => (&[57, 59, 60, 62, 64, 65, 67], ScaleKind::Minor),
            "D_dorian" => (&[62, 64, 65, 67, 69, 71, 72], ScaleKind::Minor),
            "C_major" => (&[60, 62, 64, 65, 67, 69, 71, 72], ScaleKind::Major),
            "G_major" => (&[55, 57, 59, 60, 62, 64, 66, 67], ScaleKind::Major),
            "E_minor" => (&[52, 54, 55, 57, 59, 60, 62, 64], ScaleKind::Minor),
            "A_minor" => (&[57, 59, 60, 62, 64, 65, 67, 69], ScaleKind::Minor),
            _ => return Err(ConfigError::UnknownScale(name.to_string())),
        };
        Scale::new(notes.to_vec(), kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawScale {
    notes: Vec<u8>,
    #[serde(rename = "type", default)]
    kind: ScaleKind,
}

/// Entries stay untyped until looked up, so one malformed mood or scale does
/// not take the rest of the document down with it.
#[derive(Debug, Deserialize)]
struct ConfigDocument {
    moods: HashMap<String, serde_json::Value>,
    #[serde(default)]
    scales: HashMap<String, serde_json::Value>,
}

/// Mood tables read from a JSON document:
///
/// ```json
/// { "moods":  { "happy": { "bpm": 120, "step": 1, "scale": "C_major", "vel": [70, 85], "legato": 0.7 } },
///   "scales": { "C_major": { "notes": [60, 62, 64, 65, 67, 69, 71, 72], "type": "major" } } }
/// ```
///
/// Scales the document does not define are looked up in the built-in catalogue.
#[derive(Debug)]
pub struct JsonConfigSource {
    document: ConfigDocument,
}

impl JsonConfigSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let document = serde_json::from_str(text)?;
        Ok(Self { document })
    }
}

impl ConfigSource for JsonConfigSource {
    fn mood_configs(&self) -> Result<HashMap<Mood, RawMoodConfig>, ConfigError> {
        let mut configs = HashMap::new();
        for (name, entry) in &self.document.moods {
            let Ok(mood) = name.parse::<Mood>() else {
                debug!("Ignoring config for unsupported mood '{}'", name);
                continue;
            };
            match RawMoodConfig::deserialize(entry) {
                Ok(raw) => {
                    configs.insert(mood, raw);
                }
                Err(e) => warn!("Malformed config for mood {}: {}", mood, e),
            }
        }
        Ok(configs)
    }

    fn scale(&self, name: &str) -> Result<Scale, ConfigError> {
        match self.document.scales.get(name) {
            Some(entry) => {
                let raw = RawScale::deserialize(entry)?;
                Scale::new(raw.notes, raw.kind)
            }
            None => BuiltinConfig.scale(name),
        }
    }
}

/// A mood's validated config together with its resolved scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMood {
    pub config: MoodConfig,
    pub scale: Scale,
}

/// Every mood that is ready to make sound.
#[derive(Debug, Clone, Default)]
pub struct MoodLibrary {
    moods: HashMap<Mood, ResolvedMood>,
}

impl MoodLibrary {
    pub fn builtin() -> Self {
        Self::load(&BuiltinConfig)
    }

    /// Resolves every mood from `source`, falling back to the built-in table if
    /// the source cannot deliver mood configs at all.
    pub fn load(source: &dyn ConfigSource) -> Self {
        match Self::try_load(source) {
            Ok(library) => library,
            Err(e) => {
                warn!("{}; using built-in mood table", e);
                Self::try_load(&BuiltinConfig).unwrap_or_default()
            }
        }
    }

    fn try_load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let raw = source.mood_configs()?;
        let mut moods = HashMap::new();

        for mood in Mood::ALL {
            let Some(entry) = raw.get(&mood) else {
                warn!("No config for mood {}; it will stay silent", mood);
                continue;
            };
            let resolved = entry.validate(mood).and_then(|config| {
                let scale = source.scale(&config.scale_name)?;
                Ok(ResolvedMood { config, scale })
            });
            match resolved {
                Ok(resolved) => {
                    moods.insert(mood, resolved);
                }
                Err(e) => warn!("Skipping mood {}: {}", mood, e),
            }
        }

        info!("Loaded {} mood configs", moods.len());
        Ok(Self { moods })
    }

    pub fn get(&self, mood: Mood) -> Option<&ResolvedMood> {
        self.moods.get(&mood)
    }

    pub fn len(&self) -> usize {
        self.moods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moods.is_empty()
    }

    /// Replaces one mood's entry. An entry that fails [`MoodConfig::check`] is
    /// refused and the mood is left without a config, so it stays silent.
    pub fn insert(&mut self, mood: Mood, resolved: ResolvedMood) -> Result<(), ConfigError> {
        if let Err(e) = resolved.config.check(mood) {
            self.moods.remove(&mood);
            warn!("Rejected config for mood {}: {}", mood, e);
            return Err(e);
        }
        self.moods.insert(mood, resolved);
        Ok(())
    }
}

/// Canvas-wide settings chosen by the host at construction time.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Size of the logical canvas that pointer positions are mapped into.
    pub design_width: f32,
    pub design_height: f32,
    pub regions: RegionStrategy,
    pub pitch: PitchConfig,
    pub expression: ExpressionConfig,
    pub embellish: EmbellishConfig,
    pub effect_lifetime: Duration,
    /// Capture audio while composing.
    pub record: bool,
    /// Seed for the humanization RNG; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_width: 22,
            grid_height: 12,
            design_width: 1584.0,
            design_height: 864.0,
            regions: RegionStrategy::AxisDominance,
            pitch: PitchConfig::default(),
            expression: ExpressionConfig::default(),
            embellish: EmbellishConfig::default(),
            effect_lifetime: Duration::from_millis(1500),
            record: true,
            seed: None,
        }
    }
}
