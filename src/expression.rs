//! Velocity and duration, with a little humanizing jitter.

use rand::Rng;

use crate::config::MoodConfig;

/// Jitter magnitudes. Velocity jitter is uniform in `±velocity_jitter`,
/// duration jitter is a uniform factor in `1 ± duration_jitter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpressionConfig {
    pub velocity_jitter: f64,
    pub duration_jitter: f64,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            velocity_jitter: 4.0,
            duration_jitter: 0.015,
        }
    }
}

#[cfg(test)]
impl ExpressionConfig {
    /// No jitter at all.
    pub fn exact() -> Self {
        Self {
            velocity_jitter: 0.0,
            duration_jitter: 0.0,
        }
    }
}

/// Velocity in `[1, 127]` for a given intensity in `[0, 1]`.
pub fn velocity<R: Rng>(
    config: &MoodConfig,
    intensity: f64,
    expression: &ExpressionConfig,
    rng: &mut R,
) -> u8 {
    let (min, max) = config.velocity_range;
    let intensity = intensity.clamp(0.0, 1.0);
    let jitter = symmetric(rng, expression.velocity_jitter);
    let value = (min as f64 + intensity * (max as f64 - min as f64) + jitter).floor();
    value.clamp(1.0, 127.0) as u8
}

/// Seconds a note is held: one beat scaled by legato.
pub fn duration<R: Rng>(
    config: &MoodConfig,
    expression: &ExpressionConfig,
    rng: &mut R,
) -> f64 {
    let beat = 60.0 / config.tempo_bpm;
    let factor = 1.0 + symmetric(rng, expression.duration_jitter.clamp(0.0, 0.5));
    (beat * config.legato * factor).max(f64::EPSILON)
}

fn symmetric<R: Rng>(rng: &mut R, magnitude: f64) -> f64 {
    if magnitude > 0.0 {
        rng.gen_range(-magnitude..=magnitude)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(vel: (u8, u8), bpm: f64, legato: f64) -> MoodConfig {
        MoodConfig {
            scale_name: "C_major".into(),
            tempo_bpm: bpm,
            step_divisor: 1,
            velocity_range: vel,
            legato,
            chord_intervals: None,
            embellish_probability: 0.3,
        }
    }

    #[test]
    fn exact_velocity_follows_intensity() {
        let cfg = config((55, 75), 78.0, 1.2);
        let mut rng = StdRng::seed_from_u64(1);
        let exact = ExpressionConfig::exact();
        assert_eq!(velocity(&cfg, 0.0, &exact, &mut rng), 55);
        assert_eq!(velocity(&cfg, 0.5, &exact, &mut rng), 65);
        assert_eq!(velocity(&cfg, 1.0, &exact, &mut rng), 75);
    }

    #[test]
    fn jittered_velocity_stays_in_band_and_midi_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let expression = ExpressionConfig::default();
        let cfg = config((70, 85), 120.0, 0.7);
        for _ in 0..500 {
            let v = velocity(&cfg, 1.0, &expression, &mut rng);
            assert!((81..=89).contains(&v), "{v}");
        }
        let loud = config((120, 127), 120.0, 0.7);
        let quiet = config((0, 2), 120.0, 0.7);
        for _ in 0..500 {
            assert!(velocity(&loud, 1.0, &expression, &mut rng) <= 127);
            assert!(velocity(&quiet, 0.0, &expression, &mut rng) >= 1);
        }
    }

    #[test]
    fn duration_is_beat_times_legato() {
        let mut rng = StdRng::seed_from_u64(3);
        let cfg = config((70, 85), 120.0, 0.7);
        let exact = duration(&cfg, &ExpressionConfig::exact(), &mut rng);
        assert!((exact - 0.35).abs() < 1e-9);

        for _ in 0..200 {
            let d = duration(&cfg, &ExpressionConfig::default(), &mut rng);
            assert!(d > 0.0);
            assert!((d - 0.35).abs() <= 0.35 * 0.015 + 1e-9);
        }
    }
}
