//! Tuning constants for the portrait effect.
//!
//! Every stage reads its constants from a single [`PortraitConfig`]. The
//! defaults reproduce the reference look; all of them are cosmetic and can be
//! overridden with the `with_*` setters or loaded from a JSON file.
//!
//! ```ignore
//! let config = PortraitConfig::default()
//!     .with_gap(4)
//!     .with_fill_increment(0.002)
//!     .with_seed(7);
//! config.validate()?;
//! config.save("portrait.json")?;
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::surface::Rgb;

/// Complete configuration of a [`Portrait`](crate::Portrait).
///
/// Per-frame quantities (velocities, gravity, decay) are expressed per tick,
/// distances in logical pixels.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortraitConfig {
    // Sampling
    /// Sampling stride in pixels on both axes. Smaller is denser.
    pub gap: u32,
    /// Base particle radius; brightness adds up to one more pixel.
    pub particle_size: f32,
    /// Pixels with alpha below this are skipped.
    pub alpha_floor: u8,
    /// Pixels with mean brightness below this are skipped.
    pub brightness_floor: f32,
    /// Pixels darker than this get `shadow_tint` added.
    pub shadow_threshold: f32,
    pub shadow_tint: [u8; 3],
    /// Particle count of the fallback field used when no image is available.
    pub placeholder_count: usize,

    // Palette
    pub accent: Rgb,
    pub water_color: Rgb,

    // Drops
    pub drops_per_frame: u32,
    pub gravity: f32,
    /// Water level gained per landed drop.
    pub fill_increment: f32,
    /// Horizontal half-width of the spout.
    pub spout_spread: f32,
    /// Max horizontal jitter applied to falling drops each frame.
    pub drop_wobble: f32,
    /// Trail length as a multiple of the drop's velocity.
    pub trail_length: f32,

    // Splashes
    pub splash_burst: u32,
    /// Life lost per frame (life starts at 1).
    pub splash_life_step: f32,

    // Bubbles
    /// Chance that a landed drop releases a bubble.
    pub bubble_chance: f32,
    /// Bubbles spawned by a trigger.
    pub bubble_burst: u32,
    pub bubble_rise: f32,
    /// Per-frame size multiplier, in (0, 1).
    pub bubble_shrink: f32,
    pub bubble_min_size: f32,
    pub bubble_wobble: f32,

    // Wave overlay
    /// Amplitude set by a trigger.
    pub wave_amplitude: f32,
    /// Per-frame amplitude multiplier, in (0, 1).
    pub wave_decay: f32,
    /// Amplitudes at or below this are treated as zero.
    pub wave_threshold: f32,
    /// Spatial frequency of the wave along x (radians per pixel).
    pub wave_frequency: f32,
    /// Temporal frequency of the wave (radians per frame).
    pub wave_speed: f32,

    // Particle field
    /// Fraction of the distance to target added to velocity each frame.
    pub follow_rate: f32,
    /// Velocity multiplier applied after each move.
    pub friction: f32,
    /// Idle float angular speed (radians per frame).
    pub float_speed: f32,
    /// Maximum idle float radius.
    pub float_radius: f32,
    /// Half-height of the glowing band around the water line, as a fraction
    /// of surface height.
    pub glow_band: f32,

    // Phases
    /// Frames spent in `complete` before going idle.
    pub complete_delay: u32,

    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PortraitConfig {
    fn default() -> Self {
        Self {
            gap: 3,
            particle_size: 2.0,
            alpha_floor: 50,
            brightness_floor: 15.0,
            shadow_threshold: 80.0,
            shadow_tint: [10, 30, 25],
            placeholder_count: 2000,

            accent: Rgb::new(0, 245, 212),
            water_color: Rgb::new(0, 187, 249),

            drops_per_frame: 2,
            gravity: 0.25,
            fill_increment: 0.001,
            spout_spread: 6.0,
            drop_wobble: 0.3,
            trail_length: 3.0,

            splash_burst: 4,
            splash_life_step: 0.04,

            bubble_chance: 0.15,
            bubble_burst: 15,
            bubble_rise: 1.0,
            bubble_shrink: 0.985,
            bubble_min_size: 0.5,
            bubble_wobble: 1.5,

            wave_amplitude: 20.0,
            wave_decay: 0.95,
            wave_threshold: 0.5,
            wave_frequency: 0.02,
            wave_speed: 0.15,

            follow_rate: 0.08,
            friction: 0.9,
            float_speed: 0.02,
            float_radius: 1.5,
            glow_band: 0.02,

            complete_delay: 90,

            seed: None,
        }
    }
}

impl PortraitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_particle_size(mut self, size: f32) -> Self {
        self.particle_size = size;
        self
    }

    pub fn with_fill_increment(mut self, increment: f32) -> Self {
        self.fill_increment = increment;
        self
    }

    pub fn with_drops_per_frame(mut self, count: u32) -> Self {
        self.drops_per_frame = count;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_wave_decay(mut self, decay: f32) -> Self {
        self.wave_decay = decay;
        self
    }

    pub fn with_bubble_burst(mut self, count: u32) -> Self {
        self.bubble_burst = count;
        self
    }

    pub fn with_complete_delay(mut self, frames: u32) -> Self {
        self.complete_delay = frames;
        self
    }

    /// Alpha and brightness floors used while sampling.
    pub fn with_thresholds(mut self, alpha_floor: u8, brightness_floor: f32) -> Self {
        self.alpha_floor = alpha_floor;
        self.brightness_floor = brightness_floor;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every constant is in a range the simulation can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, what: &str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid(what.to_string()))
            }
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        let unit_open = |v: f32| v.is_finite() && v > 0.0 && v < 1.0;

        check(self.gap >= 1, "gap must be at least 1")?;
        check(self.placeholder_count >= 1, "placeholder_count must be at least 1")?;
        check(positive(self.particle_size), "particle_size must be positive")?;
        check(
            self.brightness_floor.is_finite() && self.shadow_threshold.is_finite(),
            "brightness thresholds must be finite",
        )?;
        check(
            positive(self.fill_increment) && self.fill_increment <= 1.0,
            "fill_increment must be in (0, 1]",
        )?;
        check(self.gravity.is_finite() && self.gravity >= 0.0, "gravity must be non-negative")?;
        check(
            self.spout_spread.is_finite() && self.spout_spread >= 0.0,
            "spout_spread must be non-negative",
        )?;
        check(
            self.drop_wobble.is_finite() && self.drop_wobble >= 0.0,
            "drop_wobble must be non-negative",
        )?;
        check(positive(self.splash_life_step), "splash_life_step must be positive")?;
        check(
            (0.0..=1.0).contains(&self.bubble_chance),
            "bubble_chance must be in [0, 1]",
        )?;
        check(unit_open(self.bubble_shrink), "bubble_shrink must be in (0, 1)")?;
        check(positive(self.bubble_min_size), "bubble_min_size must be positive")?;
        check(positive(self.bubble_rise), "bubble_rise must be positive")?;
        check(unit_open(self.wave_decay), "wave_decay must be in (0, 1)")?;
        check(
            self.wave_amplitude.is_finite() && self.wave_amplitude > self.wave_threshold,
            "wave_amplitude must exceed wave_threshold",
        )?;
        check(
            self.follow_rate.is_finite() && self.follow_rate > 0.0 && self.follow_rate <= 1.0,
            "follow_rate must be in (0, 1]",
        )?;
        check(
            self.friction.is_finite() && (0.0..1.0).contains(&self.friction),
            "friction must be in [0, 1)",
        )?;
        check(
            self.float_radius.is_finite() && self.float_radius >= 0.0,
            "float_radius must be non-negative",
        )?;
        Ok(())
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PortraitConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = PortraitConfig::new()
            .with_gap(4)
            .with_fill_increment(0.01)
            .with_thresholds(10, 5.0)
            .with_seed(3);
        assert_eq!(config.gap, 4);
        assert_eq!(config.fill_increment, 0.01);
        assert_eq!(config.alpha_floor, 10);
        assert_eq!(config.brightness_floor, 5.0);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_rejects_zero_gap() {
        let err = PortraitConfig::default().with_gap(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_empty_placeholder() {
        let config = PortraitConfig {
            placeholder_count: 0,
            ..PortraitConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let from_json: PortraitConfig = serde_json::from_str(r#"{ "placeholder_count": 0 }"#).unwrap();
        assert!(from_json.validate().is_err());
    }

    #[test]
    fn test_rejects_non_decaying_wave() {
        assert!(PortraitConfig::default().with_wave_decay(1.0).validate().is_err());
        assert!(PortraitConfig::default().with_wave_decay(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PortraitConfig = serde_json::from_str(r#"{ "gap": 5, "seed": 9 }"#).unwrap();
        assert_eq!(config.gap, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.wave_decay, PortraitConfig::default().wave_decay);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("tidepool-config-{}.json", std::process::id()));
        let config = PortraitConfig::default().with_gap(6).with_seed(11);
        config.save(&path).unwrap();
        let loaded = PortraitConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = PortraitConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
