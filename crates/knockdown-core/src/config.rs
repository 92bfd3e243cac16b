//! Tuning constants for the sandbox.
//!
//! Every numeric knob the game logic reads lives here, grouped by the
//! component that consumes it. Defaults reproduce the classic tuning.

use serde::{Deserialize, Serialize};

use crate::physics::TICK_RATE;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Playfield dimensions and the boundary walls around it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Thickness of the four static boundary walls.
    pub wall_thickness: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            wall_thickness: 80.0,
        }
    }
}

/// Slingshot launcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LauncherConfig {
    pub max_power: f32,
    pub power_scale: f32,
    /// Applied to `power` to obtain a velocity in pixels per tick.
    pub velocity_damping: f32,
    /// Distance from the anchor, against the launch direction, where the
    /// projectile appears.
    pub spawn_offset: f32,
    /// Gestures shorter than this are ignored. 0 disables the guard.
    pub min_drag_distance: f32,
    pub projectile_radius: f32,
    pub projectile_restitution: f32,
    pub projectile_friction: f32,
    pub projectile_density: f32,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            max_power: 2200.0,
            power_scale: 12.0,
            velocity_damping: 0.02,
            spawn_offset: 18.0,
            min_drag_distance: 0.0,
            projectile_radius: 14.0,
            projectile_restitution: 0.4,
            projectile_friction: 0.02,
            projectile_density: 0.001,
        }
    }
}

/// Ambient gravity and gravity-source attraction tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GravityConfig {
    /// Ambient downward gravity multiplier.
    pub strength: f32,
    /// Global attraction constant `G`, shared by every source.
    pub gravity_constant: f32,
    /// Floor for the squared distance between a body and a source.
    pub min_r2: f32,
    /// Scale applied to the attraction force before handing it to the engine.
    pub force_scale: f32,
    /// Mass value given to newly placed gravity sources.
    pub default_source_mass: f32,
    pub source_radius: f32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            strength: 1.0,
            gravity_constant: 500.0,
            min_r2: 100.0,
            force_scale: 1.0e-6,
            default_source_mass: 500.0,
            source_radius: 14.0,
        }
    }
}

/// Target scoring and win detection tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// A target is fallen once its y exceeds `arena.height - fall_margin`.
    pub fall_margin: f32,
    /// Absolute rotation (radians) past which a target counts as toppled.
    pub tilt_threshold: f32,
    pub rect_target_points: u32,
    pub circle_target_points: u32,
    pub removal_delay_ms: u32,
    pub advance_delay_ms: u32,
    /// Slack added around the primary platform's bounds for the overlap test.
    pub win_overlap_margin: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fall_margin: 80.0,
            tilt_threshold: std::f32::consts::FRAC_PI_3,
            rect_target_points: 100,
            circle_target_points: 10,
            removal_delay_ms: 80,
            advance_delay_ms: 1500,
            win_overlap_margin: 4.0,
        }
    }
}

impl ScoringConfig {
    pub fn removal_delay_frames(&self) -> u64 {
        ms_to_frames(self.removal_delay_ms)
    }

    pub fn advance_delay_frames(&self) -> u64 {
        ms_to_frames(self.advance_delay_ms)
    }
}

/// Physical parameters for one kind of palette object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialConfig {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl MaterialConfig {
    pub const fn new(restitution: f32, friction: f32) -> Self {
        Self {
            restitution,
            friction,
            density: 0.001,
        }
    }
}

/// Palette object tuning for the sandbox tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub min_wall_length: f32,
    pub wall_thickness: f32,
    pub box_size: f32,
    pub box_material: MaterialConfig,
    pub circle_radius: f32,
    pub circle_material: MaterialConfig,
    pub polygon_sides: u32,
    pub polygon_radius: f32,
    pub polygon_material: MaterialConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            min_wall_length: 6.0,
            wall_thickness: 12.0,
            box_size: 40.0,
            box_material: MaterialConfig::new(0.2, 0.1),
            circle_radius: 18.0,
            circle_material: MaterialConfig::new(0.2, 0.02),
            polygon_sides: 5,
            polygon_radius: 26.0,
            polygon_material: MaterialConfig::new(0.1, 0.1),
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub launcher: LauncherConfig,
    pub gravity: GravityConfig,
    pub scoring: ScoringConfig,
    pub tools: ToolsConfig,
}

impl GameConfig {
    /// Loads a configuration from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena.width <= 0.0 || self.arena.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "arena must have a positive size, got {}x{}",
                self.arena.width, self.arena.height
            )));
        }
        if self.gravity.min_r2 <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "gravity.min_r2 must be positive, got {}",
                self.gravity.min_r2
            )));
        }
        if self.tools.polygon_sides < 3 {
            return Err(ConfigError::Invalid(format!(
                "tools.polygon_sides must be at least 3, got {}",
                self.tools.polygon_sides
            )));
        }
        Ok(())
    }
}

/// Converts a millisecond delay to whole simulation frames, rounding up.
/// Never returns zero so a delayed task always lands on a later tick.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ms_to_frames(ms: u32) -> u64 {
    let frames = (f64::from(ms) * f64::from(TICK_RATE) / 1000.0).ceil() as u64;
    frames.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_tuning() {
        let config = GameConfig::default();
        assert_eq!(config.launcher.max_power, 2200.0);
        assert_eq!(config.launcher.power_scale, 12.0);
        assert_eq!(config.launcher.spawn_offset, 18.0);
        assert_eq!(config.gravity.min_r2, 100.0);
        assert_eq!(config.scoring.rect_target_points, 100);
        assert_eq!(config.scoring.circle_target_points, 10);
        assert!((config.scoring.tilt_threshold - std::f32::consts::PI / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "launcher": { "max_power": 1500, "power_scale": 6 } }"#;
        let config = GameConfig::from_json(json).expect("valid config");

        assert_eq!(config.launcher.max_power, 1500.0);
        assert_eq!(config.launcher.power_scale, 6.0);
        assert_eq!(config.launcher.spawn_offset, 18.0);
        assert_eq!(config.arena, ArenaConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GameConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let json = r#"{ "gravity": { "min_r2": 0 } }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_ms_to_frames() {
        assert_eq!(ms_to_frames(80), 5);
        assert_eq!(ms_to_frames(1500), 90);
        assert_eq!(ms_to_frames(0), 1);
    }
}
