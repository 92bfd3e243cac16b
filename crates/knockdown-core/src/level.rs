//! Level catalog.
//!
//! Levels are plain data: one or more static platforms (one of them primary,
//! the win condition's reference surface) and an ordered list of blocks.
//! The built-in catalog is compiled in from `levels/*.json`.
//!
//! Lookups clamp the index into `[0, max_levels)` instead of failing, so
//! prev/next navigation saturates at the ends rather than wrapping.

use serde::{Deserialize, Serialize};

use crate::body::BodyShape;

/// Error type for catalog construction.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level catalog is empty")]
    Empty,
    #[error("level '{0}' has no platform")]
    NoPlatform(String),
}

/// A static platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformSpec {
    pub center: [f32; 2],
    pub size: [f32; 2],
    /// Rotation in radians.
    #[serde(default)]
    pub angle: f32,
    /// Marks the reference surface for the win condition.
    #[serde(default)]
    pub primary: bool,
}

/// Game tags for a level block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockTags {
    #[serde(default)]
    pub target: bool,
    /// Counts toward the win condition while it overlaps the primary platform.
    #[serde(default = "default_true")]
    pub block: bool,
    /// Mass value when the block attracts other bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity_source: Option<f32>,
}

impl Default for BlockTags {
    fn default() -> Self {
        Self {
            target: false,
            block: true,
            gravity_source: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_friction() -> f32 {
    0.1
}

fn default_density() -> f32 {
    0.001
}

/// A block instantiated into the world when its level loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockSpec {
    pub shape: BodyShape,
    pub position: [f32; 2],
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub restitution: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_density")]
    pub density: f32,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub tags: BlockTags,
}

/// Complete description of one level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelSpec {
    pub name: String,
    pub platforms: Vec<PlatformSpec>,
    pub blocks: Vec<BlockSpec>,
}

impl LevelSpec {
    /// Loads a level from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        if level.platforms.is_empty() {
            return Err(LevelError::NoPlatform(level.name));
        }
        Ok(level)
    }

    /// Serializes the level to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Index of the primary platform: the first one flagged `primary`,
    /// otherwise the first platform.
    pub fn primary_platform_index(&self) -> usize {
        self.platforms.iter().position(|p| p.primary).unwrap_or(0)
    }

    pub fn target_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.tags.target).count()
    }
}

/// Ordered, immutable list of levels.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelSpec>,
}

impl LevelCatalog {
    /// Builds a catalog from already-parsed levels.
    pub fn new(levels: Vec<LevelSpec>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        if let Some(level) = levels.iter().find(|l| l.platforms.is_empty()) {
            return Err(LevelError::NoPlatform(level.name.clone()));
        }
        Ok(Self { levels })
    }

    /// Builds a catalog from one JSON document per level.
    pub fn from_json_levels(documents: &[&str]) -> Result<Self, LevelError> {
        let levels = documents
            .iter()
            .map(|json| LevelSpec::from_json(json))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    /// Builds a catalog from a single JSON array of levels.
    pub fn from_json_array(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<LevelSpec> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// The built-in catalog compiled in from `levels/*.json`.
    pub fn classic() -> Self {
        const LEVELS: [&str; 3] = [
            include_str!("../levels/00_twin_towers.json"),
            include_str!("../levels/01_pyramid.json"),
            include_str!("../levels/02_orbit.json"),
        ];
        Self::from_json_levels(&LEVELS).expect("Failed to parse built-in levels")
    }

    /// Number of levels; valid indices are `0..max_levels()`.
    pub fn max_levels(&self) -> usize {
        self.levels.len()
    }

    /// Clamps any index into `[0, max_levels)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn clamp_index(&self, index: i64) -> usize {
        let last = self.levels.len() as i64 - 1;
        index.clamp(0, last) as usize
    }

    /// Describes the level at `index`, clamped into range.
    pub fn describe_level(&self, index: i64) -> &LevelSpec {
        &self.levels[self.clamp_index(index)]
    }

    pub fn levels(&self) -> &[LevelSpec] {
        &self.levels
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::classic()
    }
}
