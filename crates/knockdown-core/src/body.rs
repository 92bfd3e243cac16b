//! Game-side bookkeeping for bodies living in the physics world.
//!
//! Rapier owns the bodies; this module keeps a side table from body handle to
//! the shape and game tags the rules need (target, level block, platform,
//! gravity source, scored guard). Rapier bodies are never annotated directly.

use std::f32::consts::TAU;

use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use crate::physics::PhysicsWorld;

/// Collision shape of a game body, in local (unrotated) coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyShape {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
    /// Regular polygon with `sides` vertices on a circle of `radius`.
    Polygon { sides: u32, radius: f32 },
}

impl BodyShape {
    pub fn is_circle(&self) -> bool {
        matches!(self, Self::Circle { .. })
    }

    /// Half extents of the axis-aligned box enclosing the shape at `angle`.
    pub fn half_extents(&self, angle: f32) -> [f32; 2] {
        match *self {
            Self::Rect { width, height } => {
                let (sin, cos) = angle.sin_cos();
                let (hx, hy) = (width / 2.0, height / 2.0);
                [
                    cos.abs() * hx + sin.abs() * hy,
                    sin.abs() * hx + cos.abs() * hy,
                ]
            }
            Self::Circle { radius } => [radius, radius],
            Self::Polygon { sides, radius } => {
                let verts = polygon_vertices(sides, radius);
                let (sin, cos) = angle.sin_cos();
                verts.iter().fold([0.0_f32, 0.0_f32], |acc, v| {
                    let x = v[0] * cos - v[1] * sin;
                    let y = v[0] * sin + v[1] * cos;
                    [acc[0].max(x.abs()), acc[1].max(y.abs())]
                })
            }
        }
    }

    /// Whether a point given in the shape's local frame lies inside it.
    pub fn contains_local(&self, local: [f32; 2]) -> bool {
        match *self {
            Self::Rect { width, height } => {
                local[0].abs() <= width / 2.0 && local[1].abs() <= height / 2.0
            }
            Self::Circle { radius } => {
                local[0] * local[0] + local[1] * local[1] <= radius * radius
            }
            Self::Polygon { sides, radius } => {
                let verts = polygon_vertices(sides, radius);
                (0..verts.len()).all(|i| {
                    let a = verts[i];
                    let b = verts[(i + 1) % verts.len()];
                    let cross = (b[0] - a[0]) * (local[1] - a[1]) - (b[1] - a[1]) * (local[0] - a[0]);
                    cross >= 0.0
                })
            }
        }
    }
}

/// Vertices of a regular polygon in counter-clockwise order, the first one
/// half a step past the +x axis.
#[allow(clippy::cast_precision_loss)]
pub fn polygon_vertices(sides: u32, radius: f32) -> Vec<[f32; 2]> {
    let sides = sides.max(3);
    let theta = TAU / sides as f32;
    let offset = theta * 0.5;
    (0..sides)
        .map(|i| {
            let a = offset + theta * i as f32;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Aabb {
    pub fn from_center(center: [f32; 2], half: [f32; 2]) -> Self {
        Self {
            min: [center[0] - half[0], center[1] - half[1]],
            max: [center[0] + half[0], center[1] + half[1]],
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(self, margin: f32) -> Self {
        Self {
            min: [self.min[0] - margin, self.min[1] - margin],
            max: [self.max[0] + margin, self.max[1] + margin],
        }
    }

    /// Inclusive overlap test: touching boxes overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min[0] <= other.max[0]
            && other.min[0] <= self.max[0]
            && self.min[1] <= other.max[1]
            && other.min[1] <= self.max[1]
    }
}

/// What placed a body in the world.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// One of the four persistent arena walls.
    BoundaryWall,
    /// Static platform from the level catalog.
    Platform,
    /// Dynamic or static block instantiated from the level catalog.
    LevelBlock,
    /// Ball fired by the launcher.
    Projectile,
    /// Object placed with a palette tool (box, circle, polygon, drawn wall).
    PlayerObject,
    /// Static attractor placed with the mass tool.
    GravitySource,
}

/// Game flags attached to a body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BodyTags {
    /// Scoreable target.
    pub is_target: bool,
    /// Counts toward the win condition.
    pub is_level_block: bool,
    pub is_platform: bool,
    /// Reference surface for the win condition.
    pub is_primary_platform: bool,
    /// `Some(mass_value)` when the body attracts others.
    pub gravity_source: Option<f32>,
    /// Set once the target has been scored.
    pub scored: bool,
}

/// Side-table entry for one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    pub handle: RigidBodyHandle,
    pub kind: BodyKind,
    pub shape: BodyShape,
    pub tags: BodyTags,
}

impl BodyInfo {
    pub fn new(handle: RigidBodyHandle, kind: BodyKind, shape: BodyShape, tags: BodyTags) -> Self {
        Self {
            handle,
            kind,
            shape,
            tags,
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.kind == BodyKind::BoundaryWall
    }

    /// Bounding box of the body at its current pose.
    pub fn aabb(&self, world: &PhysicsWorld) -> Option<Aabb> {
        let center = world.body_position(self.handle)?;
        let angle = world.body_angle(self.handle)?;
        Some(Aabb::from_center(center, self.shape.half_extents(angle)))
    }

    /// Whether a world-space point lies inside the body.
    pub fn contains_point(&self, world: &PhysicsWorld, point: [f32; 2]) -> bool {
        let (Some(center), Some(angle)) = (
            world.body_position(self.handle),
            world.body_angle(self.handle),
        ) else {
            return false;
        };
        let dx = point[0] - center[0];
        let dy = point[1] - center[1];
        let (sin, cos) = angle.sin_cos();
        let local = [dx * cos + dy * sin, -dx * sin + dy * cos];
        self.shape.contains_local(local)
    }
}

/// Handle → game info table, kept in insertion order for deterministic passes.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<BodyInfo>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: BodyInfo) {
        self.bodies.push(info);
    }

    pub fn remove(&mut self, handle: RigidBodyHandle) -> Option<BodyInfo> {
        let pos = self.bodies.iter().position(|b| b.handle == handle)?;
        Some(self.bodies.remove(pos))
    }

    pub fn get(&self, handle: RigidBodyHandle) -> Option<&BodyInfo> {
        self.bodies.iter().find(|b| b.handle == handle)
    }

    pub fn get_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut BodyInfo> {
        self.bodies.iter_mut().find(|b| b.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyInfo> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BodyInfo> {
        self.bodies.iter_mut()
    }

    /// Handles of every body that is not a boundary wall.
    pub fn removable_handles(&self) -> Vec<RigidBodyHandle> {
        self.bodies
            .iter()
            .filter(|b| !b.is_boundary())
            .map(|b| b.handle)
            .collect()
    }

    /// The platform the win condition is measured against, if any.
    pub fn primary_platform(&self) -> Option<&BodyInfo> {
        self.bodies.iter().find(|b| b.tags.is_primary_platform)
    }

    pub fn targets(&self) -> impl Iterator<Item = &BodyInfo> {
        self.bodies.iter().filter(|b| b.tags.is_target)
    }

    pub fn level_blocks(&self) -> impl Iterator<Item = &BodyInfo> {
        self.bodies.iter().filter(|b| b.tags.is_level_block)
    }

    pub fn gravity_sources(&self) -> impl Iterator<Item = &BodyInfo> {
        self.bodies.iter().filter(|b| b.tags.gravity_source.is_some())
    }

    pub fn count_kind(&self, kind: BodyKind) -> usize {
        self.bodies.iter().filter(|b| b.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
