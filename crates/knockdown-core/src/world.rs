//! World mutation: materializing levels and player-spawned objects.
//!
//! `GameWorld` pairs the rapier world with the body side table and keeps the
//! four boundary walls alive across every reset and clear.

use rapier2d::prelude::*;

use crate::body::{BodyInfo, BodyKind, BodyRegistry, BodyShape, BodyTags, polygon_vertices};
use crate::config::{ArenaConfig, LauncherConfig, MaterialConfig, ToolsConfig};
use crate::level::LevelSpec;
use crate::physics::{PhysicsWorld, gravity_for_strength};

/// Physics world plus game bookkeeping.
#[derive(Debug)]
pub struct GameWorld {
    pub physics: PhysicsWorld,
    pub bodies: BodyRegistry,
    walls: [RigidBodyHandle; 4],
}

/// How a body should be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Fixed,
    Dynamic,
}

/// Everything needed to insert one body.
#[derive(Debug, Clone, Copy)]
struct BodyDef {
    kind: BodyKind,
    shape: BodyShape,
    tags: BodyTags,
    motion: Motion,
    position: [f32; 2],
    angle: f32,
    velocity: [f32; 2],
    restitution: f32,
    friction: f32,
    density: f32,
}

impl BodyDef {
    fn fixed(kind: BodyKind, shape: BodyShape, position: [f32; 2]) -> Self {
        Self {
            kind,
            shape,
            tags: BodyTags::default(),
            motion: Motion::Fixed,
            position,
            angle: 0.0,
            velocity: [0.0, 0.0],
            restitution: 0.0,
            friction: 0.1,
            density: 0.001,
        }
    }

    fn dynamic(kind: BodyKind, shape: BodyShape, position: [f32; 2], material: &MaterialConfig) -> Self {
        Self {
            motion: Motion::Dynamic,
            restitution: material.restitution,
            friction: material.friction,
            density: material.density,
            ..Self::fixed(kind, shape, position)
        }
    }
}

fn collider_for(def: &BodyDef) -> Collider {
    let builder = match def.shape {
        BodyShape::Rect { width, height } => ColliderBuilder::cuboid(width / 2.0, height / 2.0),
        BodyShape::Circle { radius } => ColliderBuilder::ball(radius),
        BodyShape::Polygon { sides, radius } => {
            let points = polygon_vertices(sides, radius)
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>();
            ColliderBuilder::convex_hull(&points).unwrap_or_else(|| ColliderBuilder::ball(radius))
        }
    };
    builder
        .restitution(def.restitution)
        .friction(def.friction)
        .density(def.density)
        .build()
}

impl GameWorld {
    /// Creates a world containing only the four boundary walls.
    pub fn new(arena: &ArenaConfig, gravity_strength: f32) -> Self {
        let physics = PhysicsWorld::with_gravity(gravity_for_strength(gravity_strength));
        let mut world = Self {
            physics,
            bodies: BodyRegistry::new(),
            walls: [RigidBodyHandle::invalid(); 4],
        };

        let (w, h, t) = (arena.width, arena.height, arena.wall_thickness);
        let wall_defs = [
            ([w / 2.0, h + t / 2.0], [w, t]),
            ([w / 2.0, -t / 2.0], [w, t]),
            ([-t / 2.0, h / 2.0], [t, h]),
            ([w + t / 2.0, h / 2.0], [t, h]),
        ];
        for (i, (center, size)) in wall_defs.into_iter().enumerate() {
            let shape = BodyShape::Rect {
                width: size[0],
                height: size[1],
            };
            world.walls[i] = world.insert(BodyDef::fixed(BodyKind::BoundaryWall, shape, center));
        }

        world
    }

    fn insert(&mut self, def: BodyDef) -> RigidBodyHandle {
        let builder = match def.motion {
            Motion::Fixed => RigidBodyBuilder::fixed(),
            Motion::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let rigid_body = builder
            .translation(Vector::new(def.position[0], def.position[1]))
            .rotation(def.angle)
            .linvel(Vector::new(def.velocity[0], def.velocity[1]))
            .ccd_enabled(def.kind == BodyKind::Projectile)
            .build();

        let handle = self.physics.add_rigid_body(rigid_body);
        self.physics.add_collider(collider_for(&def), handle);
        self.bodies
            .insert(BodyInfo::new(handle, def.kind, def.shape, def.tags));
        handle
    }

    /// Handles of the four persistent boundary walls.
    pub fn walls(&self) -> &[RigidBodyHandle; 4] {
        &self.walls
    }

    /// Updates the ambient downward gravity.
    pub fn set_gravity_strength(&mut self, strength: f32) {
        self.physics.set_gravity(gravity_for_strength(strength));
    }

    /// Removes a single body. Boundary walls and stale handles are ignored.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        match self.bodies.get(handle) {
            Some(info) if !info.is_boundary() => {}
            _ => return false,
        }
        self.bodies.remove(handle);
        self.physics.remove_rigid_body(handle)
    }

    /// Removes every body except the boundary walls. Returns how many went.
    pub fn clear_player_objects(&mut self) -> usize {
        let handles = self.bodies.removable_handles();
        let count = handles.len();
        for handle in handles {
            self.bodies.remove(handle);
            self.physics.remove_rigid_body(handle);
        }
        count
    }

    /// Replaces everything except the boundary walls with the given level.
    pub fn load_level(&mut self, level: &LevelSpec) {
        self.clear_player_objects();

        let primary = level.primary_platform_index();
        for (i, platform) in level.platforms.iter().enumerate() {
            let shape = BodyShape::Rect {
                width: platform.size[0],
                height: platform.size[1],
            };
            let mut def = BodyDef::fixed(BodyKind::Platform, shape, platform.center);
            def.angle = platform.angle;
            def.tags.is_platform = true;
            def.tags.is_primary_platform = i == primary;
            self.insert(def);
        }

        for block in &level.blocks {
            let def = BodyDef {
                kind: BodyKind::LevelBlock,
                shape: block.shape,
                tags: BodyTags {
                    is_target: block.tags.target,
                    is_level_block: block.tags.block,
                    gravity_source: block.tags.gravity_source,
                    ..BodyTags::default()
                },
                motion: if block.is_static {
                    Motion::Fixed
                } else {
                    Motion::Dynamic
                },
                position: block.position,
                angle: block.angle,
                velocity: [0.0, 0.0],
                restitution: block.restitution,
                friction: block.friction,
                density: block.density,
            };
            self.insert(def);
        }

        tracing::debug!(
            "[world] loaded '{}' ({} platforms, {} blocks)",
            level.name,
            level.platforms.len(),
            level.blocks.len()
        );
    }

    /// Spawns a launcher projectile with `velocity` in pixels/s.
    pub fn spawn_projectile(
        &mut self,
        position: [f32; 2],
        velocity: [f32; 2],
        launcher: &LauncherConfig,
    ) -> RigidBodyHandle {
        let material = MaterialConfig {
            restitution: launcher.projectile_restitution,
            friction: launcher.projectile_friction,
            density: launcher.projectile_density,
        };
        let shape = BodyShape::Circle {
            radius: launcher.projectile_radius,
        };
        let mut def = BodyDef::dynamic(BodyKind::Projectile, shape, position, &material);
        def.velocity = velocity;
        self.insert(def)
    }

    pub fn spawn_box(&mut self, position: [f32; 2], tools: &ToolsConfig) -> RigidBodyHandle {
        let shape = BodyShape::Rect {
            width: tools.box_size,
            height: tools.box_size,
        };
        self.insert(BodyDef::dynamic(
            BodyKind::PlayerObject,
            shape,
            position,
            &tools.box_material,
        ))
    }

    pub fn spawn_circle(&mut self, position: [f32; 2], tools: &ToolsConfig) -> RigidBodyHandle {
        let shape = BodyShape::Circle {
            radius: tools.circle_radius,
        };
        self.insert(BodyDef::dynamic(
            BodyKind::PlayerObject,
            shape,
            position,
            &tools.circle_material,
        ))
    }

    pub fn spawn_polygon(&mut self, position: [f32; 2], tools: &ToolsConfig) -> RigidBodyHandle {
        let shape = BodyShape::Polygon {
            sides: tools.polygon_sides,
            radius: tools.polygon_radius,
        };
        self.insert(BodyDef::dynamic(
            BodyKind::PlayerObject,
            shape,
            position,
            &tools.polygon_material,
        ))
    }

    /// Draws a static bar from `start` to `end`. Returns `None` when the
    /// segment is not longer than the minimum wall length.
    pub fn spawn_wall(
        &mut self,
        start: [f32; 2],
        end: [f32; 2],
        tools: &ToolsConfig,
    ) -> Option<RigidBodyHandle> {
        let dx = end[0] - start[0];
        let dy = end[1] - start[1];
        let length = dx.hypot(dy);
        if length <= tools.min_wall_length {
            return None;
        }

        let mid = [
            f32::midpoint(start[0], end[0]),
            f32::midpoint(start[1], end[1]),
        ];
        let shape = BodyShape::Rect {
            width: length,
            height: tools.wall_thickness,
        };
        let mut def = BodyDef::fixed(BodyKind::PlayerObject, shape, mid);
        def.angle = dy.atan2(dx);
        Some(self.insert(def))
    }

    /// Places a static attractor with the given mass value.
    pub fn spawn_gravity_source(
        &mut self,
        position: [f32; 2],
        mass_value: f32,
        radius: f32,
    ) -> RigidBodyHandle {
        let mut def = BodyDef::fixed(BodyKind::GravitySource, BodyShape::Circle { radius }, position);
        def.tags.gravity_source = Some(mass_value);
        self.insert(def)
    }

    /// Removes every non-wall body containing `point`.
    pub fn erase_at(&mut self, point: [f32; 2]) -> Vec<RigidBodyHandle> {
        let hits: Vec<RigidBodyHandle> = self
            .bodies
            .iter()
            .filter(|b| !b.is_boundary() && b.contains_point(&self.physics, point))
            .map(|b| b.handle)
            .collect();
        for &handle in &hits {
            self.remove_body(handle);
        }
        hits
    }
}
