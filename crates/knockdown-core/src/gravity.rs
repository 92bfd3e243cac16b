//! Inverse-square attraction toward gravity sources.
//!
//! Runs once per step before integration. Every dynamic, non-source body is
//! pulled toward every source with `G * source_mass * body_mass / r²`, the
//! squared distance floored at `min_r2`. Pairwise cost is fine for the few
//! dozen bodies a level holds.

use rapier2d::prelude::{RigidBodyHandle, Vector};

use crate::config::GravityConfig;
use crate::physics::FORCE_UNIT;
use crate::world::GameWorld;

/// Applies the attraction pass and returns how many (body, source) pairs
/// contributed a force. Returns 0 without touching any body when the world
/// holds no source.
pub fn apply_gravity_sources(world: &mut GameWorld, config: &GravityConfig) -> usize {
    let sources: Vec<([f32; 2], f32)> = world
        .bodies
        .gravity_sources()
        .filter_map(|info| {
            let position = world.physics.body_position(info.handle)?;
            Some((position, info.tags.gravity_source.unwrap_or(0.0)))
        })
        .collect();
    if sources.is_empty() {
        return 0;
    }

    let attracted: Vec<RigidBodyHandle> = world
        .bodies
        .iter()
        .filter(|info| info.tags.gravity_source.is_none())
        .map(|info| info.handle)
        .collect();

    let mut pairs = 0;
    for handle in attracted {
        let Some(body) = world.physics.get_rigid_body_mut(handle) else {
            continue;
        };
        if !body.is_dynamic() {
            continue;
        }

        // Forces persist in rapier until reset; recompute from scratch.
        body.reset_forces(false);

        let pos = body.translation();
        let (bx, by) = (pos.x, pos.y);
        let mass = if body.mass() > 0.0 { body.mass() } else { 1.0 };

        let mut force = [0.0_f32, 0.0_f32];
        for &(source, mass_value) in &sources {
            let dx = source[0] - bx;
            let dy = source[1] - by;
            let len = (dx * dx + dy * dy).sqrt();
            if len <= f32::EPSILON {
                continue;
            }
            let r2 = (dx * dx + dy * dy).max(config.min_r2);
            let magnitude = config.gravity_constant * mass_value * mass / r2;
            let scaled = magnitude * config.force_scale * FORCE_UNIT;
            force[0] += dx / len * scaled;
            force[1] += dy / len * scaled;
            pairs += 1;
        }

        body.add_force(Vector::new(force[0], force[1]), true);
    }

    pairs
}

/// Stateful wrapper run by the session once per step.
///
/// Remembers whether sources existed last step so the forces they left on
/// bodies are cleared once the final source disappears.
#[derive(Debug, Clone, Default)]
pub struct GravityPass {
    active: bool,
}

impl GravityPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, world: &mut GameWorld, config: &GravityConfig) -> usize {
        let has_sources = world.bodies.gravity_sources().next().is_some();
        if !has_sources {
            if self.active {
                clear_forces(world);
                self.active = false;
            }
            return 0;
        }
        self.active = true;
        apply_gravity_sources(world, config)
    }
}

fn clear_forces(world: &mut GameWorld) {
    let handles: Vec<RigidBodyHandle> = world.bodies.iter().map(|info| info.handle).collect();
    for handle in handles {
        if let Some(body) = world.physics.get_rigid_body_mut(handle) {
            body.reset_forces(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn zero_g_world() -> (GameWorld, GameConfig) {
        let config = GameConfig::default();
        (GameWorld::new(&config.arena, 0.0), config)
    }

    #[test]
    fn test_no_sources_is_noop() {
        let (mut world, config) = zero_g_world();
        let mut pass = GravityPass::new();
        let ball = world.spawn_circle([400.0, 300.0], &config.tools);

        assert_eq!(pass.apply(&mut world, &config.gravity), 0);
        world.physics.step_n(30);

        assert_eq!(world.physics.body_position(ball), Some([400.0, 300.0]));
    }

    #[test]
    fn test_body_pulled_toward_source() {
        let (mut world, config) = zero_g_world();
        let mut pass = GravityPass::new();
        world.spawn_gravity_source([700.0, 300.0], 500.0, 14.0);
        let ball = world.spawn_circle([400.0, 300.0], &config.tools);

        for _ in 0..60 {
            assert_eq!(pass.apply(&mut world, &config.gravity), 1);
            world.physics.step();
        }

        let [x, y] = world.physics.body_position(ball).unwrap();
        assert!(x > 400.0, "expected pull toward +x, got {x}");
        assert!((y - 300.0).abs() < 1e-3);
        // The source itself never moves.
        let velocity = world.physics.body_velocity(ball).unwrap();
        assert!(velocity[0] > 0.0);
    }

    #[test]
    fn test_static_bodies_unaffected() {
        let (mut world, config) = zero_g_world();
        let mut pass = GravityPass::new();
        world.spawn_gravity_source([700.0, 300.0], 500.0, 14.0);
        world
            .spawn_wall([300.0, 100.0], [500.0, 100.0], &config.tools)
            .unwrap();

        // Only boundary walls, the drawn wall and the source: nothing dynamic.
        assert_eq!(pass.apply(&mut world, &config.gravity), 0);
    }

    #[test]
    fn test_multiple_sources_sum() {
        let (mut world, config) = zero_g_world();
        let mut pass = GravityPass::new();
        world.spawn_gravity_source([200.0, 300.0], 500.0, 14.0);
        world.spawn_gravity_source([600.0, 300.0], 500.0, 14.0);
        let ball = world.spawn_circle([400.0, 300.0], &config.tools);

        for _ in 0..30 {
            assert_eq!(pass.apply(&mut world, &config.gravity), 2);
            world.physics.step();
        }

        // Symmetric pulls cancel.
        let [x, _] = world.physics.body_position(ball).unwrap();
        assert!((x - 400.0).abs() < 1e-2, "x drifted to {x}");
    }

    #[test]
    fn test_forces_cleared_after_last_source_removed() {
        let (mut world, config) = zero_g_world();
        let mut pass = GravityPass::new();
        let source = world.spawn_gravity_source([700.0, 300.0], 500.0, 14.0);
        let ball = world.spawn_circle([400.0, 300.0], &config.tools);

        pass.apply(&mut world, &config.gravity);
        world.physics.step_n(10);
        assert!(world.remove_body(source));

        assert_eq!(pass.apply(&mut world, &config.gravity), 0);
        world.physics.step();
        let before = world.physics.body_velocity(ball).unwrap();
        world.physics.step_n(10);
        let after = world.physics.body_velocity(ball).unwrap();

        assert!(before[0] > 0.0);
        assert!((after[0] - before[0]).abs() < 1e-4, "velocity kept changing");
    }

    #[test]
    fn test_closer_source_pulls_harder() {
        let (mut world, config) = zero_g_world();
        let mut pass = GravityPass::new();
        world.spawn_gravity_source([300.0, 300.0], 500.0, 14.0);
        world.spawn_gravity_source([900.0, 300.0], 500.0, 14.0);
        let ball = world.spawn_circle([500.0, 300.0], &config.tools);

        for _ in 0..30 {
            pass.apply(&mut world, &config.gravity);
            world.physics.step();
        }

        let [x, _] = world.physics.body_position(ball).unwrap();
        assert!(x < 500.0, "expected pull toward the nearer source, got {x}");
    }
}
