//! Physics world wrapper around `Rapier2D`.
//!
//! The game layer treats the engine as an external collaborator: it adds and
//! removes bodies, applies forces, and steps. Everything else lives in rapier.

use rapier2d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed timestep for physics simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Simulation ticks per second.
pub const TICK_RATE: f32 = 60.0;

/// Downward acceleration (pixels/s²) for a gravity strength of 1.0.
pub const GRAVITY_UNIT: f32 = 1000.0;

/// Conversion from game-layer forces (mass·px/ms²) to rapier forces (mass·px/s²).
pub const FORCE_UNIT: f32 = 1.0e6;

/// Gravity vector for the given strength slider value (pixels/s², +y is down).
pub fn gravity_for_strength(strength: f32) -> Vector {
    Vector::new(0.0, GRAVITY_UNIT * strength)
}

/// Physics world containing all `Rapier2D` components.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with unit-strength downward gravity.
    pub fn new() -> Self {
        Self::with_gravity(gravity_for_strength(1.0))
    }

    /// Creates a new physics world with custom gravity.
    pub fn with_gravity(gravity: Vector) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity,
            frame: 0,
        }
    }

    /// Replaces the ambient gravity vector.
    pub fn set_gravity(&mut self, gravity: Vector) {
        self.gravity = gravity;
    }

    /// Advances the physics simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.frame += 1;
    }

    /// Advances the physics simulation by multiple steps.
    pub fn step_n(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Removes a rigid body and its attached colliders.
    /// Returns false when the handle no longer refers to a body.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Gets a mutable reference to a rigid body.
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Position of a body as `[x, y]`.
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<[f32; 2]> {
        self.get_rigid_body(handle).map(|body| {
            let pos = body.translation();
            [pos.x, pos.y]
        })
    }

    /// Rotation angle of a body in radians, in `(-π, π]`.
    pub fn body_angle(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.get_rigid_body(handle)
            .map(|body| body.rotation().angle())
    }

    /// Linear velocity of a body in pixels/s.
    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<[f32; 2]> {
        self.get_rigid_body(handle).map(|body| {
            let vel = body.linvel();
            [vel.x, vel.y]
        })
    }

    /// Teleports a body, waking it up.
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: [f32; 2]) -> bool {
        let Some(body) = self.get_rigid_body_mut(handle) else {
            return false;
        };
        body.set_translation(Vector::new(position[0], position[1]), true);
        true
    }

    /// Overrides the rotation of a body, waking it up.
    pub fn set_body_angle(&mut self, handle: RigidBodyHandle, angle: f32) -> bool {
        let Some(body) = self.get_rigid_body_mut(handle) else {
            return false;
        };
        body.set_rotation(Rotation::from_angle(angle), true);
        true
    }

    /// Computes a deterministic hash of the current physics state.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);
            hash_f32(body.rotation().angle(), &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
            hash_f32(body.angvel(), &mut hasher);
        }

        hasher.finish()
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Number of rigid bodies currently in the world.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(world: &mut PhysicsWorld, x: f32, y: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(x, y))
            .build();
        let handle = world.add_rigid_body(body);
        world.add_collider(ColliderBuilder::ball(10.0).restitution(0.4).build(), handle);
        handle
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.frame, 0);
        assert_eq!(world.integration_parameters.dt, PHYSICS_DT);
        assert_eq!(world.gravity.y, GRAVITY_UNIT);
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut world1 = PhysicsWorld::new();
        let mut world2 = PhysicsWorld::new();

        let handle1 = ball_at(&mut world1, 100.0, 100.0);
        let handle2 = ball_at(&mut world2, 100.0, 100.0);

        for _ in 0..100 {
            world1.step();
            world2.step();
        }

        assert_eq!(world1.compute_hash(), world2.compute_hash());
        assert_eq!(world1.body_position(handle1), world2.body_position(handle2));
    }

    #[test]
    fn test_step_advances_frame() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.current_frame(), 0);

        world.step();
        assert_eq!(world.current_frame(), 1);

        world.step_n(10);
        assert_eq!(world.current_frame(), 11);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut world = PhysicsWorld::new();
        let handle = ball_at(&mut world, 50.0, 50.0);

        world.step_n(30);

        let [_, y] = world.body_position(handle).unwrap();
        assert!(y > 50.0, "body should fall toward +y, got {y}");
    }

    #[test]
    fn test_zero_gravity_keeps_body_still() {
        let mut world = PhysicsWorld::with_gravity(gravity_for_strength(0.0));
        let handle = ball_at(&mut world, 50.0, 50.0);

        world.step_n(30);

        assert_eq!(world.body_position(handle), Some([50.0, 50.0]));
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut world = PhysicsWorld::new();
        let handle = ball_at(&mut world, 50.0, 50.0);

        assert!(world.get_rigid_body(handle).is_some());
        assert!(world.remove_rigid_body(handle));
        assert!(world.get_rigid_body(handle).is_none());
        // A second removal of the same handle is a no-op.
        assert!(!world.remove_rigid_body(handle));
    }

    #[test]
    fn test_set_position_and_angle() {
        let mut world = PhysicsWorld::new();
        let handle = ball_at(&mut world, 0.0, 0.0);

        assert!(world.set_body_position(handle, [12.0, 34.0]));
        assert!(world.set_body_angle(handle, 1.0));

        assert_eq!(world.body_position(handle), Some([12.0, 34.0]));
        let angle = world.body_angle(handle).unwrap();
        assert!((angle - 1.0).abs() < 1e-5);
    }
}
