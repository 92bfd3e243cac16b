//! Slingshot launcher: turns a drag gesture into a projectile launch.

use serde::{Deserialize, Serialize};

use crate::config::LauncherConfig;

/// Line drawn from the anchor to the pointer while aiming.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AimVector {
    pub from: [f32; 2],
    pub to: [f32; 2],
}

/// Result of releasing the band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LaunchPlan {
    /// Where the projectile is spawned.
    pub position: [f32; 2],
    /// Initial velocity in pixels per tick.
    pub velocity: [f32; 2],
    pub power: f32,
    /// Launch direction in radians.
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LauncherState {
    #[default]
    Idle,
    Aiming {
        anchor: [f32; 2],
    },
}

/// Two-state gesture machine: `Idle` until a gesture starts, `Aiming` until
/// it ends.
#[derive(Debug, Clone, Default)]
pub struct LauncherController {
    state: LauncherState,
}

impl LauncherController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LauncherState {
        self.state
    }

    pub fn is_aiming(&self) -> bool {
        matches!(self.state, LauncherState::Aiming { .. })
    }

    /// Records the anchor. A second `begin` while aiming moves the anchor.
    pub fn begin(&mut self, point: [f32; 2]) {
        self.state = LauncherState::Aiming { anchor: point };
    }

    /// Aim feedback for the current pointer position; no physics effect.
    pub fn drag(&self, point: [f32; 2]) -> Option<AimVector> {
        match self.state {
            LauncherState::Idle => None,
            LauncherState::Aiming { anchor } => Some(AimVector {
                from: anchor,
                to: point,
            }),
        }
    }

    /// Ends the gesture. Returns the launch to perform, or `None` when no
    /// gesture was in progress or the drag was shorter than the configured
    /// minimum.
    pub fn release(&mut self, point: [f32; 2], config: &LauncherConfig) -> Option<LaunchPlan> {
        let LauncherState::Aiming { anchor } = std::mem::take(&mut self.state) else {
            return None;
        };

        let delta = [anchor[0] - point[0], anchor[1] - point[1]];
        let distance = delta[0].hypot(delta[1]);
        if distance < config.min_drag_distance {
            return None;
        }
        Some(plan_launch(anchor, delta, distance, config))
    }

    /// Drops the anchor without launching.
    pub fn cancel(&mut self) {
        self.state = LauncherState::Idle;
    }
}

fn plan_launch(anchor: [f32; 2], delta: [f32; 2], distance: f32, config: &LauncherConfig) -> LaunchPlan {
    let power = config.max_power.min(distance * config.power_scale);
    let angle = delta[1].atan2(delta[0]);
    let (sin, cos) = angle.sin_cos();
    let speed = power * config.velocity_damping;

    LaunchPlan {
        position: [
            anchor[0] - cos * config.spawn_offset,
            anchor[1] - sin * config.spawn_offset,
        ],
        velocity: [cos * speed, sin * speed],
        power,
        angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_release_without_anchor_is_noop() {
        let mut launcher = LauncherController::new();
        assert!(launcher.release([10.0, 10.0], &LauncherConfig::default()).is_none());
        assert_eq!(launcher.state(), LauncherState::Idle);
    }

    #[test]
    fn test_aim_vector_follows_pointer() {
        let mut launcher = LauncherController::new();
        assert!(launcher.drag([1.0, 1.0]).is_none());

        launcher.begin([100.0, 200.0]);
        let aim = launcher.drag([80.0, 230.0]).unwrap();
        assert_eq!(aim.from, [100.0, 200.0]);
        assert_eq!(aim.to, [80.0, 230.0]);
        assert!(launcher.is_aiming());
    }

    #[test]
    fn test_full_power_diagonal_launch() {
        let config = LauncherConfig::default();
        let mut launcher = LauncherController::new();
        launcher.begin([500.0, 500.0]);

        // Pull back down-left by (200, 200): launch up-right.
        let plan = launcher.release([300.0, 700.0], &config).unwrap();

        assert_eq!(plan.power, 2200.0);
        assert!(approx(plan.angle, -std::f32::consts::FRAC_PI_4));
        let speed = 2200.0 * 0.02;
        let component = speed / std::f32::consts::SQRT_2;
        assert!(approx(plan.velocity[0], component));
        assert!(approx(plan.velocity[1], -component));

        // Spawned 18 units back toward the release point.
        let back = 18.0 / std::f32::consts::SQRT_2;
        assert!(approx(plan.position[0], 500.0 - back));
        assert!(approx(plan.position[1], 500.0 + back));
        assert_eq!(launcher.state(), LauncherState::Idle);
    }

    #[test]
    fn test_power_scales_below_cap() {
        let config = LauncherConfig::default();
        let mut launcher = LauncherController::new();
        launcher.begin([0.0, 0.0]);

        let plan = launcher.release([-50.0, 0.0], &config).unwrap();

        assert_eq!(plan.power, 600.0);
        assert!(approx(plan.angle, 0.0));
        assert!(approx(plan.velocity[0], 12.0));
        assert!(approx(plan.velocity[1], 0.0));
    }

    #[test]
    fn test_zero_drag_still_launches_with_zero_velocity() {
        let config = LauncherConfig::default();
        let mut launcher = LauncherController::new();
        launcher.begin([40.0, 40.0]);

        let plan = launcher.release([40.0, 40.0], &config).unwrap();

        assert_eq!(plan.power, 0.0);
        assert_eq!(plan.velocity, [0.0, 0.0]);
    }

    #[test]
    fn test_min_drag_guard_when_configured() {
        let config = LauncherConfig {
            min_drag_distance: 6.0,
            ..LauncherConfig::default()
        };
        let mut launcher = LauncherController::new();
        launcher.begin([40.0, 40.0]);

        assert!(launcher.release([42.0, 41.0], &config).is_none());
        assert!(!launcher.is_aiming());
    }

    #[test]
    fn test_cancel_drops_anchor() {
        let mut launcher = LauncherController::new();
        launcher.begin([1.0, 2.0]);
        launcher.cancel();
        assert!(launcher.release([0.0, 0.0], &LauncherConfig::default()).is_none());
    }
}
