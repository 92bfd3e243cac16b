//! Score and win-state tracking.
//!
//! Runs after every physics step. Targets are scored at most once thanks to
//! the `scored` tag; the win signal fires at most once per level instance.

use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use crate::body::{BodyInfo, BodyShape};
use crate::config::GameConfig;
use crate::world::GameWorld;

/// Why a target counted as knocked down.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReason {
    Fallen,
    Toppled,
}

/// One target that was just scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetScored {
    pub handle: RigidBodyHandle,
    pub points: u32,
    pub reason: ScoreReason,
}

/// Score total and win flag for the current level instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
    won: bool,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn won(&self) -> bool {
        self.won
    }

    /// Back to a fresh level: score 0, not won.
    pub fn reset(&mut self) {
        self.score = 0;
        self.won = false;
    }

    /// Marks and awards every target that fell or toppled since the last step.
    pub fn evaluate_targets(&mut self, world: &mut GameWorld, config: &GameConfig) -> Vec<TargetScored> {
        let fall_line = config.arena.height - config.scoring.fall_margin;
        let tilt = config.scoring.tilt_threshold;

        let mut scored = Vec::new();
        for info in world.bodies.iter_mut() {
            if !info.tags.is_target || info.tags.scored {
                continue;
            }
            let (Some([_, y]), Some(angle)) = (
                world.physics.body_position(info.handle),
                world.physics.body_angle(info.handle),
            ) else {
                continue;
            };

            let reason = if y > fall_line {
                ScoreReason::Fallen
            } else if angle.abs() > tilt {
                ScoreReason::Toppled
            } else {
                continue;
            };

            info.tags.scored = true;
            let points = target_points(info, config);
            self.score = self.score.saturating_add(points);
            tracing::debug!(
                "[scoring] target {:?} {:?} for {} points",
                info.handle,
                reason,
                points
            );
            scored.push(TargetScored {
                handle: info.handle,
                points,
                reason,
            });
        }
        scored
    }

    /// Returns `true` on the first step where no level block overlaps the
    /// primary platform. Later calls return `false` until `reset`.
    pub fn evaluate_win(&mut self, world: &GameWorld, config: &GameConfig) -> bool {
        if self.won {
            return false;
        }
        let Some(platform) = world
            .bodies
            .primary_platform()
            .and_then(|p| p.aabb(&world.physics))
        else {
            return false;
        };
        let platform = platform.expand(config.scoring.win_overlap_margin);

        let blocked = world
            .bodies
            .level_blocks()
            .filter_map(|block| block.aabb(&world.physics))
            .any(|bounds| bounds.overlaps(&platform));
        if blocked {
            return false;
        }

        self.won = true;
        true
    }
}

fn target_points(info: &BodyInfo, config: &GameConfig) -> u32 {
    match info.shape {
        BodyShape::Circle { .. } => config.scoring.circle_target_points,
        BodyShape::Rect { .. } | BodyShape::Polygon { .. } => config.scoring.rect_target_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelCatalog;

    fn level_world(index: i64) -> (GameWorld, GameConfig) {
        let config = GameConfig::default();
        let mut world = GameWorld::new(&config.arena, config.gravity.strength);
        world.load_level(LevelCatalog::classic().describe_level(index));
        (world, config)
    }

    fn remove_level_blocks(world: &mut GameWorld) {
        let blocks: Vec<_> = world.bodies.level_blocks().map(|b| b.handle).collect();
        for handle in blocks {
            world.remove_body(handle);
        }
    }

    #[test]
    fn test_fresh_level_scores_nothing() {
        let (mut world, config) = level_world(0);
        let mut tracker = ScoreTracker::new();

        assert!(tracker.evaluate_targets(&mut world, &config).is_empty());
        assert!(!tracker.evaluate_win(&world, &config));
        assert_eq!(tracker.score(), 0);
    }

    #[test]
    fn test_fallen_circle_target_scores_once() {
        let (mut world, config) = level_world(0);
        let mut tracker = ScoreTracker::new();
        let target = world.bodies.targets().next().unwrap().handle;

        world.physics.set_body_position(target, [400.0, 660.0]);
        let first = tracker.evaluate_targets(&mut world, &config);
        let second = tracker.evaluate_targets(&mut world, &config);

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].handle, target);
        assert_eq!(first[0].points, 10);
        assert_eq!(first[0].reason, ScoreReason::Fallen);
        assert!(second.is_empty());
        assert_eq!(tracker.score(), 10);
        assert!(world.bodies.get(target).unwrap().tags.scored);
    }

    #[test]
    fn test_toppled_rect_target_scores_hundred() {
        let (mut world, config) = level_world(1);
        let mut tracker = ScoreTracker::new();
        let target = world
            .bodies
            .targets()
            .find(|t| !t.shape.is_circle())
            .unwrap()
            .handle;

        world.physics.set_body_angle(target, -1.2);
        let scored = tracker.evaluate_targets(&mut world, &config);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].reason, ScoreReason::Toppled);
        assert_eq!(tracker.score(), 100);
    }

    #[test]
    fn test_tilt_at_threshold_does_not_score() {
        let (mut world, config) = level_world(1);
        let mut tracker = ScoreTracker::new();
        let target = world.bodies.targets().next().unwrap().handle;

        world.physics.set_body_angle(target, 1.0);
        assert!(tracker.evaluate_targets(&mut world, &config).is_empty());
    }

    #[test]
    fn test_win_fires_once_when_platform_clear() {
        let (mut world, config) = level_world(0);
        let mut tracker = ScoreTracker::new();

        remove_level_blocks(&mut world);

        assert!(tracker.evaluate_win(&world, &config));
        assert!(tracker.won());
        assert!(!tracker.evaluate_win(&world, &config));

        tracker.reset();
        assert!(!tracker.won());
        assert_eq!(tracker.score(), 0);
    }

    #[test]
    fn test_block_beside_platform_within_margin_blocks_win() {
        let (mut world, config) = level_world(0);
        let mut tracker = ScoreTracker::new();
        let blocks: Vec<_> = world.bodies.level_blocks().map(|b| b.handle).collect();
        let (keep, rest) = blocks.split_first().unwrap();
        for &handle in rest {
            world.remove_body(handle);
        }

        // Platform spans x in [800, 1120]; a 40-wide box centred at 1142
        // starts 2 units past the edge, inside the 4-unit margin.
        world.physics.set_body_position(*keep, [1142.0, 580.0]);
        assert!(!tracker.evaluate_win(&world, &config));

        world.physics.set_body_position(*keep, [1200.0, 580.0]);
        assert!(tracker.evaluate_win(&world, &config));
    }

    #[test]
    fn test_no_primary_platform_never_wins() {
        let config = GameConfig::default();
        let world = GameWorld::new(&config.arena, 1.0);
        let mut tracker = ScoreTracker::new();

        assert!(!tracker.evaluate_win(&world, &config));
    }
}
