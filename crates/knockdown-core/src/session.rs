//! Game session.
//!
//! `GameSession` owns every piece of mutable game state: the physics world,
//! the level index, score and win flag, pending delayed tasks and the tool
//! gesture state. Hosts drive it with `handle` for input and `tick` once per
//! physics step, and render from `hud`.

use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use crate::body::BodyKind;
use crate::command::{CommandQueue, GameCommand};
use crate::config::GameConfig;
use crate::gravity::GravityPass;
use crate::launcher::LaunchPlan;
use crate::level::LevelCatalog;
use crate::physics::TICK_RATE;
use crate::schedule::Scheduler;
use crate::scoring::{ScoreTracker, TargetScored};
use crate::tools::{GuideLine, Tool, ToolAction, ToolController};
use crate::world::GameWorld;

/// Work deferred by a number of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Remove a scored target once collisions have settled.
    RemoveBody(RigidBodyHandle),
    /// Move on after a win.
    AdvanceLevel,
}

/// Something observable that happened during `handle` or `tick`.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelLoaded { index: usize, name: String },
    TargetScored(TargetScored),
    ScoreChanged { score: u32 },
    LevelWon { index: usize },
    BodySpawned { handle: RigidBodyHandle, kind: BodyKind },
    BodyRemoved(RigidBodyHandle),
    ProjectileLaunched { handle: RigidBodyHandle, plan: LaunchPlan },
    Cleared { removed: usize },
}

/// Everything a host UI needs to draw the overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HudState {
    pub score: u32,
    /// 1-based level number.
    pub level_label: usize,
    pub level_name: String,
    pub win_banner: bool,
    pub tool: Tool,
    pub guide: Option<GuideLine>,
}

pub struct GameSession {
    config: GameConfig,
    catalog: LevelCatalog,
    world: GameWorld,
    tracker: ScoreTracker,
    level_index: usize,
    scheduler: Scheduler<ScheduledTask>,
    tools: ToolController,
    gravity: GravityPass,
    win_banner: bool,
    guide: Option<GuideLine>,
}

impl GameSession {
    /// Creates a session with the first level loaded.
    pub fn new(config: GameConfig, catalog: LevelCatalog) -> Self {
        let world = GameWorld::new(&config.arena, config.gravity.strength);
        let mut session = Self {
            config,
            catalog,
            world,
            tracker: ScoreTracker::new(),
            level_index: 0,
            scheduler: Scheduler::new(),
            tools: ToolController::default(),
            gravity: GravityPass::new(),
            win_banner: false,
            guide: None,
        };
        session.load_level(0);
        session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn score(&self) -> u32 {
        self.tracker.score()
    }

    pub fn won(&self) -> bool {
        self.tracker.won()
    }

    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    /// Number of delayed tasks not yet run.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Loads the level at `index`, clamped into the catalog. Resets score and
    /// win state and drops every pending delayed task.
    pub fn load_level(&mut self, index: i64) -> Vec<GameEvent> {
        let index = self.catalog.clamp_index(index);
        let level = self.catalog.describe_level(index as i64);

        let cancelled = self.scheduler.cancel_all();
        self.world.load_level(level);
        self.tracker.reset();
        self.level_index = index;
        self.win_banner = false;
        self.guide = None;

        tracing::info!(
            "[session] level {} '{}' loaded ({} targets, {} tasks cancelled)",
            index + 1,
            level.name,
            level.target_count(),
            cancelled
        );

        vec![
            GameEvent::LevelLoaded {
                index,
                name: level.name.clone(),
            },
            GameEvent::ScoreChanged { score: 0 },
        ]
    }

    pub fn next_level(&mut self) -> Vec<GameEvent> {
        self.load_level(self.level_index as i64 + 1)
    }

    pub fn prev_level(&mut self) -> Vec<GameEvent> {
        self.load_level(self.level_index as i64 - 1)
    }

    pub fn reset_level(&mut self) -> Vec<GameEvent> {
        self.load_level(self.level_index as i64)
    }

    /// Removes everything but the boundary walls, level blocks included.
    /// Score and level index are left alone.
    pub fn clear(&mut self) -> Vec<GameEvent> {
        let removed = self.world.clear_player_objects();
        self.guide = None;
        tracing::info!("[session] cleared {} bodies", removed);
        vec![GameEvent::Cleared { removed }]
    }

    /// Applies one input command.
    pub fn handle(&mut self, command: GameCommand) -> Vec<GameEvent> {
        if !command.is_pointer() {
            tracing::info!("[session] command {:?}", command);
        }

        match command {
            GameCommand::PointerDown { x, y } => {
                let action = self.tools.pointer_down([x, y]);
                self.apply_action(action)
            }
            GameCommand::PointerMove { x, y } => {
                let action = self.tools.pointer_move([x, y]);
                self.apply_action(action)
            }
            GameCommand::PointerUp { x, y } => {
                let action = self.tools.pointer_up([x, y], &self.config.launcher);
                self.apply_action(action)
            }
            GameCommand::SelectTool { tool } => {
                self.tools.select(tool);
                self.guide = None;
                Vec::new()
            }
            GameCommand::PrevLevel => self.prev_level(),
            GameCommand::NextLevel => self.next_level(),
            GameCommand::LoadLevel { index } => self.load_level(index),
            GameCommand::ResetLevel => self.reset_level(),
            GameCommand::Clear => self.clear(),
            GameCommand::SetGravity { strength } => {
                self.config.gravity.strength = strength;
                self.world.set_gravity_strength(strength);
                Vec::new()
            }
            GameCommand::SetMassStrength { strength } => {
                self.config.gravity.gravity_constant = strength;
                self.config.gravity.default_source_mass = strength;
                Vec::new()
            }
            GameCommand::Yield => Vec::new(),
        }
    }

    /// Applies every command queued before the next `Yield`.
    pub fn drain_commands(&mut self, queue: &CommandQueue) -> Vec<GameEvent> {
        queue
            .drain_until_yield()
            .into_iter()
            .flat_map(|command| self.handle(command))
            .collect()
    }

    fn apply_action(&mut self, action: ToolAction) -> Vec<GameEvent> {
        let tools = &self.config.tools;
        let spawned = |handle, kind| vec![GameEvent::BodySpawned { handle, kind }];

        match action {
            ToolAction::None => Vec::new(),
            ToolAction::Guide(guide) => {
                self.guide = guide;
                Vec::new()
            }
            ToolAction::SpawnWall { start, end } => {
                self.guide = None;
                match self.world.spawn_wall(start, end, tools) {
                    Some(handle) => spawned(handle, BodyKind::PlayerObject),
                    None => Vec::new(),
                }
            }
            ToolAction::SpawnBox(point) => {
                spawned(self.world.spawn_box(point, tools), BodyKind::PlayerObject)
            }
            ToolAction::SpawnCircle(point) => {
                spawned(self.world.spawn_circle(point, tools), BodyKind::PlayerObject)
            }
            ToolAction::SpawnPolygon(point) => {
                spawned(self.world.spawn_polygon(point, tools), BodyKind::PlayerObject)
            }
            ToolAction::PlaceMass(point) => {
                let gravity = &self.config.gravity;
                let handle = self.world.spawn_gravity_source(
                    point,
                    gravity.default_source_mass,
                    gravity.source_radius,
                );
                spawned(handle, BodyKind::GravitySource)
            }
            ToolAction::Erase(point) => self
                .world
                .erase_at(point)
                .into_iter()
                .map(GameEvent::BodyRemoved)
                .collect(),
            ToolAction::Launch(plan) => {
                self.guide = None;
                let velocity = [plan.velocity[0] * TICK_RATE, plan.velocity[1] * TICK_RATE];
                let handle = self
                    .world
                    .spawn_projectile(plan.position, velocity, &self.config.launcher);
                tracing::debug!(
                    "[session] launch power {:.1} angle {:.3}",
                    plan.power,
                    plan.angle
                );
                vec![GameEvent::ProjectileLaunched { handle, plan }]
            }
        }
    }

    /// Advances the game by one physics step.
    ///
    /// Order: gravity-source forces, integration, target scoring, win check,
    /// then any delayed task that has come due.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        self.gravity.apply(&mut self.world, &self.config.gravity);
        self.world.physics.step();
        let now = self.world.physics.current_frame();

        let scored = self.tracker.evaluate_targets(&mut self.world, &self.config);
        if !scored.is_empty() {
            let delay = self.config.scoring.removal_delay_frames();
            for target in scored {
                self.scheduler
                    .schedule(now, delay, ScheduledTask::RemoveBody(target.handle));
                events.push(GameEvent::TargetScored(target));
            }
            events.push(GameEvent::ScoreChanged {
                score: self.tracker.score(),
            });
        }

        if self.tracker.evaluate_win(&self.world, &self.config) {
            self.win_banner = true;
            tracing::info!("[session] level {} won", self.level_index + 1);
            events.push(GameEvent::LevelWon {
                index: self.level_index,
            });
            if self.level_index + 1 < self.catalog.max_levels() {
                self.scheduler.schedule(
                    now,
                    self.config.scoring.advance_delay_frames(),
                    ScheduledTask::AdvanceLevel,
                );
            }
        }

        for task in self.scheduler.drain_due(now) {
            match task {
                ScheduledTask::RemoveBody(handle) => {
                    // The body may already be gone (erased or cleared).
                    if self.world.remove_body(handle) {
                        events.push(GameEvent::BodyRemoved(handle));
                    }
                }
                ScheduledTask::AdvanceLevel => {
                    events.extend(self.next_level());
                    // Loading cancelled whatever else was due this frame.
                    break;
                }
            }
        }

        events
    }

    /// Drains queued input and then steps once.
    pub fn run_frame(&mut self, queue: &CommandQueue) -> Vec<GameEvent> {
        let mut events = self.drain_commands(queue);
        events.extend(self.tick());
        events
    }

    pub fn hud(&self) -> HudState {
        HudState {
            score: self.tracker.score(),
            level_label: self.level_index + 1,
            level_name: self.catalog.describe_level(self.level_index as i64).name.clone(),
            win_banner: self.win_banner,
            tool: self.tools.tool(),
            guide: self.guide,
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("level_index", &self.level_index)
            .field("score", &self.tracker.score())
            .field("won", &self.tracker.won())
            .field("bodies", &self.world.bodies.len())
            .field("pending_tasks", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}
