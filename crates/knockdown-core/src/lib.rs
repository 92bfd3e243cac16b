//! Knockdown Core Library
//!
//! Game logic for a 2D "knock down the targets" physics sandbox on top of
//! `Rapier2D`: a level catalog, a slingshot launcher, sandbox tools, a
//! gravity-source attraction pass, and score/win tracking, all owned by a
//! single `GameSession`.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

pub mod body;
pub mod command;
pub mod config;
pub mod gravity;
pub mod launcher;
pub mod level;
pub mod physics;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod tools;
pub mod world;

pub use body::{Aabb, BodyInfo, BodyKind, BodyRegistry, BodyShape, BodyTags};
pub use command::{CommandQueue, GameCommand};
pub use config::{
    ArenaConfig, ConfigError, GameConfig, GravityConfig, LauncherConfig, MaterialConfig,
    ScoringConfig, ToolsConfig,
};
pub use gravity::{GravityPass, apply_gravity_sources};
pub use launcher::{AimVector, LaunchPlan, LauncherController, LauncherState};
pub use level::{BlockSpec, BlockTags, LevelCatalog, LevelError, LevelSpec, PlatformSpec};
pub use physics::{PHYSICS_DT, PhysicsWorld, TICK_RATE};
pub use schedule::Scheduler;
pub use scoring::{ScoreReason, ScoreTracker, TargetScored};
pub use session::{GameEvent, GameSession, HudState, ScheduledTask};
pub use tools::{GuideLine, Tool, ToolAction, ToolController};
pub use world::GameWorld;
