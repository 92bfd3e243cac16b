//! Input surface.
//!
//! Hosts translate their pointer and button events into `GameCommand`s and
//! push them onto a shared `CommandQueue`; the session drains the queue once
//! per frame.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::tools::Tool;

/// Commands a host can send to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    SelectTool { tool: Tool },
    PrevLevel,
    NextLevel,
    /// Load a level by index; out-of-range indices clamp.
    LoadLevel { index: i64 },
    /// Reload the current level.
    ResetLevel,
    /// Remove everything except the boundary walls.
    Clear,
    /// Ambient gravity slider.
    SetGravity { strength: f32 },
    /// Mass slider: drives `G` and the mass of newly placed sources.
    SetMassStrength { strength: f32 },
    /// Frame boundary marker - commands after this are processed in the next frame.
    Yield,
}

impl GameCommand {
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            GameCommand::PointerDown { .. } | GameCommand::PointerMove { .. } | GameCommand::PointerUp { .. }
        )
    }
}

/// Thread-safe command queue shared between a host and the session.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<GameCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: GameCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands, `Yield` markers included.
    pub fn drain(&self) -> Vec<GameCommand> {
        self.inner.lock().drain(..).collect()
    }

    /// Drain commands until the first `Yield` or the end of the queue.
    ///
    /// The `Yield` is consumed but not returned; everything after it stays
    /// queued for the next frame.
    pub fn drain_until_yield(&self) -> Vec<GameCommand> {
        let mut guard = self.inner.lock();
        let mut commands = Vec::new();

        while let Some(cmd) = guard.pop_front() {
            if matches!(cmd, GameCommand::Yield) {
                tracing::debug!("[command] Yield - deferring remaining commands to next frame");
                break;
            }
            commands.push(cmd);
        }

        commands
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
