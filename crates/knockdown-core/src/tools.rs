//! Sandbox pointer tools.
//!
//! Routes pointer down/move/up to whichever tool is selected and reports
//! what the session should do. The controller itself never touches the world.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LauncherConfig;
use crate::launcher::{AimVector, LaunchPlan, LauncherController};

/// Palette tool selected by the player.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Drag to draw a static wall.
    #[default]
    Wall,
    Box,
    Circle,
    Polygon,
    /// Drag back and release to fire a projectile.
    Launcher,
    /// Click to place a gravity source.
    Mass,
    /// Click to remove bodies under the pointer.
    Erase,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Wall,
        Tool::Box,
        Tool::Circle,
        Tool::Polygon,
        Tool::Launcher,
        Tool::Mass,
        Tool::Erase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Wall => "wall",
            Tool::Box => "box",
            Tool::Circle => "circle",
            Tool::Polygon => "polygon",
            Tool::Launcher => "launcher",
            Tool::Mass => "mass",
            Tool::Erase => "erase",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tool '{0}'")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// Transient line the host UI draws during a drag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuideLine {
    /// Preview of a wall being drawn.
    Wall { from: [f32; 2], to: [f32; 2] },
    /// Launcher band from the anchor to the pointer.
    Aim(AimVector),
}

/// What a pointer event asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolAction {
    None,
    /// Update (or clear, with `None`) the guide line.
    Guide(Option<GuideLine>),
    SpawnWall { start: [f32; 2], end: [f32; 2] },
    SpawnBox([f32; 2]),
    SpawnCircle([f32; 2]),
    SpawnPolygon([f32; 2]),
    PlaceMass([f32; 2]),
    Erase([f32; 2]),
    Launch(LaunchPlan),
}

/// Per-tool gesture state.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    tool: Tool,
    wall_start: Option<[f32; 2]>,
    launcher: LauncherController,
}

impl ToolController {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            ..Self::default()
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switches tools, abandoning any gesture in progress.
    pub fn select(&mut self, tool: Tool) {
        self.tool = tool;
        self.wall_start = None;
        self.launcher.cancel();
    }

    pub fn launcher(&self) -> &LauncherController {
        &self.launcher
    }

    pub fn pointer_down(&mut self, point: [f32; 2]) -> ToolAction {
        match self.tool {
            Tool::Wall => {
                self.wall_start = Some(point);
                ToolAction::None
            }
            Tool::Launcher => {
                self.launcher.begin(point);
                ToolAction::None
            }
            Tool::Mass => ToolAction::PlaceMass(point),
            Tool::Erase => ToolAction::Erase(point),
            Tool::Box | Tool::Circle | Tool::Polygon => ToolAction::None,
        }
    }

    pub fn pointer_move(&mut self, point: [f32; 2]) -> ToolAction {
        if let Some(from) = self.wall_start {
            return ToolAction::Guide(Some(GuideLine::Wall { from, to: point }));
        }
        match self.launcher.drag(point) {
            Some(aim) => ToolAction::Guide(Some(GuideLine::Aim(aim))),
            None => ToolAction::None,
        }
    }

    pub fn pointer_up(&mut self, point: [f32; 2], launcher: &LauncherConfig) -> ToolAction {
        match self.tool {
            Tool::Wall => match self.wall_start.take() {
                Some(start) => ToolAction::SpawnWall { start, end: point },
                None => ToolAction::None,
            },
            Tool::Box => ToolAction::SpawnBox(point),
            Tool::Circle => ToolAction::SpawnCircle(point),
            Tool::Polygon => ToolAction::SpawnPolygon(point),
            Tool::Launcher => {
                if !self.launcher.is_aiming() {
                    return ToolAction::None;
                }
                match self.launcher.release(point, launcher) {
                    Some(plan) => ToolAction::Launch(plan),
                    None => ToolAction::Guide(None),
                }
            }
            Tool::Mass | Tool::Erase => ToolAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_parse() {
        assert_eq!("launcher".parse::<Tool>().unwrap(), Tool::Launcher);
        assert_eq!("ERASE".parse::<Tool>().unwrap(), Tool::Erase);
        assert!("hammer".parse::<Tool>().is_err());
        for tool in Tool::ALL {
            assert_eq!(tool.to_string().parse::<Tool>().unwrap(), tool);
        }
    }

    #[test]
    fn test_wall_drag_flow() {
        let mut tools = ToolController::new(Tool::Wall);
        let config = LauncherConfig::default();

        assert_eq!(tools.pointer_down([10.0, 10.0]), ToolAction::None);
        assert_eq!(
            tools.pointer_move([50.0, 10.0]),
            ToolAction::Guide(Some(GuideLine::Wall {
                from: [10.0, 10.0],
                to: [50.0, 10.0]
            }))
        );
        assert_eq!(
            tools.pointer_up([60.0, 10.0], &config),
            ToolAction::SpawnWall {
                start: [10.0, 10.0],
                end: [60.0, 10.0]
            }
        );
        // Up without a down does nothing.
        assert_eq!(tools.pointer_up([60.0, 10.0], &config), ToolAction::None);
    }

    #[test]
    fn test_launcher_flow() {
        let mut tools = ToolController::new(Tool::Launcher);
        let config = LauncherConfig::default();

        assert_eq!(tools.pointer_up([0.0, 0.0], &config), ToolAction::None);

        tools.pointer_down([100.0, 100.0]);
        assert!(matches!(
            tools.pointer_move([80.0, 120.0]),
            ToolAction::Guide(Some(GuideLine::Aim(_)))
        ));
        assert!(matches!(
            tools.pointer_up([80.0, 120.0], &config),
            ToolAction::Launch(_)
        ));
        assert_eq!(tools.pointer_move([0.0, 0.0]), ToolAction::None);
    }

    #[test]
    fn test_click_tools() {
        let mut tools = ToolController::new(Tool::Mass);
        let config = LauncherConfig::default();
        assert_eq!(tools.pointer_down([5.0, 6.0]), ToolAction::PlaceMass([5.0, 6.0]));

        tools.select(Tool::Erase);
        assert_eq!(tools.pointer_down([5.0, 6.0]), ToolAction::Erase([5.0, 6.0]));

        tools.select(Tool::Polygon);
        assert_eq!(tools.pointer_down([5.0, 6.0]), ToolAction::None);
        assert_eq!(
            tools.pointer_up([7.0, 8.0], &config),
            ToolAction::SpawnPolygon([7.0, 8.0])
        );
    }

    #[test]
    fn test_select_abandons_gesture() {
        let mut tools = ToolController::new(Tool::Launcher);
        tools.pointer_down([1.0, 1.0]);
        tools.select(Tool::Launcher);
        assert!(!tools.launcher().is_aiming());
    }
}
