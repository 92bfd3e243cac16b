//! Knockdown Simulator
//!
//! Runs a level headlessly for a fixed number of frames, replaying an
//! optional input script, and prints the final HUD as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use knockdown_core::{
    CommandQueue, GameCommand, GameConfig, GameEvent, GameSession, HudState, LevelCatalog, Tool,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(about = "Run a knockdown level headlessly", version)]
struct Args {
    /// Level index to start on (clamped into the catalog).
    #[arg(long, default_value_t = 0)]
    level: i64,
    /// Number of physics steps to run.
    #[arg(long, default_value_t = 600)]
    frames: u64,
    /// JSON list of `{ "frame": n, "command": {...} }` entries.
    #[arg(long)]
    script: Option<PathBuf>,
    /// JSON game config; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fire the launcher on frame 0: anchor then release, `x0,y0,x1,y1`.
    #[arg(long)]
    launch: Option<String>,
}

/// One scripted command.
#[derive(Debug, Deserialize)]
struct ScriptEntry {
    frame: u64,
    command: GameCommand,
}

#[derive(Debug, Default, Serialize)]
struct EventCounts {
    targets_scored: usize,
    levels_won: usize,
    levels_loaded: usize,
    bodies_removed: usize,
    projectiles: usize,
}

impl EventCounts {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TargetScored(_) => self.targets_scored += 1,
            GameEvent::LevelWon { .. } => self.levels_won += 1,
            GameEvent::LevelLoaded { .. } => self.levels_loaded += 1,
            GameEvent::BodyRemoved(_) => self.bodies_removed += 1,
            GameEvent::ProjectileLaunched { .. } => self.projectiles += 1,
            GameEvent::ScoreChanged { .. }
            | GameEvent::BodySpawned { .. }
            | GameEvent::Cleared { .. } => {}
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    frames: u64,
    hud: HudState,
    events: EventCounts,
}

fn parse_launch(arg: &str) -> Result<[f32; 4]> {
    let values = arg
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid --launch '{arg}'"))?;
    let Ok(values) = <[f32; 4]>::try_from(values) else {
        bail!("--launch expects four numbers: x0,y0,x1,y1");
    };
    Ok(values)
}

fn launch_commands([x0, y0, x1, y1]: [f32; 4]) -> Vec<GameCommand> {
    vec![
        GameCommand::SelectTool { tool: Tool::Launcher },
        GameCommand::PointerDown { x: x0, y: y0 },
        GameCommand::PointerMove { x: x1, y: y1 },
        GameCommand::PointerUp { x: x1, y: y1 },
    ]
}

fn load_script(path: &Path) -> Result<Vec<ScriptEntry>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut entries: Vec<ScriptEntry> =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    entries.sort_by_key(|entry| entry.frame);
    Ok(entries)
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let mut script = Vec::new();
    if let Some(arg) = &args.launch {
        let launch = launch_commands(parse_launch(arg)?);
        script.extend(launch.into_iter().map(|command| ScriptEntry { frame: 0, command }));
    }
    if let Some(path) = &args.script {
        script.extend(load_script(path)?);
    }

    let mut session = GameSession::new(config, LevelCatalog::classic());
    let mut counts = EventCounts::default();
    for event in session.load_level(args.level) {
        counts.record(&event);
    }

    let queue = CommandQueue::new();
    let mut pending = script.into_iter().peekable();
    for frame in 0..args.frames {
        while let Some(entry) = pending.next_if(|entry| entry.frame <= frame) {
            queue.push(entry.command);
        }
        queue.push(GameCommand::Yield);

        for event in session.run_frame(&queue) {
            counts.record(&event);
        }
    }

    let report = Report {
        frames: args.frames,
        hud: session.hud(),
        events: counts,
    };
    tracing::info!("[sim] finished after {} frames", report.frames);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_launch() {
        assert_eq!(
            parse_launch("300, 500,200,600").unwrap(),
            [300.0, 500.0, 200.0, 600.0]
        );
        assert!(parse_launch("1,2,3").is_err());
        assert!(parse_launch("a,b,c,d").is_err());
    }

    #[test]
    fn test_script_entries_parse() {
        let json = r#"[
            { "frame": 30, "command": { "type": "next_level" } },
            { "frame": 0, "command": { "type": "select_tool", "tool": "box" } }
        ]"#;
        let entries: Vec<ScriptEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command, GameCommand::NextLevel);
        assert_eq!(entries[1].command, GameCommand::SelectTool { tool: Tool::Box });
    }

    #[test]
    fn test_launch_scenario_fires_one_projectile() {
        let mut session = GameSession::new(GameConfig::default(), LevelCatalog::classic());
        let queue = CommandQueue::new();
        for command in launch_commands([300.0, 500.0, 200.0, 600.0]) {
            queue.push(command);
        }

        let mut counts = EventCounts::default();
        for event in session.run_frame(&queue) {
            counts.record(&event);
        }

        assert_eq!(counts.projectiles, 1);
        assert_eq!(session.hud().tool, Tool::Launcher);
    }
}
