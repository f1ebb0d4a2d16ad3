//! Headless host - drives a [`World`] with scripted input
//!
//! Stands in for the rendering, HUD and overlay collaborators: deaths are
//! followed by a restart after a delay, door transitions complete after a
//! delay, and all published events are tallied into a [`RunSummary`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use burrow_core::entity::{Direction, InputState};
use burrow_core::world::World;
use burrow_core::{DeathCause, GameEvent};
use glam::IVec2;

use crate::config::{GameConfig, HostConfig};

/// One scripted input signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    Start,
    Left,
    Right,
    Down,
    Up,
    HoldUp,
    ReleaseUp,
}

impl FromStr for ScriptCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "down" => Ok(Self::Down),
            "up" => Ok(Self::Up),
            "hold-up" => Ok(Self::HoldUp),
            "release-up" => Ok(Self::ReleaseUp),
            other => Err(anyhow!("Unknown script command '{}'", other)),
        }
    }
}

impl ScriptCommand {
    /// Apply the signal to this tick's input
    pub fn apply(self, input: &mut InputState) {
        match self {
            Self::Start => input.start_pressed = true,
            Self::Left => input.press(Direction::Left),
            Self::Right => input.press(Direction::Right),
            Self::Down => input.press(Direction::Down),
            Self::Up => input.press(Direction::Up),
            Self::HoldUp => input.up_held = true,
            Self::ReleaseUp => input.up_held = false,
        }
    }
}

/// Input signals keyed by tick
///
/// Entries are `<tick>:<command>`, separated by newlines or commas. `#` starts
/// a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputScript {
    entries: BTreeMap<u64, Vec<ScriptCommand>>,
}

impl InputScript {
    pub fn parse(source: &str) -> Result<Self> {
        let mut entries: BTreeMap<u64, Vec<ScriptCommand>> = BTreeMap::new();
        for (line_no, line) in source.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default();
            for entry in line.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let Some((tick, command)) = entry.split_once(':') else {
                    bail!("Line {}: expected <tick>:<command>, got '{}'", line_no + 1, entry);
                };
                let tick: u64 = tick
                    .trim()
                    .parse()
                    .with_context(|| format!("Line {}: invalid tick '{}'", line_no + 1, tick))?;
                let command = command
                    .parse()
                    .with_context(|| format!("Line {}", line_no + 1))?;
                entries.entry(tick).or_default().push(command);
            }
        }
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input script {:?}", path))?;
        Self::parse(&source)
    }

    /// Press start on the first tick and dig straight down
    pub fn start_only() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(0, vec![ScriptCommand::Start]);
        Self { entries }
    }

    pub fn commands_at(&self, tick: u64) -> &[ScriptCommand] {
        self.entries
            .get(&tick)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of scripted commands
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tally of a headless run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub deaths: u32,
    pub death_causes: Vec<DeathCause>,
    pub restarts: u32,
    pub levels_completed: u32,
    pub score: i64,
    pub blocks_destroyed: u32,
    pub blocks_landed: u32,
    /// Destroyed blocks that asked the host to pause
    pub pauses: u32,
    pub spawns_activated: u32,
    pub final_position: IVec2,
    pub final_seconds: u32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ticks:            {}", self.ticks)?;
        writeln!(f, "Score:            {}", self.score)?;
        writeln!(f, "Levels completed: {}", self.levels_completed)?;
        writeln!(f, "Deaths:           {}", self.deaths)?;
        for cause in &self.death_causes {
            writeln!(f, "  - {}", cause)?;
        }
        writeln!(f, "Restarts:         {}", self.restarts)?;
        writeln!(f, "Blocks destroyed: {}", self.blocks_destroyed)?;
        writeln!(f, "Pauses:           {}", self.pauses)?;
        writeln!(f, "Blocks landed:    {}", self.blocks_landed)?;
        writeln!(f, "Spawns activated: {}", self.spawns_activated)?;
        write!(
            f,
            "Final position:   ({}, {}) with {}s left",
            self.final_position.x, self.final_position.y, self.final_seconds
        )
    }
}

/// Fixed-step driver for one world
pub struct HeadlessRunner {
    world: World,
    host: HostConfig,
    script: InputScript,
    summary: RunSummary,
    /// Level-triggered signal carried between ticks
    up_held: bool,
    /// Milliseconds until the pending restart
    pending_restart: Option<f32>,
    /// Trigger id and milliseconds until the pending transition completes
    pending_transition: Option<(u64, f32)>,
}

impl HeadlessRunner {
    pub fn new(config: &GameConfig, script: InputScript) -> Result<Self> {
        let world = World::new(config.seed, config.rules.clone(), config.worldgen.clone())
            .context("Failed to create world")?;
        Ok(Self::with_world(world, config.host.clone(), script))
    }

    pub fn with_world(world: World, host: HostConfig, script: InputScript) -> Self {
        let summary = RunSummary {
            final_position: world.player().grid,
            final_seconds: world.player().countdown.seconds(),
            ..RunSummary::default()
        };
        Self {
            world,
            host,
            script,
            summary,
            up_held: false,
            pending_restart: None,
            pending_transition: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Run one tick: scripted input, world update, collaborator timers
    pub fn step(&mut self) {
        let tick = self.summary.ticks;
        let mut input = InputState {
            up_held: self.up_held,
            ..InputState::default()
        };
        for command in self.script.commands_at(tick) {
            command.apply(&mut input);
        }
        self.up_held = input.up_held;

        self.world.update(self.host.tick_ms, &mut input);
        for event in self.world.drain_events() {
            self.observe(event);
        }
        self.advance_timers();

        self.summary.ticks += 1;
        self.summary.score = self.world.score();
        self.summary.final_position = self.world.player().grid;
    }

    /// Run `ticks` more ticks and return the tally so far
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        log::info!(
            "[HOST] Running {} ticks of {}ms (seed {})",
            ticks,
            self.host.tick_ms,
            self.world.seed()
        );
        for _ in 0..ticks {
            self.step();
        }
        log::info!(
            "[HOST] Finished: score {}, {} deaths, {} levels",
            self.summary.score,
            self.summary.deaths,
            self.summary.levels_completed
        );
        self.summary.clone()
    }

    fn observe(&mut self, event: GameEvent) {
        match event {
            GameEvent::PlayerDeath { cause, .. } => {
                log::info!("[HOST] Player died ({}), restarting soon", cause);
                self.summary.deaths += 1;
                self.summary.death_causes.push(cause);
                self.pending_restart = Some(self.host.restart_delay_ms);
            }
            GameEvent::PlayerRestart { .. } => self.summary.restarts += 1,
            GameEvent::BlockDestroyed { pause, .. } => {
                self.summary.blocks_destroyed += 1;
                if pause {
                    self.summary.pauses += 1;
                }
            }
            GameEvent::BlockLanded { .. } => self.summary.blocks_landed += 1,
            GameEvent::LevelTransition { trigger_id, .. } => {
                self.pending_transition = Some((trigger_id, self.host.transition_delay_ms));
            }
            GameEvent::LevelTransitionComplete { .. } => self.summary.levels_completed += 1,
            GameEvent::TimerUpdate { seconds } => self.summary.final_seconds = seconds,
            GameEvent::SpawnActivated { .. } => self.summary.spawns_activated += 1,
            GameEvent::BlockLoot { .. }
            | GameEvent::BlockCrushedPlayer { .. }
            | GameEvent::ScoreAdd { .. } => {}
        }
    }

    fn advance_timers(&mut self) {
        let dt = self.host.tick_ms;

        if let Some(remaining) = self.pending_restart.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.pending_restart = None;
                self.world.restart();
            }
        }

        if let Some((trigger_id, remaining)) = self.pending_transition.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                let trigger_id = *trigger_id;
                self.pending_transition = None;
                self.world.complete_level_transition(trigger_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_blocks::BlockFactory;

    fn runner(script: &str) -> HeadlessRunner {
        let script = InputScript::parse(script).expect("valid script");
        HeadlessRunner::new(&GameConfig::default(), script).expect("default config")
    }

    #[test]
    fn test_parse_script() {
        let script = InputScript::parse("0:start, 3:left\n# comment\n3:hold-up\n10: release-up")
            .expect("parse");
        assert_eq!(script.len(), 4);
        assert_eq!(
            script.commands_at(3),
            &[ScriptCommand::Left, ScriptCommand::HoldUp]
        );
        assert!(script.commands_at(4).is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(InputScript::parse("start").is_err());
        assert!(InputScript::parse("x:start").is_err());
        assert!(InputScript::parse("1:jump").is_err());
    }

    #[test]
    fn test_summary_display_lists_counters() {
        let summary = RunSummary {
            deaths: 1,
            death_causes: vec![DeathCause::TimeExpired],
            restarts: 1,
            pauses: 2,
            ..RunSummary::default()
        };
        let text = summary.to_string();
        assert!(text.contains("  - time expired"));
        assert!(text.contains("Restarts:         1"));
        assert!(text.contains("Pauses:           2"));
    }

    #[test]
    fn test_held_up_persists_between_ticks() {
        let mut runner = runner("0:hold-up");
        runner.step();
        assert!(runner.up_held);
        runner.step();
        assert!(runner.up_held);
    }

    #[test]
    fn test_digging_run_destroys_blocks() {
        let mut runner = runner("0:start");
        let summary = runner.run(300);
        assert_eq!(summary.ticks, 300);
        assert!(summary.blocks_destroyed > 0);
        assert!(summary.final_position.y > -1);
    }

    #[test]
    fn test_death_leads_to_restart() {
        let mut runner = runner("0:start");
        runner.step();
        runner.world_mut().player_mut().countdown.set_remaining_ms(1.0);
        runner.step();
        assert_eq!(runner.summary().deaths, 1);
        assert_eq!(
            runner.summary().death_causes,
            vec![DeathCause::TimeExpired]
        );

        let delay_ticks = (1500.0_f32 / 16.0).ceil() as u64 + 1;
        runner.run(delay_ticks);
        assert_eq!(runner.summary().restarts, 1);
        assert!(runner.world().player().is_alive());
    }

    #[test]
    fn test_door_transition_completes() {
        let mut runner = runner("0:start");
        runner
            .world_mut()
            .terrain_mut()
            .set_block(0, 0, BlockFactory::door());
        runner.step();
        assert!(runner.world().player().is_transitioning);

        let delay_ticks = (1000.0_f32 / 16.0).ceil() as u64 + 1;
        runner.run(delay_ticks);
        assert_eq!(runner.summary().levels_completed, 1);
        assert_eq!(runner.world().level(), 1);
    }
}
