//! World - terrain, gravity and the player advanced in one fixed tick order

use burrow_blocks::LootItem;
use glam::IVec2;

use super::digging_system::DiggingSystem;
use super::generation::{ChunkGenerator, WorldGenerator};
use super::gravity_system::{GravityReport, GravitySystem, PlayerFall};
use super::rules::GameRules;
use super::snapshot::ChunkSnapshot;
use super::terrain::TerrainStore;
use super::worldgen_config::WorldGenConfig;
use crate::entity::{InputState, Player};
use crate::error::ConfigError;
use crate::events::{DeathCause, EventQueue, GameEvent};

/// Mixed into the base seed once per level
const LEVEL_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// The game world for one session
pub struct World {
    terrain: TerrainStore,
    gravity: GravitySystem,
    player: Player,
    rules: GameRules,
    events: EventQueue,
    seed: u64,
    level: u32,
    score: i64,
    tick: u64,
    /// Set by a death that asks for fresh terrain on restart
    regenerate_on_restart: bool,
}

impl World {
    /// Create a world backed by the procedural generator
    pub fn new(seed: u64, rules: GameRules, worldgen: WorldGenConfig) -> Result<Self, ConfigError> {
        worldgen.validate()?;
        let generator = WorldGenerator::from_config(seed, worldgen);
        Self::with_generator(seed, rules, Box::new(generator))
    }

    /// Create a world with a custom chunk generator
    pub fn with_generator(
        seed: u64,
        rules: GameRules,
        generator: Box<dyn ChunkGenerator>,
    ) -> Result<Self, ConfigError> {
        rules.validate()?;
        let terrain = TerrainStore::new(generator, rules.chunk_cache_limit);
        let spawn = terrain.bounds().spawn_tile();
        let player = Player::new(spawn, rules.tile_size, rules.countdown_seconds);
        log::info!(
            "[WORLD] Created world: seed {}, {}x{} tiles, spawn ({}, {})",
            seed,
            terrain.bounds().width_tiles(),
            terrain.bounds().height_tiles(),
            spawn.x,
            spawn.y
        );
        Ok(Self {
            terrain,
            gravity: GravitySystem::new(),
            player,
            rules,
            events: EventQueue::new(),
            seed,
            level: 0,
            score: 0,
            tick: 0,
            regenerate_on_restart: false,
        })
    }

    /// Advance one tick: streaming, gravity, digging, effects
    ///
    /// One-shot input signals are consumed.
    pub fn update(&mut self, dt_ms: f32, input: &mut InputState) -> GravityReport {
        self.tick += 1;
        let mark = self.events.len();

        self.terrain
            .stream_around(self.player.grid, self.rules.stream_radius, &mut self.events);

        let player = (!self.player.is_dead).then_some(&self.player);
        let report = self
            .gravity
            .update(&mut self.terrain, player, &self.rules, &mut self.events);
        if let Some(kind) = report.crushed_by {
            DiggingSystem::kill(
                &mut self.player,
                DeathCause::Crushed(kind),
                false,
                &mut self.events,
            );
        }

        match GravitySystem::update_player(&mut self.player, &mut self.terrain, &self.rules) {
            PlayerFall::Landed => DiggingSystem::on_landed(&mut self.player),
            PlayerFall::Killed {
                cause,
                should_regenerate,
            } => {
                DiggingSystem::kill(
                    &mut self.player,
                    DeathCause::Lethal(cause),
                    should_regenerate,
                    &mut self.events,
                );
            }
            PlayerFall::Idle | PlayerFall::Falling => {}
        }

        DiggingSystem::update(
            &mut self.player,
            &mut self.terrain,
            input,
            &self.rules,
            &mut self.events,
            dt_ms,
        );
        input.clear_pulses();

        self.apply_effects(mark);
        report
    }

    /// Turn this tick's loot and death events into score, time and restart policy
    fn apply_effects(&mut self, mark: usize) {
        let mut rewards: Vec<(i32, f32)> = Vec::new();
        for event in self.events.iter().skip(mark) {
            match event {
                GameEvent::BlockLoot {
                    loot,
                    timer_increment_seconds,
                    ..
                } => rewards.push((LootItem::total(loot), *timer_increment_seconds)),
                GameEvent::PlayerDeath {
                    should_regenerate: true,
                    ..
                } => self.regenerate_on_restart = true,
                _ => {}
            }
        }

        for (amount, seconds) in rewards {
            if amount != 0 {
                self.score += amount as i64;
                self.events.publish(GameEvent::ScoreAdd { amount });
            }
            if seconds > 0.0
                && let Some(whole) = self.player.countdown.add_seconds(seconds)
            {
                log::debug!("[TIMER] +{}s, now {}s", seconds, whole);
                self.events.publish(GameEvent::TimerUpdate { seconds: whole });
            }
        }
    }

    /// Respawn after a death; false while the player is alive
    pub fn restart(&mut self) -> bool {
        if !self.player.is_dead {
            return false;
        }
        if self.regenerate_on_restart {
            self.regenerate_on_restart = false;
            self.regenerate();
        }
        DiggingSystem::respawn(&mut self.player, false, &mut self.events);
        true
    }

    /// Enter the door at `door`, see [`DiggingSystem::enter_door`]
    pub fn enter_door(&mut self, door: IVec2) -> bool {
        DiggingSystem::enter_door(&mut self.player, &mut self.terrain, door, &mut self.events)
    }

    /// Finish a level transition and build the next level
    pub fn complete_level_transition(&mut self, trigger_id: u64) -> bool {
        if !DiggingSystem::complete_transition(
            &mut self.player,
            trigger_id,
            &self.rules,
            &mut self.events,
        ) {
            return false;
        }
        self.level += 1;
        log::info!("[WORLD] Entering level {}", self.level);
        self.regenerate();
        true
    }

    /// Rebuild terrain for the current level and drop falling blocks
    pub fn regenerate(&mut self) {
        self.terrain.regenerate(self.level_seed());
        self.gravity.clear();
    }

    /// Generator seed of the current level
    pub fn level_seed(&self) -> u64 {
        self.seed
            .wrapping_add((self.level as u64).wrapping_mul(LEVEL_SEED_STRIDE))
    }

    /// Snapshot of a resident chunk
    pub fn snapshot_chunk(&self, chunk_x: i32, chunk_y: i32) -> Option<ChunkSnapshot> {
        self.terrain
            .cache()
            .peek(chunk_x, chunk_y)
            .map(|chunk| chunk.snapshot())
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn terrain(&self) -> &TerrainStore {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainStore {
        &mut self.terrain
    }

    pub fn gravity(&self) -> &GravitySystem {
        &self.gravity
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Hand all queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}
