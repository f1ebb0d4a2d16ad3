//! Gravity - falling blocks and the falling player
//!
//! Block gravity runs in two phases. The scan reads every resident chunk once
//! and decides starts, landings and crushes from that single view of the grid.
//! The apply phase then performs all relocations as one batch, so no block
//! moves more than once per tick and none observes a sibling's move.

use ahash::AHashSet;
use burrow_blocks::{Block, BlockId, Fallable, Lethal};
use glam::{IVec2, Vec2};

use super::rules::GameRules;
use super::terrain::TerrainStore;
use crate::entity::{Player, PlayerState};
use crate::events::{EventQueue, GameEvent};

/// What happened to blocks during one gravity tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GravityReport {
    pub started: usize,
    pub landed: usize,
    /// Kind of the block that hit the player, if any
    pub crushed_by: Option<burrow_blocks::BlockKind>,
    /// Malformed chunks left out of the scan
    pub skipped_chunks: usize,
}

/// Outcome of one player gravity step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFall {
    /// Player is not falling
    Idle,
    Falling,
    /// Hit solid ground; the landing handler must run
    Landed,
    /// Fell into a lethal block
    Killed {
        cause: burrow_blocks::BlockKind,
        should_regenerate: bool,
    },
}

/// Fall start decided during the scan
struct PendingStart {
    position: IVec2,
    id: BlockId,
}

/// Landing decided during the scan
struct PendingLanding {
    index: usize,
    target: IVec2,
}

/// Owns blocks while they fall between cells
#[derive(Debug, Default)]
pub struct GravitySystem {
    falling: Vec<Block>,
}

impl GravitySystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn falling_count(&self) -> usize {
        self.falling.len()
    }

    pub fn falling_blocks(&self) -> impl Iterator<Item = &Block> {
        self.falling.iter()
    }

    pub fn is_falling(&self, id: BlockId) -> bool {
        self.falling.iter().any(|b| b.id() == id)
    }

    /// Forget all falling blocks (terrain regenerated)
    pub fn clear(&mut self) {
        self.falling.clear();
    }

    /// Run one tick of block gravity over all resident chunks
    ///
    /// `player` is used for crush detection only; the caller decides what a
    /// crush does to the player.
    pub fn update(
        &mut self,
        terrain: &mut TerrainStore,
        player: Option<&Player>,
        rules: &GameRules,
        events: &mut EventQueue,
    ) -> GravityReport {
        let mut report = GravityReport::default();
        let tile = rules.tile_size;

        // Phase 1: scan
        let starts = Self::scan_unsupported(terrain, &mut report);

        let player_box = player
            .filter(|p| p.is_alive() && !p.is_transitioning)
            .map(Player::aabb);
        let mut landings = Vec::new();
        for (index, block) in self.falling.iter_mut().enumerate() {
            let kind = block.kind();
            let Some(fallable) = block.get_mut::<Fallable>() else {
                continue;
            };
            let pixel_y = fallable.integrate(rules.gravity, rules.fall_speed_max);
            let x = fallable.grid_x;
            let row = (pixel_y / tile).floor() as i32;

            let below_solid = terrain
                .peek_block(x, row + 1)
                .is_none_or(Block::is_collidable);
            if below_solid {
                landings.push(PendingLanding {
                    index,
                    target: IVec2::new(x, row),
                });
                continue;
            }

            if let Some((player_min, player_max)) = player_box {
                let block_min = Vec2::new(x as f32 * tile, pixel_y);
                let block_max = block_min + Vec2::splat(tile);
                let overlaps = block_min.x < player_max.x
                    && block_max.x > player_min.x
                    && block_min.y < player_max.y
                    && block_max.y > player_min.y;
                if overlaps {
                    log::info!("[GRAVITY] {} crushed the player at ({}, {})", kind, x, row);
                    events.publish(GameEvent::BlockCrushedPlayer { cause: kind });
                    report.crushed_by = Some(kind);
                    landings.push(PendingLanding {
                        index,
                        target: IVec2::new(x, row),
                    });
                }
            }
        }

        // Phase 2: apply
        self.apply_landings(landings, terrain, tile, events, &mut report);
        self.apply_starts(starts, terrain, tile, &mut report);

        if report.started > 0 || report.landed > 0 {
            log::trace!(
                "[GRAVITY] started={} landed={} falling={}",
                report.started,
                report.landed,
                self.falling.len()
            );
        }
        report
    }

    /// Fallable blocks at rest with nothing solid below
    ///
    /// A cell below whose chunk is not resident counts as support.
    fn scan_unsupported(terrain: &TerrainStore, report: &mut GravityReport) -> Vec<PendingStart> {
        let bounds = terrain.bounds();
        let cache = terrain.cache();
        let mut starts = Vec::new();

        for pos in cache.positions() {
            let Some(chunk) = cache.peek(pos.x, pos.y) else {
                continue;
            };
            if !chunk.is_well_formed() {
                log::warn!(
                    "[GRAVITY] Skipping malformed chunk ({}, {})",
                    pos.x,
                    pos.y
                );
                report.skipped_chunks += 1;
                continue;
            }
            for (local_x, local_y, block) in chunk.iter() {
                let Some(fallable) = block.get::<Fallable>() else {
                    continue;
                };
                if fallable.is_falling {
                    continue;
                }
                let world = bounds.chunk_to_world(pos, local_x, local_y);
                let supported = terrain
                    .peek_block(world.x, world.y + 1)
                    .is_none_or(Block::is_collidable);
                if !supported {
                    starts.push(PendingStart {
                        position: world,
                        id: block.id(),
                    });
                }
            }
        }
        starts
    }

    fn apply_landings(
        &mut self,
        mut landings: Vec<PendingLanding>,
        terrain: &mut TerrainStore,
        tile: f32,
        events: &mut EventQueue,
        report: &mut GravityReport,
    ) {
        if landings.is_empty() {
            return;
        }
        // Bottom first so blocks landing in the same column stack upward
        landings.sort_by_key(|l| std::cmp::Reverse(l.target.y));

        let mut slots: Vec<Option<Block>> = self.falling.drain(..).map(Some).collect();
        let mut occupied = AHashSet::new();
        for landing in landings {
            let Some(mut block) = slots.get_mut(landing.index).and_then(Option::take) else {
                continue;
            };
            let mut target = landing.target;
            while occupied.contains(&target) {
                target.y -= 1;
            }
            occupied.insert(target);

            if let Some(fallable) = block.get_mut::<Fallable>() {
                fallable.stop();
                fallable.grid_x = target.x;
                fallable.grid_y = target.y;
                fallable.pixel_y = target.y as f32 * tile;
            }
            let id = block.id();
            let kind = block.kind();
            if terrain.set_block(target.x, target.y, block) {
                log::debug!(
                    "[GRAVITY] {} {} landed at ({}, {})",
                    kind,
                    id,
                    target.x,
                    target.y
                );
                events.publish(GameEvent::BlockLanded {
                    block_id: id,
                    kind,
                    position: target,
                });
                report.landed += 1;
            } else {
                log::warn!(
                    "[GRAVITY] {} {} fell out of the world at ({}, {})",
                    kind,
                    id,
                    target.x,
                    target.y
                );
            }
        }
        self.falling = slots.into_iter().flatten().collect();
    }

    fn apply_starts(
        &mut self,
        starts: Vec<PendingStart>,
        terrain: &mut TerrainStore,
        tile: f32,
        report: &mut GravityReport,
    ) {
        for start in starts {
            let pos = start.position;
            // The cell may have been overwritten by a landing this tick
            if terrain.peek_block(pos.x, pos.y).map(Block::id) != Some(start.id) {
                continue;
            }
            let Some(mut block) = terrain.take_block(pos.x, pos.y) else {
                continue;
            };
            let started = block
                .get_mut::<Fallable>()
                .is_some_and(|f| f.start(pos.x, pos.y, tile));
            if started {
                log::debug!(
                    "[GRAVITY] {} {} started falling from ({}, {})",
                    block.kind(),
                    block.id(),
                    pos.x,
                    pos.y
                );
                self.falling.push(block);
                report.started += 1;
            } else {
                terrain.set_block(pos.x, pos.y, block);
            }
        }
    }

    /// Put the player into free fall from its current tile
    pub fn start_player_fall(player: &mut Player) -> bool {
        let (x, y) = (player.grid.x, player.grid.y);
        let tile = player.tile_size();
        if !player.fall.start(x, y, tile) {
            return false;
        }
        player.dig.clear();
        player.movement = None;
        player.position = player.pixel_for(player.grid);
        player.state = PlayerState::Falling;
        log::debug!("[GRAVITY] Player started falling from ({}, {})", x, y);
        true
    }

    /// Advance the falling player one tick
    ///
    /// Each newly entered row is checked before descending further: lethal
    /// blocks kill, solid blocks end the fall one row above.
    pub fn update_player(
        player: &mut Player,
        terrain: &mut TerrainStore,
        rules: &GameRules,
    ) -> PlayerFall {
        if player.state != PlayerState::Falling {
            return PlayerFall::Idle;
        }
        let tile = rules.tile_size;
        let y = player
            .fall
            .integrate(rules.gravity, rules.fall_speed_max);
        player.position.y = y;

        let leading_row = (y / tile).ceil() as i32;
        while player.grid.y < leading_row {
            let next = player.grid.y + 1;
            let block = terrain.get_block(player.grid.x, next);
            if let Some(lethal) = block.get::<Lethal>().copied() {
                let cause = block.kind();
                player.grid.y = next;
                player.fall.stop();
                return PlayerFall::Killed {
                    cause,
                    should_regenerate: lethal.should_regenerate,
                };
            }
            if block.is_collidable() {
                player.position.y = player.grid.y as f32 * tile;
                player.fall.stop();
                log::debug!(
                    "[GRAVITY] Player landed at ({}, {})",
                    player.grid.x,
                    player.grid.y
                );
                return PlayerFall::Landed;
            }
            player.grid.y = next;
        }
        PlayerFall::Falling
    }
}
