//! Digging system - the player's dig/move/fall state machine

use burrow_blocks::{
    Block, BlockFactory, Darkness, Door, Health, Lethal, Lootable, PauseOnDestroy,
};
use glam::IVec2;

use super::gravity_system::GravitySystem;
use super::rules::GameRules;
use super::terrain::TerrainStore;
use crate::entity::{Direction, InputState, Player, PlayerState};
use crate::events::{DeathCause, EventQueue, GameEvent};
use crate::simulation::{DigProgress, MoveAnimation};

/// Digging system - static methods driving the player each tick
pub struct DiggingSystem;

impl DiggingSystem {
    /// Advance the player state machine by one tick
    ///
    /// Gravity for a falling player is not handled here, see
    /// [`GravitySystem::update_player`].
    pub fn update(
        player: &mut Player,
        terrain: &mut TerrainStore,
        input: &InputState,
        rules: &GameRules,
        events: &mut EventQueue,
        dt_ms: f32,
    ) {
        Self::apply_input(player, input);

        if player.is_dead || player.is_transitioning {
            player.state = PlayerState::Idle;
            return;
        }

        if player.has_started {
            let tick = player.countdown.update(dt_ms);
            if let Some(seconds) = tick.seconds_changed {
                events.publish(GameEvent::TimerUpdate { seconds });
            }
            if tick.expired {
                log::info!("[TIMER] Countdown expired");
                Self::kill(player, DeathCause::TimeExpired, false, events);
                return;
            }
        }

        if player.state == PlayerState::Falling {
            return;
        }

        if player.state == PlayerState::Moving
            && !Self::advance_move(player, terrain, input, events, dt_ms)
        {
            return;
        }

        let stuck = Self::dig_if_stuck(player, terrain, rules, events, dt_ms);

        if let Some(direction) = player.pending_direction.take() {
            Self::try_change_direction(player, terrain, direction);
        }

        if !stuck && !Self::has_support(player, terrain) {
            if !player.has_started {
                player.start();
            }
            GravitySystem::start_player_fall(player);
            return;
        }

        if !player.has_started {
            return;
        }

        Self::dig_forward(player, terrain, rules, events, dt_ms);
    }

    fn apply_input(player: &mut Player, input: &InputState) {
        if player.is_dead || player.is_transitioning {
            return;
        }
        if input.start_pressed {
            player.start();
        }
        if let Some(direction) = input.requested_direction()
            && player.has_started
        {
            player.pending_direction = Some(direction);
        }
    }

    /// Step the move animation; returns true once the step completed and the
    /// player may act again this tick
    fn advance_move(
        player: &mut Player,
        terrain: &mut TerrainStore,
        input: &InputState,
        events: &mut EventQueue,
        dt_ms: f32,
    ) -> bool {
        let Some(mut movement) = player.movement.take() else {
            player.state = PlayerState::Idle;
            return true;
        };
        player.position = movement.advance(dt_ms);
        if !movement.is_complete() {
            player.movement = Some(movement);
            return false;
        }

        player.set_grid_position(movement.target);
        player.state = PlayerState::Idle;
        log::trace!(
            "[DIG] Moved to ({}, {})",
            player.grid.x,
            player.grid.y
        );

        let block = terrain.get_block(player.grid.x, player.grid.y);
        if let Some(lethal) = block.get::<Lethal>().copied() {
            let cause = DeathCause::Lethal(block.kind());
            Self::kill(player, cause, lethal.should_regenerate, events);
            return false;
        }

        // Lateral digging chains, upward digging only while up is held
        if player.dig_direction == Direction::Up && !input.is_held(Direction::Up) {
            player.dig_direction = Direction::Down;
        }
        true
    }

    /// Dig the occupied tile if the player is embedded in terrain
    fn dig_if_stuck(
        player: &mut Player,
        terrain: &mut TerrainStore,
        rules: &GameRules,
        events: &mut EventQueue,
        dt_ms: f32,
    ) -> bool {
        let here = player.grid;
        let block = terrain.get_block(here.x, here.y);
        if !(block.is_collidable() && block.is_diggable()) {
            player.stuck_dig.clear();
            return false;
        }
        let (hp, max_hp) = health_of(block);
        if player.stuck_dig.begin(here, hp, max_hp) {
            log::debug!("[DIG] Player stuck inside {} at ({}, {})", block.kind(), here.x, here.y);
        }
        let mut progress = std::mem::take(&mut player.stuck_dig);
        let destroyed = Self::apply_hits(&mut progress, terrain, here, rules, events, dt_ms);
        player.stuck_dig = progress;
        if destroyed {
            player.stuck_dig.clear();
        }
        !destroyed
    }

    fn try_change_direction(player: &mut Player, terrain: &mut TerrainStore, direction: Direction) {
        let candidate = player.grid + direction.offset();
        let block = terrain.get_block(candidate.x, candidate.y);
        if block.is_diggable() || block.is_door() || block.is_walkable() {
            if direction != player.dig_direction {
                player.dig.clear();
                log::trace!("[DIG] Direction {:?} -> {:?}", player.dig_direction, direction);
            }
            player.dig_direction = direction;
        } else {
            log::trace!(
                "[DIG] Rejected {:?} into {} at ({}, {})",
                direction,
                block.kind(),
                candidate.x,
                candidate.y
            );
        }
    }

    /// Whether the tile below the player is solid
    pub fn has_support(player: &Player, terrain: &mut TerrainStore) -> bool {
        terrain
            .get_block(player.grid.x, player.grid.y + 1)
            .is_collidable()
    }

    fn dig_forward(
        player: &mut Player,
        terrain: &mut TerrainStore,
        rules: &GameRules,
        events: &mut EventQueue,
        dt_ms: f32,
    ) {
        let direction = player.dig_direction;
        let target = player.grid + direction.offset();
        let block = terrain.get_block(target.x, target.y);

        if block.is_active_door() {
            Self::enter_door(player, terrain, target, events);
            return;
        }

        if block.is_diggable() {
            let (hp, max_hp) = health_of(block);
            if player.dig.begin(target, hp, max_hp) {
                log::trace!(
                    "[DIG] Target {} at ({}, {}) hp {}",
                    block.kind(),
                    target.x,
                    target.y,
                    hp
                );
            }
            player.state = if direction.is_lateral() {
                PlayerState::DiggingLateral
            } else {
                PlayerState::Digging
            };
            let mut progress = std::mem::take(&mut player.dig);
            let destroyed = Self::apply_hits(&mut progress, terrain, target, rules, events, dt_ms);
            player.dig = progress;
            if destroyed {
                player.dig.clear();
                Self::after_destroy(player, terrain, rules, target);
            }
            return;
        }

        if block.is_walkable() {
            Self::step_toward(player, terrain, rules, target);
            return;
        }

        Self::blocked(player, terrain);
    }

    /// Apply every hit that became due; returns true if the target was destroyed
    fn apply_hits(
        progress: &mut DigProgress,
        terrain: &mut TerrainStore,
        target: IVec2,
        rules: &GameRules,
        events: &mut EventQueue,
        dt_ms: f32,
    ) -> bool {
        let hits = progress.accumulate(dt_ms, rules.dig_interval_ms);
        for _ in 0..hits {
            let Some(block) = terrain.get_block_mut(target.x, target.y) else {
                progress.clear();
                return false;
            };
            let Some(outcome) = block.dig(rules.dig_damage) else {
                progress.clear();
                return false;
            };
            progress.record_hit(outcome.hp);
            log::trace!(
                "[DIG] Hit ({}, {}) hp {}",
                target.x,
                target.y,
                outcome.hp
            );
            if outcome.destroyed {
                Self::destroy_block(terrain, target, outcome.loot, events);
                return true;
            }
        }
        false
    }

    /// Replace a destroyed block and publish its events
    fn destroy_block(
        terrain: &mut TerrainStore,
        position: IVec2,
        loot: Option<Lootable>,
        events: &mut EventQueue,
    ) {
        let Some(destroyed) = terrain.take_block(position.x, position.y) else {
            return;
        };
        let pause = destroyed.has::<PauseOnDestroy>();

        if let Some(spawn) = loot.as_ref().and_then(|l| l.spawn_entity) {
            let mut replacement = BlockFactory::spawn(&spawn);
            if let Some(darkness) = destroyed.get::<Darkness>() {
                replacement = BlockFactory::shaded(replacement, darkness.level);
            }
            terrain.set_block(position.x, position.y, replacement);
        }

        log::debug!(
            "[DIG] Destroyed {} at ({}, {})",
            destroyed.kind(),
            position.x,
            position.y
        );
        events.publish(GameEvent::BlockDestroyed {
            x: position.x,
            y: position.y,
            pause,
        });
        if let Some(loot) = loot
            && (!loot.loot.is_empty() || loot.timer_increment_seconds > 0.0)
        {
            events.publish(GameEvent::BlockLoot {
                x: position.x,
                y: position.y,
                loot: loot.loot,
                timer_increment_seconds: loot.timer_increment_seconds,
            });
        }
    }

    /// Decide the follow-up once the dig target is gone
    fn after_destroy(
        player: &mut Player,
        terrain: &mut TerrainStore,
        rules: &GameRules,
        target: IVec2,
    ) {
        let replacement = terrain.get_block(target.x, target.y);
        if replacement.is_walkable() {
            if player.dig_direction == Direction::Down {
                GravitySystem::start_player_fall(player);
            } else {
                Self::step_toward(player, terrain, rules, target);
            }
        } else if replacement.is_diggable() {
            let (hp, max_hp) = health_of(replacement);
            player.dig.begin(target, hp, max_hp);
        } else {
            Self::blocked(player, terrain);
        }
    }

    /// Step into a walkable tile
    fn step_toward(
        player: &mut Player,
        terrain: &mut TerrainStore,
        rules: &GameRules,
        target: IVec2,
    ) {
        if player.dig_direction == Direction::Down {
            if !Self::has_support(player, terrain) {
                GravitySystem::start_player_fall(player);
            }
            return;
        }
        let from = player.position;
        let to = player.pixel_for(target);
        player.dig.clear();
        player.movement = Some(MoveAnimation::new(from, to, target, rules.move_duration_ms));
        player.state = PlayerState::Moving;
        log::trace!(
            "[DIG] Moving {:?} to ({}, {})",
            player.dig_direction,
            target.x,
            target.y
        );
    }

    /// Nothing to dig or walk into: fall back to digging down
    fn blocked(player: &mut Player, terrain: &mut TerrainStore) {
        player.dig.clear();
        player.dig_direction = Direction::Down;
        player.state = PlayerState::Idle;
        if !Self::has_support(player, terrain) {
            GravitySystem::start_player_fall(player);
        }
    }

    /// Kill the player; returns false if already dead
    pub fn kill(
        player: &mut Player,
        cause: DeathCause,
        should_regenerate: bool,
        events: &mut EventQueue,
    ) -> bool {
        if player.is_dead {
            return false;
        }
        player.is_dead = true;
        player.state = PlayerState::Idle;
        player.clear_motion();
        log::info!(
            "[DIG] Player died at ({}, {}): {}",
            player.grid.x,
            player.grid.y,
            cause
        );
        events.publish(GameEvent::PlayerDeath {
            cause,
            should_regenerate,
        });
        true
    }

    /// Landing handler for the end of a player fall
    pub fn on_landed(player: &mut Player) {
        player.fall.stop();
        player.set_grid_position(player.grid);
        player.state = PlayerState::Idle;
    }

    /// Begin a level transition through the door at `door`
    ///
    /// Returns false while a transition is already in flight or when the door
    /// is missing or already used.
    pub fn enter_door(
        player: &mut Player,
        terrain: &mut TerrainStore,
        door: IVec2,
        events: &mut EventQueue,
    ) -> bool {
        if player.is_transitioning {
            log::debug!("[DOOR] Ignoring door at ({}, {}), transition in progress", door.x, door.y);
            return false;
        }
        let Some(block) = terrain.get_block_mut(door.x, door.y) else {
            return false;
        };
        let Some(state) = block.get_mut::<Door>() else {
            return false;
        };
        if !state.active {
            return false;
        }
        state.active = false;

        player.clear_motion();
        player.state = PlayerState::Idle;
        player.is_transitioning = true;
        let trigger_id = player.next_trigger_id();
        player.transition_trigger = Some(trigger_id);
        log::info!(
            "[DOOR] Entered door at ({}, {}) from ({}, {}), trigger {}",
            door.x,
            door.y,
            player.grid.x,
            player.grid.y,
            trigger_id
        );
        events.publish(GameEvent::LevelTransition {
            door,
            source: player.grid,
            trigger_id,
        });
        true
    }

    /// Finish the transition with a matching trigger id and reset the player
    pub fn complete_transition(
        player: &mut Player,
        trigger_id: u64,
        rules: &GameRules,
        events: &mut EventQueue,
    ) -> bool {
        if !player.is_transitioning || player.transition_trigger != Some(trigger_id) {
            return false;
        }
        let preserve_timer = !rules.reset_timer_on_level;
        player.reset_to_spawn(preserve_timer);
        log::info!("[DOOR] Transition {} complete", trigger_id);
        events.publish(GameEvent::LevelTransitionComplete { trigger_id });
        if !preserve_timer {
            events.publish(GameEvent::TimerUpdate {
                seconds: player.countdown.seconds(),
            });
        }
        true
    }

    /// Respawn after death
    pub fn respawn(player: &mut Player, preserve_timer: bool, events: &mut EventQueue) {
        player.reset_to_spawn(preserve_timer);
        log::info!("[DIG] Player respawned at ({}, {})", player.grid.x, player.grid.y);
        events.publish(GameEvent::PlayerRestart { preserve_timer });
        events.publish(GameEvent::TimerUpdate {
            seconds: player.countdown.seconds(),
        });
    }
}

fn health_of(block: &Block) -> (i32, i32) {
    block
        .get::<Health>()
        .map_or((0, 0), |h| (h.hp, h.max_hp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::bounds::WorldBounds;
    use crate::world::chunk::Chunk;
    use crate::world::generation::ChunkGenerator;
    use burrow_blocks::BlockKind;

    /// Air above `surface`, mud below
    struct FlatGenerator {
        bounds: WorldBounds,
        surface: i32,
        mud_hp: i32,
    }

    impl ChunkGenerator for FlatGenerator {
        fn bounds(&self) -> WorldBounds {
            self.bounds
        }

        fn generate_chunk(&self, chunk_x: i32, chunk_y: i32) -> Chunk {
            let size = self.bounds.chunk_size() as usize;
            Chunk::from_fn(chunk_x, chunk_y, size, |_, local_y| {
                let world_y = chunk_y * size as i32 + local_y as i32;
                if world_y >= self.surface {
                    BlockFactory::mud(self.mud_hp)
                } else {
                    BlockFactory::empty()
                }
            })
        }

        fn reseed(&mut self, _seed: u64) {}
    }

    fn rules() -> GameRules {
        GameRules {
            dig_interval_ms: 100.0,
            move_duration_ms: 100.0,
            ..GameRules::default()
        }
    }

    fn setup(surface: i32, mud_hp: i32) -> (Player, TerrainStore, EventQueue) {
        let generator = FlatGenerator {
            bounds: WorldBounds::new(8, 2, 2),
            surface,
            mud_hp,
        };
        let terrain = TerrainStore::new(Box::new(generator), 16);
        let player = Player::new(IVec2::new(0, surface - 1), 32.0, 60.0);
        (player, terrain, EventQueue::new())
    }

    fn tick(
        player: &mut Player,
        terrain: &mut TerrainStore,
        input: &InputState,
        events: &mut EventQueue,
        dt: f32,
    ) {
        DiggingSystem::update(player, terrain, input, &rules(), events, dt);
    }

    fn started() -> InputState {
        InputState {
            start_pressed: true,
            ..InputState::default()
        }
    }

    #[test]
    fn test_no_digging_before_start() {
        let (mut player, mut terrain, mut events) = setup(2, 1);
        let idle = InputState::default();
        tick(&mut player, &mut terrain, &idle, &mut events, 500.0);
        assert_eq!(player.state, PlayerState::Idle);
        assert_eq!(terrain.get_block(0, 2).kind(), BlockKind::Mud);
        assert!(!player.has_started);
    }

    #[test]
    fn test_falls_before_start_and_auto_starts() {
        let (mut player, mut terrain, mut events) = setup(4, 1);
        player.set_grid_position(IVec2::new(0, 1));
        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 16.0);
        assert_eq!(player.state, PlayerState::Falling);
        assert!(player.has_started);
    }

    #[test]
    fn test_dig_down_needs_full_intervals() {
        let (mut player, mut terrain, mut events) = setup(2, 3);
        tick(&mut player, &mut terrain, &started(), &mut events, 50.0);
        assert_eq!(player.state, PlayerState::Digging);
        assert_eq!(player.dig.target().map(|t| t.hp), Some(3));

        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 50.0);
        assert_eq!(player.dig.target().map(|t| t.hp), Some(2));

        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 200.0);
        assert_eq!(terrain.get_block(0, 2).kind(), BlockKind::Empty);
        assert_eq!(player.state, PlayerState::Falling);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::BlockDestroyed { x: 0, y: 2, pause: false }))
        );
    }

    #[test]
    fn test_invalid_direction_is_discarded() {
        let (mut player, mut terrain, mut events) = setup(2, 3);
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);
        // Left of the spawn is air: walkable, accepted
        let mut input = InputState::default();
        input.press(Direction::Left);
        tick(&mut player, &mut terrain, &input, &mut events, 0.0);
        assert_eq!(player.dig_direction, Direction::Left);

        // Boundary column is rejected
        let (mut player, mut terrain, mut events) = setup(2, 3);
        player.set_grid_position(IVec2::new(-8, 1));
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);
        tick(&mut player, &mut terrain, &input, &mut events, 0.0);
        assert_eq!(player.dig_direction, Direction::Down);
    }

    #[test]
    fn test_lateral_dig_moves_player() {
        let (mut player, mut terrain, mut events) = setup(0, 1);
        player.set_grid_position(IVec2::new(0, 2));
        terrain.set_block(0, 2, BlockFactory::empty());
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);

        let mut input = InputState::default();
        input.press(Direction::Right);
        tick(&mut player, &mut terrain, &input, &mut events, 100.0);
        // One hit destroys the hp 1 block and starts the step
        assert_eq!(terrain.get_block(1, 2).kind(), BlockKind::Empty);
        assert_eq!(player.state, PlayerState::Moving);

        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 50.0);
        assert_eq!(player.grid, IVec2::new(0, 2));
        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 50.0);
        assert_eq!(player.grid, IVec2::new(1, 2));
        // Chained: keeps digging right
        assert_eq!(player.dig_direction, Direction::Right);
        assert_eq!(player.state, PlayerState::DiggingLateral);
    }

    #[test]
    fn test_upward_step_resets_to_down_without_hold() {
        let (mut player, mut terrain, mut events) = setup(0, 1);
        player.set_grid_position(IVec2::new(0, 3));
        terrain.set_block(0, 3, BlockFactory::empty());
        terrain.set_block(0, 2, BlockFactory::empty());
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);

        let mut input = InputState::default();
        input.press(Direction::Up);
        tick(&mut player, &mut terrain, &input, &mut events, 0.0);
        assert_eq!(player.state, PlayerState::Moving);
        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 100.0);
        assert_eq!(player.grid, IVec2::new(0, 2));
        assert_eq!(player.dig_direction, Direction::Down);
        // Cell below was vacated, so the player drops
        assert_eq!(player.state, PlayerState::Falling);
    }

    #[test]
    fn test_held_up_keeps_digging_up_the_shaft() {
        let (mut player, mut terrain, mut events) = setup(0, 1);
        player.set_grid_position(IVec2::new(0, 3));
        terrain.set_block(0, 3, BlockFactory::empty());
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);

        let mut input = InputState {
            up_held: true,
            ..InputState::default()
        };
        input.press(Direction::Up);
        tick(&mut player, &mut terrain, &input, &mut events, 100.0);
        assert_eq!(terrain.get_block(0, 2).kind(), BlockKind::Empty);
        assert_eq!(player.state, PlayerState::Moving);

        let held = InputState {
            up_held: true,
            ..InputState::default()
        };
        tick(&mut player, &mut terrain, &held, &mut events, 100.0);
        assert_eq!(player.grid, IVec2::new(0, 2));
        assert_eq!(player.dig_direction, Direction::Up);
        // Holding up never suspends gravity
        assert_eq!(player.state, PlayerState::Falling);
    }

    #[test]
    fn test_held_up_over_open_air_falls() {
        let (mut player, mut terrain, mut events) = setup(0, 1);
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);
        assert_eq!(player.grid, IVec2::new(0, -1));

        let mut input = InputState {
            up_held: true,
            ..InputState::default()
        };
        input.press(Direction::Up);
        tick(&mut player, &mut terrain, &input, &mut events, 0.0);
        assert_eq!(player.state, PlayerState::Moving);

        input.clear_pulses();
        assert!(input.is_held(Direction::Up));
        tick(&mut player, &mut terrain, &input, &mut events, 100.0);
        assert_eq!(player.grid, IVec2::new(0, -2));
        assert_eq!(player.state, PlayerState::Falling);
    }

    #[test]
    fn test_stuck_player_digs_out() {
        let (mut player, mut terrain, mut events) = setup(0, 2);
        player.set_grid_position(IVec2::new(0, 3));
        tick(&mut player, &mut terrain, &started(), &mut events, 100.0);
        assert_eq!(player.stuck_dig.target().map(|t| t.hp), Some(1));
        assert_ne!(player.state, PlayerState::Falling);
        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 100.0);
        assert_eq!(terrain.get_block(0, 3).kind(), BlockKind::Empty);
    }

    #[test]
    fn test_geode_leaves_mud_and_loot() {
        let (mut player, mut terrain, mut events) = setup(2, 1);
        terrain.set_block(0, 2, BlockFactory::geode());
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);
        let interval = rules().dig_interval_ms;
        tick(
            &mut player,
            &mut terrain,
            &InputState::default(),
            &mut events,
            interval * BlockFactory::GEODE_HP as f32,
        );
        let remains = terrain.get_block(0, 2);
        assert_eq!(remains.kind(), BlockKind::Mud);
        assert_eq!(
            remains.get::<Health>().map(|h| h.hp),
            Some(BlockFactory::GEODE_REMAINS_HP)
        );
        assert!(events.iter().any(|e| matches!(e, GameEvent::BlockLoot { .. })));
        // Re-targets the remains instead of falling
        assert_eq!(player.state, PlayerState::Digging);
        assert!(player.dig.is_targeting(IVec2::new(0, 2)));
    }

    #[test]
    fn test_chest_pauses_on_destroy() {
        let (mut player, mut terrain, mut events) = setup(2, 1);
        terrain.set_block(0, 2, BlockFactory::chest(3, 5.0));
        tick(&mut player, &mut terrain, &started(), &mut events, 1000.0);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::BlockDestroyed { pause: true, .. }))
        );
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::BlockLoot { loot, timer_increment_seconds, .. }
                if loot.len() == 3 && *timer_increment_seconds == 5.0
        )));
    }

    #[test]
    fn test_timer_expiry_kills_once() {
        let (mut player, mut terrain, mut events) = setup(2, 100);
        tick(&mut player, &mut terrain, &started(), &mut events, 0.0);
        player.countdown.set_remaining_ms(50.0);

        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 100.0);
        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 100.0);
        assert_eq!(player.countdown.remaining_ms(), 0.0);
        let deaths = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerDeath { cause: DeathCause::TimeExpired, .. }))
            .count();
        assert_eq!(deaths, 1);
        assert!(player.is_dead);
    }

    #[test]
    fn test_door_enter_is_one_shot() {
        let (mut player, mut terrain, mut events) = setup(2, 1);
        terrain.set_block(0, 2, BlockFactory::door());
        let door = IVec2::new(0, 2);
        assert!(DiggingSystem::enter_door(&mut player, &mut terrain, door, &mut events));
        assert!(!DiggingSystem::enter_door(&mut player, &mut terrain, door, &mut events));
        assert!(player.is_transitioning);
        assert!(!terrain.get_block(0, 2).is_active_door());

        let trigger = player.transition_trigger.unwrap_or_default();
        assert!(!DiggingSystem::complete_transition(
            &mut player,
            trigger + 1,
            &rules(),
            &mut events
        ));
        assert!(DiggingSystem::complete_transition(
            &mut player,
            trigger,
            &rules(),
            &mut events
        ));
        assert!(!player.is_transitioning);
        assert_eq!(player.grid, player.spawn);
    }

    #[test]
    fn test_digging_into_door_starts_transition() {
        let (mut player, mut terrain, mut events) = setup(2, 1);
        terrain.set_block(0, 2, BlockFactory::door());
        tick(&mut player, &mut terrain, &started(), &mut events, 16.0);
        assert!(player.is_transitioning);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelTransition { .. })));

        tick(&mut player, &mut terrain, &InputState::default(), &mut events, 16.0);
        assert_eq!(player.state, PlayerState::Idle);
    }

    #[test]
    fn test_kill_is_idempotent() {
        let (mut player, _, mut events) = setup(2, 1);
        assert!(DiggingSystem::kill(&mut player, DeathCause::TimeExpired, false, &mut events));
        assert!(!DiggingSystem::kill(&mut player, DeathCause::TimeExpired, false, &mut events));
        assert_eq!(events.len(), 1);
    }
}
