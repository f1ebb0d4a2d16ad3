//! Player entity - grid position, dig intent and timers

use burrow_blocks::Fallable;
use glam::{IVec2, Vec2};

use super::input::Direction;
use crate::simulation::{Countdown, DigProgress, MoveAnimation};

/// Discrete player state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Idle,
    /// Digging along the vertical axis
    Digging,
    /// Digging left or right
    DiggingLateral,
    /// Owned by the gravity simulation until landing
    Falling,
    /// Animated step into a cleared tile
    Moving,
}

/// The single player entity
///
/// Created once and reset in place on death, restart and level transitions.
#[derive(Debug, Clone)]
pub struct Player {
    /// Occupied tile
    pub grid: IVec2,
    /// Top-left corner in pixels
    pub position: Vec2,
    pub state: PlayerState,
    /// Gravity state while falling
    pub fall: Fallable,
    pub dig_direction: Direction,
    /// Direction change waiting for validation
    pub pending_direction: Option<Direction>,
    pub dig: DigProgress,
    /// Progress on the occupied tile when stuck inside terrain
    pub stuck_dig: DigProgress,
    pub movement: Option<MoveAnimation>,
    pub countdown: Countdown,
    pub spawn: IVec2,
    pub has_started: bool,
    pub is_dead: bool,
    pub is_transitioning: bool,
    /// Trigger id of the transition in flight
    pub transition_trigger: Option<u64>,
    last_trigger_id: u64,
    tile_size: f32,
}

impl Player {
    pub fn new(spawn: IVec2, tile_size: f32, countdown_seconds: f32) -> Self {
        Self {
            grid: spawn,
            position: spawn.as_vec2() * tile_size,
            state: PlayerState::Idle,
            fall: Fallable::default(),
            dig_direction: Direction::Down,
            pending_direction: None,
            dig: DigProgress::new(),
            stuck_dig: DigProgress::new(),
            movement: None,
            countdown: Countdown::new(countdown_seconds),
            spawn,
            has_started: false,
            is_dead: false,
            is_transitioning: false,
            transition_trigger: None,
            last_trigger_id: 0,
            tile_size,
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pixel position of a tile's top-left corner
    pub fn pixel_for(&self, grid: IVec2) -> Vec2 {
        grid.as_vec2() * self.tile_size
    }

    /// Place the player on a tile, snapping the pixel position
    pub fn set_grid_position(&mut self, grid: IVec2) {
        self.grid = grid;
        self.position = self.pixel_for(grid);
    }

    /// Axis-aligned bounding box `(min, max)` in pixels
    pub fn aabb(&self) -> (Vec2, Vec2) {
        (self.position, self.position + Vec2::splat(self.tile_size))
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Accept the first start signal; returns false if already started
    pub fn start(&mut self) -> bool {
        if self.has_started {
            return false;
        }
        self.has_started = true;
        self.countdown.start();
        log::debug!("[DIG] Player started at ({}, {})", self.grid.x, self.grid.y);
        true
    }

    /// Next monotonically increasing transition trigger id
    pub fn next_trigger_id(&mut self) -> u64 {
        self.last_trigger_id += 1;
        self.last_trigger_id
    }

    /// Drop all in-flight dig, fall and movement state
    pub fn clear_motion(&mut self) {
        self.dig.clear();
        self.stuck_dig.clear();
        self.movement = None;
        self.pending_direction = None;
        self.fall.stop();
        self.position = self.pixel_for(self.grid);
    }

    /// Back to the spawn tile, alive and idle
    pub fn reset_to_spawn(&mut self, preserve_timer: bool) {
        self.grid = self.spawn;
        self.clear_motion();
        self.state = PlayerState::Idle;
        self.dig_direction = Direction::Down;
        self.is_dead = false;
        self.is_transitioning = false;
        self.transition_trigger = None;
        if !preserve_timer {
            self.countdown.reset();
            if self.has_started {
                self.countdown.start();
            }
        }
    }
}
