//! Session-scoped event queue
//!
//! Systems publish [`GameEvent`]s here instead of calling collaborators
//! directly. The host drains the queue once per tick and forwards events to
//! HUD, audio, camera and restart logic.

use std::collections::VecDeque;

use burrow_blocks::{BlockId, BlockKind, LootItem};
use glam::IVec2;

use crate::world::{SpawnConsumer, SpawnKind, SpawnMarker};

/// What killed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Touched a lethal block
    Lethal(BlockKind),
    /// Hit by a falling block
    Crushed(BlockKind),
    /// Countdown reached zero
    TimeExpired,
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeathCause::Lethal(kind) => write!(f, "{}", kind),
            DeathCause::Crushed(kind) => write!(f, "crushed by {}", kind),
            DeathCause::TimeExpired => f.write_str("time expired"),
        }
    }
}

/// Notifications published to host collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerDeath {
        cause: DeathCause,
        should_regenerate: bool,
    },
    PlayerRestart {
        preserve_timer: bool,
    },
    BlockDestroyed {
        x: i32,
        y: i32,
        /// Host should pause (block carried `PauseOnDestroy`)
        pause: bool,
    },
    BlockLoot {
        x: i32,
        y: i32,
        loot: Vec<LootItem>,
        timer_increment_seconds: f32,
    },
    BlockLanded {
        block_id: BlockId,
        kind: BlockKind,
        position: IVec2,
    },
    BlockCrushedPlayer {
        cause: BlockKind,
    },
    LevelTransition {
        door: IVec2,
        source: IVec2,
        trigger_id: u64,
    },
    LevelTransitionComplete {
        trigger_id: u64,
    },
    TimerUpdate {
        seconds: u32,
    },
    ScoreAdd {
        amount: i32,
    },
    SpawnActivated {
        kind: SpawnKind,
        position: IVec2,
    },
}

/// FIFO of events for one game session
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
    total_published: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameEvent) {
        log::trace!("[EVENT] {:?}", event);
        self.total_published += 1;
        self.events.push_back(event);
    }

    /// Remove and return all queued events in publish order
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events published over the queue's lifetime, drained or not
    pub fn total_published(&self) -> u64 {
        self.total_published
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SpawnConsumer for EventQueue {
    fn activate(&mut self, position: IVec2, marker: &SpawnMarker) {
        self.publish(GameEvent::SpawnActivated {
            kind: marker.kind,
            position,
        });
    }
}
