//! Block entities for Burrow
//!
//! This crate provides the tile-level building blocks of the world:
//! - Block entities with a closed set of components (Block, BlockId, Component)
//! - Component kinds and masks (ComponentKind, ComponentMask)
//! - Canonical block construction (BlockFactory, BlockKind)

mod block;
mod component;
mod factory;

pub use block::{Block, BlockId, DigOutcome};
pub use component::{
    BlockComponent, Component, ComponentKind, ComponentMask, Darkness, Diggable, Door, Fallable,
    Health, Lethal, LootItem, LootKind, Lootable, PauseOnDestroy, Physics, Render, SpawnEntity,
    SpriteStack,
};
pub use factory::{BlockFactory, BlockKind};
