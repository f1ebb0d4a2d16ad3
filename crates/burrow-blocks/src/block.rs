//! Block entity - a tile's composable behavior container

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::component::{
    BlockComponent, Component, ComponentMask, Diggable, Door, Health, Lethal, Lootable, Physics,
};
use crate::factory::BlockKind;

/// Unique block identity (stable across moves between cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u64);

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

impl BlockId {
    /// Generate a new unique block ID
    pub fn new() -> Self {
        BlockId(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

/// Result of one dig hit
#[derive(Debug, Clone, PartialEq)]
pub struct DigOutcome {
    /// Remaining hit points after the hit
    pub hp: i32,
    pub destroyed: bool,
    /// Loot released on destruction
    pub loot: Option<Lootable>,
}

/// A grid tile's entity: identity, kind label and a set of components
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    kind: BlockKind,
    components: SmallVec<[Component; 4]>,
    mask: ComponentMask,
}

impl Block {
    /// Create a block with no components
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            components: SmallVec::new(),
            mask: ComponentMask::empty(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.insert(component);
        self
    }

    /// Insert a component, replacing (and returning) any existing one of the same kind
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        let kind = component.kind();
        self.mask |= kind.mask();
        match self.components.iter_mut().find(|c| c.kind() == kind) {
            Some(slot) => Some(std::mem::replace(slot, component)),
            None => {
                self.components.push(component);
                None
            }
        }
    }

    /// Remove a component by type
    pub fn remove<T: BlockComponent>(&mut self) -> Option<T> {
        let index = self.components.iter().position(|c| c.kind() == T::KIND)?;
        self.mask.remove(T::KIND.mask());
        T::from_owned(self.components.remove(index))
    }

    #[inline]
    pub fn has<T: BlockComponent>(&self) -> bool {
        self.mask.contains(T::KIND.mask())
    }

    pub fn get<T: BlockComponent>(&self) -> Option<&T> {
        if !self.has::<T>() {
            return None;
        }
        self.components.iter().find_map(T::from_component)
    }

    pub fn get_mut<T: BlockComponent>(&mut self) -> Option<&mut T> {
        if !self.has::<T>() {
            return None;
        }
        self.components.iter_mut().find_map(T::from_component_mut)
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn mask(&self) -> ComponentMask {
        self.mask
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Solid tiles block movement; blocks without `Physics` are passable
    pub fn is_collidable(&self) -> bool {
        self.get::<Physics>().is_some_and(|p| p.collidable)
    }

    pub fn is_walkable(&self) -> bool {
        !self.is_collidable()
    }

    /// Diggable and able to take damage
    pub fn is_diggable(&self) -> bool {
        self.mask
            .contains(ComponentMask::DIGGABLE | ComponentMask::HEALTH)
    }

    pub fn is_lethal(&self) -> bool {
        self.has::<Lethal>()
    }

    /// Door that can still trigger a transition
    pub fn is_active_door(&self) -> bool {
        self.get::<Door>().is_some_and(|d| d.active)
    }

    pub fn is_door(&self) -> bool {
        self.has::<Door>()
    }

    /// Apply `amount` damage through the `Diggable` capability
    ///
    /// Returns `None` when the block cannot be dug.
    pub fn dig(&mut self, amount: i32) -> Option<DigOutcome> {
        if !self.has::<Diggable>() {
            return None;
        }
        let health = self.get_mut::<Health>()?;
        let destroyed = health.take_damage(amount);
        let hp = health.hp.max(0);
        let loot = if destroyed {
            self.get::<Lootable>().cloned()
        } else {
            None
        };
        Some(DigOutcome {
            hp,
            destroyed,
            loot,
        })
    }
}
