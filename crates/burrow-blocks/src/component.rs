//! Block components - the closed set of capabilities a block can carry
//!
//! A block is a bag of at most one component per kind. Behavior is decided by
//! which kinds are present, never by the block's name.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::factory::BlockKind;

/// Whether an entity can occupy or pass through the tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physics {
    pub collidable: bool,
}

/// Hit points of a damageable block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub max_hp: i32,
}

impl Health {
    /// Create a health component at full hit points
    pub fn new(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Apply damage, returns true once hp reaches zero
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.hp -= amount;
        self.is_depleted()
    }

    pub fn is_depleted(&self) -> bool {
        self.hp <= 0
    }
}

/// Marker: the block can be dug (requires `Health` to take damage)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diggable;

/// Contact kills the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lethal {
    /// Whether terrain is regenerated after a death caused by this block
    pub should_regenerate: bool,
}

/// Gravity state for blocks and the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fallable {
    /// Vertical speed in pixels per tick (positive is downward)
    pub velocity_y: f32,
    pub is_falling: bool,
    /// Grid column the fall started in
    pub grid_x: i32,
    /// Grid row the fall started in
    pub grid_y: i32,
    /// Top edge in pixels while falling
    pub pixel_y: f32,
}

impl Fallable {
    /// Begin a fall from the given grid cell
    ///
    /// Returns false if already falling.
    pub fn start(&mut self, grid_x: i32, grid_y: i32, tile_size: f32) -> bool {
        if self.is_falling {
            return false;
        }
        self.is_falling = true;
        self.velocity_y = 0.0;
        self.grid_x = grid_x;
        self.grid_y = grid_y;
        self.pixel_y = grid_y as f32 * tile_size;
        true
    }

    /// Advance one tick of free fall, returns the new top edge in pixels
    pub fn integrate(&mut self, gravity: f32, fall_speed_max: f32) -> f32 {
        self.velocity_y = (self.velocity_y + gravity).min(fall_speed_max);
        self.pixel_y += self.velocity_y;
        self.pixel_y
    }

    /// End the fall and zero the velocity
    pub fn stop(&mut self) {
        self.is_falling = false;
        self.velocity_y = 0.0;
    }
}

/// What a loot entry awards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootKind {
    Coin,
    Gem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    pub kind: LootKind,
    pub value: i32,
}

impl LootItem {
    /// Sum of all loot values
    pub fn total(items: &[LootItem]) -> i32 {
        items.iter().map(|item| item.value).sum()
    }
}

/// Factory call used to replace a destroyed block instead of leaving it empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnEntity {
    pub kind: BlockKind,
    /// Hit point override for diggable replacements
    pub hp: Option<i32>,
}

/// Payload released when the block is destroyed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lootable {
    pub loot: Vec<LootItem>,
    pub spawn_entity: Option<SpawnEntity>,
    /// Seconds added to the countdown when collected
    pub timer_increment_seconds: f32,
}

/// Level-transition trigger, deactivated on first use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub active: bool,
}

/// Presentation: base sprite and tint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Render {
    pub sprite: String,
    pub tint: [u8; 4],
}

/// Presentation: depth shading (0.0 = lit, 1.0 = black)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Darkness {
    pub level: f32,
}

/// Presentation: layered sprites drawn bottom to top
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteStack {
    pub layers: Vec<String>,
}

/// Marker: the host should pause when this block is destroyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseOnDestroy;

bitflags! {
    /// Set of component kinds present on a block
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u16 {
        const PHYSICS = 1 << 0;
        const HEALTH = 1 << 1;
        const DIGGABLE = 1 << 2;
        const LETHAL = 1 << 3;
        const FALLABLE = 1 << 4;
        const LOOTABLE = 1 << 5;
        const DOOR = 1 << 6;
        const RENDER = 1 << 7;
        const DARKNESS = 1 << 8;
        const SPRITE_STACK = 1 << 9;
        const PAUSE_ON_DESTROY = 1 << 10;
    }
}

/// Discriminant of [`Component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Physics,
    Health,
    Diggable,
    Lethal,
    Fallable,
    Lootable,
    Door,
    Render,
    Darkness,
    SpriteStack,
    PauseOnDestroy,
}

impl ComponentKind {
    pub fn mask(self) -> ComponentMask {
        match self {
            ComponentKind::Physics => ComponentMask::PHYSICS,
            ComponentKind::Health => ComponentMask::HEALTH,
            ComponentKind::Diggable => ComponentMask::DIGGABLE,
            ComponentKind::Lethal => ComponentMask::LETHAL,
            ComponentKind::Fallable => ComponentMask::FALLABLE,
            ComponentKind::Lootable => ComponentMask::LOOTABLE,
            ComponentKind::Door => ComponentMask::DOOR,
            ComponentKind::Render => ComponentMask::RENDER,
            ComponentKind::Darkness => ComponentMask::DARKNESS,
            ComponentKind::SpriteStack => ComponentMask::SPRITE_STACK,
            ComponentKind::PauseOnDestroy => ComponentMask::PAUSE_ON_DESTROY,
        }
    }
}

/// One capability attached to a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Physics(Physics),
    Health(Health),
    Diggable(Diggable),
    Lethal(Lethal),
    Fallable(Fallable),
    Lootable(Lootable),
    Door(Door),
    Render(Render),
    Darkness(Darkness),
    SpriteStack(SpriteStack),
    PauseOnDestroy(PauseOnDestroy),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Physics(_) => ComponentKind::Physics,
            Component::Health(_) => ComponentKind::Health,
            Component::Diggable(_) => ComponentKind::Diggable,
            Component::Lethal(_) => ComponentKind::Lethal,
            Component::Fallable(_) => ComponentKind::Fallable,
            Component::Lootable(_) => ComponentKind::Lootable,
            Component::Door(_) => ComponentKind::Door,
            Component::Render(_) => ComponentKind::Render,
            Component::Darkness(_) => ComponentKind::Darkness,
            Component::SpriteStack(_) => ComponentKind::SpriteStack,
            Component::PauseOnDestroy(_) => ComponentKind::PauseOnDestroy,
        }
    }
}

/// Typed access to a single component kind
pub trait BlockComponent: Sized + Into<Component> {
    const KIND: ComponentKind;

    fn from_component(component: &Component) -> Option<&Self>;
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
    fn from_owned(component: Component) -> Option<Self>;
}

macro_rules! impl_block_component {
    ($($ty:ident),* $(,)?) => {
        $(
            impl BlockComponent for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_owned(component: Component) -> Option<Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$ty(value)
                }
            }
        )*
    };
}

impl_block_component!(
    Physics,
    Health,
    Diggable,
    Lethal,
    Fallable,
    Lootable,
    Door,
    Render,
    Darkness,
    SpriteStack,
    PauseOnDestroy,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_take_damage() {
        let mut health = Health::new(3);
        assert!(!health.take_damage(1));
        assert!(!health.take_damage(1));
        assert!(health.take_damage(1));
        assert_eq!(health.hp, 0);
        assert_eq!(health.max_hp, 3);
    }

    #[test]
    fn test_fallable_start_is_idempotent() {
        let mut fallable = Fallable::default();
        assert!(fallable.start(2, 3, 16.0));
        assert_eq!(fallable.pixel_y, 48.0);

        fallable.integrate(0.5, 8.0);
        assert!(!fallable.start(2, 3, 16.0));
        // Second start must not reset the velocity
        assert_eq!(fallable.velocity_y, 0.5);
    }

    #[test]
    fn test_fallable_integrate_clamps_to_max_speed() {
        let mut fallable = Fallable::default();
        fallable.start(0, 0, 16.0);
        for _ in 0..100 {
            fallable.integrate(1.0, 6.0);
        }
        assert_eq!(fallable.velocity_y, 6.0);

        fallable.stop();
        assert!(!fallable.is_falling);
        assert_eq!(fallable.velocity_y, 0.0);
    }

    #[test]
    fn test_component_kind_roundtrip() {
        let component: Component = Door { active: true }.into();
        assert_eq!(component.kind(), ComponentKind::Door);
        assert_eq!(
            Door::from_component(&component),
            Some(&Door { active: true })
        );
        assert!(Health::from_component(&component).is_none());
    }

    #[test]
    fn test_kind_masks_are_distinct() {
        let kinds = [
            ComponentKind::Physics,
            ComponentKind::Health,
            ComponentKind::Diggable,
            ComponentKind::Lethal,
            ComponentKind::Fallable,
            ComponentKind::Lootable,
            ComponentKind::Door,
            ComponentKind::Render,
            ComponentKind::Darkness,
            ComponentKind::SpriteStack,
            ComponentKind::PauseOnDestroy,
        ];
        let mut seen = ComponentMask::empty();
        for kind in kinds {
            assert!(!seen.intersects(kind.mask()), "{:?} overlaps", kind);
            seen |= kind.mask();
        }
        assert_eq!(seen, ComponentMask::all());
    }

    #[test]
    fn test_loot_total() {
        let loot = [
            LootItem {
                kind: LootKind::Coin,
                value: 5,
            },
            LootItem {
                kind: LootKind::Gem,
                value: 20,
            },
        ];
        assert_eq!(LootItem::total(&loot), 25);
        assert_eq!(LootItem::total(&[]), 0);
    }
}
