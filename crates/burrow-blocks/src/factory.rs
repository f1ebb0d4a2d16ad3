//! Block factory - canonical component sets for every block kind

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::component::{
    Darkness, Diggable, Door, Fallable, Health, Lethal, LootItem, LootKind, Lootable,
    PauseOnDestroy, Physics, Render, SpawnEntity, SpriteStack,
};

/// Built-in block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Open space
    Empty,
    /// World edge: solid, never diggable
    Boundary,
    Mud,
    /// Deeper, tougher mud
    HardMud,
    /// Falls when unsupported
    Rock,
    /// Kills on contact
    Lava,
    Chest,
    /// Breaks into mud and drops a gem
    Geode,
    /// Level exit
    Door,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Empty => "empty",
            BlockKind::Boundary => "boundary",
            BlockKind::Mud => "mud",
            BlockKind::HardMud => "hard_mud",
            BlockKind::Rock => "rock",
            BlockKind::Lava => "lava",
            BlockKind::Chest => "chest",
            BlockKind::Geode => "geode",
            BlockKind::Door => "door",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Constructs blocks with their canonical component sets
pub struct BlockFactory;

impl BlockFactory {
    pub const MUD_HP: i32 = 5;
    pub const HARD_MUD_HP: i32 = 8;
    pub const ROCK_HP: i32 = 3;
    pub const CHEST_HP: i32 = 2;
    pub const GEODE_HP: i32 = 4;
    /// Hit points of the mud left behind by a broken geode
    pub const GEODE_REMAINS_HP: i32 = 2;

    pub const CHEST_COIN_VALUE: i32 = 10;
    pub const CHEST_COINS: usize = 3;
    pub const CHEST_TIMER_INCREMENT: f32 = 5.0;
    pub const GEM_VALUE: i32 = 50;

    /// Create a block of the given kind with default parameters
    pub fn create(kind: BlockKind) -> Block {
        match kind {
            BlockKind::Empty => Self::empty(),
            BlockKind::Boundary => Self::boundary(),
            BlockKind::Mud => Self::mud(Self::MUD_HP),
            BlockKind::HardMud => Self::hard_mud(),
            BlockKind::Rock => Self::rock(),
            BlockKind::Lava => Self::lava(),
            BlockKind::Chest => Self::chest(Self::CHEST_COINS, Self::CHEST_TIMER_INCREMENT),
            BlockKind::Geode => Self::geode(),
            BlockKind::Door => Self::door(),
        }
    }

    /// Build the replacement declared by a lootable block
    pub fn spawn(spawn: &SpawnEntity) -> Block {
        match (spawn.kind, spawn.hp) {
            (BlockKind::Mud, Some(hp)) => Self::mud(hp),
            (kind, Some(hp)) => {
                let mut block = Self::create(kind);
                if let Some(health) = block.get_mut::<Health>() {
                    *health = Health::new(hp);
                } else {
                    log::debug!("Spawn hp override ignored for {} (no health)", kind);
                }
                block
            }
            (kind, None) => Self::create(kind),
        }
    }

    pub fn empty() -> Block {
        Block::new(BlockKind::Empty).with(Physics { collidable: false })
    }

    pub fn boundary() -> Block {
        Block::new(BlockKind::Boundary)
            .with(Physics { collidable: true })
            .with(Self::render("boundary", [40, 36, 48, 255]))
    }

    pub fn mud(hp: i32) -> Block {
        Block::new(BlockKind::Mud)
            .with(Physics { collidable: true })
            .with(Health::new(hp))
            .with(Diggable)
            .with(Self::render("mud", [121, 85, 58, 255]))
    }

    pub fn hard_mud() -> Block {
        Block::new(BlockKind::HardMud)
            .with(Physics { collidable: true })
            .with(Health::new(Self::HARD_MUD_HP))
            .with(Diggable)
            .with(Self::render("hard_mud", [92, 64, 51, 255]))
    }

    pub fn rock() -> Block {
        Block::new(BlockKind::Rock)
            .with(Physics { collidable: true })
            .with(Health::new(Self::ROCK_HP))
            .with(Diggable)
            .with(Fallable::default())
            .with(Self::render("rock", [128, 128, 128, 255]))
    }

    pub fn lava() -> Block {
        Block::new(BlockKind::Lava)
            .with(Physics { collidable: false })
            .with(Lethal {
                should_regenerate: true,
            })
            .with(Self::render("lava", [255, 96, 16, 255]))
    }

    pub fn chest(coins: usize, timer_increment_seconds: f32) -> Block {
        let loot = (0..coins)
            .map(|_| LootItem {
                kind: LootKind::Coin,
                value: Self::CHEST_COIN_VALUE,
            })
            .collect();
        Block::new(BlockKind::Chest)
            .with(Physics { collidable: true })
            .with(Health::new(Self::CHEST_HP))
            .with(Diggable)
            .with(Lootable {
                loot,
                spawn_entity: None,
                timer_increment_seconds,
            })
            .with(PauseOnDestroy)
            .with(Self::render("chest", [218, 165, 32, 255]))
    }

    pub fn geode() -> Block {
        Block::new(BlockKind::Geode)
            .with(Physics { collidable: true })
            .with(Health::new(Self::GEODE_HP))
            .with(Diggable)
            .with(Lootable {
                loot: vec![LootItem {
                    kind: LootKind::Gem,
                    value: Self::GEM_VALUE,
                }],
                spawn_entity: Some(SpawnEntity {
                    kind: BlockKind::Mud,
                    hp: Some(Self::GEODE_REMAINS_HP),
                }),
                timer_increment_seconds: 0.0,
            })
            .with(Self::render("geode", [138, 43, 226, 255]))
    }

    pub fn door() -> Block {
        Block::new(BlockKind::Door)
            .with(Physics { collidable: true })
            .with(Door { active: true })
            .with(Self::render("door", [255, 255, 255, 255]))
            .with(SpriteStack {
                layers: vec!["door_frame".to_string(), "door_glow".to_string()],
            })
    }

    /// Attach depth shading to a block
    pub fn shaded(block: Block, darkness: f32) -> Block {
        block.with(Darkness {
            level: darkness.clamp(0.0, 1.0),
        })
    }

    fn render(sprite: &str, tint: [u8; 4]) -> Render {
        Render {
            sprite: sprite.to_string(),
            tint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentMask;

    const ALL_KINDS: [BlockKind; 9] = [
        BlockKind::Empty,
        BlockKind::Boundary,
        BlockKind::Mud,
        BlockKind::HardMud,
        BlockKind::Rock,
        BlockKind::Lava,
        BlockKind::Chest,
        BlockKind::Geode,
        BlockKind::Door,
    ];

    #[test]
    fn test_create_sets_kind() {
        for kind in ALL_KINDS {
            assert_eq!(BlockFactory::create(kind).kind(), kind);
        }
    }

    #[test]
    fn test_boundary_is_solid_and_not_diggable() {
        let block = BlockFactory::boundary();
        assert!(block.is_collidable());
        assert!(!block.is_diggable());
    }

    #[test]
    fn test_empty_is_walkable() {
        let block = BlockFactory::empty();
        assert!(block.is_walkable());
        assert!(!block.is_lethal());
    }

    #[test]
    fn test_mud_components() {
        let block = BlockFactory::create(BlockKind::Mud);
        let expected = ComponentMask::PHYSICS
            | ComponentMask::HEALTH
            | ComponentMask::DIGGABLE
            | ComponentMask::RENDER;
        assert_eq!(block.mask(), expected);
        assert_eq!(
            block.get::<Health>(),
            Some(&Health::new(BlockFactory::MUD_HP))
        );
    }

    #[test]
    fn test_lava_is_lethal_and_walkable() {
        let block = BlockFactory::lava();
        assert!(block.is_walkable());
        assert!(block.is_lethal());
        assert_eq!(
            block.get::<Lethal>(),
            Some(&Lethal {
                should_regenerate: true
            })
        );
    }

    #[test]
    fn test_rock_is_fallable() {
        let block = BlockFactory::rock();
        assert!(block.has::<Fallable>());
        assert!(block.is_collidable());
    }

    #[test]
    fn test_geode_spawns_mud() {
        let block = BlockFactory::geode();
        let spawn = block
            .get::<Lootable>()
            .and_then(|l| l.spawn_entity)
            .expect("geode declares a replacement");
        let remains = BlockFactory::spawn(&spawn);
        assert_eq!(remains.kind(), BlockKind::Mud);
        assert_eq!(
            remains.get::<Health>(),
            Some(&Health::new(BlockFactory::GEODE_REMAINS_HP))
        );
    }

    #[test]
    fn test_spawn_hp_override_on_other_kinds() {
        let rock = BlockFactory::spawn(&SpawnEntity {
            kind: BlockKind::Rock,
            hp: Some(1),
        });
        assert_eq!(rock.get::<Health>().map(|h| h.hp), Some(1));

        let lava = BlockFactory::spawn(&SpawnEntity {
            kind: BlockKind::Lava,
            hp: Some(4),
        });
        assert!(!lava.has::<Health>());
    }

    #[test]
    fn test_door_presentation_round_trips() {
        let block = BlockFactory::door();
        assert!(block.is_active_door());
        assert_eq!(
            block.get::<SpriteStack>().map(|s| s.layers.len()),
            Some(2)
        );
        assert_eq!(
            block.get::<Render>().map(|r| r.sprite.as_str()),
            Some("door")
        );
    }

    #[test]
    fn test_shaded_clamps_darkness() {
        let block = BlockFactory::shaded(BlockFactory::mud(5), 1.7);
        assert_eq!(block.get::<Darkness>().map(|d| d.level), Some(1.0));
    }

    #[test]
    fn test_chest_pauses_host() {
        let block = BlockFactory::create(BlockKind::Chest);
        assert!(block.has::<PauseOnDestroy>());
        let lootable = block.get::<Lootable>().expect("chest is lootable");
        assert_eq!(lootable.loot.len(), BlockFactory::CHEST_COINS);
        assert_eq!(
            lootable.timer_increment_seconds,
            BlockFactory::CHEST_TIMER_INCREMENT
        );
    }
}
