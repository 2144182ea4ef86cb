//! Standard block names and their default properties.
//!
//! The engine stores type names opaquely; this table is where the host
//! decides what those names mean for scenario building.

use burrow_engine::world::block::{Block, BlockKind};
use burrow_engine::world::position::BlockPos;

pub const AIR: &str = "minecraft:air";
pub const GRASS_BLOCK: &str = "minecraft:grass_block";
pub const DIRT: &str = "minecraft:dirt";
pub const STONE: &str = "minecraft:stone";
pub const BEDROCK: &str = "minecraft:bedrock";
pub const CHEST: &str = "minecraft:chest";
pub const FURNACE: &str = "minecraft:furnace";
pub const TURTLE: &str = burrow_engine::agent::TURTLE_TYPE;

/// Whether an agent may occupy a cell holding this block. Grass is the
/// traversable surface layer in the standard scenario; solid fill and
/// inventory blocks are obstacles.
pub fn walkable_by_default(name: &str) -> bool {
    matches!(name, AIR | GRASS_BLOCK)
}

/// A plain block of `name` with its default walkability.
pub fn plain(name: &str, pos: BlockPos) -> Block {
    Block::new(name, pos, walkable_by_default(name), BlockKind::Plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_layers_are_walkable_and_obstacles_are_not() {
        assert!(walkable_by_default(AIR));
        assert!(walkable_by_default(GRASS_BLOCK));
        assert!(!walkable_by_default(STONE));
        assert!(!walkable_by_default(CHEST));
        assert!(!walkable_by_default(FURNACE));
        assert!(!walkable_by_default(TURTLE));
        // Unknown names default to obstacles.
        assert!(!walkable_by_default("minecraft:obsidian"));
    }

    #[test]
    fn plain_blocks_carry_the_table_walkability() {
        let pos = BlockPos::new(1, 2, 3);
        assert!(plain(GRASS_BLOCK, pos).walkable);
        assert!(!plain(STONE, pos).walkable);
        assert_eq!(plain(STONE, pos).pos, pos);
    }
}
