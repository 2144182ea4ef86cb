//! Block records: identity, type name, walkability, and the tagged variants
//! that carry extra state (inventories, agent handles).

use uuid::Uuid;

use super::position::BlockPos;
use crate::agent::AgentId;
use crate::error::WorldError;

/// Type name of the synthesized placeholder for empty cells.
pub const AIR_NAME: &str = "minecraft:air";

/// Unique identity of one placed block.
///
/// Every constructor mints a fresh id, so two blocks never share one even
/// when their contents are otherwise equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Mint a never-before-seen id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A named stack of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub quantity: u32,
}

impl Item {
    /// Rejects empty names and zero quantities up front, so malformed stacks
    /// never reach an inventory.
    pub fn new(name: impl Into<String>, quantity: u32) -> Result<Self, WorldError> {
        let name = name.into();
        if name.is_empty() {
            return Err(WorldError::InvalidItem("empty name"));
        }
        if quantity == 0 {
            return Err(WorldError::InvalidItem("zero quantity"));
        }
        Ok(Self { name, quantity })
    }
}

/// An ordered list of item stacks, merged by name on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack, merging into an existing stack of the same name.
    pub fn add(&mut self, item: Item) {
        match self.items.iter_mut().find(|held| held.name == item.name) {
            Some(held) => held.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Remove up to `quantity` of `name`, dropping stacks that empty out.
    /// Returns how many were actually taken.
    pub fn take(&mut self, name: &str, quantity: u32) -> u32 {
        let mut remaining = quantity;
        self.items.retain_mut(|held| {
            if remaining == 0 || held.name != name {
                return true;
            }
            let taken = held.quantity.min(remaining);
            held.quantity -= taken;
            remaining -= taken;
            held.quantity > 0
        });
        quantity - remaining
    }

    pub fn total_of(&self, name: &str) -> u32 {
        self.items
            .iter()
            .filter(|held| held.name == name)
            .map(|held| held.quantity)
            .sum()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What a block is beyond its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// No extra state (air, terrain).
    Plain,
    /// A storage block with its own inventory.
    Chest(Inventory),
    /// A smelting block with its own inventory.
    Furnace(Inventory),
    /// The cell occupied by a registered agent.
    Agent(AgentId),
}

impl BlockKind {
    pub fn inventory(&self) -> Option<&Inventory> {
        match self {
            BlockKind::Chest(inv) | BlockKind::Furnace(inv) => Some(inv),
            _ => None,
        }
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match self {
            BlockKind::Chest(inv) | BlockKind::Furnace(inv) => Some(inv),
            _ => None,
        }
    }
}

/// A unit of world content at one integer position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub type_name: String,
    pub pos: BlockPos,
    /// Whether an agent may occupy this cell.
    pub walkable: bool,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(type_name: impl Into<String>, pos: BlockPos, walkable: bool, kind: BlockKind) -> Self {
        Self {
            id: BlockId::fresh(),
            type_name: type_name.into(),
            pos,
            walkable,
            kind,
        }
    }

    /// The placeholder returned for cells with nothing stored. Walkable,
    /// plain, never written back to the store.
    pub fn air(pos: BlockPos) -> Self {
        Self::new(AIR_NAME, pos, true, BlockKind::Plain)
    }

    /// A non-walkable block with no extra state.
    pub fn solid(type_name: impl Into<String>, pos: BlockPos) -> Self {
        Self::new(type_name, pos, false, BlockKind::Plain)
    }

    pub fn chest(pos: BlockPos) -> Self {
        Self::new("minecraft:chest", pos, false, BlockKind::Chest(Inventory::new()))
    }

    pub fn furnace(pos: BlockPos) -> Self {
        Self::new("minecraft:furnace", pos, false, BlockKind::Furnace(Inventory::new()))
    }

    pub fn is_air(&self) -> bool {
        self.type_name == AIR_NAME
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.kind.inventory()
    }
}

/// Cardinal facing for agents. North is +z, east is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const fn left(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    pub const fn right(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// The facing whose forward step is `(dx, dz)`, if that is one cardinal
    /// step.
    pub const fn from_step(dx: i64, dz: i64) -> Option<Direction> {
        match (dx, dz) {
            (0, 1) => Some(Direction::North),
            (0, -1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            (1, 0) => Some(Direction::East),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }
}
