//! Chunk storage: a 16x16 vertical column of blocks, sparse over every axis.
//!
//! A chunk only stores cells that were explicitly written. Everything else is
//! air, synthesized at read time by the world index -- storing air would just
//! bloat the maps with placeholders.

use std::collections::HashMap;

use super::block::Block;
use super::position::LocalBlockPos;

/// Blocks along each horizontal axis of a chunk.
pub const CHUNK_SIZE: i64 = 16;

/// One 16x16 column of the world.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Chunk {
    blocks: HashMap<LocalBlockPos, Block>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: LocalBlockPos) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    /// Store `block` at `pos`, returning the previous occupant if any.
    /// Replacement, not merge: the old record is gone.
    pub fn insert(&mut self, pos: LocalBlockPos, block: Block) -> Option<Block> {
        self.blocks.insert(pos, block)
    }

    pub fn remove(&mut self, pos: LocalBlockPos) -> Option<Block> {
        self.blocks.remove(&pos)
    }

    /// Number of stored (non-air) blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every stored block, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }
}
