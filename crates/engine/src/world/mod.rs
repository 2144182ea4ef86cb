//! The world index: chunked block storage plus the registries that hang off
//! it (block types, agents, cached routes).

pub mod block;
pub mod chunk;
pub mod position;

use std::collections::HashMap;

use indexmap::IndexSet;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::agent::{AgentId, Turtle};
use crate::error::WorldError;
use crate::nav::route::RouteCache;
use block::Block;
use chunk::Chunk;
use position::{BlockPos, ChunkPos};

/// A complete world: sparse chunk grid, block-type registry, agent registry,
/// and the route cache.
///
/// Every mutating operation takes `&mut self`, so a `World` has one writer at
/// a time by construction and route invalidation always happens inside the
/// same exclusive section as the mutation that caused it. Hosts that share a
/// world across tasks wrap it in a read-write lock.
pub struct World {
    /// Stable identity of this world instance.
    pub id: Uuid,
    chunks: HashMap<ChunkPos, Chunk>,
    /// Every type name ever written, in first-seen order.
    block_types: IndexSet<String>,
    route_cache: RouteCache,
    pub(crate) agents: SlotMap<AgentId, Turtle>,
    pub(crate) next_job_id: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            chunks: HashMap::new(),
            block_types: IndexSet::new(),
            route_cache: RouteCache::new(),
            agents: SlotMap::with_key(),
            next_job_id: 0,
        }
    }

    // ── Chunk operations ────────────────────────────────────────────────────

    /// The chunk owning `pos`, allocated lazily on first use. Only mutation
    /// paths call this; queries must not allocate.
    pub fn chunk_at(&mut self, pos: ChunkPos) -> &mut Chunk {
        self.chunks.entry(pos).or_default()
    }

    /// Chunk-level lookup. Unlike block reads, absence here is loud: callers
    /// asking for a whole chunk need to know it was never allocated.
    pub fn chunk(&self, pos: ChunkPos) -> Result<&Chunk, WorldError> {
        self.chunks.get(&pos).ok_or(WorldError::ChunkNotFound(pos))
    }

    /// Insert a whole prebuilt chunk (generation and loading path), replacing
    /// any chunk already at `pos`.
    ///
    /// Every block inside must be homed under `pos`; that is the invariant
    /// `get_block` relies on, so a violation is a bug in the builder rather
    /// than a runtime error.
    pub fn put_chunk(&mut self, pos: ChunkPos, chunk: Chunk) {
        debug_assert!(
            chunk.iter().all(|b| b.pos.chunk() == pos),
            "chunk inserted at {:?} contains blocks homed elsewhere",
            pos
        );
        for block in chunk.iter() {
            self.register_type(&block.type_name);
        }
        self.route_cache.invalidate_chunk(pos);
        self.chunks.insert(pos, chunk);
    }

    // ── Block operations ────────────────────────────────────────────────────

    /// Read the cell at `pos`. Empty and never-allocated cells come back as
    /// synthesized air -- absence is a value here, never an error.
    pub fn get_block(&self, pos: BlockPos) -> Block {
        self.chunks
            .get(&pos.chunk())
            .and_then(|chunk| chunk.get(pos.local()))
            .cloned()
            .unwrap_or_else(|| Block::air(pos))
    }

    /// Write `block` at `pos`, replacing any occupant. The block is re-homed
    /// to `pos`, its type name is registered, and every cached route through
    /// the cell is dropped.
    pub fn put_block(&mut self, pos: BlockPos, mut block: Block) {
        block.pos = pos;
        self.register_type(&block.type_name);
        self.route_cache.invalidate_through(pos);
        self.chunk_at(pos.chunk()).insert(pos.local(), block);
    }

    /// Remove the block at `pos`, if any; the cell reads as air afterwards.
    /// Removing nothing changes nothing, so cached routes stay put.
    pub fn remove_block(&mut self, pos: BlockPos) -> Option<Block> {
        let removed = self.chunks.get_mut(&pos.chunk())?.remove(pos.local())?;
        self.route_cache.invalidate_through(pos);
        Some(removed)
    }

    /// Every stored block inside the inclusive box spanned by `a` and `b`
    /// (corners in any order). Walks only the chunks overlapping the box, so
    /// viewers and scanners never re-derive chunk math themselves.
    pub fn blocks_in_region(&self, a: BlockPos, b: BlockPos) -> Vec<Block> {
        let min = BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let max = BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        let lo = min.chunk();
        let hi = max.chunk();

        let mut out = Vec::new();
        for cx in lo.x..=hi.x {
            for cz in lo.z..=hi.z {
                let Some(chunk) = self.chunks.get(&ChunkPos::new(cx, cz)) else {
                    continue;
                };
                for block in chunk.iter() {
                    let p = block.pos;
                    if p.x >= min.x
                        && p.x <= max.x
                        && p.y >= min.y
                        && p.y <= max.y
                        && p.z >= min.z
                        && p.z <= max.z
                    {
                        out.push(block.clone());
                    }
                }
            }
        }
        out
    }

    // ── Registries and counters ─────────────────────────────────────────────

    /// Block-type names ever written, in first-seen order.
    pub fn block_types(&self) -> impl Iterator<Item = &str> {
        self.block_types.iter().map(String::as_str)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Stored blocks across all chunks. Air is never stored, so this counts
    /// real content.
    pub fn block_count(&self) -> usize {
        self.chunks.values().map(Chunk::block_count).sum()
    }

    pub fn route_cache(&self) -> &RouteCache {
        &self.route_cache
    }

    fn register_type(&mut self, name: &str) {
        if !self.block_types.contains(name) {
            self.block_types.insert(name.to_string());
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
