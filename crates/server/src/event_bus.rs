//! World-change event bus.
//!
//! Every task that mutates the world publishes a [`WorldChangeBatch`] on a
//! shared `tokio::sync::broadcast` channel; the dashboard forwards batches to
//! connected browsers. Publishers identify themselves so subscribers can tell
//! driver activity from outside edits.

use std::sync::Arc;

use burrow_engine::agent::AgentId;
use burrow_engine::world::block::Block;
use burrow_engine::world::position::BlockPos;

/// Recommended capacity for the broadcast channel.
/// 256 batches in flight absorbs bursty activity without lagging receivers.
pub const BUS_CAPACITY: usize = 256;

/// Where a batch of changes originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// The driver task of one agent.
    Driver(AgentId),
    /// Anything else: scenario setup, admin edits, ambient churn.
    External,
}

/// One cell's new occupant, by name and walkability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockChange {
    pub pos: BlockPos,
    pub type_name: String,
    pub walkable: bool,
}

impl BlockChange {
    /// Describe the block now occupying its cell.
    pub fn of(block: &Block) -> Self {
        Self {
            pos: block.pos,
            type_name: block.type_name.clone(),
            walkable: block.walkable,
        }
    }
}

/// A batch of changes from a single action.
///
/// `Arc<[BlockChange]>` so that cloning per broadcast subscriber is a
/// refcount bump, not a deep copy.
#[derive(Debug, Clone)]
pub struct WorldChangeBatch {
    pub source: ChangeSource,
    pub changes: Arc<[BlockChange]>,
}
