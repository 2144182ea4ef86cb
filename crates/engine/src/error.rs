//! Error types for world and agent operations.

use thiserror::Error;

use crate::agent::AgentId;
use crate::world::position::{BlockPos, ChunkPos};

/// Failures surfaced by the world index and the agent registry.
///
/// Pathfinding that finds no route is not an error: `Unreachable` and
/// `Exhausted` are ordinary outcomes carried by
/// [`PathResult`](crate::nav::path::PathResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("no agent registered under {0:?}")]
    AgentNotFound(AgentId),

    #[error("chunk {0:?} has never been allocated")]
    ChunkNotFound(ChunkPos),

    #[error("cell {0:?} is not walkable")]
    Blocked(BlockPos),

    #[error("invalid item: {0}")]
    InvalidItem(&'static str),
}
