//! Live web dashboard: world status, region snapshots, and a change feed.
//!
//! Contract with the drivers:
//!   - metrics are atomic adds, never blocking;
//!   - world reads happen on the dashboard's own tasks under brief read
//!     locks;
//!   - the change feed re-broadcasts event-bus batches, so a slow browser
//!     lags the broadcast channel, never a driver.
//!
//! Engine types stay serde-free; everything leaving over HTTP is converted
//! into the view structs defined here.

pub mod metrics;
pub mod server;

use serde::Serialize;

use burrow_engine::agent::Turtle;
use burrow_engine::world::World;
use burrow_engine::world::block::Block;

use crate::event_bus::{ChangeSource, WorldChangeBatch};
use crate::world_ref::SharedWorld;

pub use metrics::Metrics;

/// Central dashboard state, shared as `Arc<DashboardState>`.
pub struct DashboardState {
    pub metrics: Metrics,
    pub world: SharedWorld,
}

impl DashboardState {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            metrics: Metrics::new(),
            world,
        }
    }

    /// Assemble the `/status` document under one brief read lock.
    pub fn status(&self) -> StatusSnapshot {
        let world = self.world.read();
        StatusSnapshot {
            metrics: self.metrics.snapshot(),
            world: WorldSnapshot::of(&world),
            cache: CacheSnapshot::of(&world),
            agents: world.agents().map(AgentView::of).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub metrics: metrics::MetricsSnapshot,
    pub world: WorldSnapshot,
    pub cache: CacheSnapshot,
    pub agents: Vec<AgentView>,
}

/// World gauges.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub id: String,
    pub chunks: usize,
    pub blocks: usize,
    pub agents: usize,
    pub block_types: Vec<String>,
}

impl WorldSnapshot {
    pub fn of(world: &World) -> Self {
        Self {
            id: world.id.to_string(),
            chunks: world.chunk_count(),
            blocks: world.block_count(),
            agents: world.agent_count(),
            block_types: world.block_types().map(str::to_string).collect(),
        }
    }
}

/// Route-cache gauges and counters.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub routes: usize,
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub invalidations: u64,
}

impl CacheSnapshot {
    pub fn of(world: &World) -> Self {
        let stats = world.route_cache().stats();
        Self {
            routes: world.route_cache().len(),
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            invalidations: stats.invalidations,
        }
    }
}

/// One agent, shaped for JSON.
#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub label: String,
    pub pos: [i64; 3],
    pub direction: &'static str,
    pub fuel: u32,
    pub busy: bool,
    pub queued_jobs: usize,
    pub active_jobs: usize,
}

impl AgentView {
    pub fn of(turtle: &Turtle) -> Self {
        Self {
            label: turtle.label.clone(),
            pos: [turtle.pos.x, turtle.pos.y, turtle.pos.z],
            direction: turtle.direction.name(),
            fuel: turtle.fuel,
            busy: turtle.is_busy(),
            queued_jobs: turtle.queued_jobs.len(),
            active_jobs: turtle.active_jobs.len(),
        }
    }
}

/// One block, shaped for JSON.
#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub name: String,
    pub pos: [i64; 3],
    pub walkable: bool,
}

impl BlockView {
    pub fn of(block: &Block) -> Self {
        Self {
            name: block.type_name.clone(),
            pos: [block.pos.x, block.pos.y, block.pos.z],
            walkable: block.walkable,
        }
    }
}

/// An event-bus batch, shaped for the WebSocket feed.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeBatchView {
    pub source: String,
    pub changes: Vec<BlockView>,
}

impl ChangeBatchView {
    pub fn of(batch: &WorldChangeBatch) -> Self {
        Self {
            source: match batch.source {
                ChangeSource::Driver(id) => format!("driver:{:?}", id),
                ChangeSource::External => "external".to_string(),
            },
            changes: batch
                .changes
                .iter()
                .map(|change| BlockView {
                    name: change.type_name.clone(),
                    pos: [change.pos.x, change.pos.y, change.pos.z],
                    walkable: change.walkable,
                })
                .collect(),
        }
    }
}
