//! The agent registry: turtles, their job queues, and the world operations
//! that manage them.
//!
//! An agent is both a registry record and a block: spawning writes a
//! `BlockKind::Agent` cell at its position, and moving it keeps record and
//! cell in lockstep. Despawning deliberately leaves the cell behind; callers
//! that want it cleared follow up with [`World::remove_block`].

use std::collections::{HashMap, VecDeque};

use slotmap::new_key_type;

use crate::error::WorldError;
use crate::world::World;
use crate::world::block::{Block, BlockKind, Direction, Inventory, Item};
use crate::world::position::BlockPos;

new_key_type! {
    /// Handle to a registered turtle. Stays invalid after a despawn, even if
    /// the slot is reused.
    pub struct AgentId;
}

/// Block type name for the cell an agent occupies.
pub const TURTLE_TYPE: &str = "computercraft:crafty_turtle";

/// An autonomous turtle: position, facing, fuel, inventory, and job state.
#[derive(Debug, Clone)]
pub struct Turtle {
    pub id: AgentId,
    pub label: String,
    pub pos: BlockPos,
    pub direction: Direction,
    pub fuel: u32,
    /// 1-based inventory slot, 1..=16 like the in-game machines.
    pub selected_slot: u8,
    pub inventory: Inventory,
    pub left_hand: Option<Item>,
    pub right_hand: Option<Item>,
    /// Latest report per tracker name. Overwritten on re-report.
    pub tracker_results: HashMap<String, serde_json::Value>,
    pub queued_jobs: VecDeque<Job>,
    pub active_jobs: Vec<Job>,
}

impl Turtle {
    fn new(id: AgentId, pos: BlockPos, direction: Direction) -> Self {
        Self {
            id,
            label: "Unknown".to_string(),
            pos,
            direction,
            fuel: 0,
            selected_slot: 1,
            inventory: Inventory::new(),
            left_hand: None,
            right_hand: None,
            tracker_results: HashMap::new(),
            queued_jobs: VecDeque::new(),
            active_jobs: Vec::new(),
        }
    }

    /// Whether any job is queued or running.
    pub fn is_busy(&self) -> bool {
        !self.queued_jobs.is_empty() || !self.active_jobs.is_empty()
    }
}

/// A queued unit of work. The engine never interprets the payload; the host's
/// command layer assigns it meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Unique across the world, monotonically increasing.
    pub id: u64,
    pub payload: serde_json::Value,
}

impl World {
    /// Register a new turtle and place it as a block at `pos`, replacing
    /// whatever occupied the cell.
    pub fn spawn_agent(&mut self, pos: BlockPos, direction: Direction) -> AgentId {
        let id = self
            .agents
            .insert_with_key(|id| Turtle::new(id, pos, direction));
        self.put_block(pos, Block::new(TURTLE_TYPE, pos, false, BlockKind::Agent(id)));
        tracing::info!("Agent {:?} spawned at {:?} facing {:?}", id, pos, direction);
        id
    }

    /// Unregister an agent and return its final record. Its block stays in
    /// the world until the caller clears the cell.
    pub fn despawn_agent(&mut self, id: AgentId) -> Result<Turtle, WorldError> {
        let turtle = self.agents.remove(id).ok_or(WorldError::AgentNotFound(id))?;
        tracing::info!("Agent {:?} despawned; block at {:?} left in place", id, turtle.pos);
        Ok(turtle)
    }

    pub fn agent(&self, id: AgentId) -> Result<&Turtle, WorldError> {
        self.agents.get(id).ok_or(WorldError::AgentNotFound(id))
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut Turtle, WorldError> {
        self.agents.get_mut(id).ok_or(WorldError::AgentNotFound(id))
    }

    pub fn agents(&self) -> impl Iterator<Item = &Turtle> {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Step an agent to `to`, keeping registry record and block index in
    /// lockstep. The vacated cell reads as air afterwards. Cells holding a
    /// non-walkable block are rejected.
    pub fn move_agent(&mut self, id: AgentId, to: BlockPos) -> Result<(), WorldError> {
        let from = self.agent(id)?.pos;
        if !self.get_block(to).walkable {
            return Err(WorldError::Blocked(to));
        }
        self.remove_block(from);
        self.put_block(to, Block::new(TURTLE_TYPE, to, false, BlockKind::Agent(id)));
        if let Some(turtle) = self.agents.get_mut(id) {
            turtle.pos = to;
        }
        Ok(())
    }

    /// Store a result payload under `tracker`. Unknown agents are silently
    /// ignored: reports can arrive after a despawn.
    pub fn record_result(&mut self, id: AgentId, tracker: impl Into<String>, payload: serde_json::Value) {
        if let Some(turtle) = self.agents.get_mut(id) {
            turtle.tracker_results.insert(tracker.into(), payload);
        }
    }

    /// Queue a job for `id`, returning the assigned job id.
    pub fn enqueue_job(&mut self, id: AgentId, payload: serde_json::Value) -> Result<u64, WorldError> {
        let turtle = self.agents.get_mut(id).ok_or(WorldError::AgentNotFound(id))?;
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        turtle.queued_jobs.push_back(Job { id: job_id, payload });
        Ok(job_id)
    }

    /// The jobs waiting to be claimed, front first.
    pub fn pending_jobs(&self, id: AgentId) -> Result<&VecDeque<Job>, WorldError> {
        Ok(&self.agent(id)?.queued_jobs)
    }

    /// Move the front queued job into the active list and return it. `None`
    /// when the queue is empty.
    pub fn claim_job(&mut self, id: AgentId) -> Result<Option<Job>, WorldError> {
        let turtle = self.agents.get_mut(id).ok_or(WorldError::AgentNotFound(id))?;
        let Some(job) = turtle.queued_jobs.pop_front() else {
            return Ok(None);
        };
        turtle.active_jobs.push(job.clone());
        Ok(Some(job))
    }

    /// Retire an active job. Returns whether it was actually running.
    pub fn finish_job(&mut self, id: AgentId, job_id: u64) -> Result<bool, WorldError> {
        let turtle = self.agents.get_mut(id).ok_or(WorldError::AgentNotFound(id))?;
        let before = turtle.active_jobs.len();
        turtle.active_jobs.retain(|job| job.id != job_id);
        Ok(turtle.active_jobs.len() != before)
    }
}
