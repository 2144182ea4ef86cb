//! Integration tests for the agent registry: spawn and despawn block
//! placement, movement, tracker results, and the job queue lifecycle.

use burrow_engine::agent::{AgentId, TURTLE_TYPE};
use burrow_engine::error::WorldError;
use burrow_engine::world::World;
use burrow_engine::world::block::{Block, BlockKind, Direction};
use burrow_engine::world::position::BlockPos;

// ---------------------------------------------------------------- lifecycle

#[test]
fn spawn_registers_the_agent_and_places_its_block() {
    let mut world = World::new();
    let pos = BlockPos::new(4, 0, 4);
    let id = world.spawn_agent(pos, Direction::East);

    assert_eq!(world.agent_count(), 1);
    let turtle = world.agent(id).unwrap();
    assert_eq!(turtle.pos, pos);
    assert_eq!(turtle.direction, Direction::East);
    assert_eq!(turtle.label, "Unknown");
    assert_eq!(turtle.selected_slot, 1);
    assert!(turtle.inventory.is_empty());
    assert!(turtle.left_hand.is_none() && turtle.right_hand.is_none());
    assert!(!turtle.is_busy());

    let block = world.get_block(pos);
    assert_eq!(block.type_name, TURTLE_TYPE);
    assert!(!block.walkable);
    assert_eq!(block.kind, BlockKind::Agent(id));
}

#[test]
fn despawn_leaves_the_block_behind() {
    let mut world = World::new();
    let pos = BlockPos::new(4, 0, 4);
    let id = world.spawn_agent(pos, Direction::South);

    let turtle = world.despawn_agent(id).unwrap();
    assert_eq!(turtle.pos, pos);
    assert!(matches!(world.agent(id), Err(WorldError::AgentNotFound(_))));
    assert!(matches!(world.despawn_agent(id), Err(WorldError::AgentNotFound(_))));

    // The cell is still occupied until the caller clears it.
    assert_eq!(world.get_block(pos).type_name, TURTLE_TYPE);
    world.remove_block(pos);
    assert!(world.get_block(pos).is_air());
}

#[test]
fn unknown_ids_fail_loudly_where_it_matters() {
    let world = World::new();
    let ghost = AgentId::default();
    assert!(matches!(world.agent(ghost), Err(WorldError::AgentNotFound(_))));
    assert!(matches!(world.pending_jobs(ghost), Err(WorldError::AgentNotFound(_))));
}

// ---------------------------------------------------------------- movement

#[test]
fn move_agent_relocates_record_and_block_together() {
    let mut world = World::new();
    let a = BlockPos::new(0, 0, 0);
    let b = BlockPos::new(1, 0, 0);
    let id = world.spawn_agent(a, Direction::East);

    world.move_agent(id, b).unwrap();
    assert_eq!(world.agent(id).unwrap().pos, b);
    assert!(world.get_block(a).is_air());
    assert_eq!(world.get_block(b).kind, BlockKind::Agent(id));
}

#[test]
fn move_agent_rejects_occupied_cells() {
    let mut world = World::new();
    let id = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::East);
    let wall = BlockPos::new(1, 0, 0);
    world.put_block(wall, Block::solid("minecraft:stone", wall));

    assert_eq!(world.move_agent(id, wall), Err(WorldError::Blocked(wall)));
    // Nothing moved.
    assert_eq!(world.agent(id).unwrap().pos, BlockPos::new(0, 0, 0));
    assert_eq!(world.get_block(wall).type_name, "minecraft:stone");
}

#[test]
fn agents_block_each_other() {
    let mut world = World::new();
    let first = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::East);
    let second = world.spawn_agent(BlockPos::new(2, 0, 0), Direction::West);

    let target = world.agent(second).unwrap().pos;
    assert_eq!(world.move_agent(first, target), Err(WorldError::Blocked(target)));
}

// ---------------------------------------------------------------- trackers

#[test]
fn tracker_results_are_recorded_and_overwritten() {
    let mut world = World::new();
    let id = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::North);

    world.record_result(id, "scan", serde_json::json!([1, 2]));
    world.record_result(id, "scan", serde_json::json!([3]));
    let turtle = world.agent(id).unwrap();
    assert_eq!(turtle.tracker_results["scan"], serde_json::json!([3]));
}

#[test]
fn results_for_unknown_agents_are_silently_dropped() {
    let mut world = World::new();
    let id = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::North);
    world.despawn_agent(id).unwrap();

    // A late report from a despawned agent must not panic or resurrect it.
    world.record_result(id, "scan", serde_json::json!(null));
    assert!(world.agent(id).is_err());
}

// ---------------------------------------------------------------- jobs

#[test]
fn jobs_claim_in_fifo_order() {
    let mut world = World::new();
    let id = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::North);

    let first = world.enqueue_job(id, serde_json::json!({ "n": 1 })).unwrap();
    let second = world.enqueue_job(id, serde_json::json!({ "n": 2 })).unwrap();
    assert!(first < second);
    assert_eq!(world.pending_jobs(id).unwrap().len(), 2);
    assert!(world.agent(id).unwrap().is_busy());

    let claimed = world.claim_job(id).unwrap().unwrap();
    assert_eq!(claimed.id, first);
    assert_eq!(claimed.payload, serde_json::json!({ "n": 1 }));
    assert_eq!(world.pending_jobs(id).unwrap().len(), 1);
    assert_eq!(world.agent(id).unwrap().active_jobs.len(), 1);

    assert!(world.finish_job(id, claimed.id).unwrap());
    assert!(world.agent(id).unwrap().active_jobs.is_empty());
    // Finishing twice reports the job as already gone.
    assert!(!world.finish_job(id, claimed.id).unwrap());

    let claimed = world.claim_job(id).unwrap().unwrap();
    assert_eq!(claimed.id, second);
    assert_eq!(world.claim_job(id).unwrap(), None);
}

#[test]
fn job_ids_are_unique_across_agents() {
    let mut world = World::new();
    let a = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::North);
    let b = world.spawn_agent(BlockPos::new(5, 0, 5), Direction::South);

    let mut ids = vec![
        world.enqueue_job(a, serde_json::json!(1)).unwrap(),
        world.enqueue_job(b, serde_json::json!(2)).unwrap(),
        world.enqueue_job(a, serde_json::json!(3)).unwrap(),
    ];
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn queue_operations_on_unknown_agents_fail() {
    let mut world = World::new();
    let ghost = AgentId::default();
    assert!(world.enqueue_job(ghost, serde_json::json!(1)).is_err());
    assert!(world.claim_job(ghost).is_err());
    assert!(world.finish_job(ghost, 0).is_err());
}
