//! End-to-end driver tests: a real tokio runtime, a shared world, and one
//! driver task walking a turtle through queued jobs.

use std::sync::Arc;
use std::time::Duration;

use burrow_engine::agent::AgentId;
use burrow_engine::world::World;
use burrow_engine::world::block::{Block, Direction, Item};
use burrow_engine::world::position::BlockPos;
use burrow_server::blocks;
use burrow_server::commands::TurtleCommand;
use burrow_server::dashboard::DashboardState;
use burrow_server::driver;
use burrow_server::event_bus::{self, WorldChangeBatch};
use burrow_server::world_ref::SharedWorld;
use tokio::sync::broadcast;
use tokio::time::{Instant, sleep};

// ---- helpers --------------------------------------------------------------

/// Walkable grass plane at y=0, `size` cells on a side.
fn plane_world(size: i64) -> World {
    let mut world = World::default();
    for x in 0..size {
        for z in 0..size {
            let pos = BlockPos::new(x, 0, z);
            world.put_block(pos, blocks::plain(blocks::GRASS_BLOCK, pos));
        }
    }
    world
}

/// Spin up the full host around `world`: event bus, dashboard state, and one
/// driver task for `agent`.
fn start_host(world: SharedWorld, agent: AgentId) {
    let (bus_tx, _) = broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);
    let dashboard = Arc::new(DashboardState::new(world.clone()));
    driver::start(world, dashboard, bus_tx, vec![agent]);
}

/// Poll until the agent has posted a report under `tracker`, or time out.
async fn wait_for_report(
    world: &SharedWorld,
    agent: AgentId,
    tracker: &str,
) -> serde_json::Value {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(report) = world
            .read()
            .agent(agent)
            .ok()
            .and_then(|t| t.tracker_results.get(tracker).cloned())
        {
            return report;
        }
        assert!(Instant::now() < deadline, "no report under {tracker:?} within 10s");
        sleep(Duration::from_millis(25)).await;
    }
}

/// Poll until `predicate` holds on the world, or time out.
async fn wait_until(world: &SharedWorld, predicate: impl Fn(&World) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !predicate(&world.read()) {
        assert!(Instant::now() < deadline, "condition not reached within 10s");
        sleep(Duration::from_millis(10)).await;
    }
}

// ---- walking --------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn turtle_walks_to_goal_and_reports() {
    let mut world = plane_world(8);
    let home = BlockPos::new(0, 0, 0);
    let goal = BlockPos::new(7, 0, 7);

    let id = world.spawn_agent(home, Direction::North);
    world.agent_mut(id).unwrap().fuel = 100;
    let job = world
        .enqueue_job(id, TurtleCommand::go_to(goal).to_payload())
        .unwrap();

    let world = SharedWorld::new(world);
    start_host(world.clone(), id);

    let report = wait_for_report(&world, id, &format!("job-{job}")).await;
    assert_eq!(report["ok"], serde_json::json!(true));
    // Open plane, cardinal moves: exactly the manhattan distance.
    assert_eq!(report["steps"], serde_json::json!(14));

    let w = world.read();
    assert_eq!(w.agent(id).unwrap().pos, goal);
    assert_eq!(w.get_block(goal).type_name, blocks::TURTLE);
    assert!(w.get_block(home).is_air());
}

#[tokio::test(flavor = "multi_thread")]
async fn turtle_replans_around_a_new_wall() {
    let mut world = plane_world(10);
    let home = BlockPos::new(0, 0, 5);
    let goal = BlockPos::new(9, 0, 5);

    let id = world.spawn_agent(home, Direction::East);
    world.agent_mut(id).unwrap().fuel = 100;
    let job = world
        .enqueue_job(id, TurtleCommand::go_to(goal).to_payload())
        .unwrap();

    let world = SharedWorld::new(world);
    start_host(world.clone(), id);

    // Let it commit to the straight run, then drop a wall ahead of it.
    wait_until(&world, |w| w.agent(id).is_ok_and(|t| t.pos.x >= 2)).await;
    let wall = BlockPos::new(6, 0, 5);
    world.write().put_block(wall, Block::solid(blocks::STONE, wall));

    let report = wait_for_report(&world, id, &format!("job-{job}")).await;
    assert_eq!(report["ok"], serde_json::json!(true));
    assert!(report["replans"].as_u64().is_some_and(|n| n >= 1));
    // The detour costs more than the direct 9-step run.
    assert!(report["steps"].as_u64().is_some_and(|n| n >= 10));

    let w = world.read();
    assert_eq!(w.agent(id).unwrap().pos, goal);
    assert!(!w.get_block(wall).walkable);
}

// ---- tool work ------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn turtle_digs_the_target_and_collects_it() {
    let mut world = plane_world(6);
    let stone = BlockPos::new(3, 0, 3);
    world.put_block(stone, Block::solid(blocks::STONE, stone));

    let id = world.spawn_agent(BlockPos::new(0, 0, 3), Direction::North);
    world.agent_mut(id).unwrap().fuel = 100;
    let job = world
        .enqueue_job(id, TurtleCommand::dig(stone).to_payload())
        .unwrap();

    let world = SharedWorld::new(world);
    start_host(world.clone(), id);

    let report = wait_for_report(&world, id, &format!("job-{job}")).await;
    assert_eq!(report["ok"], serde_json::json!(true));
    assert_eq!(report["dug"], serde_json::json!(blocks::STONE));

    let w = world.read();
    // Walked to the nearest adjacent cell and turned toward the dig.
    let turtle = w.agent(id).unwrap();
    assert_eq!(turtle.pos, BlockPos::new(2, 0, 3));
    assert_eq!(turtle.direction, Direction::East);
    assert_eq!(turtle.inventory.total_of(blocks::STONE), 1);
    assert!(w.get_block(stone).is_air());
}

#[tokio::test(flavor = "multi_thread")]
async fn turtle_places_from_its_stock() {
    let mut world = plane_world(6);
    let target = BlockPos::new(2, 1, 2);

    let id = world.spawn_agent(BlockPos::new(0, 0, 0), Direction::North);
    let turtle = world.agent_mut(id).unwrap();
    turtle.fuel = 100;
    turtle.inventory.add(Item::new(blocks::STONE, 2).unwrap());
    let job = world
        .enqueue_job(id, TurtleCommand::place(target, blocks::STONE).to_payload())
        .unwrap();

    let world = SharedWorld::new(world);
    start_host(world.clone(), id);

    let report = wait_for_report(&world, id, &format!("job-{job}")).await;
    assert_eq!(report["ok"], serde_json::json!(true));
    assert_eq!(report["placed"], serde_json::json!(blocks::STONE));

    let w = world.read();
    assert_eq!(w.get_block(target).type_name, blocks::STONE);
    assert!(!w.get_block(target).walkable);
    assert_eq!(w.agent(id).unwrap().inventory.total_of(blocks::STONE), 1);
}
