use std::sync::Arc;
use std::time::Duration;

use burrow_engine::agent::AgentId;
use burrow_engine::world::World;
use burrow_engine::world::block::{Block, BlockKind, Direction, Item};
use burrow_engine::world::position::BlockPos;
use burrow_server::blocks;
use burrow_server::commands::TurtleCommand;
use burrow_server::dashboard::{self, DashboardState};
use burrow_server::driver;
use burrow_server::event_bus::{self, BlockChange, ChangeSource, WorldChangeBatch};
use burrow_server::world_ref::SharedWorld;
use tokio::sync::broadcast;

/// How often the churn task relocates the roaming wall.
const CHURN_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    let demo_mode = std::env::args().any(|a| a == "--demo");
    let dashboard_port: u16 = std::env::args()
        .skip_while(|a| a != "--dashboard-port")
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8000);
    let plane: i64 = std::env::args()
        .skip_while(|a| a != "--plane")
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(48);
    let turtles: usize = std::env::args()
        .skip_while(|a| a != "--turtles")
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    if demo_mode {
        run_demo();
        return;
    }

    tracing::info!("Burrow -- turtle world server");

    // ── Generate scenario world and crew ────────────────────────────────
    let mut world = World::default();
    generate_scenario(&mut world, plane);
    tracing::info!(
        "World ready: {} chunks, {} blocks",
        world.chunk_count(),
        world.block_count()
    );

    let agents = spawn_crew(&mut world, plane, turtles);
    tracing::info!("Spawned {} turtles", agents.len());

    let world = SharedWorld::new(world);

    // World-change event bus: drivers and the churn task publish here,
    // dashboard sockets subscribe.
    let (bus_tx, _) = broadcast::channel::<WorldChangeBatch>(event_bus::BUS_CAPACITY);

    // Live dashboard (non-blocking -- runs on its own tasks).
    let dashboard_state = Arc::new(DashboardState::new(world.clone()));
    let dash = Arc::clone(&dashboard_state);
    let dash_bus = bus_tx.clone();
    tokio::spawn(async move {
        dashboard::server::start(dash, dash_bus, dashboard_port).await;
    });
    tracing::info!("Dashboard on http://0.0.0.0:{}", dashboard_port);

    // One driver task per turtle.
    driver::start(world.clone(), dashboard_state, bus_tx.clone(), agents);

    tokio::select! {
        _ = churn(world, bus_tx, plane) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, shutting down...");
        }
    }
}

/// Flat proving ground: a bedrock floor under a walkable grass plane, with
/// a row of supply chests along the west edge.
fn generate_scenario(world: &mut World, plane: i64) {
    for x in 0..plane {
        for z in 0..plane {
            let floor = BlockPos::new(x, -1, z);
            world.put_block(floor, blocks::plain(blocks::BEDROCK, floor));
            let surface = BlockPos::new(x, 0, z);
            world.put_block(surface, blocks::plain(blocks::GRASS_BLOCK, surface));
        }
    }

    for i in 0..3 {
        let pos = BlockPos::new(0, 0, i * 3 + 2);
        let mut chest = Block::chest(pos);
        if let Ok(dirt) = Item::new(blocks::DIRT, 64) {
            if let Some(inv) = chest.kind.inventory_mut() {
                inv.add(dirt);
            }
        }
        world.put_block(pos, chest);
    }
}

/// Spawn the turtle crew along the south edge and queue each one a trip to
/// the far corner, staggered so their routes interleave.
fn spawn_crew(world: &mut World, plane: i64, count: usize) -> Vec<AgentId> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let slot = i as i64;
        let home = BlockPos::new(1 + 2 * slot, 0, 1);
        let id = world.spawn_agent(home, Direction::North);
        if let Ok(turtle) = world.agent_mut(id) {
            turtle.label = format!("turtle-{i}");
            turtle.fuel = 1_000;
            turtle.left_hand = Item::new("minecraft:diamond_pickaxe", 1).ok();
        }

        let goal = BlockPos::new(plane - 2 - 2 * slot, 0, plane - 2);
        match world.enqueue_job(id, TurtleCommand::go_to(goal).to_payload()) {
            Ok(job) => tracing::info!("Queued job {} for turtle-{}: go to {:?}", job, i, goal),
            Err(e) => tracing::error!("Failed to queue starter job: {}", e),
        }
        ids.push(id);
    }
    ids
}

/// Periodically rebuild a stone wall across the middle of the plane with a
/// roaming two-cell gap, so the drivers keep exercising the replan path.
async fn churn(world: SharedWorld, bus: broadcast::Sender<WorldChangeBatch>, plane: i64) {
    let wall_z = plane / 2;
    let mut gap = 0i64;
    let mut interval = tokio::time::interval(CHURN_INTERVAL);
    interval.tick().await; // first tick is immediate, skip it

    loop {
        interval.tick().await;
        gap = (gap + 3) % (plane - 1);

        let mut changes = Vec::new();
        {
            let mut w = world.write();
            for x in 0..plane {
                let pos = BlockPos::new(x, 0, wall_z);
                // Never overwrite a turtle standing in the wall line.
                if matches!(w.get_block(pos).kind, BlockKind::Agent(_)) {
                    continue;
                }
                let block = if x == gap || x == gap + 1 {
                    blocks::plain(blocks::GRASS_BLOCK, pos)
                } else {
                    blocks::plain(blocks::STONE, pos)
                };
                changes.push(BlockChange::of(&block));
                w.put_block(pos, block);
            }
        }

        tracing::info!("Churn: wall gap now at x={}", gap);
        let _ = bus.send(WorldChangeBatch {
            source: ChangeSource::External,
            changes: changes.into(),
        });
    }
}

/// Offline engine walkthrough: plan a route, wall a cell off mid-route,
/// replan around it, and report cache behavior.
fn run_demo() {
    use burrow_engine::nav::neighbors::MoveFlags;
    use burrow_engine::nav::path::{self, SearchLimits};

    tracing::info!("Burrow -- route planning demo");

    let mut world = World::default();
    generate_scenario(&mut world, 16);
    tracing::info!(
        "World ready: {} chunks, {} blocks",
        world.chunk_count(),
        world.block_count()
    );

    let flags = MoveFlags::cardinal();
    let limits = SearchLimits::default();
    let start = BlockPos::new(1, 0, 1);
    let goal = BlockPos::new(14, 0, 14);

    let planned = path::find_path(&world, start, goal, flags, limits);
    tracing::info!("Planned {} steps ({:?})", planned.route.len(), planned.outcome);
    if !planned.found() {
        tracing::warn!("No route on an open plane -- something is off.");
        return;
    }

    let blocked_index = planned.route.len() / 2;
    let obstruction = planned.route[blocked_index];
    world.put_block(obstruction, blocks::plain(blocks::STONE, obstruction));
    tracing::info!("Walled off {:?}", obstruction);

    let replanned = path::on_path_blocked(&world, &planned.route, blocked_index, None, flags, limits);
    tracing::info!(
        "Replanned {} steps ({:?})",
        replanned.route.len(),
        replanned.outcome
    );

    let stats = world.route_cache().stats();
    tracing::info!(
        "Route cache: {} routes, {} hits / {} misses, {} stores, {} invalidations",
        world.route_cache().len(),
        stats.hits,
        stats.misses,
        stats.stores,
        stats.invalidations
    );
}
