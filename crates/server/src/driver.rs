//! Per-agent driver tasks.
//!
//! Each registered turtle gets one tokio task that claims queued jobs,
//! decodes them into commands, and executes them: plan under the read lock,
//! walk step by step under short write locks, publish the resulting block
//! changes. Every step re-checks its destination at execution time; when the
//! world has shifted since planning, the driver invokes the engine's
//! replanning hook and continues on the fresh route.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;

use burrow_engine::agent::AgentId;
use burrow_engine::error::WorldError;
use burrow_engine::nav::neighbors::{MoveFlags, neighbors};
use burrow_engine::nav::path::{SearchLimits, find_path, on_path_blocked};
use burrow_engine::world::World;
use burrow_engine::world::block::{Direction, Item};
use burrow_engine::world::position::BlockPos;

use crate::blocks;
use crate::commands::TurtleCommand;
use crate::dashboard::DashboardState;
use crate::event_bus::{BlockChange, ChangeSource, WorldChangeBatch};
use crate::turtle::compile_route;
use crate::world_ref::SharedWorld;

/// How often an idle driver polls its job queue.
pub const IDLE_POLL: Duration = Duration::from_millis(200);
/// Pause between executed steps, roughly one turtle move.
pub const STEP_PAUSE: Duration = Duration::from_millis(50);
/// Fuel burned per movement step.
pub const FUEL_PER_STEP: u32 = 1;
/// Turtles cannot strafe or move diagonally; plan accordingly.
pub const DRIVE_FLAGS: MoveFlags = MoveFlags::cardinal();

/// Spawn one driver task per agent.
pub fn start(
    world: SharedWorld,
    dashboard: Arc<DashboardState>,
    bus: broadcast::Sender<WorldChangeBatch>,
    agents: Vec<AgentId>,
) {
    for id in agents {
        let world = world.clone();
        let dashboard = Arc::clone(&dashboard);
        let bus = bus.clone();
        tokio::spawn(async move {
            run_driver(world, dashboard, bus, id).await;
        });
    }
}

async fn run_driver(
    world: SharedWorld,
    dashboard: Arc<DashboardState>,
    bus: broadcast::Sender<WorldChangeBatch>,
    id: AgentId,
) {
    tracing::info!("Driver for {:?} started", id);
    let mut poll = tokio::time::interval(IDLE_POLL);

    loop {
        poll.tick().await;

        let claimed = {
            let mut w = world.write();
            match w.claim_job(id) {
                Ok(job) => job,
                Err(_) => {
                    tracing::info!("Driver for {:?} stopping: agent despawned", id);
                    return;
                }
            }
        };
        let Some(job) = claimed else { continue };

        let Some(command) = TurtleCommand::from_payload(&job.payload) else {
            tracing::warn!("Driver for {:?}: job {} payload is unreadable, dropping it", id, job.id);
            let mut w = world.write();
            let _ = w.finish_job(id, job.id);
            w.record_result(id, format!("job-{}", job.id), json!({ "ok": false, "error": "bad payload" }));
            continue;
        };

        tracing::info!("Driver for {:?}: job {} is {:?}", id, job.id, command);
        let report = execute(&world, &dashboard, &bus, id, &command).await;
        tracing::info!("Driver for {:?}: job {} finished: {}", id, job.id, report);

        let mut w = world.write();
        let _ = w.finish_job(id, job.id);
        w.record_result(id, format!("job-{}", job.id), report);
        dashboard.metrics.job_finished();
    }
}

/// Run one command to completion and produce its tracker report.
async fn execute(
    world: &SharedWorld,
    dashboard: &DashboardState,
    bus: &broadcast::Sender<WorldChangeBatch>,
    id: AgentId,
    command: &TurtleCommand,
) -> serde_json::Value {
    let target = command.target();
    match command {
        TurtleCommand::GoTo { .. } => walk_to(world, dashboard, bus, id, target).await,

        TurtleCommand::Dig { .. } => {
            let walked = match approach(world, dashboard, bus, id, target).await {
                Some(report) => report,
                None => return json!({ "ok": false, "error": "no reachable cell next to target" }),
            };
            if !report_ok(&walked) {
                return walked;
            }
            let (removed, change) = {
                let mut w = world.write();
                face_target(&mut w, id, target);
                let removed = w.remove_block(target).map(|b| b.type_name);
                if let Some(name) = &removed {
                    collect(&mut w, id, name);
                }
                (removed, BlockChange::of(&w.get_block(target)))
            };
            if removed.is_some() {
                publish(bus, ChangeSource::Driver(id), vec![change]);
            }
            json!({ "ok": true, "dug": removed })
        }

        TurtleCommand::Place { block_name, .. } => {
            let walked = match approach(world, dashboard, bus, id, target).await {
                Some(report) => report,
                None => return json!({ "ok": false, "error": "no reachable cell next to target" }),
            };
            if !report_ok(&walked) {
                return walked;
            }
            let change = {
                let mut w = world.write();
                face_target(&mut w, id, target);
                if !w.get_block(target).is_air() {
                    return json!({ "ok": false, "error": "target cell is occupied" });
                }
                // Stock is drawn down when carried; running dry does not fail
                // the command.
                if let Ok(turtle) = w.agent_mut(id) {
                    turtle.inventory.take(block_name, 1);
                }
                w.put_block(target, blocks::plain(block_name, target));
                BlockChange::of(&w.get_block(target))
            };
            publish(bus, ChangeSource::Driver(id), vec![change]);
            json!({ "ok": true, "placed": block_name })
        }
    }
}

/// Walk the agent to `goal`, replanning around obstructions as they appear.
async fn walk_to(
    world: &SharedWorld,
    dashboard: &DashboardState,
    bus: &broadcast::Sender<WorldChangeBatch>,
    id: AgentId,
    goal: BlockPos,
) -> serde_json::Value {
    let planned = {
        let w = world.read();
        let from = match w.agent(id) {
            Ok(turtle) => turtle.pos,
            Err(_) => return json!({ "ok": false, "error": "agent gone" }),
        };
        let result = find_path(&w, from, goal, DRIVE_FLAGS, SearchLimits::default());
        if result.found() {
            // What the physical client would receive for this route.
            if let Ok((actions, _)) = compile_route(&result.route, w.agent(id).map(|t| t.direction).unwrap_or(Direction::North)) {
                tracing::debug!("Driver for {:?}: route of {} cells compiles to {} actions", id, result.route.len(), actions.len());
            }
        }
        result
    };
    if !planned.found() {
        return json!({ "ok": false, "error": "no route", "outcome": format!("{:?}", planned.outcome) });
    }

    let mut route = planned.route;
    let mut index = 1;
    let mut steps = 0u64;
    let mut replans = 0u64;

    while index < route.len() {
        tokio::time::sleep(STEP_PAUSE).await;
        let next = route[index];

        let step = {
            let mut w = world.write();
            step_agent(&mut w, id, next)
        };

        match step {
            StepResult::Moved(changes) => {
                publish(bus, ChangeSource::Driver(id), changes);
                dashboard.metrics.step_walked();
                steps += 1;
                index += 1;
            }
            StepResult::Blocked => {
                replans += 1;
                dashboard.metrics.replan();
                let replanned = {
                    let w = world.read();
                    let current = w.agent(id).map(|t| t.pos).ok();
                    on_path_blocked(&w, &route, index, current, DRIVE_FLAGS, SearchLimits::default())
                };
                if !replanned.found() {
                    return json!({
                        "ok": false,
                        "error": "route blocked",
                        "steps": steps,
                        "replans": replans,
                    });
                }
                route = replanned.route;
                index = 1;
            }
            StepResult::AgentGone => {
                return json!({ "ok": false, "error": "agent gone" });
            }
        }
    }

    json!({ "ok": true, "steps": steps, "replans": replans })
}

enum StepResult {
    Moved(Vec<BlockChange>),
    Blocked,
    AgentGone,
}

/// Advance the agent one cell, burning fuel and turning to face the step.
/// The destination is re-checked here; the route may be stale.
fn step_agent(w: &mut World, id: AgentId, next: BlockPos) -> StepResult {
    let from = match w.agent(id) {
        Ok(turtle) => turtle.pos,
        Err(_) => return StepResult::AgentGone,
    };
    match w.move_agent(id, next) {
        Ok(()) => {}
        Err(WorldError::Blocked(_)) => return StepResult::Blocked,
        Err(_) => return StepResult::AgentGone,
    }
    if let Ok(turtle) = w.agent_mut(id) {
        turtle.fuel = turtle.fuel.saturating_sub(FUEL_PER_STEP);
        if let Some(direction) = Direction::from_step(next.x - from.x, next.z - from.z) {
            turtle.direction = direction;
        }
    }
    StepResult::Moved(vec![
        BlockChange::of(&w.get_block(from)),
        BlockChange::of(&w.get_block(next)),
    ])
}

/// Turn the agent toward a horizontally adjacent target; targets above or
/// below leave the facing alone.
fn face_target(w: &mut World, id: AgentId, target: BlockPos) {
    if let Ok(turtle) = w.agent_mut(id) {
        if let Some(direction) = Direction::from_step(target.x - turtle.pos.x, target.z - turtle.pos.z) {
            turtle.direction = direction;
        }
    }
}

/// Deposit one dug block into the agent's inventory.
fn collect(w: &mut World, id: AgentId, name: &str) {
    let Ok(item) = Item::new(name, 1) else { return };
    if let Ok(turtle) = w.agent_mut(id) {
        turtle.inventory.add(item);
    }
}

/// Walk to a cell adjacent to `target`; `None` when no approach cell exists.
async fn approach(
    world: &SharedWorld,
    dashboard: &DashboardState,
    bus: &broadcast::Sender<WorldChangeBatch>,
    id: AgentId,
    target: BlockPos,
) -> Option<serde_json::Value> {
    let stand = {
        let w = world.read();
        let from = w.agent(id).ok()?.pos;
        if from.manhattan(target) == 1 {
            // Already in tool range.
            Some(from)
        } else {
            pick_approach(&w, from, target)
        }
    }?;
    Some(walk_to(world, dashboard, bus, id, stand).await)
}

/// The walkable cell adjacent to `target` closest to `from`, if any.
fn pick_approach(w: &World, from: BlockPos, target: BlockPos) -> Option<BlockPos> {
    neighbors(w, target, DRIVE_FLAGS)
        .into_iter()
        .map(|b| b.pos)
        .min_by_key(|p| p.manhattan(from))
}

fn report_ok(report: &serde_json::Value) -> bool {
    report
        .get("ok")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

fn publish(bus: &broadcast::Sender<WorldChangeBatch>, source: ChangeSource, changes: Vec<BlockChange>) {
    if changes.is_empty() {
        return;
    }
    // No subscribers is fine; the send result only signals that.
    let _ = bus.send(WorldChangeBatch {
        source,
        changes: changes.into(),
    });
}
