//! Benchmark: sequential vs parallel route planning.
//!
//! Plans a batch of long routes across an obstacle-studded plane and measures
//! wall time for one-at-a-time planning against the rayon batch entry point.
//! Run with: `cargo run --release -p burrow-server --example bench_routes`

use std::time::Instant;

use burrow_engine::nav::neighbors::MoveFlags;
use burrow_engine::nav::path::{self, SearchLimits};
use burrow_engine::world::World;
use burrow_engine::world::position::BlockPos;

use burrow_server::blocks;

fn main() {
    let plane: i64 = 96;
    let routes = 64;

    println!("=== Burrow: Parallel Route Planning Benchmark ===\n");
    println!("  {}x{} plane, pillar obstacles every 5 cells", plane, plane);
    println!("  {} routes, cardinal moves, default node budget\n", routes);

    let flags = MoveFlags::cardinal();
    let limits = SearchLimits::default();
    let world = build_world(plane);
    let requests = build_requests(plane, routes);

    // --- Sequential ---
    let t0 = Instant::now();
    let seq: Vec<_> = requests
        .iter()
        .map(|&(start, goal)| path::find_path(&world, start, goal, flags, limits))
        .collect();
    let dt_seq = t0.elapsed();

    let found_seq = seq.iter().filter(|r| r.found()).count();
    println!("  Sequential: {:>3}/{} found in {:>8.2?}", found_seq, routes, dt_seq);

    // --- Parallel ---
    world.route_cache().clear();

    let t0 = Instant::now();
    let par = path::find_paths(&world, &requests, flags, limits);
    let dt_par = t0.elapsed();

    let found_par = par.iter().filter(|r| r.found()).count();
    println!("  Parallel:   {:>3}/{} found in {:>8.2?}", found_par, routes, dt_par);

    let speedup = dt_seq.as_secs_f64() / dt_par.as_secs_f64();
    println!("\n  Speedup: {:.2}x", speedup);

    // --- Verify identical ---
    let mismatches = seq
        .iter()
        .zip(&par)
        .filter(|(a, b)| a.outcome != b.outcome || a.route != b.route)
        .count();

    if mismatches == 0 {
        println!("  Verification: PASS (routes identical)");
    } else {
        println!("  Verification: FAIL ({} mismatches!)", mismatches);
    }
}

/// Walkable grass plane with a 4% scatter of stone pillars so the searches
/// have to detour instead of walking the heuristic line.
fn build_world(plane: i64) -> World {
    let mut world = World::default();
    for x in 0..plane {
        for z in 0..plane {
            let pos = BlockPos::new(x, 0, z);
            let name = if x % 5 == 2 && z % 5 == 2 {
                blocks::STONE
            } else {
                blocks::GRASS_BLOCK
            };
            world.put_block(pos, blocks::plain(name, pos));
        }
    }
    world
}

/// Corner-to-corner routes with staggered endpoints so no two requests share
/// a cache key. Endpoints that land on a pillar get nudged off it.
fn build_requests(plane: i64, routes: usize) -> Vec<(BlockPos, BlockPos)> {
    (0..routes as i64)
        .map(|i| {
            let start = BlockPos::new((i * 7) % plane, 0, (i * 3) % plane);
            let goal = BlockPos::new(
                plane - 1 - (i * 5) % plane,
                0,
                plane - 1 - (i * 11) % plane,
            );
            (off_pillar(start), off_pillar(goal))
        })
        .collect()
}

fn off_pillar(mut pos: BlockPos) -> BlockPos {
    if pos.x % 5 == 2 && pos.z % 5 == 2 {
        pos.x -= 1;
    }
    pos
}
