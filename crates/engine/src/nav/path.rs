//! Route planning: A* over the block grid, memoized through the route cache.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use rayon::prelude::*;

use super::neighbors::{MoveFlags, neighbors};
use super::route::RouteKey;
use crate::world::World;
use crate::world::position::BlockPos;

/// Caps on a single search. Running out is an expected outcome, not a
/// failure: open terrain makes "no route" otherwise undecidable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum nodes popped from the open set before giving up.
    pub max_nodes: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self { max_nodes: 65_536 }
    }
}

/// Why a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// The goal was reached and the route is complete.
    Found,
    /// Every reachable cell was expanded without touching the goal.
    Unreachable,
    /// The node budget ran out first.
    Exhausted,
}

/// Result of a route query. The route includes both endpoints and is empty
/// unless the outcome is [`PathOutcome::Found`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    pub outcome: PathOutcome,
    pub route: Vec<BlockPos>,
}

impl PathResult {
    pub fn found(&self) -> bool {
        self.outcome == PathOutcome::Found
    }

    fn not_found(outcome: PathOutcome) -> Self {
        Self {
            outcome,
            route: Vec::new(),
        }
    }
}

/// Compute a route from `start` to `goal` under `flags`.
///
/// Cached results return without searching; fresh results are cached before
/// returning. The search is A* with unit step costs and a heuristic matched
/// to the movement flags, so routes are step-count optimal for the active
/// move set. Equal-cost ties pop in insertion order, which makes every route
/// a pure function of the neighbor enumeration order.
///
/// Chunk boundaries are invisible: reads answer for any position without
/// allocating chunks, so planning never grows the world.
pub fn find_path(
    world: &World,
    start: BlockPos,
    goal: BlockPos,
    flags: MoveFlags,
    limits: SearchLimits,
) -> PathResult {
    let key = RouteKey { start, goal, flags };
    if let Some(cached) = world.route_cache().lookup(&key) {
        return PathResult {
            outcome: PathOutcome::Found,
            route: cached.steps.to_vec(),
        };
    }

    if start == goal {
        let route = vec![start];
        world.route_cache().store(key, route.clone());
        return PathResult {
            outcome: PathOutcome::Found,
            route,
        };
    }

    // A goal nobody may stand in has no route; skip the search. The start is
    // exempt because the searcher itself usually occupies it.
    if flags.filter_walkable && !world.get_block(goal).walkable {
        return PathResult::not_found(PathOutcome::Unreachable);
    }

    // Min-heap on (f, insertion sequence): equal-f ties pop oldest first, so
    // expansion order tracks the enumerator's candidate order exactly.
    let mut open: BinaryHeap<(Reverse<u64>, Reverse<u64>, BlockPos)> = BinaryHeap::new();
    let mut g_scores: HashMap<BlockPos, u64> = HashMap::new();
    let mut came_from: HashMap<BlockPos, BlockPos> = HashMap::new();
    let mut seq = 0u64;

    g_scores.insert(start, 0);
    open.push((Reverse(estimate(start, goal, flags)), Reverse(seq), start));

    let mut popped = 0usize;
    while let Some((_, _, current)) = open.pop() {
        popped += 1;
        if popped > limits.max_nodes {
            tracing::debug!(
                "Search {:?} -> {:?} gave up after {} nodes",
                start,
                goal,
                limits.max_nodes
            );
            return PathResult::not_found(PathOutcome::Exhausted);
        }

        if current == goal {
            let route = reconstruct(start, goal, &came_from);
            world.route_cache().store(key, route.clone());
            return PathResult {
                outcome: PathOutcome::Found,
                route,
            };
        }

        let current_g = g_scores.get(&current).copied().unwrap_or(u64::MAX);

        for neighbor in neighbors(world, current, flags) {
            let next = neighbor.pos;
            let tentative = current_g + 1;
            if g_scores.get(&next).is_some_and(|&g| g <= tentative) {
                continue;
            }
            g_scores.insert(next, tentative);
            came_from.insert(next, current);
            seq += 1;
            open.push((
                Reverse(tentative + estimate(next, goal, flags)),
                Reverse(seq),
                next,
            ));
        }
    }

    tracing::debug!("Search {:?} -> {:?} exhausted all reachable cells", start, goal);
    PathResult::not_found(PathOutcome::Unreachable)
}

/// Plan many routes at once across worker threads.
///
/// Planning never mutates the world and the cache is sharded, so requests
/// are independent; results come back in request order.
pub fn find_paths(
    world: &World,
    requests: &[(BlockPos, BlockPos)],
    flags: MoveFlags,
    limits: SearchLimits,
) -> Vec<PathResult> {
    requests
        .par_iter()
        .map(|&(start, goal)| find_path(world, start, goal, flags, limits))
        .collect()
}

/// Replan after step `blocked_index` of `path` turned out to be obstructed.
///
/// Drops the cached entry for the original route, then searches again from
/// `current` (or, when the caller does not know where it stands, from the
/// step before the obstruction) to the original goal under the same flags.
/// Nothing is assumed about what now occupies the blocked cell; the fresh
/// search re-reads the world.
pub fn on_path_blocked(
    world: &World,
    path: &[BlockPos],
    blocked_index: usize,
    current: Option<BlockPos>,
    flags: MoveFlags,
    limits: SearchLimits,
) -> PathResult {
    let (Some(&start), Some(&goal)) = (path.first(), path.last()) else {
        return PathResult::not_found(PathOutcome::Unreachable);
    };
    world.route_cache().invalidate_exact(&RouteKey { start, goal, flags });

    let resume = match current {
        Some(pos) => pos,
        None => path[blocked_index.saturating_sub(1).min(path.len() - 1)],
    };
    tracing::debug!(
        "Route {:?} -> {:?} blocked at index {}; replanning from {:?}",
        start,
        goal,
        blocked_index,
        resume
    );
    find_path(world, resume, goal, flags, limits)
}

/// Admissible distance estimate for the active move set: full Chebyshev when
/// 3D diagonals exist, horizontal Chebyshev plus the vertical span when
/// diagonals stay in-plane, Manhattan for axis-only movement.
fn estimate(from: BlockPos, to: BlockPos, flags: MoveFlags) -> u64 {
    match (flags.allow_diagonals, flags.allow_vertical) {
        (true, true) => from.chebyshev(to),
        (true, false) => from.x.abs_diff(to.x).max(from.z.abs_diff(to.z)) + from.y.abs_diff(to.y),
        (false, _) => from.manhattan(to),
    }
}

fn reconstruct(start: BlockPos, goal: BlockPos, came_from: &HashMap<BlockPos, BlockPos>) -> Vec<BlockPos> {
    let mut route = vec![goal];
    let mut cursor = goal;
    while cursor != start {
        let Some(&prev) = came_from.get(&cursor) else {
            break; // every expanded node has a parent; the chain always closes
        };
        route.push(prev);
        cursor = prev;
    }
    route.reverse();
    route
}
