//! The route cache: memoized pathfinding results with position-exact
//! invalidation.
//!
//! Entries remember the chunks and cells their route crosses. Invalidation
//! tests the chunk set first (cheap, usually misses) and only then the exact
//! cell set, so a busy cache survives unrelated edits untouched.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

use dashmap::DashMap;

use super::neighbors::MoveFlags;
use crate::world::position::{BlockPos, ChunkPos};

/// Cache key: one entry per (start, goal, flags) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub start: BlockPos,
    pub goal: BlockPos,
    pub flags: MoveFlags,
}

/// A memoized route plus the footprint it crosses.
#[derive(Debug, Clone)]
pub struct CachedRoute {
    /// The full route, start and goal inclusive. Shared so a cache hit is a
    /// refcount bump, not a copy.
    pub steps: Arc<[BlockPos]>,
    spans: HashSet<ChunkPos>,
    cells: HashSet<BlockPos>,
}

impl CachedRoute {
    pub fn new(steps: Vec<BlockPos>) -> Self {
        let cells: HashSet<BlockPos> = steps.iter().copied().collect();
        let spans = cells.iter().map(BlockPos::chunk).collect();
        Self {
            steps: steps.into(),
            spans,
            cells,
        }
    }

    /// Does the route pass through `pos`? Chunk pre-filter first.
    pub fn crosses(&self, pos: BlockPos) -> bool {
        self.spans.contains(&pos.chunk()) && self.cells.contains(&pos)
    }

    pub fn crosses_chunk(&self, chunk: ChunkPos) -> bool {
        self.spans.contains(&chunk)
    }
}

/// Memoized routes, sharded for concurrent planners.
///
/// Lookups and stores take `&self`, so planners working off a shared `&World`
/// may populate entries concurrently. Invalidation only ever runs on the
/// world's write path, where `&mut World` excludes every reader.
pub struct RouteCache {
    routes: DashMap<RouteKey, CachedRoute>,
    stats: CacheStats,
}

impl RouteCache {
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// The cached route for `key`, counting a hit or a miss.
    pub fn lookup(&self, key: &RouteKey) -> Option<CachedRoute> {
        match self.routes.get(key) {
            Some(entry) => {
                self.stats.hits.fetch_add(1, Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Relaxed);
                None
            }
        }
    }

    pub fn store(&self, key: RouteKey, steps: Vec<BlockPos>) {
        self.stats.stores.fetch_add(1, Relaxed);
        self.routes.insert(key, CachedRoute::new(steps));
    }

    /// Drop every cached route that passes through `pos`.
    pub fn invalidate_through(&self, pos: BlockPos) {
        let before = self.routes.len();
        self.routes.retain(|_, route| !route.crosses(pos));
        self.count_dropped(before, "cell", &pos);
    }

    /// Drop every cached route that crosses `chunk` (bulk chunk replacement).
    pub fn invalidate_chunk(&self, chunk: ChunkPos) {
        let before = self.routes.len();
        self.routes.retain(|_, route| !route.crosses_chunk(chunk));
        self.count_dropped(before, "chunk", &chunk);
    }

    /// Drop the entry for one exact key, if present.
    pub fn invalidate_exact(&self, key: &RouteKey) {
        if self.routes.remove(key).is_some() {
            self.stats.invalidations.fetch_add(1, Relaxed);
        }
    }

    pub fn clear(&self) {
        self.routes.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn count_dropped(&self, before: usize, what: &str, at: &dyn std::fmt::Debug) {
        let dropped = before.saturating_sub(self.routes.len());
        if dropped > 0 {
            self.stats.invalidations.fetch_add(dropped as u64, Relaxed);
            tracing::debug!("Dropped {} cached routes through {} {:?}", dropped, what, at);
        }
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock-free counters; dashboards read them at their own pace.
#[derive(Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheStats {
    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Relaxed),
            misses: self.misses.load(Relaxed),
            stores: self.stores.load(Relaxed),
            invalidations: self.invalidations.load(Relaxed),
        }
    }
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    /// Entries dropped by mutation, chunk replacement, or explicit
    /// invalidation.
    pub invalidations: u64,
}
