//! Shared ownership of the world across tasks.
//!
//! Engine mutators take `&mut World`, so the host wraps the single world in
//! a read-write lock: planning and queries run under the read lock, mutation
//! under the write lock. Route-cache invalidation happens inside the engine's
//! mutators, which puts it in the same critical section as the mutation that
//! caused it; a reader can never observe a stale cache entry.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use burrow_engine::world::World;

/// Cheaply cloneable handle to the one world instance.
///
/// `std::sync::RwLock`, not an async lock: every critical section is brief
/// and nothing awaits while holding a guard.
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<RwLock<World>>,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(RwLock::new(world)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, World> {
        self.inner.read().expect("world lock poisoned")
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, World> {
        self.inner.write().expect("world lock poisoned")
    }
}
