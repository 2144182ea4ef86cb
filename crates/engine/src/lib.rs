//! Chunked voxel world index and route planning for turtle agents.
//!
//! The world is a sparse grid of lazily allocated chunks holding rich block
//! records; anything never written reads back as air. Routes between
//! positions are computed over that grid with A* and memoized per
//! (start, goal, flags); every mutation drops exactly the cached routes it
//! touches. Agents live in a slotmap registry alongside the blocks that
//! represent them.
//!
//! The crate is synchronous and IO-free. Hosts decide how to share a
//! [`world::World`] across threads; all mutation goes through `&mut self`,
//! so one writer at a time is enforced by the borrow checker.

pub mod agent;
pub mod error;
pub mod nav;
pub mod world;
