//! Host runtime around the world engine: shared world access, per-agent
//! driver tasks, the turtle command protocol, and a live web dashboard.

pub mod blocks;
pub mod commands;
pub mod dashboard;
pub mod driver;
pub mod event_bus;
pub mod turtle;
pub mod world_ref;
