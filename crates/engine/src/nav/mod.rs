//! Navigation: neighbor enumeration over the block grid and memoized route
//! planning on top of it.

pub mod neighbors;
pub mod path;
pub mod route;
