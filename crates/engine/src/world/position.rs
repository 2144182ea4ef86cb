//! Position types: absolute block coordinates, chunk coordinates, and
//! block-in-chunk coordinates.
//!
//! This is the spatial substrate -- the fixed 3D integer lattice everything
//! else indexes into. Chunks tile the x/z plane in 16x16 columns; y is
//! unbounded in both directions.

/// An absolute block position in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BlockPos {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// The chunk this block belongs to. Arithmetic shift keeps negative
    /// coordinates on the correct side of the origin.
    pub const fn chunk(&self) -> ChunkPos {
        ChunkPos {
            x: (self.x >> 4) as i32,
            z: (self.z >> 4) as i32,
        }
    }

    /// Position within the owning chunk (x and z in `0..16`, y unchanged).
    pub const fn local(&self) -> LocalBlockPos {
        LocalBlockPos {
            x: (self.x & 0xF) as u8,
            y: self.y,
            z: (self.z & 0xF) as u8,
        }
    }

    /// This position shifted by the given deltas. Coordinates wrap at the
    /// i64 limits instead of overflowing.
    pub const fn offset(&self, dx: i64, dy: i64, dz: i64) -> BlockPos {
        BlockPos::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// Chebyshev distance: steps needed when diagonal moves cost one.
    pub fn chebyshev(&self, other: BlockPos) -> u64 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }

    /// Manhattan distance: steps needed when only axis moves are allowed.
    pub fn manhattan(&self, other: BlockPos) -> u64 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

/// A chunk coordinate (world x/z divided by 16, rounding toward negative
/// infinity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// A position inside one chunk. `x` and `z` are masked into `0..16`; `y`
/// stays absolute because chunks span the full vertical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalBlockPos {
    pub x: u8,
    pub y: i64,
    pub z: u8,
}
