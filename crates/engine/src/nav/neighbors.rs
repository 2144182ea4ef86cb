//! Neighbor enumeration: the adjacency step of route planning.
//!
//! The candidate tables below are ordered, and the order is contractual: the
//! path search breaks cost ties by insertion order, so reordering a table
//! changes which of several equally short routes gets picked.

use crate::world::block::Block;
use crate::world::position::BlockPos;
use crate::world::World;

/// Which moves the enumerator may offer.
///
/// Flags are part of the route-cache key; two searches under different flags
/// never share a cached route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveFlags {
    /// Allow diagonal moves (horizontal and, combined with `allow_vertical`,
    /// the 3D edge and corner moves).
    pub allow_diagonals: bool,
    /// Allow moves that change y.
    pub allow_vertical: bool,
    /// Drop non-walkable candidates from the sequence entirely.
    pub filter_walkable: bool,
}

impl Default for MoveFlags {
    fn default() -> Self {
        Self {
            allow_diagonals: true,
            allow_vertical: true,
            filter_walkable: true,
        }
    }
}

impl MoveFlags {
    /// Axis moves only, vertical included: what a real turtle can drive.
    pub const fn cardinal() -> Self {
        Self {
            allow_diagonals: false,
            allow_vertical: true,
            filter_walkable: true,
        }
    }
}

/// Horizontal axis moves: west, east, north, south.
const AXIS: [(i64, i64, i64); 4] = [(-1, 0, 0), (1, 0, 0), (0, 0, 1), (0, 0, -1)];

/// Straight up, straight down.
const VERTICAL: [(i64, i64, i64); 2] = [(0, 1, 0), (0, -1, 0)];

/// In-plane diagonals, west side first, forward before backward.
const DIAGONAL: [(i64, i64, i64); 4] = [(-1, 0, 1), (-1, 0, -1), (1, 0, 1), (1, 0, -1)];

/// The sixteen moves that combine a vertical step with a horizontal one:
/// the west column, then the east column, then the two remaining faces,
/// up before down throughout.
const DIAGONAL_VERTICAL: [(i64, i64, i64); 16] = [
    (-1, 1, 1),
    (-1, -1, 1),
    (-1, 1, 0),
    (-1, -1, 0),
    (-1, 1, -1),
    (-1, -1, -1),
    (1, 1, 1),
    (1, -1, 1),
    (1, 1, 0),
    (1, -1, 0),
    (1, 1, -1),
    (1, -1, -1),
    (0, 1, 1),
    (0, -1, 1),
    (0, 1, -1),
    (0, -1, -1),
];

/// Enumerate the cells adjacent to `source` in canonical order, at most 26.
///
/// Cells with nothing stored come back as synthesized air; with
/// `filter_walkable` set, non-walkable candidates are removed from the
/// sequence (not replaced), shifting everything after them.
///
/// The order flips on checkerboard parity: when `x + y + z` is even the
/// filtered sequence is reversed. Adjacent sources therefore expand in
/// opposite orders, which keeps tie-breaking in the search from sweeping
/// whole regions in one fixed direction.
pub fn neighbors(world: &World, source: BlockPos, flags: MoveFlags) -> Vec<Block> {
    let mut out = Vec::with_capacity(26);

    let mut push = |offsets: &[(i64, i64, i64)]| {
        for &(dx, dy, dz) in offsets {
            let block = world.get_block(source.offset(dx, dy, dz));
            if flags.filter_walkable && !block.walkable {
                continue;
            }
            out.push(block);
        }
    };

    push(&AXIS);
    if flags.allow_vertical {
        push(&VERTICAL);
    }
    if flags.allow_diagonals {
        push(&DIAGONAL);
    }
    if flags.allow_diagonals && flags.allow_vertical {
        push(&DIAGONAL_VERTICAL);
    }

    if source.x.wrapping_add(source.y).wrapping_add(source.z) % 2 == 0 {
        out.reverse();
    }
    out
}
