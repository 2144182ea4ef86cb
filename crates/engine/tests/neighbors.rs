//! Integration tests for neighbor enumeration: candidate counts per flag
//! set, canonical ordering, walkability filtering, and the parity flip.

use burrow_engine::nav::neighbors::{MoveFlags, neighbors};
use burrow_engine::world::World;
use burrow_engine::world::block::Block;
use burrow_engine::world::position::BlockPos;

// ---------------------------------------------------------------- helpers

fn flags(allow_diagonals: bool, allow_vertical: bool) -> MoveFlags {
    MoveFlags {
        allow_diagonals,
        allow_vertical,
        filter_walkable: true,
    }
}

fn positions(world: &World, source: BlockPos, f: MoveFlags) -> Vec<BlockPos> {
    neighbors(world, source, f).iter().map(|b| b.pos).collect()
}

// ---------------------------------------------------------------- counts

#[test]
fn candidate_counts_per_flag_combination() {
    let world = World::new();
    let source = BlockPos::new(1, 0, 0); // odd parity, canonical order

    assert_eq!(neighbors(&world, source, flags(false, false)).len(), 4);
    assert_eq!(neighbors(&world, source, flags(false, true)).len(), 6);
    assert_eq!(neighbors(&world, source, flags(true, false)).len(), 8);
    assert_eq!(neighbors(&world, source, flags(true, true)).len(), 26);
}

#[test]
fn full_set_covers_every_adjacent_cell_once() {
    let world = World::new();
    let source = BlockPos::new(1, 0, 0);
    let got = positions(&world, source, MoveFlags::default());

    let mut expected = Vec::new();
    for dx in -1..=1i64 {
        for dy in -1..=1i64 {
            for dz in -1..=1i64 {
                if (dx, dy, dz) != (0, 0, 0) {
                    expected.push(source.offset(dx, dy, dz));
                }
            }
        }
    }
    assert_eq!(got.len(), 26);
    for pos in expected {
        assert!(got.contains(&pos), "missing {:?}", pos);
    }
}

// ---------------------------------------------------------------- ordering

#[test]
fn cardinal_candidates_come_in_canonical_order() {
    let world = World::new();
    let source = BlockPos::new(1, 0, 0);
    let got = positions(&world, source, flags(false, false));
    // West, east, north, south.
    assert_eq!(
        got,
        vec![
            BlockPos::new(0, 0, 0),
            BlockPos::new(2, 0, 0),
            BlockPos::new(1, 0, 1),
            BlockPos::new(1, 0, -1),
        ]
    );
}

#[test]
fn vertical_candidates_follow_the_axis_moves() {
    let world = World::new();
    let source = BlockPos::new(1, 0, 0);
    let got = positions(&world, source, flags(false, true));
    assert_eq!(got[4], BlockPos::new(1, 1, 0));
    assert_eq!(got[5], BlockPos::new(1, -1, 0));
}

#[test]
fn even_parity_reverses_the_order() {
    let world = World::new();
    let even = BlockPos::new(0, 0, 0);
    let odd = BlockPos::new(1, 0, 0);

    let offsets = |source: BlockPos| -> Vec<(i64, i64, i64)> {
        neighbors(&world, source, MoveFlags::default())
            .iter()
            .map(|b| (b.pos.x - source.x, b.pos.y - source.y, b.pos.z - source.z))
            .collect()
    };

    let mut from_even = offsets(even);
    let from_odd = offsets(odd);
    from_even.reverse();
    assert_eq!(from_even, from_odd);
}

#[test]
fn negative_sums_follow_the_same_parity_rule() {
    let world = World::new();
    // -1 + 0 + 0 is odd: canonical order, west candidate first.
    let source = BlockPos::new(-1, 0, 0);
    let got = positions(&world, source, flags(false, false));
    assert_eq!(got[0], BlockPos::new(-2, 0, 0));

    // -2 + 0 + 0 is even: reversed, south candidate first.
    let source = BlockPos::new(-2, 0, 0);
    let got = positions(&world, source, flags(false, false));
    assert_eq!(got[0], BlockPos::new(-2, 0, -1));
}

#[test]
fn coordinate_limits_wrap_instead_of_overflowing() {
    let world = World::new();

    // Three times i64::MAX is odd: canonical order, west first, and the
    // east candidate wraps around.
    let top = BlockPos::new(i64::MAX, i64::MAX, i64::MAX);
    let got = positions(&world, top, flags(false, false));
    assert_eq!(got[0], BlockPos::new(i64::MAX - 1, i64::MAX, i64::MAX));
    assert_eq!(got[1], BlockPos::new(i64::MIN, i64::MAX, i64::MAX));

    // Three times i64::MIN is even: reversed, the wrapped west candidate
    // comes last.
    let bottom = BlockPos::new(i64::MIN, i64::MIN, i64::MIN);
    let got = positions(&world, bottom, flags(false, false));
    assert_eq!(got.len(), 4);
    assert_eq!(got[3], BlockPos::new(i64::MAX, i64::MIN, i64::MIN));
}

// ---------------------------------------------------------------- filtering

#[test]
fn non_walkable_candidates_are_dropped_not_replaced() {
    let mut world = World::new();
    let source = BlockPos::new(1, 0, 0);
    let west = BlockPos::new(0, 0, 0);
    world.put_block(west, Block::solid("minecraft:stone", west));

    let got = positions(&world, source, flags(false, false));
    // The wall is gone from the sequence and everything after it shifts up.
    assert_eq!(
        got,
        vec![
            BlockPos::new(2, 0, 0),
            BlockPos::new(1, 0, 1),
            BlockPos::new(1, 0, -1),
        ]
    );

    let unfiltered = MoveFlags {
        filter_walkable: false,
        ..flags(false, false)
    };
    assert_eq!(neighbors(&world, source, unfiltered).len(), 4);
}

#[test]
fn filtering_never_increases_the_count() {
    let mut world = World::new();
    let source = BlockPos::new(2, 5, 2);
    for dx in -1..=1i64 {
        for dz in -1..=1i64 {
            if (dx + dz) % 2 == 0 {
                let p = source.offset(dx, 1, dz);
                world.put_block(p, Block::solid("minecraft:stone", p));
            }
        }
    }

    for (d, v) in [(false, false), (false, true), (true, false), (true, true)] {
        let filtered = neighbors(&world, source, flags(d, v)).len();
        let raw = neighbors(
            &world,
            source,
            MoveFlags {
                filter_walkable: false,
                ..flags(d, v)
            },
        )
        .len();
        assert!(filtered <= raw);
    }
}

#[test]
fn absent_cells_come_back_as_synthesized_air() {
    let world = World::new();
    let all = neighbors(&world, BlockPos::new(7, 3, -2), MoveFlags::default());
    assert_eq!(all.len(), 26);
    assert!(all.iter().all(|b| b.is_air() && b.walkable));
    // Enumeration is a read; nothing was allocated for it.
    assert_eq!(world.chunk_count(), 0);
}
