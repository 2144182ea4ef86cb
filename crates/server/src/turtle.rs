//! The turtle action protocol and the route compiler that targets it.
//!
//! [`TurtleAction`] is the closed set of operations a physical turtle client
//! executes; the discriminants are the wire values and must stay stable.
//! [`compile_route`] lowers a planned route into that vocabulary: turtles
//! cannot strafe, so every horizontal step becomes the minimal turn sequence
//! followed by a forward move.

use anyhow::bail;

use burrow_engine::world::block::Direction;
use burrow_engine::world::position::BlockPos;

/// Everything a turtle can be told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TurtleAction {
    GetTurtleInfo = 1,

    // Movement
    Forward = 5,
    Backward = 6,
    Up = 7,
    Down = 8,
    TurnLeft = 9,
    TurnRight = 10,

    // World interaction
    AttackFront = 20,
    AttackAbove = 21,
    AttackBelow = 22,
    DigFront = 23,
    DigAbove = 24,
    DigBelow = 25,
    PlaceFront = 26,
    PlaceAbove = 27,
    PlaceBelow = 28,
    DetectFront = 29,
    DetectAbove = 30,
    DetectBelow = 31,
    InspectFront = 32,
    InspectAbove = 33,
    InspectBelow = 34,
    CompareFront = 35,
    CompareAbove = 36,
    CompareBelow = 37,
    DropFront = 38,
    DropAbove = 39,
    DropBelow = 40,
    SuckFront = 41,
    SuckAbove = 42,
    SuckBelow = 43,

    // Inventory management
    CraftItems = 53,
    SelectSlot = 54,
    GetSelectedSlot = 55,
    GetItemCountInSlot = 56,
    GetItemSpaceInSlot = 57,
    GetItemDetailsInSlot = 58,
    EquipLeft = 59,
    EquipRight = 60,
    Refuel = 61,
    GetFuelLevel = 62,
    GetFuelLimit = 63,
    TransferTo = 64,

    // Extensions
    GetDirectionFromSign = 78,
    ReadInventory = 79,
    FindItemSlotsByPattern = 80,
    GetEquippedItems = 81,
    Procreate = 82,
    IsBusy = 83,
}

/// Compile `route` into executable actions, starting from `facing`.
///
/// Returns the action list and the facing the turtle ends up with. Every
/// consecutive pair of route positions must differ by one cardinal or
/// vertical step; plan with diagonals disabled.
pub fn compile_route(route: &[BlockPos], facing: Direction) -> anyhow::Result<(Vec<TurtleAction>, Direction)> {
    let mut actions = Vec::new();
    let mut facing = facing;

    for (i, pair) in route.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let (dx, dy, dz) = (to.x - from.x, to.y - from.y, to.z - from.z);

        match (dx, dy, dz) {
            (0, 0, 0) => {}
            (0, 1, 0) => actions.push(TurtleAction::Up),
            (0, -1, 0) => actions.push(TurtleAction::Down),
            _ => match Direction::from_step(dx, dz) {
                Some(target) if dy == 0 => {
                    actions.extend(turns_between(facing, target));
                    facing = target;
                    actions.push(TurtleAction::Forward);
                }
                _ => bail!(
                    "route step {} is not a single cardinal move: ({}, {}, {})",
                    i,
                    dx,
                    dy,
                    dz
                ),
            },
        }
    }

    Ok((actions, facing))
}

/// The shortest turn sequence from `from` to `to`: nothing, one quarter
/// turn, or two rights for a half turn.
fn turns_between(from: Direction, to: Direction) -> Vec<TurtleAction> {
    if from == to {
        Vec::new()
    } else if from.left() == to {
        vec![TurtleAction::TurnLeft]
    } else if from.right() == to {
        vec![TurtleAction::TurnRight]
    } else {
        vec![TurtleAction::TurnRight, TurtleAction::TurnRight]
    }
}
