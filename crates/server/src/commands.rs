//! Job payloads: the commands this host understands.
//!
//! The engine stores jobs as opaque JSON. Producers enqueue a serialized
//! [`TurtleCommand`]; drivers claim the job and decode it back. Payloads that
//! do not decode are reported and dropped, never guessed at.

use serde::{Deserialize, Serialize};

use burrow_engine::world::position::BlockPos;

/// A command addressed to one turtle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurtleCommand {
    /// Walk to a cell, replanning around obstructions on the way.
    GoTo { pos: [i64; 3] },
    /// Walk next to a cell and clear it.
    Dig { pos: [i64; 3] },
    /// Walk next to an empty cell and fill it with a named block.
    Place { pos: [i64; 3], block_name: String },
}

impl TurtleCommand {
    pub fn go_to(pos: BlockPos) -> Self {
        Self::GoTo { pos: [pos.x, pos.y, pos.z] }
    }

    pub fn dig(pos: BlockPos) -> Self {
        Self::Dig { pos: [pos.x, pos.y, pos.z] }
    }

    pub fn place(pos: BlockPos, block_name: impl Into<String>) -> Self {
        Self::Place {
            pos: [pos.x, pos.y, pos.z],
            block_name: block_name.into(),
        }
    }

    /// The cell this command is aimed at.
    pub fn target(&self) -> BlockPos {
        let [x, y, z] = match self {
            TurtleCommand::GoTo { pos } | TurtleCommand::Dig { pos } | TurtleCommand::Place { pos, .. } => *pos,
        };
        BlockPos::new(x, y, z)
    }

    /// Serialize into an engine job payload.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("command serialization cannot fail")
    }

    /// Decode an engine job payload, `None` if it is not one of ours.
    pub fn from_payload(payload: &serde_json::Value) -> Option<TurtleCommand> {
        serde_json::from_value(payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_round_trip_through_job_payloads() {
        let commands = [
            TurtleCommand::go_to(BlockPos::new(3, 0, -4)),
            TurtleCommand::dig(BlockPos::new(1, 2, 3)),
            TurtleCommand::place(BlockPos::new(0, 1, 0), "minecraft:stone"),
        ];
        for command in &commands {
            let payload = command.to_payload();
            assert_eq!(TurtleCommand::from_payload(&payload).as_ref(), Some(command));
        }
    }

    #[test]
    fn unknown_payloads_are_rejected() {
        assert_eq!(
            TurtleCommand::from_payload(&serde_json::json!({ "kind": "dance" })),
            None
        );
        assert_eq!(TurtleCommand::from_payload(&serde_json::json!(42)), None);
    }

    #[test]
    fn target_recovers_the_position() {
        let pos = BlockPos::new(3, 0, -4);
        assert_eq!(TurtleCommand::go_to(pos).target(), pos);
        assert_eq!(TurtleCommand::place(pos, "minecraft:dirt").target(), pos);
    }
}
