use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceMove {
    pub piece: PieceId,
    pub from: Coord2,
    pub to: Coord2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub piece: PieceId,
    pub coords: Coord2,
}

/// A refilled piece entering its column from above the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub piece: PieceId,
    pub to: Coord2,
    /// Row the piece starts falling from, at or above the board height.
    pub drop_from_row: u16,
}

/// Result of compacting the whole board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compaction {
    pub moves: Vec<PieceMove>,
    /// Columns whose top cell is still empty.
    pub refill_columns: Vec<Coord>,
}

/// Visual work the presentation layer has to carry out before calling [`Board::finish_animation`].
///
/// The logical board already reflects the end state of the animation when it is requested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    Swap {
        first: PieceMove,
        second: PieceMove,
        reversal: bool,
    },
    Destroy {
        removals: Vec<Removal>,
    },
    Fall {
        moves: Vec<PieceMove>,
    },
    Refill {
        spawns: Vec<Spawn>,
    },
}

