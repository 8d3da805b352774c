use thiserror::Error;

use crate::{BoardState, Coord2};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Layout is empty, ragged, too large or contains an unknown symbol")]
    InvalidLayout,
    #[error("Board is busy ({0:?}), only idle boards accept new actions")]
    Busy(BoardState),
    #[error("No animation is in flight")]
    NoAnimationPending,
    #[error("Cell {coords:?} and its piece disagree about each other")]
    BrokenLink { coords: Coord2 },
    #[error("Board did not settle within {steps} animation steps")]
    Unstable { steps: u32 },
}

pub type Result<T> = core::result::Result<T, BoardError>;
