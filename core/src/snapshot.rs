use core::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read model of a board for presentation: what sits where, and which phase the board is in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: Coord2,
    pub state: BoardState,
    pub cells: Array2<Option<Appearance>>,
}

impl BoardSnapshot {
    pub fn from_field(field: &Playfield, state: BoardState) -> Self {
        let size = field.size();
        let mut cells = Array2::from_elem(size.to_nd_index(), None);
        for (coords, id) in field.iter_pieces() {
            cells[coords.to_nd_index()] = field.appearance_of(id);
        }

        Self { size, state, cells }
    }

    pub fn from_board<G: PieceGenerator>(board: &Board<G>) -> Self {
        Self::from_field(board.field(), board.state())
    }

    pub fn appearance_at(&self, coords: Coord2) -> Option<Appearance> {
        self.cells.get(coords.to_nd_index()).copied().flatten()
    }
}

impl<G: PieceGenerator> Board<G> {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_board(self)
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size;
        for y in (0..height).rev() {
            for x in 0..width {
                let symbol = self
                    .appearance_at((x, y))
                    .map_or('.', |appearance| appearance.kind.symbol());
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
