use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Coord2;

/// Number of piece kinds a board deals with.
pub const KIND_COUNT: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    FastFood,
    Vegetable,
    Fruit,
}

impl PieceKind {
    pub const ALL: [PieceKind; KIND_COUNT] = [Self::FastFood, Self::Vegetable, Self::Fruit];

    pub const fn index(self) -> usize {
        match self {
            Self::FastFood => 0,
            Self::Vegetable => 1,
            Self::Fruit => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::FastFood),
            1 => Some(Self::Vegetable),
            2 => Some(Self::Fruit),
            _ => None,
        }
    }

    /// Next kind in declaration order, wrapping around.
    pub const fn next(self) -> Self {
        match self {
            Self::FastFood => Self::Vegetable,
            Self::Vegetable => Self::Fruit,
            Self::Fruit => Self::FastFood,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::FastFood => 'F',
            Self::Vegetable => 'V',
            Self::Fruit => 'R',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }
}

/// Everything that decides whether two pieces match: the kind plus the visual variant within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Appearance {
    pub kind: PieceKind,
    pub variant: u8,
}

impl Appearance {
    pub const fn new(kind: PieceKind, variant: u8) -> Self {
        Self { kind, variant }
    }

    pub const fn plain(kind: PieceKind) -> Self {
        Self::new(kind, 0)
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.symbol(), self.variant)
    }
}

/// Handle to a piece slot in the pool arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub(crate) u32);

impl PieceId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A piece slot. Pooled pieces have neither an appearance nor a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    appearance: Option<Appearance>,
    cell: Option<Coord2>,
}

impl Piece {
    pub const fn appearance(&self) -> Option<Appearance> {
        self.appearance
    }

    pub const fn cell(&self) -> Option<Coord2> {
        self.cell
    }

    pub const fn is_active(&self) -> bool {
        self.cell.is_some()
    }

    pub(crate) fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = Some(appearance);
    }

    pub(crate) fn set_cell(&mut self, cell: Option<Coord2>) {
        self.cell = cell;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_for_every_kind() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_symbol(kind.symbol()), Some(kind));
            assert_eq!(PieceKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(PieceKind::from_symbol('x'), None);
    }

    #[test]
    fn variant_is_part_of_identity() {
        let a = Appearance::new(PieceKind::Fruit, 0);
        let b = Appearance::new(PieceKind::Fruit, 1);
        assert_ne!(a, b);
        assert_eq!(a, Appearance::plain(PieceKind::Fruit));
    }
}
