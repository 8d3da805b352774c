#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use animation::*;
pub use engine::*;
pub use error::*;
pub use field::*;
pub use generator::*;
pub use grid::*;
pub use layout::*;
pub use matching::*;
pub use piece::*;
pub use pool::*;
pub use snapshot::*;
pub use types::*;

mod animation;
mod cascade;
mod engine;
mod error;
mod field;
mod generator;
mod grid;
mod layout;
mod matching;
mod piece;
mod pool;
mod snapshot;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    /// Visual variants per kind, indexed by [`PieceKind::index`].
    pub variants: [u8; KIND_COUNT],
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord2, variants: [u8; KIND_COUNT]) -> Self {
        Self { size, variants }
    }

    pub fn new((size_x, size_y): Coord2, variants: [u8; KIND_COUNT]) -> Self {
        let size_x = size_x.clamp(1, Coord::MAX);
        let size_y = size_y.clamp(1, Coord::MAX);
        let variants = variants.map(|count| count.max(1));
        Self::new_unchecked((size_x, size_y), variants)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new_unchecked((8, 8), [1; KIND_COUNT])
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SwapOutcome {
    Ignored,
    Started,
}

impl SwapOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Started => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_degenerate_values() {
        let config = BoardConfig::new((0, 4), [0, 2, 0]);

        assert_eq!(config.size, (1, 4));
        assert_eq!(config.variants, [1, 2, 1]);
        assert_eq!(config.total_cells(), 4);
    }

    #[test]
    fn only_started_swaps_need_presentation() {
        assert!(SwapOutcome::Started.has_update());
        assert!(!SwapOutcome::Ignored.has_update());
    }

    #[test]
    fn config_deserializes_from_json() {
        let config: BoardConfig = serde_json::from_str(r#"{"size":[5,6],"variants":[1,3,2]}"#).unwrap();

        assert_eq!(config, BoardConfig::new((5, 6), [1, 3, 2]));
    }
}
