use alloc::vec::Vec;

use crate::*;

impl Playfield {
    /// Drops the pieces of column `x` onto the lowest empty cells, keeping their order.
    ///
    /// Scans bottom to top; the first empty cell pulls down the nearest piece above it, skipping empty cells, and
    /// the scan restarts from the bottom until a pass moves nothing. A locked cell is never passed through. A column
    /// outside the board yields no moves.
    pub fn compact_column(&mut self, x: Coord) -> Vec<PieceMove> {
        let height = self.grid().height();
        let mut moves = Vec::new();
        if x >= self.grid().width() {
            return moves;
        }

        'rescan: loop {
            for y in 0..height {
                if !self.grid()[(x, y)].is_empty() {
                    continue;
                }

                let source = (y + 1..height)
                    .map(|above| (x, above))
                    .find(|&coords| !self.grid()[coords].is_empty());
                let Some(from) = source.filter(|&coords| self.grid()[coords].piece().is_some()) else {
                    continue;
                };

                if let Some(piece) = self.move_piece(from, (x, y)) {
                    moves.push(PieceMove {
                        piece,
                        from,
                        to: (x, y),
                    });
                    continue 'rescan;
                }
            }
            break;
        }

        moves
    }

    /// Compacts every column and reports the ones left with an empty top cell.
    pub fn compact_board(&mut self) -> Compaction {
        let (width, height) = self.size();
        let mut compaction = Compaction::default();

        for x in 0..width {
            compaction.moves.extend(self.compact_column(x));
            if height > 0 && self.grid()[(x, height - 1)].is_empty() {
                compaction.refill_columns.push(x);
            }
        }

        self.debug_check_links();
        compaction
    }

    /// Fills the empty cells at the top of column `x` with fresh pieces from the pool, top cell first.
    pub fn refill_column(&mut self, x: Coord, generator: &mut impl PieceGenerator) -> Vec<Spawn> {
        if x >= self.grid().width() {
            return Vec::new();
        }
        let height = self.grid().height();
        let empty_rows: Vec<Coord> = (0..height)
            .rev()
            .take_while(|&y| self.grid()[(x, y)].is_empty())
            .collect();
        let drop = empty_rows.len() as u16;

        let spawns: Vec<Spawn> = empty_rows
            .into_iter()
            .map(|y| Spawn {
                piece: self.spawn_at((x, y), generator),
                to: (x, y),
                drop_from_row: u16::from(y) + drop,
            })
            .collect();

        self.debug_check_links();
        spawns
    }
}
