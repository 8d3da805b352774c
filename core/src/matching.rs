use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::*;

/// Shortest line of equal pieces that gets cleared.
pub const MIN_MATCH: usize = 3;

/// Re-rolls attempted by the spawn guard before it rotates the kind by hand.
const REROLL_ATTEMPTS: usize = 8;

/// Pieces collected along one axis.
pub type Run = SmallVec<[PieceId; 8]>;

impl Playfield {
    /// The piece next to `id` in `direction`, if `id` is on the board and the neighbor cell is in bounds and held.
    pub fn neighbor(&self, id: PieceId, direction: Direction) -> Option<PieceId> {
        let coords = self.cell_of(id)?;
        self.neighbor_at(coords, direction)
    }

    pub fn neighbor_at(&self, coords: Coord2, direction: Direction) -> Option<PieceId> {
        step(coords, direction, self.size()).and_then(|next| self.piece_at(next))
    }

    /// Same kind and variant. Pooled pieces never match anything.
    pub fn pieces_match(&self, a: PieceId, b: PieceId) -> bool {
        match (self.appearance_of(a), self.appearance_of(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Walks from `center` in `first`, then again from `center` in `second`, collecting pieces equal to `center`
    /// until the first mismatch or the edge. `center` itself is not part of the result.
    pub fn run(&self, center: PieceId, first: Direction, second: Direction) -> Run {
        let mut run = Run::new();
        for direction in [first, second] {
            let mut cursor = center;
            while let Some(next) = self
                .neighbor(cursor, direction)
                .filter(|&next| self.pieces_match(center, next))
            {
                run.push(next);
                cursor = next;
            }
        }
        run
    }

    /// `center` followed by its run along `axis`.
    pub fn line(&self, center: PieceId, axis: Axis) -> Run {
        let (first, second) = axis.directions();
        let mut line = Run::new();
        line.push(center);
        line.extend(self.run(center, first, second));
        line
    }

    /// Every piece that is part of a horizontal or vertical line of at least [`MIN_MATCH`], deduplicated and in id
    /// order.
    pub fn scan_board(&self) -> Vec<PieceId> {
        let mut matched = BTreeSet::new();
        for (_, id) in self.iter_pieces() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let line = self.line(id, axis);
                if line.len() >= MIN_MATCH {
                    matched.extend(line);
                }
            }
        }
        matched.into_iter().collect()
    }

    /// Breaks a freshly placed piece's would-be triple to the left and below by re-rolling the piece two steps away.
    ///
    /// Only those two directions are inspected, so a triple can still appear through the other sides or through a
    /// re-rolled piece's own neighbors.
    pub(crate) fn guard_spawn(&mut self, id: PieceId, generator: &mut impl PieceGenerator) {
        for direction in [Direction::Left, Direction::Down] {
            let Some(near) = self
                .neighbor(id, direction)
                .filter(|&near| self.pieces_match(id, near))
            else {
                continue;
            };
            let Some(far) = self
                .neighbor(near, direction)
                .filter(|&far| self.pieces_match(near, far))
            else {
                continue;
            };
            if far == id {
                continue;
            }

            log::debug!("Spawn guard re-rolls {far} to break a triple ending at {id}");
            self.reroll_distinct(far, generator);
        }
    }

    /// Gives the piece an appearance different from its current one.
    fn reroll_distinct(&mut self, id: PieceId, generator: &mut impl PieceGenerator) {
        let Some(current) = self.appearance_of(id) else {
            return;
        };

        let rolled = (0..REROLL_ATTEMPTS)
            .map(|_| generator.roll(self.variants()))
            .find(|&appearance| appearance != current);
        let appearance = rolled.unwrap_or_else(|| {
            log::warn!("Generator kept rolling {current}, rotating kind of {id} instead");
            Appearance::plain(current.kind.next())
        });
        self.set_appearance(id, appearance);
    }
}
