use alloc::collections::VecDeque;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Arena of piece slots plus a FIFO of the inactive ones.
///
/// Pieces are never deallocated: releasing a piece clears it and queues its slot, taking one hands out the oldest
/// released slot. When the queue runs dry a new slot is appended.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PiecePool {
    slots: Vec<Piece>,
    free: VecDeque<PieceId>,
    /// `pooled[i]` is set while slot `i` waits in `free`.
    pooled: Vec<bool>,
    grown: CellCount,
}

impl PiecePool {
    pub fn with_capacity(capacity: CellCount) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(capacity.into()),
            free: VecDeque::with_capacity(capacity.into()),
            pooled: Vec::with_capacity(capacity.into()),
            grown: 0,
        };
        for _ in 0..capacity {
            let id = pool.push_slot();
            pool.queue(id);
        }
        pool
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.slots.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.slots.get_mut(id.index())
    }

    /// Total number of slots, active or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn inactive_count(&self) -> usize {
        self.free.len()
    }

    /// Slots appended because the queue was empty when a piece was requested.
    pub fn grown(&self) -> CellCount {
        self.grown
    }

    pub fn is_pooled(&self, id: PieceId) -> bool {
        self.pooled.get(id.index()).copied().unwrap_or(false)
    }

    pub fn iter_inactive(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.free.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, piece)| (PieceId(index as u32), piece))
    }

    /// Hands out an inactive slot, growing the arena if none is left. The caller must give it an appearance and a
    /// cell before it is observable on the board.
    pub(crate) fn take(&mut self) -> PieceId {
        if let Some(id) = self.free.pop_front() {
            self.set_pooled(id, false);
            return id;
        }

        let id = self.push_slot();
        self.grown = self.grown.saturating_add(1);
        log::warn!("Piece pool exhausted, grew to {} slots", self.slots.len());
        id
    }

    /// Clears the piece and queues it for reuse. The piece must already be detached from its cell.
    pub(crate) fn release(&mut self, id: PieceId) {
        debug_assert!(id.index() < self.slots.len(), "released unknown piece {id}");
        let Some(piece) = self.slots.get_mut(id.index()) else {
            return;
        };
        debug_assert!(piece.cell().is_none(), "released piece {id} still sits on a cell");
        piece.reset();
        debug_assert!(!self.is_pooled(id), "piece {id} released twice");
        self.queue(id);
    }

    fn queue(&mut self, id: PieceId) {
        self.set_pooled(id, true);
        self.free.push_back(id);
    }

    fn set_pooled(&mut self, id: PieceId, pooled: bool) {
        if let Some(flag) = self.pooled.get_mut(id.index()) {
            *flag = pooled;
        }
    }

    fn push_slot(&mut self) -> PieceId {
        let id = PieceId(self.slots.len() as u32);
        self.slots.push(Piece::default());
        self.pooled.push(false);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reuses_released_slots_in_fifo_order() {
        let mut pool = PiecePool::with_capacity(2);

        let a = pool.take();
        let b = pool.take();
        pool.release(b);
        pool.release(a);

        assert_eq!(pool.take(), b);
        assert_eq!(pool.take(), a);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.grown(), 0);
    }

    #[test]
    fn take_grows_when_exhausted() {
        let mut pool = PiecePool::with_capacity(1);

        let first = pool.take();
        let second = pool.take();

        assert_ne!(first, second);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.grown(), 1);
        assert_eq!(pool.inactive_count(), 0);
    }

    #[test]
    fn release_clears_the_piece() {
        let mut pool = PiecePool::with_capacity(1);
        let id = pool.take();
        pool.get_mut(id)
            .unwrap()
            .set_appearance(Appearance::plain(PieceKind::Fruit));

        pool.release(id);

        let piece = pool.get(id).unwrap();
        assert_eq!(piece.appearance(), None);
        assert_eq!(piece.cell(), None);
        assert!(pool.is_pooled(id));
    }

    #[test]
    fn pooled_flag_follows_take_and_release() {
        let mut pool = PiecePool::with_capacity(2);
        let id = pool.take();

        assert!(!pool.is_pooled(id));
        assert_eq!(pool.iter_inactive().filter(|&other| pool.is_pooled(other)).count(), 1);

        pool.release(id);
        assert!(pool.is_pooled(id));
        assert!(!pool.is_pooled(PieceId(7)));

        let taken = [pool.take(), pool.take(), pool.take()];
        assert_eq!(pool.grown(), 1);
        assert!(taken.iter().all(|&id| !pool.is_pooled(id)));
    }
}
