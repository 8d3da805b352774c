use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    Idle,
    Swapping,
    Checking,
    Destroying,
    Falling,
    Refilling,
}

impl BoardState {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::Idle
    }
}

/// What the board does once the in-flight animation reports completion.
#[derive(Clone, Debug, PartialEq)]
enum Continuation {
    Swap {
        moved: PieceId,
        other: PieceId,
        reversal: bool,
    },
    Destroy,
    Fall {
        refill_columns: Vec<Coord>,
    },
    Refill,
}

/// Match-3 board: the playfield plus the state machine sequencing swaps, destruction, falls and refills.
///
/// Every phase mutates the playfield first and then publishes an [`Animation`]; the board stays in that phase
/// until [`Board::finish_animation`] is called. Only an idle board accepts swaps and other external actions.
#[derive(Clone, Debug)]
pub struct Board<G = RandomPieceGenerator> {
    field: Playfield,
    generator: G,
    state: BoardState,
    previous_state: BoardState,
    animation: Option<Animation>,
    continuation: Option<Continuation>,
    chain_length: u32,
}

impl Board<RandomPieceGenerator> {
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        Self::with_generator(config, RandomPieceGenerator::new(seed))
    }
}

impl<G: PieceGenerator> Board<G> {
    /// Fills a fresh board, running the spawn guard for every piece.
    pub fn with_generator(config: BoardConfig, mut generator: G) -> Self {
        let field = Playfield::populated(&config, &mut generator);
        Self::from_field(field, generator)
    }

    /// Board with a fixed arrangement; the generator only feeds refills.
    pub fn from_layout(layout: &Layout, variants: [u8; KIND_COUNT], generator: G) -> Result<Self> {
        Ok(Self::from_field(Playfield::from_layout(layout, variants)?, generator))
    }

    fn from_field(field: Playfield, generator: G) -> Self {
        field.debug_check_links();
        Self {
            field,
            generator,
            state: BoardState::Idle,
            previous_state: BoardState::Idle,
            animation: None,
            continuation: None,
            chain_length: 0,
        }
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn previous_state(&self) -> BoardState {
        self.previous_state
    }

    /// Whether a swap or its resolution is still in flight; input should not start another one.
    pub fn is_busy(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn field(&self) -> &Playfield {
        &self.field
    }

    pub fn size(&self) -> Coord2 {
        self.field.size()
    }

    pub fn pending_animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    /// Board-wide rescans that found matches during the current or last resolution.
    pub fn chain_length(&self) -> u32 {
        self.chain_length
    }

    pub fn piece_at(&self, coords: Coord2) -> Option<PieceId> {
        self.field.piece_at(coords)
    }

    pub fn neighbor_of(&self, id: PieceId, direction: Direction) -> Option<PieceId> {
        self.field.neighbor(id, direction)
    }

    /// Swaps two pieces and starts resolving the move.
    ///
    /// Pieces that are not on the board, or a piece swapped with itself, are ignored. If the moved piece does not
    /// end up in a line of [`MIN_MATCH`] the pieces are swapped back once the first animation completes.
    pub fn request_swap(&mut self, moved: PieceId, other: PieceId) -> Result<SwapOutcome> {
        self.check_idle()?;

        if moved == other || !self.start_swap(moved, other, false) {
            log::debug!("Ignoring swap of {moved} and {other}");
            return Ok(SwapOutcome::Ignored);
        }

        self.chain_length = 0;
        Ok(SwapOutcome::Started)
    }

    /// Removes the given pieces and stabilizes the board afterwards. Duplicates and pieces not on the board are
    /// skipped; with nothing left to remove the board goes straight to stabilizing.
    pub fn destroy(&mut self, pieces: &[PieceId]) -> Result<BoardState> {
        self.check_idle()?;
        self.chain_length = 0;
        self.commit_destroy(pieces);
        self.field.debug_check_links();
        Ok(self.state)
    }

    /// Compacts, refills and clears matches until the board is stable again.
    pub fn stabilize(&mut self) -> Result<BoardState> {
        self.check_idle()?;
        self.chain_length = 0;
        self.settle();
        self.field.debug_check_links();
        Ok(self.state)
    }

    /// Tells the board the pending animation is done, advancing to the next phase.
    pub fn finish_animation(&mut self) -> Result<BoardState> {
        let continuation = self
            .continuation
            .take()
            .ok_or(BoardError::NoAnimationPending)?;
        self.animation = None;

        match continuation {
            Continuation::Swap {
                moved,
                other,
                reversal: false,
            } => self.check_swap(moved, other),
            Continuation::Swap { reversal: true, .. } => self.transition(BoardState::Idle),
            Continuation::Destroy => self.settle(),
            Continuation::Fall { refill_columns } => self.refill(refill_columns),
            Continuation::Refill => self.rescan(),
        }

        self.field.debug_check_links();
        Ok(self.state)
    }

    /// Completes animations until the board is idle, returning how many it completed.
    pub fn run_until_idle(&mut self, max_steps: u32) -> Result<u32> {
        let mut steps = 0;
        while self.continuation.is_some() {
            if steps >= max_steps {
                return Err(BoardError::Unstable { steps });
            }
            self.finish_animation()?;
            steps += 1;
        }
        Ok(steps)
    }

    fn check_idle(&self) -> Result<()> {
        if self.state.is_idle() {
            Ok(())
        } else {
            log::debug!("Rejecting action while {:?}", self.state);
            Err(BoardError::Busy(self.state))
        }
    }

    fn transition(&mut self, next: BoardState) {
        log::debug!("Board {:?} -> {:?}", self.state, next);
        self.previous_state = self.state;
        self.state = next;
    }

    fn request(&mut self, animation: Animation, continuation: Continuation) {
        debug_assert!(self.continuation.is_none(), "animation requested while another is in flight");
        self.animation = Some(animation);
        self.continuation = Some(continuation);
    }

    fn start_swap(&mut self, moved: PieceId, other: PieceId, reversal: bool) -> bool {
        let (Some(moved_from), Some(other_from)) = (self.field.cell_of(moved), self.field.cell_of(other)) else {
            return false;
        };
        if !self.field.swap_pieces(moved, other) {
            return false;
        }

        self.transition(BoardState::Swapping);
        self.request(
            Animation::Swap {
                first: PieceMove {
                    piece: moved,
                    from: moved_from,
                    to: other_from,
                },
                second: PieceMove {
                    piece: other,
                    from: other_from,
                    to: moved_from,
                },
                reversal,
            },
            Continuation::Swap {
                moved,
                other,
                reversal,
            },
        );
        true
    }

    fn check_swap(&mut self, moved: PieceId, other: PieceId) {
        self.transition(BoardState::Checking);

        let horizontal = self.field.line(moved, Axis::Horizontal);
        if horizontal.len() >= MIN_MATCH {
            log::debug!("Horizontal match of {} through {moved}", horizontal.len());
            return self.commit_destroy(&horizontal);
        }

        let vertical = self.field.line(moved, Axis::Vertical);
        if vertical.len() >= MIN_MATCH {
            log::debug!("Vertical match of {} through {moved}", vertical.len());
            return self.commit_destroy(&vertical);
        }

        log::debug!("No match through {moved}, swapping back");
        if !self.start_swap(other, moved, true) {
            self.transition(BoardState::Idle);
        }
    }

    fn commit_destroy(&mut self, pieces: &[PieceId]) {
        let live: BTreeSet<PieceId> = pieces
            .iter()
            .copied()
            .filter(|&id| self.field.cell_of(id).is_some())
            .collect();
        if live.is_empty() {
            return self.settle();
        }

        self.transition(BoardState::Destroying);
        let removals = live
            .into_iter()
            .filter_map(|piece| {
                self.field
                    .remove(piece)
                    .map(|coords| Removal { piece, coords })
            })
            .collect();
        self.request(Animation::Destroy { removals }, Continuation::Destroy);
    }

    fn settle(&mut self) {
        let Compaction {
            moves,
            refill_columns,
        } = self.field.compact_board();

        if moves.is_empty() {
            return self.refill(refill_columns);
        }

        self.transition(BoardState::Falling);
        self.request(Animation::Fall { moves }, Continuation::Fall { refill_columns });
    }

    fn refill(&mut self, columns: Vec<Coord>) {
        let mut spawns = Vec::new();
        for x in columns {
            spawns.extend(self.field.refill_column(x, &mut self.generator));
        }
        if spawns.is_empty() {
            return self.rescan();
        }

        self.transition(BoardState::Refilling);
        self.request(Animation::Refill { spawns }, Continuation::Refill);
    }

    fn rescan(&mut self) {
        let matched = self.field.scan_board();
        if matched.is_empty() {
            log::debug!("Board settled after {} chain steps", self.chain_length);
            return self.transition(BoardState::Idle);
        }

        self.chain_length += 1;
        log::debug!("Chain step {} clears {} pieces", self.chain_length, matched.len());
        self.commit_destroy(&matched);
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand::rngs::SmallRng;

    use super::*;

    const MAX_STEPS: u32 = 10_000;

    fn board(text: &str, refills: &[PieceKind]) -> Board<ScriptedGenerator> {
        Board::from_layout(
            &parse_layout(text).unwrap(),
            [1; KIND_COUNT],
            ScriptedGenerator::from_kinds(refills.iter().copied()),
        )
        .unwrap()
    }

    fn kind_at<G: PieceGenerator>(board: &Board<G>, coords: Coord2) -> Option<PieceKind> {
        board.field().appearance_at(coords).map(|appearance| appearance.kind)
    }

    fn assert_settled<G: PieceGenerator>(board: &Board<G>) {
        assert_eq!(board.state(), BoardState::Idle);
        assert_eq!(board.pending_animation(), None);
        assert!(board.field().is_full());
        assert_eq!(board.field().check_links(), Ok(()));
        assert!(board.field().scan_board().is_empty());
    }

    #[test]
    fn new_board_is_idle_full_and_linked() {
        let board = Board::new(BoardConfig::new((7, 9), [2, 2, 2]), 42);

        assert_eq!(board.state(), BoardState::Idle);
        assert!(!board.is_busy());
        assert!(board.field().is_full());
        assert_eq!(board.field().check_links(), Ok(()));
        assert_eq!(board.size(), (7, 9));
    }

    #[test]
    fn swap_without_match_returns_pieces() {
        let mut board = board("FVR/VRF/RFV", &[]);
        let moved = board.piece_at((0, 0)).unwrap();
        let other = board.piece_at((1, 0)).unwrap();

        assert_eq!(board.request_swap(moved, other), Ok(SwapOutcome::Started));
        assert_eq!(board.state(), BoardState::Swapping);
        assert_eq!(board.field().cell_of(moved), Some((1, 0)));
        assert!(matches!(
            board.pending_animation(),
            Some(Animation::Swap { reversal: false, .. })
        ));

        assert_eq!(board.finish_animation(), Ok(BoardState::Swapping));
        assert_eq!(board.previous_state(), BoardState::Checking);
        assert!(matches!(
            board.pending_animation(),
            Some(Animation::Swap { reversal: true, .. })
        ));

        assert_eq!(board.finish_animation(), Ok(BoardState::Idle));
        assert_eq!(board.field().cell_of(moved), Some((0, 0)));
        assert_eq!(board.field().cell_of(other), Some((1, 0)));
        assert_eq!(board.field().check_links(), Ok(()));
    }

    #[test]
    fn busy_board_rejects_new_actions() {
        let mut board = board("FVR/VRF/RFV", &[]);
        let a = board.piece_at((0, 0)).unwrap();
        let b = board.piece_at((1, 0)).unwrap();
        let c = board.piece_at((2, 2)).unwrap();
        board.request_swap(a, b).unwrap();

        assert!(board.is_busy());
        assert_eq!(board.request_swap(c, a), Err(BoardError::Busy(BoardState::Swapping)));
        assert_eq!(board.stabilize(), Err(BoardError::Busy(BoardState::Swapping)));
        assert_eq!(board.destroy(&[c]), Err(BoardError::Busy(BoardState::Swapping)));

        assert_eq!(board.run_until_idle(MAX_STEPS), Ok(2));
        assert_eq!(board.field().cell_of(c), Some((2, 2)));
    }

    #[test]
    fn finishing_without_animation_is_an_error() {
        let mut board = board("FV", &[]);

        assert_eq!(board.finish_animation(), Err(BoardError::NoAnimationPending));
        assert_eq!(board.run_until_idle(MAX_STEPS), Ok(0));
    }

    #[test]
    fn invalid_swaps_are_ignored() {
        let mut board = board("FV/..", &[]);
        let a = board.piece_at((0, 1)).unwrap();
        let b = board.piece_at((1, 1)).unwrap();
        let pooled = board.field().pool().iter_inactive().next().unwrap();

        assert_eq!(board.request_swap(a, a), Ok(SwapOutcome::Ignored));
        assert_eq!(board.request_swap(a, pooled), Ok(SwapOutcome::Ignored));
        assert_eq!(board.state(), BoardState::Idle);
        assert_eq!(board.field().cell_of(a), Some((0, 1)));
        assert_eq!(board.field().cell_of(b), Some((1, 1)));
    }

    #[test]
    fn matching_swap_clears_the_line_into_the_pool() {
        use PieceKind::*;
        let mut board = board("FV/FR/VF", &[Fruit, Vegetable, Fruit]);
        let moved = board.piece_at((1, 0)).unwrap();
        let other = board.piece_at((0, 0)).unwrap();
        let line = [moved, board.piece_at((0, 1)).unwrap(), board.piece_at((0, 2)).unwrap()];

        board.request_swap(moved, other).unwrap();
        assert_eq!(board.finish_animation(), Ok(BoardState::Destroying));

        for y in 0..3 {
            assert_eq!(board.field().cell((0, y)), Some(Cell::Empty));
        }
        for id in line {
            assert!(board.field().pool().is_pooled(id));
            assert_eq!(board.field().piece(id).map(Piece::is_active), Some(false));
        }
        let Some(Animation::Destroy { removals }) = board.pending_animation() else {
            panic!("expected a destroy animation");
        };
        assert_eq!(removals.len(), 3);

        assert_eq!(board.finish_animation(), Ok(BoardState::Refilling));
        assert_eq!(board.finish_animation(), Ok(BoardState::Idle));
        assert_eq!(kind_at(&board, (0, 2)), Some(Fruit));
        assert_eq!(kind_at(&board, (0, 1)), Some(Vegetable));
        assert_eq!(kind_at(&board, (0, 0)), Some(Fruit));
        assert_eq!(board.field().pool().grown(), 0);
        assert_eq!(board.chain_length(), 0);
        assert_settled(&board);
    }

    #[test]
    fn only_the_moved_piece_is_checked() {
        // `other` lands in a vertical triple, but only lines through `moved` count.
        let mut board = board("RFV/RVF/FRV", &[]);
        let moved = board.piece_at((0, 0)).unwrap();
        let other = board.piece_at((1, 0)).unwrap();

        board.request_swap(moved, other).unwrap();

        assert_eq!(board.finish_animation(), Ok(BoardState::Swapping));
        assert_eq!(board.finish_animation(), Ok(BoardState::Idle));
        assert_eq!(board.field().cell_of(moved), Some((0, 0)));
    }

    #[test]
    fn falling_pieces_chain_into_new_matches() {
        let mut board = Board::from_layout(
            &parse_layout("VFV/FRF/R.R").unwrap(),
            [1; KIND_COUNT],
            RandomPieceGenerator::new(5),
        )
        .unwrap();

        assert_eq!(board.stabilize(), Ok(BoardState::Falling));
        let Some(Animation::Fall { moves }) = board.pending_animation() else {
            panic!("expected a fall animation");
        };
        assert_eq!(moves.len(), 2);

        board.run_until_idle(MAX_STEPS).unwrap();

        assert!(board.chain_length() >= 1);
        assert_settled(&board);
    }

    #[test]
    fn empty_destroy_still_stabilizes() {
        let mut board = board("FV./RFV", &[PieceKind::Fruit]);

        assert_eq!(board.destroy(&[]), Ok(BoardState::Refilling));
        assert_eq!(board.finish_animation(), Ok(BoardState::Idle));
        assert_eq!(kind_at(&board, (2, 1)), Some(PieceKind::Fruit));
        assert_settled(&board);
    }

    #[test]
    fn destroy_skips_duplicates_and_pooled_pieces() {
        use PieceKind::*;
        let mut board = board("FV./RFV/VRF", &[Fruit, Vegetable]);
        let target = board.piece_at((0, 2)).unwrap();
        let pooled = board.field().pool().iter_inactive().next().unwrap();

        assert_eq!(board.destroy(&[target, target, pooled]), Ok(BoardState::Destroying));
        let Some(Animation::Destroy { removals }) = board.pending_animation() else {
            panic!("expected a destroy animation");
        };
        assert_eq!(removals, &[Removal { piece: target, coords: (0, 2) }]);

        board.run_until_idle(MAX_STEPS).unwrap();
        assert_settled(&board);
    }

    #[test]
    fn stabilize_on_stable_board_is_immediate() {
        let mut board = board("FVR/VRF/RFV", &[]);

        assert_eq!(board.stabilize(), Ok(BoardState::Idle));
        assert_eq!(board.pending_animation(), None);
    }

    #[test]
    fn run_until_idle_reports_unbounded_resolution() {
        let mut board = board("FVR/VRF/RFV", &[]);
        let a = board.piece_at((0, 0)).unwrap();
        let b = board.piece_at((1, 0)).unwrap();
        board.request_swap(a, b).unwrap();

        assert_eq!(board.run_until_idle(1), Err(BoardError::Unstable { steps: 1 }));
        assert_eq!(board.state(), BoardState::Swapping);
    }

    #[test]
    fn random_play_always_settles() {
        for seed in 0..16 {
            let mut board = Board::new(BoardConfig::new((8, 8), [1, 2, 1]), seed);
            let mut rng = SmallRng::seed_from_u64(seed);

            board.stabilize().unwrap();
            board.run_until_idle(MAX_STEPS).unwrap();
            assert_settled(&board);

            for _ in 0..40 {
                let (width, height) = board.size();
                let coords = (rng.random_range(0..width), rng.random_range(0..height));
                let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
                let moved = board.piece_at(coords).unwrap();
                let Some(other) = board.neighbor_of(moved, direction) else {
                    continue;
                };

                assert_eq!(board.request_swap(moved, other), Ok(SwapOutcome::Started));
                board.run_until_idle(MAX_STEPS).unwrap();
                assert_settled(&board);
            }
        }
    }
}
