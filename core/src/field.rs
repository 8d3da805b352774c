use crate::*;

/// Grid plus piece pool, with every operation keeping cell and piece pointing at each other.
///
/// A `Holding(id)` cell at `coords` always has `piece(id).cell() == Some(coords)` and vice versa, outside of the
/// bodies of the methods below. [`Playfield::check_links`] verifies it.
#[derive(Clone, Debug, PartialEq)]
pub struct Playfield {
    grid: Grid,
    pool: PiecePool,
    variants: [u8; KIND_COUNT],
}

impl Playfield {
    /// Empty board with a pool big enough to fill it once.
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            grid: Grid::new(config.size),
            pool: PiecePool::with_capacity(config.total_cells()),
            variants: config.variants,
        }
    }

    /// Fills every cell, column by column from the bottom, running the spawn guard after each piece.
    pub fn populated(config: &BoardConfig, generator: &mut impl PieceGenerator) -> Self {
        let mut field = Self::new(config);
        for coords in field.grid.iter_coords() {
            let id = field.spawn_at(coords, generator);
            field.guard_spawn(id, generator);
        }
        field
    }

    /// Places the layout's pieces as-is, without the spawn guard. Fails on a layout with a zero or oversized
    /// dimension.
    pub fn from_layout(layout: &Layout, variants: [u8; KIND_COUNT]) -> Result<Self> {
        let config = BoardConfig::new(layout_size(layout)?, variants);
        let mut field = Self::new(&config);
        for coords in field.grid.iter_coords() {
            if let Some(appearance) = layout[coords.to_nd_index()] {
                field.place(coords, appearance);
            }
        }
        Ok(field)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pool(&self) -> &PiecePool {
        &self.pool
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn variants(&self) -> &[u8; KIND_COUNT] {
        &self.variants
    }

    pub fn cell(&self, coords: Coord2) -> Option<Cell> {
        self.grid.get(coords)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pool.get(id)
    }

    pub fn piece_at(&self, coords: Coord2) -> Option<PieceId> {
        self.grid.get(coords).and_then(Cell::piece)
    }

    pub fn appearance_of(&self, id: PieceId) -> Option<Appearance> {
        self.piece(id).and_then(Piece::appearance)
    }

    /// Cell of an active piece, `None` for pooled or unknown ids.
    pub fn cell_of(&self, id: PieceId) -> Option<Coord2> {
        self.piece(id).and_then(Piece::cell)
    }

    pub fn appearance_at(&self, coords: Coord2) -> Option<Appearance> {
        self.piece_at(coords).and_then(|id| self.appearance_of(id))
    }

    /// Active pieces with their cells, column by column from the bottom.
    pub fn iter_pieces(&self) -> impl Iterator<Item = (Coord2, PieceId)> + '_ {
        self.grid
            .iter()
            .filter_map(|(coords, cell)| cell.piece().map(|id| (coords, id)))
    }

    pub fn is_full(&self) -> bool {
        self.grid.count_empty() == 0
    }

    /// Verifies that every held piece points back at its cell and every active piece is held by its cell.
    pub fn check_links(&self) -> Result<()> {
        for (coords, cell) in self.grid.iter() {
            if let Some(id) = cell.piece() {
                let linked = self
                    .piece(id)
                    .is_some_and(|piece| piece.cell() == Some(coords) && piece.appearance().is_some());
                if !linked {
                    return Err(BoardError::BrokenLink { coords });
                }
            }
        }

        for (id, piece) in self.pool.iter() {
            if let Some(coords) = piece.cell() {
                if self.grid.get(coords) != Some(Cell::Holding(id)) {
                    return Err(BoardError::BrokenLink { coords });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn debug_check_links(&self) {
        debug_assert_eq!(self.check_links(), Ok(()));
    }

    /// Takes a piece from the pool, gives it a fresh appearance and puts it on the empty cell.
    pub(crate) fn spawn_at(&mut self, coords: Coord2, generator: &mut impl PieceGenerator) -> PieceId {
        let appearance = generator.roll(&self.variants);
        self.place(coords, appearance)
    }

    pub(crate) fn place(&mut self, coords: Coord2, appearance: Appearance) -> PieceId {
        let id = self.pool.take();
        if let Some(piece) = self.pool.get_mut(id) {
            piece.set_appearance(appearance);
        }
        self.attach(id, coords);
        id
    }

    pub(crate) fn set_appearance(&mut self, id: PieceId, appearance: Appearance) {
        if let Some(piece) = self.pool.get_mut(id) {
            piece.set_appearance(appearance);
        }
    }

    fn attach(&mut self, id: PieceId, coords: Coord2) {
        debug_assert_eq!(self.grid.get(coords), Some(Cell::Empty));
        debug_assert_eq!(self.cell_of(id), None);

        if let Some(piece) = self.pool.get_mut(id) {
            piece.set_cell(Some(coords));
            self.grid.set(coords, Cell::Holding(id));
        }
    }

    /// Clears both sides of the link, returning the cell the piece sat on.
    pub(crate) fn detach(&mut self, id: PieceId) -> Option<Coord2> {
        let piece = self.pool.get_mut(id)?;
        let coords = piece.cell()?;
        piece.set_cell(None);

        debug_assert_eq!(self.grid.get(coords), Some(Cell::Holding(id)));
        self.grid.set(coords, Cell::Empty);
        Some(coords)
    }

    /// Detaches the piece and returns it to the pool.
    pub(crate) fn remove(&mut self, id: PieceId) -> Option<Coord2> {
        let coords = self.detach(id)?;
        self.pool.release(id);
        Some(coords)
    }

    /// Exchanges the cells of two active pieces. Returns false, changing nothing, if either is not on the board.
    pub(crate) fn swap_pieces(&mut self, a: PieceId, b: PieceId) -> bool {
        let (Some(cell_a), Some(cell_b)) = (self.cell_of(a), self.cell_of(b)) else {
            return false;
        };

        self.grid.set(cell_a, Cell::Holding(b));
        self.grid.set(cell_b, Cell::Holding(a));
        if let Some(piece) = self.pool.get_mut(a) {
            piece.set_cell(Some(cell_b));
        }
        if let Some(piece) = self.pool.get_mut(b) {
            piece.set_cell(Some(cell_a));
        }
        true
    }

    /// Moves the piece held at `from` onto the empty cell `to`.
    pub(crate) fn move_piece(&mut self, from: Coord2, to: Coord2) -> Option<PieceId> {
        let id = self.piece_at(from)?;
        debug_assert_eq!(self.grid.get(to), Some(Cell::Empty));

        self.grid.set(from, Cell::Empty);
        self.grid.set(to, Cell::Holding(id));
        if let Some(piece) = self.pool.get_mut(id) {
            piece.set_cell(Some(to));
        }
        Some(id)
    }
}
