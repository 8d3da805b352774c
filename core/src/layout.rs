use alloc::vec::Vec;

use ndarray::Array2;

use crate::*;

/// A fixed board description, `None` marks an empty cell.
pub type Layout = Array2<Option<Appearance>>;

/// Board size of `layout`. Both dimensions must be non-zero and fit a [`Coord`].
pub(crate) fn layout_size(layout: &Layout) -> Result<Coord2> {
    let (width, height) = layout.dim();
    let dimension = |len: usize| Coord::try_from(len).ok().filter(|&len| len > 0);
    match (dimension(width), dimension(height)) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(BoardError::InvalidLayout),
    }
}

/// Parses the text form used by [`BoardSnapshot`]'s `Display`: one row per line (or `/`), top row first, `.` for an
/// empty cell and a kind symbol for a variant-0 piece. Whitespace around rows is ignored.
pub fn parse_layout(text: &str) -> Result<Layout> {
    let rows: Vec<&str> = text
        .split(['\n', '/'])
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .collect();

    let height = rows.len();
    let width = rows.first().map_or(0, |row| row.chars().count());
    if width == 0 || width > Coord::MAX.into() || height > Coord::MAX.into() {
        return Err(BoardError::InvalidLayout);
    }

    let mut layout = Layout::from_elem((width, height), None);
    for (row_index, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(BoardError::InvalidLayout);
        }
        let y = height - 1 - row_index;
        for (x, symbol) in row.chars().enumerate() {
            layout[[x, y]] = match symbol {
                '.' => None,
                _ => Some(Appearance::plain(
                    PieceKind::from_symbol(symbol).ok_or(BoardError::InvalidLayout)?,
                )),
            };
        }
    }

    Ok(layout)
}
