//! Grid arithmetic shared by the pyramid and the index.
//!
//! Resolution level 0 is the acquired tile grid. Each coarser level halves
//! the grid in both axes, so a cell at level `L + 1` covers a 2x2 block of
//! cells at level `L`. Cell 0 at one level is the top-left child of cell 0 at
//! the next coarser level, which makes the mapping floor division by 2 for
//! negative coordinates as well.

/// Coarsest resolution level the pyramid is ever built to.
///
/// At level 32 every `i32` tile coordinate has been folded into cell `-1` or
/// cell `0`, so further levels would only repeat the same cells.
pub const MAX_RES_LEVEL: u32 = 32;

// =============================================================================
// Parent Coordinates
// =============================================================================

/// Grid coordinate of the covering cell one resolution level up.
///
/// Floor division by 2: `3 -> 1`, `-1 -> -1`, `-3 -> -2`.
pub fn parent_coordinate(value: i64) -> i64 {
    if value >= 0 {
        value / 2
    } else {
        (value - 1) / 2
    }
}

/// Grid cell `(row, col)` of the covering cell one resolution level up.
pub fn parent_cell(row: i64, col: i64) -> (i64, i64) {
    (parent_coordinate(row), parent_coordinate(col))
}

/// Number of halvings needed before a grid `grid_length` cells wide fits in
/// a single cell, i.e. `ceil(log2(grid_length))`.
///
/// Returns 0 for empty and single-cell grids.
pub fn levels_to_single_cell(grid_length: u64) -> u32 {
    if grid_length <= 1 {
        return 0;
    }
    grid_length.next_power_of_two().trailing_zeros()
}

// =============================================================================
// GridBounds
// =============================================================================

/// Inclusive bounding box of the acquired full-resolution tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub min_row: i32,
    pub max_row: i32,
    pub min_col: i32,
    pub max_col: i32,
}

impl GridBounds {
    /// Bounds of a single tile.
    pub fn from_tile(row: i32, col: i32) -> Self {
        Self {
            min_row: row,
            max_row: row,
            min_col: col,
            max_col: col,
        }
    }

    /// Bounds covering every tile yielded, or `None` for an empty iterator.
    pub fn from_tiles<I>(tiles: I) -> Option<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut iter = tiles.into_iter();
        let (row, col) = iter.next()?;
        let mut bounds = Self::from_tile(row, col);
        for (row, col) in iter {
            bounds.include(row, col);
        }
        Some(bounds)
    }

    /// Grow the bounds to cover `(row, col)`.
    pub fn include(&mut self, row: i32, col: i32) {
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
    }

    /// Number of rows spanned, `1 + max_row - min_row`.
    pub fn num_rows(&self) -> u64 {
        (i64::from(self.max_row) - i64::from(self.min_row) + 1) as u64
    }

    /// Number of columns spanned, `1 + max_col - min_col`.
    pub fn num_cols(&self) -> u64 {
        (i64::from(self.max_col) - i64::from(self.min_col) + 1) as u64
    }

    /// Length of the longer side of the bounding box, in tiles.
    pub fn grid_length(&self) -> u64 {
        self.num_rows().max(self.num_cols())
    }
}

// =============================================================================
// Tests
// =============================================================================
