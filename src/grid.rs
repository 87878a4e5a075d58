use serde::{Deserialize, Serialize};

use crate::input::Direction;

/// Grid cell in logical (row, col) coordinates.
///
/// Coordinates are signed so that a step off the edge of the grid is still a
/// representable value that bounds checks can reject.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the neighbouring cell one unit step in `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

/// Fixed logical grid dimensions.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u16,
    pub cols: u16,
}

impl GridSize {
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Returns true when `cell` lies inside `[0, rows) x [0, cols)`.
    #[must_use]
    pub fn contains(self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && cell.row < i32::from(self.rows)
            && cell.col < i32::from(self.cols)
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    /// Maps a row-major index in `[0, total_cells)` back to its cell.
    #[must_use]
    pub fn cell_at(self, index: usize) -> Cell {
        let cols = usize::from(self.cols).max(1);
        Cell {
            row: (index / cols) as i32,
            col: (index % cols) as i32,
        }
    }

    /// Row-major index of an in-bounds cell.
    #[must_use]
    pub fn index_of(self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        Some(row * usize::from(self.cols) + col)
    }
}
