//! Core value types shared by the engine and the board.
//!
//! Cells are addressed as `(row, col)`. Every collection of cells in this
//! crate is ordered row-major, so iteration order is deterministic.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest board accepted, in cells. Keeps the neighbor table allocatable.
pub const MAX_BOARD_CELLS: usize = 1 << 20;

/// A board coordinate. Ordering is row-major: row first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline(always)]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Fixed board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    pub rows: usize,
    pub cols: usize,
}

impl BoardSize {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Reject empty boards and boards larger than [`MAX_BOARD_CELLS`].
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EngineError::invalid_input(format!(
                "board must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        match self.rows.checked_mul(self.cols) {
            Some(total) if total <= MAX_BOARD_CELLS => Ok(()),
            _ => Err(EngineError::invalid_input(format!(
                "a {}x{} board exceeds the {MAX_BOARD_CELLS}-cell limit",
                self.rows, self.cols
            ))),
        }
    }

    /// Total number of cells. Only meaningful on a validated size.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Row-major index of an in-bounds cell.
    #[inline(always)]
    pub fn index(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    /// Every cell of the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
    }
}

/// Pre-computed neighbor table for every cell of a board.
///
/// Stores the 8-directional neighbors (clipped to board bounds) for each
/// cell, in row-major order. Indexed by [`BoardSize::index`].
#[derive(Debug, Clone)]
pub struct NeighborCache {
    size: BoardSize,
    /// Flat storage of all neighbor cells.
    data: Vec<Cell>,
    /// offsets[i]..offsets[i + 1] is the neighbor slice of cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    pub fn new(size: BoardSize) -> Self {
        let total = size.len();
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for cell in size.cells() {
            offsets.push(data.len());
            for dr in -1i64..=1 {
                for dc in -1i64..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let nr = cell.row as i64 + dr;
                    let nc = cell.col as i64 + dc;
                    if nr >= 0 && nr < size.rows as i64 && nc >= 0 && nc < size.cols as i64 {
                        data.push(Cell::new(nr as usize, nc as usize));
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self { size, data, offsets }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Neighbors of an in-bounds cell.
    #[inline(always)]
    pub fn get(&self, cell: Cell) -> &[Cell] {
        let idx = self.size.index(cell);
        &self.data[self.offsets[idx]..self.offsets[idx + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_order_is_row_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]);
    }

    #[test]
    fn test_board_cells_row_major() {
        let size = BoardSize::new(2, 3);
        let cells: Vec<Cell> = size.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[3], Cell::new(1, 0));
        assert!(cells.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_contains() {
        let size = BoardSize::new(3, 4);
        assert!(size.contains(Cell::new(2, 3)));
        assert!(!size.contains(Cell::new(3, 0)));
        assert!(!size.contains(Cell::new(0, 4)));
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized() {
        assert!(BoardSize::new(8, 8).validate().is_ok());
        assert!(BoardSize::new(1, MAX_BOARD_CELLS).validate().is_ok());
        assert!(BoardSize::new(0, 3).validate().is_err());
        assert!(BoardSize::new(3, 0).validate().is_err());
        assert!(BoardSize::new(2, MAX_BOARD_CELLS).validate().is_err());
        // rows * cols overflows usize.
        let err = BoardSize::new(usize::MAX, 2).validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_neighbor_cache_corners() {
        let nc = NeighborCache::new(BoardSize::new(5, 5));
        assert_eq!(nc.get(Cell::new(0, 0)).len(), 3);
        assert_eq!(nc.get(Cell::new(0, 2)).len(), 5);
        assert_eq!(nc.get(Cell::new(2, 2)).len(), 8);
    }

    #[test]
    fn test_neighbors_adjacent_and_sorted() {
        let nc = NeighborCache::new(BoardSize::new(10, 10));
        let center = Cell::new(5, 5);
        let neighbors = nc.get(center);
        for n in neighbors {
            assert!(n.row.abs_diff(5) <= 1 && n.col.abs_diff(5) <= 1);
            assert_ne!(*n, center);
        }
        assert!(neighbors.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_cell_board_has_no_neighbors() {
        let nc = NeighborCache::new(BoardSize::new(1, 1));
        assert!(nc.get(Cell::new(0, 0)).is_empty());
    }
}
