//! Core data types shared by the reasoner and the simulation harness.
//!
//! Cells are addressed as `(row, col)` with rows in `[0, height)` and columns
//! in `[0, width)`. Flat storage is row-major: `cells[row * width + col]`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A board coordinate.
///
/// Ordered row-major so that sets of cells iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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

/// Pre-computed neighbor table for a `height × width` board.
///
/// Stores the 8-directional neighbors (clipped to board bounds) of every cell.
pub struct NeighborCache {
    pub height: usize,
    pub width: usize,
    /// Flat storage of all neighbors.
    data: Vec<Cell>,
    /// offsets[i] = start index in `data` for cell i.
    /// offsets[i+1] - offsets[i] = number of neighbors for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    pub fn new(height: usize, width: usize) -> Self {
        let total = height * width;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..height {
            for col in 0..width {
                offsets.push(data.len());
                for dr in -1i64..=1 {
                    for dc in -1i64..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = row as i64 + dr;
                        let nc = col as i64 + dc;
                        if nr >= 0 && nr < height as i64 && nc >= 0 && nc < width as i64 {
                            data.push(Cell::new(nr as usize, nc as usize));
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self {
            height,
            width,
            data,
            offsets,
        }
    }

    #[inline(always)]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Neighbors of an in-bounds cell.
    #[inline(always)]
    pub fn get(&self, cell: Cell) -> &[Cell] {
        let idx = cell.row * self.width + cell.col;
        &self.data[self.offsets[idx]..self.offsets[idx + 1]]
    }
}
