//! Hidden mine layouts for driving the reasoner against a real board.
//!
//! Placement takes any `rand::Rng`; seed a `SmallRng` for deterministic replay.

use crate::types::{Cell, NeighborCache};
use rand::Rng;

/// The ground truth a game reveals cell by cell.
pub struct Minefield {
    pub height: usize,
    pub width: usize,
    /// Row-major mine flags.
    cells: Vec<bool>,
    neighbors: NeighborCache,
}

impl Minefield {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![false; height * width],
            neighbors: NeighborCache::new(height, width),
        }
    }

    /// Builds a layout from explicit mine positions.
    pub fn with_mines(height: usize, width: usize, mines: impl IntoIterator<Item = Cell>) -> Self {
        let mut field = Self::new(height, width);
        for cell in mines {
            field.set_mine(cell);
        }
        field
    }

    #[inline(always)]
    pub fn is_mine(&self, cell: Cell) -> bool {
        self.cells[cell.row * self.width + cell.col]
    }

    #[inline(always)]
    fn set_mine(&mut self, cell: Cell) {
        self.cells[cell.row * self.width + cell.col] = true;
    }

    pub fn mine_count(&self) -> usize {
        self.cells.iter().filter(|&&m| m).count()
    }

    /// The number shown when `cell` is revealed.
    pub fn adjacent_mines(&self, cell: Cell) -> usize {
        self.neighbors
            .get(cell)
            .iter()
            .filter(|&&n| self.is_mine(n))
            .count()
    }
}

/// Place mines randomly, keeping a square of `safe_radius` around `start` clear.
///
/// Gives up after a fixed number of draws, so a board too small for the
/// request ends up with fewer mines. Size a reasoner for the result with
/// [`Minefield::mine_count`], not with the requested `total_mines`.
pub fn place_mines_random(
    height: usize,
    width: usize,
    total_mines: usize,
    start: Cell,
    safe_radius: usize,
    rng: &mut impl Rng,
) -> Minefield {
    let mut field = Minefield::new(height, width);
    let mut placed = 0;
    let mut attempts = 0;
    let max_placement_attempts = 100_000;

    while placed < total_mines && attempts < max_placement_attempts {
        attempts += 1;
        let cell = Cell::new(rng.random_range(0..height), rng.random_range(0..width));

        if cell.row.abs_diff(start.row) <= safe_radius && cell.col.abs_diff(start.col) <= safe_radius {
            continue;
        }

        if !field.is_mine(cell) {
            field.set_mine(cell);
            placed += 1;
        }
    }

    field
}
