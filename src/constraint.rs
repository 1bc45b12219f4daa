//! Logical statements about a board: "exactly `count` of these cells are mines".

use crate::types::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Sub;

/// A constraint over a set of cells.
///
/// Cells live in a `BTreeSet` so equality and hashing do not depend on the
/// order in which cells were added.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Constraint {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// True when this constraint's cells are a subset of `other`'s.
    pub fn is_subset_of(&self, other: &Constraint) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// `0 <= count <= |cells|`.
    pub fn is_consistent(&self) -> bool {
        self.count <= self.cells.len()
    }

    /// Every cell is a mine when the count covers the whole (non-empty) set.
    pub fn known_mines(&self) -> impl Iterator<Item = Cell> + '_ {
        let all = !self.cells.is_empty() && self.count == self.cells.len();
        self.cells.iter().copied().filter(move |_| all)
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safes(&self) -> impl Iterator<Item = Cell> + '_ {
        let all = self.count == 0;
        self.cells.iter().copied().filter(move |_| all)
    }

    /// Removes a mine from the statement. Returns whether `cell` was present.
    pub fn mark_mine(&mut self, cell: Cell) -> bool {
        if !self.cells.remove(&cell) {
            return false;
        }
        debug_assert!(self.count > 0, "mine {cell} removed from a zero-count constraint");
        self.count = self.count.saturating_sub(1);
        true
    }

    /// Removes a safe cell from the statement. Returns whether `cell` was present.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// `self - subset`, or `None` when `subset` claims more mines than `self`.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `subset` is not contained in `self`.
    pub fn checked_difference(&self, subset: &Constraint) -> Option<Constraint> {
        debug_assert!(
            subset.is_subset_of(self),
            "cannot subtract {subset} from non-superset {self}"
        );
        let count = self.count.checked_sub(subset.count)?;
        Some(Constraint {
            cells: self.cells.difference(&subset.cells).copied().collect(),
            count,
        })
    }
}

/// `superset - subset`: the cells of `superset` not in `subset`, holding the
/// mines `subset` does not account for.
///
/// # Panics
///
/// Debug builds panic if `subset` is not contained in `superset`. All builds
/// panic if `subset` claims more mines than `superset`.
impl Sub for &Constraint {
    type Output = Constraint;

    fn sub(self, subset: &Constraint) -> Constraint {
        self.checked_difference(subset)
            .unwrap_or_else(|| panic!("inconsistent knowledge: {self} minus {subset}"))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}
