//! Knowledge-base reasoner.
//!
//! Absorbs revealed cells one at a time and closes the knowledge base under
//! two inference rules until nothing new can be proven:
//! - Known cells: a constraint with count 0 makes all its cells safe, one whose
//!   count equals its size makes all its cells mines.
//! - Subset rule: if A's cells are a subset of B's, `B - A` also holds.

use crate::config::BoardConfig;
use crate::constraint::Constraint;
use crate::error::KnowledgeError;
use crate::types::{Cell, NeighborCache};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace, warn};

/// Closure proved a fact that conflicts with what is already known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contradiction;

/// Everything `add_knowledge` may change, kept to roll back a rejected observation.
struct Snapshot {
    moves_made: HashSet<Cell>,
    safes: HashSet<Cell>,
    mines: HashSet<Cell>,
    knowledge: Vec<Constraint>,
    last_move: Option<Cell>,
}

/// Minesweeper player that only asserts what it can prove.
pub struct Reasoner {
    height: usize,
    width: usize,
    total_mines: usize,
    neighbors: NeighborCache,

    moves_made: HashSet<Cell>,
    safes: HashSet<Cell>,
    mines: HashSet<Cell>,
    /// Live constraints in insertion order.
    knowledge: Vec<Constraint>,
    last_move: Option<Cell>,
}

impl Reasoner {
    pub fn new(height: usize, width: usize, total_mines: usize) -> Self {
        Self {
            height,
            width,
            total_mines,
            neighbors: NeighborCache::new(height, width),
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            knowledge: Vec::new(),
            last_move: None,
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.rows(), config.cols(), config.mines())
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn total_mines(&self) -> usize {
        self.total_mines
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn knowledge(&self) -> &[Constraint] {
        &self.knowledge
    }

    /// The most recently absorbed cell.
    pub fn last_move(&self) -> Option<Cell> {
        self.last_move
    }

    pub fn is_known_safe(&self, cell: Cell) -> bool {
        self.safes.contains(&cell)
    }

    pub fn is_known_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Smallest cell (row-major) proven safe that has not been opened yet.
    pub fn next_safe_move(&self) -> Option<Cell> {
        self.safes
            .iter()
            .filter(|cell| !self.moves_made.contains(*cell))
            .min()
            .copied()
    }

    /// True once every non-mine cell has been opened.
    pub fn is_solved(&self) -> bool {
        let cells = self.height * self.width;
        cells >= self.total_mines && self.moves_made.len() == cells - self.total_mines
    }

    // ─── Fact propagation ───────────────────────────────────────────────────

    /// Records `cell` as a mine and removes it from every constraint.
    ///
    /// `cell` must not already be known safe.
    pub fn mark_mine(&mut self, cell: Cell) {
        debug_assert!(!self.safes.contains(&cell), "{cell} is already known safe");
        if self.mines.insert(cell) {
            debug!(%cell, "marking mine");
        }
        for constraint in &mut self.knowledge {
            constraint.mark_mine(cell);
        }
    }

    /// Records `cell` as safe and removes it from every constraint.
    ///
    /// `cell` must not already be known to be a mine.
    pub fn mark_safe(&mut self, cell: Cell) {
        debug_assert!(!self.mines.contains(&cell), "{cell} is already known to be a mine");
        if self.safes.insert(cell) {
            debug!(%cell, "marking safe");
        }
        for constraint in &mut self.knowledge {
            constraint.mark_safe(cell);
        }
    }

    // ─── Observation ────────────────────────────────────────────────────────

    /// Absorbs a revealed `cell` showing `count` adjacent mines, then infers
    /// everything that follows from the whole knowledge base.
    ///
    /// Invalid observations, including ones that contradict earlier
    /// observations, are rejected and leave the state as it was.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        self.validate(cell, count)?;
        debug!(%cell, count, "opened cell");

        let snapshot = self.snapshot();
        if self.absorb(cell, count).is_err() {
            warn!(%cell, count, "observation contradicts knowledge base, rolling back");
            self.restore(snapshot);
            return Err(KnowledgeError::Contradiction(cell));
        }
        Ok(())
    }

    fn absorb(&mut self, cell: Cell, count: usize) -> Result<(), Contradiction> {
        self.moves_made.insert(cell);
        self.last_move = Some(cell);
        self.mark_safe(cell);

        let constraint = self.neighborhood_constraint(cell, count);
        debug!(%constraint, "new knowledge");
        self.knowledge.push(constraint);

        self.close()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            moves_made: self.moves_made.clone(),
            safes: self.safes.clone(),
            mines: self.mines.clone(),
            knowledge: self.knowledge.clone(),
            last_move: self.last_move,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.moves_made = snapshot.moves_made;
        self.safes = snapshot.safes;
        self.mines = snapshot.mines;
        self.knowledge = snapshot.knowledge;
        self.last_move = snapshot.last_move;
    }

    fn validate(&self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        if !self.neighbors.contains(cell) {
            return Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        if self.moves_made.contains(&cell) {
            return Err(KnowledgeError::AlreadyOpened(cell));
        }
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::KnownMine(cell));
        }

        let mut known_mines = 0;
        let mut unknown = 0;
        for n in self.neighbors.get(cell) {
            if self.mines.contains(n) {
                known_mines += 1;
            } else if !self.safes.contains(n) {
                unknown += 1;
            }
        }
        if count < known_mines || count > known_mines + unknown {
            return Err(KnowledgeError::CountOutOfRange {
                cell,
                count,
                min: known_mines,
                max: known_mines + unknown,
            });
        }
        Ok(())
    }

    /// The statement `count` makes about the unresolved neighbors of `cell`.
    fn neighborhood_constraint(&self, cell: Cell, count: usize) -> Constraint {
        let mut remaining = count;
        let mut cells = BTreeSet::new();
        for &n in self.neighbors.get(cell) {
            if self.safes.contains(&n) {
                continue;
            }
            if self.mines.contains(&n) {
                remaining -= 1;
                continue;
            }
            cells.insert(n);
        }
        Constraint::new(cells, remaining)
    }

    // ─── Closure ────────────────────────────────────────────────────────────

    /// Applies both inference rules until a full round proves nothing new.
    ///
    /// Stops at the first contradiction, leaving the state partially updated.
    fn close(&mut self) -> Result<(), Contradiction> {
        let mut round = 0usize;
        loop {
            round += 1;
            let mut changed = false;

            // Known cells
            let mut safes = BTreeSet::new();
            let mut mines = BTreeSet::new();
            for constraint in &self.knowledge {
                safes.extend(constraint.known_safes());
                mines.extend(constraint.known_mines());
            }
            trace!(round, safes = safes.len(), mines = mines.len(), "closure round");

            if !safes.is_empty() || !mines.is_empty() {
                changed = true;
            }
            for cell in safes {
                if self.mines.contains(&cell) {
                    return Err(Contradiction);
                }
                self.mark_safe(cell);
            }
            for cell in mines {
                // A zero-count statement containing `cell` says it is safe.
                if self.safes.contains(&cell)
                    || self.knowledge.iter().any(|k| k.count() == 0 && k.contains(&cell))
                {
                    return Err(Contradiction);
                }
                self.mark_mine(cell);
            }

            // Also catches statements left with no cells but a nonzero count.
            if !self.knowledge.iter().all(Constraint::is_consistent) {
                return Err(Contradiction);
            }
            self.knowledge.retain(|constraint| !constraint.is_empty());

            // Subset rule
            if self.derive_subset_constraints()? {
                changed = true;
            }

            if !changed {
                break;
            }
        }

        debug!(
            rounds = round,
            safes = self.safes.len(),
            mines = self.mines.len(),
            constraints = self.knowledge.len(),
            "closure reached fixed point"
        );
        Ok(())
    }

    /// Compares every ordered pair of constraints, including ones appended
    /// during this pass, and appends each new `B - A` with `A ⊆ B`.
    ///
    /// O(n²) pairs per round. Returns whether anything was appended.
    fn derive_subset_constraints(&mut self) -> Result<bool, Contradiction> {
        let mut known: HashSet<Constraint> = self.knowledge.iter().cloned().collect();
        let mut appended = false;

        let mut i = 0;
        while i < self.knowledge.len() {
            let mut j = 0;
            while j < self.knowledge.len() {
                let (a, b) = (&self.knowledge[i], &self.knowledge[j]);
                if a != b && a.is_subset_of(b) {
                    let derived = b.checked_difference(a).ok_or(Contradiction)?;
                    if !derived.is_consistent() {
                        return Err(Contradiction);
                    }
                    if !known.contains(&derived) {
                        debug!(%derived, "inferred constraint");
                        known.insert(derived.clone());
                        self.knowledge.push(derived);
                        appended = true;
                    }
                }
                j += 1;
            }
            i += 1;
        }

        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Cell {
        Cell::new(row, col)
    }

    fn set(cells: &[(usize, usize)]) -> HashSet<Cell> {
        cells.iter().map(|&rc| Cell::from(rc)).collect()
    }

    fn assert_sound(r: &Reasoner) {
        for constraint in r.knowledge() {
            assert!(constraint.is_consistent(), "inconsistent {constraint}");
            for cell in constraint.cells() {
                assert!(!r.is_known_safe(*cell), "{cell} known safe but still in {constraint}");
                assert!(!r.is_known_mine(*cell), "{cell} known mine but still in {constraint}");
            }
        }
        assert!(r.safes().is_disjoint(r.mines()));
    }

    #[test]
    fn test_zero_count_reveals_all_neighbors() {
        let mut r = Reasoner::new(3, 3, 10);
        r.add_knowledge(c(1, 1), 0).unwrap();

        let all: HashSet<Cell> = (0..3).flat_map(|row| (0..3).map(move |col| c(row, col))).collect();
        assert_eq!(r.safes(), &all);
        assert!(r.mines().is_empty());
        assert!(r.knowledge().is_empty());
        assert_eq!(r.last_move(), Some(c(1, 1)));
    }

    #[test]
    fn test_undecided_corner_adds_one_constraint() {
        let mut r = Reasoner::new(3, 3, 10);
        r.add_knowledge(c(0, 0), 1).unwrap();

        assert_eq!(r.knowledge(), &[Constraint::new([c(0, 1), c(1, 0), c(1, 1)], 1)]);
        assert_eq!(r.safes(), &set(&[(0, 0)]));
        assert!(r.mines().is_empty());
        assert_eq!(r.moves_made(), &set(&[(0, 0)]));
    }

    #[test]
    fn test_subset_rule_proves_safe() {
        // {A,B,C} = 1 and {A,B} = 1  =>  {C} = 0
        let (a, b, cc) = (c(0, 0), c(0, 1), c(0, 2));
        let mut r = Reasoner::new(5, 5, 3);
        r.knowledge.push(Constraint::new([a, b, cc], 1));
        r.knowledge.push(Constraint::new([a, b], 1));
        r.close().unwrap();

        assert!(r.is_known_safe(cc));
        assert!(!r.is_known_safe(a) && !r.is_known_safe(b));
        // {A,B,C} collapses onto {A,B}; equal copies may coexist.
        assert!(!r.knowledge().is_empty());
        assert!(r.knowledge().iter().all(|k| *k == Constraint::new([a, b], 1)));
    }

    #[test]
    fn test_full_count_proves_mines() {
        let (a, b) = (c(2, 2), c(2, 3));
        let mut r = Reasoner::new(5, 5, 3);
        r.knowledge.push(Constraint::new([a, b], 2));
        r.close().unwrap();

        assert_eq!(r.mines(), &set(&[(2, 2), (2, 3)]));
        assert!(r.knowledge().is_empty());
    }

    #[test]
    fn test_resolved_constraint_is_dropped() {
        let x = c(4, 4);
        let mut r = Reasoner::new(5, 5, 3);
        r.knowledge.push(Constraint::new([x], 0));
        r.mark_safe(x);
        assert!(r.knowledge()[0].is_empty());

        r.close().unwrap();
        assert!(r.knowledge().is_empty());
    }

    #[test]
    fn test_mark_mine_propagates_into_constraints() {
        let m = c(1, 1);
        let mut r = Reasoner::new(3, 3, 2);
        r.knowledge.push(Constraint::new([c(0, 0), m, c(0, 1)], 2));
        r.knowledge.push(Constraint::new([m, c(2, 2)], 1));
        r.knowledge.push(Constraint::new([c(2, 0), c(2, 1)], 1));
        r.mark_mine(m);

        assert!(r.knowledge().iter().all(|k| !k.contains(&m)));
        assert_eq!(r.knowledge()[0], Constraint::new([c(0, 0), c(0, 1)], 1));
        assert_eq!(r.knowledge()[1], Constraint::new([c(2, 2)], 0));
        assert_eq!(r.knowledge()[2], Constraint::new([c(2, 0), c(2, 1)], 1));
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut once = Reasoner::new(3, 3, 2);
        let mut twice = Reasoner::new(3, 3, 2);
        for r in [&mut once, &mut twice] {
            r.knowledge.push(Constraint::new([c(0, 0), c(0, 1), c(0, 2)], 2));
        }

        once.mark_mine(c(0, 0));
        once.mark_safe(c(0, 1));
        twice.mark_mine(c(0, 0));
        twice.mark_mine(c(0, 0));
        twice.mark_safe(c(0, 1));
        twice.mark_safe(c(0, 1));

        assert_eq!(once.knowledge(), twice.knowledge());
        assert_eq!(once.mines(), twice.mines());
        assert_eq!(once.safes(), twice.safes());
    }

    #[test]
    fn test_known_mine_neighbor_reduces_new_count() {
        // Mine proven at (0,1) from a 1 at (0,0) whose other neighbors are safe.
        let mut r = Reasoner::new(3, 3, 1);
        r.mark_safe(c(1, 0));
        r.mark_safe(c(1, 1));
        r.add_knowledge(c(0, 0), 1).unwrap();
        assert!(r.is_known_mine(c(0, 1)));

        // (1,2) sees the mine; its count of 1 is fully explained.
        r.add_knowledge(c(1, 2), 1).unwrap();
        for cell in [c(0, 2), c(2, 1), c(2, 2)] {
            assert!(r.is_known_safe(cell), "{cell} should be safe");
        }
        assert_sound(&r);
    }

    #[test]
    fn test_one_two_one_pattern() {
        // Row 0 hidden, row 1 revealed as 1 2 1 with row 2 all zeros.
        //   ? ? ?
        //   1 2 1
        //   0 0 0
        let mut r = Reasoner::new(3, 3, 2);
        r.add_knowledge(c(2, 0), 0).unwrap();
        r.add_knowledge(c(2, 1), 0).unwrap();
        r.add_knowledge(c(2, 2), 0).unwrap();
        r.add_knowledge(c(1, 0), 1).unwrap();
        r.add_knowledge(c(1, 1), 2).unwrap();
        r.add_knowledge(c(1, 2), 1).unwrap();

        assert_eq!(r.mines(), &set(&[(0, 0), (0, 2)]));
        assert!(r.is_known_safe(c(0, 1)));
        assert_eq!(r.next_safe_move(), Some(c(0, 1)));
        assert_sound(&r);

        r.add_knowledge(c(0, 1), 2).unwrap();
        assert!(r.is_solved());
        assert_eq!(r.next_safe_move(), None);
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let mut r = Reasoner::new(3, 4, 2);
        let err = r.add_knowledge(c(3, 0), 0).unwrap_err();
        assert_eq!(err, KnowledgeError::OutOfBounds { cell: c(3, 0), height: 3, width: 4 });
        assert!(r.moves_made().is_empty());
    }

    #[test]
    fn test_rejects_reopening() {
        let mut r = Reasoner::new(3, 3, 2);
        r.add_knowledge(c(0, 0), 1).unwrap();
        assert_eq!(r.add_knowledge(c(0, 0), 1), Err(KnowledgeError::AlreadyOpened(c(0, 0))));
        assert_eq!(r.knowledge().len(), 1);
    }

    #[test]
    fn test_rejects_known_mine() {
        let mut r = Reasoner::new(3, 3, 1);
        r.mark_mine(c(2, 2));
        assert_eq!(r.add_knowledge(c(2, 2), 0), Err(KnowledgeError::KnownMine(c(2, 2))));
    }

    #[test]
    fn test_rejects_infeasible_count() {
        let mut r = Reasoner::new(3, 3, 2);
        assert_eq!(
            r.add_knowledge(c(0, 0), 4),
            Err(KnowledgeError::CountOutOfRange { cell: c(0, 0), count: 4, min: 0, max: 3 })
        );

        r.mark_mine(c(0, 1));
        assert_eq!(
            r.add_knowledge(c(0, 0), 0),
            Err(KnowledgeError::CountOutOfRange { cell: c(0, 0), count: 0, min: 1, max: 3 })
        );
        assert!(r.safes().is_empty());
        assert!(r.last_move().is_none());
    }

    #[test]
    fn test_rejects_mine_forced_into_zero_count() {
        // (0,0)=1 puts one mine among the other three cells; (0,1)=2 then
        // forces two mines into the two cells below it.
        let mut r = Reasoner::new(2, 2, 1);
        r.add_knowledge(c(0, 0), 1).unwrap();
        let knowledge = r.knowledge().to_vec();

        assert_eq!(r.add_knowledge(c(0, 1), 2), Err(KnowledgeError::Contradiction(c(0, 1))));
        assert_eq!(r.knowledge(), knowledge.as_slice());
        assert_eq!(r.safes(), &set(&[(0, 0)]));
        assert!(r.mines().is_empty());
        assert_eq!(r.moves_made(), &set(&[(0, 0)]));
        assert_eq!(r.last_move(), Some(c(0, 0)));
    }

    #[test]
    fn test_rejects_observation_emptying_a_nonzero_constraint() {
        // (0,1)=0 clears every cell the 1 at (0,0) could point at.
        let mut r = Reasoner::new(2, 3, 1);
        r.add_knowledge(c(0, 0), 1).unwrap();

        assert_eq!(r.add_knowledge(c(0, 1), 0), Err(KnowledgeError::Contradiction(c(0, 1))));
        assert_eq!(r.knowledge(), &[Constraint::new([c(0, 1), c(1, 0), c(1, 1)], 1)]);
        assert_eq!(r.safes(), &set(&[(0, 0)]));
        assert!(r.mines().is_empty());
        assert_eq!(r.moves_made(), &set(&[(0, 0)]));
    }

    #[test]
    fn test_rejects_subset_with_more_mines() {
        // Two mines among three cells cannot sit inside a five-cell set holding one.
        let small = [c(0, 0), c(0, 1), c(0, 2)];
        let mut r = Reasoner::new(3, 3, 2);
        r.knowledge.push(Constraint::new(small.into_iter().chain([c(1, 0), c(1, 1)]), 1));
        r.knowledge.push(Constraint::new(small, 2));
        assert_eq!(r.close(), Err(Contradiction));
    }

    #[test]
    fn test_reasoner_usable_after_rejected_contradiction() {
        let mut r = Reasoner::new(2, 3, 1);
        r.add_knowledge(c(0, 0), 1).unwrap();
        assert!(r.add_knowledge(c(0, 1), 0).is_err());

        // Truthful reading with the mine at (1,0).
        r.add_knowledge(c(0, 1), 1).unwrap();
        r.add_knowledge(c(0, 2), 0).unwrap();
        assert!(r.is_known_mine(c(1, 0)));
        assert_sound(&r);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already known safe")]
    fn test_mark_mine_on_known_safe_panics() {
        let mut r = Reasoner::new(3, 3, 1);
        r.mark_safe(c(1, 1));
        r.mark_mine(c(1, 1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already known to be a mine")]
    fn test_mark_safe_on_known_mine_panics() {
        let mut r = Reasoner::new(3, 3, 1);
        r.mark_mine(c(1, 1));
        r.mark_safe(c(1, 1));
    }

    #[test]
    fn test_knowledge_grows_monotonically() {
        let mut r = Reasoner::new(4, 4, 3);
        let observations = [(c(3, 3), 0), (c(3, 2), 0), (c(2, 3), 1), (c(2, 2), 2), (c(3, 1), 1)];
        let mut prev_safes = HashSet::new();
        let mut prev_mines = HashSet::new();
        for (cell, count) in observations {
            r.add_knowledge(cell, count).unwrap();
            assert!(prev_safes.is_subset(r.safes()));
            assert!(prev_mines.is_subset(r.mines()));
            assert_sound(&r);
            prev_safes = r.safes().clone();
            prev_mines = r.mines().clone();
        }
    }

    #[test]
    fn test_from_config_uses_dimensions() {
        let config = BoardConfig::from_json_str(r#"{"n_rows": 4, "n_cols": 6, "n_mines": 5}"#);
        let r = Reasoner::from_config(&config);
        assert_eq!((r.height(), r.width(), r.total_mines()), (4, 6, 5));
    }
}
