//! Plays a hidden board using nothing but the reasoner's proven moves.
//!
//! Guessing is left to the caller: play stops as soon as no cell is known
//! to be safe.

use crate::board::Minefield;
use crate::error::KnowledgeError;
use crate::reasoner::Reasoner;
use crate::types::Cell;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every non-mine cell was opened.
    Cleared,
    /// No unopened cell is provably safe.
    Stuck,
    /// The opened cell was a mine.
    Exploded(Cell),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayReport {
    pub outcome: Outcome,
    /// Cells opened, including the start cell.
    pub moves: usize,
}

/// Opens `start`, then keeps opening [`Reasoner::next_safe_move`] until the
/// board is cleared or no proven move remains.
///
/// `reasoner` must be sized with `field.mine_count()`, otherwise a cleared
/// board is never recognised and the game ends as [`Outcome::Stuck`].
pub fn play_by_deduction(
    reasoner: &mut Reasoner,
    field: &Minefield,
    start: Cell,
) -> Result<PlayReport, KnowledgeError> {
    let mut moves = 0;
    let mut next = Some(start);

    while let Some(cell) = next {
        if field.is_mine(cell) {
            debug!(%cell, moves, "opened a mine");
            return Ok(PlayReport { outcome: Outcome::Exploded(cell), moves: moves + 1 });
        }
        reasoner.add_knowledge(cell, field.adjacent_mines(cell))?;
        moves += 1;

        if reasoner.is_solved() {
            return Ok(PlayReport { outcome: Outcome::Cleared, moves });
        }
        next = reasoner.next_safe_move();
    }

    debug!(moves, known_mines = reasoner.mines().len(), "no provable move left");
    Ok(PlayReport { outcome: Outcome::Stuck, moves })
}
