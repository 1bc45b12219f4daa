//! Error types.

use crate::types::Cell;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Contract violations rejected by [`Reasoner::add_knowledge`](crate::reasoner::Reasoner::add_knowledge).
///
/// The reasoner's state is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("cell {0} has already been opened")]
    AlreadyOpened(Cell),

    #[error("cell {0} is known to be a mine")]
    KnownMine(Cell),

    /// The reported count cannot be reconciled with what is already known
    /// about the neighborhood.
    #[error("count {count} at {cell} is outside the feasible range {min}..={max}")]
    CountOutOfRange {
        cell: Cell,
        count: usize,
        min: usize,
        max: usize,
    },

    /// Closure over the observation at `0` proved something impossible,
    /// such as a cell that must be both safe and a mine.
    #[error("observation at {0} contradicts earlier knowledge")]
    Contradiction(Cell),
}

/// Failures while reading the board state file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse board state: {0}")]
    Parse(#[from] serde_json::Error),
}
