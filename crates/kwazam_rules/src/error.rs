//! Error types for the rules engine.
//!
//! Move errors are expected outcomes the caller reacts to (highlight a
//! cell, ignore a click). Setup errors come from building or restoring a
//! board and usually mean the input data is wrong.

use crate::position::Position;

/// Why a move was rejected.
///
/// A rejected move never mutates the board, the rotation or the turn
/// counter.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The position lies outside the grid. Indicates a caller bug.
    #[display("Position {} is outside the board", _0)]
    OutOfBounds(Position),

    /// There is no piece on the source cell.
    #[display("No piece at {}", _0)]
    NoPieceAtSource(Position),

    /// The piece on the source cell belongs to someone other than the current player.
    #[display("Piece at {} belongs to player {}, not player {}", from, owner, current)]
    NotCurrentPlayersPiece {
        /// Source cell of the attempted move.
        from: Position,
        /// Id of the piece's owner.
        owner: String,
        /// Id of the player whose turn it is.
        current: String,
    },

    /// Geometry mismatch, obstructed path or friendly-occupied destination.
    #[display("Illegal move from {} to {}", from, to)]
    IllegalMove {
        /// Source cell of the attempted move.
        from: Position,
        /// Destination cell of the attempted move.
        to: Position,
    },

    /// A player has already won; the session must be reset.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for MoveError {}

/// Payload-free classification of a [`MoveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MoveErrorKind {
    /// See [`MoveError::OutOfBounds`].
    OutOfBounds,
    /// See [`MoveError::NoPieceAtSource`].
    NoPieceAtSource,
    /// See [`MoveError::NotCurrentPlayersPiece`].
    NotCurrentPlayersPiece,
    /// See [`MoveError::IllegalMove`].
    IllegalMove,
    /// See [`MoveError::GameOver`].
    GameOver,
}

impl MoveError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> MoveErrorKind {
        match self {
            MoveError::OutOfBounds(_) => MoveErrorKind::OutOfBounds,
            MoveError::NoPieceAtSource(_) => MoveErrorKind::NoPieceAtSource,
            MoveError::NotCurrentPlayersPiece { .. } => MoveErrorKind::NotCurrentPlayersPiece,
            MoveError::IllegalMove { .. } => MoveErrorKind::IllegalMove,
            MoveError::GameOver => MoveErrorKind::GameOver,
        }
    }

    /// Returns true for the outcomes a player can cause by clicking around.
    ///
    /// `OutOfBounds` is the only kind that points at a bug in the caller.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MoveError::OutOfBounds(_))
    }
}

/// Errors raised while building a board or restoring a saved game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SetupError {
    /// A piece was placed outside the grid.
    #[display("Position {} is outside the board", _0)]
    OutOfBounds(Position),

    /// The cell grid does not have the board's dimensions.
    #[display(
        "Expected a {}x{} grid, got {} rows (first row has {} columns)",
        expected_rows,
        expected_columns,
        rows,
        columns
    )]
    DimensionMismatch {
        /// Rows the board requires.
        expected_rows: usize,
        /// Columns the board requires.
        expected_columns: usize,
        /// Rows supplied.
        rows: usize,
        /// Columns of the first mismatching row.
        columns: usize,
    },

    /// A piece or the current player references an undeclared player.
    #[display("Player {} is not part of this game", _0)]
    UnknownPlayer(String),

    /// The layout places pieces for a different number of players.
    #[display("Layout needs exactly {} players, got {}", required, found)]
    WrongPlayerCount {
        /// Players the layout needs.
        required: usize,
        /// Players declared.
        found: usize,
    },

    /// The player rotation would be empty.
    #[display("Player rotation cannot be empty")]
    EmptyRotation,

    /// Saved text could not be parsed.
    #[display("Malformed save data at line {}: {}", line, message)]
    Malformed {
        /// One-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },
}

impl std::error::Error for SetupError {}

impl SetupError {
    /// Creates a parse error for the given one-based line.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}
