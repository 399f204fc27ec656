//! A single square of the board.

use crate::piece::Piece;
use serde::{Deserialize, Serialize};

/// Holds at most one piece.
///
/// A cell does not know its own coordinates; [`crate::Board`] owns that mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    piece: Option<Piece>,
}

impl Cell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cell holding `piece`.
    pub fn with_piece(piece: Piece) -> Self {
        Self { piece: Some(piece) }
    }

    /// Returns the piece, if any.
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    /// Returns the piece mutably, if any.
    pub fn piece_mut(&mut self) -> Option<&mut Piece> {
        self.piece.as_mut()
    }

    /// Returns true if no piece is here.
    pub fn is_empty(&self) -> bool {
        self.piece.is_none()
    }

    /// Removes and returns the piece, leaving the cell empty.
    pub fn take(&mut self) -> Option<Piece> {
        self.piece.take()
    }

    /// Puts `piece` here, returning whatever was displaced.
    pub fn place(&mut self, piece: Piece) -> Option<Piece> {
        self.piece.replace(piece)
    }
}

impl From<Option<Piece>> for Cell {
    fn from(piece: Option<Piece>) -> Self {
        Self { piece }
    }
}
