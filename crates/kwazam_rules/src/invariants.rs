//! Board invariants.
//!
//! Invariants are logical properties that must hold after every move.
//! The game master checks them in debug builds; tests can check them
//! directly.

use crate::board::Board;
use std::collections::HashMap;
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every piece on the board belongs to a declared player.
pub struct OwnersDeclared;

impl Invariant<Board> for OwnersDeclared {
    fn holds(board: &Board) -> bool {
        board
            .pieces()
            .all(|(_, piece)| board.players().contains(piece.owner()))
    }

    fn description() -> &'static str {
        "Every piece belongs to a declared player"
    }
}

/// No player owns more than one critical piece.
pub struct SingleCriticalPiece;

impl Invariant<Board> for SingleCriticalPiece {
    fn holds(board: &Board) -> bool {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (_, piece) in board.pieces().filter(|(_, piece)| piece.is_critical()) {
            *counts.entry(piece.owner().id()).or_default() += 1;
        }
        let valid = counts.values().all(|count| *count <= 1);
        if !valid {
            warn!(?counts, "Player holds several critical pieces");
        }
        valid
    }

    fn description() -> &'static str {
        "Each player has at most one critical piece"
    }
}

/// All board invariants as a composable set.
pub type BoardInvariants = (OwnersDeclared, SingleCriticalPiece);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{EmptyLayout, KwazamLayout};
    use crate::piece::Piece;
    use crate::player::Player;
    use crate::position::Position;

    fn players() -> Vec<Player> {
        vec![Player::new("1"), Player::new("2")]
    }

    #[test]
    fn test_starting_position_holds() {
        let board = Board::new(players(), &KwazamLayout).unwrap();
        assert!(BoardInvariants::check_all(&board).is_ok());
    }

    #[test]
    fn test_second_critical_piece_detected() {
        let mut board = Board::new(players(), &EmptyLayout).unwrap();
        let owner = Player::new("1");
        board
            .place_piece(Position::new(7, 2), Piece::sau(owner.clone()).with_critical(true))
            .unwrap();
        board
            .place_piece(Position::new(7, 3), Piece::biz(owner).with_critical(true))
            .unwrap();

        let violations = BoardInvariants::check_all(&board).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].description,
            SingleCriticalPiece::description()
        );
    }
}
