//! Initial piece arrangements.

use crate::board::Board;
use crate::error::SetupError;
use crate::piece::Piece;
use crate::player::Player;
use crate::position::Position;
use tracing::instrument;

/// Fills a freshly created board with its starting pieces.
pub trait Layout {
    /// Places the starting pieces on `board`.
    ///
    /// # Errors
    ///
    /// Fails if the board does not declare the players the layout needs.
    fn populate(&self, board: &mut Board) -> Result<(), SetupError>;
}

/// Leaves the board empty. Handy for hand-built positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLayout;

impl Layout for EmptyLayout {
    fn populate(&self, _board: &mut Board) -> Result<(), SetupError> {
        Ok(())
    }
}

/// The Kwazam Chess starting position.
///
/// The first declared player sits at the bottom (rows 6-7, Rams facing
/// up), the second at the top (rows 0-1, Rams facing down). Each player's
/// Sau is their critical piece.
#[derive(Debug, Clone, Copy, Default)]
pub struct KwazamLayout;

impl Layout for KwazamLayout {
    #[instrument(skip(self, board))]
    fn populate(&self, board: &mut Board) -> Result<(), SetupError> {
        let [bottom, top] = match board.players() {
            [first, second] => [first.clone(), second.clone()],
            players => {
                return Err(SetupError::WrongPlayerCount {
                    required: 2,
                    found: players.len(),
                });
            }
        };
        let last_row = board.rows() as i32 - 1;

        back_rank(board, 0, &top, [Piece::tor, Piece::biz, sau, Piece::biz, Piece::xor])?;
        for column in 0..board.columns() as i32 {
            board.place_piece(Position::new(1, column), Piece::ram(top.clone(), false))?;
            board.place_piece(
                Position::new(last_row - 1, column),
                Piece::ram(bottom.clone(), true),
            )?;
        }
        back_rank(
            board,
            last_row,
            &bottom,
            [Piece::xor, Piece::biz, sau, Piece::biz, Piece::tor],
        )?;
        Ok(())
    }
}

fn sau(owner: Player) -> Piece {
    Piece::sau(owner).with_critical(true)
}

fn back_rank(
    board: &mut Board,
    row: i32,
    owner: &Player,
    pieces: [fn(Player) -> Piece; 5],
) -> Result<(), SetupError> {
    for (column, make) in pieces.into_iter().enumerate() {
        board.place_piece(Position::new(row, column as i32), make(owner.clone()))?;
    }
    Ok(())
}
