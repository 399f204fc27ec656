//! Kwazam rules - the rules engine for Kwazam Chess
//!
//! Kwazam Chess is a two-player chess variant on an 8 x 5 board. This
//! crate holds the game model and nothing else: no rendering, no input,
//! no file format.
//!
//! # Architecture
//!
//! - **Pieces**: five kinds, each computing its own movement path
//! - **Board**: the grid, move execution and capture/edge events
//! - **GameMaster**: turn order, move validation, eliminations and the winner
//! - **Snapshot**: plain-data copy of a game for persistence collaborators
//!
//! # Example
//!
//! ```
//! use kwazam_rules::{GameMaster, KwazamRules, Player, Position};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let players = vec![Player::new("1"), Player::new("2")];
//! let mut game = GameMaster::kwazam(players, KwazamRules::default())?;
//!
//! // First player's Ram steps forward
//! game.move_piece(Position::new(6, 0), Position::new(5, 0))?;
//! game.advance_turn();
//! assert_eq!(game.current_player().id(), "2");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod cell;
mod error;
mod game;
mod invariants;
mod layout;
mod piece;
mod player;
mod position;
mod rotation;
mod snapshot;

// Crate-level exports - Geometry and players
pub use player::Player;
pub use position::Position;

// Crate-level exports - Pieces and board
pub use board::{BOARD_COLUMNS, BOARD_ROWS, Board, CaptureListener, VerticalEdgeListener};
pub use cell::Cell;
pub use layout::{EmptyLayout, KwazamLayout, Layout};
pub use piece::{Piece, PieceKind, PieceType};

// Crate-level exports - Game flow
pub use game::{GameMaster, GameStatus, KwazamRules, Ruleset, StandardRules, WinListener};
pub use rotation::Rotation;
pub use snapshot::GameSnapshot;

// Crate-level exports - Errors and invariants
pub use error::{MoveError, MoveErrorKind, SetupError};
pub use invariants::{
    BoardInvariants, Invariant, InvariantSet, InvariantViolation, OwnersDeclared,
    SingleCriticalPiece,
};
