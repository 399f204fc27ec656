//! Turn, capture and win state machine.
//!
//! The game master owns the board and the player rotation. It validates
//! a move against the current player and the piece's geometry, hands the
//! mutation to the board, and reacts to captures: losing a critical piece
//! removes a player from the rotation, and when one player is left the
//! game is over.
//!
//! ```text
//! InProgress --move_piece(valid)--------------------------> InProgress
//! InProgress --critical capture, one player left----------> GameOver(winner)
//! GameOver   --anything-----------------------------------> GameOver
//! ```

use crate::board::Board;
use crate::cell::Cell;
use crate::error::{MoveError, SetupError};
use crate::invariants::{BoardInvariants, InvariantSet};
use crate::layout::{EmptyLayout, KwazamLayout};
use crate::piece::Piece;
use crate::player::Player;
use crate::position::Position;
use crate::rotation::Rotation;
use crate::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Callback receiving the winner.
pub type WinListener = Box<dyn FnMut(&Player)>;

/// Whether the game is still being played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are accepted.
    InProgress,
    /// A player won. Terminal until the caller starts a new session.
    GameOver {
        /// The last player left in the rotation.
        winner: Player,
    },
}

/// Game-specific rule hooks layered on the generic engine.
pub trait Ruleset {
    /// Called after the rotation advanced and the turn counter was incremented.
    fn on_turn_advanced(&self, _turn_count: u32, _board: &mut Board) {}
}

/// No extra rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl Ruleset for StandardRules {}

/// Kwazam Chess rules: Tor and Xor switch every `switch_interval` turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KwazamRules {
    switch_interval: u32,
}

impl KwazamRules {
    /// Turns between switches in the standard game.
    pub const DEFAULT_SWITCH_INTERVAL: u32 = 2;

    /// Creates the rules with a custom interval. Zero disables switching.
    pub fn new(switch_interval: u32) -> Self {
        Self { switch_interval }
    }

    /// Turns between switches.
    pub fn switch_interval(&self) -> u32 {
        self.switch_interval
    }
}

impl Default for KwazamRules {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SWITCH_INTERVAL)
    }
}

impl Ruleset for KwazamRules {
    fn on_turn_advanced(&self, turn_count: u32, board: &mut Board) {
        if self.switch_interval > 0 && turn_count % self.switch_interval == 0 {
            board.switch_pieces();
        }
    }
}

/// Referee for one game session.
pub struct GameMaster<R = KwazamRules> {
    board: Board,
    rotation: Rotation,
    turn_count: u32,
    status: GameStatus,
    win_listeners: Vec<WinListener>,
    rules: R,
}

impl<R: std::fmt::Debug> std::fmt::Debug for GameMaster<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMaster")
            .field("board", &self.board)
            .field("rotation", &self.rotation)
            .field("turn_count", &self.turn_count)
            .field("status", &self.status)
            .field("win_listeners", &self.win_listeners.len())
            .field("rules", &self.rules)
            .finish()
    }
}

impl GameMaster<KwazamRules> {
    /// Starts a standard Kwazam game. The first player moves first.
    ///
    /// # Errors
    ///
    /// Fails if fewer than two players are given.
    #[instrument(skip(players), fields(player_count = players.len()))]
    pub fn kwazam(players: Vec<Player>, rules: KwazamRules) -> Result<Self, SetupError> {
        let board = Board::new(players, &KwazamLayout)?;
        Self::new(board, rules)
    }
}

impl<R: Ruleset> GameMaster<R> {
    /// Creates a game on `board`, with the board's players in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptyRotation`] if the board declares no players.
    pub fn new(board: Board, rules: R) -> Result<Self, SetupError> {
        let rotation = Rotation::new(board.players().to_vec())?;
        info!(first = %rotation.current(), "Game started");
        Ok(Self {
            board,
            rotation,
            turn_count: 0,
            status: GameStatus::InProgress,
            win_listeners: Vec::new(),
            rules,
        })
    }

    /// Rebuilds a game from a snapshot, on an otherwise empty board.
    ///
    /// The board declares the snapshot's active players plus the owners of
    /// every piece left on the grid, so eliminated players' pieces load too.
    pub fn from_snapshot(snapshot: GameSnapshot, rules: R) -> Result<Self, SetupError> {
        let declared = declared_union(&snapshot.players, &piece_owners(&snapshot.cells));
        let board = Board::new(declared, &EmptyLayout)?;
        let mut game = Self::new(board, rules)?;
        game.restore(snapshot)?;
        Ok(game)
    }

    /// Moves a piece for the current player.
    ///
    /// Returns the captured piece, if any. The turn does not advance; call
    /// [`GameMaster::advance_turn`] once the move is accepted.
    ///
    /// # Errors
    ///
    /// - [`MoveError::GameOver`] once a player has won.
    /// - [`MoveError::OutOfBounds`] if a position is off the grid.
    /// - [`MoveError::NoPieceAtSource`] if `from` is empty.
    /// - [`MoveError::NotCurrentPlayersPiece`] if the piece is someone else's.
    /// - [`MoveError::IllegalMove`] if the geometry does not fit, the path is
    ///   blocked for a piece that cannot jump, or the destination holds a
    ///   friendly piece.
    ///
    /// Nothing changes when an error is returned.
    #[instrument(skip(self), fields(%from, %to, player = %self.rotation.current()))]
    pub fn move_piece(&mut self, from: Position, to: Position) -> Result<Option<Piece>, MoveError> {
        if !matches!(self.status, GameStatus::InProgress) {
            return Err(MoveError::GameOver);
        }
        if !self.board.contains(to) {
            return Err(MoveError::OutOfBounds(to));
        }

        let current = self.rotation.current().clone();
        let piece = self
            .board
            .piece_at(from)?
            .cloned()
            .ok_or(MoveError::NoPieceAtSource(from))?;
        if piece.owner() != &current {
            debug!(owner = %piece.owner(), "Piece belongs to another player");
            return Err(MoveError::NotCurrentPlayersPiece {
                from,
                owner: piece.owner().id().to_string(),
                current: current.id().to_string(),
            });
        }

        let illegal = MoveError::IllegalMove { from, to };
        let Some(path) = piece.potential_path(from, to) else {
            return Err(illegal);
        };
        let Some((destination, between)) = path.split_last() else {
            return Err(illegal);
        };
        let obstructed = !piece.can_jump() && self.board.is_path_obstructed(between)?;
        if obstructed || self.board.has_friendly_piece_at(*destination, &current)? {
            debug!(obstructed, "Move rejected");
            return Err(illegal);
        }

        // Eliminations settle before the mover lands and edge events fire.
        let rotation = &mut self.rotation;
        let status = &mut self.status;
        let win_listeners = &mut self.win_listeners;
        let captured = self.board.move_piece_with(from, to, |captured| {
            settle_capture(rotation, status, win_listeners, captured);
        })?;
        self.check_invariants();
        info!("Move applied");
        Ok(captured)
    }

    /// Passes the turn to the next player and applies the ruleset's turn hook.
    ///
    /// Does nothing once the game is over.
    #[instrument(skip(self), fields(turn_count = self.turn_count))]
    pub fn advance_turn(&mut self) {
        if !matches!(self.status, GameStatus::InProgress) {
            debug!("Game over, turn not advanced");
            return;
        }
        self.rotation.advance();
        self.turn_count = self.turn_count.saturating_add(1);
        self.rules.on_turn_advanced(self.turn_count, &mut self.board);
        info!(current = %self.rotation.current(), turn_count = self.turn_count, "Turn advanced");
    }

    /// Reacts to a captured piece.
    ///
    /// Capturing a critical piece eliminates its owner. When one player is
    /// left, the game ends and win listeners are notified once.
    ///
    /// [`GameMaster::move_piece`] already does this for its own captures.
    pub fn on_capture(&mut self, piece: &Piece) {
        settle_capture(
            &mut self.rotation,
            &mut self.status,
            &mut self.win_listeners,
            piece,
        );
    }

    /// Registers a listener for the end of the game.
    pub fn register_win_listener(&mut self, listener: impl FnMut(&Player) + 'static) {
        self.win_listeners.push(Box::new(listener));
    }

    /// Registers a listener for captured pieces on the board.
    pub fn register_capture_listener(&mut self, listener: impl FnMut(&Piece) + 'static) {
        self.board.register_capture_listener(listener);
    }

    /// Registers a listener for pieces landing on the top or bottom row.
    pub fn register_vertical_edge_listener(&mut self, listener: impl FnMut(&Piece) + 'static) {
        self.board.register_vertical_edge_listener(listener);
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> &Player {
        self.rotation.current()
    }

    /// Returns the active players in turn order.
    pub fn players(&self) -> &[Player] {
        self.rotation.players()
    }

    /// Returns true if `player` has not been eliminated.
    pub fn is_active(&self, player: &Player) -> bool {
        self.rotation.contains(player)
    }

    /// Returns the number of turns advanced so far.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Returns the game status.
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// Returns the winner once the game is over.
    pub fn winner(&self) -> Option<&Player> {
        match &self.status {
            GameStatus::GameOver { winner } => Some(winner),
            GameStatus::InProgress => None,
        }
    }

    /// Returns the ruleset.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Overwrites the turn counter.
    pub fn set_turn_count(&mut self, turn_count: u32) {
        self.turn_count = turn_count;
    }

    /// Replaces the rotation; the first player becomes current.
    ///
    /// New players are added to the board's declared players.
    pub fn set_players(&mut self, players: Vec<Player>) -> Result<(), SetupError> {
        let rotation = Rotation::new(players)?;
        self.board
            .set_players(declared_union(self.board.players(), rotation.players()));
        self.rotation = rotation;
        self.refresh_status();
        Ok(())
    }

    /// Makes `player` the current player.
    pub fn set_current_player(&mut self, player: &Player) -> Result<(), SetupError> {
        self.rotation.set_current(player)
    }

    /// Copies the whole game state out.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(
            self.turn_count,
            self.rotation.players().to_vec(),
            self.rotation.current().clone(),
            self.board.cells().to_vec(),
        )
    }

    /// Replaces the whole game state with `snapshot`.
    ///
    /// Everything is validated before anything changes; registered
    /// listeners are kept.
    #[instrument(skip(self, snapshot), fields(turn_count = snapshot.turn_count))]
    pub fn restore(&mut self, snapshot: GameSnapshot) -> Result<(), SetupError> {
        let GameSnapshot {
            turn_count,
            players,
            current_player,
            cells,
        } = snapshot;

        let mut rotation = Rotation::new(players)?;
        rotation.set_current(&current_player)?;
        let declared = declared_union(
            &declared_union(self.board.players(), rotation.players()),
            &piece_owners(&cells),
        );
        crate::board::validate_cells(&cells, &declared)?;

        self.board.set_players(declared);
        self.board.replace_cells(cells)?;
        self.rotation = rotation;
        self.turn_count = turn_count;
        self.refresh_status();
        info!(current = %self.rotation.current(), "Game restored");
        Ok(())
    }

    /// Sprite label per cell, row-major.
    ///
    /// Labels read `{kind}_{color}_piece`, with `_flipped` appended for a
    /// Ram facing down. The first declared player is blue, everyone else red.
    pub fn cell_labels(&self) -> Vec<Vec<Option<String>>> {
        let first = self.board.players().first();
        self.board
            .cells()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.piece().map(|piece| {
                            let color = if Some(piece.owner()) == first {
                                "blue"
                            } else {
                                "red"
                            };
                            let flipped = if piece.facing_up() == Some(false) {
                                "_flipped"
                            } else {
                                ""
                            };
                            format!(
                                "{}_{}_piece{}",
                                piece.kind().to_string().to_lowercase(),
                                color,
                                flipped
                            )
                        })
                    })
                    .collect()
            })
            .collect()
    }

    fn refresh_status(&mut self) {
        self.status = if self.rotation.len() == 1 {
            GameStatus::GameOver {
                winner: self.rotation.current().clone(),
            }
        } else {
            GameStatus::InProgress
        };
    }

    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        if let Err(violations) = BoardInvariants::check_all(&self.board) {
            for violation in &violations {
                warn!(violation = %violation.description, "Board invariant violated");
            }
        }
    }
}

/// Applies a capture: losing a critical piece eliminates its owner, and the
/// last player standing wins.
#[instrument(skip_all, fields(captured = %piece.token()))]
fn settle_capture(
    rotation: &mut Rotation,
    status: &mut GameStatus,
    win_listeners: &mut [WinListener],
    piece: &Piece,
) {
    if !piece.is_critical() || !matches!(status, GameStatus::InProgress) {
        return;
    }
    if rotation.remove(piece.owner()) {
        info!(eliminated = %piece.owner(), "Player eliminated");
    }
    if rotation.len() == 1 {
        let winner = rotation.current().clone();
        info!(%winner, "Game over");
        *status = GameStatus::GameOver {
            winner: winner.clone(),
        };
        for listener in win_listeners.iter_mut() {
            listener(&winner);
        }
    }
}

/// Owners of the pieces on `cells`, in row-major order of first appearance.
fn piece_owners(cells: &[Vec<Cell>]) -> Vec<Player> {
    let mut owners: Vec<Player> = Vec::new();
    for piece in cells.iter().flatten().filter_map(Cell::piece) {
        if !owners.contains(piece.owner()) {
            owners.push(piece.owner().clone());
        }
    }
    owners
}

/// Declared players followed by any newcomers, without duplicates.
fn declared_union(declared: &[Player], players: &[Player]) -> Vec<Player> {
    let mut union = declared.to_vec();
    for player in players {
        if !union.contains(player) {
            union.push(player.clone());
        }
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Vec<Player> {
        vec![Player::new("1"), Player::new("2")]
    }

    #[test]
    fn test_kwazam_rules_interval() {
        let mut board = Board::new(players(), &KwazamLayout).unwrap();
        let rules = KwazamRules::default();
        rules.on_turn_advanced(1, &mut board);
        assert_eq!(
            board.piece_at(Position::new(0, 0)).unwrap().unwrap().kind(),
            crate::PieceKind::Tor
        );
        rules.on_turn_advanced(2, &mut board);
        assert_eq!(
            board.piece_at(Position::new(0, 0)).unwrap().unwrap().kind(),
            crate::PieceKind::Xor
        );
    }

    #[test]
    fn test_zero_interval_never_switches() {
        let mut board = Board::new(players(), &KwazamLayout).unwrap();
        let rules = KwazamRules::new(0);
        for turn in 1..=4 {
            rules.on_turn_advanced(turn, &mut board);
        }
        assert_eq!(
            board.piece_at(Position::new(7, 4)).unwrap().unwrap().kind(),
            crate::PieceKind::Tor
        );
    }

    #[test]
    fn test_declared_union_keeps_order() {
        let union = declared_union(&players(), &[Player::new("3"), Player::new("1")]);
        let ids: Vec<&str> = union.iter().map(Player::id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_cell_labels() {
        let game = GameMaster::kwazam(players(), KwazamRules::default()).unwrap();
        let labels = game.cell_labels();
        assert_eq!(labels[0][0].as_deref(), Some("tor_red_piece"));
        assert_eq!(labels[1][2].as_deref(), Some("ram_red_piece_flipped"));
        assert_eq!(labels[6][2].as_deref(), Some("ram_blue_piece"));
        assert_eq!(labels[7][2].as_deref(), Some("sau_blue_piece"));
        assert_eq!(labels[3][3], None);
    }
}
