//! Plain-data copy of a game, for persistence collaborators.

use crate::cell::Cell;
use crate::player::Player;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Everything needed to rebuild a game: turn counter, active players in
/// turn order, whose turn it is, and the full grid.
///
/// The encoding is left to the caller; the type derives serde so JSON or
/// TOML work out of the box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameSnapshot {
    /// Turns advanced so far.
    pub(crate) turn_count: u32,
    /// Active players in rotation order.
    pub(crate) players: Vec<Player>,
    /// Player to move.
    pub(crate) current_player: Player,
    /// Row-major grid.
    pub(crate) cells: Vec<Vec<Cell>>,
}
