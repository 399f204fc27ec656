//! Circular player order.

use crate::error::SetupError;
use crate::player::Player;
use tracing::{debug, instrument};

/// Ordered ring of active players with a pointer to whose turn it is.
///
/// Never empty: construction rejects an empty list and removal refuses to
/// drop the last player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    players: Vec<Player>,
    current: usize,
}

impl Rotation {
    /// Creates a rotation starting with the first player.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptyRotation`] if `players` is empty.
    pub fn new(players: Vec<Player>) -> Result<Self, SetupError> {
        if players.is_empty() {
            return Err(SetupError::EmptyRotation);
        }
        Ok(Self { players, current: 0 })
    }

    /// Returns the player whose turn it is.
    pub fn current(&self) -> &Player {
        &self.players[self.current]
    }

    /// Active players in turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of active players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns true if the rotation has no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Returns true if `player` is still in the rotation.
    pub fn contains(&self, player: &Player) -> bool {
        self.players.contains(player)
    }

    /// Moves the pointer to the next player, wrapping around.
    #[instrument(skip(self))]
    pub fn advance(&mut self) -> &Player {
        self.current = (self.current + 1) % self.players.len();
        debug!(current = %self.current(), "Rotation advanced");
        self.current()
    }

    /// Makes `player` the current player.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnknownPlayer`] if `player` is not in the rotation.
    pub fn set_current(&mut self, player: &Player) -> Result<(), SetupError> {
        self.current = self
            .players
            .iter()
            .position(|p| p == player)
            .ok_or_else(|| SetupError::UnknownPlayer(player.id().to_string()))?;
        Ok(())
    }

    /// Removes `player`, keeping the pointer on the same player when possible.
    ///
    /// If the current player is removed, the pointer moves to whoever came
    /// after them. Returns false if the player was absent or is the last one.
    #[instrument(skip(self))]
    pub fn remove(&mut self, player: &Player) -> bool {
        if self.players.len() <= 1 {
            return false;
        }
        let Some(index) = self.players.iter().position(|p| p == player) else {
            return false;
        };
        self.players.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        self.current %= self.players.len();
        debug!(remaining = self.players.len(), "Player removed from rotation");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation(ids: &[&str]) -> Rotation {
        Rotation::new(ids.iter().map(|id| Player::new(*id)).collect()).unwrap()
    }

    #[test]
    fn test_empty_rotation_rejected() {
        assert_eq!(Rotation::new(vec![]), Err(SetupError::EmptyRotation));
    }

    #[test]
    fn test_advance_wraps() {
        let mut r = rotation(&["1", "2", "3"]);
        assert_eq!(r.current().id(), "1");
        assert_eq!(r.advance().id(), "2");
        assert_eq!(r.advance().id(), "3");
        assert_eq!(r.advance().id(), "1");
    }

    #[test]
    fn test_remove_before_current_keeps_pointer() {
        let mut r = rotation(&["1", "2", "3"]);
        r.advance();
        r.advance();
        assert!(r.remove(&Player::new("1")));
        assert_eq!(r.current().id(), "3");
        assert_eq!(r.advance().id(), "2");
    }

    #[test]
    fn test_remove_current_moves_to_successor() {
        let mut r = rotation(&["1", "2", "3"]);
        r.advance();
        assert!(r.remove(&Player::new("2")));
        assert_eq!(r.current().id(), "3");

        let mut r = rotation(&["1", "2", "3"]);
        r.advance();
        r.advance();
        assert!(r.remove(&Player::new("3")));
        assert_eq!(r.current().id(), "1");
    }

    #[test]
    fn test_last_player_is_never_removed() {
        let mut r = rotation(&["1", "2"]);
        assert!(r.remove(&Player::new("2")));
        assert!(!r.remove(&Player::new("1")));
        assert!(!r.remove(&Player::new("9")));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_set_current() {
        let mut r = rotation(&["1", "2"]);
        r.set_current(&Player::new("2")).unwrap();
        assert_eq!(r.current().id(), "2");
        assert!(r.set_current(&Player::new("7")).is_err());
    }
}
