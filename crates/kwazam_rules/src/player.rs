//! Players.

use serde::{Deserialize, Serialize};

/// A participant, identified by id.
///
/// Two players are the same player exactly when their ids match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
#[display("{}", id)]
pub struct Player {
    id: String,
}

impl Player {
    /// Creates a player with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the player's id.
    pub fn id(&self) -> &str {
        &self.id
    }
}
