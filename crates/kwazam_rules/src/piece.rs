//! Piece types and their movement geometry.
//!
//! Every piece answers two questions about a move: may it ignore pieces
//! standing on its path ([`Piece::can_jump`]), and which cells would it
//! pass through ([`Piece::potential_path`]). Neither looks at the board;
//! occupancy is checked by [`crate::Board`] and [`crate::GameMaster`].

use crate::player::Player;
use crate::position::Position;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Kind of a piece, without per-piece state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PieceKind {
    /// Moves one square forward and turns around at the far edge.
    Ram,
    /// Moves in an L and jumps over anything.
    Biz,
    /// Moves one square in any direction. The usual critical piece.
    Sau,
    /// Moves orthogonally any distance. Switches with Xor.
    Tor,
    /// Moves diagonally any distance. Switches with Tor.
    Xor,
}

/// Movement rule of a piece, with the state some rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PieceType {
    /// One square toward the side it faces.
    Ram {
        /// True when the Ram moves toward row 0.
        facing_up: bool,
    },
    /// Knight-like L move, ignores obstruction.
    Biz,
    /// One square in any of the eight directions.
    Sau,
    /// Straight horizontal or vertical line.
    Tor,
    /// Straight diagonal line.
    Xor,
}

impl PieceType {
    /// Returns the payload-free kind.
    pub fn kind(self) -> PieceKind {
        match self {
            PieceType::Ram { .. } => PieceKind::Ram,
            PieceType::Biz => PieceKind::Biz,
            PieceType::Sau => PieceKind::Sau,
            PieceType::Tor => PieceKind::Tor,
            PieceType::Xor => PieceKind::Xor,
        }
    }
}

/// A piece on the board.
///
/// A piece belongs to one player for its whole life. It is moved between
/// cells, never copied onto the board twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    owner: Player,
    #[serde(default)]
    critical: bool,
    piece_type: PieceType,
}

impl Piece {
    /// Creates a non-critical piece.
    pub fn new(owner: Player, piece_type: PieceType) -> Self {
        Self {
            owner,
            critical: false,
            piece_type,
        }
    }

    /// Creates a Ram facing the given way.
    pub fn ram(owner: Player, facing_up: bool) -> Self {
        Self::new(owner, PieceType::Ram { facing_up })
    }

    /// Creates a Biz.
    pub fn biz(owner: Player) -> Self {
        Self::new(owner, PieceType::Biz)
    }

    /// Creates a Sau.
    pub fn sau(owner: Player) -> Self {
        Self::new(owner, PieceType::Sau)
    }

    /// Creates a Tor.
    pub fn tor(owner: Player) -> Self {
        Self::new(owner, PieceType::Tor)
    }

    /// Creates a Xor.
    pub fn xor(owner: Player) -> Self {
        Self::new(owner, PieceType::Xor)
    }

    /// Marks the piece as its owner's critical piece (or not).
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Returns the owning player.
    pub fn owner(&self) -> &Player {
        &self.owner
    }

    /// Returns true if losing this piece eliminates its owner.
    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Returns the movement rule.
    pub fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    /// Returns the payload-free kind.
    pub fn kind(&self) -> PieceKind {
        self.piece_type.kind()
    }

    /// Returns the facing of a Ram, `None` for every other kind.
    pub fn facing_up(&self) -> Option<bool> {
        match self.piece_type {
            PieceType::Ram { facing_up } => Some(facing_up),
            _ => None,
        }
    }

    /// Returns true if cells between source and destination may be occupied.
    pub fn can_jump(&self) -> bool {
        matches!(self.piece_type, PieceType::Biz)
    }

    /// Computes the cells this piece passes through moving `from` -> `to`.
    ///
    /// Returns `None` when the displacement does not fit the piece's
    /// geometry. Otherwise the cells strictly between the two positions
    /// come first and `to` is always the last element, so an adjacent
    /// move yields `[to]`.
    #[instrument(level = "trace", skip(self), fields(kind = %self.kind()))]
    pub fn potential_path(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        let (dr, dc) = from.delta_to(to);
        let path = match self.piece_type {
            PieceType::Sau => (dr.abs().max(dc.abs()) == 1).then(|| vec![to]),
            PieceType::Tor => ((dr == 0) != (dc == 0)).then(|| straight_path(from, to)),
            PieceType::Xor => (dr != 0 && dr.abs() == dc.abs()).then(|| straight_path(from, to)),
            PieceType::Biz => bend_path(from, to),
            PieceType::Ram { facing_up } => {
                let forward = if facing_up { -1 } else { 1 };
                (dc == 0 && dr == forward).then(|| vec![to])
            }
        };
        if path.is_none() {
            debug!(%from, %to, "Displacement does not fit piece geometry");
        }
        path
    }

    /// Returns true for pieces that take part in the periodic switch.
    pub fn is_switchable(&self) -> bool {
        matches!(self.piece_type, PieceType::Tor | PieceType::Xor)
    }

    /// Returns the counterpart a switchable piece turns into.
    ///
    /// Tor becomes Xor and Xor becomes Tor, keeping owner and critical
    /// flag. Other kinds return `None`.
    pub fn switched_piece(&self) -> Option<Piece> {
        let piece_type = match self.piece_type {
            PieceType::Tor => PieceType::Xor,
            PieceType::Xor => PieceType::Tor,
            _ => return None,
        };
        Some(Piece {
            owner: self.owner.clone(),
            critical: self.critical,
            piece_type,
        })
    }

    /// Reacts to this piece landing on the top or bottom row.
    ///
    /// A Ram turns around; other kinds ignore the event.
    pub fn on_vertical_edge_reached(&mut self) {
        if let PieceType::Ram { facing_up } = &mut self.piece_type {
            *facing_up = !*facing_up;
            debug!(owner = %self.owner, facing_up = *facing_up, "Ram turned around");
        }
    }

    /// Short board token: kind initial, owner id, then markers.
    ///
    /// `*` marks a critical piece, `^`/`v` a Ram's facing.
    pub fn token(&self) -> String {
        let initial = match self.kind() {
            PieceKind::Ram => 'R',
            PieceKind::Biz => 'B',
            PieceKind::Sau => 'S',
            PieceKind::Tor => 'T',
            PieceKind::Xor => 'X',
        };
        let mut token = format!("{}{}", initial, self.owner.id());
        match self.facing_up() {
            Some(true) => token.push('^'),
            Some(false) => token.push('v'),
            None => {}
        }
        if self.critical {
            token.push('*');
        }
        token
    }
}

/// Steps one cell at a time along a straight or diagonal line, ending on `to`.
fn straight_path(from: Position, to: Position) -> Vec<Position> {
    let (dr, dc) = from.delta_to(to);
    let (row_step, column_step) = (dr.signum(), dc.signum());
    let steps = dr.abs().max(dc.abs());
    (1..=steps)
        .map(|i| from.offset(row_step * i, column_step * i))
        .collect()
}

/// Path of an L move: two cells along the long leg, then the destination.
fn bend_path(from: Position, to: Position) -> Option<Vec<Position>> {
    let (dr, dc) = from.delta_to(to);
    let (row_step, column_step) = (dr.signum(), dc.signum());
    match (dr.abs(), dc.abs()) {
        (2, 1) => Some(vec![
            from.offset(row_step, 0),
            from.offset(row_step * 2, 0),
            to,
        ]),
        (1, 2) => Some(vec![
            from.offset(0, column_step),
            from.offset(0, column_step * 2),
            to,
        ]),
        _ => None,
    }
}
