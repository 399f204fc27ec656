//! Save files: a line-oriented text format, or JSON.
//!
//! ```text
//! Game: Kwazam Chess
//! Turn Count: 4
//! Players: 1, 2
//! Current Player: 1
//!
//! TOR_2
//! BIZ_2
//! SAU_2_CRITICAL
//! ...
//! RAM_1_FACINGUP
//! EMPTY
//! ```
//!
//! One cell per line after the blank separator, row-major.

use derive_more::{Display, Error};
use kwazam_rules::{
    BOARD_COLUMNS, BOARD_ROWS, Cell, GameSnapshot, Piece, PieceKind, PieceType, Player, SetupError,
};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

const HEADER: &str = "Game: Kwazam Chess";
const EMPTY: &str = "EMPTY";
const FACING_UP: &str = "FACINGUP";
const CRITICAL: &str = "CRITICAL";

/// Index of the first cell line.
const CELL_START: usize = 5;

/// Encoding of a save file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// The line-oriented text format.
    Text,
    /// `serde_json` encoding of the snapshot.
    Json,
}

/// Save file error with location tracking.
#[derive(Debug, Display, Error)]
#[display("Save file error: {} at {}:{}", message, file, line)]
pub struct SaveFileError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SaveFileError {
    /// Creates a new save file error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for SaveFileError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<SetupError> for SaveFileError {
    #[track_caller]
    fn from(err: SetupError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for SaveFileError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

/// Encodes a snapshot in the text format.
pub fn render(snapshot: &GameSnapshot) -> String {
    let players: Vec<&str> = snapshot.players().iter().map(Player::id).collect();
    let mut out = format!(
        "{}\nTurn Count: {}\nPlayers: {}\nCurrent Player: {}\n\n",
        HEADER,
        snapshot.turn_count(),
        players.join(", "),
        snapshot.current_player().id()
    );
    for cell in snapshot.cells().iter().flatten() {
        out.push_str(&render_cell(cell));
        out.push('\n');
    }
    out
}

fn render_cell(cell: &Cell) -> String {
    let Some(piece) = cell.piece() else {
        return EMPTY.to_string();
    };
    let mut line = format!("{}_{}", piece.kind(), piece.owner().id());
    if piece.facing_up() == Some(true) {
        line.push('_');
        line.push_str(FACING_UP);
    }
    if piece.is_critical() {
        line.push('_');
        line.push_str(CRITICAL);
    }
    line
}

/// Decodes the text format.
///
/// # Errors
///
/// Returns [`SetupError::Malformed`] with a one-based line number when a
/// header is missing or a cell cannot be read, and
/// [`SetupError::UnknownPlayer`] when the current player is missing from
/// the `Players` line. Cells may name owners outside that line.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse(text: &str) -> Result<GameSnapshot, SetupError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < CELL_START {
        return Err(SetupError::malformed(lines.len(), "File ends before the board"));
    }

    let turn_count = header_value(&lines, 1, "Turn Count")?
        .parse::<u32>()
        .map_err(|e| SetupError::malformed(2, format!("Bad turn count: {}", e)))?;
    let players: Vec<Player> = header_value(&lines, 2, "Players")?
        .split(", ")
        .map(Player::new)
        .collect();
    let current_id = header_value(&lines, 3, "Current Player")?;
    let current_player = players
        .iter()
        .find(|player| player.id() == current_id)
        .cloned()
        .ok_or_else(|| SetupError::UnknownPlayer(current_id.to_string()))?;

    let mut cells = Vec::with_capacity(BOARD_ROWS * BOARD_COLUMNS);
    for (index, line) in lines.iter().enumerate().skip(CELL_START) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        cells.push(parse_cell(line, index + 1, &players)?);
    }
    if cells.len() != BOARD_ROWS * BOARD_COLUMNS {
        return Err(SetupError::malformed(
            lines.len(),
            format!(
                "Expected {} cells, found {}",
                BOARD_ROWS * BOARD_COLUMNS,
                cells.len()
            ),
        ));
    }

    let mut grid: Vec<Vec<Cell>> = Vec::with_capacity(BOARD_ROWS);
    let mut cells = cells.into_iter();
    for _ in 0..BOARD_ROWS {
        grid.push(cells.by_ref().take(BOARD_COLUMNS).collect());
    }

    debug!(turn_count, players = players.len(), "Save text parsed");
    Ok(GameSnapshot::new(turn_count, players, current_player, grid))
}

/// Returns the text after `"{key}: "` on line `index`.
fn header_value<'a>(lines: &[&'a str], index: usize, key: &str) -> Result<&'a str, SetupError> {
    lines
        .get(index)
        .and_then(|line| line.strip_prefix(key))
        .and_then(|rest| rest.strip_prefix(": "))
        .ok_or_else(|| SetupError::malformed(index + 1, format!("Expected '{}: ...'", key)))
}

fn parse_cell(line: &str, line_number: usize, players: &[Player]) -> Result<Cell, SetupError> {
    if line == EMPTY {
        return Ok(Cell::new());
    }

    let mut parts = line.split('_');
    let kind = parts
        .next()
        .and_then(|kind| PieceKind::from_str(kind).ok())
        .ok_or_else(|| SetupError::malformed(line_number, format!("Unknown piece in '{}'", line)))?;
    let owner_id = parts
        .next()
        .ok_or_else(|| SetupError::malformed(line_number, "Missing owner"))?;
    // Owners missing from the Players line were eliminated earlier.
    let owner = players
        .iter()
        .find(|player| player.id() == owner_id)
        .cloned()
        .unwrap_or_else(|| Player::new(owner_id));

    let mut facing_up = false;
    let mut critical = false;
    for modifier in parts {
        match modifier {
            FACING_UP => facing_up = true,
            CRITICAL => critical = true,
            other => {
                return Err(SetupError::malformed(
                    line_number,
                    format!("Unknown modifier '{}'", other),
                ));
            }
        }
    }

    let piece_type = match kind {
        PieceKind::Ram => PieceType::Ram { facing_up },
        PieceKind::Biz => PieceType::Biz,
        PieceKind::Sau => PieceType::Sau,
        PieceKind::Tor => PieceType::Tor,
        PieceKind::Xor => PieceType::Xor,
    };
    Ok(Cell::with_piece(
        Piece::new(owner, piece_type).with_critical(critical),
    ))
}

/// Writes `snapshot` to `path`.
#[instrument(skip(snapshot, path), fields(path = %path.as_ref().display()))]
pub fn save(
    snapshot: &GameSnapshot,
    path: impl AsRef<Path>,
    format: SaveFormat,
) -> Result<(), SaveFileError> {
    let content = match format {
        SaveFormat::Text => render(snapshot),
        SaveFormat::Json => serde_json::to_string_pretty(snapshot)?,
    };
    std::fs::write(path.as_ref(), content)?;
    info!(turn_count = snapshot.turn_count(), "Game saved");
    Ok(())
}

/// Reads a snapshot from `path`.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>, format: SaveFormat) -> Result<GameSnapshot, SaveFileError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let snapshot = match format {
        SaveFormat::Text => parse(&content)?,
        SaveFormat::Json => serde_json::from_str(&content)?,
    };
    info!(turn_count = snapshot.turn_count(), "Game loaded");
    Ok(snapshot)
}
