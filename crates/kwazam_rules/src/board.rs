//! The board: a fixed grid of cells and the only record of piece positions.
//!
//! The board executes moves and announces two kinds of events to
//! registered listeners:
//!
//! - **capture**: fired with the captured piece *before* the moving piece lands.
//! - **vertical edge**: fired with the moved piece *after* it lands on the
//!   top or bottom row. The landed piece itself reacts first (a Ram turns
//!   around), then the listeners see the updated piece.

use crate::cell::Cell;
use crate::error::{MoveError, SetupError};
use crate::layout::Layout;
use crate::piece::Piece;
use crate::player::Player;
use crate::position::Position;
use tracing::{debug, info, instrument};

/// Number of rows on a Kwazam board.
pub const BOARD_ROWS: usize = 8;

/// Number of columns on a Kwazam board.
pub const BOARD_COLUMNS: usize = 5;

/// Callback receiving a captured piece.
pub type CaptureListener = Box<dyn FnMut(&Piece)>;

/// Callback receiving a piece that just landed on the top or bottom row.
pub type VerticalEdgeListener = Box<dyn FnMut(&Piece)>;

/// The game board.
pub struct Board {
    players: Vec<Player>,
    cells: Vec<Vec<Cell>>,
    vertical_edge_listeners: Vec<VerticalEdgeListener>,
    capture_listeners: Vec<CaptureListener>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("players", &self.players)
            .field("cells", &self.cells)
            .field("vertical_edge_listeners", &self.vertical_edge_listeners.len())
            .field("capture_listeners", &self.capture_listeners.len())
            .finish()
    }
}

impl Board {
    /// Creates a board for `players` and fills it with `layout`.
    #[instrument(skip(layout), fields(player_count = players.len()))]
    pub fn new(players: Vec<Player>, layout: &dyn Layout) -> Result<Self, SetupError> {
        let mut board = Self {
            players,
            cells: empty_grid(),
            vertical_edge_listeners: Vec::new(),
            capture_listeners: Vec::new(),
        };
        layout.populate(&mut board)?;
        info!(pieces = board.pieces().count(), "Board populated");
        Ok(board)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.cells.first().map_or(0, |row| row.len())
    }

    /// Players whose pieces may appear on this board, in declaration order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns true if `pos` lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Returns true if `pos` is on the top or bottom row.
    pub fn is_vertical_edge(&self, pos: Position) -> bool {
        pos.row == 0 || pos.row == self.rows() as i32 - 1
    }

    /// Returns the piece at `pos`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfBounds`] if `pos` is off the grid.
    pub fn piece_at(&self, pos: Position) -> Result<Option<&Piece>, MoveError> {
        Ok(self.cell(pos)?.piece())
    }

    /// Returns true if a piece occupies `pos`.
    pub fn is_occupied(&self, pos: Position) -> Result<bool, MoveError> {
        Ok(!self.cell(pos)?.is_empty())
    }

    /// Returns true if `pos` holds a piece owned by `player`.
    pub fn has_friendly_piece_at(&self, pos: Position, player: &Player) -> Result<bool, MoveError> {
        Ok(self
            .piece_at(pos)?
            .is_some_and(|piece| piece.owner() == player))
    }

    /// Returns true if `pos` holds a piece owned by someone other than `player`.
    pub fn has_enemy_piece_at(&self, pos: Position, player: &Player) -> Result<bool, MoveError> {
        Ok(self
            .piece_at(pos)?
            .is_some_and(|piece| piece.owner() != player))
    }

    /// Returns true if any of `path` is occupied.
    ///
    /// Callers pass only the cells between source and destination.
    pub fn is_path_obstructed(&self, path: &[Position]) -> Result<bool, MoveError> {
        for pos in path {
            if self.is_occupied(*pos)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Moves the piece at `from` to `to`, capturing whatever enemy stands there.
    ///
    /// Returns the captured piece. Geometry is not checked here; that is
    /// the game master's job.
    ///
    /// # Errors
    ///
    /// - [`MoveError::OutOfBounds`] if either position is off the grid.
    /// - [`MoveError::NoPieceAtSource`] if `from` is empty.
    /// - [`MoveError::IllegalMove`] if `to` holds a piece of the same owner.
    ///
    /// The board is unchanged when an error is returned.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Result<Option<Piece>, MoveError> {
        self.move_piece_with(from, to, |_| {})
    }

    /// Like [`Board::move_piece`], with `on_capture` called on the captured
    /// piece right after the capture listeners and before the mover lands.
    #[instrument(skip(self, on_capture), fields(%from, %to))]
    pub(crate) fn move_piece_with(
        &mut self,
        from: Position,
        to: Position,
        on_capture: impl FnOnce(&Piece),
    ) -> Result<Option<Piece>, MoveError> {
        let (from_row, from_column) = self.index(from).ok_or(MoveError::OutOfBounds(from))?;
        let (to_row, to_column) = self.index(to).ok_or(MoveError::OutOfBounds(to))?;

        let owner = self.cells[from_row][from_column]
            .piece()
            .map(|piece| piece.owner().clone())
            .ok_or(MoveError::NoPieceAtSource(from))?;
        if self.has_friendly_piece_at(to, &owner)? {
            debug!("Destination holds a friendly piece");
            return Err(MoveError::IllegalMove { from, to });
        }

        let captured = self.cells[to_row][to_column].take();
        if let Some(captured) = &captured {
            info!(captured = %captured.token(), "Piece captured");
            for listener in &mut self.capture_listeners {
                listener(captured);
            }
            on_capture(captured);
        }

        let Some(piece) = self.cells[from_row][from_column].take() else {
            return Err(MoveError::NoPieceAtSource(from));
        };
        self.cells[to_row][to_column].place(piece);
        debug!("Piece moved");

        if self.is_vertical_edge(to) {
            if let Some(landed) = self.cells[to_row][to_column].piece_mut() {
                landed.on_vertical_edge_reached();
                for listener in &mut self.vertical_edge_listeners {
                    listener(&*landed);
                }
            }
        }

        Ok(captured)
    }

    /// Puts `piece` on `pos`, returning the piece it displaced.
    ///
    /// Used by layouts and by callers setting up positions by hand.
    ///
    /// # Errors
    ///
    /// Fails if `pos` is off the grid or the owner is not a declared player.
    pub fn place_piece(&mut self, pos: Position, piece: Piece) -> Result<Option<Piece>, SetupError> {
        if !self.players.contains(piece.owner()) {
            return Err(SetupError::UnknownPlayer(piece.owner().id().to_string()));
        }
        let (row, column) = self.index(pos).ok_or(SetupError::OutOfBounds(pos))?;
        Ok(self.cells[row][column].place(piece))
    }

    /// Clears `pos`, returning the removed piece. Empty cells are left alone.
    pub fn remove_piece(&mut self, pos: Position) -> Result<Option<Piece>, MoveError> {
        let (row, column) = self.index(pos).ok_or(MoveError::OutOfBounds(pos))?;
        Ok(self.cells[row][column].take())
    }

    /// Replaces every switchable piece with its counterpart, in place.
    ///
    /// Returns how many pieces were switched.
    #[instrument(skip(self))]
    pub fn switch_pieces(&mut self) -> usize {
        let mut switched = 0;
        for cell in self.cells.iter_mut().flatten() {
            if let Some(counterpart) = cell.piece().and_then(Piece::switched_piece) {
                cell.place(counterpart);
                switched += 1;
            }
        }
        info!(switched, "Switched Tor and Xor pieces");
        switched
    }

    /// Registers a listener for captures.
    pub fn register_capture_listener(&mut self, listener: impl FnMut(&Piece) + 'static) {
        self.capture_listeners.push(Box::new(listener));
    }

    /// Registers a listener for pieces landing on the top or bottom row.
    pub fn register_vertical_edge_listener(&mut self, listener: impl FnMut(&Piece) + 'static) {
        self.vertical_edge_listeners.push(Box::new(listener));
    }

    /// Returns the grid, row-major.
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Replaces the whole grid.
    ///
    /// # Errors
    ///
    /// Fails without touching the board if the grid is not
    /// [`BOARD_ROWS`] x [`BOARD_COLUMNS`] or a piece belongs to an
    /// undeclared player.
    #[instrument(skip(self, cells))]
    pub fn replace_cells(&mut self, cells: Vec<Vec<Cell>>) -> Result<(), SetupError> {
        validate_cells(&cells, &self.players)?;
        self.cells = cells;
        debug!("Grid replaced");
        Ok(())
    }

    /// Iterates over occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, &Piece)> {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, cell)| {
                cell.piece()
                    .map(|piece| (Position::new(row as i32, column as i32), piece))
            })
        })
    }

    /// Draws the grid as text, one line per row.
    pub fn render(&self) -> String {
        let mut out = String::from("    ");
        for column in 0..self.columns() {
            out.push_str(&format!("{:<5}", column));
        }
        for (row, cells) in self.cells.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{:<4}", row));
            for cell in cells {
                let token = cell.piece().map_or_else(|| ".".to_string(), Piece::token);
                out.push_str(&format!("{:<5}", token));
            }
        }
        out
    }

    pub(crate) fn set_players(&mut self, players: Vec<Player>) {
        self.players = players;
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(pos.row).ok()?;
        let column = usize::try_from(pos.column).ok()?;
        (row < self.rows() && column < self.cells[row].len()).then_some((row, column))
    }

    fn cell(&self, pos: Position) -> Result<&Cell, MoveError> {
        let (row, column) = self.index(pos).ok_or(MoveError::OutOfBounds(pos))?;
        Ok(&self.cells[row][column])
    }
}

/// Checks grid dimensions and that every piece owner is in `players`.
pub(crate) fn validate_cells(cells: &[Vec<Cell>], players: &[Player]) -> Result<(), SetupError> {
    let mismatch = |columns| SetupError::DimensionMismatch {
        expected_rows: BOARD_ROWS,
        expected_columns: BOARD_COLUMNS,
        rows: cells.len(),
        columns,
    };
    if cells.len() != BOARD_ROWS {
        return Err(mismatch(cells.first().map_or(0, Vec::len)));
    }
    if let Some(row) = cells.iter().find(|row| row.len() != BOARD_COLUMNS) {
        return Err(mismatch(row.len()));
    }
    for piece in cells.iter().flatten().filter_map(Cell::piece) {
        if !players.contains(piece.owner()) {
            return Err(SetupError::UnknownPlayer(piece.owner().id().to_string()));
        }
    }
    Ok(())
}

fn empty_grid() -> Vec<Vec<Cell>> {
    (0..BOARD_ROWS)
        .map(|_| (0..BOARD_COLUMNS).map(|_| Cell::new()).collect())
        .collect()
}
