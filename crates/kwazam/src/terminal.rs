//! Line-driven terminal game loop.
//!
//! Reads one command per line, applies it to the game and redraws the
//! board. The turn advances after every accepted move.

use crate::config::GameConfig;
use crate::save_file::{self, SaveFormat};
use anyhow::Result;
use kwazam_rules::{GameMaster, MoveError, Piece, Player, Position};
use std::io::{BufRead, Write};
use tracing::{debug, info, instrument, warn};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Move the piece on the first cell to the second.
    Move {
        /// Source cell.
        from: Position,
        /// Destination cell.
        to: Position,
    },
    /// Write the game to the configured save path.
    Save,
    /// Replace the game with the one at the configured save path.
    Load,
    /// Print the command list.
    Help,
    /// Leave the game.
    Quit,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A player won.
    Won(Player),
    /// The user quit or input ran out.
    Abandoned,
}

const HELP: &str = "Commands:
  r c r c   move the piece at (r, c) to (r, c), e.g. `6 0 5 0`
  save      save the game
  load      load the saved game
  help      show this list
  quit      leave";

/// Parses one input line.
///
/// Returns a message for the user when the line is not understood.
pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "save" => return Ok(Input::Save),
        "load" => return Ok(Input::Load),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" | "q" => return Ok(Input::Quit),
        _ => {}
    }

    let numbers: Vec<i32> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| format!("Not a command: '{}'. Type `help`.", line))?;
    match numbers[..] {
        [from_row, from_column, to_row, to_column] => Ok(Input::Move {
            from: Position::new(from_row, from_column),
            to: Position::new(to_row, to_column),
        }),
        _ => Err(format!("A move needs four numbers, got {}", numbers.len())),
    }
}

/// User-facing explanation of a rejected move.
///
/// Errors about the source cell point at `from`, errors about the move
/// itself point at `to`.
pub fn describe_error(err: &MoveError) -> String {
    match err {
        MoveError::NoPieceAtSource(from) => format!("There is no piece at {}.", from),
        MoveError::NotCurrentPlayersPiece { from, owner, .. } => {
            format!("The piece at {} belongs to player {}.", from, owner)
        }
        MoveError::IllegalMove { to, .. } => format!("That piece cannot move to {}.", to),
        MoveError::OutOfBounds(pos) => format!("{} is off the board.", pos),
        MoveError::GameOver => "The game is over.".to_string(),
    }
}

/// Interactive session over any line source and sink.
pub struct Session<R, W> {
    game: GameMaster,
    config: GameConfig,
    format: SaveFormat,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a session for a fresh game.
    pub fn new(config: GameConfig, format: SaveFormat, input: R, output: W) -> Result<Self> {
        let mut game = GameMaster::kwazam(config.player_list(), config.rules())?;
        game.register_capture_listener(|piece: &Piece| {
            info!(captured = %piece.token(), owner = %piece.owner(), "Capture");
        });
        game.register_vertical_edge_listener(|piece: &Piece| {
            debug!(piece = %piece.token(), "Piece reached the far edge");
        });
        game.register_win_listener(|winner: &Player| {
            info!(%winner, "Winner announced");
        });
        Ok(Self {
            game,
            config,
            format,
            input,
            output,
        })
    }

    /// Returns the game being played.
    pub fn game(&self) -> &GameMaster {
        &self.game
    }

    /// Runs until someone wins, the user quits or input ends.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<Outcome> {
        self.draw()?;
        loop {
            if let Some(winner) = self.game.winner() {
                let winner = winner.clone();
                writeln!(self.output, "Player {} wins!", winner)?;
                return Ok(Outcome::Won(winner));
            }
            write!(self.output, "Player {}> ", self.game.current_player())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                info!("Input closed");
                return Ok(Outcome::Abandoned);
            }
            if line.trim().is_empty() {
                continue;
            }

            match parse_input(&line) {
                Ok(Input::Quit) => return Ok(Outcome::Abandoned),
                Ok(input) => self.apply(input)?,
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }
    }

    fn apply(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Move { from, to } => match self.game.move_piece(from, to) {
                Ok(captured) => {
                    if let Some(piece) = captured {
                        writeln!(self.output, "Captured {}.", piece.token())?;
                    }
                    self.game.advance_turn();
                    self.draw()?;
                }
                Err(err) => {
                    if !err.is_recoverable() {
                        warn!(%err, "Move outside the board");
                    }
                    writeln!(self.output, "{}", describe_error(&err))?;
                }
            },
            Input::Save => {
                let path = self.config.save_path();
                match save_file::save(&self.game.snapshot(), path, self.format) {
                    Ok(()) => writeln!(self.output, "Saved to {}.", path.display())?,
                    Err(err) => writeln!(self.output, "Could not save: {}", err.message)?,
                }
            }
            Input::Load => {
                let loaded = save_file::load(self.config.save_path(), self.format)
                    .and_then(|snapshot| self.game.restore(snapshot).map_err(Into::into));
                match loaded {
                    Ok(()) => self.draw()?,
                    Err(err) => writeln!(self.output, "Could not load: {}", err.message)?,
                }
            }
            Input::Help => writeln!(self.output, "{}", HELP)?,
            Input::Quit => {}
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", self.game.board().render())?;
        writeln!(
            self.output,
            "Turn {} - player {} to move",
            self.game.turn_count(),
            self.game.current_player()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(script: &str, config: GameConfig) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        Session::new(
            config,
            SaveFormat::Text,
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
        )
        .unwrap()
    }

    fn output(session: &Session<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(session.output.clone()).unwrap()
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_input("6 0 5 0"),
            Ok(Input::Move {
                from: Position::new(6, 0),
                to: Position::new(5, 0)
            })
        );
        assert_eq!(
            parse_input(" 7,1, 5,0 \n"),
            Ok(Input::Move {
                from: Position::new(7, 1),
                to: Position::new(5, 0)
            })
        );
        assert_eq!(parse_input("SAVE"), Ok(Input::Save));
        assert_eq!(parse_input("q"), Ok(Input::Quit));
        assert!(parse_input("6 0 5").is_err());
        assert!(parse_input("castle").is_err());
    }

    #[test]
    fn test_describe_error_points_at_cells() {
        let from = Position::new(6, 0);
        let to = Position::new(4, 0);
        assert!(describe_error(&MoveError::IllegalMove { from, to }).contains("(4, 0)"));
        assert!(describe_error(&MoveError::NoPieceAtSource(from)).contains("(6, 0)"));
    }

    #[test]
    fn test_moves_advance_turn() {
        let mut session = session("6 0 5 0\n1 0 2 0\n", GameConfig::default());
        assert_eq!(session.run().unwrap(), Outcome::Abandoned);
        assert_eq!(session.game().turn_count(), 2);
        assert_eq!(session.game().current_player().id(), "1");
    }

    #[test]
    fn test_rejected_move_keeps_turn() {
        let mut session = session("6 0 4 0\n1 0 2 0\nquit\n", GameConfig::default());
        session.run().unwrap();
        assert_eq!(session.game().turn_count(), 0);
        let out = output(&session);
        assert!(out.contains("cannot move to (4, 0)"));
        assert!(out.contains("belongs to player 2"));
    }

    #[test]
    fn test_win_ends_session() {
        // Bottom Biz hops up to the top Sau while the top player shuffles a Ram.
        let script = "7 1 5 2\n1 0 2 0\n5 2 3 3\n2 0 3 0\n3 3 2 1\n3 0 4 0\n2 1 0 2\n";
        let mut session = session(script, GameConfig::default());
        let outcome = session.run().unwrap();
        assert_eq!(outcome, Outcome::Won(Player::new("1")));
        assert!(output(&session).contains("Player 1 wins!"));
    }

    #[test]
    fn test_save_then_load_restores_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        let config: GameConfig =
            toml::from_str(&format!("save_path = {:?}\n", path.display().to_string())).unwrap();

        let mut session = session("6 0 5 0\nsave\n1 0 2 0\nload\n", config);
        session.run().unwrap();
        assert_eq!(session.game().turn_count(), 1);
        assert_eq!(session.game().current_player().id(), "2");
        assert!(session.game().board().piece_at(Position::new(2, 0)).unwrap().is_none());
    }
}
