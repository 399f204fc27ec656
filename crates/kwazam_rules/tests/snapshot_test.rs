//! Tests for snapshotting and restoring games.

use kwazam_rules::{
    Cell, GameMaster, GameSnapshot, GameStatus, KwazamRules, Piece, Player, Position, SetupError,
};

fn p(row: i32, column: i32) -> Position {
    Position::new(row, column)
}

fn players() -> Vec<Player> {
    vec![Player::new("1"), Player::new("2")]
}

fn played_game() -> GameMaster {
    let mut game = GameMaster::kwazam(players(), KwazamRules::default()).unwrap();
    game.move_piece(p(6, 0), p(5, 0)).unwrap();
    game.advance_turn();
    game.move_piece(p(1, 4), p(2, 4)).unwrap();
    game.advance_turn();
    game.advance_turn();
    game
}

#[test]
fn test_snapshot_captures_state() {
    let game = played_game();
    let snapshot = game.snapshot();
    assert_eq!(*snapshot.turn_count(), 3);
    assert_eq!(snapshot.players(), &players());
    assert_eq!(snapshot.current_player(), &Player::new("2"));
    assert_eq!(snapshot.cells().len(), 8);
    assert!(snapshot.cells().iter().all(|row| row.len() == 5));
}

#[test]
fn test_restore_round_trip() {
    let game = played_game();
    let snapshot = game.snapshot();

    let mut fresh = GameMaster::kwazam(players(), KwazamRules::default()).unwrap();
    fresh.restore(snapshot.clone()).unwrap();
    assert_eq!(fresh.snapshot(), snapshot);
    assert_eq!(fresh.current_player().id(), "2");

    let rebuilt = GameMaster::from_snapshot(snapshot.clone(), KwazamRules::default()).unwrap();
    assert_eq!(rebuilt.snapshot(), snapshot);
}

#[test]
fn test_json_round_trip() {
    let snapshot = played_game().snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: GameSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);
    assert!(json.contains("\"facing_up\":false"));
}

#[test]
fn test_restore_rejects_bad_dimensions() {
    let mut game = played_game();
    let before = game.snapshot();
    let mut cells = before.cells().clone();
    cells.pop();
    let bad = GameSnapshot::new(0, players(), Player::new("1"), cells);

    assert!(matches!(
        game.restore(bad),
        Err(SetupError::DimensionMismatch { rows: 7, .. })
    ));
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_restore_rejects_unknown_current_player() {
    let mut game = played_game();
    let before = game.snapshot();
    let bad = GameSnapshot::new(1, players(), Player::new("9"), before.cells().clone());

    assert_eq!(
        game.restore(bad),
        Err(SetupError::UnknownPlayer("9".to_string()))
    );
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_restore_single_player_is_game_over() {
    let mut game = played_game();
    let mut cells = vec![vec![Cell::new(); 5]; 8];
    cells[7][2] = Cell::with_piece(Piece::sau(Player::new("1")).with_critical(true));
    let snapshot = GameSnapshot::new(9, vec![Player::new("1")], Player::new("1"), cells);

    game.restore(snapshot).unwrap();
    assert_eq!(
        game.status(),
        &GameStatus::GameOver { winner: Player::new("1") }
    );
}

#[test]
fn test_restore_keeps_listeners() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut game = GameMaster::kwazam(players(), KwazamRules::default()).unwrap();
    let captures = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&captures);
    game.register_capture_listener(move |_| *counter.borrow_mut() += 1);

    let mut cells = vec![vec![Cell::new(); 5]; 8];
    cells[4][0] = Cell::with_piece(Piece::tor(Player::new("1")));
    cells[4][3] = Cell::with_piece(Piece::biz(Player::new("2")));
    game.restore(GameSnapshot::new(0, players(), Player::new("1"), cells))
        .unwrap();

    game.move_piece(p(4, 0), p(4, 3)).unwrap();
    assert_eq!(*captures.borrow(), 1);
}

#[test]
fn test_setters() {
    let mut game = GameMaster::kwazam(players(), KwazamRules::default()).unwrap();
    game.set_turn_count(11);
    game.set_current_player(&Player::new("2")).unwrap();
    assert_eq!(game.turn_count(), 11);
    assert_eq!(game.current_player().id(), "2");
    assert!(game.set_current_player(&Player::new("5")).is_err());

    game.set_players(vec![Player::new("2"), Player::new("1")]).unwrap();
    assert_eq!(game.current_player().id(), "2");
    assert_eq!(game.set_players(vec![]), Err(SetupError::EmptyRotation));
}

#[test]
fn test_finished_game_rebuilds_with_eliminated_pieces() {
    let mut board_cells = vec![vec![Cell::new(); 5]; 8];
    board_cells[1][2] = Cell::with_piece(Piece::sau(Player::new("1")).with_critical(true));
    board_cells[0][2] = Cell::with_piece(Piece::sau(Player::new("2")).with_critical(true));
    board_cells[0][4] = Cell::with_piece(Piece::ram(Player::new("2"), false));
    let start = GameSnapshot::new(0, players(), Player::new("1"), board_cells);

    let mut game = GameMaster::from_snapshot(start, KwazamRules::default()).unwrap();
    game.move_piece(p(1, 2), p(0, 2)).unwrap();
    let finished = game.snapshot();
    assert_eq!(finished.players(), &vec![Player::new("1")]);

    let rebuilt = GameMaster::from_snapshot(finished.clone(), KwazamRules::default()).unwrap();
    assert_eq!(rebuilt.snapshot(), finished);
    assert_eq!(rebuilt.winner(), Some(&Player::new("1")));
    assert!(rebuilt.board().players().contains(&Player::new("2")));
    assert!(!rebuilt.is_active(&Player::new("2")));

    let mut fresh = GameMaster::kwazam(players(), KwazamRules::default()).unwrap();
    fresh.restore(finished.clone()).unwrap();
    assert_eq!(fresh.snapshot(), finished);
}
