// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;

use byteorder::{ByteOrder, LittleEndian};
use tempfile::tempdir;

use quoridor_core::{
    Action, Direction, GameState, MemoryTables, MoveOracle, PlayerBackend, Session, TableDir,
    TableKey, Wall,
};

/// Record for a simple or jumping pawn move
fn move_record(direction: Direction, jump: bool) -> u16 {
    let index = Direction::ALL.iter().position(|d| *d == direction).unwrap() as u16;
    (index << 3) | ((jump as u16) << 2) | 0b01
}

/// Record for a placement on a board of `size`
fn place_record(x: u16, y: u16, wall: Wall, size: u16) -> u16 {
    let horizontal = (wall == Wall::Horizontal) as u16;
    ((x * size + y) << 3) | (horizontal << 2) | 0b11
}

#[test]
fn memory_tables_answer_for_the_ranked_position() {
    let state = GameState::new(5, 2).unwrap();
    let key = TableKey::for_state(&state);
    let mut tables = MemoryTables::new();

    let oracle = MoveOracle::new(MemoryTables::new());
    let rank = oracle.rank(&state).unwrap();
    assert_eq!(rank, 1104);

    tables.set_record(key, rank, move_record(Direction::Up, false)).unwrap();
    let oracle = MoveOracle::new(tables);
    assert_eq!(
        oracle.suggest(&state),
        Action::Move { direction: Direction::Up, jump: false }
    );
    assert_eq!(oracle.lookup(&state).unwrap(), 0b01);
}

#[test]
fn empty_records_and_missing_tables_give_no_suggestion() {
    let mut state = GameState::new(5, 2).unwrap();
    let mut tables = MemoryTables::new();
    tables.set_record(TableKey::for_state(&state), 1104, move_record(Direction::Up, false)).unwrap();
    let oracle = MoveOracle::new(tables);

    // Player 2 to move: a different rank whose record is still zero
    assert!(state.move_pawn(Direction::Left, false));
    assert_eq!(oracle.suggest(&state), Action::Invalid);

    // A wall moves the position to layer 1, which has no table at all
    assert!(state.place(2, 2, Wall::Vertical));
    assert_eq!(oracle.suggest(&state), Action::Invalid);
    assert!(oracle.lookup(&state).is_err());
}

#[test]
fn table_files_are_read_from_disk() {
    let dir = tempdir().unwrap();
    let state = GameState::new(5, 2).unwrap();
    let key = TableKey::for_state(&state);

    let mut bytes = vec![0u8; 1250 * 2];
    LittleEndian::write_u16(&mut bytes[1104 * 2..], place_record(2, 3, Wall::Horizontal, 5));
    fs::write(dir.path().join("5x5_2w_0.bin"), &bytes).unwrap();

    let oracle = MoveOracle::new(TableDir::new(dir.path()));
    assert_eq!(oracle.source().path_for(&key), dir.path().join(key.file_name()));
    assert_eq!(
        oracle.suggest(&state),
        Action::Place { x: 2, y: 3, wall: Wall::Horizontal }
    );
}

#[test]
fn truncated_table_files_give_no_suggestion() {
    let dir = tempdir().unwrap();
    let state = GameState::new(5, 2).unwrap();
    fs::write(dir.path().join("5x5_2w_0.bin"), [0x01u8; 100]).unwrap();

    let oracle = MoveOracle::new(TableDir::new(dir.path()));
    assert_eq!(oracle.suggest(&state), Action::Invalid);

    let missing = MoveOracle::new(TableDir::new(dir.path().join("nowhere")));
    assert_eq!(missing.suggest(&state), Action::Invalid);
}

#[test]
fn suggestions_do_not_touch_the_game() {
    let state = GameState::new(5, 2).unwrap();
    let mut tables = MemoryTables::new();
    tables.set_record(TableKey::for_state(&state), 1104, move_record(Direction::Left, true)).unwrap();
    let oracle = MoveOracle::new(tables);

    let backend: &dyn PlayerBackend = &oracle;
    let before = state.clone();
    assert_eq!(
        backend.next_action(&state),
        Action::Move { direction: Direction::Left, jump: true }
    );
    assert_eq!(state, before);
}

#[test]
fn sessions_consult_the_oracle_on_a_snapshot() {
    let host = uuid::Uuid::new_v4();
    let session = Session::new(host, 5, 2).unwrap();
    let mut tables = MemoryTables::new();
    tables.set_record(
        TableKey { board_size: 5, wall_budget: 2, layer: 0 },
        1104,
        place_record(0, 0, Wall::Vertical, 5),
    )
    .unwrap();
    let oracle = MoveOracle::new(tables);

    assert_eq!(
        session.suggest(&oracle),
        Action::Place { x: 0, y: 0, wall: Wall::Vertical }
    );
    assert_eq!(session.snapshot(), GameState::new(5, 2).unwrap());
}

#[test]
fn oversized_boards_give_no_suggestion() {
    let oracle = MoveOracle::new(MemoryTables::new());

    // Layer 0 still ranks on the largest board; there is just no table
    let state = GameState::new(255, 2).unwrap();
    assert!(oracle.rank(&state).is_ok());
    assert_eq!(oracle.suggest(&state), Action::Invalid);

    let mut state = GameState::new(100, 2).unwrap();
    assert_eq!(oracle.suggest(&state), Action::Invalid);

    // Four walls on a 100x100 board make the partition too large for 64-bit ranks
    for (x, y) in [(10, 10), (20, 20), (30, 30), (40, 40)] {
        assert!(state.place(x, y, Wall::Horizontal));
    }
    assert_eq!(oracle.rank(&state), Err(quoridor_core::RankError::Overflow));
    assert_eq!(oracle.suggest(&state), Action::Invalid);
}
