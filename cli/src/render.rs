// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII board rendering for the CLI.

use quoridor_core::board::WallLookup;
use quoridor_core::{Coord, Direction, GameState, Player};

/// Render the game board as ASCII art
///
/// Pawns are `1` and `2`, empty cells `.`. A `|` between two cells and a `-`
/// under a cell mark the sides cut by walls.
pub fn render_board(game_state: &GameState) -> String {
    let size = game_state.board_size() as i16;
    let walls = game_state.walls();
    let mut output = String::new();

    // Column labels
    output.push_str("  ");
    for col in 0..size {
        output.push_str(&format!(" {}", col % 10));
    }
    output.push('\n');

    for row in 0..size {
        let mut line = format!("{:2} ", row);
        for col in 0..size {
            let cell = Coord::new(row, col);
            line.push(cell_symbol(game_state, cell));
            if col + 1 < size {
                line.push(if walls.is_blocked(cell, Direction::Right) { '|' } else { ' ' });
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');

        if row + 1 < size {
            let mut gap = String::from("   ");
            for col in 0..size {
                let cell = Coord::new(row, col);
                gap.push(if walls.is_blocked(cell, Direction::Down) { '-' } else { ' ' });
                gap.push(' ');
            }
            output.push_str(gap.trim_end());
            output.push('\n');
        }
    }

    output
}

/// One-line summary of whose turn it is and the walls in hand
pub fn render_status(game_state: &GameState) -> String {
    format!(
        "{:?} to move | walls left: 1 = {}, 2 = {}",
        game_state.current_player(),
        game_state.walls_left(Player::Player1),
        game_state.walls_left(Player::Player2),
    )
}

fn cell_symbol(game_state: &GameState, cell: Coord) -> char {
    if game_state.position(Player::Player1) == cell {
        '1'
    } else if game_state.position(Player::Player2) == cell {
        '2'
    } else {
        '.'
    }
}
