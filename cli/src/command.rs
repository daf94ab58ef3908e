// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of the commands typed on stdin

use anyhow::{anyhow, bail, Result};

use quoridor_core::{Direction, Request, Wall};

/// A line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move or place for the player to move
    Play(Request),
    /// Ask the tablebase for a suggestion
    Hint,
    /// Print the state as JSON
    State,
    /// Leave the game
    Quit,
}

/// Parse a command line such as `up`, `jump left` or `wall h 1 2`
pub fn parse_command(input: &str) -> Result<Command> {
    let input = input.trim().to_lowercase();
    let mut words = input.split_whitespace();
    let head = words.next().ok_or_else(|| anyhow!("Empty command"))?;

    let command = match head {
        "hint" => Command::Hint,
        "state" => Command::State,
        "quit" | "exit" => Command::Quit,
        "jump" => {
            let word = words
                .next()
                .ok_or_else(|| anyhow!("Missing direction. Example: 'jump up'."))?;
            Command::Play(Request::Move {
                direction: parse_direction(word)?,
                jump: true,
            })
        }
        "wall" => {
            let (orientation, x, y) = match (words.next(), words.next(), words.next()) {
                (Some(o), Some(x), Some(y)) => (o, x, y),
                _ => bail!("Invalid wall format. Example: 'wall h 1 2'."),
            };
            let wall = match orientation {
                "h" | "horizontal" => Wall::Horizontal,
                "v" | "vertical" => Wall::Vertical,
                other => bail!("Invalid orientation '{}'. Must be h or v.", other),
            };
            Command::Play(Request::Place {
                x: x.parse().map_err(|_| anyhow!("Invalid slot row '{}'", x))?,
                y: y.parse().map_err(|_| anyhow!("Invalid slot column '{}'", y))?,
                wall,
            })
        }
        word => Command::Play(Request::Move {
            direction: parse_direction(word)?,
            jump: false,
        }),
    };

    if let Some(extra) = words.next() {
        bail!("Unexpected '{}' after command", extra);
    }
    Ok(command)
}

fn parse_direction(word: &str) -> Result<Direction> {
    match word {
        "up" | "u" => Ok(Direction::Up),
        "right" | "r" => Ok(Direction::Right),
        "down" | "d" => Ok(Direction::Down),
        "left" | "l" => Ok(Direction::Left),
        other => Err(anyhow!(
            "Unknown command '{}'. Try up, right, down, left, jump <dir>, wall <h|v> <x> <y>, hint, state or quit.",
            other
        )),
    }
}
