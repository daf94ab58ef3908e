// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quoridor Core - Game Rules and Tablebase Lookup
//!
//! This crate provides the core game functionality including:
//! - Pawn movement, jumps over the opponent and diagonal side-steps
//! - Wall placement that never seals a player away from its goal row
//! - Ranking of positions into precomputed tablebase partitions
//! - Move suggestions decoded from those tablebases
//! - A per-session guard serializing play on one board

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;
pub mod rules;
pub mod rank;
pub mod engine;
pub mod session;

use std::ops::{Add, Sub};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use board::{WallGrid, WallLookup};
use rules::ReachabilityValidator;

/// One of the two sides of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Starts on the last row and races to row 0 (moves first)
    #[serde(rename = "PLAYER_1")]
    Player1,
    /// Starts on row 0 and races to the last row
    #[serde(rename = "PLAYER_2")]
    Player2,
}

impl Player {
    /// Both players, in seat order
    pub const BOTH: [Player; 2] = [Player::Player1, Player::Player2];

    /// Returns the other player
    pub fn opposite(&self) -> Self {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// Seat index (0 for player 1, 1 for player 2)
    pub fn index(&self) -> usize {
        match self {
            Player::Player1 => 0,
            Player::Player2 => 1,
        }
    }

    /// Row this player must reach on a board of the given size
    pub fn goal_row(&self, board_size: u8) -> i16 {
        match self {
            Player::Player1 => 0,
            Player::Player2 => board_size as i16 - 1,
        }
    }
}

/// Outcome of a game so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Winner {
    /// Nobody has reached their goal row yet
    #[default]
    #[serde(rename = "NONE")]
    None,
    /// Player 1 reached row 0
    #[serde(rename = "PLAYER_1")]
    Player1,
    /// Player 2 reached the last row
    #[serde(rename = "PLAYER_2")]
    Player2,
}

impl From<Player> for Winner {
    fn from(player: Player) -> Self {
        match player {
            Player::Player1 => Winner::Player1,
            Player::Player2 => Winner::Player2,
        }
    }
}

/// Board coordinate. `x` is the row (0 at the top), `y` the column.
///
/// Coordinates are signed so that deltas and off-board projections can be
/// represented; [`Coord::is_valid`] tells whether a value lies on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Row
    pub x: i16,
    /// Column
    pub y: i16,
}

impl Coord {
    /// Create a new coordinate
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Check if coordinate is valid for a board of given size
    pub fn is_valid(&self, board_size: u8) -> bool {
        let size = board_size as i16;
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, other: Coord) -> Coord {
        Coord::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, other: Coord) -> Coord {
        Coord::new(self.x - other.x, self.y - other.y)
    }
}

/// One of the four orthogonal directions a pawn can move in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Towards row 0
    Up,
    /// Towards the last column
    Right,
    /// Towards the last row
    Down,
    /// Towards column 0
    Left,
}

impl Direction {
    /// All directions in table order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step in this direction
    pub fn delta(self) -> Coord {
        match self {
            Direction::Up => Coord::new(-1, 0),
            Direction::Right => Coord::new(0, 1),
            Direction::Down => Coord::new(1, 0),
            Direction::Left => Coord::new(0, -1),
        }
    }

    /// Returns the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// The two directions perpendicular to this one
    pub fn orthogonal(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Right | Direction::Left => [Direction::Up, Direction::Down],
        }
    }

    /// Resolve a unit delta to its direction; `None` for anything else
    pub fn from_delta(delta: Coord) -> Option<Self> {
        match (delta.x, delta.y) {
            (-1, 0) => Some(Direction::Up),
            (0, 1) => Some(Direction::Right),
            (1, 0) => Some(Direction::Down),
            (0, -1) => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Content of a wall slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Wall {
    /// Empty slot
    #[default]
    None,
    /// Separates two rows
    Horizontal,
    /// Separates two columns
    Vertical,
}

/// Represents the current state of a Quoridor game
///
/// Fields are private: every mutation goes through [`GameState::try_move`] or
/// [`GameState::try_place`] (or their boolean forms), which keep both pawns on
/// the board and keep a path open from each pawn to its goal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// The size of the board (cells per side)
    board_size: u8,
    /// Walls each player started with
    wall_budget: u8,
    /// Walls on the board
    walls: WallGrid,
    /// Pawn positions, indexed by [`Player::index`]
    positions: [Coord; 2],
    /// Walls each player still holds
    walls_left: [u8; 2],
    /// The player whose turn it is
    current_player: Player,
}

impl GameState {
    /// Create a new game with the specified board size and wall budget
    ///
    /// Player 1 starts on the last row and player 2 on the first, both on the
    /// centre column. Player 1 moves first.
    pub fn new(board_size: u8, wall_budget: u8) -> Result<Self, GameError> {
        if board_size < 2 {
            return Err(GameError::InvalidBoardSize(board_size));
        }

        let centre = (board_size / 2) as i16;
        Ok(Self {
            board_size,
            wall_budget,
            walls: WallGrid::new(board_size),
            positions: [
                Coord::new(board_size as i16 - 1, centre),
                Coord::new(0, centre),
            ],
            walls_left: [wall_budget, wall_budget],
            current_player: Player::Player1,
        })
    }

    /// Assemble a state from its parts
    ///
    /// Checks the structural invariants only: board size, pawns on distinct
    /// on-board cells, wall counts within the budget. It does not re-check
    /// that both pawns can still reach their goal rows.
    pub fn from_parts(
        wall_budget: u8,
        walls: WallGrid,
        positions: [Coord; 2],
        walls_left: [u8; 2],
        current_player: Player,
    ) -> Result<Self, GameError> {
        let board_size = walls.board_size();
        if board_size < 2 {
            return Err(GameError::InvalidBoardSize(board_size));
        }
        for position in positions {
            if !position.is_valid(board_size) {
                return Err(GameError::InvalidCoordinate(position));
            }
        }
        if positions[0] == positions[1] {
            return Err(GameError::SharedCell(positions[0]));
        }
        for remaining in walls_left {
            if remaining > wall_budget {
                return Err(GameError::InvalidWallCount {
                    remaining,
                    budget: wall_budget,
                });
            }
        }

        Ok(Self {
            board_size,
            wall_budget,
            walls,
            positions,
            walls_left,
            current_player,
        })
    }

    /// Size of the board
    pub fn board_size(&self) -> u8 {
        self.board_size
    }

    /// Walls each player started with
    pub fn wall_budget(&self) -> u8 {
        self.wall_budget
    }

    /// Walls currently on the board
    pub fn walls(&self) -> &WallGrid {
        &self.walls
    }

    /// Position of a player's pawn
    pub fn position(&self, player: Player) -> Coord {
        self.positions[player.index()]
    }

    /// Both pawn positions, player 1 first
    pub fn positions(&self) -> [Coord; 2] {
        self.positions
    }

    /// Walls a player still holds
    pub fn walls_left(&self, player: Player) -> u8 {
        self.walls_left[player.index()]
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Number of walls on the board
    pub fn layer(&self) -> usize {
        self.walls.count()
    }

    /// Check whether the player to move could step (or jump) in `direction`
    pub fn can_move(&self, direction: Direction, jump: bool) -> bool {
        self.check_move(direction, jump).is_ok()
    }

    /// Move the pawn of the player to move. Returns `false` and leaves the
    /// state untouched when the move is illegal.
    pub fn move_pawn(&mut self, direction: Direction, jump: bool) -> bool {
        self.try_move(direction, jump).is_ok()
    }

    /// Move the pawn of the player to move, reporting why an illegal move was refused
    pub fn try_move(&mut self, direction: Direction, jump: bool) -> Result<(), GameError> {
        let player = self.current_player;
        let destination = match self.check_move(direction, jump) {
            Ok(destination) => destination,
            Err(e) => {
                tracing::debug!(player = ?player, direction = ?direction, jump, error = %e, "Move refused");
                return Err(e);
            }
        };

        self.positions[player.index()] = destination;
        self.current_player = player.opposite();

        tracing::info!(player = ?player, direction = ?direction, jump, to = ?destination, "Pawn moved");
        Ok(())
    }

    /// Validate a move and return the cell the pawn would land on
    ///
    /// A jump requires the opponent to stand one step away. The jump goes
    /// straight over the opponent when the cell behind it is open; only when
    /// that cell is off the board or walled off may the pawn side-step to
    /// either side of the opponent.
    pub fn check_move(&self, direction: Direction, jump: bool) -> Result<Coord, GameError> {
        let me = self.position(self.current_player);
        let opponent = self.position(self.current_player.opposite());
        let mut from = me;

        if jump {
            let straight = Direction::from_delta(opponent - me).ok_or(GameError::NotAdjacent)?;

            if direction == straight.opposite() {
                return Err(GameError::BackwardJump);
            }
            if self.walls.is_blocked(me, straight) {
                return Err(GameError::WallBlocked);
            }

            from = opponent;
            if self.walls.can_step(from, straight) {
                return if direction == straight {
                    Ok(from + straight.delta())
                } else {
                    Err(GameError::StraightJumpAvailable)
                };
            }
        }

        let destination = from + direction.delta();
        if !destination.is_valid(self.board_size) {
            return Err(GameError::OffBoard);
        }
        if self.walls.is_blocked(from, direction) {
            return Err(GameError::WallBlocked);
        }
        if destination == opponent {
            return Err(GameError::OccupiedPosition);
        }

        Ok(destination)
    }

    /// Check whether the player to move could place `wall` at slot (x, y)
    pub fn can_place(&self, x: i16, y: i16, wall: Wall) -> bool {
        self.check_place(x, y, wall).is_ok()
    }

    /// Place a wall for the player to move. Returns `false` and leaves the
    /// state untouched when the placement is illegal.
    pub fn place(&mut self, x: i16, y: i16, wall: Wall) -> bool {
        self.try_place(x, y, wall).is_ok()
    }

    /// Place a wall for the player to move, reporting why an illegal placement was refused
    pub fn try_place(&mut self, x: i16, y: i16, wall: Wall) -> Result<(), GameError> {
        let player = self.current_player;
        if let Err(e) = self.check_place(x, y, wall) {
            tracing::debug!(player = ?player, x, y, wall = ?wall, error = %e, "Placement refused");
            return Err(e);
        }

        self.walls.set(x, y, wall);
        self.walls_left[player.index()] -= 1;
        self.current_player = player.opposite();

        tracing::info!(player = ?player, x, y, wall = ?wall, walls_left = self.walls_left[player.index()], "Wall placed");
        Ok(())
    }

    /// Validate a wall placement for the player to move
    ///
    /// The cheap slot checks run first; the path search for both players runs
    /// last, against the grid with the candidate wall overlaid.
    pub fn check_place(&self, x: i16, y: i16, wall: Wall) -> Result<(), GameError> {
        if !self.walls.contains(x, y) {
            return Err(GameError::InvalidSlot(x, y));
        }
        if wall == Wall::None {
            return Err(GameError::NoWall);
        }
        if self.walls_left(self.current_player) == 0 {
            return Err(GameError::NoWallsLeft);
        }
        if self.walls.get(x, y) != Wall::None {
            return Err(GameError::SlotOccupied);
        }
        if self.walls.extends_parallel(x, y, wall) {
            return Err(GameError::AdjacentParallelWall);
        }

        let provisional = self.walls.with_wall(x, y, wall);
        ReachabilityValidator::new(&provisional).check_paths(&self.positions)
    }

    /// Which player, if any, stands on its goal row
    pub fn has_won(&self) -> Winner {
        for player in Player::BOTH {
            if self.position(player).x == player.goal_row(self.board_size) {
                return player.into();
            }
        }
        Winner::None
    }
}

/// Errors that can occur during game play
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Boards need at least two rows
    #[error("Board size {0} is too small (minimum 2)")]
    InvalidBoardSize(u8),

    /// The coordinate is outside the board
    #[error("Invalid coordinate {0:?}")]
    InvalidCoordinate(Coord),

    /// Both pawns were put on the same cell
    #[error("Both pawns on {0:?}")]
    SharedCell(Coord),

    /// A player holds more walls than the budget allows
    #[error("{remaining} walls left exceeds the budget of {budget}")]
    InvalidWallCount {
        /// Walls the player would hold
        remaining: u8,
        /// Walls each player starts with
        budget: u8,
    },

    /// The destination is outside the board
    #[error("Move leaves the board")]
    OffBoard,

    /// A wall stands in the way
    #[error("A wall blocks the move")]
    WallBlocked,

    /// A jump was requested but the opponent is not one step away
    #[error("Opponent is not adjacent")]
    NotAdjacent,

    /// A jump back through the opponent towards the mover's own cell
    #[error("Cannot jump backward through the opponent")]
    BackwardJump,

    /// A side-step was requested while the straight jump is open
    #[error("Straight jump is available, side-step not allowed")]
    StraightJumpAvailable,

    /// The destination is the opponent's cell
    #[error("Position already occupied")]
    OccupiedPosition,

    /// The wall slot is outside the wall grid
    #[error("Wall slot ({0}, {1}) is outside the wall grid")]
    InvalidSlot(i16, i16),

    /// A placement with no orientation
    #[error("No wall orientation given")]
    NoWall,

    /// The player has used up its budget
    #[error("No walls left")]
    NoWallsLeft,

    /// The slot already holds a wall
    #[error("Wall slot already occupied")]
    SlotOccupied,

    /// The wall would touch a parallel wall end to end
    #[error("Wall would overlap an adjacent parallel wall")]
    AdjacentParallelWall,

    /// The wall would cut a player off from its goal row
    #[error("Wall would leave {0:?} without a path to its goal")]
    PathBlocked(Player),
}

pub use board::Provisional;
pub use engine::{Action, MoveOracle, MemoryTables, PlayerBackend, TableDir, TableKey, TableSource};
pub use rank::{RankCodec, RankError};
pub use session::{Request, Session, SessionError};
