// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall grid representation and wall/edge geometry

use serde::{Serialize, Deserialize};

use crate::{Coord, Direction, Wall};

/// Read access to wall slots, shared by the live grid and provisional overlays
///
/// A wall in slot (i, j) sits on the intersection between cells (i, j),
/// (i, j+1), (i+1, j) and (i+1, j+1). A horizontal wall cuts the two vertical
/// steps (i, j)-(i+1, j) and (i, j+1)-(i+1, j+1); a vertical wall cuts the two
/// horizontal steps (i, j)-(i, j+1) and (i+1, j)-(i+1, j+1).
pub trait WallLookup {
    /// Size of the board (cells per side)
    fn board_size(&self) -> u8;

    /// Wall at slot (x, y); `Wall::None` for slots outside the grid
    fn wall_at(&self, x: i16, y: i16) -> Wall;

    /// Whether a wall cuts the step from `cell` in `direction`
    fn is_blocked(&self, cell: Coord, direction: Direction) -> bool {
        let Coord { x, y } = cell;
        let (first, second, wall) = match direction {
            Direction::Up => ((x - 1, y - 1), (x - 1, y), Wall::Horizontal),
            Direction::Down => ((x, y - 1), (x, y), Wall::Horizontal),
            Direction::Left => ((x - 1, y - 1), (x, y - 1), Wall::Vertical),
            Direction::Right => ((x - 1, y), (x, y), Wall::Vertical),
        };
        self.wall_at(first.0, first.1) == wall || self.wall_at(second.0, second.1) == wall
    }

    /// Whether a simple step from `cell` in `direction` stays on the board and crosses no wall
    fn can_step(&self, cell: Coord, direction: Direction) -> bool {
        (cell + direction.delta()).is_valid(self.board_size()) && !self.is_blocked(cell, direction)
    }
}

/// The (N-1)x(N-1) grid of wall slots of an NxN board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallGrid {
    /// Size of the board (cells per side)
    size: u8,
    /// Slots in row-major order
    slots: Vec<Wall>,
}

impl WallGrid {
    /// Create an empty grid for a board of the given size
    pub fn new(board_size: u8) -> Self {
        let side = board_size.saturating_sub(1) as usize;
        Self {
            size: board_size,
            slots: vec![Wall::None; side * side],
        }
    }

    /// Size of the board this grid belongs to
    pub fn board_size(&self) -> u8 {
        self.size
    }

    /// Slots per row
    pub fn side(&self) -> usize {
        self.size.saturating_sub(1) as usize
    }

    /// Total number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the grid has no slots at all
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether (x, y) names a slot of this grid
    pub fn contains(&self, x: i16, y: i16) -> bool {
        self.index(x, y).is_some()
    }

    /// Get the wall in slot (x, y); `Wall::None` outside the grid
    pub fn get(&self, x: i16, y: i16) -> Wall {
        self.index(x, y).map_or(Wall::None, |i| self.slots[i])
    }

    /// Put `wall` in slot (x, y). Returns `false` if the slot is outside the grid.
    ///
    /// This is raw storage; placement rules live in [`crate::GameState::try_place`].
    pub fn set(&mut self, x: i16, y: i16, wall: Wall) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.slots[i] = wall;
                true
            }
            None => false,
        }
    }

    /// Put `wall` in the slot with the given row-major index
    pub fn set_index(&mut self, index: usize, wall: Wall) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = wall;
                true
            }
            None => false,
        }
    }

    /// Slot coordinates of a row-major index
    pub fn slot_of(&self, index: usize) -> (i16, i16) {
        let side = self.side().max(1);
        ((index / side) as i16, (index % side) as i16)
    }

    /// Number of walls on the grid
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|wall| **wall != Wall::None).count()
    }

    /// Occupied slots as (row-major index, orientation), in increasing index order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Wall)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, wall)| **wall != Wall::None)
            .map(|(i, wall)| (i, *wall))
    }

    /// The grid as nested rows, the shape the API layer sends to clients
    pub fn rows(&self) -> Vec<Vec<Wall>> {
        let side = self.side();
        if side == 0 {
            return Vec::new();
        }
        self.slots.chunks(side).map(|row| row.to_vec()).collect()
    }

    /// Whether `wall` at (x, y) would meet a wall of the same orientation end to end
    pub fn extends_parallel(&self, x: i16, y: i16, wall: Wall) -> bool {
        match wall {
            Wall::Horizontal => {
                self.get(x, y - 1) == Wall::Horizontal || self.get(x, y + 1) == Wall::Horizontal
            }
            Wall::Vertical => {
                self.get(x - 1, y) == Wall::Vertical || self.get(x + 1, y) == Wall::Vertical
            }
            Wall::None => false,
        }
    }

    /// View this grid with one extra wall that is not committed
    pub fn with_wall(&self, x: i16, y: i16, wall: Wall) -> Provisional<'_> {
        Provisional {
            base: self,
            x,
            y,
            wall,
        }
    }

    /// Convert slot coordinates to a vector index
    fn index(&self, x: i16, y: i16) -> Option<usize> {
        let side = self.side() as i16;
        if x < 0 || y < 0 || x >= side || y >= side {
            return None;
        }
        Some(x as usize * side as usize + y as usize)
    }
}

impl WallLookup for WallGrid {
    fn board_size(&self) -> u8 {
        self.size
    }

    fn wall_at(&self, x: i16, y: i16) -> Wall {
        self.get(x, y)
    }
}

/// A wall grid with one candidate wall overlaid
///
/// Used to test a placement without touching the live grid.
#[derive(Debug, Clone, Copy)]
pub struct Provisional<'a> {
    base: &'a WallGrid,
    x: i16,
    y: i16,
    wall: Wall,
}

impl WallLookup for Provisional<'_> {
    fn board_size(&self) -> u8 {
        self.base.size
    }

    fn wall_at(&self, x: i16, y: i16) -> Wall {
        if (x, y) == (self.x, self.y) && self.base.contains(x, y) {
            self.wall
        } else {
            self.base.get(x, y)
        }
    }
}
