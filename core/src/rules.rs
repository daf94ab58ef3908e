// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path-to-goal validation

use std::collections::VecDeque;

use crate::board::WallLookup;
use crate::{Coord, Direction, GameError, Player};

/// Answers whether pawns can still reach their goal rows through the walls
///
/// Only simple steps are considered: the other pawn never blocks a path.
pub struct ReachabilityValidator<'a, W: WallLookup> {
    /// The walls being checked (live grid or provisional overlay)
    walls: &'a W,
}

impl<'a, W: WallLookup> ReachabilityValidator<'a, W> {
    /// Create a new validator over a wall view
    pub fn new(walls: &'a W) -> Self {
        Self { walls }
    }

    /// Breadth-first search from `from` to any cell on `goal_row`
    pub fn can_reach(&self, from: Coord, goal_row: i16) -> bool {
        let size = self.walls.board_size();
        if !from.is_valid(size) {
            return false;
        }

        let side = size as usize;
        let index = |c: Coord| c.x as usize * side + c.y as usize;

        let mut visited = vec![false; side * side];
        let mut queue = VecDeque::from([from]);
        visited[index(from)] = true;

        while let Some(cell) = queue.pop_front() {
            if cell.x == goal_row {
                return true;
            }

            for direction in Direction::ALL {
                if !self.walls.can_step(cell, direction) {
                    continue;
                }
                let next = cell + direction.delta();
                let i = index(next);
                if !visited[i] {
                    visited[i] = true;
                    queue.push_back(next);
                }
            }
        }

        false
    }

    /// Whether `player`, standing on `position`, can reach its goal row
    pub fn player_can_reach(&self, player: Player, position: Coord) -> bool {
        self.can_reach(position, player.goal_row(self.walls.board_size()))
    }

    /// Check both players; positions are indexed by [`Player::index`]
    pub fn check_paths(&self, positions: &[Coord; 2]) -> Result<(), GameError> {
        for player in Player::BOTH {
            if !self.player_can_reach(player, positions[player.index()]) {
                tracing::debug!(player = ?player, position = ?positions[player.index()], "No path to goal");
                return Err(GameError::PathBlocked(player));
            }
        }
        Ok(())
    }
}
