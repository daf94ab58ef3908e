// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranking of positions inside tablebase partitions
//!
//! Tablebases are split by board size, wall budget and number of walls on the
//! board (the "layer"). Inside one partition every position gets a unique
//! rank. From most to least significant the rank holds:
//!
//! - the subset of occupied wall slots, in the combinatorial number system
//! - one orientation bit per occupied slot (1 = horizontal)
//! - row and column of player 1, then of player 2, each base N
//! - walls player 1 still holds, offset by the fewest it can hold at this layer
//! - whose turn it is (0 = player 1)

use thiserror::Error;

use crate::board::WallGrid;
use crate::{Coord, GameError, GameState, Player, Wall};

/// Errors produced while ranking or unranking a position
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    /// The partition is too large for 64-bit ranks
    #[error("Rank does not fit in 64 bits")]
    Overflow,

    /// The rank is past the end of its partition
    #[error("Rank {rank} is outside a partition of {dimension} positions")]
    OutOfRange {
        /// Requested rank
        rank: u64,
        /// Number of positions in the partition
        dimension: u64,
    },

    /// More walls on the board than two budgets or the grid allow
    #[error("Layer {layer} is impossible with {slots} slots and a budget of {budget}")]
    InvalidLayer {
        /// Walls on the board
        layer: usize,
        /// Wall slots on the board
        slots: usize,
        /// Walls per player
        budget: u8,
    },

    /// Walls on the board and walls in hand do not add up to both budgets
    #[error("{layer} walls placed but players hold {held:?} of a {budget} budget")]
    InconsistentWalls {
        /// Walls on the board
        layer: usize,
        /// Walls each player holds
        held: [u8; 2],
        /// Walls per player
        budget: u8,
    },

    /// The state belongs to another board size or budget than the codec
    #[error("State is a {state:?} (size, budget) game, codec expects {codec:?}")]
    Mismatch {
        /// Size and budget of the state
        state: (u8, u8),
        /// Size and budget of the codec
        codec: (u8, u8),
    },

    /// The rank decodes to a position the rules cannot produce
    #[error("Rank decodes to an invalid position: {0}")]
    InvalidPosition(#[from] GameError),
}

/// Rows kept in the precomputed triangle (every 9x9 slot count fits)
const TABLE_ROWS: usize = 64;

/// Binomial coefficients up to a fixed row, with overflowed entries marked
///
/// Rows up to [`TABLE_ROWS`] come from a precomputed Pascal triangle. Larger
/// rows are computed on demand so that memory does not grow with the board.
#[derive(Debug, Clone)]
pub struct Pascal {
    /// Highest row
    n: usize,
    /// Rows held in `entries`
    table_rows: usize,
    /// Entries in row-major order, (table_rows + 1) per row; `None` if past u64
    entries: Vec<Option<u64>>,
}

impl Pascal {
    /// Binomials for rows 0..=n
    pub fn new(n: usize) -> Self {
        let table_rows = n.min(TABLE_ROWS);
        let width = table_rows + 1;
        let mut entries: Vec<Option<u64>> = vec![Some(0); width * width];

        for i in 0..=table_rows {
            entries[i * width] = Some(1);
            for j in 1..=i {
                let above = entries[(i - 1) * width + j];
                let diagonal = entries[(i - 1) * width + j - 1];
                entries[i * width + j] = match (above, diagonal) {
                    (Some(a), Some(b)) => a.checked_add(b),
                    _ => None,
                };
            }
        }

        Self {
            n,
            table_rows,
            entries,
        }
    }

    /// Highest row available
    pub fn rows(&self) -> usize {
        self.n
    }

    /// C(n, k); zero when k > n
    pub fn binomial(&self, n: usize, k: usize) -> Result<u64, RankError> {
        if k > n {
            return Ok(0);
        }
        if n > self.n {
            return Err(RankError::Overflow);
        }
        if n <= self.table_rows {
            return self.entries[n * (self.table_rows + 1) + k].ok_or(RankError::Overflow);
        }
        checked_binomial(n, k)
    }
}

/// C(n, k) by the multiplicative formula, failing as soon as a partial product passes u64
fn checked_binomial(n: usize, k: usize) -> Result<u64, RankError> {
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=k {
        // acc holds C(n - k + i - 1, i - 1), so the division is exact
        acc = acc * (n - k + i) as u128 / i as u128;
        if acc > u64::MAX as u128 {
            return Err(RankError::Overflow);
        }
    }
    Ok(acc as u64)
}

/// Maps positions of one (board size, wall budget) family to ranks and back
#[derive(Debug, Clone)]
pub struct RankCodec {
    board_size: u8,
    wall_budget: u8,
    /// Wall slots on the board, (N-1)^2
    slots: usize,
    pascal: Pascal,
}

impl RankCodec {
    /// Create a codec for boards of `board_size` with `wall_budget` walls per player
    pub fn new(board_size: u8, wall_budget: u8) -> Self {
        let side = board_size.saturating_sub(1) as usize;
        let slots = side * side;
        Self {
            board_size,
            wall_budget,
            slots,
            pascal: Pascal::new(slots),
        }
    }

    /// Codec matching the size and budget of a state
    pub fn for_state(state: &GameState) -> Self {
        Self::new(state.board_size(), state.wall_budget())
    }

    /// Size of the boards this codec ranks
    pub fn board_size(&self) -> u8 {
        self.board_size
    }

    /// Walls per player this codec assumes
    pub fn wall_budget(&self) -> u8 {
        self.wall_budget
    }

    /// Fewest and most walls player 1 can hold with `layer` walls on the board
    fn held_bounds(&self, layer: usize) -> Result<(u64, u64), RankError> {
        let budget = self.wall_budget as i64;
        let placed = layer as i64;
        if layer > self.slots || placed > 2 * budget {
            return Err(RankError::InvalidLayer {
                layer,
                slots: self.slots,
                budget: self.wall_budget,
            });
        }
        let fewest = (budget - placed).max(0);
        let most = (2 * budget - placed).min(budget);
        Ok((fewest as u64, most as u64))
    }

    /// Number of values player 1's wall count can take at this layer
    pub fn wall_radix(&self, layer: usize) -> Result<u64, RankError> {
        let (fewest, most) = self.held_bounds(layer)?;
        Ok(1 + most - fewest)
    }

    /// Number of ranks in the partition for `layer`
    pub fn dimension(&self, layer: usize) -> Result<u64, RankError> {
        let n = self.board_size as u64;
        let factors = [
            self.pascal.binomial(self.slots, layer)?,
            2u64.checked_pow(layer as u32).ok_or(RankError::Overflow)?,
            n.checked_pow(4).ok_or(RankError::Overflow)?,
            self.wall_radix(layer)?,
            2,
        ];
        factors
            .iter()
            .try_fold(1u64, |acc, f| acc.checked_mul(*f))
            .ok_or(RankError::Overflow)
    }

    /// Rank a position within its partition
    pub fn encode(&self, state: &GameState) -> Result<u64, RankError> {
        self.check_family(state)?;

        let layer = state.layer();
        let held = [
            state.walls_left(Player::Player1),
            state.walls_left(Player::Player2),
        ];
        if layer as u64 + held[0] as u64 + held[1] as u64 != 2 * self.wall_budget as u64 {
            return Err(RankError::InconsistentWalls {
                layer,
                held,
                budget: self.wall_budget,
            });
        }
        let (fewest, _) = self.held_bounds(layer)?;
        let radix = self.wall_radix(layer)?;

        // Occupied subset: add the count of subsets skipped at every gap
        let mut rank = 0u64;
        let mut start = 0;
        let mut orientations = Vec::with_capacity(layer);
        for (i, (index, wall)) in state.walls().occupied().enumerate() {
            for j in start..index {
                let skipped = self.pascal.binomial(self.slots - (j + 1), layer - (i + 1))?;
                rank = rank.checked_add(skipped).ok_or(RankError::Overflow)?;
            }
            start = index + 1;
            orientations.push(wall);
        }

        for wall in orientations {
            rank = push_digit(rank, 2, u64::from(wall == Wall::Horizontal))?;
        }

        let n = self.board_size as u64;
        for player in Player::BOTH {
            let position = state.position(player);
            rank = push_digit(rank, n, position.x as u64)?;
            rank = push_digit(rank, n, position.y as u64)?;
        }

        rank = push_digit(rank, radix, held[0] as u64 - fewest)?;
        rank = push_digit(rank, 2, state.current_player().index() as u64)?;

        tracing::trace!(layer, rank, "Encoded position");
        Ok(rank)
    }

    /// Rebuild the position with the given rank in the partition for `layer`
    pub fn decode(&self, rank: u64, layer: usize) -> Result<GameState, RankError> {
        let dimension = self.dimension(layer)?;
        if rank >= dimension {
            return Err(RankError::OutOfRange { rank, dimension });
        }

        let mut code = rank;
        let turn = if pop_digit(&mut code, 2) == 0 {
            Player::Player1
        } else {
            Player::Player2
        };

        let (fewest, _) = self.held_bounds(layer)?;
        let radix = self.wall_radix(layer)?;
        let held_1 = pop_digit(&mut code, radix) + fewest;
        let held_2 = 2 * self.wall_budget as u64 - layer as u64 - held_1;

        let n = self.board_size as u64;
        let p2_y = pop_digit(&mut code, n) as i16;
        let p2_x = pop_digit(&mut code, n) as i16;
        let p1_y = pop_digit(&mut code, n) as i16;
        let p1_x = pop_digit(&mut code, n) as i16;

        let mut orientations = vec![Wall::None; layer];
        for orientation in orientations.iter_mut().rev() {
            *orientation = if pop_digit(&mut code, 2) == 1 {
                Wall::Horizontal
            } else {
                Wall::Vertical
            };
        }

        let mut walls = WallGrid::new(self.board_size);
        let mut start = 0;
        for (i, orientation) in orientations.into_iter().enumerate() {
            for j in start..self.slots {
                let count = self.pascal.binomial(self.slots - (j + 1), layer - (i + 1))?;
                if code < count {
                    walls.set_index(j, orientation);
                    start = j + 1;
                    break;
                }
                code -= count;
            }
        }

        let state = GameState::from_parts(
            self.wall_budget,
            walls,
            [Coord::new(p1_x, p1_y), Coord::new(p2_x, p2_y)],
            [held_1 as u8, held_2 as u8],
            turn,
        )?;
        Ok(state)
    }

    fn check_family(&self, state: &GameState) -> Result<(), RankError> {
        if state.board_size() != self.board_size || state.wall_budget() != self.wall_budget {
            return Err(RankError::Mismatch {
                state: (state.board_size(), state.wall_budget()),
                codec: (self.board_size, self.wall_budget),
            });
        }
        Ok(())
    }
}

fn push_digit(rank: u64, radix: u64, digit: u64) -> Result<u64, RankError> {
    rank.checked_mul(radix)
        .and_then(|r| r.checked_add(digit))
        .ok_or(RankError::Overflow)
}

fn pop_digit(code: &mut u64, radix: u64) -> u64 {
    let digit = *code % radix;
    *code /= radix;
    digit
}
