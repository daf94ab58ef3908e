// SPDX-License-Identifier: MIT OR Apache-2.0

//! Move suggestions backed by precomputed tablebases
//!
//! A tablebase file holds one little-endian 16-bit record per rank of its
//! partition. Bit 0 of a record says whether a suggestion exists. The next bit
//! picks a pawn move (0) or a wall placement (1). A move continues with the
//! jump flag and then the index of the direction in [`Direction::ALL`]. A
//! placement continues with the orientation bit (1 = horizontal) and then
//! `x * N + y`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use thiserror::Error;

use crate::rank::{RankCodec, RankError};
use crate::{Direction, GameState, Wall};

/// Size in bytes of one tablebase record
pub const RECORD_SIZE: usize = 2;

/// Identifies the tablebase file holding a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    /// Cells per side
    pub board_size: u8,
    /// Walls per player
    pub wall_budget: u8,
    /// Walls on the board
    pub layer: usize,
}

impl TableKey {
    /// Key of the partition a state belongs to
    pub fn for_state(state: &GameState) -> Self {
        Self {
            board_size: state.board_size(),
            wall_budget: state.wall_budget(),
            layer: state.layer(),
        }
    }

    /// File name of the partition, e.g. `5x5_2w_1.bin`
    pub fn file_name(&self) -> String {
        format!(
            "{}x{}_{}w_{}.bin",
            self.board_size, self.board_size, self.wall_budget, self.layer
        )
    }
}

/// Byte-addressable, read-only access to tablebases
pub trait TableSource: Send + Sync {
    /// Fill `buf` with the bytes at `offset` of the table for `key`
    fn read_at(&self, key: &TableKey, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// Tablebases stored as files in one directory
#[derive(Debug, Clone)]
pub struct TableDir {
    root: PathBuf,
}

impl TableDir {
    /// Use the tables found under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the tables
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file for a partition
    pub fn path_for(&self, key: &TableKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl TableSource for TableDir {
    fn read_at(&self, key: &TableKey, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = File::open(self.path_for(key))?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}

/// Tablebases held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    tables: HashMap<TableKey, Vec<u8>>,
}

impl MemoryTables {
    /// Create an empty set of tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the raw bytes of a table
    pub fn insert(&mut self, key: TableKey, bytes: Vec<u8>) {
        self.tables.insert(key, bytes);
    }

    /// Write one record, growing the table with empty records as needed
    ///
    /// Tables are dense: the table grows to `(rank + 1) * RECORD_SIZE` bytes.
    /// Ranks whose offset does not fit in `usize` are refused with
    /// `InvalidInput` and leave the tables untouched.
    pub fn set_record(&mut self, key: TableKey, rank: u64, record: u16) -> io::Result<()> {
        let end = usize::try_from(rank)
            .ok()
            .and_then(|r| r.checked_add(1))
            .and_then(|r| r.checked_mul(RECORD_SIZE))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("rank {} is too large", rank))
            })?;
        let offset = end - RECORD_SIZE;

        let table = self.tables.entry(key).or_default();
        if table.len() < end {
            table.resize(end, 0);
        }
        LittleEndian::write_u16(&mut table[offset..end], record);
        Ok(())
    }
}

impl TableSource for MemoryTables {
    fn read_at(&self, key: &TableKey, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let table = self.tables.get(key).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no table {}", key.file_name()))
        })?;
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        let bytes = start
            .checked_add(buf.len())
            .and_then(|end| table.get(start..end))
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        buf.copy_from_slice(bytes);
        Ok(())
    }
}

/// A suggested action for the player to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    /// No suggestion is known
    Invalid,
    /// Move the pawn
    Move {
        /// Direction of the step (or of the side-step after a jump)
        direction: Direction,
        /// Whether the pawn jumps over the opponent
        jump: bool,
    },
    /// Place a wall
    Place {
        /// Slot row
        x: i16,
        /// Slot column
        y: i16,
        /// Orientation
        wall: Wall,
    },
}

impl Action {
    /// Whether this action carries a suggestion
    pub fn is_valid(&self) -> bool {
        !matches!(self, Action::Invalid)
    }
}

/// Decode a tablebase record for a board of `board_size`
pub fn decode_record(record: u16, board_size: u8) -> Action {
    if record & 1 == 0 {
        return Action::Invalid;
    }
    let mut value = record >> 1;
    let is_place = value & 1 == 1;
    value >>= 1;

    if !is_place {
        let jump = value & 1 == 1;
        value >>= 1;
        return match Direction::ALL.get(value as usize) {
            Some(&direction) => Action::Move { direction, jump },
            None => Action::Invalid,
        };
    }

    let wall = if value & 1 == 1 {
        Wall::Horizontal
    } else {
        Wall::Vertical
    };
    value >>= 1;

    let n = board_size as u16;
    if n < 2 {
        return Action::Invalid;
    }
    let (x, y) = (value / n, value % n);
    if x > n - 2 || y > n - 2 {
        return Action::Invalid;
    }
    Action::Place {
        x: x as i16,
        y: y as i16,
        wall,
    }
}

/// Errors met while looking up a record; the oracle reports them as [`Action::Invalid`]
#[derive(Debug, Error)]
pub enum OracleError {
    /// The position could not be ranked
    #[error("Cannot rank position: {0}")]
    Rank(#[from] RankError),

    /// The table could not be read
    #[error("Cannot read table: {0}")]
    Io(#[from] io::Error),
}

/// Player backend trait for anything that can pick an action
pub trait PlayerBackend {
    /// Get the next action for the player to move in `state`
    fn next_action(&self, state: &GameState) -> Action;
}

/// Suggests actions by looking positions up in tablebases
///
/// The oracle only reads the state it is given; it never mutates a game.
#[derive(Debug, Clone)]
pub struct MoveOracle<S> {
    source: S,
}

impl<S: TableSource> MoveOracle<S> {
    /// Create an oracle reading from `source`
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The table source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Rank of `state` inside its partition, checked against the partition size
    ///
    /// Partitions too large for 64-bit ranks are refused before any ranking work.
    pub fn rank(&self, state: &GameState) -> Result<u64, RankError> {
        let codec = RankCodec::for_state(state);
        let dimension = codec.dimension(state.layer())?;
        let rank = codec.encode(state)?;
        if rank >= dimension {
            return Err(RankError::OutOfRange { rank, dimension });
        }
        Ok(rank)
    }

    /// Raw record stored for `state`
    pub fn lookup(&self, state: &GameState) -> Result<u16, OracleError> {
        let key = TableKey::for_state(state);
        let rank = self.rank(state)?;
        let offset = rank
            .checked_mul(RECORD_SIZE as u64)
            .ok_or(RankError::Overflow)?;

        let mut buf = [0u8; RECORD_SIZE];
        self.source.read_at(&key, offset, &mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    /// Suggested action for the player to move, or [`Action::Invalid`]
    pub fn suggest(&self, state: &GameState) -> Action {
        match self.lookup(state) {
            Ok(record) => {
                let action = decode_record(record, state.board_size());
                tracing::debug!(record, action = ?action, "Tablebase suggestion");
                action
            }
            Err(e) => {
                tracing::debug!(table = %TableKey::for_state(state).file_name(), error = %e, "No tablebase suggestion");
                Action::Invalid
            }
        }
    }
}

impl<S: TableSource> PlayerBackend for MoveOracle<S> {
    fn next_action(&self, state: &GameState) -> Action {
        self.suggest(state)
    }
}
