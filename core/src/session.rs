// SPDX-License-Identifier: MIT OR Apache-2.0

//! One game between two participants, guarded for concurrent callers
//!
//! A [`Session`] owns its [`GameState`] behind a mutex so that moves and
//! placements from concurrent requests are applied one at a time. Reads take a
//! snapshot under the same lock. Keeping sessions in a map and sweeping idle
//! ones is left to the caller.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use uuid::Uuid;

use crate::engine::{Action, MoveOracle, TableSource};
use crate::{Direction, GameError, GameState, Player, Wall, Winner};

/// An action requested by a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// Move the pawn
    Move {
        /// Direction of the step
        direction: Direction,
        /// Whether to jump over the opponent
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

/// Errors returned by session operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The user is not one of the two participants
    #[error("User is not a participant of this session")]
    NotAParticipant,

    /// Both seats are taken
    #[error("Session already has two players")]
    SessionFull,

    /// The second seat is still empty
    #[error("Waiting for an opponent to join")]
    WaitingForOpponent,

    /// The request came from the player not on move
    #[error("It is {0:?}'s turn")]
    NotYourTurn(Player),

    /// A winner is already recorded
    #[error("Game is over, winner {0:?}")]
    GameOver(Winner),

    /// The rules refused the request
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug)]
struct SessionInner {
    /// Participants, indexed by [`Player::index`]
    players: [Option<Uuid>; 2],
    state: GameState,
    winner: Winner,
    last_update: DateTime<Utc>,
}

impl SessionInner {
    fn player_of(&self, user: Uuid) -> Option<Player> {
        Player::BOTH
            .into_iter()
            .find(|p| self.players[p.index()] == Some(user))
    }
}

/// A game session between a host and a guest
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    inner: Mutex<SessionInner>,
}

impl Session {
    /// Open a session hosted by `host`, who plays player 1
    pub fn new(host: Uuid, board_size: u8, wall_budget: u8) -> Result<Self, SessionError> {
        let state = GameState::new(board_size, wall_budget)?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        tracing::info!(session = %id, board_size, wall_budget, "Session created");
        Ok(Self {
            id,
            created_at: now,
            inner: Mutex::new(SessionInner {
                players: [Some(host), None],
                state,
                winner: Winner::None,
                last_update: now,
            }),
        })
    }

    /// Unique id of this session
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the session was opened
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session last changed
    pub fn last_update(&self) -> DateTime<Utc> {
        self.inner.lock().last_update
    }

    /// Participants, player 1 first
    pub fn players(&self) -> [Option<Uuid>; 2] {
        self.inner.lock().players
    }

    /// Seat of `user`, if they take part
    pub fn player_of(&self, user: Uuid) -> Option<Player> {
        self.inner.lock().player_of(user)
    }

    /// Take the free seat. Joining twice returns the seat already held.
    pub fn join(&self, user: Uuid) -> Result<Player, SessionError> {
        let mut inner = self.inner.lock();
        if let Some(player) = inner.player_of(user) {
            return Ok(player);
        }
        if inner.players[Player::Player2.index()].is_some() {
            return Err(SessionError::SessionFull);
        }

        inner.players[Player::Player2.index()] = Some(user);
        inner.last_update = Utc::now();
        tracing::info!(session = %self.id, "Opponent joined");
        Ok(Player::Player2)
    }

    /// Apply a request from `user` and return the winner afterwards
    ///
    /// The request is refused without touching the board when the game is
    /// over, the guest seat is empty, `user` does not take part or it is not
    /// `user`'s turn.
    pub fn play(&self, user: Uuid, request: Request) -> Result<Winner, SessionError> {
        let _span = tracing::info_span!("core.session", session = %self.id).entered();
        let mut inner = self.inner.lock();

        if inner.winner != Winner::None {
            return Err(SessionError::GameOver(inner.winner));
        }
        if inner.players.iter().any(Option::is_none) {
            return Err(SessionError::WaitingForOpponent);
        }
        let player = inner.player_of(user).ok_or(SessionError::NotAParticipant)?;
        let on_move = inner.state.current_player();
        if player != on_move {
            return Err(SessionError::NotYourTurn(on_move));
        }

        match request {
            Request::Move { direction, jump } => inner.state.try_move(direction, jump)?,
            Request::Place { x, y, wall } => inner.state.try_place(x, y, wall)?,
        }

        inner.winner = inner.state.has_won();
        inner.last_update = Utc::now();
        if inner.winner != Winner::None {
            tracing::info!(winner = ?inner.winner, "Game won");
        }
        Ok(inner.winner)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> GameState {
        self.inner.lock().state.clone()
    }

    /// Recorded winner
    pub fn winner(&self) -> Winner {
        self.inner.lock().winner
    }

    /// Whether the session has not changed for longer than `max_idle`
    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        now.signed_duration_since(self.last_update()) > max_idle
    }

    /// Ask the oracle about a snapshot; the lock is released before the table is read
    pub fn suggest<S: TableSource>(&self, oracle: &MoveOracle<S>) -> Action {
        let state = self.snapshot();
        oracle.suggest(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> (Session, Uuid, Uuid) {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let session = Session::new(host, 5, 2).unwrap();
        assert_eq!(session.join(guest), Ok(Player::Player2));
        (session, host, guest)
    }

    #[test]
    fn test_join_fills_second_seat_once() {
        let (session, host, guest) = started();
        assert_eq!(session.join(host), Ok(Player::Player1));
        assert_eq!(session.join(guest), Ok(Player::Player2));
        assert_eq!(session.join(Uuid::new_v4()), Err(SessionError::SessionFull));
        assert_eq!(session.players(), [Some(host), Some(guest)]);
    }

    #[test]
    fn test_play_requires_an_opponent() {
        let host = Uuid::new_v4();
        let session = Session::new(host, 5, 2).unwrap();
        let up = Request::Move { direction: Direction::Up, jump: false };
        assert_eq!(session.play(host, up), Err(SessionError::WaitingForOpponent));
    }

    #[test]
    fn test_turns_are_enforced() {
        let (session, host, guest) = started();
        let up = Request::Move { direction: Direction::Up, jump: false };
        let down = Request::Move { direction: Direction::Down, jump: false };

        assert_eq!(session.play(guest, down), Err(SessionError::NotYourTurn(Player::Player1)));
        assert_eq!(session.play(host, up), Ok(Winner::None));
        assert_eq!(session.play(host, up), Err(SessionError::NotYourTurn(Player::Player2)));
        assert_eq!(session.play(Uuid::new_v4(), down), Err(SessionError::NotAParticipant));
        assert_eq!(session.play(guest, down), Ok(Winner::None));
    }

    #[test]
    fn test_illegal_request_leaves_state_unchanged() {
        let (session, host, _) = started();
        let before = session.snapshot();
        let result = session.play(host, Request::Move { direction: Direction::Down, jump: false });
        assert_eq!(result, Err(SessionError::Game(GameError::OffBoard)));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_winner_is_recorded_and_play_stops() {
        // 3x3 board: player 1 starts on row 2 and needs two steps up
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let session = Session::new(host, 3, 0).unwrap();
        session.join(guest).unwrap();

        let up = Request::Move { direction: Direction::Up, jump: false };
        let left = Request::Move { direction: Direction::Left, jump: false };
        let right = Request::Move { direction: Direction::Right, jump: false };

        // Player 1 sidesteps first since player 2 blocks the centre column of row 0
        assert_eq!(session.play(host, left), Ok(Winner::None));
        assert_eq!(session.play(guest, right), Ok(Winner::None));
        assert_eq!(session.play(host, up), Ok(Winner::None));
        assert_eq!(session.play(guest, left), Ok(Winner::None));
        assert_eq!(session.play(host, up), Ok(Winner::Player1));
        assert_eq!(session.winner(), Winner::Player1);
        assert_eq!(session.play(guest, left), Err(SessionError::GameOver(Winner::Player1)));
    }

    #[test]
    fn test_idle_detection() {
        let (session, _, _) = started();
        let now = session.last_update();
        assert!(!session.is_idle(now, Duration::minutes(5)));
        assert!(session.is_idle(now + Duration::minutes(6), Duration::minutes(5)));
    }

    #[test]
    fn test_request_payloads() {
        let request: Request =
            serde_json::from_str(r#"{"type":"place","x":1,"y":2,"wall":"HORIZONTAL"}"#).unwrap();
        assert_eq!(request, Request::Place { x: 1, y: 2, wall: Wall::Horizontal });

        let request: Request =
            serde_json::from_str(r#"{"type":"move","direction":"UP","jump":true}"#).unwrap();
        assert_eq!(request, Request::Move { direction: Direction::Up, jump: true });
    }
}
