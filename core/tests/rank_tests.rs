// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use quoridor_core::rules::ReachabilityValidator;
use quoridor_core::board::WallGrid;
use quoridor_core::{Coord, Direction, GameState, Player, RankCodec, RankError, Request, Wall, Winner};

/// Every legal request for the player to move
fn legal_requests(game: &GameState) -> Vec<Request> {
    let mut requests = Vec::new();
    for direction in Direction::ALL {
        for jump in [false, true] {
            if game.can_move(direction, jump) {
                requests.push(Request::Move { direction, jump });
            }
        }
    }
    let side = game.board_size() as i16 - 1;
    for x in 0..side {
        for y in 0..side {
            for wall in [Wall::Horizontal, Wall::Vertical] {
                if game.can_place(x, y, wall) {
                    requests.push(Request::Place { x, y, wall });
                }
            }
        }
    }
    requests
}

fn apply(game: &mut GameState, request: Request) -> bool {
    match request {
        Request::Move { direction, jump } => game.move_pawn(direction, jump),
        Request::Place { x, y, wall } => game.place(x, y, wall),
    }
}

#[test]
fn every_rank_of_small_partitions_is_a_bijection() {
    let codec = RankCodec::new(3, 1);
    for layer in 0..=2 {
        let dimension = codec.dimension(layer).unwrap();
        let mut decoded = 0;
        for rank in 0..dimension {
            match codec.decode(rank, layer) {
                Ok(state) => {
                    assert_eq!(state.layer(), layer);
                    assert_eq!(codec.encode(&state), Ok(rank), "layer {} rank {}", layer, rank);
                    decoded += 1;
                }
                // Both pawns on one cell is the only way a rank can be unusable
                Err(RankError::InvalidPosition(_)) => {}
                Err(e) => panic!("rank {} of layer {}: {}", rank, layer, e),
            }
        }
        assert!(decoded > 0);
    }
}

#[test]
fn distinct_wall_layouts_get_distinct_ranks() {
    let codec = RankCodec::new(4, 1);
    let mut ranks = HashSet::new();
    let mut layouts = 0;

    for first in 0..9 {
        for second in (first + 1)..9 {
            for (a, b) in [
                (Wall::Horizontal, Wall::Horizontal),
                (Wall::Horizontal, Wall::Vertical),
                (Wall::Vertical, Wall::Horizontal),
                (Wall::Vertical, Wall::Vertical),
            ] {
                let mut walls = WallGrid::new(4);
                walls.set_index(first, a);
                walls.set_index(second, b);
                let state = GameState::from_parts(
                    1,
                    walls,
                    [Coord::new(3, 2), Coord::new(0, 2)],
                    [0, 0],
                    Player::Player1,
                )
                .unwrap();
                ranks.insert(codec.encode(&state).unwrap());
                layouts += 1;
            }
        }
    }

    assert_eq!(layouts, 36 * 4);
    assert_eq!(ranks.len(), layouts);
}

#[test]
fn inconsistent_wall_counts_are_rejected() {
    let codec = RankCodec::new(5, 2);
    let state = GameState::from_parts(
        2,
        WallGrid::new(5),
        [Coord::new(4, 2), Coord::new(0, 2)],
        [1, 2],
        Player::Player1,
    )
    .unwrap();
    assert!(matches!(codec.encode(&state), Err(RankError::InconsistentWalls { .. })));
}

#[test]
fn random_games_keep_paths_open_and_ranks_invertible() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..20 {
        let mut game = GameState::new(5, 3).unwrap();
        let codec = RankCodec::for_state(&game);

        for _ in 0..60 {
            let requests = legal_requests(&game);
            let Some(&request) = requests.choose(&mut rng) else {
                break;
            };
            let mover = game.current_player();
            assert!(apply(&mut game, request), "{:?} refused", request);
            assert_eq!(game.current_player(), mover.opposite());

            let positions = game.positions();
            assert_ne!(positions[0], positions[1]);
            assert!(ReachabilityValidator::new(game.walls()).check_paths(&positions).is_ok());
            assert_eq!(
                game.layer()
                    + game.walls_left(Player::Player1) as usize
                    + game.walls_left(Player::Player2) as usize,
                6
            );

            let rank = codec.encode(&game).unwrap();
            assert!(rank < codec.dimension(game.layer()).unwrap());
            assert_eq!(codec.decode(rank, game.layer()).as_ref(), Ok(&game));

            if game.has_won() != Winner::None {
                break;
            }
        }
    }
}
