// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quoridor CLI - play on the terminal
//!
//! Both seats are played from stdin unless `--ai` hands one of them to the
//! tablebase oracle. `hint` asks the oracle for the player to move.

mod command;
mod config;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use command::{parse_command, Command};
use config::{AiSide, CliConfig};
use quoridor_core::{Action, MoveOracle, Player, PlayerBackend, Request, Session, TableDir, Winner};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(name = "quoridor", about = "Quoridor on the terminal with tablebase hints", version)]
struct Args {
    /// Cells per side (overrides the config file)
    #[clap(short, long)]
    size: Option<u8>,

    /// Walls per player (overrides the config file)
    #[clap(short, long)]
    walls: Option<u8>,

    /// Directory holding the tablebase files
    #[clap(short, long)]
    tables: Option<PathBuf>,

    /// Let the oracle play this side
    #[clap(long, value_enum)]
    ai: Option<AiSide>,

    /// Config file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print the state as JSON instead of the ASCII board
    #[clap(long)]
    json: bool,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,
}

impl Args {
    /// Apply command-line overrides on top of the file settings
    fn merge_into(&self, mut config: CliConfig) -> CliConfig {
        if let Some(size) = self.size {
            config.board_size = size;
        }
        if let Some(walls) = self.walls {
            config.wall_budget = walls;
        }
        if let Some(tables) = &self.tables {
            config.table_dir = Some(tables.clone());
        }
        if let Some(ai) = self.ai {
            config.ai_player = Some(ai);
        }
        if self.debug {
            config.log_level = "debug".to_string();
        }
        config
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => config::load_or_create(path)?,
        None => config::load_config().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config, using defaults: {:#}", e);
            CliConfig::default()
        }),
    };
    let config = args.merge_into(file_config);
    init_logging(&config.log_level);
    tracing::debug!(?config, "Starting");

    let oracle = config.table_dir.clone().map(|dir| MoveOracle::new(TableDir::new(dir)));
    if config.ai_player.is_some() && oracle.is_none() {
        bail!("--ai needs a table directory (--tables or table_dir in the config file)");
    }

    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();
    let session = Session::new(host, config.board_size, config.wall_budget)
        .context("Failed to start game")?;
    session.join(guest)?;

    let mut game = Game {
        session,
        oracle,
        ai: config.ai_player.map(Player::from),
        json: args.json,
    };
    game.run()
}

struct Game {
    session: Session,
    oracle: Option<MoveOracle<TableDir>>,
    ai: Option<Player>,
    json: bool,
}

impl Game {
    fn run(&mut self) -> Result<()> {
        self.print_state()?;

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            if self.session.winner() != Winner::None {
                break;
            }
            if self.play_ai()? {
                continue;
            }

            print!("> ");
            io::stdout().flush()?;
            let line = match lines.next() {
                Some(line) => line.context("Failed to read input")?,
                None => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(Command::Play(request)) => self.play(request)?,
                Ok(Command::Hint) => self.hint(),
                Ok(Command::State) => {
                    println!("{}", serde_json::to_string_pretty(&self.session.snapshot())?);
                }
                Ok(Command::Quit) => break,
                Err(e) => eprintln!("{}", e),
            }
        }

        match self.session.winner() {
            Winner::None => println!("Bye."),
            winner => println!("Game over! Winner: {:?}", winner),
        }
        Ok(())
    }

    /// Let the oracle move if it holds the seat on move; returns whether it played
    fn play_ai(&mut self) -> Result<bool> {
        let (Some(side), Some(oracle)) = (self.ai, self.oracle.as_ref()) else {
            return Ok(false);
        };
        let snapshot = self.session.snapshot();
        if snapshot.current_player() != side {
            return Ok(false);
        }

        let Some(request) = to_request(oracle.next_action(&snapshot)) else {
            println!("The tablebase has no move for {:?}; you play both sides from now on.", side);
            self.ai = None;
            return Ok(false);
        };

        println!("{:?} plays {:?}", side, request);
        self.play(request)?;
        Ok(true)
    }

    fn play(&mut self, request: Request) -> Result<()> {
        let player = self.session.snapshot().current_player();
        let user = self.session.players()[player.index()].context("Seat is empty")?;

        match self.session.play(user, request) {
            Ok(_) => self.print_state(),
            Err(e) => {
                eprintln!("Invalid move: {}", e);
                if self.ai == Some(player) {
                    println!("The tablebase suggested an illegal move; you play both sides from now on.");
                    self.ai = None;
                }
                Ok(())
            }
        }
    }

    fn hint(&self) {
        match &self.oracle {
            Some(oracle) => match self.session.suggest(oracle) {
                Action::Invalid => println!("No suggestion for this position."),
                action => println!("Suggestion: {}", describe(action)),
            },
            None => println!("No table directory configured."),
        }
    }

    fn print_state(&self) -> Result<()> {
        let snapshot = self.session.snapshot();
        if self.json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            println!("\n{}", render::render_board(&snapshot));
            println!("{}", render::render_status(&snapshot));
        }
        Ok(())
    }
}

/// Turn an oracle suggestion into a request; `None` when there is no suggestion
fn to_request(action: Action) -> Option<Request> {
    match action {
        Action::Invalid => None,
        Action::Move { direction, jump } => Some(Request::Move { direction, jump }),
        Action::Place { x, y, wall } => Some(Request::Place { x, y, wall }),
    }
}

/// Suggestion in the syntax the prompt accepts
fn describe(action: Action) -> String {
    match action {
        Action::Invalid => "none".to_string(),
        Action::Move { direction, jump } => {
            let word = format!("{:?}", direction).to_lowercase();
            if jump {
                format!("jump {}", word)
            } else {
                word
            }
        }
        Action::Place { x, y, wall } => {
            let orientation = if wall == quoridor_core::Wall::Horizontal { 'h' } else { 'v' };
            format!("wall {} {} {}", orientation, x, y)
        }
    }
}
