//! The peripheral CLI surface named in spec.md §6: `new`, `apply`, `show`.
//! Thin by design — all rules live in `game::state`.

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::action::GameAction;
use crate::game::{Game, GameConfig};

#[derive(Debug, Parser)]
#[command(name = "gtr")]
#[command(about = "Glory to Rome rules-engine CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a new game and print its initial snapshot as JSON.
    New {
        #[arg(long)]
        players: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Replay a JSON-lines file of actions against a freshly started game.
    Apply {
        #[arg(long)]
        players: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        actions_file: String,
    },
    /// Print a human-readable view of a persisted snapshot.
    Show { snapshot_file: String },
}

/// Returns the process exit code (spec.md §6: 0 on clean replay, non-zero
/// on any rejected action).
pub fn run(cli: Cli) -> i32 {
    match cli.command {
        Command::New { players, seed } => {
            let game = Game::new(GameConfig { num_players: players, seed, ..Default::default() });
            match serde_json::to_string_pretty(&game.state) {
                Ok(json) => {
                    println!("{json}");
                    0
                }
                Err(e) => {
                    eprintln!("failed to serialize new game: {e}");
                    1
                }
            }
        }
        Command::Apply { players, seed, actions_file } => run_apply(players, seed, &actions_file),
        Command::Show { snapshot_file } => run_show(&snapshot_file),
    }
}

fn run_apply(players: usize, seed: u64, actions_file: &str) -> i32 {
    let contents = match fs::read_to_string(Path::new(actions_file)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to read {actions_file}: {e}");
            return 1;
        }
    };

    let mut game = Game::new(GameConfig { num_players: players, seed, ..Default::default() });
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let action: GameAction = match serde_json::from_str(line) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("line {}: invalid action JSON: {e}", line_no + 1);
                return 1;
            }
        };
        if let Err(e) = game.handle(action) {
            eprintln!("line {}: action rejected: {e}", line_no + 1);
            return 1;
        }
    }

    match serde_json::to_string_pretty(&game.state) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("failed to serialize final state: {e}");
            1
        }
    }
}

fn run_show(snapshot_file: &str) -> i32 {
    let contents = match fs::read_to_string(Path::new(snapshot_file)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to read {snapshot_file}: {e}");
            return 1;
        }
    };
    let state: crate::game::GameState = match serde_json::from_str(&contents) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to parse snapshot: {e}");
            return 1;
        }
    };

    println!("leader: player {}", state.leader);
    println!("library: {} cards, pool: {} cards", state.library.len(), state.pool.len());
    println!("game over: {}", state.game_over);
    if !state.winners.is_empty() {
        println!("winners: {:?}", state.winners);
    }
    for (i, player) in state.players.iter().enumerate() {
        println!(
            "player {i}: hand={} clientele={} buildings={} influence={}",
            player.hand.len(),
            player.clientele.len(),
            player.buildings.len(),
            player.influence(),
        );
    }
    0
}
