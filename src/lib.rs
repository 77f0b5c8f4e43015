#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod action;
pub mod building;
pub mod card;
pub mod catalog;
pub mod cli;
pub mod game;
pub mod player;
pub mod players;
pub mod types;
pub mod zone;

pub use action::{ActionPayload, BuildAction, GameAction};
pub use game::{Game, GameConfig, GameError, GameState};
pub use player::PlayerState;
