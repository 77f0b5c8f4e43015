pub mod game;
pub mod powers;
pub mod scoring;
pub mod state;

pub use game::Game;
pub use state::{ExpectedAction, GameConfig, GameError, GameEvent, GameState, StepOutcome};
