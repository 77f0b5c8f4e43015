use uuid::Uuid;

use crate::action::GameAction;
use crate::game::state::{GameConfig, GameError, GameState, StepOutcome};

pub struct Game {
    pub seed: u64,
    pub id: Uuid,
    pub state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            seed: config.seed,
            id: Uuid::new_v4(),
            state: GameState::new(config),
        }
    }

    /// The sole mutator (spec.md §6 `Handle`).
    pub fn handle(&mut self, action: GameAction) -> Result<StepOutcome, GameError> {
        self.state.step(action)
    }

    pub fn legal_actions(&self, player_index: usize) -> Vec<GameAction> {
        self.state.legal_actions(player_index)
    }

    pub fn is_over(&self) -> bool {
        self.state.game_over
    }

    pub fn winners(&self) -> &[usize] {
        &self.state.winners
    }

    /// Read-only structural copy (spec.md §6 `Query`).
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn copy(&self) -> Self {
        Self {
            seed: self.seed,
            id: self.id,
            state: self.state.clone(),
        }
    }
}
