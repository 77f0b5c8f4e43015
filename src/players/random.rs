use rand::seq::SliceRandom;

use crate::action::GameAction;
use crate::game::Game;
use crate::players::BasePlayer;

#[derive(Clone)]
pub struct RandomPlayer;

impl BasePlayer for RandomPlayer {
    fn decide(&self, _game: &Game, actions: &[GameAction]) -> Option<GameAction> {
        let mut rng = rand::thread_rng();
        actions.choose(&mut rng).cloned()
    }
}
