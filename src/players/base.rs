use crate::action::GameAction;
use crate::game::Game;

/// Implemented by anything that can pick one action from a legal set.
/// Peripheral to the rules core (spec.md §1 Non-goals); the core never
/// depends on this trait, only binaries built on top of it do.
pub trait BasePlayer {
    fn decide(&self, game: &Game, actions: &[GameAction]) -> Option<GameAction>;
}
