//! The authoritative game state and its single mutating entry point,
//! `GameState::step` (spec.md §4.4-§4.5). Dispatch is gated entirely
//! by the `expected` stack: an incoming action is rejected unless its
//! kind and acting player match the stack's top frame.
//!
//! Atomicity (spec.md §9, "atomic rejects") is achieved by the second
//! of the two sanctioned strategies: `step` clones the whole state,
//! mutates the clone, and only commits by swap on success. This trades
//! a clone per call for a dispatcher that doesn't have to hand-prove
//! every handler validates-before-mutating.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::action::{ActionPayload, BuildAction, GameAction};
use crate::card::CardId;
use crate::catalog::CardName;
use crate::game::{powers, scoring};
use crate::player::{PlayerState, PlayerZone};
use crate::types::{ActionKind, Material, Role};
use crate::zone::Zone;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub num_players: usize,
    pub seed: u64,
    /// Influence at which a player triggers scored game end.
    pub victory_threshold: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            seed: 42,
            victory_threshold: 10,
        }
    }
}

/// Where the current leader's turn sits relative to the lead/follow/
/// role-action sequence (spec.md §4.4 steps 1-5). Drives what happens
/// when the `expected` stack drains to empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum RoundPhase {
    AwaitingLead,
    Thinking,
    Following,
    ActingRoles,
}

/// One frame of the expected-action stack (spec.md §9 "Expected-action
/// stack"). The top of `GameState::expected` is the sole legal next
/// action; everything below it is deferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpectedAction {
    ThinkerOrLead { player: usize },
    ThinkerType { player: usize },
    LeadRole { player: usize },
    FollowRole { player: usize },
    /// `remaining` counts down by one per discrete role action for
    /// every role except Legionary, where it is instead the cap on
    /// cards revealed by the single combined action (see
    /// `handle_legionary`).
    RoleAction { player: usize, role: Role, remaining: u8 },
    GiveCards { player: usize },
}

impl ExpectedAction {
    fn player(&self) -> usize {
        match *self {
            ExpectedAction::ThinkerOrLead { player }
            | ExpectedAction::ThinkerType { player }
            | ExpectedAction::LeadRole { player }
            | ExpectedAction::FollowRole { player }
            | ExpectedAction::RoleAction { player, .. }
            | ExpectedAction::GiveCards { player } => player,
        }
    }
}

/// Bookkeeping for one lead's follow phase: who still owes a
/// FollowRole answer, and (once answered) whether each follower
/// followed or thought, so the role-action queue can be built once the
/// last answer comes in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeadState {
    leader: usize,
    leader_n_actions: u8,
    /// Other players, in clockwise order from the leader.
    followers_order: Vec<usize>,
    /// Parallel to `followers_order`; `None` until that follower has
    /// answered FOLLOWROLE.
    followed: Vec<Option<bool>>,
}

/// Context shared by every GIVECARDS frame belonging to one LEGIONARY
/// reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LegionaryDemand {
    demander: usize,
    /// Distinct materials demanded by this reveal.
    materials: Vec<Material>,
    /// Opponents still owing a GIVECARDS answer.
    remaining_targets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    CardsDrawn { player: usize, count: usize },
    JackDrawn { player: usize },
    RoleLed { player: usize, role: Role },
    RoleFollowed { player: usize, role: Role },
    RoleThought { player: usize },
    BuildingCompleted { player: usize, name: CardName },
    LegionaryRevealed { player: usize, materials: Vec<Material> },
    CardsGiven { from: usize, to: usize, count: usize },
    TurnAdvanced { next_leader: usize },
    GameEnded { winners: Vec<usize> },
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    pub done: bool,
}

impl StepOutcome {
    fn empty() -> Self {
        Self { events: Vec::new(), done: false }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game already over")]
    GameOver,
    #[error("invalid player index {0}")]
    InvalidPlayer(usize),
    #[error("unexpected action: expected {expected_kind} from player {expected_player}, got {actual_kind} from player {actual_player}")]
    UnexpectedAction {
        expected_kind: String,
        expected_player: usize,
        actual_kind: ActionKind,
        actual_player: usize,
    },
    #[error("illegal payload: {0}")]
    IllegalPayload(&'static str),
    #[error("rule violation: {0}")]
    RuleViolation(String),
    #[error("source pile is empty")]
    EmptySource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub players: Vec<PlayerState>,
    pub library: Zone,
    pub jack_pile: Zone,
    pub pool: Zone,
    pub foundations: [u32; 6],
    pub leader: usize,
    pub role_led: Option<Role>,
    pub history: Vec<GameAction>,
    pub game_over: bool,
    pub winners: Vec<usize>,

    expected: Vec<ExpectedAction>,
    round_phase: RoundPhase,
    lead_state: Option<LeadState>,
    active_legionary: Option<LegionaryDemand>,
}

const STARTING_HAND_SIZE: usize = 5;
const INITIAL_POOL_COUNT: usize = 5;

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        assert!((2..=5).contains(&config.num_players), "Glory to Rome supports 2 to 5 players");

        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut library_cards = Vec::new();
        for data in crate::catalog::CATALOG.iter() {
            for instance in 0..data.deck_count {
                library_cards.push(CardId::new(data.name, instance as u16));
            }
        }
        shuffle(&mut library_cards, &mut rng);
        let mut library = Zone::new();
        library.add_many(library_cards);

        let mut jack_pile = Zone::new();
        for instance in 0..6u16 {
            jack_pile.add(CardId::new(CardName::Jack, instance));
        }

        let mut pool = Zone::new();
        for _ in 0..INITIAL_POOL_COUNT {
            if let Some(card) = library.pop_first() {
                pool.add(card);
            }
        }

        let mut players: Vec<PlayerState> = (0..config.num_players)
            .map(|i| PlayerState::new(format!("Player {}", i + 1)))
            .collect();
        for player in players.iter_mut() {
            for _ in 0..STARTING_HAND_SIZE {
                if let Some(card) = library.pop_first() {
                    player.hand.add(card);
                }
            }
        }

        let foundations = [config.num_players as u32; 6];

        let leader = 0;
        let expected = vec![ExpectedAction::ThinkerOrLead { player: leader }];

        Self {
            config,
            players,
            library,
            jack_pile,
            pool,
            foundations,
            leader,
            role_led: None,
            history: Vec::new(),
            game_over: false,
            winners: Vec::new(),
            expected,
            round_phase: RoundPhase::AwaitingLead,
            lead_state: None,
            active_legionary: None,
        }
    }

    pub fn expected_action(&self) -> Option<&ExpectedAction> {
        self.expected.last()
    }

    pub fn expected_player(&self) -> Option<usize> {
        self.expected.last().map(|a| a.player())
    }

    /// Best-effort UI hint; not exhaustive (spec.md §6).
    pub fn legal_actions(&self, player_index: usize) -> Vec<GameAction> {
        let Some(top) = self.expected.last() else { return Vec::new() };
        if top.player() != player_index || self.game_over {
            return Vec::new();
        }
        match top {
            ExpectedAction::ThinkerOrLead { player } => vec![
                GameAction::new(*player, ActionKind::ThinkerOrLead)
                    .with_payload(ActionPayload::ThinkerOrLead(true)),
                GameAction::new(*player, ActionKind::ThinkerOrLead)
                    .with_payload(ActionPayload::ThinkerOrLead(false)),
            ],
            ExpectedAction::ThinkerType { player } => vec![
                GameAction::new(*player, ActionKind::ThinkerType)
                    .with_payload(ActionPayload::ThinkerType { for_jack: false }),
            ],
            _ => Vec::new(),
        }
    }

    /// Test/setup helper: overwrites the expected-action stack outright,
    /// mirroring `Zone::set_content`. Lets scenario tests stage a
    /// mid-turn dispatch state without replaying a full lead/follow
    /// sequence.
    pub fn set_expected_for_test(&mut self, expected: Vec<ExpectedAction>) {
        self.expected = expected;
    }

    /// Test/setup helper: stages an in-flight Legionary demand (one
    /// GIVECARDS frame per opponent, innermost last) without requiring
    /// the demander to actually have led and revealed.
    pub fn setup_legionary_demand_for_test(
        &mut self,
        demander: usize,
        opponents: &[usize],
        materials: Vec<Material>,
    ) {
        self.active_legionary = Some(LegionaryDemand {
            demander,
            materials,
            remaining_targets: opponents.len() as u32,
        });
        self.expected = opponents
            .iter()
            .rev()
            .map(|&player| ExpectedAction::GiveCards { player })
            .collect();
    }

    /// The sole mutator (spec.md §4.4 `Handle`). Clones state, applies
    /// the action to the clone, and swaps it in only on success.
    pub fn step(&mut self, action: GameAction) -> Result<StepOutcome, GameError> {
        if self.game_over {
            return Err(GameError::GameOver);
        }
        if action.player >= self.players.len() {
            return Err(GameError::InvalidPlayer(action.player));
        }
        let mut staged = self.clone();
        let outcome = staged.apply(&action)?;
        staged.history.push(action);
        *self = staged;
        Ok(outcome)
    }

    fn apply(&mut self, action: &GameAction) -> Result<StepOutcome, GameError> {
        let mut outcome = StepOutcome::empty();
        self.dispatch(action, &mut outcome)?;
        if self.game_over {
            outcome.done = true;
            outcome.events.push(GameEvent::GameEnded { winners: self.winners.clone() });
        }
        Ok(outcome)
    }

    fn expect_top(&self, action: &GameAction) -> Result<ExpectedAction, GameError> {
        let top = self.expected.last().cloned().ok_or_else(|| GameError::RuleViolation(
            "no expected action pending".into(),
        ))?;
        let kind_matches = match &top {
            ExpectedAction::ThinkerOrLead { .. } => action.kind == ActionKind::ThinkerOrLead,
            ExpectedAction::ThinkerType { .. } => matches!(
                action.kind,
                ActionKind::ThinkerType | ActionKind::UseLatrine | ActionKind::UseFountain | ActionKind::SkipThinker
            ),
            ExpectedAction::LeadRole { .. } => action.kind == ActionKind::LeadRole,
            ExpectedAction::FollowRole { .. } => action.kind == ActionKind::FollowRole,
            ExpectedAction::RoleAction { role, .. } => {
                role_for_kind(action.kind) == Some(*role)
                    || (matches!(role, Role::Craftsman | Role::Architect)
                        && action.kind == ActionKind::UseSewer)
            }
            ExpectedAction::GiveCards { .. } => action.kind == ActionKind::GiveCards,
        };
        if !kind_matches || top.player() != action.player {
            return Err(GameError::UnexpectedAction {
                expected_kind: format!("{:?}", top),
                expected_player: top.player(),
                actual_kind: action.kind,
                actual_player: action.player,
            });
        }
        Ok(top)
    }

    fn dispatch(&mut self, action: &GameAction, outcome: &mut StepOutcome) -> Result<(), GameError> {
        let top = self.expect_top(action)?;
        match top {
            ExpectedAction::ThinkerOrLead { player } => self.handle_thinker_or_lead(player, action),
            ExpectedAction::ThinkerType { player } => self.handle_thinker_type(player, action, outcome),
            ExpectedAction::LeadRole { player } => self.handle_lead_role(player, action, outcome),
            ExpectedAction::FollowRole { player } => self.handle_follow_role(player, action, outcome),
            ExpectedAction::RoleAction { player, role, remaining } => {
                if action.kind == ActionKind::UseSewer {
                    self.handle_use_sewer(player, action)
                } else {
                    self.handle_role_action(player, role, remaining, action, outcome)
                }
            }
            ExpectedAction::GiveCards { player } => self.handle_give_cards(player, action, outcome),
        }
    }

    // ---- ThinkerOrLead / ThinkerType -----------------------------------

    fn handle_thinker_or_lead(&mut self, player: usize, action: &GameAction) -> Result<(), GameError> {
        let ActionPayload::ThinkerOrLead(take_thinker) = action.payload else {
            return Err(GameError::IllegalPayload("expected ThinkerOrLead(bool)"));
        };
        self.expected.pop();
        if take_thinker {
            self.round_phase = RoundPhase::Thinking;
            self.expected.push(ExpectedAction::ThinkerType { player });
        } else {
            self.expected.push(ExpectedAction::LeadRole { player });
        }
        Ok(())
    }

    fn handle_thinker_type(
        &mut self,
        player: usize,
        action: &GameAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        match action.kind {
            ActionKind::UseLatrine => return self.handle_use_latrine(player, action),
            ActionKind::SkipThinker => {}
            ActionKind::UseFountain => {
                let ActionPayload::UseFountain { keep } = action.payload else {
                    return Err(GameError::IllegalPayload("expected UseFountain { keep }"));
                };
                if !powers::has_fountain(&self.players[player]) {
                    return Err(GameError::RuleViolation("no unused Fountain".into()));
                }
                self.players[player].fountain_used_this_turn = true;
                if keep {
                    if let Some(card) = self.library.pop_first() {
                        self.players[player].hand.add(card);
                        outcome.events.push(GameEvent::CardsDrawn { player, count: 1 });
                        self.check_library_exhausted();
                        self.expected.pop();
                        self.on_stack_drained();
                        return Ok(());
                    } else {
                        return Err(GameError::EmptySource);
                    }
                }
                // Declined: fall through to a normal blind refill below.
            }
            ActionKind::ThinkerType => {}
            _ => return Err(GameError::IllegalPayload("expected a ThinkerType-compatible action")),
        }

        let for_jack = matches!(action.payload, ActionPayload::ThinkerType { for_jack: true });
        if for_jack {
            let card = self.jack_pile.pop_first().ok_or(GameError::EmptySource)?;
            self.players[player].hand.add(card);
            outcome.events.push(GameEvent::JackDrawn { player });
        } else {
            let limit = powers::hand_limit(&self.players[player]) as usize;
            let current = self.players[player].hand.len();
            let draw_count = if current >= limit { 1 } else { limit - current };
            let mut drawn = 0;
            for _ in 0..draw_count {
                match self.library.pop_first() {
                    Some(card) => {
                        self.players[player].hand.add(card);
                        drawn += 1;
                    }
                    None => break,
                }
            }
            outcome.events.push(GameEvent::CardsDrawn { player, count: drawn });
            self.check_library_exhausted();
        }
        self.expected.pop();
        self.on_stack_drained();
        Ok(())
    }

    fn handle_use_latrine(&mut self, player: usize, action: &GameAction) -> Result<(), GameError> {
        let ActionPayload::UseLatrine { discard } = action.payload else {
            return Err(GameError::IllegalPayload("expected UseLatrine { discard }"));
        };
        if !powers::has_latrine(&self.players[player]) {
            return Err(GameError::RuleViolation("no unused Latrine".into()));
        }
        let card = self.players[player]
            .hand
            .remove(discard)
            .map_err(|_| GameError::IllegalPayload("discard card not in hand"))?;
        self.pool.add(card);
        self.players[player].latrine_used_this_turn = true;
        Ok(())
    }

    fn handle_use_sewer(&mut self, player: usize, action: &GameAction) -> Result<(), GameError> {
        let ActionPayload::UseSewer { from_pool } = action.payload else {
            return Err(GameError::IllegalPayload("expected UseSewer { from_pool }"));
        };
        if !powers::has_sewer(&self.players[player]) {
            return Err(GameError::RuleViolation("no unused Sewer".into()));
        }
        let material = from_pool.material().ok_or(GameError::IllegalPayload("cannot pull a Jack via Sewer"))?;
        let has_matching_site = self.players[player]
            .buildings
            .iter()
            .any(|b| !b.is_complete() && b.site_material == material);
        if !has_matching_site {
            return Err(GameError::RuleViolation("no in-progress building accepts that material".into()));
        }
        let card = self
            .pool
            .remove(from_pool)
            .map_err(|_| GameError::IllegalPayload("card not in pool"))?;
        self.players[player].stockpile.add(card);
        self.players[player].sewer_used_this_turn = true;
        Ok(())
    }

    fn check_library_exhausted(&mut self) {
        if self.library.is_empty() {
            self.evaluate_end_game();
        }
    }

    // ---- Lead / Follow --------------------------------------------------

    fn handle_lead_role(
        &mut self,
        player: usize,
        action: &GameAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let ActionPayload::LeadRole { role, n_actions, ref cards } = action.payload else {
            return Err(GameError::IllegalPayload("expected LeadRole { role, n_actions, cards }"));
        };
        self.validate_role_commitment(player, role, n_actions, cards, true)?;
        self.move_cards_to_camp(player, cards)?;

        self.role_led = Some(role);
        let followers_order: Vec<usize> = (1..self.players.len())
            .map(|offset| (player + offset) % self.players.len())
            .collect();
        self.lead_state = Some(LeadState {
            leader: player,
            leader_n_actions: n_actions,
            followed: vec![None; followers_order.len()],
            followers_order: followers_order.clone(),
        });

        self.expected.pop();
        self.round_phase = RoundPhase::Following;
        for &follower in followers_order.iter().rev() {
            self.expected.push(ExpectedAction::FollowRole { player: follower });
        }
        outcome.events.push(GameEvent::RoleLed { player, role });

        if followers_order.is_empty() {
            self.begin_role_actions(outcome);
        }
        Ok(())
    }

    fn handle_follow_role(
        &mut self,
        player: usize,
        action: &GameAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let ActionPayload::FollowRole { think, n_actions, ref cards } = action.payload else {
            return Err(GameError::IllegalPayload("expected FollowRole { think, n_actions, cards }"));
        };
        let role = self.role_led.expect("role_led set while following");
        let followed = if think {
            false
        } else {
            self.validate_role_commitment(player, role, n_actions, cards, false)?;
            self.move_cards_to_camp(player, cards)?;
            true
        };

        if followed {
            outcome.events.push(GameEvent::RoleFollowed { player, role });
        } else {
            outcome.events.push(GameEvent::RoleThought { player });
        }

        {
            let lead_state = self.lead_state.as_mut().expect("lead_state set while following");
            let idx = lead_state
                .followers_order
                .iter()
                .position(|&p| p == player)
                .expect("follower belongs to this lead");
            lead_state.followed[idx] = Some(followed);
        }

        self.expected.pop();
        if !followed {
            // Thinking in place of following consumes this player's
            // normal Thinker sub-rule immediately; it doesn't wait on
            // the stack since it isn't nested under anything else.
            self.run_follow_think(player, outcome);
        }
        self.on_stack_drained();
        Ok(())
    }

    fn run_follow_think(&mut self, player: usize, outcome: &mut StepOutcome) {
        let limit = powers::hand_limit(&self.players[player]) as usize;
        let current = self.players[player].hand.len();
        let draw_count = if current >= limit { 1 } else { limit - current };
        let mut drawn = 0;
        for _ in 0..draw_count {
            match self.library.pop_first() {
                Some(card) => {
                    self.players[player].hand.add(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        outcome.events.push(GameEvent::CardsDrawn { player, count: drawn });
        self.check_library_exhausted();
    }

    /// Shared LEADROLE/FOLLOWROLE legality (spec.md §4.4). Supports
    /// two payload shapes: `n_actions` singleton role/Jack matches, or
    /// `n_actions` same-size petitions of one shared role. Mixing the
    /// two shapes within a single declaration is not supported (see
    /// DESIGN.md).
    fn validate_role_commitment(
        &self,
        player: usize,
        role: Role,
        n_actions: u8,
        cards: &[CardId],
        is_lead: bool,
    ) -> Result<(), GameError> {
        if n_actions == 0 {
            return Err(GameError::IllegalPayload("n_actions must be at least 1"));
        }
        if n_actions > 1 {
            if !is_lead {
                return Err(GameError::RuleViolation("only a leader may claim multiple actions".into()));
            }
            if !self.players[player].has_completed(CardName::Palace) {
                return Err(GameError::RuleViolation("multiple actions require a completed Palace".into()));
            }
        }
        if cards.is_empty() {
            return Err(GameError::IllegalPayload("no cards named"));
        }
        for &card in cards {
            if !self.players[player].hand.contains(card) {
                return Err(GameError::IllegalPayload("named card not in hand"));
            }
        }

        let n = n_actions as usize;
        if cards.len() == n && cards.iter().all(|c| c.is_jack() || c.role() == Some(role)) {
            return Ok(());
        }

        let petition_size = powers::petition_size(&self.players[player]) as usize;
        if cards.len() == n * petition_size && !cards.is_empty() {
            let first_role = cards[0].role();
            if first_role.is_some() && cards.iter().all(|c| c.role() == first_role) {
                return Ok(());
            }
        }

        Err(GameError::RuleViolation("cards do not form a legal role match or petition".into()))
    }

    fn move_cards_to_camp(&mut self, player: usize, cards: &[CardId]) -> Result<(), GameError> {
        let taken = self.players[player]
            .give_cards_from(PlayerZone::Hand, cards)
            .map_err(|_| GameError::IllegalPayload("named card not in hand"))?;
        self.players[player].camp.add_many(taken);
        Ok(())
    }

    /// Builds the RoleAction queue once every follower has answered
    /// FOLLOWROLE: leader first, then followers who followed in
    /// clockwise order, each crediting one action per matching-role
    /// clientele card in addition to their camp action(s) (spec.md
    /// §4.4 step 4).
    fn begin_role_actions(&mut self, outcome: &mut StepOutcome) {
        let role = self.role_led.expect("role_led set when building role actions");
        let lead_state = self.lead_state.take().expect("lead_state set when building role actions");
        self.round_phase = RoundPhase::ActingRoles;

        let mut participants = Vec::new();
        participants.push((lead_state.leader, lead_state.leader_n_actions));
        for (idx, &follower) in lead_state.followers_order.iter().enumerate() {
            if lead_state.followed[idx] == Some(true) {
                participants.push((follower, 1));
            }
        }

        for &(participant, base_actions) in participants.iter().rev() {
            let bonus = self.players[participant].clientele_count_for_role(role) as u8;
            let total = base_actions + bonus;
            self.expected.push(ExpectedAction::RoleAction { player: participant, role, remaining: total });
        }

        if self.expected.is_empty() {
            self.on_stack_drained();
        }
        let _ = outcome;
    }

    // ---- Role actions -----------------------------------------------------

    fn handle_role_action(
        &mut self,
        player: usize,
        role: Role,
        remaining: u8,
        action: &GameAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        match role {
            Role::Laborer => self.handle_laborer(player, action)?,
            Role::Craftsman => self.handle_build(player, action, false, outcome)?,
            Role::Architect => self.handle_build(player, action, true, outcome)?,
            Role::Merchant => self.handle_merchant(player, action)?,
            Role::Patron => self.handle_patron(player, action)?,
            Role::Legionary => return self.handle_legionary(player, remaining, action, outcome),
        }
        self.pop_role_frame(remaining, false);
        self.on_stack_drained();
        Ok(())
    }

    /// Decrements or pops the top RoleAction frame. Legionary is
    /// always fully consumed in one call regardless of `remaining`
    /// (see `ExpectedAction::RoleAction` docs).
    fn pop_role_frame(&mut self, remaining: u8, force_pop: bool) {
        if force_pop || remaining <= 1 {
            self.expected.pop();
        } else if let Some(ExpectedAction::RoleAction { remaining: r, .. }) = self.expected.last_mut() {
            *r = remaining - 1;
        }
    }

    fn handle_laborer(&mut self, player: usize, action: &GameAction) -> Result<(), GameError> {
        let ActionPayload::Laborer { from_pool, from_hand } = action.payload else {
            return Err(GameError::IllegalPayload("expected Laborer payload"));
        };
        if from_hand.is_some() && !powers::has_dock(&self.players[player]) {
            return Err(GameError::RuleViolation("hand source requires a completed Dock".into()));
        }
        let pool_was_nonempty = !self.pool.is_empty();
        if let Some(card) = from_pool {
            let taken = self.pool.remove(card).map_err(|_| GameError::IllegalPayload("card not in pool"))?;
            self.players[player].stockpile.add(taken);
        }
        if let Some(card) = from_hand {
            let taken = self.players[player]
                .hand
                .remove(card)
                .map_err(|_| GameError::IllegalPayload("card not in hand"))?;
            self.players[player].stockpile.add(taken);
        }
        if pool_was_nonempty {
            self.evaluate_pool_end_game();
        }
        Ok(())
    }

    fn handle_build(
        &mut self,
        player: usize,
        action: &GameAction,
        is_architect: bool,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let ActionPayload::Build(ref build) = action.payload else {
            return Err(GameError::IllegalPayload("expected a Build payload"));
        };
        match build {
            BuildAction::Pass => Ok(()),
            BuildAction::LayFoundation { card, site_material } => {
                if self.foundations[material_index(*site_material)] == 0 {
                    return Err(GameError::RuleViolation("no foundation sites remain for that material".into()));
                }
                let taken = self.players[player]
                    .hand
                    .remove(*card)
                    .map_err(|_| GameError::IllegalPayload("foundation card not in hand"))?;
                self.foundations[material_index(*site_material)] -= 1;
                self.players[player]
                    .buildings
                    .push(crate::building::Building::new(taken, *site_material));
                Ok(())
            }
            BuildAction::AddMaterial { card, onto } => {
                let source_zone = if is_architect { PlayerZone::Stockpile } else { PlayerZone::Hand };
                let material = card
                    .material()
                    .ok_or(GameError::IllegalPayload("cannot build with a Jack"))?;

                let site_material = self.players[player]
                    .building(*onto)
                    .ok_or(GameError::RuleViolation("no such building".into()))?
                    .site_material;

                let scriptorium = powers::scriptorium_completes(&self.players[player], material);
                let substitutes = powers::material_substitutes(&self.players[player], material, site_material);
                if !substitutes && !scriptorium {
                    return Err(GameError::RuleViolation("material does not match the site".into()));
                }

                let taken = self.players[player]
                    .zone_mut(source_zone)
                    .remove(*card)
                    .map_err(|_| GameError::IllegalPayload("material card not in the expected source zone"))?;

                let building = self.players[player]
                    .building_mut(*onto)
                    .expect("building presence already checked");
                building
                    .add_material(taken, site_material)
                    .map_err(|e| GameError::RuleViolation(e.to_string()))?;

                let villa = powers::villa_instant_complete(*onto);
                let building = self.players[player].building_mut(*onto).expect("just mutated");
                let was_complete = building.is_complete();
                if scriptorium || villa {
                    building.force_complete();
                } else if building.materials.len() as u8 >= building.threshold() {
                    let _ = building.complete();
                }
                if !was_complete && self.players[player].building(*onto).is_some_and(|b| b.is_complete()) {
                    outcome.events.push(GameEvent::BuildingCompleted { player, name: *onto });
                    self.evaluate_end_game();
                }
                Ok(())
            }
        }
    }

    fn handle_merchant(&mut self, player: usize, action: &GameAction) -> Result<(), GameError> {
        let ActionPayload::Merchant { from_stockpile, from_hand, from_deck } = action.payload else {
            return Err(GameError::IllegalPayload("expected Merchant payload"));
        };
        if from_hand.is_some() && !powers::has_basilica(&self.players[player]) {
            return Err(GameError::RuleViolation("hand source requires a completed Basilica".into()));
        }
        if from_deck && !powers::has_atrium(&self.players[player]) {
            return Err(GameError::RuleViolation("deck source requires a completed Atrium".into()));
        }
        let added = 1 + from_hand.is_some() as u32 + from_deck as u32;
        let limit = powers::vault_limit(&self.players[player]);
        if self.players[player].vault.len() as u32 + added > limit {
            return Err(GameError::RuleViolation("vault is at its limit".into()));
        }

        let taken = self.players[player]
            .stockpile
            .remove(from_stockpile)
            .map_err(|_| GameError::IllegalPayload("card not in stockpile"))?;
        self.players[player].vault.add(taken);

        if let Some(card) = from_hand {
            let taken = self.players[player]
                .hand
                .remove(card)
                .map_err(|_| GameError::IllegalPayload("card not in hand"))?;
            self.players[player].vault.add(taken);
        }
        if from_deck {
            let card = self.library.pop_first().ok_or(GameError::EmptySource)?;
            self.players[player].vault.add(card);
            self.check_library_exhausted();
        }
        Ok(())
    }

    fn handle_patron(&mut self, player: usize, action: &GameAction) -> Result<(), GameError> {
        let (card, source): (CardId, PatronSource) = match (action.kind, &action.payload) {
            (ActionKind::PatronFromPool, ActionPayload::PatronFromPool { card }) => (*card, PatronSource::Pool),
            (ActionKind::PatronFromHand, ActionPayload::PatronFromHand { card }) => {
                if !powers::has_bar(&self.players[player]) {
                    return Err(GameError::RuleViolation("hand source requires a completed Bar".into()));
                }
                (*card, PatronSource::Hand)
            }
            (ActionKind::PatronFromDeck, ActionPayload::PatronFromDeck) => {
                if !powers::has_aqueduct(&self.players[player]) {
                    return Err(GameError::RuleViolation("deck source requires a completed Aqueduct".into()));
                }
                let card = self.library.pop_first().ok_or(GameError::EmptySource)?;
                self.check_library_exhausted();
                (card, PatronSource::Deck)
            }
            _ => return Err(GameError::IllegalPayload("payload does not match the Patron action kind")),
        };

        let role = card.role().ok_or(GameError::IllegalPayload("a Jack cannot join clientele"))?;
        if !powers::can_take_clientele(&self.players[player], role) {
            return Err(GameError::RuleViolation("clientele is at its limit for that role".into()));
        }

        match source {
            PatronSource::Pool => {
                let taken = self.pool.remove(card).map_err(|_| GameError::IllegalPayload("card not in pool"))?;
                self.players[player].clientele.add(taken);
            }
            PatronSource::Hand => {
                let taken = self.players[player]
                    .hand
                    .remove(card)
                    .map_err(|_| GameError::IllegalPayload("card not in hand"))?;
                self.players[player].clientele.add(taken);
            }
            PatronSource::Deck => {
                self.players[player].clientele.add(card);
            }
        }
        Ok(())
    }

    fn handle_legionary(
        &mut self,
        player: usize,
        cap: u8,
        action: &GameAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let ActionPayload::Legionary { ref cards } = action.payload else {
            return Err(GameError::IllegalPayload("expected Legionary payload"));
        };
        if cards.is_empty() || cards.len() > cap as usize || cards.len() > 3 {
            return Err(GameError::RuleViolation("revealed card count out of range".into()));
        }
        if cards.iter().any(|c| c.is_jack()) {
            return Err(GameError::RuleViolation("a Jack cannot be revealed for Legionary".into()));
        }
        for &card in cards {
            if !self.players[player].hand.contains(card) {
                return Err(GameError::IllegalPayload("revealed card not in hand"));
            }
        }

        let taken = self.players[player]
            .give_cards_from(PlayerZone::Hand, cards)
            .map_err(|_| GameError::IllegalPayload("revealed card not in hand"))?;
        let mut materials = Vec::new();
        for card in &taken {
            if let Some(m) = card.material() {
                if !materials.contains(&m) {
                    materials.push(m);
                }
            }
        }
        self.players[player].revealed.add_many(taken);
        outcome.events.push(GameEvent::LegionaryRevealed { player, materials: materials.clone() });

        for &material in &materials {
            if let Some(pool_card) = self.pool.iter().find(|c| c.material() == Some(material)).copied() {
                self.pool.remove(pool_card).expect("just located in pool");
                self.players[player].stockpile.add(pool_card);
            }
        }

        let opponents: Vec<usize> = (1..self.players.len())
            .map(|offset| (player + offset) % self.players.len())
            .filter(|&p| {
                powers::legionary_immunity(&self.players[p], &self.players[player])
                    != powers::LegionaryImmunity::Absolute
            })
            .collect();

        // Legionary's RoleAction frame is always fully consumed by a
        // single reveal (see `ExpectedAction::RoleAction` docs); pop
        // it now, before any GiveCards frames go on top of it, so
        // those frames — not this one — sit at the top of the stack.
        self.expected.pop();

        if opponents.is_empty() {
            return_revealed(&mut self.players[player]);
            self.on_stack_drained();
            return Ok(());
        }

        self.active_legionary = Some(LegionaryDemand {
            demander: player,
            materials,
            remaining_targets: opponents.len() as u32,
        });
        for &opponent in opponents.iter().rev() {
            self.expected.push(ExpectedAction::GiveCards { player: opponent });
        }
        Ok(())
    }

    fn handle_give_cards(
        &mut self,
        player: usize,
        action: &GameAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let ActionPayload::GiveCards { ref cards } = action.payload else {
            return Err(GameError::IllegalPayload("expected GiveCards payload"));
        };
        let demand = self
            .active_legionary
            .clone()
            .expect("a GiveCards frame implies an active demand");
        let demander = demand.demander;
        let immunity = powers::legionary_immunity(&self.players[player], &self.players[demander]);

        for &card in cards {
            if !self.players[player].hand.contains(card) {
                return Err(GameError::IllegalPayload("named card not in hand"));
            }
            match card.material() {
                Some(m) if demand.materials.contains(&m) => {}
                _ => return Err(GameError::RuleViolation("card does not match a demanded material".into())),
            }
        }

        if immunity == powers::LegionaryImmunity::None {
            for &material in &demand.materials {
                let has_one = self.players[player].hand.iter().any(|c| c.material() == Some(material));
                let gave_one = cards.iter().any(|c| c.material() == Some(material));
                if has_one && !gave_one {
                    return Err(GameError::RuleViolation(
                        "must surrender at least one card per demanded material the opponent can satisfy".into(),
                    ));
                }
            }
        }

        let taken = self.players[player]
            .give_cards_from(PlayerZone::Hand, cards)
            .map_err(|_| GameError::IllegalPayload("named card not in hand"))?;
        let given_count = taken.len();
        self.players[demander].stockpile.add_many(taken);

        if powers::has_bridge(&self.players[demander]) {
            let steal = demand
                .materials
                .iter()
                .find_map(|&m| self.players[player].stockpile.iter().find(|c| c.material() == Some(m)).copied());
            if let Some(card) = steal {
                self.players[player].stockpile.remove(card).expect("just located");
                self.players[demander].stockpile.add(card);
            }
        }
        if powers::has_coliseum(&self.players[demander]) {
            let steal = demand
                .materials
                .iter()
                .find_map(|&m| self.players[player].clientele.iter().find(|c| c.material() == Some(m)).copied());
            if let Some(card) = steal {
                self.players[player].clientele.remove(card).expect("just located");
                self.players[demander].vault.add(card);
            }
        }
        outcome.events.push(GameEvent::CardsGiven { from: player, to: demander, count: given_count });

        self.expected.pop();
        let remaining_targets = demand.remaining_targets - 1;
        if remaining_targets == 0 {
            return_revealed(&mut self.players[demander]);
            self.active_legionary = None;
        } else {
            self.active_legionary = Some(LegionaryDemand { remaining_targets, ..demand });
        }
        self.on_stack_drained();
        Ok(())
    }

    // ---- Turn advance / end game ----------------------------------------

    fn on_stack_drained(&mut self) {
        if !self.expected.is_empty() {
            return;
        }
        match self.round_phase {
            RoundPhase::Following => {
                let mut outcome = StepOutcome::empty();
                self.begin_role_actions(&mut outcome);
                if !self.expected.is_empty() {
                    return;
                }
                self.advance_turn();
            }
            RoundPhase::Thinking | RoundPhase::ActingRoles => self.advance_turn(),
            RoundPhase::AwaitingLead => {}
        }
    }

    fn advance_turn(&mut self) {
        if self.game_over {
            return;
        }
        for player in self.players.iter_mut() {
            player.reset_for_new_turn();
            return_revealed(player);
        }
        self.role_led = None;
        self.lead_state = None;
        self.active_legionary = None;
        self.leader = (self.leader + 1) % self.players.len();
        self.round_phase = RoundPhase::AwaitingLead;
        self.expected = vec![ExpectedAction::ThinkerOrLead { player: self.leader }];
        self.evaluate_end_game();
    }

    /// Library-empty or victory-threshold end-game trigger (spec.md
    /// §4.5), checked whenever either condition could newly hold.
    fn evaluate_end_game(&mut self) {
        if self.game_over {
            return;
        }
        let library_empty = self.library.is_empty();
        let threshold_reached = self
            .players
            .iter()
            .any(|p| p.influence() >= self.config.victory_threshold);
        if !library_empty && !threshold_reached {
            return;
        }
        self.finish_game();
    }

    /// Pool-empty end-game trigger, checked only at the end of a
    /// Laborer action that found the pool non-empty beforehand
    /// (spec.md §4.5 "game-end variant"). Callers only invoke this
    /// when the pool held at least one card before the Laborer ran,
    /// so a Laborer that takes nothing from an already-empty pool
    /// (e.g. hand-only via a completed Dock) never spuriously ends
    /// the game.
    fn evaluate_pool_end_game(&mut self) {
        if self.game_over || !self.pool.is_empty() {
            return;
        }
        self.finish_game();
    }

    fn finish_game(&mut self) {
        self.game_over = true;
        let scores: Vec<u32> = self.players.iter().map(scoring::score).collect();
        let best = scores.iter().copied().max().unwrap_or(0);
        self.winners = scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == best)
            .map(|(i, _)| i)
            .collect();
        self.expected.clear();
    }
}

enum PatronSource {
    Pool,
    Hand,
    Deck,
}

fn role_for_kind(kind: ActionKind) -> Option<Role> {
    match kind {
        ActionKind::Laborer => Some(Role::Laborer),
        ActionKind::Craftsman => Some(Role::Craftsman),
        ActionKind::Architect => Some(Role::Architect),
        ActionKind::Merchant => Some(Role::Merchant),
        ActionKind::Legionary => Some(Role::Legionary),
        ActionKind::PatronFromPool | ActionKind::PatronFromHand | ActionKind::PatronFromDeck => Some(Role::Patron),
        _ => None,
    }
}

fn material_index(material: Material) -> usize {
    Material::ALL.iter().position(|&m| m == material).expect("Material::ALL is exhaustive")
}

/// Moves a player's `revealed` cards back to their hand: they were
/// always logically still held (spec.md §3), this just undoes the
/// physical relocation used to model the "visible but held" view.
fn return_revealed(player: &mut PlayerState) {
    let cards: Vec<CardId> = player.revealed.iter().copied().collect();
    for card in cards {
        player.revealed.remove(card).expect("just iterated");
        player.hand.add(card);
    }
}

fn shuffle(cards: &mut [CardId], rng: &mut StdRng) {
    use rand::Rng;
    for i in (1..cards.len()).rev() {
        let j = rng.gen_range(0..=i);
        cards.swap(i, j);
    }
}
