//! Action messages accepted by `Game::handle` (spec.md §6).

use serde::{Deserialize, Serialize};

use crate::card::CardId;
use crate::types::{ActionKind, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameAction {
    pub kind: ActionKind,
    pub player: usize,
    pub payload: ActionPayload,
}

impl GameAction {
    pub fn new(player: usize, kind: ActionKind) -> Self {
        Self {
            kind,
            player,
            payload: ActionPayload::None,
        }
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// A laid-foundation or add-material declaration shared by Craftsman
/// and Architect payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BuildAction {
    /// Lay a new foundation: `card` from hand becomes the building's
    /// foundation, sited on a pile of `site_material`.
    LayFoundation { card: CardId, site_material: crate::types::Material },
    /// Add one material card (from hand for Craftsman, from stockpile
    /// for Architect) to an in-progress building named `onto`.
    AddMaterial { card: CardId, onto: crate::catalog::CardName },
    Pass,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionPayload {
    None,
    /// THINKERORLEAD: true = take Thinker, false = Lead.
    ThinkerOrLead(bool),
    /// THINKERTYPE.
    ThinkerType { for_jack: bool },
    /// LEADROLE.
    LeadRole {
        role: Role,
        n_actions: u8,
        cards: Vec<CardId>,
    },
    /// FOLLOWROLE.
    FollowRole {
        think: bool,
        n_actions: u8,
        cards: Vec<CardId>,
    },
    /// LABORER.
    Laborer {
        from_pool: Option<CardId>,
        from_hand: Option<CardId>,
    },
    /// CRAFTSMAN / ARCHITECT.
    Build(BuildAction),
    /// MERCHANT.
    Merchant {
        from_stockpile: CardId,
        from_hand: Option<CardId>,
        from_deck: bool,
    },
    /// PATRONFROMPOOL.
    PatronFromPool { card: CardId },
    /// PATRONFROMHAND.
    PatronFromHand { card: CardId },
    /// PATRONFROMDECK: no card named, draw is sight-unseen.
    PatronFromDeck,
    /// LEGIONARY.
    Legionary { cards: Vec<CardId> },
    /// GIVECARDS.
    GiveCards { cards: Vec<CardId> },
    /// USELATRINE.
    UseLatrine { discard: CardId },
    /// USESEWER.
    UseSewer { from_pool: CardId },
    /// USEFOUNTAIN: true = keep the peeked card, false = decline.
    UseFountain { keep: bool },
    /// SKIPTHINKER: decline an offered one-shot power.
    SkipThinker,
}
