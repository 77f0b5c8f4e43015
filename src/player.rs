//! A participant's owned state: hand, stockpile, vault, clientele,
//! camp, revealed, buildings, and per-turn counters (spec.md §4.3).

use serde::{Deserialize, Serialize};

use crate::building::Building;
use crate::card::CardId;
use crate::catalog::CardName;
use crate::types::Role;
use crate::zone::Zone;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub hand: Zone,
    pub stockpile: Zone,
    pub vault: Zone,
    pub clientele: Zone,
    pub camp: Zone,
    pub revealed: Zone,
    pub buildings: Vec<Building>,

    pub latrine_used_this_turn: bool,
    pub sewer_used_this_turn: bool,
    pub fountain_used_this_turn: bool,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Zone::new(),
            stockpile: Zone::new(),
            vault: Zone::new(),
            clientele: Zone::new(),
            camp: Zone::new(),
            revealed: Zone::new(),
            buildings: Vec::new(),
            latrine_used_this_turn: false,
            sewer_used_this_turn: false,
            fountain_used_this_turn: false,
        }
    }

    pub fn reset_for_new_turn(&mut self) {
        self.latrine_used_this_turn = false;
        self.sewer_used_this_turn = false;
        self.fountain_used_this_turn = false;
    }

    /// Moves named cards from `from_zone` into the equivalent owned
    /// zone, named by a field accessor passed by the caller. Kept as
    /// a pair of explicit helpers below rather than a single generic
    /// mover, since Rust cannot name `self.$zone` dynamically without
    /// a macro the teacher's style does not otherwise reach for.
    pub fn receive_cards(&mut self, into: PlayerZone, cards: impl IntoIterator<Item = CardId>) {
        self.zone_mut(into).add_many(cards);
    }

    pub fn give_cards_from(
        &mut self,
        from: PlayerZone,
        cards: &[CardId],
    ) -> Result<Vec<CardId>, crate::zone::CardNotFound> {
        let mut taken = Vec::with_capacity(cards.len());
        for &card in cards {
            taken.push(self.zone_mut(from).remove(card)?);
        }
        Ok(taken)
    }

    pub fn zone(&self, which: PlayerZone) -> &Zone {
        match which {
            PlayerZone::Hand => &self.hand,
            PlayerZone::Stockpile => &self.stockpile,
            PlayerZone::Vault => &self.vault,
            PlayerZone::Clientele => &self.clientele,
            PlayerZone::Camp => &self.camp,
            PlayerZone::Revealed => &self.revealed,
        }
    }

    pub fn zone_mut(&mut self, which: PlayerZone) -> &mut Zone {
        match which {
            PlayerZone::Hand => &mut self.hand,
            PlayerZone::Stockpile => &mut self.stockpile,
            PlayerZone::Vault => &mut self.vault,
            PlayerZone::Clientele => &mut self.clientele,
            PlayerZone::Camp => &mut self.camp,
            PlayerZone::Revealed => &mut self.revealed,
        }
    }

    /// Influence, derived from the number of sites this player has
    /// claimed, i.e. one per *completed* building (spec.md GLOSSARY)
    /// — see SPEC_FULL.md / DESIGN.md for why this is computed rather
    /// than stored as a separate pile.
    pub fn influence(&self) -> u32 {
        self.buildings.iter().filter(|b| b.is_complete()).count() as u32
    }

    pub fn clientele_count_for_role(&self, role: Role) -> usize {
        self.clientele
            .iter()
            .filter(|c| c.role() == Some(role))
            .count()
    }

    pub fn completed_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter().filter(|b| b.is_complete())
    }

    pub fn has_completed(&self, name: CardName) -> bool {
        self.buildings
            .iter()
            .any(|b| b.is_complete() && b.foundation_name() == name)
    }

    pub fn building_mut(&mut self, name: CardName) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.foundation_name() == name)
    }

    pub fn building(&self, name: CardName) -> Option<&Building> {
        self.buildings.iter().find(|b| b.foundation_name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerZone {
    Hand,
    Stockpile,
    Vault,
    Clientele,
    Camp,
    Revealed,
}
