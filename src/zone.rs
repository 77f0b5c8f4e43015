//! An ordered multiset of card identities. Used ubiquitously: hand,
//! pool, stockpile, vault, clientele, camp, library, jack pile,
//! revealed (spec.md §4.1).

use serde::{Deserialize, Serialize};

use crate::card::CardId;
use crate::catalog::CardName;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    cards: Vec<CardId>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("card {0} not present in zone")]
pub struct CardNotFound(pub CardId);

impl Zone {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn add(&mut self, card: CardId) {
        self.cards.push(card);
    }

    pub fn add_many(&mut self, cards: impl IntoIterator<Item = CardId>) {
        self.cards.extend(cards);
    }

    /// Removes the first occurrence of `card`, preserving the order
    /// of the remaining elements. Fails if absent.
    pub fn remove(&mut self, card: CardId) -> Result<CardId, CardNotFound> {
        let pos = self
            .cards
            .iter()
            .position(|c| *c == card)
            .ok_or(CardNotFound(card))?;
        Ok(self.cards.remove(pos))
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.cards.iter().any(|c| *c == card)
    }

    pub fn count_by_name(&self, name: CardName) -> usize {
        self.cards.iter().filter(|c| c.name == name).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardId> {
        self.cards.iter()
    }

    pub fn first(&self) -> Option<CardId> {
        self.cards.first().copied()
    }

    pub fn pop_first(&mut self) -> Option<CardId> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Test/setup helper: replaces the zone's contents outright.
    pub fn set_content(&mut self, cards: Vec<CardId>) {
        self.cards = cards;
    }

    pub fn as_slice(&self) -> &[CardId] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardName;

    fn card(instance: u16) -> CardId {
        CardId::new(CardName::Road, instance)
    }

    #[test]
    fn add_and_contains() {
        let mut z = Zone::new();
        assert!(!z.contains(card(0)));
        z.add(card(0));
        assert!(z.contains(card(0)));
        assert_eq!(z.len(), 1);
    }

    #[test]
    fn remove_preserves_order_of_remainder() {
        let mut z = Zone::new();
        z.add_many([card(0), card(1), card(2)]);
        z.remove(card(1)).unwrap();
        assert_eq!(z.as_slice(), &[card(0), card(2)]);
    }

    #[test]
    fn remove_absent_card_fails() {
        let mut z = Zone::new();
        z.add(card(0));
        assert!(z.remove(card(1)).is_err());
        assert_eq!(z.len(), 1, "a failed remove must not mutate the zone");
    }

    #[test]
    fn is_a_multiset_no_dedup() {
        let mut z = Zone::new();
        z.add(card(0));
        z.add(card(0));
        assert_eq!(z.len(), 2);
        assert_eq!(z.count_by_name(CardName::Road), 2);
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut z = Zone::new();
        z.add_many([card(2), card(0), card(1)]);
        let ids: Vec<CardId> = z.iter().copied().collect();
        assert_eq!(ids, vec![card(2), card(0), card(1)]);
    }
}
