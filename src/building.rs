//! A per-player construct: a foundation card, a site material, the
//! material cards placed on it, and a completion flag (spec.md §4.2).

use serde::{Deserialize, Serialize};

use crate::card::CardId;
use crate::catalog::{BuildingPower, card_data_unchecked};
use crate::types::Material;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildingError {
    #[error("building already complete")]
    AlreadyComplete,
    #[error("material does not match the site and no substitution applies")]
    MaterialMismatch,
    #[error("building already has enough materials to complete")]
    AtThreshold,
    #[error("threshold not met")]
    ThresholdNotMet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub foundation: CardId,
    pub site_material: Material,
    pub materials: Vec<CardId>,
    pub complete: bool,
    /// Flags a one-shot building power as spent, for powers that are
    /// used at most once per game (none of this catalog's powers are;
    /// the field exists because spec.md's data model names it).
    pub one_shot_used: bool,
}

impl Building {
    pub fn new(foundation: CardId, site_material: Material) -> Self {
        Self {
            foundation,
            site_material,
            materials: Vec::new(),
            complete: false,
            one_shot_used: false,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.site_material.value()
    }

    pub fn power(&self) -> BuildingPower {
        if self.foundation.is_jack() {
            BuildingPower::None
        } else {
            card_data_unchecked(self.foundation.name).power
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn foundation_name(&self) -> crate::catalog::CardName {
        self.foundation.name
    }

    pub fn has_material(&self, card: CardId) -> bool {
        self.materials.contains(&card)
    }

    /// Adds a material card to the building. `material` is the
    /// material the card is being placed *as* (equal to the card's
    /// own material unless a substitution power applies — callers in
    /// `game/state.rs` resolve substitution via `game/powers.rs`
    /// before calling this).
    pub fn add_material(
        &mut self,
        card: CardId,
        material_used_as: Material,
    ) -> Result<(), BuildingError> {
        if self.complete {
            return Err(BuildingError::AlreadyComplete);
        }
        if material_used_as != self.site_material {
            return Err(BuildingError::MaterialMismatch);
        }
        if self.materials.len() as u8 >= self.threshold() {
            return Err(BuildingError::AtThreshold);
        }
        self.materials.push(card);
        Ok(())
    }

    /// Idempotent: succeeds without effect if already complete, fails
    /// only if the threshold has not been met.
    pub fn complete(&mut self) -> Result<(), BuildingError> {
        if self.complete {
            return Ok(());
        }
        if (self.materials.len() as u8) < self.threshold() {
            return Err(BuildingError::ThresholdNotMet);
        }
        self.complete = true;
        Ok(())
    }

    /// Forces completion regardless of threshold (Villa's one-action
    /// completion, Scriptorium's marble-completes-anything power).
    pub fn force_complete(&mut self) {
        self.complete = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardName;

    fn foundation(name: CardName) -> CardId {
        CardId::new(name, 0)
    }

    #[test]
    fn add_material_completes_at_threshold() {
        let mut b = Building::new(foundation(CardName::Insula), Material::Wood);
        assert_eq!(b.threshold(), 1);
        b.add_material(CardId::new(CardName::Insula, 1), Material::Wood).unwrap();
        assert!(b.complete().is_ok());
        assert!(b.is_complete());
    }

    #[test]
    fn complete_before_threshold_fails() {
        let mut b = Building::new(foundation(CardName::Gate), Material::Concrete);
        assert_eq!(b.threshold(), 2);
        b.add_material(CardId::new(CardName::Gate, 1), Material::Concrete).unwrap();
        assert_eq!(b.complete(), Err(BuildingError::ThresholdNotMet));
    }

    #[test]
    fn complete_is_idempotent() {
        let mut b = Building::new(foundation(CardName::Insula), Material::Wood);
        b.add_material(CardId::new(CardName::Insula, 1), Material::Wood).unwrap();
        b.complete().unwrap();
        assert!(b.complete().is_ok(), "completing an already-complete building is a no-op success");
    }

    #[test]
    fn add_material_rejects_mismatched_material() {
        let mut b = Building::new(foundation(CardName::Gate), Material::Concrete);
        let err = b.add_material(CardId::new(CardName::Road, 0), Material::Rubble).unwrap_err();
        assert_eq!(err, BuildingError::MaterialMismatch);
    }

    #[test]
    fn add_material_rejects_once_complete() {
        let mut b = Building::new(foundation(CardName::Insula), Material::Wood);
        b.add_material(CardId::new(CardName::Insula, 1), Material::Wood).unwrap();
        b.complete().unwrap();
        let err = b.add_material(CardId::new(CardName::Insula, 2), Material::Wood).unwrap_err();
        assert_eq!(err, BuildingError::AlreadyComplete);
    }
}
