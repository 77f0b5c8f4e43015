//! Card identity. Two physical cards sharing a name are distinguished
//! by `instance`, so zones never ambiguate duplicates (spec.md
//! "Design Notes: card identity vs name").

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{CardName, card_data};
use crate::types::{Material, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId {
    pub name: CardName,
    pub instance: u16,
}

impl CardId {
    pub const fn new(name: CardName, instance: u16) -> Self {
        Self { name, instance }
    }

    pub fn is_jack(&self) -> bool {
        matches!(self.name, CardName::Jack)
    }

    /// `None` for the Jack, which carries no material.
    pub fn material(&self) -> Option<Material> {
        if self.is_jack() {
            None
        } else {
            card_data(self.name).map(|d| d.material)
        }
    }

    /// `None` for the Jack, which has no fixed role (it is a wild
    /// role-leader).
    pub fn role(&self) -> Option<Role> {
        if self.is_jack() {
            None
        } else {
            card_data(self.name).map(|d| d.role)
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.instance)
    }
}
