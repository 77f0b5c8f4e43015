use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The six roles a lead/follow/petition can commit to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Laborer,
    Craftsman,
    Architect,
    Merchant,
    Legionary,
    Patron,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Laborer,
        Role::Craftsman,
        Role::Architect,
        Role::Merchant,
        Role::Legionary,
        Role::Patron,
    ];
}

/// The six materials. Each is linked to exactly one role by a fixed
/// bijection, see [`Material::role`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Material {
    Rubble,
    Wood,
    Concrete,
    Brick,
    Marble,
    Stone,
}

impl Material {
    pub const ALL: [Material; 6] = [
        Material::Rubble,
        Material::Wood,
        Material::Concrete,
        Material::Brick,
        Material::Marble,
        Material::Stone,
    ];

    /// The role linked to this material at the color level.
    pub const fn role(self) -> Role {
        match self {
            Material::Rubble => Role::Laborer,
            Material::Wood => Role::Craftsman,
            Material::Concrete => Role::Architect,
            Material::Brick => Role::Legionary,
            Material::Marble => Role::Patron,
            Material::Stone => Role::Merchant,
        }
    }

    /// Completion threshold for a foundation of this material.
    pub const fn value(self) -> u8 {
        match self {
            Material::Rubble => 1,
            Material::Wood => 1,
            Material::Concrete => 2,
            Material::Brick => 2,
            Material::Marble => 3,
            Material::Stone => 3,
        }
    }
}

/// Tagged action kinds accepted by `Game::handle`. Doubles as the
/// vocabulary for entries on the expected-action stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    ThinkerOrLead,
    ThinkerType,
    LeadRole,
    FollowRole,
    Laborer,
    Craftsman,
    Architect,
    Merchant,
    Legionary,
    PatronFromPool,
    PatronFromHand,
    PatronFromDeck,
    GiveCards,
    SkipThinker,
    UseLatrine,
    UseSewer,
    UseFountain,
}
