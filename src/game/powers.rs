//! Building-power predicates, queried at decision points rather than
//! branched on throughout the dispatcher (spec.md §9). Free functions
//! over `&PlayerState` so this module can sit below `game/state.rs` in
//! the dependency order without `PlayerState` depending back up into
//! `game`.

use crate::catalog::{BuildingPower, CardName};
use crate::player::PlayerState;
use crate::types::{Material, Role};

const BASE_VAULT_LIMIT: u32 = 3;
const BASE_HAND_LIMIT: u32 = 5;
const BASE_PETITION_SIZE: u8 = 3;

fn power_of(player: &PlayerState, name: CardName) -> Option<BuildingPower> {
    player.building(name).filter(|b| b.is_complete()).map(|b| b.power())
}

/// `3 + influence + Atrium_bonus` (spec.md §4.3).
pub fn vault_limit(player: &PlayerState) -> u32 {
    BASE_VAULT_LIMIT + player.influence() + vault_limit_bonus(player)
}

/// Atrium's vault-limit bonus, special-cased by name per the note in
/// `catalog.rs` rather than double-encoded as a second `BuildingPower`
/// variant on the same card.
pub fn vault_limit_bonus(player: &PlayerState) -> u32 {
    if player.has_completed(CardName::Atrium) { 2 } else { 0 }
}

/// `influence + Bath_bonus + LudusMagna_bonus` (spec.md §4.3).
pub fn clientele_limit_per_role(player: &PlayerState) -> u32 {
    player.influence() + clientele_limit_bonus(player)
}

fn clientele_limit_bonus(player: &PlayerState) -> u32 {
    [CardName::Bath, CardName::LudusMagna]
        .into_iter()
        .filter_map(|n| power_of(player, n))
        .map(|p| match p {
            BuildingPower::ClienteleLimitBonus(n) => n as u32,
            _ => 0,
        })
        .sum()
}

pub fn can_take_clientele(player: &PlayerState, role: Role) -> bool {
    (player.clientele_count_for_role(role) as u32) < clientele_limit_per_role(player)
}

pub fn hand_limit(player: &PlayerState) -> u32 {
    BASE_HAND_LIMIT + hand_limit_bonus(player)
}

fn hand_limit_bonus(player: &PlayerState) -> u32 {
    [CardName::Shrine, CardName::Temple]
        .into_iter()
        .filter_map(|n| power_of(player, n))
        .map(|p| match p {
            BuildingPower::HandLimitBonus(n) => n as u32,
            _ => 0,
        })
        .sum()
}

/// Petition size: 3 cards of one role normally, 2 with a completed
/// Circus.
pub fn petition_size(player: &PlayerState) -> u8 {
    if player.has_completed(CardName::Circus) {
        BASE_PETITION_SIZE - 1
    } else {
        BASE_PETITION_SIZE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegionaryImmunity {
    /// No immunity; the demand proceeds normally.
    None,
    /// Declined unless the demander has a completed Bridge.
    Pierceable,
    /// Always declined, even against a demander with Bridge.
    Absolute,
}

pub fn legionary_immunity(target: &PlayerState, demander: &PlayerState) -> LegionaryImmunity {
    if target.has_completed(CardName::Wall) {
        return LegionaryImmunity::Absolute;
    }
    if target.has_completed(CardName::Palisade) {
        if demander.has_completed(CardName::Bridge) {
            return LegionaryImmunity::None;
        }
        return LegionaryImmunity::Pierceable;
    }
    LegionaryImmunity::None
}

pub fn has_bridge(player: &PlayerState) -> bool {
    player.has_completed(CardName::Bridge)
}

pub fn has_coliseum(player: &PlayerState) -> bool {
    player.has_completed(CardName::Coliseum)
}

/// Palace's extra lead actions. Resolved (Open Question, see
/// DESIGN.md) as: the lead action's base `n_actions` of 1, plus 1 for
/// each additional full-size matching group (role match or petition)
/// beyond the first the leader can supply, capped by cards actually
/// offered. The leader declares `n_actions`; this function only gates
/// whether more than 1 is ever legal.
pub fn palace_extra_actions_allowed(player: &PlayerState) -> bool {
    player.has_completed(CardName::Palace)
}

/// Whether `material_in_hand` may stand in for `site_material` when
/// adding to a building, per Tower (Rubble anywhere) and Road (Stone
/// for Stone sites — a no-op restatement, kept for symmetry) powers
/// held by the *acting* player (powers apply regardless of whose
/// building is targeted, since they describe what the player may
/// spend, not what the building accepts).
pub fn material_substitutes(
    player: &PlayerState,
    material_in_hand: Material,
    site_material: Material,
) -> bool {
    if material_in_hand == site_material {
        return true;
    }
    if material_in_hand == Material::Rubble && player.has_completed(CardName::Tower) {
        return true;
    }
    false
}

/// Whether a Marble card in hand/stockpile may complete `building`
/// outright regardless of remaining threshold (Scriptorium).
pub fn scriptorium_completes(player: &PlayerState, material_offered: Material) -> bool {
    material_offered == Material::Marble && player.has_completed(CardName::Scriptorium)
}

/// Whether `onto` is itself a Villa foundation, which completes in a
/// single Architect/Craftsman action regardless of threshold once
/// started (the power belongs to the building being built, not to a
/// separately completed Villa elsewhere on the board).
pub fn villa_instant_complete(onto: CardName) -> bool {
    onto == CardName::Villa
}

pub fn has_dock(player: &PlayerState) -> bool {
    power_of(player, CardName::Dock).is_some()
}

pub fn has_bar(player: &PlayerState) -> bool {
    power_of(player, CardName::Bar).is_some()
}

pub fn has_aqueduct(player: &PlayerState) -> bool {
    power_of(player, CardName::Aqueduct).is_some()
}

pub fn has_basilica(player: &PlayerState) -> bool {
    power_of(player, CardName::Basilica).is_some()
}

pub fn has_atrium(player: &PlayerState) -> bool {
    power_of(player, CardName::Atrium).is_some()
}

pub fn has_latrine(player: &PlayerState) -> bool {
    power_of(player, CardName::Latrine).is_some() && !player.latrine_used_this_turn
}

pub fn has_sewer(player: &PlayerState) -> bool {
    power_of(player, CardName::Sewer).is_some() && !player.sewer_used_this_turn
}

pub fn has_fountain(player: &PlayerState) -> bool {
    power_of(player, CardName::Fountain).is_some() && !player.fountain_used_this_turn
}
