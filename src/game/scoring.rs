//! Final score computation (spec.md §4.5): influence, vault value, and
//! completed-building bonuses.

use crate::catalog::{BuildingPower, CardName};
use crate::player::PlayerState;
use crate::types::{Material, Role};

/// Vault value of one card: its material's face value, except Marble
/// counts as zero unless the player has completed Gate (which scores
/// Marble as Stone).
fn vault_card_value(player: &PlayerState, material: Material) -> u32 {
    if material == Material::Marble && !player.has_completed(CardName::Gate) {
        0
    } else {
        material.value() as u32
    }
}

pub fn vault_score(player: &PlayerState) -> u32 {
    player
        .vault
        .iter()
        .filter_map(|c| c.material())
        .map(|m| vault_card_value(player, m))
        .sum()
}

fn statue_bonus(player: &PlayerState) -> u32 {
    match player.building(CardName::Statue).filter(|b| b.is_complete()).map(|b| b.power()) {
        Some(BuildingPower::StatueScoringBonus(n)) => n as u32,
        _ => 0,
    }
}

fn forum_bonus(player: &PlayerState) -> u32 {
    let Some(power) = player.building(CardName::Forum).filter(|b| b.is_complete()).map(|b| b.power())
    else {
        return 0;
    };
    let BuildingPower::ForumAllRolesBonus(n) = power else {
        return 0;
    };
    let covers_all_roles = Role::ALL
        .iter()
        .all(|&role| player.clientele_count_for_role(role) > 0);
    if covers_all_roles { n as u32 } else { 0 }
}

/// Total score: influence + vault value + building bonuses.
pub fn score(player: &PlayerState) -> u32 {
    player.influence() + vault_score(player) + statue_bonus(player) + forum_bonus(player)
}
