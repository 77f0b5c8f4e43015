//! Property tests for the conservation and monotonicity invariants of
//! spec.md §8. Scoped to Thinker-only play (always declining Lead):
//! this is legal on every turn regardless of hand contents, so it
//! exercises an arbitrarily long, arbitrarily-seeded random walk
//! through turn advancement and jack/card drawing without needing a
//! model of full role-action legality.

use gtr_core::action::{ActionPayload, GameAction};
use gtr_core::game::{GameConfig, GameState};
use gtr_core::types::ActionKind;
use proptest::prelude::*;

fn total_deck_size() -> usize {
    gtr_core::catalog::CATALOG.iter().map(|c| c.deck_count as usize).sum()
}

/// Every card identity instantiated at game start is in exactly one
/// zone: some player's hand, the library, or (for jacks) the jack
/// pile. No duplicates, none missing (spec.md §8 invariant 1).
fn assert_conservation(state: &GameState) {
    let mut seen = std::collections::HashSet::new();
    let mut count = 0usize;
    let mut check_zone = |zone: &gtr_core::zone::Zone| {
        for &card in zone.iter() {
            assert!(seen.insert(card), "duplicate card identity {card} across zones");
            count += 1;
        }
    };
    check_zone(&state.library);
    check_zone(&state.jack_pile);
    check_zone(&state.pool);
    for player in &state.players {
        check_zone(&player.hand);
        check_zone(&player.stockpile);
        check_zone(&player.vault);
        check_zone(&player.clientele);
        check_zone(&player.camp);
        check_zone(&player.revealed);
        for building in &player.buildings {
            assert!(seen.insert(building.foundation), "duplicate foundation card {}", building.foundation);
            count += 1;
            for &m in &building.materials {
                assert!(seen.insert(m), "duplicate material card {m}");
                count += 1;
            }
        }
    }
    assert_eq!(count, total_deck_size() + 6, "total card identities must equal deck size plus the jack pile");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn conservation_holds_across_thinker_only_play(seed in any::<u64>(), num_players in 2usize..=5, turns in 1usize..60) {
        let mut state = GameState::new(GameConfig { num_players, seed, victory_threshold: 1_000 });
        assert_conservation(&state);
        let mut prev_library_len = state.library.len();

        for _ in 0..turns {
            if state.game_over {
                break;
            }
            let player = state.expected_player().expect("game not over implies a pending action");
            state
                .step(GameAction::new(player, ActionKind::ThinkerOrLead).with_payload(ActionPayload::ThinkerOrLead(true)))
                .unwrap();
            let result = state.step(
                GameAction::new(player, ActionKind::ThinkerType)
                    .with_payload(ActionPayload::ThinkerType { for_jack: false }),
            );
            prop_assert!(result.is_ok());

            assert_conservation(&state);
            prop_assert!(
                state.library.len() <= prev_library_len,
                "library length must be non-increasing absent explicit return-to-deck effects"
            );
            prev_library_len = state.library.len();
            prop_assert!(!state.expected_action().is_none() || state.game_over);
        }
    }

    #[test]
    fn rejected_action_leaves_state_bit_identical(seed in any::<u64>(), num_players in 2usize..=5) {
        let mut state = GameState::new(GameConfig { num_players, seed, victory_threshold: 10 });
        let before = serde_json::to_string(&state).unwrap();

        // Wrong player attempting the pending ThinkerOrLead action.
        let wrong_player = (state.expected_player().unwrap() + 1) % num_players;
        let result = state.step(
            GameAction::new(wrong_player, ActionKind::ThinkerOrLead)
                .with_payload(ActionPayload::ThinkerOrLead(true)),
        );

        prop_assert!(result.is_err());
        prop_assert_eq!(serde_json::to_string(&state).unwrap(), before);
    }
}
