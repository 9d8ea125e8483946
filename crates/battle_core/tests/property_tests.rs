//! Property tests over randomly generated battles.
//!
//! Whatever the fleets, designs and doctrines, a battle must stay on the
//! board, never create ships, respect the round cap, and keep every
//! player's record limited to that player's own tokens.

use battle_core::prelude::*;
use battle_test_utils::determinism::strategies::arb_battle;
use proptest::prelude::*;

fn resolve(designs: &DesignCatalog, fleets: &[Fleet], rules: &BattleRules) -> BattleOutcome {
    let relations = RelationTable::new();
    BattleEngine::new(rules, designs, &relations)
        .resolve(fleets)
        .expect("generated battles only use known designs")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tokens_stay_on_board((designs, fleets) in arb_battle(5)) {
        let rules = BattleRules::default();
        let outcome = resolve(&designs, &fleets, &rules);
        let board = rules.board();
        for round in 0..=outcome.record.stats.rounds_fought {
            for position in outcome.record.positions_after_round(round).values() {
                prop_assert!(board.contains(*position));
            }
        }
    }

    #[test]
    fn prop_ships_never_increase((designs, fleets) in arb_battle(5)) {
        let outcome = resolve(&designs, &fleets, &BattleRules::default());
        prop_assert_eq!(outcome.fleets.len(), fleets.len());
        for (before, after) in fleets.iter().zip(&outcome.fleets) {
            prop_assert!(after.fleet.ship_count() <= before.ship_count());
            prop_assert_eq!(after.destroyed, after.fleet.stacks.is_empty());
        }
    }

    #[test]
    fn prop_round_cap_holds(
        (designs, fleets) in arb_battle(5),
        max_rounds in 1u32..6,
    ) {
        let rules = BattleRules {
            max_rounds,
            ..BattleRules::default()
        };
        let outcome = resolve(&designs, &fleets, &rules);
        prop_assert!(outcome.record.stats.rounds_fought <= max_rounds);
        for log in outcome.record.players.values() {
            for (round, _) in log.rounds() {
                prop_assert!((1..=max_rounds).contains(&round));
            }
        }
    }

    #[test]
    fn prop_records_reference_own_tokens((designs, fleets) in arb_battle(5)) {
        let outcome = resolve(&designs, &fleets, &BattleRules::default());
        let record = &outcome.record;
        for (player, log) in &record.players {
            for (_, actions) in log.rounds() {
                for action in actions {
                    let token = &record.tokens[action.token() as usize];
                    prop_assert_eq!(token.player, *player);
                }
            }
        }
    }

    #[test]
    fn prop_losses_match_detonations((designs, fleets) in arb_battle(5)) {
        let outcome = resolve(&designs, &fleets, &BattleRules::default());
        let record = &outcome.record;
        let detonated: u32 = record
            .players
            .values()
            .flat_map(|log| log.rounds().flat_map(|(_, actions)| actions.iter()))
            .filter(|action| matches!(action, BattleAction::Detonate { .. }))
            .count() as u32;
        let surviving_stacks = outcome
            .fleets
            .iter()
            .flat_map(|f| &f.fleet.stacks)
            .count();
        prop_assert_eq!(detonated as usize, record.tokens.len() - surviving_stacks);
    }
}
