//! End-to-end battle tests against the standard fixture catalog.
//!
//! These tests drive whole battles through the public API and check the
//! regression fixtures the turn pipeline relies on.

use battle_core::movement::build_movement_order;
use battle_core::prelude::*;
use battle_core::token::TokenStats;
use battle_test_utils::fixtures::{
    aggressive_fleet, armed_starbase, canonical_fixture, cruiser, freighter, resolve, skirmish,
    standard_catalog, CRUISER, DESTROYER, FREIGHTER, SCOUT,
};

fn token_for(design: &ShipDesign) -> Token {
    Token::new(
        0,
        1,
        1,
        Doctrine::default(),
        &ShipStack::new(design.id, 1),
        TokenStats::from_design(design),
    )
}

fn build(fleets: &[Fleet], designs: &DesignCatalog) -> Battle {
    Battle::build(
        fleets,
        designs,
        &RelationTable::new(),
        &BattleRules::default(),
    )
    .unwrap()
}

// =============================================================================
// Targeting
// =============================================================================

mod targeting {
    use super::*;

    #[test]
    fn test_armed_starbase_classes() {
        let starbase = token_for(&armed_starbase());
        assert!(will_target(TargetClass::Any, &starbase));
        assert!(will_target(TargetClass::Starbase, &starbase));
        assert!(will_target(TargetClass::ArmedShips, &starbase));
        assert!(!will_target(TargetClass::UnarmedShips, &starbase));
        assert!(!will_target(TargetClass::None, &starbase));
    }

    #[test]
    fn test_unarmed_freighter_classes() {
        let freighter = token_for(&freighter());
        assert!(will_target(TargetClass::Any, &freighter));
        assert!(!will_target(TargetClass::Starbase, &freighter));
        assert!(!will_target(TargetClass::ArmedShips, &freighter));
        assert!(will_target(TargetClass::UnarmedShips, &freighter));
        assert!(will_target(TargetClass::Freighters, &freighter));
    }

    #[test]
    fn test_aggressive_targets_and_disengaging_does_not() {
        let mut battle = build(&canonical_fixture(), &standard_catalog());
        assert!(!battle.has_targets());

        find_move_targets(&mut battle);
        assert_eq!(battle.tokens()[0].move_target, Some(1));
        assert_eq!(battle.tokens()[1].move_target, None);

        let before: Vec<_> = battle.tokens().iter().map(|t| t.move_target).collect();
        find_move_targets(&mut battle);
        let after: Vec<_> = battle.tokens().iter().map(|t| t.move_target).collect();
        assert_eq!(before, after);
    }
}

// =============================================================================
// Placement and movement planning
// =============================================================================

mod planning {
    use super::*;

    #[test]
    fn test_two_fleet_placement_regression() {
        let mut battle = build(&canonical_fixture(), &standard_catalog());
        place_tokens_on_board(&mut battle).unwrap();
        assert_eq!(battle.tokens()[0].position, BoardPosition::new(1, 4));
        assert_eq!(battle.tokens()[1].position, BoardPosition::new(8, 5));
    }

    #[test]
    fn test_heavy_slow_token_skips_rounds() {
        let mut designs = standard_catalog();
        designs.insert(ShipDesign {
            id: 10,
            name: "Dreadnought".to_string(),
            mass: 900,
            movement: 2,
            ..cruiser()
        });
        let fleets = vec![
            aggressive_fleet(1, 1, 10, 1),
            aggressive_fleet(2, 2, SCOUT, 1),
        ];
        let battle = build(&fleets, &designs);
        let order = build_movement_order(&battle);

        let round_one = order.round(1);
        assert_eq!(round_one.first(), Some(&0));
        assert!(round_one.contains(&1));

        let round_two = order.round(2);
        assert!(!round_two.is_empty());
        assert!(round_two.iter().all(|&id| id == 1));
    }
}

// =============================================================================
// Full battles
// =============================================================================

mod battles {
    use super::*;

    #[test]
    fn test_canonical_fixture_round_one_bound() {
        let outcome = resolve(&canonical_fixture()).unwrap();
        let actions = outcome.record.player(1).unwrap().actions(1);
        assert!(!actions.is_empty());
        assert!(actions.len() < 10);
    }

    #[test]
    fn test_single_side_battle_is_empty() {
        let fleets = vec![
            aggressive_fleet(1, 1, DESTROYER, 2),
            aggressive_fleet(2, 1, CRUISER, 1),
        ];
        let outcome = resolve(&fleets).unwrap();
        assert_eq!(outcome.record.action_count(), 0);
        assert_eq!(outcome.record.stats.rounds_fought, 0);
        let untouched: Vec<_> = fleets
            .iter()
            .cloned()
            .map(|fleet| FleetOutcome {
                fleet,
                destroyed: false,
            })
            .collect();
        assert_eq!(outcome.fleets, untouched);
    }

    #[test]
    fn test_allies_do_not_fight() {
        let designs = standard_catalog();
        let rules = BattleRules::default();
        let mut relations = RelationTable::new();
        relations.set_mutual(1, 2, Relation::Friend);
        let engine = BattleEngine::new(&rules, &designs, &relations);

        let outcome = engine
            .resolve(&[
                aggressive_fleet(1, 1, DESTROYER, 2),
                aggressive_fleet(2, 2, DESTROYER, 2),
            ])
            .unwrap();
        assert_eq!(outcome.record.action_count(), 0);
    }

    #[test]
    fn test_skirmish_conserves_ships() {
        let fleets = skirmish();
        let outcome = resolve(&fleets).unwrap();
        let stats = &outcome.record.stats;

        assert!(stats.rounds_fought >= 1);
        assert!(stats.rounds_fought <= BattleRules::default().max_rounds);

        let before: u32 = fleets.iter().map(Fleet::ship_count).sum();
        let after: u32 = outcome.fleets.iter().map(|f| f.fleet.ship_count()).sum();
        let lost: u32 = stats.ships_lost.values().sum();
        assert_eq!(before, after + lost);
    }

    #[test]
    fn test_skirmish_stays_on_board() {
        let outcome = resolve(&skirmish()).unwrap();
        let board = BattleRules::default().board();
        for round in 0..=outcome.record.stats.rounds_fought {
            for position in outcome.record.positions_after_round(round).values() {
                assert!(board.contains(*position), "{position} left the board");
            }
        }
    }

    #[test]
    fn test_records_only_reference_own_tokens() {
        let outcome = resolve(&skirmish()).unwrap();
        let record = &outcome.record;
        for (player, log) in &record.players {
            for (_, actions) in log.rounds() {
                for action in actions {
                    let token = &record.tokens[action.token() as usize];
                    assert_eq!(token.player, *player, "{action:?}");
                }
            }
        }
    }

    #[test]
    fn test_canonical_runner_escapes_under_default_rules() {
        let outcome = resolve(&canonical_fixture()).unwrap();
        let record = &outcome.record;

        assert_eq!(record.stats.escaped, vec![1]);
        assert_eq!(record.stats.ships_lost[&2], 0);
        assert!(!outcome.fleets[1].destroyed);

        let escaped_in = record
            .player(2)
            .unwrap()
            .rounds()
            .find(|(_, actions)| {
                actions
                    .iter()
                    .any(|a| matches!(a, BattleAction::RanAway { token: 1, .. }))
            })
            .map(|(round, _)| round);
        assert_eq!(escaped_in, Some(record.stats.rounds_fought));
    }

    #[test]
    fn test_freighters_slide_along_edge_and_escape() {
        let fleets = vec![
            aggressive_fleet(1, 1, CRUISER, 1),
            aggressive_fleet(2, 2, FREIGHTER, 3),
        ];
        let outcome = resolve(&fleets).unwrap();
        let board = BattleRules::default().board();

        assert_eq!(outcome.record.stats.escaped, vec![1]);
        assert!(!outcome.fleets[1].destroyed);
        for position in outcome
            .record
            .positions_after_round(outcome.record.stats.rounds_fought)
            .values()
        {
            assert!(board.contains(*position));
        }
    }

    #[test]
    fn test_record_survives_save_and_load() {
        let outcome = resolve(&skirmish()).unwrap();
        let bytes = outcome.record.serialize().unwrap();
        let restored = BattleRecord::deserialize(&bytes).unwrap();
        assert_eq!(restored.record_hash(), outcome.record.record_hash());
    }
}
