//! Tests for the scenario files shipped with the tools.

use std::path::{Path, PathBuf};

use battle_tools::batch::{run_batch, verify_scenario};
use battle_tools::messages::battle_messages;
use battle_tools::scenario::Scenario;

fn scenario_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn test_skirmish_file_matches_builtin() {
    let loaded = Scenario::load(scenario_path("skirmish.ron")).unwrap();
    let builtin = Scenario::skirmish();
    assert_eq!(loaded.designs, builtin.designs);
    assert_eq!(loaded.rules, builtin.rules);
    assert_eq!(loaded.fleets.len(), builtin.fleets.len());
    assert_eq!(
        loaded.resolve().unwrap().record.stats,
        builtin.resolve().unwrap().record.stats
    );
}

#[test]
fn test_starbase_assault_allies_share_a_side() {
    let scenario = Scenario::load(scenario_path("starbase_assault.ron")).unwrap();
    assert!(scenario.designs[0].starbase);

    let outcome = scenario.resolve().unwrap();
    let record = &outcome.record;
    assert!(record.stats.rounds_fought >= 1);
    assert!(record.stats.rounds_fought <= 12);

    // The fort never moves.
    for round in 1..=record.stats.rounds_fought {
        assert_eq!(
            record.positions_after_round(round)[&0],
            record.tokens[0].position
        );
    }
}

#[test]
fn test_batch_over_shipped_scenarios() {
    let paths = vec![
        scenario_path("skirmish.ron"),
        scenario_path("starbase_assault.ron"),
    ];
    let results = run_batch(&paths);
    assert!(results.is_success(), "{:?}", results.errors);
    assert_eq!(results.entries.len(), 2);
}

#[test]
fn test_shipped_scenarios_are_deterministic() {
    let scenario = Scenario::load(scenario_path("starbase_assault.ron")).unwrap();
    assert!(verify_scenario(&scenario, 4).unwrap().is_deterministic());
}

#[test]
fn test_every_player_gets_a_report() {
    let scenario = Scenario::load(scenario_path("starbase_assault.ron")).unwrap();
    let outcome = scenario.resolve().unwrap();
    let messages = battle_messages(&scenario.name, &outcome);
    let players: Vec<_> = messages.iter().map(|m| m.player).collect();
    assert_eq!(players, vec![1, 2, 3]);
}
