//! Battle loop and the engine service.
//!
//! [`run_battle`] drives a placed battle through its rounds:
//!
//! 1. Acquire move targets; stop when nobody has one.
//! 2. Play the round's move order, skipping tokens that left or died.
//! 3. Rebuild the initiative-sorted weapon slots.
//! 4. Fire every slot.
//!
//! [`BattleEngine`] wraps the whole pipeline (build, place, plan, run,
//! extract) behind one call for the turn pipeline.
//!
//! # Example
//!
//! ```
//! use battle_core::prelude::*;
//!
//! let designs: DesignCatalog = vec![ShipDesign {
//!     id: 1,
//!     name: "Destroyer".to_string(),
//!     armor: 200,
//!     shields: 0,
//!     mass: 60,
//!     initiative: 3,
//!     movement: 6,
//!     starbase: false,
//!     cargo_capacity: 0,
//!     bomber: false,
//!     fuel_transport: false,
//!     weapons: vec![WeaponComponent::beam("Laser", 1, 10, 0)],
//! }]
//! .into_iter()
//! .collect();
//!
//! let rules = BattleRules::default();
//! let relations = RelationTable::new();
//! let engine = BattleEngine::new(&rules, &designs, &relations);
//!
//! let fleets = vec![
//!     Fleet::new(1, 1, "Home Guard").with_stack(1, 2),
//!     Fleet::new(2, 2, "Raiders").with_stack(1, 2),
//! ];
//! let outcome = engine.resolve(&fleets).unwrap();
//! assert!(outcome.record.stats.rounds_fought > 0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::battle::{Battle, BattlePhase};
use crate::design::DesignLookup;
use crate::doctrine::Diplomacy;
use crate::error::Result;
use crate::fleet::{Fleet, PlayerId};
use crate::movement::{build_movement_order, move_token};
use crate::record::{BattleRecord, BattleStats, TokenSnapshot};
use crate::rules::BattleRules;
use crate::targeting::find_move_targets;
use crate::token::Token;
use crate::weapons::{build_sorted_weapon_slots, fire_weapon_slot};

/// Put every token on its starting square.
///
/// Each distinct player, in join order, takes the next placement zone; all
/// of a player's tokens share that square. Zones are reused round-robin when
/// there are more players than zones.
pub fn place_tokens_on_board(battle: &mut Battle) -> Result<()> {
    battle.expect_phase(BattlePhase::Initialized)?;

    let zones = battle.rules().placement_zones.clone();
    let players = battle.players().to_vec();
    for token in battle.tokens_mut() {
        let group = players
            .iter()
            .position(|p| *p == token.player)
            .unwrap_or_default();
        if let Some(zone) = zones.get(group % zones.len().max(1)) {
            token.position = *zone;
        }
    }

    battle.phase = BattlePhase::Placed;
    Ok(())
}

/// Compute and store the movement plan.
pub fn plan_movement(battle: &mut Battle) {
    battle.move_order = build_movement_order(battle);
}

/// Run a placed battle to completion.
///
/// Plans movement first if nothing is planned yet.
pub fn run_battle(battle: &mut Battle) -> Result<()> {
    battle.expect_phase(BattlePhase::Placed)?;
    if battle.move_order().is_empty() {
        plan_movement(battle);
    }
    battle.phase = BattlePhase::Running;

    let max_rounds = battle.rules().max_rounds;
    for round in 1..=max_rounds {
        battle.set_round(round);

        find_move_targets(battle);
        if !battle.has_targets() {
            tracing::debug!(round, "No targets left");
            break;
        }
        tracing::debug!(round, active = battle.active_tokens().count(), "Battle round");

        let steps = battle.move_order().round(round).to_vec();
        for id in steps {
            if battle.token(id)?.is_active() {
                move_token(battle, id)?;
            }
        }

        build_sorted_weapon_slots(battle);
        let slots = battle.weapon_slots().to_vec();
        for slot in &slots {
            fire_weapon_slot(battle, slot)?;
        }

        battle.rounds_fought = round;
    }

    battle.phase = BattlePhase::Terminated;
    tracing::info!(
        rounds = battle.rounds_fought(),
        survivors = battle.active_tokens().count(),
        "Battle finished"
    );
    Ok(())
}

/// A fleet after the battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetOutcome {
    /// The fleet with its surviving stacks.
    pub fleet: Fleet,
    /// No ships are left.
    pub destroyed: bool,
}

/// Everything the turn pipeline needs back from one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Full record for messaging and playback.
    pub record: BattleRecord,
    /// Every input fleet, in input order.
    pub fleets: Vec<FleetOutcome>,
}

impl BattleOutcome {
    /// Fleets that still have ships.
    pub fn survivors(&self) -> impl Iterator<Item = &Fleet> {
        self.fleets
            .iter()
            .filter(|outcome| !outcome.destroyed)
            .map(|outcome| &outcome.fleet)
    }

    /// Players that still have ships.
    #[must_use]
    pub fn surviving_players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.survivors().map(|fleet| fleet.player).collect();
        players.sort_unstable();
        players.dedup();
        players
    }
}

/// Resolves battles with injected rules, designs and diplomacy.
#[derive(Debug)]
pub struct BattleEngine<'a, D: ?Sized, R: ?Sized> {
    rules: &'a BattleRules,
    designs: &'a D,
    diplomacy: &'a R,
}

impl<'a, D, R> BattleEngine<'a, D, R>
where
    D: DesignLookup + ?Sized,
    R: Diplomacy + ?Sized,
{
    /// Create an engine.
    #[must_use]
    pub const fn new(rules: &'a BattleRules, designs: &'a D, diplomacy: &'a R) -> Self {
        Self {
            rules,
            designs,
            diplomacy,
        }
    }

    /// Rules this engine resolves with.
    #[must_use]
    pub const fn rules(&self) -> &BattleRules {
        self.rules
    }

    /// Build, place and plan a battle without running it.
    pub fn prepare(&self, fleets: &[Fleet]) -> Result<Battle> {
        let mut battle = Battle::build(fleets, self.designs, self.diplomacy, self.rules)?;
        place_tokens_on_board(&mut battle)?;
        plan_movement(&mut battle);
        Ok(battle)
    }

    /// Resolve a battle between the given fleets.
    pub fn resolve(&self, fleets: &[Fleet]) -> Result<BattleOutcome> {
        let mut battle = self.prepare(fleets)?;
        let initial: Vec<TokenSnapshot> = battle.tokens().iter().map(TokenSnapshot::from).collect();

        run_battle(&mut battle)?;

        let stats = collect_stats(&battle, &initial);
        let fleets = fleets
            .iter()
            .map(|fleet| fleet_outcome(&battle, fleet))
            .collect();
        let record = BattleRecord::new(initial, battle.take_records(), stats);
        Ok(BattleOutcome { record, fleets })
    }
}

fn collect_stats(battle: &Battle, initial: &[TokenSnapshot]) -> BattleStats {
    let mut ships_lost: BTreeMap<PlayerId, u32> =
        battle.players().iter().map(|&player| (player, 0)).collect();
    for (start, token) in initial.iter().zip(battle.tokens()) {
        *ships_lost.entry(token.player).or_default() += start.quantity - token.quantity;
    }
    let escaped = battle
        .tokens()
        .iter()
        .filter(|t| t.ran_away)
        .map(|t| t.id)
        .collect();
    BattleStats {
        rounds_fought: battle.rounds_fought(),
        ships_lost,
        escaped,
    }
}

fn fleet_outcome(battle: &Battle, fleet: &Fleet) -> FleetOutcome {
    let stacks: Vec<_> = battle
        .tokens()
        .iter()
        .filter(|t| t.fleet == fleet.id && t.player == fleet.player && t.quantity > 0)
        .map(Token::to_stack)
        .collect();
    FleetOutcome {
        destroyed: stacks.is_empty(),
        fleet: Fleet {
            stacks,
            ..fleet.clone()
        },
    }
}
