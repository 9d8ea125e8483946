//! Scenario loading and configuration.
//!
//! A scenario is a self-contained battle: the designs involved, the fleets
//! present at the location, the diplomatic standing between their owners,
//! and optionally tweaked rules. It is the snapshot the turn pipeline would
//! hand the engine.
//!
//! # Example RON
//!
//! ```ron
//! Scenario(
//!     name: "Border Skirmish",
//!     rules: (max_rounds: 8),
//!     designs: [
//!         ShipDesign(id: 1, name: "Scout", armor: 20, mass: 8, movement: 10,
//!             weapons: [WeaponComponent(name: "Laser", kind: Beam, range: 1, power: 10)]),
//!     ],
//!     fleets: [
//!         Fleet(id: 1, player: 1, stacks: [ShipStack(design: 1, quantity: 3)]),
//!         Fleet(id: 2, player: 2, stacks: [ShipStack(design: 1, quantity: 2)]),
//!     ],
//!     relations: [],
//! )
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use battle_core::design::{DesignCatalog, ShipDesign, WeaponComponent};
use battle_core::doctrine::{Doctrine, Relation, RelationTable};
use battle_core::engine::{BattleEngine, BattleOutcome};
use battle_core::error::BattleError;
use battle_core::fleet::{Fleet, PlayerId};
use battle_core::rules::BattleRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario is well-formed but inconsistent.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
    /// The engine rejected the scenario.
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// How one player regards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    /// Player holding the view.
    pub from: PlayerId,
    /// Player being regarded.
    pub to: PlayerId,
    /// The view.
    pub relation: Relation,
    /// Apply the same relation in the other direction.
    #[serde(default)]
    pub mutual: bool,
}

/// A complete battle setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Rules; omitted fields take the standard values.
    #[serde(default)]
    pub rules: BattleRules,
    /// Designs referenced by the fleets.
    pub designs: Vec<ShipDesign>,
    /// Fleets at the battle location, in join order.
    pub fleets: Vec<Fleet>,
    /// Relations between players; unlisted pairs are at war.
    #[serde(default)]
    pub relations: Vec<RelationEntry>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ScenarioError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ScenarioError::Invalid(format!("Failed to serialize scenario: {e}")))
    }

    /// A standard two-player skirmish between a destroyer squadron and a
    /// torpedo cruiser escorting freighters.
    #[must_use]
    pub fn skirmish() -> Self {
        let designs = vec![
            ShipDesign {
                id: 1,
                name: "Destroyer".to_string(),
                armor: 200,
                shields: 20,
                mass: 120,
                initiative: 3,
                movement: 6,
                starbase: false,
                cargo_capacity: 0,
                bomber: false,
                fuel_transport: false,
                weapons: vec![WeaponComponent::beam("Laser", 1, 10, 9).with_quantity(2)],
            },
            ShipDesign {
                id: 2,
                name: "Cruiser".to_string(),
                armor: 700,
                shields: 60,
                mass: 300,
                initiative: 2,
                movement: 4,
                starbase: false,
                cargo_capacity: 0,
                bomber: false,
                fuel_transport: false,
                weapons: vec![
                    WeaponComponent::torpedo("Alpha Torpedo", 4, 5, 0, 35).with_quantity(4),
                ],
            },
            ShipDesign {
                id: 3,
                name: "Medium Freighter".to_string(),
                armor: 50,
                shields: 0,
                mass: 60,
                initiative: 0,
                movement: 5,
                starbase: false,
                cargo_capacity: 210,
                bomber: false,
                fuel_transport: false,
                weapons: Vec::new(),
            },
        ];
        Self {
            name: "Standard Skirmish".to_string(),
            description: "Destroyer squadron intercepts an escorted convoy".to_string(),
            rules: BattleRules::default(),
            designs,
            fleets: vec![
                Fleet::new(1, 1, "Destroyer Squadron").with_stack(1, 4),
                Fleet::new(2, 2, "Escort").with_stack(2, 1),
                Fleet::new(3, 2, "Convoy")
                    .with_doctrine(Doctrine::disengage())
                    .with_stack(3, 3),
            ],
            relations: Vec::new(),
        }
    }

    /// Check internal consistency: rules are playable, design and fleet ids
    /// are unique, and every stack references a known design.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.rules.validate()?;

        let mut design_ids = BTreeSet::new();
        for design in &self.designs {
            if !design_ids.insert(design.id) {
                return Err(ScenarioError::Invalid(format!(
                    "duplicate design id {}",
                    design.id
                )));
            }
        }

        let mut fleet_ids = BTreeSet::new();
        for fleet in &self.fleets {
            if !fleet_ids.insert(fleet.id) {
                return Err(ScenarioError::Invalid(format!(
                    "duplicate fleet id {}",
                    fleet.id
                )));
            }
            if let Some(stack) = fleet.stacks.iter().find(|s| !design_ids.contains(&s.design)) {
                return Err(ScenarioError::Invalid(format!(
                    "fleet {} references unknown design {}",
                    fleet.id, stack.design
                )));
            }
        }
        Ok(())
    }

    /// Design catalog for the engine.
    #[must_use]
    pub fn catalog(&self) -> DesignCatalog {
        self.designs.iter().cloned().collect()
    }

    /// Relation table for the engine.
    #[must_use]
    pub fn relation_table(&self) -> RelationTable {
        let mut table = RelationTable::new();
        for entry in &self.relations {
            if entry.mutual {
                table.set_mutual(entry.from, entry.to, entry.relation);
            } else {
                table.set(entry.from, entry.to, entry.relation);
            }
        }
        table
    }

    /// Distinct players in join order.
    #[must_use]
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players = Vec::new();
        for fleet in &self.fleets {
            if !players.contains(&fleet.player) {
                players.push(fleet.player);
            }
        }
        players
    }

    /// Resolve the battle.
    pub fn resolve(&self) -> Result<BattleOutcome, ScenarioError> {
        let designs = self.catalog();
        let relations = self.relation_table();
        let outcome = BattleEngine::new(&self.rules, &designs, &relations).resolve(&self.fleets)?;
        tracing::info!(
            scenario = %self.name,
            rounds = outcome.record.stats.rounds_fought,
            actions = outcome.record.action_count(),
            "Scenario resolved"
        );
        Ok(outcome)
    }
}
