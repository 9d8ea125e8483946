//! Test fixtures and helpers.
//!
//! A small standard catalog of designs and pre-built fleets for
//! consistent testing.

use battle_core::design::{DesignCatalog, DesignId, ShipDesign, WeaponComponent};
use battle_core::doctrine::{Doctrine, RelationTable};
use battle_core::engine::{BattleEngine, BattleOutcome};
use battle_core::error::Result;
use battle_core::fleet::{Fleet, FleetId, PlayerId};
use battle_core::rules::BattleRules;

/// Fast, lightly armed scout.
pub const SCOUT: DesignId = 1;
/// Beam destroyer.
pub const DESTROYER: DesignId = 2;
/// Shielded torpedo cruiser.
pub const CRUISER: DesignId = 3;
/// Unarmed freighter.
pub const FREIGHTER: DesignId = 4;
/// Armed, immobile starbase.
pub const STARBASE: DesignId = 5;
/// Frigate with a gatling beam.
pub const GATLING_FRIGATE: DesignId = 6;

fn hull(id: DesignId, name: &str, armor: u32, mass: u32, movement: u32) -> ShipDesign {
    ShipDesign {
        id,
        name: name.to_string(),
        armor,
        shields: 0,
        mass,
        initiative: 0,
        movement,
        starbase: false,
        cargo_capacity: 0,
        bomber: false,
        fuel_transport: false,
        weapons: Vec::new(),
    }
}

/// Scout: one short-range laser, movement 10.
#[must_use]
pub fn scout() -> ShipDesign {
    ShipDesign {
        initiative: 1,
        weapons: vec![WeaponComponent::beam("Laser", 1, 10, 9)],
        ..hull(SCOUT, "Scout", 20, 8, 10)
    }
}

/// Destroyer: two lasers, movement 6.
#[must_use]
pub fn destroyer() -> ShipDesign {
    ShipDesign {
        initiative: 3,
        shields: 20,
        weapons: vec![WeaponComponent::beam("Laser", 1, 10, 9).with_quantity(2)],
        ..hull(DESTROYER, "Destroyer", 200, 120, 6)
    }
}

/// Cruiser: shields and torpedoes, movement 4.
#[must_use]
pub fn cruiser() -> ShipDesign {
    ShipDesign {
        initiative: 2,
        shields: 60,
        weapons: vec![
            WeaponComponent::torpedo("Alpha Torpedo", 4, 5, 0, 35).with_quantity(4),
            WeaponComponent::beam("X-Ray Laser", 1, 16, 9).with_quantity(2),
        ],
        ..hull(CRUISER, "Cruiser", 700, 300, 4)
    }
}

/// Freighter: cargo hold, no weapons.
#[must_use]
pub fn freighter() -> ShipDesign {
    ShipDesign {
        cargo_capacity: 210,
        ..hull(FREIGHTER, "Medium Freighter", 50, 60, 5)
    }
}

/// Starbase: heavy beams, never moves.
#[must_use]
pub fn armed_starbase() -> ShipDesign {
    ShipDesign {
        initiative: 10,
        shields: 200,
        starbase: true,
        weapons: vec![WeaponComponent::beam("Phasor", 2, 26, 9).with_quantity(8)],
        ..hull(STARBASE, "Space Station", 1500, 0, 0)
    }
}

/// Frigate with a gatling beam that hits everything in range.
#[must_use]
pub fn gatling_frigate() -> ShipDesign {
    ShipDesign {
        initiative: 4,
        weapons: vec![WeaponComponent::beam("Gatling Gun", 2, 13, 12).hitting_all()],
        ..hull(GATLING_FRIGATE, "Frigate", 120, 68, 7)
    }
}

/// Catalog with every fixture design.
#[must_use]
pub fn standard_catalog() -> DesignCatalog {
    vec![
        scout(),
        destroyer(),
        cruiser(),
        freighter(),
        armed_starbase(),
        gatling_frigate(),
    ]
    .into_iter()
    .collect()
}

/// Single-stack fleet with the default aggressive doctrine.
#[must_use]
pub fn aggressive_fleet(id: FleetId, player: PlayerId, design: DesignId, quantity: u32) -> Fleet {
    Fleet::new(id, player, format!("Strike Group {id}")).with_stack(design, quantity)
}

/// Single-stack fleet that only wants to leave.
#[must_use]
pub fn disengaging_fleet(id: FleetId, player: PlayerId, design: DesignId, quantity: u32) -> Fleet {
    Fleet::new(id, player, format!("Convoy {id}"))
        .with_doctrine(Doctrine::disengage())
        .with_stack(design, quantity)
}

/// Two single-token fleets: one aggressive, one disengaging.
#[must_use]
pub fn canonical_fixture() -> Vec<Fleet> {
    vec![
        aggressive_fleet(1, 1, DESTROYER, 1),
        disengaging_fleet(2, 2, DESTROYER, 1),
    ]
}

/// Three players with mixed fleets, including an escorted convoy.
#[must_use]
pub fn skirmish() -> Vec<Fleet> {
    vec![
        Fleet::new(1, 1, "Home Guard")
            .with_stack(DESTROYER, 3)
            .with_stack(STARBASE, 1),
        Fleet::new(2, 2, "Raiders")
            .with_stack(CRUISER, 2)
            .with_stack(GATLING_FRIGATE, 2),
        Fleet::new(3, 2, "Supply Train").with_stack(FREIGHTER, 5),
        Fleet::new(4, 3, "Pickets").with_stack(SCOUT, 6),
    ]
}

/// Resolve fleets against the standard catalog with default rules and
/// everyone at war.
pub fn resolve(fleets: &[Fleet]) -> Result<BattleOutcome> {
    resolve_with_rules(fleets, &BattleRules::default())
}

/// Like [`resolve`] with custom rules.
pub fn resolve_with_rules(fleets: &[Fleet], rules: &BattleRules) -> Result<BattleOutcome> {
    let designs = standard_catalog();
    let relations = RelationTable::new();
    BattleEngine::new(rules, &designs, &relations).resolve(fleets)
}
