//! Ship design data and the design lookup capability.
//!
//! Designs are immutable inputs. The engine never mutates them; it derives a
//! per-battle read-only view ([`crate::token::TokenStats`]) when a battle is
//! built. Designs are looked up by id through [`DesignLookup`], which the
//! caller injects.
//!
//! # Example RON
//!
//! ```ron
//! ShipDesign(
//!     id: 3,
//!     name: "Destroyer",
//!     armor: 200,
//!     shields: 60,
//!     mass: 120,
//!     initiative: 3,
//!     movement: 6,
//!     weapons: [
//!         WeaponComponent(name: "Laser", kind: Beam, range: 1, power: 10, initiative: 9, quantity: 2),
//!     ],
//! )
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a ship design.
pub type DesignId = u32;

/// Broad category of a weapon component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Direct-fire energy weapon; dissipates with range, spills over.
    Beam,
    /// Guided projectile; resolved shot by shot against an accuracy.
    Torpedo,
}

/// One weapon component fitted to a design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponComponent {
    /// Display name.
    pub name: String,
    /// Beam or torpedo.
    pub kind: WeaponKind,
    /// Range in board squares.
    pub range: u32,
    /// Damage per weapon per shot.
    pub power: u32,
    /// Added to the hull initiative to order firing.
    #[serde(default)]
    pub initiative: u32,
    /// Number of these weapons in the slot.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Torpedo hit chance in percent. Ignored for beams.
    #[serde(default = "default_accuracy")]
    pub accuracy: u32,
    /// Beam hits every target in range instead of one.
    #[serde(default)]
    pub hits_all: bool,
    /// Torpedo deals extra armor damage to unshielded targets.
    #[serde(default)]
    pub capital_ship_missile: bool,
}

const fn default_quantity() -> u32 {
    1
}

const fn default_accuracy() -> u32 {
    100
}

impl WeaponComponent {
    /// Create a single beam weapon.
    #[must_use]
    pub fn beam(name: impl Into<String>, range: u32, power: u32, initiative: u32) -> Self {
        Self {
            name: name.into(),
            kind: WeaponKind::Beam,
            range,
            power,
            initiative,
            quantity: 1,
            accuracy: 100,
            hits_all: false,
            capital_ship_missile: false,
        }
    }

    /// Create a single torpedo launcher.
    #[must_use]
    pub fn torpedo(
        name: impl Into<String>,
        range: u32,
        power: u32,
        initiative: u32,
        accuracy: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind: WeaponKind::Torpedo,
            range,
            power,
            initiative,
            quantity: 1,
            accuracy: accuracy.min(100),
            hits_all: false,
            capital_ship_missile: false,
        }
    }

    /// Builder method to set the slot quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builder method to make a beam hit every target in range.
    #[must_use]
    pub fn hitting_all(mut self) -> Self {
        self.hits_all = true;
        self
    }

    /// Builder method to mark a torpedo as a capital ship missile.
    #[must_use]
    pub fn capital_ship_missile(mut self) -> Self {
        self.capital_ship_missile = true;
        self
    }
}

/// A complete ship design as far as battle is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipDesign {
    /// Unique design id.
    pub id: DesignId,
    /// Display name.
    pub name: String,
    /// Armor per ship.
    pub armor: u32,
    /// Shields per ship.
    #[serde(default)]
    pub shields: u32,
    /// Mass per ship.
    pub mass: u32,
    /// Hull initiative.
    #[serde(default)]
    pub initiative: u32,
    /// Battle movement rating in quarter squares per round.
    #[serde(default)]
    pub movement: u32,
    /// Starbases never move and are the only `Starbase` targets.
    #[serde(default)]
    pub starbase: bool,
    /// Cargo capacity per ship.
    #[serde(default)]
    pub cargo_capacity: u32,
    /// Whether the design carries bombs.
    #[serde(default)]
    pub bomber: bool,
    /// Whether the design can transfer fuel to other fleets.
    #[serde(default)]
    pub fuel_transport: bool,
    /// Fitted weapons, in slot order.
    #[serde(default)]
    pub weapons: Vec<WeaponComponent>,
}

impl ShipDesign {
    /// Whether any fitted weapon deals damage.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.weapons.iter().any(|w| w.power > 0 && w.quantity > 0)
    }
}

/// Capability to resolve design ids into designs.
pub trait DesignLookup {
    /// Look up a design by id.
    fn design(&self, id: DesignId) -> Option<&ShipDesign>;
}

/// Ordered in-memory design catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignCatalog {
    designs: BTreeMap<DesignId, ShipDesign>,
}

impl DesignCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a design.
    pub fn insert(&mut self, design: ShipDesign) {
        self.designs.insert(design.id, design);
    }

    /// Number of designs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.designs.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Iterate designs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipDesign> {
        self.designs.values()
    }
}

impl FromIterator<ShipDesign> for DesignCatalog {
    fn from_iter<I: IntoIterator<Item = ShipDesign>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for design in iter {
            catalog.insert(design);
        }
        catalog
    }
}

impl DesignLookup for DesignCatalog {
    fn design(&self, id: DesignId) -> Option<&ShipDesign> {
        self.designs.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_design() -> ShipDesign {
        ShipDesign {
            id: 7,
            name: "Frigate".to_string(),
            armor: 45,
            shields: 10,
            mass: 40,
            initiative: 2,
            movement: 8,
            starbase: false,
            cargo_capacity: 0,
            bomber: false,
            fuel_transport: false,
            weapons: vec![WeaponComponent::beam("Laser", 1, 10, 9)],
        }
    }

    #[test]
    fn test_is_armed() {
        let mut design = create_test_design();
        assert!(design.is_armed());

        design.weapons[0].power = 0;
        assert!(!design.is_armed());

        design.weapons.clear();
        assert!(!design.is_armed());
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog: DesignCatalog = vec![create_test_design()].into_iter().collect();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.design(7).map(|d| d.name.as_str()), Some("Frigate"));
        assert!(catalog.design(8).is_none());
    }

    #[test]
    fn test_design_from_ron_defaults() {
        let design: ShipDesign = ron::from_str(
            r#"ShipDesign(
                id: 1,
                name: "Hauler",
                armor: 20,
                mass: 30,
                cargo_capacity: 70,
            )"#,
        )
        .unwrap();
        assert_eq!(design.shields, 0);
        assert_eq!(design.movement, 0);
        assert!(design.weapons.is_empty());
        assert!(!design.is_armed());
    }

    #[test]
    fn test_torpedo_accuracy_capped() {
        let torpedo = WeaponComponent::torpedo("Alpha", 4, 12, 0, 140);
        assert_eq!(torpedo.accuracy, 100);
        assert_eq!(torpedo.kind, WeaponKind::Torpedo);
    }
}
