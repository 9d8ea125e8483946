//! Fleet snapshots exchanged with the turn pipeline.
//!
//! The pipeline hands the engine one [`Fleet`] per fleet present at the
//! battle location and receives the survivors back in the same shape.

use serde::{Deserialize, Serialize};

use crate::design::DesignId;
use crate::doctrine::Doctrine;

/// Unique identifier for a player.
pub type PlayerId = u32;

/// Unique identifier for a fleet.
pub type FleetId = u64;

/// A stack of identical ships inside a fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStack {
    /// Design of every ship in the stack.
    pub design: DesignId,
    /// Number of ships.
    pub quantity: u32,
    /// Outstanding armor damage spread over the damaged ships.
    #[serde(default)]
    pub damage: u32,
    /// Number of ships carrying damage.
    #[serde(default)]
    pub quantity_damaged: u32,
}

impl ShipStack {
    /// Create an undamaged stack.
    #[must_use]
    pub const fn new(design: DesignId, quantity: u32) -> Self {
        Self {
            design,
            quantity,
            damage: 0,
            quantity_damaged: 0,
        }
    }
}

/// A fleet taking part in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    /// Fleet id.
    pub id: FleetId,
    /// Owning player.
    pub player: PlayerId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Battle doctrine chosen by the owner.
    #[serde(default)]
    pub doctrine: Doctrine,
    /// Ship stacks, one per design.
    pub stacks: Vec<ShipStack>,
}

impl Fleet {
    /// Create a fleet with the default doctrine and no ships.
    #[must_use]
    pub fn new(id: FleetId, player: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            player,
            name: name.into(),
            doctrine: Doctrine::default(),
            stacks: Vec::new(),
        }
    }

    /// Builder method to set the doctrine.
    #[must_use]
    pub fn with_doctrine(mut self, doctrine: Doctrine) -> Self {
        self.doctrine = doctrine;
        self
    }

    /// Builder method to add a stack.
    #[must_use]
    pub fn with_stack(mut self, design: DesignId, quantity: u32) -> Self {
        self.stacks.push(ShipStack::new(design, quantity));
        self
    }

    /// Total ships across all stacks.
    #[must_use]
    pub fn ship_count(&self) -> u32 {
        self.stacks
            .iter()
            .fold(0, |total, s| total.saturating_add(s.quantity))
    }
}
