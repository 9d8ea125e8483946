//! Battle doctrines and player relations.
//!
//! A doctrine is the owner's standing order for how a fleet behaves in
//! battle: how it moves ([`Tactic`]), what it prefers to shoot
//! ([`TargetClass`]), and whose ships it is willing to engage
//! ([`AttackWho`]). Whether two players are enemies comes from an injected
//! [`Diplomacy`] lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fleet::PlayerId;

/// Movement behaviour in battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tactic {
    /// Leave the battle as soon as possible.
    Disengage,
    /// Fight until damaged, then leave.
    DisengageIfChallenged,
    /// Fight from the longest weapon range.
    MinimizeDamageToSelf,
    /// Close in and fight.
    MaximizeNetDamage,
    /// Close in and fight.
    MaximizeDamageRatio,
    /// Close in and fight.
    #[default]
    MaximizeDamage,
}

impl Tactic {
    /// Whether the tactic never picks a target.
    #[must_use]
    pub const fn always_disengages(self) -> bool {
        matches!(self, Self::Disengage)
    }
}

/// Class of target a doctrine prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetClass {
    /// Nothing.
    None,
    /// Every ship.
    #[default]
    Any,
    /// Armed starbases.
    Starbase,
    /// Armed ships, starbases included.
    ArmedShips,
    /// Bombers and cargo carriers.
    BombersFreighters,
    /// Ships without weapons.
    UnarmedShips,
    /// Fuel transports.
    FuelTransports,
    /// Cargo carriers.
    Freighters,
}

/// Whose ships a doctrine will engage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttackWho {
    /// Never attack.
    Nobody,
    /// Only players marked as enemies.
    #[default]
    Enemies,
    /// Enemies and neutral players.
    EnemiesAndNeutrals,
    /// Every other player.
    Everyone,
}

impl AttackWho {
    /// Whether this policy permits attacking a player with `relation`.
    #[must_use]
    pub const fn permits(self, relation: Relation) -> bool {
        match (self, relation) {
            (_, Relation::Friend) => matches!(self, Self::Everyone),
            (Self::Nobody, _) => false,
            (Self::Enemies, Relation::Enemy) => true,
            (Self::Enemies, Relation::Neutral) => false,
            (Self::EnemiesAndNeutrals | Self::Everyone, _) => true,
        }
    }
}

/// A participant's battle configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Doctrine {
    /// Movement behaviour.
    pub tactic: Tactic,
    /// Preferred target class.
    pub primary_target: TargetClass,
    /// Fallback target class.
    pub secondary_target: TargetClass,
    /// Whose ships to engage.
    pub attack_who: AttackWho,
}

impl Default for Doctrine {
    fn default() -> Self {
        Self {
            tactic: Tactic::MaximizeDamage,
            primary_target: TargetClass::ArmedShips,
            secondary_target: TargetClass::Any,
            attack_who: AttackWho::Enemies,
        }
    }
}

impl Doctrine {
    /// A doctrine that never fights and always tries to leave.
    #[must_use]
    pub fn disengage() -> Self {
        Self {
            tactic: Tactic::Disengage,
            primary_target: TargetClass::None,
            secondary_target: TargetClass::None,
            attack_who: AttackWho::Nobody,
        }
    }

    /// Target classes in preference order.
    ///
    /// `Any` is appended as a last resort unless the policy is `Nobody`.
    #[must_use]
    pub fn target_order(&self) -> Vec<TargetClass> {
        let mut order = vec![self.primary_target, self.secondary_target];
        if self.attack_who != AttackWho::Nobody {
            order.push(TargetClass::Any);
        }
        order
    }
}

/// How one player regards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Allied.
    Friend,
    /// Neither allied nor at war.
    Neutral,
    /// At war.
    Enemy,
}

/// Capability to resolve player relations.
pub trait Diplomacy {
    /// How `from` regards `to`. A player is always its own friend.
    fn relation(&self, from: PlayerId, to: PlayerId) -> Relation;
}

/// Explicit relation table; unlisted pairs of distinct players are enemies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTable {
    relations: BTreeMap<(PlayerId, PlayerId), Relation>,
}

impl RelationTable {
    /// Create a table where every other player is an enemy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how `from` regards `to`.
    pub fn set(&mut self, from: PlayerId, to: PlayerId, relation: Relation) {
        self.relations.insert((from, to), relation);
    }

    /// Set a symmetric relation between two players.
    pub fn set_mutual(&mut self, a: PlayerId, b: PlayerId, relation: Relation) {
        self.set(a, b, relation);
        self.set(b, a, relation);
    }
}

impl Diplomacy for RelationTable {
    fn relation(&self, from: PlayerId, to: PlayerId) -> Relation {
        if from == to {
            return Relation::Friend;
        }
        self.relations
            .get(&(from, to))
            .copied()
            .unwrap_or(Relation::Enemy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_who_permits() {
        assert!(AttackWho::Enemies.permits(Relation::Enemy));
        assert!(!AttackWho::Enemies.permits(Relation::Neutral));
        assert!(AttackWho::EnemiesAndNeutrals.permits(Relation::Neutral));
        assert!(!AttackWho::EnemiesAndNeutrals.permits(Relation::Friend));
        assert!(AttackWho::Everyone.permits(Relation::Friend));
        assert!(!AttackWho::Nobody.permits(Relation::Enemy));
    }

    #[test]
    fn test_target_order_appends_any() {
        let doctrine = Doctrine {
            primary_target: TargetClass::Starbase,
            secondary_target: TargetClass::Freighters,
            ..Doctrine::default()
        };
        assert_eq!(
            doctrine.target_order(),
            vec![
                TargetClass::Starbase,
                TargetClass::Freighters,
                TargetClass::Any
            ]
        );
        assert_eq!(
            Doctrine::disengage().target_order(),
            vec![TargetClass::None, TargetClass::None]
        );
    }

    #[test]
    fn test_relation_table_defaults_to_enemy() {
        let mut table = RelationTable::new();
        assert_eq!(table.relation(1, 1), Relation::Friend);
        assert_eq!(table.relation(1, 2), Relation::Enemy);

        table.set_mutual(1, 2, Relation::Neutral);
        table.set(1, 3, Relation::Friend);
        assert_eq!(table.relation(2, 1), Relation::Neutral);
        assert_eq!(table.relation(1, 3), Relation::Friend);
        assert_eq!(table.relation(3, 1), Relation::Enemy);
    }

    #[test]
    fn test_doctrine_from_partial_ron() {
        let doctrine: Doctrine = ron::from_str("(tactic: Disengage)").unwrap();
        assert_eq!(doctrine.tactic, Tactic::Disengage);
        assert_eq!(doctrine.attack_who, AttackWho::Enemies);
    }
}
