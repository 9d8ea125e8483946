//! Battle tokens: stacks of identical ships on the board.
//!
//! A token combines a read-only [`TokenStats`] view derived from the ship
//! design with the mutable combat state of the stack.

use serde::{Deserialize, Serialize};

use crate::board::BoardPosition;
use crate::design::{DesignId, ShipDesign, WeaponComponent};
use crate::doctrine::Doctrine;
use crate::fleet::{FleetId, PlayerId, ShipStack};

/// Identifier of a token, valid only within one battle.
pub type TokenId = u32;

/// Per-ship combat aggregates derived from a design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStats {
    /// Armor per ship.
    pub armor: u32,
    /// Shields per ship.
    pub shields: u32,
    /// Mass per ship.
    pub mass: u32,
    /// Hull initiative.
    pub initiative: u32,
    /// Movement rating in quarter squares per round.
    pub movement: u32,
    /// Armed starbase flag source.
    pub starbase: bool,
    /// Any weapon deals damage.
    pub armed: bool,
    /// Can carry cargo.
    pub cargo: bool,
    /// Carries bombs.
    pub bomber: bool,
    /// Can transfer fuel.
    pub fuel_transport: bool,
    /// Fitted weapons in slot order.
    pub weapons: Vec<WeaponComponent>,
}

impl TokenStats {
    /// Derive battle aggregates from a design.
    #[must_use]
    pub fn from_design(design: &ShipDesign) -> Self {
        Self {
            armor: design.armor.max(1),
            shields: design.shields,
            mass: design.mass,
            initiative: design.initiative,
            movement: if design.starbase { 0 } else { design.movement },
            starbase: design.starbase,
            armed: design.is_armed(),
            cargo: design.cargo_capacity > 0,
            bomber: design.bomber,
            fuel_transport: design.fuel_transport,
            weapons: design.weapons.clone(),
        }
    }

    /// Longest weapon range, if armed.
    #[must_use]
    pub fn max_range(&self) -> Option<u32> {
        self.damaging_weapons().map(|w| w.range).max()
    }

    /// Shortest weapon range, if armed.
    #[must_use]
    pub fn min_range(&self) -> Option<u32> {
        self.damaging_weapons().map(|w| w.range).min()
    }

    fn damaging_weapons(&self) -> impl Iterator<Item = &WeaponComponent> {
        self.weapons
            .iter()
            .filter(|w| w.power > 0 && w.quantity > 0)
    }
}

/// Outcome of applying one hit to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitResult {
    /// Damage absorbed by the stack's shields.
    pub shield_damage: u32,
    /// Damage that reached armor.
    pub armor_damage: u32,
    /// Ships destroyed by this hit.
    pub destroyed: u32,
}

impl HitResult {
    /// Total damage dealt.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.shield_damage + self.armor_damage
    }
}

/// A stack of ships taking part in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Battle-local id.
    pub id: TokenId,
    /// Owning fleet.
    pub fleet: FleetId,
    /// Owning player.
    pub player: PlayerId,
    /// Design of every ship in the stack.
    pub design: DesignId,
    /// Doctrine of the owning fleet.
    pub doctrine: Doctrine,
    /// Derived combat aggregates.
    pub stats: TokenStats,
    /// Ships still alive.
    pub quantity: u32,
    /// Outstanding armor damage across the stack.
    pub damage: u32,
    /// Ships carrying damage.
    pub quantity_damaged: u32,
    /// Remaining stack shields.
    pub shields: u32,
    /// Current square.
    pub position: BoardPosition,
    /// Enemy token this token is approaching or fleeing.
    pub move_target: Option<TokenId>,
    /// Squares moved this battle.
    pub moves_made: u32,
    /// Took damage at some point in this battle.
    pub damaged_in_battle: bool,
    /// Escaped the battle by disengaging.
    pub ran_away: bool,
}

impl Token {
    /// Create a token for a fleet stack.
    #[must_use]
    pub fn new(
        id: TokenId,
        fleet: FleetId,
        player: PlayerId,
        doctrine: Doctrine,
        stack: &ShipStack,
        stats: TokenStats,
    ) -> Self {
        let shields = stats.shields.saturating_mul(stack.quantity);
        Self {
            id,
            fleet,
            player,
            design: stack.design,
            doctrine,
            quantity: stack.quantity,
            damage: stack.damage,
            quantity_damaged: stack.quantity_damaged.min(stack.quantity),
            shields,
            stats,
            position: BoardPosition::default(),
            move_target: None,
            moves_made: 0,
            damaged_in_battle: false,
            ran_away: false,
        }
    }

    /// Whether the token can still act and be targeted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.quantity > 0 && !self.ran_away
    }

    /// Whether the stack has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.quantity == 0
    }

    /// Whether the token carries damaging weapons.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.stats.armed
    }

    /// Total mass of the stack, used to order movement.
    #[must_use]
    pub fn stack_mass(&self) -> u64 {
        u64::from(self.stats.mass) * u64::from(self.quantity)
    }

    /// Armor left across the whole stack.
    #[must_use]
    pub fn armor_remaining(&self) -> u32 {
        self.stats
            .armor
            .saturating_mul(self.quantity)
            .saturating_sub(self.damage)
    }

    /// Apply a hit split into shield-first and armor-only portions.
    ///
    /// `shield_first` is absorbed by shields before any remainder reaches
    /// armor. `armor_only` bypasses shields entirely. Returns what actually
    /// landed; overkill is not counted.
    pub fn apply_hit(&mut self, shield_first: u32, armor_only: u32) -> HitResult {
        if self.is_destroyed() {
            return HitResult::default();
        }
        let shield_damage = shield_first.min(self.shields);
        self.shields -= shield_damage;

        let incoming = (shield_first - shield_damage).saturating_add(armor_only);
        let armor_damage = incoming.min(self.armor_remaining());
        self.damage += armor_damage;

        let destroyed = (self.damage / self.stats.armor).min(self.quantity);
        self.quantity -= destroyed;
        self.damage -= destroyed * self.stats.armor;
        if self.quantity == 0 {
            self.damage = 0;
        }
        self.quantity_damaged = if self.damage > 0 { self.quantity } else { 0 };
        self.shields = self
            .shields
            .min(self.stats.shields.saturating_mul(self.quantity));

        if shield_damage > 0 || armor_damage > 0 {
            self.damaged_in_battle = true;
        }

        HitResult {
            shield_damage,
            armor_damage,
            destroyed,
        }
    }

    /// Snapshot of the stack for handing back to the fleet.
    #[must_use]
    pub const fn to_stack(&self) -> ShipStack {
        ShipStack {
            design: self.design,
            quantity: self.quantity,
            damage: self.damage,
            quantity_damaged: self.quantity_damaged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::WeaponComponent;

    fn test_design() -> ShipDesign {
        ShipDesign {
            id: 1,
            name: "Cruiser".to_string(),
            armor: 100,
            shields: 20,
            mass: 50,
            initiative: 1,
            movement: 6,
            starbase: false,
            cargo_capacity: 0,
            bomber: false,
            fuel_transport: false,
            weapons: vec![
                WeaponComponent::beam("Laser", 1, 10, 0),
                WeaponComponent::torpedo("Alpha", 4, 12, 0, 35),
            ],
        }
    }

    fn test_token(quantity: u32) -> Token {
        let design = test_design();
        Token::new(
            0,
            10,
            1,
            Doctrine::default(),
            &ShipStack::new(design.id, quantity),
            TokenStats::from_design(&design),
        )
    }

    #[test]
    fn test_stats_from_design() {
        let stats = TokenStats::from_design(&test_design());
        assert!(stats.armed);
        assert!(!stats.cargo);
        assert_eq!(stats.max_range(), Some(4));
        assert_eq!(stats.min_range(), Some(1));
    }

    #[test]
    fn test_starbase_never_moves() {
        let mut design = test_design();
        design.starbase = true;
        assert_eq!(TokenStats::from_design(&design).movement, 0);
    }

    #[test]
    fn test_shields_absorb_first() {
        let mut token = test_token(3);
        assert_eq!(token.shields, 60);

        let hit = token.apply_hit(50, 0);
        assert_eq!(hit.shield_damage, 50);
        assert_eq!(hit.armor_damage, 0);
        assert_eq!(token.shields, 10);
        assert_eq!(token.quantity, 3);
    }

    #[test]
    fn test_armor_damage_destroys_whole_ships() {
        let mut token = test_token(3);
        let hit = token.apply_hit(60 + 250, 0);
        assert_eq!(hit.destroyed, 2);
        assert_eq!(token.quantity, 1);
        assert_eq!(token.damage, 50);
        assert_eq!(token.quantity_damaged, 1);
        // Shields capped to the survivor
        assert_eq!(token.shields, 0);
    }

    #[test]
    fn test_overkill_not_counted() {
        let mut token = test_token(2);
        let hit = token.apply_hit(0, 10_000);
        assert_eq!(hit.armor_damage, 200);
        assert_eq!(hit.destroyed, 2);
        assert!(token.is_destroyed());
        assert!(!token.is_active());
        assert_eq!(token.damage, 0);

        // Further hits do nothing
        assert_eq!(token.apply_hit(10, 10), HitResult::default());
    }

    #[test]
    fn test_preexisting_damage_counts() {
        let design = test_design();
        let stack = ShipStack {
            design: 1,
            quantity: 2,
            damage: 90,
            quantity_damaged: 2,
        };
        let mut token = Token::new(
            0,
            1,
            1,
            Doctrine::default(),
            &stack,
            TokenStats::from_design(&design),
        );
        assert_eq!(token.armor_remaining(), 110);
        let hit = token.apply_hit(0, 10);
        assert_eq!(hit.destroyed, 1);
        assert_eq!(token.quantity, 1);
        assert_eq!(token.damage, 0);
        assert_eq!(token.quantity_damaged, 0);
    }
}
