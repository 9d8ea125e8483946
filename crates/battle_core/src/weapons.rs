//! Weapon resolution.
//!
//! Every round the weapon slots of all active tokens are flattened and
//! sorted by initiative, then fired one at a time. Targets are acquired
//! afresh for each shot, so a stack destroyed by an earlier slot is never
//! fired upon again and a slot whose own token died is skipped.
//!
//! # Damage rules
//!
//! - **Beams** lose power linearly with range, hit shields before armor,
//!   and carry leftover damage into the next target once a stack dies.
//!   Beams that hit all targets deal their damage to every target in range.
//! - **Torpedoes** resolve one at a time. Hits split damage evenly between
//!   shields and armor; misses only scratch shields. Capital ship missiles
//!   multiply armor damage against unshielded stacks.

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::design::WeaponKind;
use crate::error::Result;
use crate::math::{beam_falloff, scale_floor};
use crate::record::BattleAction;
use crate::targeting::{find_targets, targets_in_range};
use crate::token::{HitResult, TokenId};

/// One weapon slot of one token, as fired in battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSlot {
    /// Firing token.
    pub token: TokenId,
    /// Index of the weapon on the design.
    pub slot: u32,
    /// Beam or torpedo.
    pub kind: WeaponKind,
    /// Range in squares.
    pub range: u32,
    /// Damage per weapon per shot.
    pub power: u32,
    /// Hull plus weapon initiative.
    pub initiative: u32,
    /// Weapons in the slot on each ship.
    pub quantity: u32,
    /// Torpedo hit chance in percent.
    pub accuracy: u32,
    /// Beam hits every target in range.
    pub hits_all: bool,
    /// Torpedo multiplies armor damage against unshielded targets.
    pub capital_ship_missile: bool,
}

/// Flatten and sort the weapon slots of every active token.
///
/// Higher initiative fires first; ties go to the lower token id, then the
/// lower slot index.
pub fn build_sorted_weapon_slots(battle: &mut Battle) {
    let mut slots: Vec<WeaponSlot> = battle
        .active_tokens()
        .flat_map(|token| {
            token
                .stats
                .weapons
                .iter()
                .enumerate()
                .filter(|(_, w)| w.power > 0 && w.quantity > 0)
                .map(move |(index, weapon)| WeaponSlot {
                    token: token.id,
                    slot: index as u32,
                    kind: weapon.kind,
                    range: weapon.range,
                    power: weapon.power,
                    initiative: token.stats.initiative.saturating_add(weapon.initiative),
                    quantity: weapon.quantity,
                    accuracy: weapon.accuracy.min(100),
                    hits_all: weapon.hits_all,
                    capital_ship_missile: weapon.capital_ship_missile,
                })
        })
        .collect();

    slots.sort_by(|a, b| {
        b.initiative
            .cmp(&a.initiative)
            .then(a.token.cmp(&b.token))
            .then(a.slot.cmp(&b.slot))
    });
    battle.weapon_slots = slots;
}

/// Damage accumulated against one target, flushed as a single action.
#[derive(Debug, Clone, Copy)]
struct PendingFire {
    target: TokenId,
    hit: HitResult,
}

impl PendingFire {
    fn new(target: TokenId) -> Self {
        Self {
            target,
            hit: HitResult::default(),
        }
    }

    fn add(&mut self, hit: HitResult) {
        self.hit.shield_damage += hit.shield_damage;
        self.hit.armor_damage += hit.armor_damage;
        self.hit.destroyed += hit.destroyed;
    }
}

/// Record a finished engagement against one target for the attacker.
fn flush(battle: &mut Battle, slot: &WeaponSlot, pending: PendingFire) -> Result<()> {
    let player = battle.token(slot.token)?.player;
    battle.record_action(
        player,
        BattleAction::WeaponFire {
            kind: slot.kind,
            token: slot.token,
            slot: slot.slot,
            target: pending.target,
            damage: pending.hit.total(),
            shield_damage: pending.hit.shield_damage,
            armor_damage: pending.hit.armor_damage,
            destroyed: pending.hit.destroyed,
        },
    );
    Ok(())
}

/// Apply a hit and record the target's destruction for its owner.
fn strike(
    battle: &mut Battle,
    target_id: TokenId,
    shield_first: u32,
    armor_only: u32,
) -> Result<HitResult> {
    let target = battle.token_mut(target_id)?;
    let hit = target.apply_hit(shield_first, armor_only);
    if hit.destroyed > 0 && target.is_destroyed() {
        let (player, position) = (target.player, target.position);
        tracing::debug!(token = target_id, player, "Token destroyed");
        battle.record_action(
            player,
            BattleAction::Detonate {
                token: target_id,
                position,
                quantity: hit.destroyed,
            },
        );
    }
    Ok(hit)
}

/// Fire one weapon slot.
///
/// A slot whose token is no longer active is skipped without error.
pub fn fire_weapon_slot(battle: &mut Battle, slot: &WeaponSlot) -> Result<()> {
    let attacker = battle.token(slot.token)?;
    if !attacker.is_active() {
        return Ok(());
    }
    let weapons = slot.quantity.saturating_mul(attacker.quantity);
    match slot.kind {
        WeaponKind::Beam if slot.hits_all => fire_beam_at_all(battle, slot, weapons),
        WeaponKind::Beam => fire_beam(battle, slot, weapons),
        WeaponKind::Torpedo => fire_torpedoes(battle, slot, weapons),
    }
}

/// Beam damage after dissipation over the distance to a target.
fn beam_damage(battle: &Battle, slot: &WeaponSlot, raw: u32, target: TokenId) -> Result<u32> {
    let origin = battle.token(slot.token)?.position;
    let distance = origin.distance(battle.token(target)?.position);
    let falloff = beam_falloff(
        battle.rules().beam_dissipation_percent,
        distance,
        slot.range,
    );
    Ok(scale_floor(raw, falloff))
}

fn fire_beam(battle: &mut Battle, slot: &WeaponSlot, weapons: u32) -> Result<()> {
    let mut raw = slot.power.saturating_mul(weapons);
    while raw > 0 {
        let Some(target) = find_targets(battle, slot)? else {
            break;
        };
        let damage = beam_damage(battle, slot, raw, target)?;
        if damage == 0 {
            break;
        }
        let hit = strike(battle, target, damage, 0)?;
        let mut pending = PendingFire::new(target);
        pending.add(hit);
        flush(battle, slot, pending)?;

        if battle.token(target)?.is_active() {
            break;
        }
        // Spill what the dead stack did not soak up into the next target
        let left = u64::from(damage - hit.total());
        raw = u32::try_from(u64::from(raw) * left / u64::from(damage)).unwrap_or(0);
    }
    Ok(())
}

fn fire_beam_at_all(battle: &mut Battle, slot: &WeaponSlot, weapons: u32) -> Result<()> {
    let raw = slot.power.saturating_mul(weapons);
    for target in targets_in_range(battle, slot)? {
        let damage = beam_damage(battle, slot, raw, target)?;
        if damage == 0 {
            continue;
        }
        let hit = strike(battle, target, damage, 0)?;
        let mut pending = PendingFire::new(target);
        pending.add(hit);
        flush(battle, slot, pending)?;
    }
    Ok(())
}

fn fire_torpedoes(battle: &mut Battle, slot: &WeaponSlot, torpedoes: u32) -> Result<()> {
    let rules = battle.rules();
    let miss_divisor = rules.torpedo_miss_shield_divisor.max(1);
    let csm_multiplier = rules.capital_missile_multiplier.max(1);

    let mut accuracy_accumulator = 0;
    let mut pending: Option<PendingFire> = None;
    for _ in 0..torpedoes {
        let Some(target_id) = find_targets(battle, slot)? else {
            break;
        };
        if let Some(previous) = pending.filter(|p| p.target != target_id) {
            flush(battle, slot, previous)?;
            pending = None;
        }

        accuracy_accumulator += slot.accuracy;
        let is_hit = accuracy_accumulator >= 100;
        if is_hit {
            accuracy_accumulator -= 100;
        }

        let shields = battle.token(target_id)?.shields;
        let (shield_first, armor_only) = if !is_hit {
            ((slot.power / miss_divisor).min(shields), 0)
        } else if shields > 0 {
            let half = slot.power / 2;
            (half, slot.power - half)
        } else if slot.capital_ship_missile {
            (0, slot.power.saturating_mul(csm_multiplier))
        } else {
            (0, slot.power)
        };

        let hit = strike(battle, target_id, shield_first, armor_only)?;
        pending
            .get_or_insert_with(|| PendingFire::new(target_id))
            .add(hit);
    }
    if let Some(last) = pending {
        flush(battle, slot, last)?;
    }
    Ok(())
}
