//! Target selection.
//!
//! [`will_target`] is the pure class predicate. Acquisition walks a
//! doctrine's classes in preference order and, within a class, takes the
//! first eligible token in id order, so selection never depends on anything
//! but the battle state.

use crate::battle::Battle;
use crate::doctrine::TargetClass;
use crate::error::Result;
use crate::token::{Token, TokenId};
use crate::weapons::WeaponSlot;

/// Whether a target class matches a token.
#[must_use]
pub fn will_target(target: TargetClass, token: &Token) -> bool {
    let stats = &token.stats;
    match target {
        TargetClass::None => false,
        TargetClass::Any => true,
        TargetClass::Starbase => stats.starbase && stats.armed,
        TargetClass::ArmedShips => stats.armed,
        TargetClass::UnarmedShips => !stats.armed,
        TargetClass::Freighters => stats.cargo,
        TargetClass::BombersFreighters => stats.bomber || stats.cargo,
        TargetClass::FuelTransports => stats.fuel_transport,
    }
}

/// Whether `attacker`'s attack policy allows engaging `target` at all.
#[must_use]
pub fn is_hostile(battle: &Battle, attacker: &Token, target: &Token) -> bool {
    attacker.player != target.player
        && target.is_active()
        && attacker
            .doctrine
            .attack_who
            .permits(battle.relation(attacker.player, target.player))
}

/// First token `attacker` would pick among those passing `in_reach`.
fn select_target<F>(battle: &Battle, attacker: &Token, in_reach: F) -> Option<TokenId>
where
    F: Fn(&Token) -> bool,
{
    attacker.doctrine.target_order().into_iter().find_map(|class| {
        battle
            .active_tokens()
            .find(|candidate| {
                is_hostile(battle, attacker, candidate)
                    && will_target(class, candidate)
                    && in_reach(candidate)
            })
            .map(|candidate| candidate.id)
    })
}

/// Whether the token's current doctrine has it fleeing rather than fighting.
#[must_use]
pub fn is_disengaging(token: &Token) -> bool {
    use crate::doctrine::Tactic;
    !token.is_armed()
        || match token.doctrine.tactic {
            Tactic::Disengage => true,
            Tactic::DisengageIfChallenged => token.damaged_in_battle,
            _ => false,
        }
}

/// Choose a move target for every active token.
///
/// Disengaging and unarmed tokens get no target.
pub fn find_move_targets(battle: &mut Battle) {
    let choices: Vec<(TokenId, Option<TokenId>)> = battle
        .active_tokens()
        .map(|token| {
            let target = if is_disengaging(token) {
                None
            } else {
                select_target(battle, token, |_| true)
            };
            (token.id, target)
        })
        .collect();

    for (id, target) in choices {
        if let Some(token) = battle.tokens_mut().get_mut(id as usize) {
            token.move_target = target;
        }
    }
}

/// Choose a target in range of a weapon slot.
pub fn find_targets(battle: &Battle, slot: &WeaponSlot) -> Result<Option<TokenId>> {
    let attacker = battle.token(slot.token)?;
    let origin = attacker.position;
    Ok(select_target(battle, attacker, |candidate| {
        origin.distance(candidate.position) <= slot.range
    }))
}

/// Every token in range that the slot's owner would engage, in id order.
pub fn targets_in_range(battle: &Battle, slot: &WeaponSlot) -> Result<Vec<TokenId>> {
    let attacker = battle.token(slot.token)?;
    let origin = attacker.position;
    let classes = attacker.doctrine.target_order();
    Ok(battle
        .active_tokens()
        .filter(|candidate| {
            is_hostile(battle, attacker, candidate)
                && origin.distance(candidate.position) <= slot.range
                && classes.iter().any(|class| will_target(*class, candidate))
        })
        .map(|candidate| candidate.id)
        .collect())
}
