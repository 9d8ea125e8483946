//! Battle movement: the per-battle move plan and the movement strategies.
//!
//! The plan is computed once, from movement ratings and stack mass, and
//! lists for every round which tokens step and in what order. A token that
//! moves two squares in a round appears twice. Each entry is one call to
//! [`move_token`], which moves at most one square.
//!
//! # Ordering
//!
//! Within a round, every token's first step comes before any token's
//! second step. Within a step, heavier stacks go first, ties broken by
//! token id.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::board::{Board, BoardPosition};
use crate::doctrine::Tactic;
use crate::error::{BattleError, Result};
use crate::record::BattleAction;
use crate::targeting::{is_disengaging, is_hostile};
use crate::token::{Token, TokenId};

/// Round-indexed movement plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOrder {
    rounds: Vec<Vec<TokenId>>,
}

impl MoveOrder {
    /// Token steps for a 1-based round, in execution order.
    #[must_use]
    pub fn round(&self, round: u32) -> &[TokenId] {
        round
            .checked_sub(1)
            .and_then(|index| self.rounds.get(index as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of planned rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Whether no rounds are planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

/// Compute the movement plan for every round of the battle.
#[must_use]
pub fn build_movement_order(battle: &Battle) -> MoveOrder {
    let rules = battle.rules();
    let mut movers: Vec<&Token> = battle.active_tokens().collect();
    movers.sort_by_key(|t| (Reverse(t.stack_mass()), t.id));

    let rounds = (1..=rules.max_rounds)
        .map(|round| {
            let squares: Vec<(TokenId, u32)> = movers
                .iter()
                .map(|t| (t.id, rules.squares_in_round(t.stats.movement, round)))
                .collect();
            let most = squares.iter().map(|(_, n)| *n).max().unwrap_or(0);
            (0..most)
                .flat_map(|step| {
                    squares
                        .iter()
                        .filter(move |(_, n)| *n > step)
                        .map(|(id, _)| *id)
                })
                .collect()
        })
        .collect();

    MoveOrder { rounds }
}

/// Unit step from `from` towards `to` on each axis.
fn toward(from: BoardPosition, to: BoardPosition) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

/// Sideways offset used to weave on alternating rounds.
fn zigzag_offset(board: &Board, position: i32, round: u32) -> i32 {
    let offset = if round % 2 == 1 { 1 } else { -1 };
    if (0..=board.max_coordinate()).contains(&(position + offset)) {
        offset
    } else {
        -offset
    }
}

/// Next square when closing on `target`.
///
/// Steps along the axis with the larger gap. On the other axis it closes
/// the gap too, or weaves when already aligned.
fn pursuit_step(
    board: &Board,
    from: BoardPosition,
    target: BoardPosition,
    round: u32,
) -> BoardPosition {
    let (sx, sy) = toward(from, target);
    let x_primary = (target.x - from.x).abs() >= (target.y - from.y).abs();
    let step = if x_primary {
        let sy = if sy == 0 {
            zigzag_offset(board, from.y, round)
        } else {
            sy
        };
        (sx, sy)
    } else {
        let sx = if sx == 0 {
            zigzag_offset(board, from.x, round)
        } else {
            sx
        };
        (sx, sy)
    };
    board.clamp(from.offset(step.0, step.1))
}

/// Unit step from `threat` to `from`, picking a side when they share a square.
fn away_from(board: &Board, from: BoardPosition, threat: BoardPosition) -> (i32, i32) {
    match toward(threat, from) {
        (0, 0) => (if from.x * 2 < board.max_coordinate() { -1 } else { 1 }, 0),
        step => step,
    }
}

/// Next square when backing away from `threat`, if any square gains distance.
fn retreat_step(board: &Board, from: BoardPosition, threat: BoardPosition) -> Option<BoardPosition> {
    let (sx, sy) = away_from(board, from, threat);
    let current = from.distance(threat);
    [(sx, sy), (sx, 0), (0, sy)]
        .into_iter()
        .filter(|step| *step != (0, 0))
        .map(|(dx, dy)| from.offset(dx, dy))
        .find(|dest| board.contains(*dest) && dest.distance(threat) > current)
}

/// Next square for a fleeing token.
///
/// Prefers a square that gains distance. When the board edge blocks that,
/// slides along the edge to a square at the same distance, so the next
/// step can open the gap again.
fn escape_step(board: &Board, from: BoardPosition, threat: BoardPosition) -> Option<BoardPosition> {
    if let Some(dest) = retreat_step(board, from, threat) {
        return Some(dest);
    }
    let (sx, sy) = away_from(board, from, threat);
    let current = from.distance(threat);
    [(sx, 0), (0, sy), (0, 1), (0, -1), (1, 0), (-1, 0)]
        .into_iter()
        .filter(|step| *step != (0, 0))
        .map(|(dx, dy)| from.offset(dx, dy))
        .find(|dest| board.contains(*dest) && dest.distance(threat) >= current)
}

/// Token that is about to act; destroyed tokens are a scheduling defect.
fn acting_token(battle: &Battle, id: TokenId) -> Result<&Token> {
    let token = battle.token(id)?;
    if token.is_destroyed() {
        return Err(BattleError::TokenDestroyed(id));
    }
    Ok(token)
}

/// Move a token one square and record it for the owner.
fn step_to(battle: &mut Battle, id: TokenId, to: BoardPosition) -> Result<()> {
    let token = battle.token_mut(id)?;
    let from = token.position;
    if from == to {
        return Ok(());
    }
    token.position = to;
    token.moves_made += 1;
    let player = token.player;
    battle.record_action(player, BattleAction::Move { token: id, from, to });
    Ok(())
}

/// Active move target of a token, if it still exists.
fn live_target(battle: &Battle, token: &Token) -> Result<Option<BoardPosition>> {
    let Some(target_id) = token.move_target else {
        return Ok(None);
    };
    let target = battle.token(target_id)?;
    Ok(target.is_active().then_some(target.position))
}

/// Close on the move target while it is out of range of every weapon.
///
/// Holds when there is no live target or any weapon already reaches it.
pub fn maximize_damage(battle: &mut Battle, id: TokenId) -> Result<()> {
    let token = acting_token(battle, id)?;
    if !token.is_active() {
        return Ok(());
    }
    let Some(target) = live_target(battle, token)? else {
        return Ok(());
    };
    let Some(reach) = token.stats.max_range() else {
        return Ok(());
    };
    if token.position.distance(target) <= reach {
        return Ok(());
    }
    let dest = pursuit_step(&battle.rules().board(), token.position, target, battle.round());
    step_to(battle, id, dest)
}

/// Hold at the longest weapon range from the move target.
pub fn keep_distance(battle: &mut Battle, id: TokenId) -> Result<()> {
    let token = acting_token(battle, id)?;
    if !token.is_active() {
        return Ok(());
    }
    let Some(target) = live_target(battle, token)? else {
        return Ok(());
    };
    let Some(reach) = token.stats.max_range() else {
        return Ok(());
    };
    let board = battle.rules().board();
    let distance = token.position.distance(target);
    let dest = if distance > reach {
        Some(pursuit_step(&board, token.position, target, battle.round()))
    } else if distance < reach {
        retreat_step(&board, token.position, target)
    } else {
        None
    };
    match dest {
        Some(dest) => step_to(battle, id, dest),
        None => Ok(()),
    }
}

/// Nearest active armed token that would attack `token`.
fn nearest_threat<'a>(battle: &'a Battle, token: &Token) -> Option<&'a Token> {
    battle
        .active_tokens()
        .filter(|enemy| enemy.is_armed() && is_hostile(battle, enemy, token))
        .min_by_key(|enemy| (enemy.position.distance(token.position), enemy.id))
}

/// Back away from the nearest threat.
///
/// A token that stands exactly at the threat's longest range ends one
/// square beyond it. A token pinned against the board edge slides along
/// it. Once a disengaging token has moved far enough it escapes the battle.
pub fn run_away(battle: &mut Battle, id: TokenId) -> Result<()> {
    let token = acting_token(battle, id)?;
    if !token.is_active() {
        return Ok(());
    }
    let Some(threat) = nearest_threat(battle, token) else {
        return Ok(());
    };
    if let Some(dest) = escape_step(&battle.rules().board(), token.position, threat.position) {
        step_to(battle, id, dest)?;
    }

    let disengage_squares = battle.rules().disengage_squares;
    let token = battle.token_mut(id)?;
    if is_disengaging(token) && token.moves_made >= disengage_squares {
        token.ran_away = true;
        token.move_target = None;
        let (player, position) = (token.player, token.position);
        tracing::debug!(token = id, player, "Token disengaged");
        battle.record_action(player, BattleAction::RanAway { token: id, position });
    }
    Ok(())
}

/// Move a token one step according to its doctrine.
pub fn move_token(battle: &mut Battle, id: TokenId) -> Result<()> {
    let token = acting_token(battle, id)?;
    if is_disengaging(token) {
        return run_away(battle, id);
    }
    let tactic = token.doctrine.tactic;
    match tactic {
        Tactic::MinimizeDamageToSelf => keep_distance(battle, id),
        _ => maximize_damage(battle, id),
    }
}
