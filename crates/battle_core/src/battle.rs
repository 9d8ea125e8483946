//! The battle instance: tokens, records, and per-battle plans.
//!
//! A [`Battle`] owns everything one resolution touches. Tokens are stored
//! in build order and never removed from the vector; a destroyed or escaped
//! token simply becomes inactive, so token ids stay valid indices for the
//! whole battle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::design::DesignLookup;
use crate::doctrine::{Diplomacy, Relation};
use crate::error::{BattleError, Result};
use crate::fleet::{Fleet, PlayerId};
use crate::movement::MoveOrder;
use crate::record::{BattleAction, PlayerRecord};
use crate::rules::BattleRules;
use crate::token::{Token, TokenId, TokenStats};
use crate::weapons::WeaponSlot;

/// Lifecycle of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Built, tokens not yet on the board.
    Initialized,
    /// Tokens placed.
    Placed,
    /// Rounds in progress.
    Running,
    /// Finished; records can be extracted.
    Terminated,
}

impl BattlePhase {
    /// Name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialized => "Initialized",
            Self::Placed => "Placed",
            Self::Running => "Running",
            Self::Terminated => "Terminated",
        }
    }
}

/// A single battle being resolved.
#[derive(Debug, Clone)]
pub struct Battle {
    rules: BattleRules,
    tokens: Vec<Token>,
    players: Vec<PlayerId>,
    relations: BTreeMap<(PlayerId, PlayerId), Relation>,
    records: BTreeMap<PlayerId, PlayerRecord>,
    pub(crate) move_order: MoveOrder,
    pub(crate) weapon_slots: Vec<WeaponSlot>,
    round: u32,
    pub(crate) rounds_fought: u32,
    pub(crate) phase: BattlePhase,
}

impl Battle {
    /// Build a battle from every fleet at one location.
    ///
    /// Tokens are created in input order: fleets first, then stacks within
    /// a fleet. Empty stacks are skipped. One record is created per
    /// distinct player.
    pub fn build<D, R>(
        fleets: &[Fleet],
        designs: &D,
        diplomacy: &R,
        rules: &BattleRules,
    ) -> Result<Self>
    where
        D: DesignLookup + ?Sized,
        R: Diplomacy + ?Sized,
    {
        rules.validate()?;

        let mut tokens = Vec::new();
        let mut players = Vec::new();
        for fleet in fleets {
            if !players.contains(&fleet.player) {
                players.push(fleet.player);
            }
            for stack in fleet.stacks.iter().filter(|s| s.quantity > 0) {
                let design = designs
                    .design(stack.design)
                    .ok_or(BattleError::UnknownDesign(stack.design))?;
                let id = TokenId::try_from(tokens.len())
                    .map_err(|_| BattleError::InvalidRules("too many tokens".to_string()))?;
                tokens.push(Token::new(
                    id,
                    fleet.id,
                    fleet.player,
                    fleet.doctrine,
                    stack,
                    TokenStats::from_design(design),
                ));
            }
        }

        let mut relations = BTreeMap::new();
        for &from in &players {
            for &to in &players {
                relations.insert((from, to), diplomacy.relation(from, to));
            }
        }

        let records = players
            .iter()
            .map(|&player| (player, PlayerRecord::new(player)))
            .collect();

        tracing::debug!(
            tokens = tokens.len(),
            players = players.len(),
            "Battle built"
        );

        Ok(Self {
            rules: rules.clone(),
            tokens,
            players,
            relations,
            records,
            move_order: MoveOrder::default(),
            weapon_slots: Vec::new(),
            round: 1,
            rounds_fought: 0,
            phase: BattlePhase::Initialized,
        })
    }

    /// Rules this battle runs under.
    #[must_use]
    pub const fn rules(&self) -> &BattleRules {
        &self.rules
    }

    /// All tokens, active or not, in id order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterate tokens that can still act and be targeted.
    pub fn active_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_active())
    }

    /// Look up a token.
    pub fn token(&self, id: TokenId) -> Result<&Token> {
        self.tokens
            .get(id as usize)
            .ok_or(BattleError::UnknownToken(id))
    }

    /// Look up a token mutably.
    pub fn token_mut(&mut self, id: TokenId) -> Result<&mut Token> {
        self.tokens
            .get_mut(id as usize)
            .ok_or(BattleError::UnknownToken(id))
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Players in join order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// How `from` regards `to`, as captured when the battle was built.
    #[must_use]
    pub fn relation(&self, from: PlayerId, to: PlayerId) -> Relation {
        if from == to {
            return Relation::Friend;
        }
        self.relations
            .get(&(from, to))
            .copied()
            .unwrap_or(Relation::Enemy)
    }

    /// Per-player records.
    #[must_use]
    pub const fn records(&self) -> &BTreeMap<PlayerId, PlayerRecord> {
        &self.records
    }

    /// Record for one player.
    #[must_use]
    pub fn record(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.records.get(&player)
    }

    pub(crate) fn take_records(&mut self) -> BTreeMap<PlayerId, PlayerRecord> {
        std::mem::take(&mut self.records)
    }

    /// Append an action to a player's record for the current round.
    pub fn record_action(&mut self, player: PlayerId, action: BattleAction) {
        tracing::trace!(round = self.round, player, ?action, "Battle action");
        self.records
            .entry(player)
            .or_insert_with(|| PlayerRecord::new(player))
            .record(self.round, action);
    }

    /// Current 1-based round.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Set the current round.
    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    /// Rounds played so far.
    #[must_use]
    pub const fn rounds_fought(&self) -> u32 {
        self.rounds_fought
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Movement plan computed by [`crate::movement::build_movement_order`].
    #[must_use]
    pub fn move_order(&self) -> &MoveOrder {
        &self.move_order
    }

    /// Weapon slots sorted for the current round.
    #[must_use]
    pub fn weapon_slots(&self) -> &[WeaponSlot] {
        &self.weapon_slots
    }

    /// Whether any active token has a move target.
    ///
    /// False until [`crate::targeting::find_move_targets`] has run.
    #[must_use]
    pub fn has_targets(&self) -> bool {
        self.active_tokens().any(|t| t.move_target.is_some())
    }

    /// Fail unless the battle is in `expected`.
    pub(crate) fn expect_phase(&self, expected: BattlePhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BattleError::InvalidPhase {
                expected: expected.name(),
                found: self.phase.name(),
            })
        }
    }
}
