//! Battle records for messaging and playback.
//!
//! Each player gets an append-only [`PlayerRecord`] of the actions their own
//! tokens took, keyed by round. The full [`BattleRecord`] adds the starting
//! layout of every token so that an observer can replay the battle without
//! re-running it, and a hash so that two observers can confirm they saw the
//! same battle.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::BoardPosition;
use crate::design::{DesignId, WeaponKind};
use crate::error::{BattleError, Result};
use crate::fleet::{FleetId, PlayerId};
use crate::token::{Token, TokenId};

/// Record file format version for compatibility.
pub const RECORD_VERSION: u32 = 1;

/// One discrete thing a token did during a round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleAction {
    /// The token moved one square.
    Move {
        /// Moving token.
        token: TokenId,
        /// Square before the move.
        from: BoardPosition,
        /// Square after the move.
        to: BoardPosition,
    },
    /// A weapon slot hit a target.
    WeaponFire {
        /// Beam or torpedo.
        kind: WeaponKind,
        /// Firing token.
        token: TokenId,
        /// Index of the weapon slot on the firing design.
        slot: u32,
        /// Token that was hit.
        target: TokenId,
        /// Damage that landed, shields and armor together.
        damage: u32,
        /// Portion absorbed by shields.
        shield_damage: u32,
        /// Portion that reached armor.
        armor_damage: u32,
        /// Ships destroyed.
        destroyed: u32,
    },
    /// The last ships of a stack were destroyed.
    Detonate {
        /// Destroyed token.
        token: TokenId,
        /// Square where it was destroyed.
        position: BoardPosition,
        /// Ships lost in the final hit.
        quantity: u32,
    },
    /// The token disengaged and left the battle.
    RanAway {
        /// Escaping token.
        token: TokenId,
        /// Square it left from.
        position: BoardPosition,
    },
}

impl BattleAction {
    /// Token that performed (or suffered) the action.
    #[must_use]
    pub const fn token(&self) -> TokenId {
        match self {
            Self::Move { token, .. }
            | Self::WeaponFire { token, .. }
            | Self::Detonate { token, .. }
            | Self::RanAway { token, .. } => *token,
        }
    }

    /// Whether the action is weapon fire.
    #[must_use]
    pub const fn is_weapon_fire(&self) -> bool {
        matches!(self, Self::WeaponFire { .. })
    }
}

/// Append-only action log for one player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player the record belongs to.
    pub player: PlayerId,
    actions_per_round: BTreeMap<u32, Vec<BattleAction>>,
}

impl PlayerRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            actions_per_round: BTreeMap::new(),
        }
    }

    /// Append an action to a round.
    pub fn record(&mut self, round: u32, action: BattleAction) {
        self.actions_per_round.entry(round).or_default().push(action);
    }

    /// Actions taken in a round, in order.
    #[must_use]
    pub fn actions(&self, round: u32) -> &[BattleAction] {
        self.actions_per_round
            .get(&round)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate rounds with their actions in round order.
    pub fn rounds(&self) -> impl Iterator<Item = (u32, &[BattleAction])> {
        self.actions_per_round
            .iter()
            .map(|(round, actions)| (*round, actions.as_slice()))
    }

    /// Total number of recorded actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions_per_round.values().map(Vec::len).sum()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }
}

/// Starting layout of one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Battle-local token id.
    pub id: TokenId,
    /// Owning fleet.
    pub fleet: FleetId,
    /// Owning player.
    pub player: PlayerId,
    /// Ship design.
    pub design: DesignId,
    /// Ships at the start of the battle.
    pub quantity: u32,
    /// Starting square.
    pub position: BoardPosition,
}

impl From<&Token> for TokenSnapshot {
    fn from(token: &Token) -> Self {
        Self {
            id: token.id,
            fleet: token.fleet,
            player: token.player,
            design: token.design,
            quantity: token.quantity,
            position: token.position,
        }
    }
}

/// Summary figures for a finished battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleStats {
    /// Rounds actually fought.
    pub rounds_fought: u32,
    /// Ships lost per player.
    pub ships_lost: BTreeMap<PlayerId, u32>,
    /// Tokens that escaped by disengaging.
    pub escaped: Vec<TokenId>,
}

/// Complete record of one battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Record format version.
    pub version: u32,
    /// Starting layout, in token id order.
    pub tokens: Vec<TokenSnapshot>,
    /// Per-player action logs.
    pub players: BTreeMap<PlayerId, PlayerRecord>,
    /// Summary figures.
    pub stats: BattleStats,
}

impl BattleRecord {
    /// Create a record from starting layout and player logs.
    #[must_use]
    pub fn new(
        tokens: Vec<TokenSnapshot>,
        players: BTreeMap<PlayerId, PlayerRecord>,
        stats: BattleStats,
    ) -> Self {
        Self {
            version: RECORD_VERSION,
            tokens,
            players,
            stats,
        }
    }

    /// Record for one player.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&player)
    }

    /// Total actions recorded across all players.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.players.values().map(PlayerRecord::action_count).sum()
    }

    /// Token positions after every move of the given round has played out.
    ///
    /// Round 0 is the starting layout. Tokens keep their last square after
    /// being destroyed or escaping.
    #[must_use]
    pub fn positions_after_round(&self, round: u32) -> BTreeMap<TokenId, BoardPosition> {
        let mut positions: BTreeMap<TokenId, BoardPosition> =
            self.tokens.iter().map(|t| (t.id, t.position)).collect();
        for record in self.players.values() {
            for (_, actions) in record.rounds().take_while(|(r, _)| *r <= round) {
                for action in actions {
                    if let BattleAction::Move { token, to, .. } = action {
                        positions.insert(*token, *to);
                    }
                }
            }
        }
        positions
    }

    /// Deterministic hash of the whole record.
    ///
    /// Two observers resolving the same battle must arrive at the same hash.
    #[must_use]
    pub fn record_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the record to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BattleError::RecordFormat(format!("Failed to serialize record: {e}")))
    }

    /// Deserialize a record from bytes, checking the version.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let record: Self = bincode::deserialize(data)
            .map_err(|e| BattleError::RecordFormat(format!("Failed to deserialize record: {e}")))?;
        if record.version != RECORD_VERSION {
            return Err(BattleError::RecordVersion {
                expected: RECORD_VERSION,
                found: record.version,
            });
        }
        Ok(record)
    }

    /// Save the record to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.serialize()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a record from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::deserialize(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> BattleRecord {
        let mut attacker = PlayerRecord::new(1);
        attacker.record(
            1,
            BattleAction::Move {
                token: 0,
                from: BoardPosition::new(1, 4),
                to: BoardPosition::new(2, 5),
            },
        );
        attacker.record(
            1,
            BattleAction::WeaponFire {
                kind: WeaponKind::Beam,
                token: 0,
                slot: 0,
                target: 1,
                damage: 30,
                shield_damage: 10,
                armor_damage: 20,
                destroyed: 0,
            },
        );
        attacker.record(
            3,
            BattleAction::Move {
                token: 0,
                from: BoardPosition::new(2, 5),
                to: BoardPosition::new(3, 5),
            },
        );
        let defender = PlayerRecord::new(2);

        let tokens = vec![
            TokenSnapshot {
                id: 0,
                fleet: 10,
                player: 1,
                design: 1,
                quantity: 2,
                position: BoardPosition::new(1, 4),
            },
            TokenSnapshot {
                id: 1,
                fleet: 20,
                player: 2,
                design: 2,
                quantity: 1,
                position: BoardPosition::new(8, 5),
            },
        ];
        let players = [(1, attacker), (2, defender)].into_iter().collect();
        BattleRecord::new(tokens, players, BattleStats::default())
    }

    #[test]
    fn test_player_record_append() {
        let record = sample_record();
        let attacker = record.player(1).unwrap();
        assert_eq!(attacker.actions(1).len(), 2);
        assert_eq!(attacker.actions(2).len(), 0);
        assert_eq!(attacker.action_count(), 3);
        assert!(attacker.actions(1)[1].is_weapon_fire());
        assert!(record.player(2).unwrap().is_empty());
        assert_eq!(record.action_count(), 3);
    }

    #[test]
    fn test_positions_after_round() {
        let record = sample_record();
        assert_eq!(record.positions_after_round(0)[&0], BoardPosition::new(1, 4));
        assert_eq!(record.positions_after_round(1)[&0], BoardPosition::new(2, 5));
        assert_eq!(record.positions_after_round(2)[&0], BoardPosition::new(2, 5));
        assert_eq!(record.positions_after_round(3)[&0], BoardPosition::new(3, 5));
        assert_eq!(record.positions_after_round(3)[&1], BoardPosition::new(8, 5));
    }

    #[test]
    fn test_serialize_round_trip_keeps_hash() {
        let record = sample_record();
        let bytes = record.serialize().unwrap();
        let restored = BattleRecord::deserialize(&bytes).unwrap();
        assert_eq!(restored, record);
        assert_eq!(restored.record_hash(), record.record_hash());
    }

    #[test]
    fn test_hash_changes_with_content() {
        let record = sample_record();
        let mut other = record.clone();
        other
            .players
            .get_mut(&2)
            .unwrap()
            .record(1, BattleAction::RanAway {
                token: 1,
                position: BoardPosition::new(9, 5),
            });
        assert_ne!(record.record_hash(), other.record_hash());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut record = sample_record();
        record.version = RECORD_VERSION + 1;
        let bytes = record.serialize().unwrap();
        assert!(matches!(
            BattleRecord::deserialize(&bytes),
            Err(BattleError::RecordVersion { .. })
        ));
    }

    #[test]
    fn test_save_load() {
        let record = sample_record();
        let temp_path = std::env::temp_dir().join("battle_core_test_record.bin");
        assert!(record.save(&temp_path).is_ok());

        let loaded = BattleRecord::load(&temp_path).unwrap();
        assert_eq!(loaded.record_hash(), record.record_hash());

        let _ = std::fs::remove_file(temp_path);
    }
}
