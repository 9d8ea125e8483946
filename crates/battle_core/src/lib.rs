//! # Battle Core
//!
//! Deterministic tactical battle resolution for a turn-based 4X game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond explicit rules and record file helpers
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! Every client that resolves the same fleets under the same rules arrives
//! at the same [`record::BattleRecord`], byte for byte.
//!
//! ## Crate Structure
//!
//! - [`board`] - Board geometry and Chebyshev distance
//! - [`design`] - Ship designs and the design lookup seam
//! - [`doctrine`] - Battle plans and diplomacy
//! - [`token`] - Ship stacks in battle
//! - [`battle`] - The battle instance
//! - [`targeting`] - Target classes and acquisition
//! - [`movement`] - Move plan and movement strategies
//! - [`weapons`] - Weapon slots and damage
//! - [`record`] - Per-player battle records
//! - [`engine`] - Battle loop and engine service

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod board;
pub mod design;
pub mod doctrine;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod math;
pub mod movement;
pub mod record;
pub mod rules;
pub mod targeting;
pub mod token;
pub mod weapons;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{Battle, BattlePhase};
    pub use crate::board::{Board, BoardPosition};
    pub use crate::design::{
        DesignCatalog, DesignId, DesignLookup, ShipDesign, WeaponComponent, WeaponKind,
    };
    pub use crate::doctrine::{
        AttackWho, Diplomacy, Doctrine, Relation, RelationTable, Tactic, TargetClass,
    };
    pub use crate::engine::{
        place_tokens_on_board, run_battle, BattleEngine, BattleOutcome, FleetOutcome,
    };
    pub use crate::error::{BattleError, Result};
    pub use crate::fleet::{Fleet, FleetId, PlayerId, ShipStack};
    pub use crate::math::Fixed;
    pub use crate::record::{BattleAction, BattleRecord, BattleStats, PlayerRecord};
    pub use crate::rules::BattleRules;
    pub use crate::targeting::{find_move_targets, find_targets, will_target};
    pub use crate::token::{Token, TokenId};
}
