//! Game constants that govern battle resolution.
//!
//! Rules are plain data, passed explicitly into the engine. They can be
//! loaded from RON so that mods and tests can tweak the constants without
//! recompiling. Missing fields fall back to the standard values.
//!
//! # Example RON
//!
//! ```ron
//! BattleRules(
//!     board_size: 10,
//!     max_rounds: 16,
//!     beam_dissipation_percent: 10,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardPosition};
use crate::error::{BattleError, Result};

/// Number of rounds in one cycle of the movement table.
pub const MOVEMENT_CYCLE: usize = 4;

/// Fastest movement rating a design can have.
pub const MAX_MOVEMENT_RATING: u32 = 10;

/// Squares moved in each round of a movement cycle.
pub type MovementRow = [u32; MOVEMENT_CYCLE];

/// Constants for battle resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    /// Edge length of the square board.
    pub board_size: u32,
    /// Hard cap on the number of rounds in one battle.
    pub max_rounds: u32,
    /// Squares moved per round, indexed by movement rating.
    ///
    /// Ratings beyond the table use the last row.
    pub movement_table: Vec<MovementRow>,
    /// Starting squares, assigned round-robin to players in join order.
    pub placement_zones: Vec<BoardPosition>,
    /// Beam power lost at maximum range, in percent.
    pub beam_dissipation_percent: u32,
    /// A missed torpedo hits shields for `power / divisor`.
    pub torpedo_miss_shield_divisor: u32,
    /// Armor damage multiplier for capital ship missiles against unshielded stacks.
    pub capital_missile_multiplier: u32,
    /// Squares a disengaging token must move before it escapes the battle.
    pub disengage_squares: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            board_size: 10,
            max_rounds: 16,
            movement_table: vec![
                [0, 0, 0, 0],
                [1, 0, 0, 0],
                [1, 0, 1, 0],
                [1, 1, 0, 1],
                [1, 1, 1, 1],
                [2, 1, 1, 1],
                [2, 1, 2, 1],
                [2, 2, 1, 2],
                [2, 2, 2, 2],
                [3, 2, 2, 2],
                [3, 2, 3, 2],
            ],
            placement_zones: vec![
                BoardPosition::new(1, 4),
                BoardPosition::new(8, 5),
                BoardPosition::new(4, 1),
                BoardPosition::new(5, 8),
                BoardPosition::new(1, 1),
                BoardPosition::new(8, 8),
                BoardPosition::new(8, 1),
                BoardPosition::new(1, 8),
            ],
            beam_dissipation_percent: 10,
            torpedo_miss_shield_divisor: 8,
            capital_missile_multiplier: 2,
            disengage_squares: 7,
        }
    }
}

impl BattleRules {
    /// Load rules from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| BattleError::DataParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Load rules from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Self::parse(ron, "<inline>")
    }

    fn parse(ron: &str, label: &str) -> Result<Self> {
        let rules: Self = ron::from_str(ron).map_err(|e| BattleError::DataParse {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check that the rules describe a playable battle.
    pub fn validate(&self) -> Result<()> {
        if self.board_size < 2 {
            return Err(BattleError::InvalidRules(format!(
                "board_size must be at least 2, got {}",
                self.board_size
            )));
        }
        if self.max_rounds == 0 {
            return Err(BattleError::InvalidRules(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.movement_table.len() <= MAX_MOVEMENT_RATING as usize {
            return Err(BattleError::InvalidRules(format!(
                "movement_table needs a row for every rating 0..={MAX_MOVEMENT_RATING}, got {} rows",
                self.movement_table.len()
            )));
        }
        if self.placement_zones.is_empty() {
            return Err(BattleError::InvalidRules(
                "placement_zones must not be empty".to_string(),
            ));
        }
        let board = self.board();
        if let Some(zone) = self.placement_zones.iter().find(|z| !board.contains(**z)) {
            return Err(BattleError::InvalidRules(format!(
                "placement zone {zone} is off the {0}x{0} board",
                self.board_size
            )));
        }
        if self.beam_dissipation_percent > 100 {
            return Err(BattleError::InvalidRules(format!(
                "beam_dissipation_percent must be 0-100, got {}",
                self.beam_dissipation_percent
            )));
        }
        if self.torpedo_miss_shield_divisor == 0 {
            return Err(BattleError::InvalidRules(
                "torpedo_miss_shield_divisor must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Board geometry for these rules.
    #[must_use]
    pub const fn board(&self) -> Board {
        Board::new(self.board_size)
    }

    /// Squares a token with `rating` moves in the given 1-based round.
    #[must_use]
    pub fn squares_in_round(&self, rating: u32, round: u32) -> u32 {
        let Some(last) = self.movement_table.len().checked_sub(1) else {
            return 0;
        };
        let row = &self.movement_table[(rating as usize).min(last)];
        let slot = (round.saturating_sub(1) as usize) % MOVEMENT_CYCLE;
        row[slot]
    }
}
