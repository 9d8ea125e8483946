//! Error types for battle resolution.

use thiserror::Error;

use crate::design::DesignId;
use crate::token::TokenId;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle engine errors.
///
/// Every variant except the record/data ones signals a contract breach by
/// the caller or an earlier stage of the engine. They are surfaced as
/// defects, never retried.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A fleet stack references a design the lookup does not know.
    #[error("Unknown ship design: {0}")]
    UnknownDesign(DesignId),

    /// An operation referenced a token id that is not part of this battle.
    #[error("Unknown token ID: {0}")]
    UnknownToken(TokenId),

    /// A destroyed token was scheduled to act.
    #[error("Token {0} was scheduled to act after being destroyed")]
    TokenDestroyed(TokenId),

    /// Battle rules failed validation.
    #[error("Invalid battle rules: {0}")]
    InvalidRules(String),

    /// An operation was invoked in the wrong lifecycle phase.
    #[error("Invalid battle phase: expected {expected}, found {found}")]
    InvalidPhase {
        /// Phase the operation requires.
        expected: &'static str,
        /// Phase the battle was in.
        found: &'static str,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParse {
        /// Path (or label) of the input that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Reading or writing a saved battle record failed.
    #[error("Battle record IO failed: {0}")]
    RecordIo(#[from] std::io::Error),

    /// A saved battle record could not be encoded or decoded.
    #[error("Battle record format error: {0}")]
    RecordFormat(String),

    /// A saved battle record was written by an incompatible version.
    #[error("Battle record version mismatch: expected {expected}, got {found}")]
    RecordVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },
}
