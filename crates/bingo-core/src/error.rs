//! Error handling for the Bingo Core engine
//!
//! Every failure the engine can report is a variant of [`BingoError`]. None of
//! them are fatal to the host process and none are retried automatically:
//! draw exhaustion and state-machine misuse are not transient, and
//! construction errors point at malformed configuration that must be fixed
//! before a game starts.
//!
//! An unknown card id passed to verification is deliberately *not* an error;
//! it is reported as [`crate::types::Verdict::InvalidCard`].

use crate::types::GameState;
use bingo_types::{CardId, GridError};
use std::fmt;
use thiserror::Error;

/// Error type for Bingo Core engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BingoError {
    /// A draw was requested after all 75 numbers were called
    #[error("all {called} numbers have been called")]
    Exhausted { called: usize },

    /// A game operation was issued outside an in-progress game
    #[error("game is not in progress (state: {state})")]
    GameNotInProgress { state: GameState },

    /// A call or phase change was issued after a verified win froze the game
    #[error("game already won; calling is frozen")]
    GameAlreadyWon,

    /// A phase change was requested for a pattern that does not move
    #[error("pattern '{pattern}' is not a moving pattern")]
    NotAMovingPattern { pattern: String },

    /// A pattern shape failed construction-time validation
    #[error("invalid shape in pattern '{pattern}': {source}")]
    InvalidShape {
        pattern: String,
        #[source]
        source: GridError,
    },

    /// A card grid failed construction-time validation
    #[error("invalid grid for card '{card_id}': {source}")]
    InvalidCardGrid {
        card_id: CardId,
        #[source]
        source: GridError,
    },

    /// A pattern definition is structurally unusable (no shapes, empty cycle, zero trigger)
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A manually entered number is outside 1-75
    #[error("number {number} is outside 1-75")]
    InvalidNumber { number: u8 },

    /// A manually entered number was already called this game
    #[error("number {number} was already called at call {call_index}")]
    NumberAlreadyCalled { number: u8, call_index: u32 },

    /// A card with the same id is already registered
    #[error("card '{card_id}' is already registered")]
    DuplicateCard { card_id: CardId },

    /// A named pattern is not present in the library
    #[error("unknown pattern '{name}'")]
    UnknownPattern { name: String },

    /// Card registration or pattern selection attempted during a game
    #[error("cannot {operation} while a game is in state {state}")]
    GameInSession { operation: String, state: GameState },

    /// Serialization and deserialization errors
    #[error("serialization error ({data_type}): {message}")]
    Serialization { data_type: String, message: String },

    /// Configuration and initialization errors
    #[error("configuration error for '{setting}': {message}")]
    Configuration { setting: String, message: String },
}

impl BingoError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BingoError::Exhausted { .. } => "draw",
            BingoError::GameNotInProgress { .. }
            | BingoError::GameAlreadyWon
            | BingoError::NotAMovingPattern { .. }
            | BingoError::GameInSession { .. } => "state",
            BingoError::InvalidShape { .. } | BingoError::InvalidPattern { .. } => "pattern",
            BingoError::InvalidCardGrid { .. } | BingoError::DuplicateCard { .. } => "card",
            BingoError::InvalidNumber { .. } | BingoError::NumberAlreadyCalled { .. } => "call",
            BingoError::UnknownPattern { .. } => "library",
            BingoError::Serialization { .. } => "serialization",
            BingoError::Configuration { .. } => "configuration",
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BingoError::GameNotInProgress { .. }
            | BingoError::GameAlreadyWon
            | BingoError::NotAMovingPattern { .. }
            | BingoError::InvalidNumber { .. }
            | BingoError::NumberAlreadyCalled { .. } => ErrorSeverity::Low,
            BingoError::Exhausted { .. }
            | BingoError::GameInSession { .. }
            | BingoError::DuplicateCard { .. }
            | BingoError::UnknownPattern { .. } => ErrorSeverity::Medium,
            BingoError::InvalidShape { .. }
            | BingoError::InvalidCardGrid { .. }
            | BingoError::InvalidPattern { .. }
            | BingoError::Serialization { .. } => ErrorSeverity::High,
            BingoError::Configuration { .. } => ErrorSeverity::Critical,
        }
    }

    /// Check if the caller can carry on with the current game after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Only a new game clears exhaustion
            BingoError::Exhausted { .. } => false,
            BingoError::GameNotInProgress { .. }
            | BingoError::GameAlreadyWon
            | BingoError::NotAMovingPattern { .. }
            | BingoError::InvalidNumber { .. }
            | BingoError::NumberAlreadyCalled { .. }
            | BingoError::DuplicateCard { .. }
            | BingoError::UnknownPattern { .. }
            | BingoError::GameInSession { .. } => true,
            // Malformed data must be fixed before a game starts
            BingoError::InvalidShape { .. }
            | BingoError::InvalidCardGrid { .. }
            | BingoError::InvalidPattern { .. }
            | BingoError::Serialization { .. }
            | BingoError::Configuration { .. } => false,
        }
    }
}

/// Error severity levels for logging and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Result type alias for core engine operations
pub type BingoResult<T> = Result<T, BingoError>;

/// Convenience constructors for common error scenarios
impl BingoError {
    /// Create a shape validation error for a named pattern
    pub fn invalid_shape(pattern: &str, source: GridError) -> Self {
        Self::InvalidShape { pattern: pattern.to_string(), source }
    }

    /// Create a card grid validation error
    pub fn invalid_card_grid(card_id: impl Into<CardId>, source: GridError) -> Self {
        Self::InvalidCardGrid { card_id: card_id.into(), source }
    }

    /// Create a structural pattern error
    pub fn invalid_pattern(pattern: &str, message: impl Into<String>) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), message: message.into() }
    }

    /// Create a serialization error
    pub fn serialization(data_type: &str, message: impl Into<String>) -> Self {
        Self::Serialization { data_type: data_type.to_string(), message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration { setting: setting.to_string(), message: message.into() }
    }

    /// Create an out-of-session error for registration-style operations
    pub fn game_in_session(operation: &str, state: GameState) -> Self {
        Self::GameInSession { operation: operation.to_string(), state }
    }
}

impl From<serde_json::Error> for BingoError {
    fn from(err: serde_json::Error) -> Self {
        BingoError::serialization("json", err.to_string())
    }
}

impl From<toml::de::Error> for BingoError {
    fn from(err: toml::de::Error) -> Self {
        BingoError::serialization("toml", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(BingoError::Exhausted { called: 75 }.category(), "draw");
        assert_eq!(BingoError::GameAlreadyWon.category(), "state");
        assert_eq!(
            BingoError::invalid_shape("x", GridError::EmptyShape).category(),
            "pattern"
        );
        assert_eq!(
            BingoError::invalid_card_grid("c1", GridError::DuplicateNumber { number: 3 })
                .category(),
            "card"
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(!BingoError::Exhausted { called: 75 }.is_recoverable());
        assert!(BingoError::GameAlreadyWon.is_recoverable());
        assert!(
            BingoError::GameNotInProgress { state: GameState::NotStarted }.is_recoverable()
        );
        assert!(!BingoError::configuration("seed", "bad").is_recoverable());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = BingoError::invalid_card_grid("ZZ-9", GridError::FreeCellOccupied { number: 40 });
        let message = err.to_string();
        assert!(message.contains("ZZ-9"));
        assert!(message.contains("free cell"));

        let err = BingoError::NumberAlreadyCalled { number: 12, call_index: 3 };
        assert_eq!(err.to_string(), "number 12 was already called at call 3");
        assert!(ErrorSeverity::Critical > ErrorSeverity::Low);
    }
}
