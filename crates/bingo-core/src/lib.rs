#![deny(clippy::all)]
#![allow(missing_docs)]
//! Core functionality for the Bingo 75-ball game engine.
//!
//! This crate draws numbers, defines win patterns (including moving patterns
//! whose shapes change with a phase counter), evaluates cards against them and
//! runs a single game's lifecycle with auditable win verification.
//!
//! ```text
//! DrawSequencer --calls--> SessionController --(card, called, pattern, phase)--> MatchEngine
//!                                  |                                               |
//!                              call log  <------------------ Verdict --------------+
//! ```

use tracing::{debug, instrument};

/// Audit replay of recorded wins from the call log
pub mod audit;
/// Called-number state for one game
pub mod called;
/// Random card generation
pub mod cards;
/// Session configuration loading and environment overrides
pub mod config;
/// Core system constants
pub mod constants;
/// Random draws without replacement
pub mod draw;
/// Marked cells and verdict evaluation
pub mod engine;
/// Error taxonomy for engine operations
pub mod error;
/// Built-in patterns and the named pattern library
pub mod library;
/// Static and moving win patterns
pub mod pattern;
/// JSON import and export
pub mod serialization;
/// Game lifecycle and win verification
pub mod session;
/// Shared fixtures for tests and benchmarks
pub mod test_utils;
/// Cell permutations used by moving patterns
pub mod transform;
/// Verdicts, call records and game summaries
pub mod types;

pub use called::CalledSet;
pub use config::{SessionConfig, WinPolicy};
pub use draw::DrawSequencer;
pub use engine::{CardLookup, MatchEngine};
pub use error::{BingoError, BingoResult, ErrorSeverity};
pub use library::PatternLibrary;
pub use pattern::{Motion, MotionDefinition, Pattern, PatternDefinition, PhaseTrigger};
pub use session::{SessionController, SharedSession};
pub use transform::{Axis, Transform};
pub use types::{
    CallIndex, CallRecord, GameOutcome, GameState, GameSummary, Phase, PhaseCause, PhaseChange,
    Progress, SessionStats, ShapeMatch, Verdict, WinDetail, WinRecord,
};

/// Initialize the core engine components
#[instrument]
pub fn init() -> BingoResult<()> {
    debug!("Initializing Bingo core engine");
    Ok(())
}
