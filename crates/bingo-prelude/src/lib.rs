//! Bingo Prelude
//!
//! This crate re-exports the most frequently used public items from the Bingo
//! ecosystem (currently `bingo-core` and `bingo-types`).  Down-stream
//! applications can depend on `bingo-prelude` to avoid long import lists and
//! to stay insulated from internal module reshuffles.

#![deny(missing_docs)]

// Card and grid value types -------------------------------------------------------------------

pub use bingo_types::{Card, CardId, Cell, CellMask, Column, Coord, FREE_CELL, GridError, Shape};

// Session, engine & patterns ------------------------------------------------------------------

pub use bingo_core::{
    BingoError, BingoResult,
    // Game lifecycle
    GameState, SessionConfig, SessionController, SharedSession, WinPolicy,
    // Matching
    CalledSet, MatchEngine, Verdict, WinDetail,
    // Patterns
    Pattern, PatternLibrary, PhaseTrigger, Transform,
    // Audit trail
    CallRecord, GameSummary, WinRecord,
};

// When new crates expose stable public APIs, add re-exports here in a backwards-compatible
// manner.
