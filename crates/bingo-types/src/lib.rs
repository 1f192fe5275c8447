//! Bingo Types
//!
//! This crate defines the value types shared across the Bingo ecosystem
//! (currently `bingo-core` and `bingo-api`): grid coordinates, cell masks,
//! win shapes, column ranges and the immutable 5×5 player card. It carries no
//! game logic so that storage and transport layers can depend on it without
//! pulling in the engine.

#![deny(missing_docs)]
#![deny(clippy::all)]

mod card;
mod error;
mod types;

pub use card::{Card, CardId, CardRecord, Cell};
pub use error::GridError;
pub use types::{
    CELL_COUNT, CellMask, Column, Coord, FREE_CELL, GRID_SIZE, MAX_NUMBER, NUMBERS_PER_COLUMN,
    Shape, ball_label,
};

// When new crates expose stable public APIs, add re-exports here in a backwards-compatible
// manner.
