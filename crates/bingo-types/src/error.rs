use thiserror::Error;

/// Construction-time validation failures for coordinates, shapes and cards
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A coordinate lies outside the 5×5 grid
    #[error("coordinate ({row}, {col}) is outside the 5x5 grid")]
    OutOfBounds {
        /// Offending row
        row: usize,
        /// Offending column
        col: usize,
    },

    /// A shape was built from zero cells
    #[error("shape must contain at least one cell")]
    EmptyShape,

    /// A grid did not have exactly five rows of five cells
    #[error("grid must be 5x5, found {rows} rows with row lengths {row_lengths:?}")]
    Dimensions {
        /// Number of rows supplied
        rows: usize,
        /// Length of each supplied row
        row_lengths: Vec<usize>,
    },

    /// The free cell carried a number
    #[error("free cell (2, 2) must be empty, found {number}")]
    FreeCellOccupied {
        /// Number found in the free cell
        number: u8,
    },

    /// A non-free cell was left empty
    #[error("cell ({row}, {col}) has no number")]
    MissingNumber {
        /// Row of the empty cell
        row: usize,
        /// Column of the empty cell
        col: usize,
    },

    /// A number does not belong to the column it was placed in
    #[error("number {number} is outside column {column} range {min}-{max}")]
    OutOfColumnRange {
        /// Offending number
        number: u8,
        /// Column letter
        column: char,
        /// Lowest number allowed in the column
        min: u8,
        /// Highest number allowed in the column
        max: u8,
    },

    /// A number appears more than once on the same card
    #[error("number {number} appears more than once")]
    DuplicateNumber {
        /// Repeated number
        number: u8,
    },
}
