use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of a card grid
pub const GRID_SIZE: usize = 5;

/// Number of cells on a card grid
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Highest number that can be called in a 75-ball game
pub const MAX_NUMBER: u8 = 75;

/// Count of numbers belonging to each column
pub const NUMBERS_PER_COLUMN: u8 = 15;

/// The centre cell, which is always marked
pub const FREE_CELL: Coord = Coord { row: 2, col: 2 };

/// A validated (row, col) position on the 5×5 grid, both 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    /// Create a coordinate, failing when it lies outside the grid
    pub fn new(row: usize, col: usize) -> Result<Self, GridError> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return Err(GridError::OutOfBounds { row, col });
        }
        // Both values are below GRID_SIZE so the narrowing is lossless
        Ok(Self { row: row as u8, col: col as u8 })
    }

    /// Coordinate for a row-major cell index in `0..CELL_COUNT`
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= CELL_COUNT {
            return None;
        }
        Some(Self { row: (index / GRID_SIZE) as u8, col: (index % GRID_SIZE) as u8 })
    }

    /// Coordinate with both components wrapped onto the grid (torus arithmetic)
    pub fn wrapping(row: isize, col: isize) -> Self {
        let size = GRID_SIZE as isize;
        Self { row: row.rem_euclid(size) as u8, col: col.rem_euclid(size) as u8 }
    }

    /// Row, 0-indexed from the top
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Column, 0-indexed from the left (B = 0 … O = 4)
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Row-major cell index in `0..CELL_COUNT`
    pub fn index(self) -> usize {
        self.row() * GRID_SIZE + self.col()
    }

    /// Whether this is the free centre cell
    pub fn is_free(self) -> bool {
        self == FREE_CELL
    }

    /// Every coordinate on the grid in row-major order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..CELL_COUNT).filter_map(Self::from_index)
    }
}

impl TryFrom<(usize, usize)> for Coord {
    type Error = GridError;

    fn try_from((row, col): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(row, col)
    }
}

impl From<Coord> for (usize, usize) {
    fn from(coord: Coord) -> Self {
        (coord.row(), coord.col())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A set of grid cells stored as a 25-bit mask (bit `i` = row-major index `i`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellMask(u32);

impl CellMask {
    /// The mask with no cells
    pub const EMPTY: Self = Self(0);

    /// The mask with every cell
    pub const FULL: Self = Self((1 << CELL_COUNT) - 1);

    /// Build a mask from raw bits, rejecting bits beyond the grid
    pub fn from_bits(bits: u32) -> Option<Self> {
        (bits & !Self::FULL.0 == 0).then_some(Self(bits))
    }

    /// Raw bit representation
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Mask holding a single cell
    pub fn single(coord: Coord) -> Self {
        Self(1 << coord.index())
    }

    /// Add a cell to the mask
    pub fn insert(&mut self, coord: Coord) {
        self.0 |= 1 << coord.index();
    }

    /// Whether the mask holds `coord`
    pub fn contains(self, coord: Coord) -> bool {
        self.0 & (1 << coord.index()) != 0
    }

    /// Whether every cell of `other` is also in `self`
    pub fn is_superset(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Cells in `self` that are not in `other`
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Cells in either mask
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of cells in the mask
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the mask holds no cells
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Cells in row-major order
    pub fn iter(self) -> impl Iterator<Item = Coord> {
        Coord::all().filter(move |coord| self.contains(*coord))
    }

    /// Image of the mask under a cell mapping
    pub fn map(self, f: impl Fn(Coord) -> Coord) -> Self {
        self.iter().fold(Self::EMPTY, |mut acc, coord| {
            acc.insert(f(coord));
            acc
        })
    }
}

impl FromIterator<Coord> for CellMask {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |mut acc, coord| {
            acc.insert(coord);
            acc
        })
    }
}

/// One winning configuration: a non-empty set of grid cells that must all be marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coord>", into = "Vec<Coord>")]
pub struct Shape(CellMask);

impl Shape {
    /// Build a shape from coordinates, failing when none are given
    pub fn new(coords: impl IntoIterator<Item = Coord>) -> Result<Self, GridError> {
        Self::from_mask(coords.into_iter().collect())
    }

    /// Build a shape from a cell mask, failing when the mask is empty
    pub fn from_mask(mask: CellMask) -> Result<Self, GridError> {
        if mask.is_empty() {
            return Err(GridError::EmptyShape);
        }
        Ok(Self(mask))
    }

    /// Build a shape from raw `(row, col)` pairs, validating every pair
    pub fn from_cells(cells: &[(usize, usize)]) -> Result<Self, GridError> {
        let coords =
            cells.iter().map(|&(row, col)| Coord::new(row, col)).collect::<Result<Vec<_>, _>>()?;
        Self::new(coords)
    }

    /// Build a shape from a 5×5 boolean grid where `true` marks a required cell
    pub fn from_grid(grid: &[Vec<bool>]) -> Result<Self, GridError> {
        if grid.len() != GRID_SIZE || grid.iter().any(|row| row.len() != GRID_SIZE) {
            return Err(GridError::Dimensions {
                rows: grid.len(),
                row_lengths: grid.iter().map(Vec::len).collect(),
            });
        }
        let mut mask = CellMask::EMPTY;
        for (row, cells) in grid.iter().enumerate() {
            for (col, &required) in cells.iter().enumerate() {
                if required {
                    mask.insert(Coord::new(row, col)?);
                }
            }
        }
        Self::from_mask(mask)
    }

    /// The cells of this shape as a mask
    pub fn mask(self) -> CellMask {
        self.0
    }

    /// Cells in row-major order
    pub fn cells(self) -> impl Iterator<Item = Coord> {
        self.0.iter()
    }

    /// Number of cells required by the shape
    pub fn len(self) -> usize {
        self.0.len()
    }

    /// Shapes are never empty; provided for API symmetry with collections
    pub fn is_empty(self) -> bool {
        false
    }

    /// Whether the shape requires `coord`
    pub fn contains(self, coord: Coord) -> bool {
        self.0.contains(coord)
    }

    /// Image of the shape under a cell mapping; never empty since the input is not
    pub fn map(self, f: impl Fn(Coord) -> Coord) -> Self {
        Self(self.0.map(f))
    }

    /// Boolean-grid form, the inverse of [`Shape::from_grid`]
    pub fn to_grid(self) -> Vec<Vec<bool>> {
        (0..GRID_SIZE)
            .map(|row| {
                (0..GRID_SIZE)
                    .map(|col| Coord::new(row, col).is_ok_and(|coord| self.contains(coord)))
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<Vec<Coord>> for Shape {
    type Error = GridError;

    fn try_from(coords: Vec<Coord>) -> Result<Self, Self::Error> {
        Self::new(coords)
    }
}

impl From<Shape> for Vec<Coord> {
    fn from(shape: Shape) -> Self {
        shape.cells().collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_grid() {
            let line: Vec<&str> = row.iter().map(|&on| if on { "X" } else { "." }).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// The five card columns and the numbers each may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Numbers 1-15
    B,
    /// Numbers 16-30
    I,
    /// Numbers 31-45
    N,
    /// Numbers 46-60
    G,
    /// Numbers 61-75
    O,
}

impl Column {
    /// All columns, left to right
    pub const ALL: [Self; GRID_SIZE] = [Self::B, Self::I, Self::N, Self::G, Self::O];

    /// Column at a 0-indexed grid position
    pub fn at(col: usize) -> Option<Self> {
        Self::ALL.get(col).copied()
    }

    /// Column a called number belongs to
    pub fn of(number: u8) -> Option<Self> {
        if !(1..=MAX_NUMBER).contains(&number) {
            return None;
        }
        Self::at(usize::from((number - 1) / NUMBERS_PER_COLUMN))
    }

    /// 0-indexed grid position
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inclusive `(min, max)` number range
    pub fn range(self) -> (u8, u8) {
        let min = self.index() as u8 * NUMBERS_PER_COLUMN + 1;
        (min, min + NUMBERS_PER_COLUMN - 1)
    }

    /// Whether `number` belongs in this column
    pub fn accepts(self, number: u8) -> bool {
        let (min, max) = self.range();
        (min..=max).contains(&number)
    }

    /// Header letter
    pub fn letter(self) -> char {
        match self {
            Self::B => 'B',
            Self::I => 'I',
            Self::N => 'N',
            Self::G => 'G',
            Self::O => 'O',
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Announcement label for a called number, e.g. `B-5` or `O-70`
pub fn ball_label(number: u8) -> Option<String> {
    Column::of(number).map(|column| format!("{column}-{number}"))
}
