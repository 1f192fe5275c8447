//! Grid transforms used by moving patterns
//!
//! Every transform is a permutation of the 25 grid cells, so applying it to a
//! non-empty shape always yields a non-empty shape, and repeated application
//! is periodic. The period is the order of the permutation: the least common
//! multiple of its cycle lengths.
//!
//! ```text
//! Shift { rows: 0, cols: 1 }        Rotate { quarter_turns: 1 }
//!
//!  X . . . .      . X . . .          X X X X X      . . . . X
//!  X . . . .  ->  . X . . .          . . . . .  ->  . . . . X
//!  X . . . .      . X . . .          . . . . .      . . . . X
//! ```

use bingo_types::{CELL_COUNT, Coord, GRID_SIZE, Shape};
use serde::{Deserialize, Serialize};

/// Mirror axis for [`Transform::Reflect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Flip top to bottom
    Horizontal,
    /// Flip left to right
    Vertical,
    /// Transpose across the top-left to bottom-right diagonal
    MainDiagonal,
    /// Transpose across the top-right to bottom-left diagonal
    AntiDiagonal,
}

/// A cell permutation applied once per phase step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Translate with wraparound; positive `rows` moves down, positive `cols` moves right
    Shift { rows: i8, cols: i8 },
    /// Rotate clockwise about the free cell
    Rotate { quarter_turns: u8 },
    /// Mirror across an axis through the free cell
    Reflect { axis: Axis },
}

impl Transform {
    /// Move every cell by `rows` down and `cols` right, wrapping at the edges
    pub fn shift(rows: i8, cols: i8) -> Self {
        Transform::Shift { rows, cols }
    }

    /// Turn clockwise about the free cell
    pub fn rotate(quarter_turns: u8) -> Self {
        Transform::Rotate { quarter_turns }
    }

    /// Mirror across `axis`
    pub fn reflect(axis: Axis) -> Self {
        Transform::Reflect { axis }
    }

    /// Image of a single cell
    pub fn apply(self, coord: Coord) -> Coord {
        let last = GRID_SIZE as isize - 1;
        let (row, col) = (coord.row() as isize, coord.col() as isize);

        match self {
            Transform::Shift { rows, cols } => {
                Coord::wrapping(row + isize::from(rows), col + isize::from(cols))
            }
            Transform::Rotate { quarter_turns } => {
                let (mut r, mut c) = (row, col);
                for _ in 0..quarter_turns % 4 {
                    (r, c) = (c, last - r);
                }
                Coord::wrapping(r, c)
            }
            Transform::Reflect { axis } => match axis {
                Axis::Horizontal => Coord::wrapping(last - row, col),
                Axis::Vertical => Coord::wrapping(row, last - col),
                Axis::MainDiagonal => Coord::wrapping(col, row),
                Axis::AntiDiagonal => Coord::wrapping(last - col, last - row),
            },
        }
    }

    /// Image of a shape
    pub fn apply_shape(self, shape: Shape) -> Shape {
        shape.map(|coord| self.apply(coord))
    }

    /// Smallest `p > 0` such that applying the transform `p` times is the identity
    pub fn period(self) -> u64 {
        Coord::all().map(|start| self.cycle_length(start)).fold(1, lcm)
    }

    fn cycle_length(self, start: Coord) -> u64 {
        let mut length = 1;
        let mut current = self.apply(start);
        while current != start && length <= CELL_COUNT as u64 {
            current = self.apply(current);
            length += 1;
        }
        length
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}
