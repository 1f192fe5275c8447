use crate::error::GridError;
use crate::types::{CellMask, Column, Coord, FREE_CELL, GRID_SIZE, MAX_NUMBER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an issued card (the card's serial number)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Create a card identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// The centre cell, always marked
    Free,
    /// A callable number
    Number(u8),
}

/// An immutable, validated 5×5 player card.
///
/// Cards are created once at issuance and only read afterwards. Every non-free
/// cell holds a number from its column's range, numbers are distinct, and the
/// centre cell is free. Serialized form is `{"id": .., "numbers": [[..]; 5]}`
/// with `null` in the free cell; loading re-runs validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardRecord", into = "CardRecord")]
pub struct Card {
    id: CardId,
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
    /// Grid position of each number, indexed by number
    positions: Vec<Option<Coord>>,
}

impl Card {
    /// Validate a grid of numbers (with `None` in the free cell) into a card
    pub fn new(id: impl Into<CardId>, numbers: &[Vec<Option<u8>>]) -> Result<Self, GridError> {
        if numbers.len() != GRID_SIZE || numbers.iter().any(|row| row.len() != GRID_SIZE) {
            return Err(GridError::Dimensions {
                rows: numbers.len(),
                row_lengths: numbers.iter().map(Vec::len).collect(),
            });
        }

        let mut cells = [[Cell::Free; GRID_SIZE]; GRID_SIZE];
        let mut positions = vec![None; usize::from(MAX_NUMBER) + 1];

        for coord in Coord::all() {
            let value = numbers[coord.row()][coord.col()];
            match (coord.is_free(), value) {
                (true, None) => {}
                (true, Some(number)) => return Err(GridError::FreeCellOccupied { number }),
                (false, None) => {
                    return Err(GridError::MissingNumber { row: coord.row(), col: coord.col() });
                }
                (false, Some(number)) => {
                    let column = Column::ALL[coord.col()];
                    if !column.accepts(number) {
                        let (min, max) = column.range();
                        return Err(GridError::OutOfColumnRange {
                            number,
                            column: column.letter(),
                            min,
                            max,
                        });
                    }
                    let slot = &mut positions[usize::from(number)];
                    if slot.is_some() {
                        return Err(GridError::DuplicateNumber { number });
                    }
                    *slot = Some(coord);
                    cells[coord.row()][coord.col()] = Cell::Number(number);
                }
            }
        }

        Ok(Self { id: id.into(), cells, positions })
    }

    /// Card identifier
    pub fn id(&self) -> &CardId {
        &self.id
    }

    /// Content of the cell at `coord`
    pub fn cell(&self, coord: Coord) -> Cell {
        self.cells[coord.row()][coord.col()]
    }

    /// Grid position of `number`, if the card carries it
    pub fn position_of(&self, number: u8) -> Option<Coord> {
        self.positions.get(usize::from(number)).copied().flatten()
    }

    /// Every `(coord, number)` pair on the card in row-major order, free cell excluded
    pub fn numbers(&self) -> impl Iterator<Item = (Coord, u8)> + '_ {
        Coord::all().filter_map(|coord| match self.cell(coord) {
            Cell::Number(number) => Some((coord, number)),
            Cell::Free => None,
        })
    }

    /// Cells marked when exactly the numbers accepted by `is_called` have been called.
    ///
    /// The free cell is always included.
    pub fn marked_by(&self, is_called: impl Fn(u8) -> bool) -> CellMask {
        let mut marked = CellMask::single(FREE_CELL);
        for (coord, number) in self.numbers() {
            if is_called(number) {
                marked.insert(coord);
            }
        }
        marked
    }

    /// Grid in its `None`-for-free serialized form
    pub fn to_rows(&self) -> Vec<Vec<Option<u8>>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Number(number) => Some(*number),
                        Cell::Free => None,
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = Column::ALL.iter().map(|c| format!("{:>2}", c.letter())).collect();
        writeln!(f, "{}", header.join(" "))?;
        writeln!(f, "{}", "-".repeat(14))?;
        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Number(number) => format!("{number:>2}"),
                    Cell::Free => "FR".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Unvalidated wire form of a card: row-major numbers with `null` in the free cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    /// Card identifier
    pub id: CardId,
    /// Five rows of five cells
    pub numbers: Vec<Vec<Option<u8>>>,
}

impl TryFrom<CardRecord> for Card {
    type Error = GridError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        Self::new(record.id, &record.numbers)
    }
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        Self { numbers: card.to_rows(), id: card.id }
    }
}
