//! Card issuance helpers
//!
//! Cards are normally issued and stored by an external system; these helpers
//! generate valid random cards for demos, tests and benchmarks.

use crate::error::{BingoError, BingoResult};
use bingo_types::{Card, CardId, Column, Coord, GRID_SIZE};
use rand::Rng;
use rand::seq::SliceRandom;

/// Generate a card with five distinct numbers drawn from each column's range
pub fn generate_card<R: Rng + ?Sized>(id: impl Into<CardId>, rng: &mut R) -> BingoResult<Card> {
    let id = id.into();
    let mut rows = vec![vec![None; GRID_SIZE]; GRID_SIZE];

    for column in Column::ALL {
        let (min, max) = column.range();
        let mut pool: Vec<u8> = (min..=max).collect();
        pool.shuffle(rng);

        for (row, number) in pool.into_iter().take(GRID_SIZE).enumerate() {
            let free = Coord::new(row, column.index()).is_ok_and(Coord::is_free);
            if !free {
                rows[row][column.index()] = Some(number);
            }
        }
    }

    Card::new(id.clone(), &rows).map_err(|source| BingoError::invalid_card_grid(id, source))
}

/// Generate `count` cards with ids `{prefix}-0001`, `{prefix}-0002`, …
pub fn generate_deck<R: Rng + ?Sized>(
    prefix: &str,
    count: usize,
    rng: &mut R,
) -> BingoResult<Vec<Card>> {
    (1..=count).map(|serial| generate_card(format!("{prefix}-{serial:04}"), rng)).collect()
}
