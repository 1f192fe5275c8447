//! Shared fixtures for unit tests, integration tests and benchmarks

use crate::cards::generate_deck;
use crate::config::SessionConfig;
use crate::pattern::Pattern;
use crate::session::SessionController;
use bingo_types::{Card, Shape};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Card whose top row is `5 20 35 50 65`; the rest of each column counts up from there
pub fn scenario_card(id: &str) -> Card {
    let rows: Vec<Vec<Option<u8>>> = (0..5u8)
        .map(|row| {
            (0..5u8)
                .map(|col| (row != 2 || col != 2).then_some(col * 15 + 5 + row))
                .collect()
        })
        .collect();
    Card::new(id, &rows).expect("scenario card is valid")
}

pub fn top_row_pattern() -> Pattern {
    let row = Shape::from_cells(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]).expect("top row");
    Pattern::fixed("top_row", vec![row]).expect("top row pattern")
}

/// Session with a fixed draw seed and default policies
pub fn seeded_session(pattern: Pattern, seed: u64) -> SessionController {
    SessionController::new(SessionConfig::default().with_seed(seed), Arc::new(pattern))
}

/// Deterministic deck of random cards
pub fn deck(count: usize, seed: u64) -> Vec<Card> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_deck("CARD", count, &mut rng).expect("generated cards are valid")
}
