//! Draw sequencer: random 1-75 draws without replacement
//!
//! The sequencer owns the game's [`CalledSet`]; every successful draw (random
//! or operator-entered) appends to it. The random source is injected so tests
//! and replays can run from a fixed seed.

use crate::called::CalledSet;
use crate::error::{BingoError, BingoResult};
use crate::types::CallIndex;
use bingo_types::MAX_NUMBER;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Produces a non-repeating sequence of numbers 1-75
#[derive(Debug, Clone)]
pub struct DrawSequencer<R = ChaCha8Rng> {
    rng: R,
    /// Numbers still in the pouch, unordered
    remaining: Vec<u8>,
    called: CalledSet,
}

impl DrawSequencer<ChaCha8Rng> {
    /// Sequencer with a reproducible stream
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Sequencer seeded from operating-system entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> DrawSequencer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, remaining: (1..=MAX_NUMBER).collect(), called: CalledSet::new() }
    }

    /// Draw the next number uniformly among those not yet called
    pub fn draw_next(&mut self) -> BingoResult<u8> {
        if self.remaining.is_empty() {
            warn!(called = self.called.len(), "Draw requested with no numbers remaining");
            return Err(BingoError::Exhausted { called: self.called.len() });
        }

        let slot = self.rng.gen_range(0..self.remaining.len());
        let number = self.remaining.swap_remove(slot);
        let call_index = self.called.push(number)?;

        debug!(number, call_index, remaining = self.remaining.len(), "Number drawn");
        Ok(number)
    }

    /// Record a number chosen outside the sequencer (a physical ball read by the operator)
    pub fn call(&mut self, number: u8) -> BingoResult<CallIndex> {
        let call_index = self.called.push(number)?;
        if let Some(slot) = self.remaining.iter().position(|&n| n == number) {
            self.remaining.swap_remove(slot);
        }

        debug!(number, call_index, remaining = self.remaining.len(), "Number called manually");
        Ok(call_index)
    }

    /// Clear called state for a new game; the random stream continues
    pub fn reset(&mut self) {
        self.remaining = (1..=MAX_NUMBER).collect();
        self.called.clear();
    }

    pub fn called(&self) -> &CalledSet {
        &self.called
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_draw_is_a_permutation() {
        let mut sequencer = DrawSequencer::from_seed(7);
        let mut drawn: Vec<u8> = (0..75).map(|_| sequencer.draw_next().unwrap()).collect();

        assert_eq!(sequencer.draw_next(), Err(BingoError::Exhausted { called: 75 }));
        assert!(sequencer.is_exhausted());

        assert_eq!(sequencer.called().numbers(), drawn.as_slice());
        drawn.sort_unstable();
        assert_eq!(drawn, (1..=75).collect::<Vec<u8>>());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = DrawSequencer::from_seed(42);
        let mut b = DrawSequencer::from_seed(42);
        for _ in 0..30 {
            assert_eq!(a.draw_next().unwrap(), b.draw_next().unwrap());
        }
    }

    #[test]
    fn test_reset_restores_full_pouch() {
        let mut sequencer = DrawSequencer::from_seed(1);
        for _ in 0..10 {
            sequencer.draw_next().unwrap();
        }
        sequencer.reset();
        assert_eq!(sequencer.remaining_count(), 75);
        assert!(sequencer.called().is_empty());
    }

    #[test]
    fn test_manual_call_removes_from_pouch() {
        let mut sequencer = DrawSequencer::from_seed(3);
        assert_eq!(sequencer.call(33).unwrap(), 1);
        assert_eq!(sequencer.remaining_count(), 74);
        assert_eq!(
            sequencer.call(33),
            Err(BingoError::NumberAlreadyCalled { number: 33, call_index: 1 })
        );

        for _ in 0..74 {
            assert_ne!(sequencer.draw_next().unwrap(), 33);
        }
        assert!(sequencer.draw_next().is_err());
    }
}
