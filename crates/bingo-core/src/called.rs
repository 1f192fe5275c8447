//! Called-number state for a single game
//!
//! The set never shrinks within a game: numbers are appended one at a time by
//! the draw sequencer and only [`CalledSet::clear`] (a new game) empties it.

use crate::error::{BingoError, BingoResult};
use crate::types::CallIndex;
use bingo_types::MAX_NUMBER;

/// Numbers called so far, with their call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalledSet {
    order: Vec<u8>,
    /// Bit `n` set when number `n` has been called
    mask: u128,
}

impl Default for CalledSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CalledSet {
    pub fn new() -> Self {
        Self { order: Vec::with_capacity(usize::from(MAX_NUMBER)), mask: 0 }
    }

    /// Rebuild a called set from an ordered call sequence, validating every number
    pub fn from_sequence(numbers: impl IntoIterator<Item = u8>) -> BingoResult<Self> {
        let mut called = Self::new();
        for number in numbers {
            called.push(number)?;
        }
        Ok(called)
    }

    pub fn contains(&self, number: u8) -> bool {
        number <= MAX_NUMBER && self.mask & (1u128 << number) != 0
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether all 75 numbers have been called
    pub fn is_complete(&self) -> bool {
        self.order.len() == usize::from(MAX_NUMBER)
    }

    /// Numbers in call order
    pub fn numbers(&self) -> &[u8] {
        &self.order
    }

    pub fn last(&self) -> Option<u8> {
        self.order.last().copied()
    }

    /// 1-based call index at which `number` was called
    pub fn position_of(&self, number: u8) -> Option<CallIndex> {
        if !self.contains(number) {
            return None;
        }
        self.order.iter().position(|&n| n == number).map(|i| i as CallIndex + 1)
    }

    /// Numbers not called yet, ascending
    pub fn remaining(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=MAX_NUMBER).filter(|&n| !self.contains(n))
    }

    /// The state as it was after the first `calls` calls
    pub fn prefix(&self, calls: usize) -> Self {
        let order: Vec<u8> = self.order.iter().take(calls).copied().collect();
        let mask = order.iter().fold(0u128, |acc, &n| acc | (1u128 << n));
        Self { order, mask }
    }

    /// Whether every number called in `other` is also called here
    pub fn is_superset(&self, other: &CalledSet) -> bool {
        self.mask & other.mask == other.mask
    }

    /// Append a call, returning its 1-based index
    pub(crate) fn push(&mut self, number: u8) -> BingoResult<CallIndex> {
        if !(1..=MAX_NUMBER).contains(&number) {
            return Err(BingoError::InvalidNumber { number });
        }
        if let Some(call_index) = self.position_of(number) {
            return Err(BingoError::NumberAlreadyCalled { number, call_index });
        }
        self.order.push(number);
        self.mask |= 1u128 << number;
        Ok(self.order.len() as CallIndex)
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.mask = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_tracks_order_and_membership() {
        let mut called = CalledSet::new();
        assert_eq!(called.push(12).unwrap(), 1);
        assert_eq!(called.push(75).unwrap(), 2);

        assert!(called.contains(12));
        assert!(called.contains(75));
        assert!(!called.contains(1));
        assert_eq!(called.position_of(75), Some(2));
        assert_eq!(called.last(), Some(75));
        assert_eq!(called.remaining().count(), 73);
    }

    #[test]
    fn test_push_rejects_invalid_and_repeated_numbers() {
        let mut called = CalledSet::new();
        assert_eq!(called.push(0), Err(BingoError::InvalidNumber { number: 0 }));
        assert_eq!(called.push(76), Err(BingoError::InvalidNumber { number: 76 }));

        called.push(9).unwrap();
        assert_eq!(called.push(9), Err(BingoError::NumberAlreadyCalled { number: 9, call_index: 1 }));
        assert_eq!(called.len(), 1);
    }

    #[test]
    fn test_prefix_and_superset() {
        let called = CalledSet::from_sequence([3, 17, 44, 60]).unwrap();
        let early = called.prefix(2);

        assert_eq!(early.numbers(), &[3, 17]);
        assert!(!early.contains(44));
        assert!(called.is_superset(&early));
        assert!(!early.is_superset(&called));
    }

    #[test]
    fn test_clear_resets_state() {
        let mut called = CalledSet::from_sequence(1..=75).unwrap();
        assert!(called.is_complete());
        called.clear();
        assert!(called.is_empty());
        assert!(!called.contains(1));
    }

    #[test]
    fn test_contains_out_of_range_is_false() {
        let called = CalledSet::from_sequence([1]).unwrap();
        assert!(!called.contains(200));
    }
}
