//! Match engine: marked cells and verdicts
//!
//! Evaluation is a pure function of `(card, called set, pattern, phase)`. It
//! reads no clock and draws no randomness, so any verdict can be recomputed
//! offline from the call log alone (see [`crate::audit`]).
//!
//! Marked cells and shapes are both 25-bit masks, so checking a shape is a
//! single `marked & shape == shape`.

use crate::called::CalledSet;
use crate::pattern::Pattern;
use crate::types::{CallIndex, Phase, Progress, ShapeMatch, Verdict, WinDetail};
use ahash::AHashMap;
use bingo_types::{Card, CardId, Cell, CellMask, Shape};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Read access to registered cards by id
pub trait CardLookup {
    fn lookup(&self, card_id: &CardId) -> Option<&Card>;
}

impl CardLookup for AHashMap<CardId, Card> {
    fn lookup(&self, card_id: &CardId) -> Option<&Card> {
        self.get(card_id)
    }
}

impl CardLookup for HashMap<CardId, Card> {
    fn lookup(&self, card_id: &CardId) -> Option<&Card> {
        self.get(card_id)
    }
}

impl CardLookup for [Card] {
    fn lookup(&self, card_id: &CardId) -> Option<&Card> {
        self.iter().find(|card| card.id() == card_id)
    }
}

/// Stateless evaluator of cards against patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEngine {
    /// List every satisfied shape on a win, not only the canonical one
    report_all_satisfied: bool,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self { report_all_satisfied: true }
    }
}

impl MatchEngine {
    /// Engine that optionally lists every satisfied shape in a win
    pub fn new(report_all_satisfied: bool) -> Self {
        Self { report_all_satisfied }
    }

    pub fn reports_all_satisfied(&self) -> bool {
        self.report_all_satisfied
    }

    /// Cells whose number has been called, plus the free cell
    pub fn marked_cells(card: &Card, called: &CalledSet) -> CellMask {
        card.marked_by(|number| called.contains(number))
    }

    /// Evaluate a card against the pattern's shape set at `phase`.
    ///
    /// Shapes are checked in declaration order and the first satisfied one is
    /// the canonical match.
    pub fn evaluate(
        &self,
        card: &Card,
        called: &CalledSet,
        pattern: &Pattern,
        phase: Phase,
    ) -> Verdict {
        let marked = Self::marked_cells(card, called);
        let shapes = pattern.shapes_at(phase);

        let mut satisfied = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| marked.is_superset(shape.mask()))
            .map(|(shape_index, shape)| ShapeMatch {
                shape_index,
                shape: *shape,
                completed_at: Self::completion(card, called, *shape),
            });

        let Some(matched) = satisfied.next() else {
            return Verdict::NotYet(Self::progress(card, marked, shapes, phase));
        };

        let satisfied = if self.report_all_satisfied {
            std::iter::once(matched.clone()).chain(satisfied).collect()
        } else {
            vec![matched.clone()]
        };

        Verdict::Win(WinDetail { card_id: card.id().clone(), phase, matched, satisfied })
    }

    /// Evaluate a claimed card id; an id not in `cards` yields [`Verdict::InvalidCard`]
    #[instrument(level = "debug", skip(self, cards, called, pattern), fields(pattern = pattern.name()))]
    pub fn evaluate_claim<L: CardLookup + ?Sized>(
        &self,
        cards: &L,
        card_id: &CardId,
        called: &CalledSet,
        pattern: &Pattern,
        phase: Phase,
    ) -> Verdict {
        let Some(card) = cards.lookup(card_id) else {
            debug!("Claim for unregistered card");
            return Verdict::InvalidCard { card_id: card_id.clone() };
        };

        let verdict = self.evaluate(card, called, pattern, phase);
        debug!(win = verdict.is_win(), calls = called.len(), "Claim evaluated");
        verdict
    }

    /// Every winning card, ordered by completing call then card id
    pub fn scan<'a>(
        &self,
        cards: impl IntoIterator<Item = &'a Card>,
        called: &CalledSet,
        pattern: &Pattern,
        phase: Phase,
    ) -> Vec<WinDetail> {
        let mut winners: Vec<WinDetail> = cards
            .into_iter()
            .filter_map(|card| match self.evaluate(card, called, pattern, phase) {
                Verdict::Win(detail) => Some(detail),
                _ => None,
            })
            .collect();

        winners.sort_by(|a, b| {
            a.matched
                .completed_at
                .cmp(&b.matched.completed_at)
                .then_with(|| a.card_id.cmp(&b.card_id))
        });
        winners
    }

    /// Call index of the last number the shape needed; `None` if only the free cell was required
    fn completion(card: &Card, called: &CalledSet, shape: Shape) -> Option<CallIndex> {
        shape
            .cells()
            .filter_map(|coord| match card.cell(coord) {
                Cell::Number(number) => called.position_of(number),
                Cell::Free => None,
            })
            .max()
    }

    fn progress(card: &Card, marked: CellMask, shapes: &[Shape], phase: Phase) -> Progress {
        // min_by_key keeps the first of equal minima, preserving declaration order
        let (closest_shape, missing) = shapes
            .iter()
            .map(|shape| shape.mask().difference(marked).len())
            .enumerate()
            .min_by_key(|&(_, missing)| missing)
            .unwrap_or((0, 0));

        Progress { card_id: card.id().clone(), phase, closest_shape, missing }
    }
}
