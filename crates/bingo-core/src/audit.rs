//! Offline replay of verdicts from the call log
//!
//! A recorded win carries the call count and phase it was verified at. Since
//! evaluation is deterministic, rebuilding the called set from the first
//! `call_index` log entries and evaluating again must give the same shape and
//! the same completing call.

use crate::called::CalledSet;
use crate::engine::{CardLookup, MatchEngine};
use crate::error::{BingoError, BingoResult};
use crate::pattern::Pattern;
use crate::types::{CallIndex, CallRecord, GameSummary, Phase, PhaseChange, Verdict, WinRecord};
use bingo_types::CardId;
use tracing::{debug, warn};

/// Rebuild the called set after the first `upto` calls of a log
pub fn called_set_from_log(log: &[CallRecord], upto: CallIndex) -> BingoResult<CalledSet> {
    let mut called = CalledSet::new();
    for (position, record) in log.iter().take(upto as usize).enumerate() {
        let expected = position as CallIndex + 1;
        if record.index != expected {
            return Err(BingoError::serialization(
                "call_log",
                format!("entry {position} has index {} (expected {expected})", record.index),
            ));
        }
        called.push(record.number)?;
    }
    if called.len() < upto as usize {
        return Err(BingoError::serialization(
            "call_log",
            format!("log holds {} calls, replay asked for {upto}", called.len()),
        ));
    }
    Ok(called)
}

/// Phase in effect once `calls` calls had been made
pub fn phase_at(changes: &[PhaseChange], calls: CallIndex) -> Phase {
    changes.iter().take_while(|change| change.at_call <= calls).last().map_or(0, |change| change.phase)
}

/// Recompute a verdict for a card as of call `upto` at `phase`
pub fn replay_verdict<L: CardLookup + ?Sized>(
    engine: &MatchEngine,
    cards: &L,
    card_id: &CardId,
    log: &[CallRecord],
    pattern: &Pattern,
    phase: Phase,
    upto: CallIndex,
) -> BingoResult<Verdict> {
    let called = called_set_from_log(log, upto)?;
    Ok(engine.evaluate_claim(cards, card_id, &called, pattern, phase))
}

/// Whether a recorded win replays to the same shape and completing call
pub fn verify_record<L: CardLookup + ?Sized>(
    engine: &MatchEngine,
    cards: &L,
    log: &[CallRecord],
    pattern: &Pattern,
    record: &WinRecord,
) -> BingoResult<bool> {
    let verdict =
        replay_verdict(engine, cards, &record.card_id, log, pattern, record.phase, record.call_index)?;

    let confirmed = verdict.win().is_some_and(|detail| {
        detail.matched.shape == record.shape
            && detail.matched.shape_index == record.shape_index
            && detail.matched.completed_at == record.completed_at
    });
    if confirmed {
        debug!(card_id = %record.card_id, call_index = record.call_index, "Win record confirmed");
    } else {
        warn!(card_id = %record.card_id, call_index = record.call_index, %verdict, "Win record does not replay");
    }
    Ok(confirmed)
}

/// Replay every win in a game summary, returning the ids whose record did not replay
pub fn audit_summary<L: CardLookup + ?Sized>(
    engine: &MatchEngine,
    cards: &L,
    pattern: &Pattern,
    summary: &GameSummary,
) -> BingoResult<Vec<CardId>> {
    if pattern.name() != summary.pattern {
        return Err(BingoError::configuration(
            "pattern",
            format!("summary was played with '{}', not '{}'", summary.pattern, pattern.name()),
        ));
    }

    let mut failed = Vec::new();
    for record in &summary.winners {
        if !verify_record(engine, cards, &summary.calls, pattern, record)? {
            failed.push(record.card_id.clone());
        }
    }
    Ok(failed)
}
