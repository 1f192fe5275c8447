//! Session controller: one game at a time over a registered card set
//!
//! ```text
//! NotStarted --start_game--> InProgress --verified win--> Won
//!      ^                         |                         |
//!      +-------- end_game -------+------- end_game --------+
//! ```
//!
//! ## Concurrency
//!
//! All state sits behind a single [`RwLock`] per controller, so methods take
//! `&self` and a controller can be shared as an `Arc` (see [`SharedSession`]).
//! Calls, phase changes and game transitions take the write lock. `verify`
//! evaluates under the read lock, so concurrent verifications run in parallel
//! but never observe a half-applied call; the write lock is taken only to
//! record a win.
//!
//! ## Win policy
//!
//! Under [`WinPolicy::FreezeOnFirstWin`] the first verified win moves the game
//! to `Won` and further calls fail with `GameAlreadyWon`. Claims for other
//! cards are still verified against the frozen called set, so simultaneous
//! winners are found and recorded with their own completing call. Under
//! [`WinPolicy::KeepCalling`] wins are recorded and calling continues until the
//! operator ends the game.

use crate::called::CalledSet;
use crate::config::{SessionConfig, WinPolicy};
use crate::draw::DrawSequencer;
use crate::engine::MatchEngine;
use crate::error::{BingoError, BingoResult};
use crate::pattern::Pattern;
use crate::types::{
    CallIndex, CallRecord, GameOutcome, GameState, GameSummary, Phase, PhaseCause, PhaseChange,
    SessionStats, Verdict, WinDetail, WinRecord,
};
use ahash::AHashMap;
use bingo_types::{Card, CardId, Shape};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A session controller shared across threads
pub type SharedSession = Arc<SessionController>;

struct SessionInner<R> {
    state: GameState,
    game_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    sequencer: DrawSequencer<R>,
    pattern: Arc<Pattern>,
    phase: Phase,
    cards: AHashMap<CardId, Card>,
    call_log: Vec<CallRecord>,
    phase_changes: Vec<PhaseChange>,
    winners: Vec<WinRecord>,
}

impl<R: Rng> SessionInner<R> {
    fn calls_made(&self) -> CallIndex {
        self.sequencer.called().len() as CallIndex
    }

    /// State check shared by every call and phase operation
    fn ensure_calling(&self) -> BingoResult<()> {
        match self.state {
            GameState::InProgress => Ok(()),
            GameState::Won => Err(BingoError::GameAlreadyWon),
            state @ GameState::NotStarted => Err(BingoError::GameNotInProgress { state }),
        }
    }

    fn ensure_setup(&self, operation: &str) -> BingoResult<()> {
        if self.state == GameState::NotStarted {
            Ok(())
        } else {
            Err(BingoError::game_in_session(operation, self.state))
        }
    }

    fn advance_phase(&mut self, cause: PhaseCause) -> Phase {
        self.phase += 1;
        let at_call = self.calls_made();
        self.phase_changes.push(PhaseChange { at_call, phase: self.phase, cause });
        self.phase
    }
}

#[derive(Debug, Default)]
struct Counters {
    games_started: AtomicU64,
    calls_made: AtomicU64,
    verifications: AtomicU64,
    wins: AtomicU64,
    not_yet: AtomicU64,
    invalid_card_claims: AtomicU64,
    phase_advances: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SessionStats {
        SessionStats {
            games_started: self.games_started.load(Ordering::Relaxed),
            calls_made: self.calls_made.load(Ordering::Relaxed),
            verifications: self.verifications.load(Ordering::Relaxed),
            wins: self.wins.load(Ordering::Relaxed),
            not_yet: self.not_yet.load(Ordering::Relaxed),
            invalid_card_claims: self.invalid_card_claims.load(Ordering::Relaxed),
            phase_advances: self.phase_advances.load(Ordering::Relaxed),
        }
    }
}

/// Orchestrates the draw sequencer and match engine for one game at a time
pub struct SessionController<R = ChaCha8Rng> {
    config: SessionConfig,
    engine: MatchEngine,
    inner: RwLock<SessionInner<R>>,
    counters: Counters,
}

impl SessionController<ChaCha8Rng> {
    /// Controller drawing from the configured seed, or from entropy when none is set
    pub fn new(config: SessionConfig, pattern: Arc<Pattern>) -> Self {
        let sequencer = match config.seed {
            Some(seed) => DrawSequencer::from_seed(seed),
            None => DrawSequencer::from_entropy(),
        };
        Self::with_sequencer(config, pattern, sequencer)
    }
}

impl<R: Rng> SessionController<R> {
    /// Controller with an injected sequencer
    pub fn with_sequencer(
        config: SessionConfig,
        pattern: Arc<Pattern>,
        sequencer: DrawSequencer<R>,
    ) -> Self {
        info!(
            pattern = pattern.name(),
            win_policy = %config.win_policy,
            seeded = config.seed.is_some(),
            "Creating session controller"
        );

        Self {
            engine: MatchEngine::new(config.report_all_satisfied),
            config,
            inner: RwLock::new(SessionInner {
                state: GameState::NotStarted,
                game_id: None,
                started_at: None,
                sequencer,
                pattern,
                phase: 0,
                cards: AHashMap::new(),
                call_log: Vec::new(),
                phase_changes: Vec::new(),
                winners: Vec::new(),
            }),
            counters: Counters::default(),
        }
    }

    // A panic while holding the lock cannot leave the state half-written:
    // every mutation validates first and applies last.
    fn read(&self) -> RwLockReadGuard<'_, SessionInner<R>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner<R>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Register a card for the next game
    #[instrument(skip_all, fields(card_id = %card.id()))]
    pub fn register_card(&self, card: Card) -> BingoResult<()> {
        let mut inner = self.write();
        inner.ensure_setup("register cards")?;
        if inner.cards.contains_key(card.id()) {
            warn!("Duplicate card registration rejected");
            return Err(BingoError::DuplicateCard { card_id: card.id().clone() });
        }
        inner.cards.insert(card.id().clone(), card);
        Ok(())
    }

    /// Register several cards; none are registered if any id is a duplicate
    #[instrument(skip_all)]
    pub fn register_cards(&self, cards: impl IntoIterator<Item = Card>) -> BingoResult<usize> {
        let cards: Vec<Card> = cards.into_iter().collect();
        let mut inner = self.write();
        inner.ensure_setup("register cards")?;

        let mut seen = ahash::AHashSet::with_capacity(cards.len());
        for card in &cards {
            if inner.cards.contains_key(card.id()) || !seen.insert(card.id()) {
                warn!(card_id = %card.id(), "Duplicate card in batch, nothing registered");
                return Err(BingoError::DuplicateCard { card_id: card.id().clone() });
            }
        }

        let count = cards.len();
        inner.cards.extend(cards.into_iter().map(|card| (card.id().clone(), card)));
        info!(count, total = inner.cards.len(), "Cards registered");
        Ok(count)
    }

    /// Select the pattern for the next game
    #[instrument(skip_all, fields(pattern = pattern.name()))]
    pub fn set_pattern(&self, pattern: Arc<Pattern>) -> BingoResult<()> {
        let mut inner = self.write();
        inner.ensure_setup("change the pattern")?;
        inner.pattern = pattern;
        inner.phase = 0;
        info!("Active pattern changed");
        Ok(())
    }

    /// Start a new game from `NotStarted` or `Won`, clearing all per-game state
    #[instrument(skip(self))]
    pub fn start_game(&self) -> BingoResult<Uuid> {
        let mut inner = self.write();
        if inner.state == GameState::InProgress {
            return Err(BingoError::game_in_session("start a game", inner.state));
        }

        let game_id = Uuid::new_v4();
        inner.sequencer.reset();
        inner.call_log.clear();
        inner.phase_changes.clear();
        inner.winners.clear();
        inner.phase = 0;
        inner.game_id = Some(game_id);
        inner.started_at = Some(Utc::now());
        inner.state = GameState::InProgress;
        Counters::bump(&self.counters.games_started);

        info!(%game_id, pattern = inner.pattern.name(), cards = inner.cards.len(), "Game started");
        Ok(game_id)
    }

    /// Draw and record the next number
    #[instrument(skip(self))]
    pub fn call_next(&self) -> BingoResult<CallRecord> {
        let mut inner = self.write();
        inner.ensure_calling()?;
        let number = inner.sequencer.draw_next()?;
        Ok(self.record_call(&mut inner, number))
    }

    /// Record a number drawn outside the sequencer
    #[instrument(skip(self))]
    pub fn call_number(&self, number: u8) -> BingoResult<CallRecord> {
        let mut inner = self.write();
        inner.ensure_calling()?;
        inner.sequencer.call(number)?;
        Ok(self.record_call(&mut inner, number))
    }

    fn record_call(&self, inner: &mut SessionInner<R>, number: u8) -> CallRecord {
        let record = CallRecord { index: inner.calls_made(), number, called_at: Utc::now() };
        inner.call_log.push(record.clone());
        Counters::bump(&self.counters.calls_made);
        info!(call = record.index, ball = %record.label(), "Number called");

        let fires = inner
            .pattern
            .trigger()
            .is_some_and(|trigger| trigger.fires_at(record.index as usize));
        if self.config.auto_advance_phase && fires {
            let phase = inner.advance_phase(PhaseCause::CallCount);
            Counters::bump(&self.counters.phase_advances);
            info!(phase, at_call = record.index, "Pattern phase advanced by call count");
        }
        record
    }

    /// Move a moving pattern to its next phase
    #[instrument(skip(self))]
    pub fn advance_pattern_phase(&self) -> BingoResult<Phase> {
        let mut inner = self.write();
        inner.ensure_calling()?;
        if !inner.pattern.is_moving() {
            return Err(BingoError::NotAMovingPattern { pattern: inner.pattern.name().to_string() });
        }

        let phase = inner.advance_phase(PhaseCause::Operator);
        Counters::bump(&self.counters.phase_advances);
        info!(phase, "Pattern phase advanced by operator");
        Ok(phase)
    }

    /// Verify a claimed card against the current called set and phase.
    ///
    /// An unregistered id is an [`Verdict::InvalidCard`] verdict, not an error,
    /// and leaves the session untouched.
    #[instrument(skip(self), fields(card_id = %card_id))]
    pub fn verify(&self, card_id: &CardId) -> BingoResult<Verdict> {
        Counters::bump(&self.counters.verifications);

        let (verdict, game_id, calls, phase) = {
            let inner = self.read();
            if !inner.cards.contains_key(card_id) {
                Counters::bump(&self.counters.invalid_card_claims);
                warn!("Verification requested for unregistered card");
                return Ok(Verdict::InvalidCard { card_id: card_id.clone() });
            }
            if inner.state == GameState::NotStarted {
                return Err(BingoError::GameNotInProgress { state: inner.state });
            }
            let verdict = self.engine.evaluate_claim(
                &inner.cards,
                card_id,
                inner.sequencer.called(),
                &inner.pattern,
                inner.phase,
            );
            (verdict, inner.game_id, inner.calls_made(), inner.phase)
        };

        let verdict = match verdict {
            Verdict::Win(detail) => self.record_win(detail, game_id, calls, phase)?,
            other => other,
        };

        match &verdict {
            Verdict::Win(detail) => {
                Counters::bump(&self.counters.wins);
                info!(shape = detail.matched.shape_index, completed_at = ?detail.matched.completed_at, "Win verified");
            }
            Verdict::NotYet(progress) => {
                Counters::bump(&self.counters.not_yet);
                debug!(missing = progress.missing, "Claim not yet a win");
            }
            Verdict::InvalidCard { .. } => Counters::bump(&self.counters.invalid_card_claims),
        }
        Ok(verdict)
    }

    /// Record a win found under the read lock.
    ///
    /// A call, phase change or new game landing in between forces a
    /// re-evaluation; a game ended in between records nothing.
    fn record_win(
        &self,
        detail: WinDetail,
        game_id: Option<Uuid>,
        calls: CallIndex,
        phase: Phase,
    ) -> BingoResult<Verdict> {
        let mut guard = self.write();
        let inner = &mut *guard;

        if inner.state == GameState::NotStarted {
            return Err(BingoError::GameNotInProgress { state: inner.state });
        }

        let detail = if inner.game_id == game_id
            && inner.calls_made() == calls
            && inner.phase == phase
        {
            detail
        } else {
            debug!("Session changed during verification, re-evaluating");
            let card_id = detail.card_id;
            match self.engine.evaluate_claim(
                &inner.cards,
                &card_id,
                inner.sequencer.called(),
                &inner.pattern,
                inner.phase,
            ) {
                Verdict::Win(detail) => detail,
                other => return Ok(other),
            }
        };

        if !inner.winners.iter().any(|w| w.card_id == detail.card_id) {
            inner.winners.push(WinRecord {
                card_id: detail.card_id.clone(),
                call_index: inner.calls_made(),
                completed_at: detail.matched.completed_at,
                phase: detail.phase,
                shape_index: detail.matched.shape_index,
                shape: detail.matched.shape,
                recorded_at: Utc::now(),
            });
        }

        if self.config.win_policy == WinPolicy::FreezeOnFirstWin
            && inner.state == GameState::InProgress
        {
            inner.state = GameState::Won;
            info!(card_id = %detail.card_id, calls = inner.calls_made(), "Game won, calling frozen");
        }

        Ok(Verdict::Win(detail))
    }

    /// Every registered card that currently wins, ordered by completing call then id
    #[instrument(skip(self))]
    pub fn scan_winners(&self) -> BingoResult<Vec<WinDetail>> {
        let inner = self.read();
        if inner.state == GameState::NotStarted {
            return Err(BingoError::GameNotInProgress { state: inner.state });
        }
        let winners =
            self.engine.scan(inner.cards.values(), inner.sequencer.called(), &inner.pattern, inner.phase);
        debug!(winners = winners.len(), "Scanned registered cards");
        Ok(winners)
    }

    /// Close the current game and return its summary
    #[instrument(skip(self))]
    pub fn end_game(&self) -> BingoResult<GameSummary> {
        let mut inner = self.write();
        if inner.state == GameState::NotStarted {
            return Err(BingoError::GameNotInProgress { state: inner.state });
        }

        let outcome = if !inner.winners.is_empty() {
            GameOutcome::Won
        } else if inner.sequencer.is_exhausted() {
            GameOutcome::Exhausted
        } else {
            GameOutcome::Abandoned
        };

        let summary = GameSummary {
            game_id: inner.game_id.unwrap_or_else(Uuid::nil),
            pattern: inner.pattern.name().to_string(),
            outcome,
            calls: inner.call_log.clone(),
            phase_changes: inner.phase_changes.clone(),
            winners: inner.winners.clone(),
            winning_cards: inner
                .winners
                .iter()
                .filter_map(|winner| inner.cards.get(&winner.card_id).cloned())
                .collect(),
            started_at: inner.started_at,
            ended_at: Utc::now(),
        };
        inner.state = GameState::NotStarted;

        info!(game_id = %summary.game_id, ?outcome, calls = summary.calls.len(), winners = summary.winners.len(), "Game ended");
        Ok(summary)
    }

    pub fn game_state(&self) -> GameState {
        self.read().state
    }

    pub fn game_id(&self) -> Option<Uuid> {
        self.read().game_id
    }

    pub fn current_phase(&self) -> Phase {
        self.read().phase
    }

    /// Called numbers in call order
    pub fn called_numbers(&self) -> Vec<u8> {
        self.read().sequencer.called().numbers().to_vec()
    }

    pub fn called_set(&self) -> CalledSet {
        self.read().sequencer.called().clone()
    }

    pub fn remaining_count(&self) -> usize {
        self.read().sequencer.remaining_count()
    }

    pub fn call_log(&self) -> Vec<CallRecord> {
        self.read().call_log.clone()
    }

    pub fn phase_changes(&self) -> Vec<PhaseChange> {
        self.read().phase_changes.clone()
    }

    pub fn winners(&self) -> Vec<WinRecord> {
        self.read().winners.clone()
    }

    pub fn pattern(&self) -> Arc<Pattern> {
        Arc::clone(&self.read().pattern)
    }

    /// Shapes active at the current phase
    pub fn active_shapes(&self) -> Vec<Shape> {
        let inner = self.read();
        inner.pattern.shapes_at(inner.phase).to_vec()
    }

    pub fn card(&self, card_id: &CardId) -> Option<Card> {
        self.read().cards.get(card_id).cloned()
    }

    pub fn card_count(&self) -> usize {
        self.read().cards.len()
    }

    pub fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PhaseTrigger;
    use crate::test_utils::{scenario_card, seeded_session, top_row_pattern};
    use crate::transform::Transform;

    #[test]
    fn test_calls_require_game_in_progress() {
        let session = seeded_session(top_row_pattern(), 7);
        assert_eq!(
            session.call_next().unwrap_err(),
            BingoError::GameNotInProgress { state: GameState::NotStarted }
        );
        assert_eq!(session.game_state(), GameState::NotStarted);
    }

    #[test]
    fn test_registration_closed_during_game() {
        let session = seeded_session(top_row_pattern(), 7);
        session.register_card(scenario_card("A")).unwrap();
        assert!(matches!(
            session.register_card(scenario_card("A")),
            Err(BingoError::DuplicateCard { .. })
        ));

        session.start_game().unwrap();
        assert!(matches!(
            session.register_card(scenario_card("B")),
            Err(BingoError::GameInSession { .. })
        ));
        assert!(matches!(
            session.set_pattern(Arc::new(top_row_pattern())),
            Err(BingoError::GameInSession { .. })
        ));
        assert_eq!(session.card_count(), 1);
    }

    #[test]
    fn test_batch_registration_is_all_or_nothing() {
        let session = seeded_session(top_row_pattern(), 7);
        let result = session.register_cards(vec![scenario_card("A"), scenario_card("A")]);
        assert!(result.is_err());
        assert_eq!(session.card_count(), 0);
        assert_eq!(session.register_cards(vec![scenario_card("A"), scenario_card("B")]).unwrap(), 2);
    }

    #[test]
    fn test_static_pattern_cannot_advance() {
        let session = seeded_session(top_row_pattern(), 7);
        session.start_game().unwrap();
        assert!(matches!(
            session.advance_pattern_phase(),
            Err(BingoError::NotAMovingPattern { .. })
        ));
        assert_eq!(session.current_phase(), 0);
    }

    #[test]
    fn test_win_freezes_calling() {
        let session = seeded_session(top_row_pattern(), 7);
        session.register_card(scenario_card("A")).unwrap();
        session.start_game().unwrap();
        for number in [5, 20, 35, 50, 65] {
            session.call_number(number).unwrap();
        }

        assert!(session.verify(&CardId::from("A")).unwrap().is_win());
        assert_eq!(session.game_state(), GameState::Won);
        assert_eq!(session.call_next().unwrap_err(), BingoError::GameAlreadyWon);
        assert_eq!(session.winners().len(), 1);

        // Repeated claims do not duplicate the record
        session.verify(&CardId::from("A")).unwrap();
        assert_eq!(session.winners().len(), 1);
        assert_eq!(session.stats().wins, 2);
    }

    #[test]
    fn test_start_game_resets_calls() {
        let session = seeded_session(top_row_pattern(), 7);
        session.start_game().unwrap();
        session.call_next().unwrap();
        assert!(matches!(session.start_game(), Err(BingoError::GameInSession { .. })));

        let summary = session.end_game().unwrap();
        assert_eq!(summary.outcome, GameOutcome::Abandoned);
        assert_eq!(summary.calls.len(), 1);

        session.start_game().unwrap();
        assert!(session.called_numbers().is_empty());
        assert_eq!(session.stats().games_started, 2);
    }

    fn marching_row_session() -> SessionController {
        let top = Shape::from_cells(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let pattern =
            Pattern::stepped("marching_row", vec![top], Transform::shift(1, 0), PhaseTrigger::Manual)
                .unwrap();
        let session = seeded_session(pattern, 7);
        session.register_card(scenario_card("A")).unwrap();
        session.start_game().unwrap();
        for number in [5, 20, 35, 50, 65] {
            session.call_number(number).unwrap();
        }
        session
    }

    /// Win found under the read lock, with the snapshot `verify` would have taken
    fn pending_win(session: &SessionController) -> (WinDetail, Option<Uuid>, CallIndex, Phase) {
        let inner = session.read();
        let verdict = session.engine.evaluate_claim(
            &inner.cards,
            &CardId::from("A"),
            inner.sequencer.called(),
            &inner.pattern,
            inner.phase,
        );
        let Verdict::Win(detail) = verdict else { panic!("expected a win, got {verdict:?}") };
        (detail, inner.game_id, inner.calls_made(), inner.phase)
    }

    #[test]
    fn test_phase_change_before_recording_forces_reevaluation() {
        let session = marching_row_session();
        let (detail, game_id, calls, phase) = pending_win(&session);

        session.advance_pattern_phase().unwrap();
        let verdict = session.record_win(detail, game_id, calls, phase).unwrap();

        assert!(matches!(verdict, Verdict::NotYet(_)));
        assert!(session.winners().is_empty());
        assert_eq!(session.game_state(), GameState::InProgress);
    }

    #[test]
    fn test_game_ended_before_recording_records_nothing() {
        let session = marching_row_session();
        let (detail, game_id, calls, phase) = pending_win(&session);

        let summary = session.end_game().unwrap();
        assert_eq!(
            session.record_win(detail, game_id, calls, phase).unwrap_err(),
            BingoError::GameNotInProgress { state: GameState::NotStarted }
        );
        assert!(summary.winners.is_empty());
        assert!(session.winners().is_empty());
        assert_eq!(session.game_state(), GameState::NotStarted);
    }
}
