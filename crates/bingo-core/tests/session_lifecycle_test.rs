use bingo_core::library::{PatternLibrary, names};
use bingo_core::test_utils::{deck, scenario_card, seeded_session, top_row_pattern};
use bingo_core::{
    BingoError, GameOutcome, GameState, PhaseCause, SessionConfig, SessionController, Verdict,
    WinPolicy,
};
use bingo_types::{Card, CardId};
use std::sync::Arc;

/// Same layout as the scenario card but starting each column at its lowest number
fn low_card(id: &str) -> Card {
    let rows: Vec<Vec<Option<u8>>> = (0..5u8)
        .map(|row| (0..5u8).map(|col| (row != 2 || col != 2).then_some(col * 15 + 1 + row)).collect())
        .collect();
    Card::new(id, &rows).unwrap()
}

fn builtin(name: &str) -> Arc<bingo_core::Pattern> {
    PatternLibrary::with_builtins().unwrap().get(name).unwrap()
}

#[test]
fn out_of_state_operations_are_rejected() {
    let session = seeded_session(top_row_pattern(), 3);

    assert!(matches!(session.call_next(), Err(BingoError::GameNotInProgress { .. })));
    assert!(matches!(session.call_number(10), Err(BingoError::GameNotInProgress { .. })));
    assert!(matches!(session.advance_pattern_phase(), Err(BingoError::GameNotInProgress { .. })));
    assert!(matches!(session.end_game(), Err(BingoError::GameNotInProgress { .. })));
    assert!(matches!(session.scan_winners(), Err(BingoError::GameNotInProgress { .. })));

    session.register_card(scenario_card("A")).unwrap();
    assert!(matches!(
        session.verify(&CardId::from("A")),
        Err(BingoError::GameNotInProgress { state: GameState::NotStarted })
    ));
    assert_eq!(session.game_state(), GameState::NotStarted);
    assert!(session.called_numbers().is_empty());
}

#[test]
fn manual_calls_are_validated() {
    let session = seeded_session(top_row_pattern(), 3);
    session.start_game().unwrap();

    assert_eq!(session.call_number(0).unwrap_err(), BingoError::InvalidNumber { number: 0 });
    assert_eq!(session.call_number(76).unwrap_err(), BingoError::InvalidNumber { number: 76 });

    let record = session.call_number(42).unwrap();
    assert_eq!(record.index, 1);
    assert_eq!(record.label(), "N-42");
    assert_eq!(
        session.call_number(42).unwrap_err(),
        BingoError::NumberAlreadyCalled { number: 42, call_index: 1 }
    );
    assert_eq!(session.called_numbers(), vec![42]);
    assert_eq!(session.remaining_count(), 74);
}

#[test]
fn frozen_game_still_verifies_simultaneous_winners() {
    let session = seeded_session(top_row_pattern(), 3);
    session.register_cards(vec![scenario_card("A"), low_card("C"), low_card("D")]).unwrap();
    session.start_game().unwrap();

    // C's top row completes at call 5, A's at call 10
    for number in [1, 16, 31, 46, 61, 5, 20, 35, 50, 65] {
        session.call_number(number).unwrap();
    }

    let first = session.verify(&CardId::from("A")).unwrap();
    assert_eq!(first.win().unwrap().matched.completed_at, Some(10));
    assert_eq!(session.game_state(), GameState::Won);
    assert_eq!(session.call_next().unwrap_err(), BingoError::GameAlreadyWon);
    assert_eq!(session.advance_pattern_phase().unwrap_err(), BingoError::GameAlreadyWon);

    let second = session.verify(&CardId::from("C")).unwrap();
    assert_eq!(second.win().unwrap().matched.completed_at, Some(5));

    let winners = session.winners();
    assert_eq!(winners.len(), 2);
    assert!(winners.iter().all(|w| w.call_index == 10));

    let scanned: Vec<String> =
        session.scan_winners().unwrap().into_iter().map(|w| w.card_id.to_string()).collect();
    assert_eq!(scanned, vec!["C", "D", "A"]);

    let summary = session.end_game().unwrap();
    assert_eq!(summary.outcome, GameOutcome::Won);
    assert_eq!(summary.winners.len(), 2);
    assert_eq!(session.game_state(), GameState::NotStarted);
}

#[test]
fn keep_calling_records_wins_without_freezing() {
    let config = SessionConfig::default().with_seed(8).with_win_policy(WinPolicy::KeepCalling);
    let session = SessionController::new(config, Arc::new(top_row_pattern()));
    session.register_card(scenario_card("A")).unwrap();
    session.start_game().unwrap();
    for number in [5, 20, 35, 50, 65] {
        session.call_number(number).unwrap();
    }

    assert!(session.verify(&CardId::from("A")).unwrap().is_win());
    assert_eq!(session.game_state(), GameState::InProgress);
    session.call_next().unwrap();
    assert_eq!(session.winners().len(), 1);
}

#[test]
fn new_game_after_win_starts_clean() {
    let session = seeded_session(top_row_pattern(), 3);
    session.register_card(scenario_card("A")).unwrap();
    let first_game = session.start_game().unwrap();
    for number in [5, 20, 35, 50, 65] {
        session.call_number(number).unwrap();
    }
    session.verify(&CardId::from("A")).unwrap();
    assert_eq!(session.game_state(), GameState::Won);

    let second_game = session.start_game().unwrap();
    assert_ne!(first_game, second_game);
    assert_eq!(session.game_state(), GameState::InProgress);
    assert!(session.winners().is_empty());
    assert!(session.called_numbers().is_empty());
    assert!(matches!(session.verify(&CardId::from("A")).unwrap(), Verdict::NotYet(_)));
}

#[test]
fn call_count_trigger_advances_phase() {
    let session = SessionController::new(
        SessionConfig::default().with_seed(4),
        builtin(names::SLIDING_ROW),
    );
    session.start_game().unwrap();
    for _ in 0..9 {
        session.call_next().unwrap();
    }
    assert_eq!(session.current_phase(), 0);

    session.call_next().unwrap();
    assert_eq!(session.current_phase(), 1);
    assert!(session.active_shapes()[0].cells().all(|c| c.row() == 1));

    let changes = session.phase_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].at_call, 10);
    assert_eq!(changes[0].cause, PhaseCause::CallCount);

    session.advance_pattern_phase().unwrap();
    assert_eq!(session.current_phase(), 2);
    assert_eq!(session.phase_changes()[1].cause, PhaseCause::Operator);
}

#[test]
fn call_count_trigger_can_be_disabled() {
    let mut config = SessionConfig::default().with_seed(4);
    config.auto_advance_phase = false;
    let session = SessionController::new(config, builtin(names::SLIDING_ROW));
    session.start_game().unwrap();
    for _ in 0..20 {
        session.call_next().unwrap();
    }
    assert_eq!(session.current_phase(), 0);
    assert!(session.phase_changes().is_empty());
}

#[test]
fn moving_pattern_win_depends_on_phase() {
    let session = seeded_session(builtin(names::TRAVELING_DIAGONAL).as_ref().clone(), 3);
    session.register_card(scenario_card("A")).unwrap();
    session.start_game().unwrap();

    // Main diagonal of the scenario card: 5, 21, free, 53, 69
    for number in [5, 21, 53, 69] {
        session.call_number(number).unwrap();
    }
    assert!(session.verify(&CardId::from("A")).unwrap().is_win());
    session.end_game().unwrap();

    session.start_game().unwrap();
    for number in [5, 21, 53, 69] {
        session.call_number(number).unwrap();
    }
    session.advance_pattern_phase().unwrap();
    let verdict = session.verify(&CardId::from("A")).unwrap();
    assert!(!verdict.is_win());
    assert_eq!(session.game_state(), GameState::InProgress);
}

#[test]
fn verifications_run_alongside_calls() {
    let session = Arc::new(seeded_session(top_row_pattern(), 17));
    let cards = deck(50, 17);
    let ids: Vec<CardId> = cards.iter().map(|c| c.id().clone()).collect();
    session.register_cards(cards).unwrap();
    session.start_game().unwrap();

    std::thread::scope(|scope| {
        for chunk in ids.chunks(10) {
            let session = Arc::clone(&session);
            scope.spawn(move || {
                for _ in 0..20 {
                    for id in chunk {
                        let verdict = session.verify(id).unwrap();
                        assert!(!matches!(verdict, Verdict::InvalidCard { .. }));
                    }
                }
            });
        }

        let caller = Arc::clone(&session);
        scope.spawn(move || {
            while caller.call_next().is_ok() {}
        });
    });

    // Either all 75 were called, or a win froze the game first
    let state = session.game_state();
    assert!(state == GameState::Won || session.called_numbers().len() == 75);
    let stats = session.stats();
    assert_eq!(stats.verifications, 50 * 20);
    assert_eq!(stats.wins + stats.not_yet, 50 * 20);
}
