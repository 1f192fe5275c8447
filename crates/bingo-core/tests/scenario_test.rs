use bingo_core::test_utils::{scenario_card, seeded_session, top_row_pattern};
use bingo_core::{BingoError, CalledSet, DrawSequencer, GameState, MatchEngine, Verdict};
use bingo_types::CardId;

#[test]
fn top_row_needs_every_number() {
    let engine = MatchEngine::default();
    let card = scenario_card("A");
    let pattern = top_row_pattern();

    let called = CalledSet::from_sequence([5, 20, 35, 50]).unwrap();
    assert!(matches!(engine.evaluate(&card, &called, &pattern, 0), Verdict::NotYet(_)));

    let called = CalledSet::from_sequence([5, 20, 35, 50, 65]).unwrap();
    let verdict = engine.evaluate(&card, &called, &pattern, 0);
    let detail = verdict.win().expect("top row is complete");
    assert_eq!(detail.matched.shape, pattern.base()[0]);
    assert_eq!(
        detail.matched.shape.cells().map(Into::into).collect::<Vec<(usize, usize)>>(),
        vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]
    );
}

#[test]
fn unknown_card_is_invalid_and_changes_nothing() {
    let session = seeded_session(top_row_pattern(), 1);
    session.register_card(scenario_card("A")).unwrap();
    session.start_game().unwrap();
    session.call_next().unwrap();

    let before = session.called_numbers();
    let verdict = session.verify(&CardId::from("ZZZ")).unwrap();

    assert_eq!(verdict, Verdict::InvalidCard { card_id: CardId::from("ZZZ") });
    assert!(!verdict.is_win());
    assert!(matches!(session.verify(&CardId::from("A")).unwrap(), Verdict::NotYet(_)));
    assert_eq!(session.game_state(), GameState::InProgress);
    assert_eq!(session.called_numbers(), before);
    assert!(session.winners().is_empty());
    assert_eq!(session.stats().invalid_card_claims, 1);
}

#[test]
fn unknown_card_is_invalid_even_before_a_game() {
    let session = seeded_session(top_row_pattern(), 1);
    let verdict = session.verify(&CardId::from("ZZZ")).unwrap();
    assert!(matches!(verdict, Verdict::InvalidCard { .. }));
    assert_eq!(session.game_state(), GameState::NotStarted);
}

#[test]
fn full_draw_then_exhausted() {
    let mut sequencer = DrawSequencer::from_seed(2024);
    sequencer.reset();

    let mut drawn: Vec<u8> = (0..75).map(|_| sequencer.draw_next().unwrap()).collect();
    assert_eq!(sequencer.draw_next().unwrap_err(), BingoError::Exhausted { called: 75 });

    drawn.sort_unstable();
    assert_eq!(drawn, (1..=75).collect::<Vec<_>>());
}

#[test]
fn session_reports_exhaustion_and_ends_without_winner() {
    let session = seeded_session(top_row_pattern(), 5);
    session.start_game().unwrap();
    for _ in 0..75 {
        session.call_next().unwrap();
    }
    assert_eq!(session.call_next().unwrap_err(), BingoError::Exhausted { called: 75 });
    assert_eq!(session.game_state(), GameState::InProgress);

    let summary = session.end_game().unwrap();
    assert_eq!(summary.outcome, bingo_core::GameOutcome::Exhausted);
    assert_eq!(summary.calls.len(), 75);
    assert_eq!(session.game_state(), GameState::NotStarted);
}
