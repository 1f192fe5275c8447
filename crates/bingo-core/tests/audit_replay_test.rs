use bingo_core::audit::{audit_summary, phase_at, replay_verdict, verify_record};
use bingo_core::library::{PatternLibrary, names};
use bingo_core::serialization::{summary_from_json, summary_to_json};
use bingo_core::test_utils::deck;
use bingo_core::{MatchEngine, SessionConfig, SessionController, Verdict};
use bingo_types::Card;

/// Play a seeded game to its first win, verifying every card after every call
fn play_to_first_win(pattern_name: &str, seed: u64) -> (SessionController, Vec<Card>) {
    let pattern = PatternLibrary::with_builtins().unwrap().get(pattern_name).unwrap();
    let session = SessionController::new(SessionConfig::default().with_seed(seed), pattern);
    let cards = deck(30, seed);
    session.register_cards(cards.clone()).unwrap();
    session.start_game().unwrap();

    'game: while session.call_next().is_ok() {
        if session.pattern().is_moving() && session.called_numbers().len() % 7 == 0 {
            session.advance_pattern_phase().unwrap();
        }
        for card in &cards {
            if session.verify(card.id()).unwrap().is_win() {
                break 'game;
            }
        }
    }
    (session, cards)
}

#[test]
fn recorded_win_replays_from_the_log() {
    let (session, cards) = play_to_first_win(names::ANY_LINE, 21);
    let winners = session.winners();
    assert_eq!(winners.len(), 1);

    let engine = MatchEngine::default();
    let log = session.call_log();
    let pattern = session.pattern();
    assert!(verify_record(&engine, cards.as_slice(), &log, &pattern, &winners[0]).unwrap());

    // One call earlier the card had not won yet
    let record = &winners[0];
    let earlier = replay_verdict(
        &engine,
        cards.as_slice(),
        &record.card_id,
        &log,
        &pattern,
        record.phase,
        record.completed_at.unwrap() - 1,
    )
    .unwrap();
    assert!(matches!(earlier, Verdict::NotYet(_)));
}

#[test]
fn tampered_record_fails_replay() {
    let (session, cards) = play_to_first_win(names::FOUR_CORNERS, 33);
    let mut record = session.winners().remove(0);
    record.call_index = record.completed_at.unwrap() - 1;

    let engine = MatchEngine::default();
    let log = session.call_log();
    assert!(!verify_record(&engine, cards.as_slice(), &log, &session.pattern(), &record).unwrap());
}

#[test]
fn moving_pattern_summary_audits_after_json_round_trip() {
    let (session, cards) = play_to_first_win(names::TRAVELING_DIAGONAL, 8);
    let pattern = session.pattern();
    let summary = session.end_game().unwrap();

    let reloaded = summary_from_json(&summary_to_json(&summary).unwrap()).unwrap();
    assert_eq!(reloaded, summary);

    for record in &reloaded.winners {
        assert_eq!(phase_at(&reloaded.phase_changes, record.call_index), record.phase);
    }
    let failed = audit_summary(&MatchEngine::default(), cards.as_slice(), &pattern, &reloaded).unwrap();
    assert!(failed.is_empty());
}

#[test]
fn summary_replays_from_its_own_winning_cards() {
    let (session, _cards) = play_to_first_win(names::TRAVELING_DIAGONAL, 8);
    let pattern = session.pattern();
    let summary = session.end_game().unwrap();
    assert!(summary.carries_winning_cards());
    assert_eq!(summary.winning_cards.len(), summary.winners.len());

    let reloaded = summary_from_json(&summary_to_json(&summary).unwrap()).unwrap();
    let failed = audit_summary(
        &MatchEngine::default(),
        reloaded.winning_cards.as_slice(),
        &pattern,
        &reloaded,
    )
    .unwrap();
    assert!(failed.is_empty());
}
