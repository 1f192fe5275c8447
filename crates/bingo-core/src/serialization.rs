//! JSON import and export for cards, patterns and game summaries
//!
//! Storage and transport belong to the host; these helpers only guarantee that
//! everything loaded passes through the same validation as direct
//! construction, and that failures come back as [`BingoError`] values naming
//! what was being read.

use crate::error::{BingoError, BingoResult};
use crate::pattern::{Pattern, PatternDefinition};
use crate::types::GameSummary;
use bingo_types::{Card, CardRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

fn from_json<T: DeserializeOwned>(data_type: &str, json: &str) -> BingoResult<T> {
    serde_json::from_str(json).map_err(|err| BingoError::serialization(data_type, err.to_string()))
}

fn to_json<T: Serialize + ?Sized>(data_type: &str, value: &T) -> BingoResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| BingoError::serialization(data_type, err.to_string()))
}

/// Load a JSON array of cards.
///
/// Records are parsed first and validated second, so a bad grid is reported
/// as `InvalidCardGrid` with the card's id.
pub fn cards_from_json(json: &str) -> BingoResult<Vec<Card>> {
    let records: Vec<CardRecord> = from_json("cards", json)?;
    let cards = records
        .into_iter()
        .map(|record| {
            Card::new(record.id.clone(), &record.numbers)
                .map_err(|source| BingoError::invalid_card_grid(record.id, source))
        })
        .collect::<BingoResult<Vec<_>>>()?;
    debug!(count = cards.len(), "Cards deserialized");
    Ok(cards)
}

pub fn cards_to_json(cards: &[Card]) -> BingoResult<String> {
    to_json("cards", cards)
}

/// Load a JSON array of pattern definitions.
///
/// Definitions are parsed first and constructed second, so a bad coordinate
/// is reported as `InvalidShape` with the pattern's name rather than as a
/// bare parse error.
pub fn patterns_from_json(json: &str) -> BingoResult<Vec<Pattern>> {
    let definitions: Vec<PatternDefinition> = from_json("patterns", json)?;
    let patterns =
        definitions.into_iter().map(Pattern::from_definition).collect::<BingoResult<Vec<_>>>()?;
    debug!(count = patterns.len(), "Patterns deserialized");
    Ok(patterns)
}

pub fn patterns_to_json(patterns: &[Pattern]) -> BingoResult<String> {
    let definitions: Vec<PatternDefinition> = patterns.iter().map(Pattern::definition).collect();
    to_json("patterns", &definitions)
}

pub fn summary_to_json(summary: &GameSummary) -> BingoResult<String> {
    to_json("game_summary", summary)
}

pub fn summary_from_json(json: &str) -> BingoResult<GameSummary> {
    from_json("game_summary", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::builtin_patterns;
    use crate::test_utils::scenario_card;
    use bingo_types::GridError;

    #[test]
    fn test_cards_round_trip() {
        let cards = vec![scenario_card("A"), scenario_card("B")];
        let json = cards_to_json(&cards).unwrap();
        assert_eq!(cards_from_json(&json).unwrap(), cards);
    }

    #[test]
    fn test_invalid_card_grid_is_rejected_on_load() {
        let json = r#"[{"id":"bad","numbers":[[1,16,31,46,61],[2,17,32,47,62],[3,18,null,48,63],[4,19,34,49,64],[5,20,35,50,99]]}]"#;
        assert_eq!(
            cards_from_json(json).unwrap_err(),
            BingoError::invalid_card_grid(
                "bad",
                GridError::OutOfColumnRange { number: 99, column: 'O', min: 61, max: 75 }
            )
        );
    }

    #[test]
    fn test_malformed_cards_json_is_a_serialization_error() {
        let err = cards_from_json(r#"[{"id":"short"}]"#).unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn test_builtin_patterns_round_trip() {
        let patterns = builtin_patterns().unwrap();
        let json = patterns_to_json(&patterns).unwrap();
        assert_eq!(patterns_from_json(&json).unwrap(), patterns);
    }

    #[test]
    fn test_out_of_bounds_pattern_names_the_pattern() {
        let json = r#"[{"name":"edge","shapes":[[[0,0],[0,5]]]}]"#;
        assert_eq!(
            patterns_from_json(json).unwrap_err(),
            BingoError::invalid_shape("edge", GridError::OutOfBounds { row: 0, col: 5 })
        );
    }
}
