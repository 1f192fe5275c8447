//! Built-in patterns and a named pattern library
//!
//! Every built-in is assembled through the public [`Pattern`] constructors;
//! nothing in the engine special-cases a pattern by name.

use crate::constants::patterns::{CATEGORY_COVERALL, CATEGORY_LINE, CATEGORY_MOVING, CATEGORY_SHAPE};
use crate::error::{BingoError, BingoResult};
use crate::pattern::{Pattern, PatternDefinition, PhaseTrigger};
use crate::transform::Transform;
use bingo_types::{GRID_SIZE, Shape};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Names of the built-in patterns
pub mod names {
    pub const ANY_LINE: &str = "any_line";
    pub const TOP_ROW: &str = "top_row";
    pub const FOUR_CORNERS: &str = "four_corners";
    pub const X: &str = "x";
    pub const PLUS_SIGN: &str = "plus_sign";
    pub const POSTAGE_STAMP: &str = "postage_stamp";
    pub const FULL_CARD: &str = "full_card";
    pub const TRAVELING_DIAGONAL: &str = "traveling_diagonal";
    pub const SLIDING_ROW: &str = "sliding_row";
    pub const ROTATING_L: &str = "rotating_l";
    pub const BLINKING: &str = "blinking";
}

fn shape(pattern: &str, cells: &[(usize, usize)]) -> BingoResult<Shape> {
    Shape::from_cells(cells).map_err(|source| BingoError::invalid_shape(pattern, source))
}

fn row(pattern: &str, r: usize) -> BingoResult<Shape> {
    let cells: Vec<_> = (0..GRID_SIZE).map(|c| (r, c)).collect();
    shape(pattern, &cells)
}

fn column(pattern: &str, c: usize) -> BingoResult<Shape> {
    let cells: Vec<_> = (0..GRID_SIZE).map(|r| (r, c)).collect();
    shape(pattern, &cells)
}

fn main_diagonal(pattern: &str) -> BingoResult<Shape> {
    let cells: Vec<_> = (0..GRID_SIZE).map(|i| (i, i)).collect();
    shape(pattern, &cells)
}

fn anti_diagonal(pattern: &str) -> BingoResult<Shape> {
    let cells: Vec<_> = (0..GRID_SIZE).map(|i| (i, GRID_SIZE - 1 - i)).collect();
    shape(pattern, &cells)
}

fn corners(pattern: &str) -> BingoResult<Shape> {
    shape(pattern, &[(0, 0), (0, 4), (4, 0), (4, 4)])
}

/// Every row, then every column, then both diagonals
fn all_lines(pattern: &str) -> BingoResult<Vec<Shape>> {
    let mut shapes = Vec::with_capacity(2 * GRID_SIZE + 2);
    for r in 0..GRID_SIZE {
        shapes.push(row(pattern, r)?);
    }
    for c in 0..GRID_SIZE {
        shapes.push(column(pattern, c)?);
    }
    shapes.push(main_diagonal(pattern)?);
    shapes.push(anti_diagonal(pattern)?);
    Ok(shapes)
}

/// The built-in patterns, in display order
pub fn builtin_patterns() -> BingoResult<Vec<Pattern>> {
    use names::*;

    let x_shape = {
        let cells: Vec<_> =
            (0..GRID_SIZE).flat_map(|i| [(i, i), (i, GRID_SIZE - 1 - i)]).collect();
        shape(X, &cells)?
    };
    let plus = {
        let cells: Vec<_> = (0..GRID_SIZE).flat_map(|i| [(2, i), (i, 2)]).collect();
        shape(PLUS_SIGN, &cells)?
    };
    let stamps = vec![
        shape(POSTAGE_STAMP, &[(0, 0), (0, 1), (1, 0), (1, 1)])?,
        shape(POSTAGE_STAMP, &[(0, 3), (0, 4), (1, 3), (1, 4)])?,
        shape(POSTAGE_STAMP, &[(3, 0), (3, 1), (4, 0), (4, 1)])?,
        shape(POSTAGE_STAMP, &[(3, 3), (3, 4), (4, 3), (4, 4)])?,
    ];
    let full = {
        let cells: Vec<_> =
            (0..GRID_SIZE).flat_map(|r| (0..GRID_SIZE).map(move |c| (r, c))).collect();
        shape(FULL_CARD, &cells)?
    };
    let l_shape = {
        let cells: Vec<_> =
            (0..GRID_SIZE).map(|r| (r, 0)).chain((1..GRID_SIZE).map(|c| (GRID_SIZE - 1, c))).collect();
        shape(ROTATING_L, &cells)?
    };

    Ok(vec![
        Pattern::fixed(ANY_LINE, all_lines(ANY_LINE)?)?.with_category(CATEGORY_LINE),
        Pattern::fixed(TOP_ROW, vec![row(TOP_ROW, 0)?])?.with_category(CATEGORY_LINE),
        Pattern::fixed(FOUR_CORNERS, vec![corners(FOUR_CORNERS)?])?.with_category(CATEGORY_SHAPE),
        Pattern::fixed(X, vec![x_shape])?.with_category(CATEGORY_SHAPE),
        Pattern::fixed(PLUS_SIGN, vec![plus])?.with_category(CATEGORY_SHAPE),
        Pattern::fixed(POSTAGE_STAMP, stamps)?.with_category(CATEGORY_SHAPE),
        Pattern::fixed(FULL_CARD, vec![full])?.with_category(CATEGORY_COVERALL),
        Pattern::stepped(
            TRAVELING_DIAGONAL,
            vec![main_diagonal(TRAVELING_DIAGONAL)?],
            Transform::shift(0, 1),
            PhaseTrigger::Manual,
        )?
        .with_category(CATEGORY_MOVING),
        Pattern::stepped(
            SLIDING_ROW,
            vec![row(SLIDING_ROW, 0)?],
            Transform::shift(1, 0),
            PhaseTrigger::EveryCalls { calls: 10 },
        )?
        .with_category(CATEGORY_MOVING),
        Pattern::stepped(ROTATING_L, vec![l_shape], Transform::rotate(1), PhaseTrigger::Manual)?
            .with_category(CATEGORY_MOVING),
        Pattern::cycle(
            BLINKING,
            vec![vec![corners(BLINKING)?], vec![shape(BLINKING, &[(1, 1), (1, 3), (3, 1), (3, 3)])?]],
            PhaseTrigger::EveryCalls { calls: 5 },
        )?
        .with_category(CATEGORY_MOVING),
    ])
}

/// Named patterns available for selection
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: BTreeMap<String, Arc<Pattern>>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library pre-populated with [`builtin_patterns`]
    pub fn with_builtins() -> BingoResult<Self> {
        let mut library = Self::new();
        for pattern in builtin_patterns()? {
            library.insert(pattern);
        }
        Ok(library)
    }

    /// Add or replace a pattern, returning the one it replaced
    pub fn insert(&mut self, pattern: Pattern) -> Option<Arc<Pattern>> {
        debug!(pattern = pattern.name(), category = pattern.category(), "Pattern registered");
        self.patterns.insert(pattern.name().to_string(), Arc::new(pattern))
    }

    /// Validate and add serialized definitions; nothing is added if any one fails
    pub fn load_definitions(&mut self, definitions: Vec<PatternDefinition>) -> BingoResult<usize> {
        let patterns = definitions
            .into_iter()
            .map(Pattern::from_definition)
            .collect::<BingoResult<Vec<_>>>()?;
        let count = patterns.len();
        for pattern in patterns {
            self.insert(pattern);
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> BingoResult<Arc<Pattern>> {
        self.patterns
            .get(name)
            .cloned()
            .ok_or_else(|| BingoError::UnknownPattern { name: name.to_string() })
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<Pattern>> {
        self.patterns.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Patterns matching an optional category and an optional moving flag, by name
    pub fn search(&self, category: Option<&str>, moving: Option<bool>) -> Vec<Arc<Pattern>> {
        self.patterns
            .values()
            .filter(|p| category.is_none_or(|c| p.category().eq_ignore_ascii_case(c)))
            .filter(|p| moving.is_none_or(|m| p.is_moving() == m))
            .cloned()
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Pattern>> {
        self.patterns.values()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
