//! Win patterns: static shape sets and moving (phase-shifted) shape sets
//!
//! A [`Pattern`] is immutable after construction. A moving pattern never holds
//! its own phase; callers pass the phase in and [`Pattern::shapes_at`] is a pure
//! function of `(definition, phase mod period)`. The session controller owns
//! the only mutable phase counter.
//!
//! ## Moving patterns
//!
//! - **Stepped**: a base shape set plus a [`Transform`]; phase `k` is the
//!   transform applied `k` times. The period is the transform's permutation
//!   order, so a stepped pattern always returns to its base.
//! - **Cycle**: an explicit ordered list of shape sets; phase `k` selects
//!   frame `k mod frames`.
//!
//! Moving patterns are periodic and never terminate; an operator who wants a
//! pattern to stop moving ends the game or switches patterns between games.
//!
//! All frames are computed once at construction, so evaluation never
//! re-applies transforms.

use crate::constants::patterns::DEFAULT_CATEGORY;
use crate::error::{BingoError, BingoResult};
use crate::transform::Transform;
use crate::types::Phase;
use bingo_types::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A shape as raw `(row, col)` pairs, validated when the pattern is constructed
pub type RawShape = Vec<(usize, usize)>;

/// When the session should advance a moving pattern's phase on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseTrigger {
    /// Only on an explicit operator request
    #[default]
    Manual,
    /// After every `calls` calls, in addition to operator requests
    EveryCalls { calls: u32 },
}

impl PhaseTrigger {
    /// Whether the trigger fires once `calls_made` calls have been made
    pub fn fires_at(self, calls_made: usize) -> bool {
        match self {
            PhaseTrigger::Manual => false,
            PhaseTrigger::EveryCalls { calls } => {
                calls_made > 0 && calls > 0 && calls_made % calls as usize == 0
            }
        }
    }
}

/// Serialized form of a pattern's movement
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionDefinition {
    #[default]
    Static,
    Stepped {
        transform: Transform,
        #[serde(default)]
        trigger: PhaseTrigger,
    },
    /// `frames` are the shape sets that follow the base set, in order
    Cycle {
        frames: Vec<Vec<RawShape>>,
        #[serde(default)]
        trigger: PhaseTrigger,
    },
}

/// Serialized form of a pattern; loading always goes through [`Pattern::from_definition`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Base shape set (phase 0)
    pub shapes: Vec<RawShape>,
    #[serde(default)]
    pub motion: MotionDefinition,
}

/// Validated movement of a constructed pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Static,
    Stepped { transform: Transform, trigger: PhaseTrigger },
    Cycle { trigger: PhaseTrigger },
}

/// A named set of win shapes, possibly moving with phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatternDefinition", into = "PatternDefinition")]
pub struct Pattern {
    name: String,
    category: String,
    motion: Motion,
    /// `frames[k]` is the active shape set at phase `k`; never empty
    frames: Vec<Vec<Shape>>,
}

impl Pattern {
    /// A static pattern from shapes in declaration order
    pub fn fixed(name: impl Into<String>, shapes: Vec<Shape>) -> BingoResult<Self> {
        let name = name.into();
        ensure_shapes(&name, &shapes)?;
        Ok(Self {
            name,
            category: DEFAULT_CATEGORY.to_string(),
            motion: Motion::Static,
            frames: vec![shapes],
        })
    }

    /// A moving pattern that applies `transform` once per phase step
    pub fn stepped(
        name: impl Into<String>,
        base: Vec<Shape>,
        transform: Transform,
        trigger: PhaseTrigger,
    ) -> BingoResult<Self> {
        let name = name.into();
        ensure_shapes(&name, &base)?;
        ensure_trigger(&name, trigger)?;

        let period = transform.period();
        let mut frames = Vec::with_capacity(period as usize);
        let mut current = base;
        for _ in 0..period {
            let next = current.iter().map(|shape| transform.apply_shape(*shape)).collect();
            frames.push(std::mem::replace(&mut current, next));
        }

        Ok(Self {
            name,
            category: DEFAULT_CATEGORY.to_string(),
            motion: Motion::Stepped { transform, trigger },
            frames,
        })
    }

    /// A moving pattern that cycles through explicit shape sets; `frames[0]` is the base
    pub fn cycle(
        name: impl Into<String>,
        frames: Vec<Vec<Shape>>,
        trigger: PhaseTrigger,
    ) -> BingoResult<Self> {
        let name = name.into();
        if frames.is_empty() {
            return Err(BingoError::invalid_pattern(&name, "cycle needs at least one frame"));
        }
        for frame in &frames {
            ensure_shapes(&name, frame)?;
        }
        ensure_trigger(&name, trigger)?;

        Ok(Self {
            name,
            category: DEFAULT_CATEGORY.to_string(),
            motion: Motion::Cycle { trigger },
            frames,
        })
    }

    /// Validate a serialized definition into a pattern
    pub fn from_definition(definition: PatternDefinition) -> BingoResult<Self> {
        let PatternDefinition { name, category, shapes, motion } = definition;
        let base = parse_shapes(&name, &shapes)?;

        let pattern = match motion {
            MotionDefinition::Static => Self::fixed(name, base)?,
            MotionDefinition::Stepped { transform, trigger } => {
                Self::stepped(name, base, transform, trigger)?
            }
            MotionDefinition::Cycle { frames, trigger } => {
                let mut all = vec![base];
                for frame in &frames {
                    all.push(parse_shapes(&name, frame)?);
                }
                Self::cycle(name, all, trigger)?
            }
        };

        Ok(match category {
            Some(category) if !category.trim().is_empty() => pattern.with_category(category),
            _ => pattern,
        })
    }

    /// The definition this pattern was built from
    pub fn definition(&self) -> PatternDefinition {
        let raw = |shapes: &[Shape]| -> Vec<RawShape> {
            shapes.iter().map(|shape| shape.cells().map(Into::into).collect()).collect()
        };

        let motion = match self.motion {
            Motion::Static => MotionDefinition::Static,
            Motion::Stepped { transform, trigger } => {
                MotionDefinition::Stepped { transform, trigger }
            }
            Motion::Cycle { trigger } => MotionDefinition::Cycle {
                frames: self.frames.iter().skip(1).map(|frame| raw(frame)).collect(),
                trigger,
            },
        };

        PatternDefinition {
            name: self.name.clone(),
            category: Some(self.category.clone()),
            shapes: raw(self.base()),
            motion,
        }
    }

    /// Replace the library category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Library key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library category, `"custom"` unless set
    pub fn category(&self) -> &str {
        &self.category
    }

    /// How the active shapes change between phases
    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self.motion, Motion::Static)
    }

    /// Automatic phase trigger, for moving patterns
    pub fn trigger(&self) -> Option<PhaseTrigger> {
        match self.motion {
            Motion::Static => None,
            Motion::Stepped { trigger, .. } | Motion::Cycle { trigger } => Some(trigger),
        }
    }

    /// Number of distinct phases before the shape sets repeat
    pub fn period(&self) -> u64 {
        self.frames.len() as u64
    }

    /// Shape set active at phase 0
    pub fn base(&self) -> &[Shape] {
        &self.frames[0]
    }

    /// Shape set active at `phase`, in declaration order
    pub fn shapes_at(&self, phase: Phase) -> &[Shape] {
        &self.frames[(phase % self.period()) as usize]
    }
}

impl TryFrom<PatternDefinition> for Pattern {
    type Error = BingoError;

    fn try_from(definition: PatternDefinition) -> Result<Self, Self::Error> {
        Self::from_definition(definition)
    }
}

impl From<Pattern> for PatternDefinition {
    fn from(pattern: Pattern) -> Self {
        pattern.definition()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.category)?;
        if self.is_moving() {
            write!(f, " (moving, period {})", self.period())?;
        }
        writeln!(f)?;
        for (index, shape) in self.base().iter().enumerate() {
            writeln!(f, "#{index}")?;
            write!(f, "{shape}")?;
        }
        Ok(())
    }
}

fn ensure_shapes(name: &str, shapes: &[Shape]) -> BingoResult<()> {
    if shapes.is_empty() {
        return Err(BingoError::invalid_pattern(name, "pattern needs at least one shape"));
    }
    Ok(())
}

fn ensure_trigger(name: &str, trigger: PhaseTrigger) -> BingoResult<()> {
    if trigger == (PhaseTrigger::EveryCalls { calls: 0 }) {
        return Err(BingoError::invalid_pattern(name, "call-count trigger must be at least 1"));
    }
    Ok(())
}

fn parse_shapes(name: &str, raw: &[RawShape]) -> BingoResult<Vec<Shape>> {
    raw.iter()
        .map(|cells| Shape::from_cells(cells).map_err(|source| BingoError::invalid_shape(name, source)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Axis;
    use bingo_types::GridError;

    fn top_row() -> Shape {
        Shape::from_cells(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]).unwrap()
    }

    #[test]
    fn test_static_pattern_ignores_phase() {
        let pattern = Pattern::fixed("Top Row", vec![top_row()]).unwrap();
        assert!(!pattern.is_moving());
        assert_eq!(pattern.period(), 1);
        assert_eq!(pattern.shapes_at(0), pattern.shapes_at(17));
        assert_eq!(pattern.trigger(), None);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let err = Pattern::fixed("Nothing", vec![]).unwrap_err();
        assert!(matches!(err, BingoError::InvalidPattern { .. }));

        let err = Pattern::cycle("Nothing", vec![], PhaseTrigger::Manual).unwrap_err();
        assert!(matches!(err, BingoError::InvalidPattern { .. }));
    }

    #[test]
    fn test_zero_call_trigger_rejected() {
        let err = Pattern::stepped(
            "Slide",
            vec![top_row()],
            Transform::shift(1, 0),
            PhaseTrigger::EveryCalls { calls: 0 },
        )
        .unwrap_err();
        assert!(matches!(err, BingoError::InvalidPattern { .. }));
    }

    #[test]
    fn test_stepped_pattern_moves_and_wraps() {
        let pattern = Pattern::stepped(
            "Sliding Row",
            vec![top_row()],
            Transform::shift(1, 0),
            PhaseTrigger::Manual,
        )
        .unwrap();

        assert!(pattern.is_moving());
        assert_eq!(pattern.period(), 5);
        assert!(pattern.shapes_at(2)[0].cells().all(|c| c.row() == 2));
        assert_eq!(pattern.shapes_at(5), pattern.shapes_at(0));
        assert_eq!(pattern.shapes_at(7), pattern.shapes_at(2));
    }

    #[test]
    fn test_cycle_pattern_frames() {
        let corners = Shape::from_cells(&[(0, 0), (0, 4), (4, 0), (4, 4)]).unwrap();
        let pattern =
            Pattern::cycle("Blink", vec![vec![top_row()], vec![corners]], PhaseTrigger::Manual)
                .unwrap();

        assert_eq!(pattern.period(), 2);
        assert_eq!(pattern.shapes_at(1), &[corners]);
        assert_eq!(pattern.shapes_at(2), &[top_row()]);
    }

    #[test]
    fn test_definition_rejects_out_of_bounds() {
        let definition = PatternDefinition {
            name: "Broken".to_string(),
            category: None,
            shapes: vec![vec![(0, 0), (5, 1)]],
            motion: MotionDefinition::Static,
        };
        let err = Pattern::from_definition(definition).unwrap_err();
        assert_eq!(
            err,
            BingoError::invalid_shape("Broken", GridError::OutOfBounds { row: 5, col: 1 })
        );

        let definition = PatternDefinition {
            name: "Hollow".to_string(),
            category: None,
            shapes: vec![vec![]],
            motion: MotionDefinition::Static,
        };
        let err = Pattern::from_definition(definition).unwrap_err();
        assert_eq!(err, BingoError::invalid_shape("Hollow", GridError::EmptyShape));
    }

    #[test]
    fn test_pattern_json_round_trip() {
        let pattern = Pattern::stepped(
            "Mirror Row",
            vec![top_row()],
            Transform::reflect(Axis::Horizontal),
            PhaseTrigger::EveryCalls { calls: 10 },
        )
        .unwrap()
        .with_category("moving");

        let json = serde_json::to_string(&pattern).unwrap();
        let loaded: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, pattern);
        assert_eq!(loaded.category(), "moving");

        let bad = r#"{"name":"x","shapes":[[[0,9]]]}"#;
        assert!(serde_json::from_str::<Pattern>(bad).is_err());
    }

    #[test]
    fn test_trigger_fires_on_multiples() {
        let trigger = PhaseTrigger::EveryCalls { calls: 5 };
        assert!(!trigger.fires_at(0));
        assert!(!trigger.fires_at(4));
        assert!(trigger.fires_at(5));
        assert!(trigger.fires_at(10));
        assert!(!PhaseTrigger::Manual.fires_at(5));
    }
}
