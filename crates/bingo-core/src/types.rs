use bingo_types::{CardId, Shape, ball_label};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use bingo_types::{Card, CellMask, Column, Coord};

/// 1-based position of a call within a game
pub type CallIndex = u32;

/// Index selecting the active shape set of a moving pattern
pub type Phase = u64;

/// Lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    NotStarted,
    InProgress,
    /// A verified win froze calling
    Won,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::NotStarted => write!(f, "NOT_STARTED"),
            GameState::InProgress => write!(f, "IN_PROGRESS"),
            GameState::Won => write!(f, "WON"),
        }
    }
}

/// One entry of the append-only call log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub index: CallIndex,
    pub number: u8,
    pub called_at: DateTime<Utc>,
}

impl CallRecord {
    /// Announcement label, e.g. `G-52`
    pub fn label(&self) -> String {
        ball_label(self.number).unwrap_or_else(|| self.number.to_string())
    }
}

/// A satisfied shape together with the call that completed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeMatch {
    /// Declaration index within the active shape set
    pub shape_index: usize,
    pub shape: Shape,
    /// Call index of the last required number; `None` when the free cell alone satisfies the shape
    pub completed_at: Option<CallIndex>,
}

/// Details of a winning verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinDetail {
    pub card_id: CardId,
    pub phase: Phase,
    /// First satisfied shape in declaration order, the canonical winning line
    pub matched: ShapeMatch,
    /// Every satisfied shape in declaration order when audit reporting is enabled,
    /// otherwise only the canonical one
    pub satisfied: Vec<ShapeMatch>,
}

impl WinDetail {
    /// Earliest completion across all reported satisfied shapes
    pub fn earliest_completion(&self) -> Option<CallIndex> {
        self.satisfied.iter().map(|m| m.completed_at).min().unwrap_or(self.matched.completed_at)
    }
}

/// How close a non-winning card is to its nearest active shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub card_id: CardId,
    pub phase: Phase,
    /// Declaration index of the shape needing the fewest cells
    pub closest_shape: usize,
    /// Cells still unmarked in that shape
    pub missing: usize,
}

/// The engine's authoritative answer for one verification request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Win(WinDetail),
    NotYet(Progress),
    /// The card id is not registered with the session; an operator input error
    InvalidCard { card_id: CardId },
}

impl Verdict {
    pub fn is_win(&self) -> bool {
        matches!(self, Verdict::Win(_))
    }

    pub fn card_id(&self) -> &CardId {
        match self {
            Verdict::Win(detail) => &detail.card_id,
            Verdict::NotYet(progress) => &progress.card_id,
            Verdict::InvalidCard { card_id } => card_id,
        }
    }

    /// Winning details, if this is a win
    pub fn win(&self) -> Option<&WinDetail> {
        match self {
            Verdict::Win(detail) => Some(detail),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Win(detail) => match detail.matched.completed_at {
                Some(call) => write!(
                    f,
                    "WIN card={} shape=#{} completed at call {}",
                    detail.card_id, detail.matched.shape_index, call
                ),
                None => write!(
                    f,
                    "WIN card={} shape=#{} (free cell only)",
                    detail.card_id, detail.matched.shape_index
                ),
            },
            Verdict::NotYet(progress) => write!(
                f,
                "NOT_YET card={} closest shape=#{} missing {}",
                progress.card_id, progress.closest_shape, progress.missing
            ),
            Verdict::InvalidCard { card_id } => write!(f, "INVALID_CARD card={card_id}"),
        }
    }
}

/// What caused a pattern phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseCause {
    Operator,
    CallCount,
}

/// A recorded phase advance; `at_call` is the number of calls made when it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub at_call: CallIndex,
    pub phase: Phase,
    pub cause: PhaseCause,
}

/// A verified win, sufficient to replay the verdict from the call log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub card_id: CardId,
    /// Number of calls made when the claim was verified
    pub call_index: CallIndex,
    /// Call that completed the matched shape
    pub completed_at: Option<CallIndex>,
    pub phase: Phase,
    pub shape_index: usize,
    pub shape: Shape,
    pub recorded_at: DateTime<Utc>,
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Won,
    /// All 75 numbers called without a verified win
    Exhausted,
    /// Ended by the operator before a win or exhaustion
    Abandoned,
}

/// Report of a finished game, the unit handed to reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: Uuid,
    pub pattern: String,
    pub outcome: GameOutcome,
    pub calls: Vec<CallRecord>,
    pub phase_changes: Vec<PhaseChange>,
    pub winners: Vec<WinRecord>,
    /// Grids of the winning cards, so the summary replays without the deck
    #[serde(default)]
    pub winning_cards: Vec<Card>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
}

impl GameSummary {
    /// Whether every recorded winner's grid travels with the summary
    pub fn carries_winning_cards(&self) -> bool {
        self.winners
            .iter()
            .all(|winner| self.winning_cards.iter().any(|card| card.id() == &winner.card_id))
    }
}

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub games_started: u64,
    pub calls_made: u64,
    pub verifications: u64,
    pub wins: u64,
    pub not_yet: u64,
    pub invalid_card_claims: u64,
    pub phase_advances: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session Statistics:")?;
        writeln!(f, "  Games started: {}", self.games_started)?;
        writeln!(f, "  Calls made: {}", self.calls_made)?;
        writeln!(
            f,
            "  Verifications: {} ({} win, {} not yet, {} invalid card)",
            self.verifications, self.wins, self.not_yet, self.invalid_card_claims
        )?;
        writeln!(f, "  Phase advances: {}", self.phase_advances)
    }
}
