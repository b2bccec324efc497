//! Core domain types for the workout prediction engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged sets and session boundaries (the history log)
//! - Derived session views
//! - Predictions and the reasons behind them
//! - e1RM aggregates and difficulty bands

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Per-exercise rest overrides in seconds, keyed by exercise ID
pub type RestTimes = HashMap<String, u32>;

// ============================================================================
// History Types
// ============================================================================

/// Self-reported difficulty of a logged set
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SetDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl fmt::Display for SetDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SetDifficulty::Easy => "easy",
            SetDifficulty::Normal => "normal",
            SetDifficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SetDifficulty {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(SetDifficulty::Easy),
            "normal" => Ok(SetDifficulty::Normal),
            "hard" => Ok(SetDifficulty::Hard),
            other => Err(crate::Error::Other(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// A single logged set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    pub ex_id: String,
    /// Epoch milliseconds
    pub ts: i64,
    pub kg: f64,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<SetDifficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl SetEntry {
    /// Create a set with no optional fields
    pub fn new(ex_id: impl Into<String>, ts: i64, kg: f64, reps: u32) -> Self {
        Self {
            ex_id: ex_id.into(),
            ts,
            kg,
            reps,
            rest: None,
            difficulty: None,
            duration: None,
        }
    }

    pub fn with_rest(mut self, rest: u32) -> Self {
        self.rest = Some(rest);
        self
    }

    pub fn with_difficulty(mut self, difficulty: SetDifficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    /// The (kg, reps) pair of this set
    pub fn values(&self) -> SetValues {
        SetValues {
            kg: self.kg,
            reps: self.reps,
        }
    }
}

/// Boundary between two sessions in the history log
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionEndMarker {
    pub ts: i64,
}

/// One entry of the history log
///
/// Sequencing always follows log order, never `ts`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HistoryEntry {
    Set(SetEntry),
    SessionEnd(SessionEndMarker),
}

impl HistoryEntry {
    pub fn as_set(&self) -> Option<&SetEntry> {
        match self {
            HistoryEntry::Set(set) => Some(set),
            HistoryEntry::SessionEnd(_) => None,
        }
    }

    pub fn is_session_end(&self) -> bool {
        matches!(self, HistoryEntry::SessionEnd(_))
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            HistoryEntry::Set(set) => set.ts,
            HistoryEntry::SessionEnd(marker) => marker.ts,
        }
    }
}

impl From<SetEntry> for HistoryEntry {
    fn from(set: SetEntry) -> Self {
        HistoryEntry::Set(set)
    }
}

impl From<SessionEndMarker> for HistoryEntry {
    fn from(marker: SessionEndMarker) -> Self {
        HistoryEntry::SessionEnd(marker)
    }
}

/// A completed session, split out of the history log
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedSession<'a> {
    pub sets: Vec<&'a SetEntry>,
    /// Exercise IDs in order of first appearance, without duplicates
    pub exercise_sequence: Vec<&'a str>,
}

impl ParsedSession<'_> {
    /// Timestamp of the first set, used to refer to the session in reasons
    pub fn started_at(&self) -> i64 {
        self.sets.first().map(|s| s.ts).unwrap_or_default()
    }
}

// ============================================================================
// Prediction Types
// ============================================================================

/// A weight/reps pair
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetValues {
    pub kg: f64,
    pub reps: u32,
}

/// Evidence behind a prediction
///
/// Consumers must handle every variant; adding one is a breaking change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PredictionReason {
    /// The session's exercise order repeats a block of exercises
    #[serde(rename_all = "camelCase")]
    Cycle {
        pattern: Vec<String>,
        /// 0-based position of the predicted exercise inside `pattern`
        position: usize,
    },
    /// Extrapolated from the last two contiguous sets of the exercise
    #[serde(rename_all = "camelCase")]
    Trend {
        previous: SetValues,
        last: SetValues,
        delta_kg: f64,
        delta_reps: i64,
    },
    /// Continues a drop-set block from an earlier session
    #[serde(rename_all = "camelCase")]
    HistoryDropset {
        session_ts: i64,
        /// 0-based index of the predicted set inside the historical block
        set_index: usize,
        block_len: usize,
        difficulty: Option<SetDifficulty>,
    },
    /// Opens the drop-set pattern logged last time for this exercise
    #[serde(rename_all = "camelCase")]
    HistoryDropsetStart { pattern: Vec<SetValues> },
    /// An earlier session followed the same exercise order
    #[serde(rename_all = "camelCase")]
    HistorySequence { session_ts: i64, after: String },
    /// Repeat the most recent set of the exercise
    #[serde(rename_all = "camelCase")]
    Continue { sets_done: usize },
    /// First set of the exercise this session, seeded from last time
    #[serde(rename_all = "camelCase")]
    Start { logged_at: i64 },
    /// Nothing logged yet; begin like the last session began
    #[serde(rename_all = "camelCase")]
    SessionStart { session_ts: i64 },
}

/// The engine's suggestion for the next set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NextExercisePrediction {
    pub ex_id: String,
    pub kg: f64,
    pub reps: u32,
    /// Seconds
    pub rest: u32,
    pub reason: PredictionReason,
}

// ============================================================================
// e1RM and Difficulty Types
// ============================================================================

/// Direction of recent e1RM change
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum E1rmTrend {
    Up,
    Down,
    Stable,
}

/// A working weight for a rep target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SuggestedWeight {
    pub label: String,
    pub reps: u32,
    pub kg: f64,
}

/// e1RM aggregates for one exercise, computed from completed sessions only
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct E1rmMetrics {
    pub current: f64,
    pub peak: f64,
    pub trend: Option<E1rmTrend>,
    pub suggested_weights: Vec<SuggestedWeight>,
}

/// Qualitative intensity band of a set relative to e1RM
///
/// Ordered by severity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBand {
    Warmup,
    Easy,
    Normal,
    Hard,
}

impl fmt::Display for DifficultyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DifficultyBand::Warmup => "warmup",
            DifficultyBand::Easy => "easy",
            DifficultyBand::Normal => "normal",
            DifficultyBand::Hard => "hard",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DifficultyBand {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "warmup" | "warm-up" => Ok(DifficultyBand::Warmup),
            "easy" => Ok(DifficultyBand::Easy),
            "normal" => Ok(DifficultyBand::Normal),
            "hard" => Ok(DifficultyBand::Hard),
            other => Err(crate::Error::Other(format!(
                "Unknown difficulty band: {}",
                other
            ))),
        }
    }
}
