#![forbid(unsafe_code)]

//! Core domain model and prediction engine for liftlog.
//!
//! This crate provides:
//! - Domain types (sets, session markers, predictions, e1RM metrics)
//! - History segmentation and lookup
//! - Drop-set trend extrapolation
//! - The next-exercise strategy chain and per-exercise predictor
//! - Smart e1RM estimation and difficulty classification
//! - Host-side persistence (JSONL history log, CSV export) and config
//!
//! Everything under `session`, `trend`, `predict`, `e1rm`, `difficulty`
//! and `reason` is pure: it reads a history snapshot and returns plain data.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod session;
pub mod trend;
pub mod predict;
pub mod e1rm;
pub mod difficulty;
pub mod reason;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use session::{
    get_current_session_sets, get_default_rest, get_exercise_pattern_from_last_session,
    get_first_set_of_last_session, get_last_set, parse_history_into_sessions,
    DEFAULT_REST_SECONDS,
};
pub use trend::{predict_drop_set_trend, DropSetTrend};
pub use predict::{predict_exercise_values, predict_next_exercise, PredictionContext};
pub use e1rm::{
    base_e1rm, calculate_e1rm_metrics, calculate_smart_e1rm, is_reliable, session_peaks,
    suggested_weights,
};
pub use reason::format_prediction;
pub use difficulty::{get_weight_for_difficulty, predict_difficulty};
pub use history::{history_path, read_history, HistoryLog};
pub use export::export_sets_csv;
