//! Human-readable rendering of prediction reasons.

use crate::{NextExercisePrediction, PredictionReason, SetValues};
use chrono::DateTime;
use std::fmt;

fn format_kg(kg: f64) -> String {
    if kg.fract() == 0.0 {
        format!("{:.0}", kg)
    } else {
        format!("{:.1}", kg)
    }
}

/// Signed weight step, e.g. `+2.5` or `-20`
fn format_delta_kg(delta: f64) -> String {
    let sign = if delta < 0.0 { '-' } else { '+' };
    format!("{}{}", sign, format_kg(delta.abs()))
}

fn format_values(values: &SetValues) -> String {
    format!("{}kg x {}", format_kg(values.kg), values.reps)
}

/// Calendar date of an epoch-millisecond timestamp
fn format_day(ts: i64) -> String {
    DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "an earlier session".to_string())
}

impl fmt::Display for PredictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionReason::Cycle { pattern, position } => write!(
                f,
                "Cycle {} (step {} of {})",
                pattern.join(" -> "),
                position + 1,
                pattern.len()
            ),
            PredictionReason::Trend {
                previous,
                last,
                delta_kg,
                delta_reps,
            } => write!(
                f,
                "Trend {} -> {} ({}kg, {:+} reps)",
                format_values(previous),
                format_values(last),
                format_delta_kg(*delta_kg),
                delta_reps
            ),
            PredictionReason::HistoryDropset {
                session_ts,
                set_index,
                block_len,
                difficulty,
            } => {
                write!(
                    f,
                    "Drop set from {} (set {} of {})",
                    format_day(*session_ts),
                    set_index + 1,
                    block_len
                )?;
                if let Some(difficulty) = difficulty {
                    write!(f, ", felt {}", difficulty)?;
                }
                Ok(())
            }
            PredictionReason::HistoryDropsetStart { pattern } => {
                let sets: Vec<String> = pattern.iter().map(format_values).collect();
                write!(f, "Last time: {}", sets.join(", "))
            }
            PredictionReason::HistorySequence { session_ts, after } => write!(
                f,
                "Followed {} on {}",
                after,
                format_day(*session_ts)
            ),
            PredictionReason::Continue { sets_done } => {
                write!(f, "Same as last set ({} done)", sets_done)
            }
            PredictionReason::Start { logged_at } => {
                write!(f, "Starting where you left off on {}", format_day(*logged_at))
            }
            PredictionReason::SessionStart { session_ts } => {
                write!(f, "Last session on {} started here", format_day(*session_ts))
            }
        }
    }
}

/// One-line summary of a prediction
pub fn format_prediction(prediction: &NextExercisePrediction) -> String {
    format!(
        "{}: {}kg x {}, rest {}s ({})",
        prediction.ex_id,
        format_kg(prediction.kg),
        prediction.reps,
        prediction.rest,
        prediction.reason
    )
}
