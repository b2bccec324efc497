//! Smart e1RM estimation.
//!
//! Per-set estimates start from Epley and are scaled by three multipliers:
//! - Difficulty: an easy set had reps left in the tank
//! - Rest: short rest means the set was performed partially fatigued
//! - Fatigue: later sets of an exercise in a session are harder
//!
//! Aggregates only read completed sessions, and each session contributes a
//! single value: its best reliable set.

use crate::session::parse_history_into_sessions;
use crate::{E1rmMetrics, E1rmTrend, HistoryEntry, SetDifficulty, SetEntry, SuggestedWeight};

/// Reps above which e1RM formulas stop being trustworthy
const MAX_RELIABLE_REPS: u32 = 15;

/// Number of sessions in each window for `current` and `trend`
const WINDOW: usize = 3;

/// Relative change between windows that counts as a trend
const TREND_THRESHOLD: f64 = 0.02;

/// Rep targets for suggested working weights
const TARGETS: [(&str, u32); 4] = [
    ("Strength", 5),
    ("Hypertrophy", 8),
    ("Volume", 12),
    ("Endurance", 15),
];

/// Plain Epley estimate
///
/// A single is its own 1RM. Returns 0 for non-positive weight or zero reps.
pub fn base_e1rm(kg: f64, reps: u32) -> f64 {
    if kg <= 0.0 || reps == 0 {
        return 0.0;
    }

    if reps == 1 {
        return kg;
    }

    kg * (1.0 + f64::from(reps) / 30.0)
}

fn difficulty_multiplier(difficulty: Option<SetDifficulty>) -> f64 {
    match difficulty.unwrap_or_default() {
        SetDifficulty::Easy => 1.07,
        SetDifficulty::Normal => 1.03,
        SetDifficulty::Hard => 1.00,
    }
}

fn rest_multiplier(rest: Option<u32>) -> f64 {
    match rest {
        Some(secs) if secs < 60 => 1.10,
        Some(secs) if secs <= 120 => 1.05,
        _ => 1.00,
    }
}

fn fatigue_multiplier(set_index: usize) -> f64 {
    1.0 + (0.01 * set_index as f64).min(0.08)
}

/// e1RM of one set, rounded to one decimal
///
/// `set_index` is the 0-based position of the set among the sets of the same
/// exercise within its session.
pub fn calculate_smart_e1rm(set: &SetEntry, set_index: usize) -> f64 {
    let base = base_e1rm(set.kg, set.reps);
    if base <= 0.0 {
        return 0.0;
    }

    let estimate = base
        * difficulty_multiplier(set.difficulty)
        * rest_multiplier(set.rest)
        * fatigue_multiplier(set_index);

    (estimate * 10.0).round() / 10.0
}

/// Whether a set is trustworthy enough to feed the aggregates
pub fn is_reliable(set: &SetEntry) -> bool {
    (1..=MAX_RELIABLE_REPS).contains(&set.reps)
        && set.kg > 0.0
        && set.difficulty != Some(SetDifficulty::Easy)
}

/// Best reliable e1RM of `ex_id` per completed session, oldest first
///
/// Sessions without a reliable set of the exercise are skipped.
pub fn session_peaks(history: &[HistoryEntry], ex_id: &str) -> Vec<f64> {
    parse_history_into_sessions(history)
        .iter()
        .filter_map(|session| {
            session
                .sets
                .iter()
                .filter(|set| set.ex_id == ex_id)
                .enumerate()
                .filter(|(_, set)| is_reliable(set))
                .map(|(index, set)| calculate_smart_e1rm(set, index))
                .reduce(f64::max)
        })
        .collect()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn trend(newest_first: &[f64]) -> Option<E1rmTrend> {
    let recent = average(&newest_first[..newest_first.len().min(WINDOW)])?;
    let older_end = newest_first.len().min(WINDOW * 2);
    let older = average(newest_first.get(WINDOW..older_end).unwrap_or_default())?;

    if older <= 0.0 {
        return None;
    }

    let change = (recent - older) / older;
    Some(if change >= TREND_THRESHOLD {
        E1rmTrend::Up
    } else if change <= -TREND_THRESHOLD {
        E1rmTrend::Down
    } else {
        E1rmTrend::Stable
    })
}

fn round_to_half(kg: f64) -> f64 {
    (kg * 2.0).round() / 2.0
}

/// Working weights for the standard rep targets, by inverting Epley
///
/// Empty when `e1rm` is not positive.
pub fn suggested_weights(e1rm: f64) -> Vec<SuggestedWeight> {
    if e1rm <= 0.0 {
        return Vec::new();
    }

    TARGETS
        .iter()
        .map(|(label, reps)| SuggestedWeight {
            label: label.to_string(),
            reps: *reps,
            kg: round_to_half(e1rm / (1.0 + f64::from(*reps) / 30.0)),
        })
        .collect()
}

/// e1RM aggregates for `ex_id`
///
/// - `current`: median of the last three session peaks
/// - `peak`: best session peak ever
/// - `trend`: last three sessions against the three before them
pub fn calculate_e1rm_metrics(history: &[HistoryEntry], ex_id: &str) -> E1rmMetrics {
    let mut peaks = session_peaks(history, ex_id);
    if peaks.is_empty() {
        tracing::debug!("No reliable completed sets for {}", ex_id);
        return E1rmMetrics::default();
    }

    peaks.reverse();

    let current = median(&peaks[..peaks.len().min(WINDOW)]);
    let peak = peaks.iter().copied().fold(0.0, f64::max);
    let trend = trend(&peaks);

    tracing::debug!(
        "e1RM for {} over {} sessions: current {}, peak {}, trend {:?}",
        ex_id,
        peaks.len(),
        current,
        peak,
        trend
    );

    E1rmMetrics {
        current,
        peak,
        trend,
        suggested_weights: suggested_weights(current),
    }
}
