//! Drop-set trend extrapolation.
//!
//! Handles both descending (drop set) and ascending (pyramid) runs by
//! projecting the last step forward one more time.

use crate::{SetEntry, SetValues};

/// A one-step linear extrapolation over the trailing run of an exercise
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropSetTrend {
    pub previous: SetValues,
    pub last: SetValues,
    pub predicted: SetValues,
    pub delta_kg: f64,
    pub delta_reps: i64,
}

/// Extrapolate the next set of `ex_id` from the trailing run of `sets`
///
/// Only the contiguous run of `ex_id` at the end of `sets` counts; an
/// earlier block of the same exercise separated by anything else is ignored.
/// Only the last two points of that run are used. The projection is clamped
/// at kg >= 0 and reps >= 1.
///
/// Returns `None` when the trailing run has fewer than two sets.
pub fn predict_drop_set_trend(sets: &[&SetEntry], ex_id: &str) -> Option<DropSetTrend> {
    let run = sets
        .iter()
        .rev()
        .take_while(|set| set.ex_id == ex_id)
        .count();

    if run < 2 {
        return None;
    }

    let last = sets[sets.len() - 1];
    let previous = sets[sets.len() - 2];

    let delta_kg = last.kg - previous.kg;
    let delta_reps = i64::from(last.reps) - i64::from(previous.reps);

    let kg = (last.kg + delta_kg).max(0.0);
    let reps = (i64::from(last.reps) + delta_reps).max(1);

    tracing::trace!(
        "Trend for {}: {}x{} -> {}x{}, next {}x{}",
        ex_id,
        previous.kg,
        previous.reps,
        last.kg,
        last.reps,
        kg,
        reps
    );

    Some(DropSetTrend {
        previous: previous.values(),
        last: last.values(),
        predicted: SetValues {
            kg,
            reps: u32::try_from(reps).unwrap_or(u32::MAX),
        },
        delta_kg,
        delta_reps,
    })
}
