//! Next-exercise prediction.
//!
//! This module implements the strategy chain:
//! - Session start: nothing logged yet, begin like the last session began
//! - Cycle: the session's exercise order repeats a block (supersets, circuits)
//! - Current trend: extrapolate the trailing run of the current exercise
//! - Historical drop-set: continue a block that began the same way last time
//! - Historical sequence: follow the order of an earlier session
//! - Fallback: repeat the most recent set
//!
//! Every call re-derives everything from the given history snapshot.

use crate::session::{
    find_last_session_with, get_current_session_sets, get_default_rest, get_last_set,
    parse_history_into_sessions,
};
use crate::trend::{predict_drop_set_trend, DropSetTrend};
use crate::{
    HistoryEntry, NextExercisePrediction, ParsedSession, PredictionReason, RestTimes, SetEntry,
    SetValues,
};

/// Derived view of the history shared by every strategy
#[derive(Clone, Debug)]
pub struct PredictionContext<'a> {
    pub current_sets: Vec<&'a SetEntry>,
    /// Exercise IDs of the current session with consecutive repeats collapsed
    pub exercise_order: Vec<&'a str>,
    pub last_ex_id: &'a str,
    pub history: &'a [HistoryEntry],
    pub rest_times: &'a RestTimes,
    pub completed_sessions: Vec<ParsedSession<'a>>,
}

impl<'a> PredictionContext<'a> {
    /// Build the context, or `None` when the current session has no sets
    pub fn new(history: &'a [HistoryEntry], rest_times: &'a RestTimes) -> Option<Self> {
        let current_sets = get_current_session_sets(history);
        let last_ex_id: &'a str = current_sets.last().copied()?.ex_id.as_str();

        let mut exercise_order: Vec<&'a str> = Vec::new();
        for set in current_sets.iter().copied() {
            if exercise_order.last() != Some(&set.ex_id.as_str()) {
                exercise_order.push(set.ex_id.as_str());
            }
        }

        Some(Self {
            current_sets,
            exercise_order,
            last_ex_id,
            history,
            rest_times,
            completed_sessions: parse_history_into_sessions(history),
        })
    }

    /// Sets of `ex_id` logged in the current session
    fn session_sets_of(&self, ex_id: &str) -> Vec<&'a SetEntry> {
        self.current_sets
            .iter()
            .copied()
            .filter(|set| set.ex_id == ex_id)
            .collect()
    }

    fn prediction(
        &self,
        ex_id: &str,
        values: SetValues,
        reason: PredictionReason,
    ) -> NextExercisePrediction {
        NextExercisePrediction {
            ex_id: ex_id.to_string(),
            kg: values.kg,
            reps: values.reps,
            rest: get_default_rest(self.history, ex_id, self.rest_times),
            reason,
        }
    }

    fn trend_prediction(&self, ex_id: &str, trend: DropSetTrend) -> NextExercisePrediction {
        self.prediction(
            ex_id,
            trend.predicted,
            PredictionReason::Trend {
                previous: trend.previous,
                last: trend.last,
                delta_kg: trend.delta_kg,
                delta_reps: trend.delta_reps,
            },
        )
    }
}

type Strategy = fn(&PredictionContext<'_>) -> Option<NextExercisePrediction>;

/// Strategies in priority order; the first to return a prediction wins
const STRATEGIES: [(&str, Strategy); 5] = [
    ("cycle", predict_cycle),
    ("trend", predict_current_trend),
    ("history-dropset", predict_history_dropset),
    ("history-sequence", predict_history_sequence),
    ("continue", predict_continue),
];

/// Predict the next set the user is about to perform
///
/// Returns `None` on a cold start (nothing logged at all).
pub fn predict_next_exercise(
    history: &[HistoryEntry],
    rest_times: &RestTimes,
) -> Option<NextExercisePrediction> {
    let Some(ctx) = PredictionContext::new(history, rest_times) else {
        return predict_session_start(history, rest_times);
    };

    STRATEGIES.iter().find_map(|(name, strategy)| {
        let prediction = strategy(&ctx)?;
        tracing::debug!(
            "Strategy {} predicted {} at {}kg x {}",
            name,
            prediction.ex_id,
            prediction.kg,
            prediction.reps
        );
        Some(prediction)
    })
}

/// Empty current session: open with the first exercise of the last session
fn predict_session_start(
    history: &[HistoryEntry],
    rest_times: &RestTimes,
) -> Option<NextExercisePrediction> {
    let sessions = parse_history_into_sessions(history);
    let Some(last_session) = sessions.last() else {
        tracing::debug!("No history yet, nothing to predict");
        return None;
    };
    let first = last_session.sets.first()?;

    Some(NextExercisePrediction {
        ex_id: first.ex_id.clone(),
        kg: first.kg,
        reps: first.reps,
        rest: get_default_rest(history, &first.ex_id, rest_times),
        reason: PredictionReason::SessionStart {
            session_ts: last_session.started_at(),
        },
    })
}

/// Smallest repeating block explaining the tail of `order`
///
/// Returns `(anchor, block_len)`: the block is `order[anchor..anchor + block_len]`
/// and everything from `anchor` on repeats it. The anchor walks back from the
/// end for as long as the repetition holds, so whatever came before the break
/// (a warm-up, an earlier circuit) is ignored rather than rejecting the block.
fn find_cycle(order: &[&str]) -> Option<(usize, usize)> {
    let n = order.len();

    for block_len in 2..n {
        let mut anchor = n - block_len;
        while anchor > 0 && order[anchor - 1] == order[anchor - 1 + block_len] {
            anchor -= 1;
        }

        // At least one element past the first block must confirm the repeat
        if n - anchor > block_len {
            return Some((anchor, block_len));
        }
    }

    None
}

fn predict_cycle(ctx: &PredictionContext<'_>) -> Option<NextExercisePrediction> {
    let (anchor, block_len) = find_cycle(&ctx.exercise_order)?;
    let position = (ctx.exercise_order.len() - anchor) % block_len;
    let ex_id = ctx.exercise_order[anchor + position];

    let last = ctx
        .current_sets
        .iter()
        .rev()
        .copied()
        .find(|set| set.ex_id == ex_id)
        .or_else(|| get_last_set(ctx.history, ex_id))?;

    let pattern = ctx.exercise_order[anchor..anchor + block_len]
        .iter()
        .map(|ex| ex.to_string())
        .collect();

    Some(ctx.prediction(
        ex_id,
        last.values(),
        PredictionReason::Cycle { pattern, position },
    ))
}

fn predict_current_trend(ctx: &PredictionContext<'_>) -> Option<NextExercisePrediction> {
    let trend = predict_drop_set_trend(&ctx.current_sets, ctx.last_ex_id)?;
    Some(ctx.trend_prediction(ctx.last_ex_id, trend))
}

fn predict_history_dropset(ctx: &PredictionContext<'_>) -> Option<NextExercisePrediction> {
    let ex_id = ctx.last_ex_id;
    let done = ctx.session_sets_of(ex_id);
    let first = done.first()?;

    for session in ctx.completed_sessions.iter().rev() {
        let blocks = session
            .sets
            .chunk_by(|a, b| a.ex_id == b.ex_id)
            .filter(|block| block.len() >= 2 && block[0].ex_id == ex_id);

        for block in blocks {
            if !same_values(block[0], first) || done.len() >= block.len() {
                continue;
            }

            let next = block[done.len()];
            return Some(ctx.prediction(
                ex_id,
                next.values(),
                PredictionReason::HistoryDropset {
                    session_ts: session.started_at(),
                    set_index: done.len(),
                    block_len: block.len(),
                    difficulty: next.difficulty,
                },
            ));
        }
    }

    None
}

/// Exact match on weight and reps
#[allow(clippy::float_cmp)]
fn same_values(a: &SetEntry, b: &SetEntry) -> bool {
    a.kg == b.kg && a.reps == b.reps
}

fn predict_history_sequence(ctx: &PredictionContext<'_>) -> Option<NextExercisePrediction> {
    let mut prefix: Vec<&str> = Vec::new();
    for ex in ctx.exercise_order.iter().copied() {
        if !prefix.contains(&ex) {
            prefix.push(ex);
        }
    }

    let session = ctx.completed_sessions.iter().rev().find(|session| {
        session.exercise_sequence.len() > prefix.len()
            && session.exercise_sequence.starts_with(&prefix)
    })?;

    let next_ex = session.exercise_sequence[prefix.len()];
    let first = session.sets.iter().copied().find(|set| set.ex_id == next_ex)?;

    Some(ctx.prediction(
        next_ex,
        first.values(),
        PredictionReason::HistorySequence {
            session_ts: session.started_at(),
            after: prefix.last().map(|ex| ex.to_string()).unwrap_or_default(),
        },
    ))
}

fn predict_continue(ctx: &PredictionContext<'_>) -> Option<NextExercisePrediction> {
    let done = ctx.session_sets_of(ctx.last_ex_id);
    let last = done.last()?;
    Some(ctx.prediction(
        ctx.last_ex_id,
        last.values(),
        PredictionReason::Continue {
            sets_done: done.len(),
        },
    ))
}

/// Predict the next set of a specific exercise
///
/// Unlike [`predict_next_exercise`], the target need not be the exercise the
/// user is likely to do next. Returns `None` when the exercise has never been
/// logged in this or any completed session.
pub fn predict_exercise_values(
    history: &[HistoryEntry],
    ex_id: &str,
    rest_times: &RestTimes,
) -> Option<NextExercisePrediction> {
    if let Some(ctx) = PredictionContext::new(history, rest_times) {
        let last_index = ctx.current_sets.iter().rposition(|set| set.ex_id == ex_id);

        if let Some(last_index) = last_index {
            if let Some(prediction) = predict_next_exercise(history, rest_times) {
                if prediction.ex_id == ex_id {
                    return Some(prediction);
                }
            }

            // Most recent contiguous run of the exercise in this session
            if let Some(trend) = predict_drop_set_trend(&ctx.current_sets[..=last_index], ex_id)
            {
                return Some(ctx.trend_prediction(ex_id, trend));
            }

            let last = ctx.current_sets[last_index];
            return Some(ctx.prediction(
                ex_id,
                last.values(),
                PredictionReason::Continue {
                    sets_done: ctx.session_sets_of(ex_id).len(),
                },
            ));
        }
    }

    let sessions = parse_history_into_sessions(history);
    let session = find_last_session_with(&sessions, ex_id)?;
    let pattern: Vec<&SetEntry> = session
        .sets
        .iter()
        .copied()
        .filter(|set| set.ex_id == ex_id)
        .collect();
    let first = pattern.first()?;

    let reason = if pattern.len() >= 2 {
        PredictionReason::HistoryDropsetStart {
            pattern: pattern.iter().map(|set| set.values()).collect(),
        }
    } else {
        PredictionReason::Start {
            logged_at: first.ts,
        }
    };

    Some(NextExercisePrediction {
        ex_id: ex_id.to_string(),
        kg: first.kg,
        reps: first.reps,
        rest: get_default_rest(history, ex_id, rest_times),
        reason,
    })
}
