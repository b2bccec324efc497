//! History segmentation and lookup.
//!
//! The history log is split into sessions by `SessionEnd` markers. The run
//! after the last marker is the open (current) session; every earlier
//! non-empty run is a completed session.

use crate::{HistoryEntry, ParsedSession, RestTimes, SetEntry};

/// Rest suggested when neither an override nor a logged rest exists
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Sets logged after the last session-end marker, in log order
pub fn get_current_session_sets(history: &[HistoryEntry]) -> Vec<&SetEntry> {
    let mut sets: Vec<&SetEntry> = history
        .iter()
        .rev()
        .take_while(|entry| !entry.is_session_end())
        .filter_map(HistoryEntry::as_set)
        .collect();
    sets.reverse();
    sets
}

/// Split the log into completed sessions, oldest first
///
/// The trailing open session is never included, and empty runs between
/// consecutive markers are dropped.
pub fn parse_history_into_sessions(history: &[HistoryEntry]) -> Vec<ParsedSession<'_>> {
    let mut sessions = Vec::new();
    let mut pending: Vec<&SetEntry> = Vec::new();

    for entry in history {
        match entry {
            HistoryEntry::Set(set) => pending.push(set),
            HistoryEntry::SessionEnd(_) => {
                if !pending.is_empty() {
                    sessions.push(build_session(std::mem::take(&mut pending)));
                }
            }
        }
    }

    sessions
}

fn build_session(sets: Vec<&SetEntry>) -> ParsedSession<'_> {
    let mut exercise_sequence: Vec<&str> = Vec::new();
    for set in sets.iter().copied() {
        if !exercise_sequence.contains(&set.ex_id.as_str()) {
            exercise_sequence.push(set.ex_id.as_str());
        }
    }
    ParsedSession {
        sets,
        exercise_sequence,
    }
}

/// Most recent set of `ex_id` anywhere in the log
pub fn get_last_set<'a>(history: &'a [HistoryEntry], ex_id: &str) -> Option<&'a SetEntry> {
    history
        .iter()
        .rev()
        .filter_map(HistoryEntry::as_set)
        .find(|set| set.ex_id == ex_id)
}

/// Rest to suggest for `ex_id`
///
/// Lookup order: the override map, then the most recent logged `rest` for
/// the exercise, then [`DEFAULT_REST_SECONDS`].
pub fn get_default_rest(history: &[HistoryEntry], ex_id: &str, rest_times: &RestTimes) -> u32 {
    if let Some(&rest) = rest_times.get(ex_id) {
        return rest;
    }

    history
        .iter()
        .rev()
        .filter_map(HistoryEntry::as_set)
        .filter(|set| set.ex_id == ex_id)
        .find_map(|set| set.rest)
        .unwrap_or(DEFAULT_REST_SECONDS)
}

/// The most recent completed session that contains `ex_id` at all
///
/// Sessions without the exercise are skipped rather than ending the search.
pub fn find_last_session_with<'s, 'a>(
    sessions: &'s [ParsedSession<'a>],
    ex_id: &str,
) -> Option<&'s ParsedSession<'a>> {
    sessions
        .iter()
        .rev()
        .find(|session| session.exercise_sequence.contains(&ex_id))
}

/// First set of `ex_id` in the most recent completed session that has it
pub fn get_first_set_of_last_session<'a>(
    history: &'a [HistoryEntry],
    ex_id: &str,
) -> Option<&'a SetEntry> {
    let sessions = parse_history_into_sessions(history);
    find_last_session_with(&sessions, ex_id)
        .and_then(|session| session.sets.iter().copied().find(|set| set.ex_id == ex_id))
}

/// Every set of `ex_id` in the most recent completed session that has it
///
/// Returns an empty vector when the exercise was never completed.
pub fn get_exercise_pattern_from_last_session<'a>(
    history: &'a [HistoryEntry],
    ex_id: &str,
) -> Vec<&'a SetEntry> {
    let sessions = parse_history_into_sessions(history);
    find_last_session_with(&sessions, ex_id)
        .map(|session| {
            session
                .sets
                .iter()
                .copied()
                .filter(|set| set.ex_id == ex_id)
                .collect()
        })
        .unwrap_or_default()
}
