//! Read-only reporting over the tracker state.
//!
//! Nothing here mutates state. Scans follow log/date order so "first" and
//! "latest" mean chronologically first and last.

use crate::body_weight::{body_weight_stats, BodyWeightStats};
use crate::{Error, Result, Session, SetLog, TrackerState};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Lifetime numbers for one exercise
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExerciseStats {
    pub first_weight: f64,
    pub latest_weight: f64,
    pub max_weight: f64,
    pub total_sets: usize,
}

/// The all-time summary ("wrapped")
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WrappedReport {
    pub total_workouts: usize,
    pub total_sets: usize,
    pub exercise_stats: BTreeMap<String, ExerciseStats>,
    pub first_workout_date: Option<DateTime<Utc>>,
    pub last_workout_date: Option<DateTime<Utc>>,
    pub body_weight_stats: Option<BodyWeightStats>,
}

pub fn completed_workouts_count(state: &TrackerState) -> usize {
    state.sessions.iter().filter(|s| s.is_completed()).count()
}

/// Every stored set, including those of the in-progress session
pub fn total_sets_logged(state: &TrackerState) -> usize {
    state.sessions.iter().map(|s| s.sets.len()).sum()
}

/// Longest trailing window, in days, any query accepts
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Start of a trailing window of `days` ending at `now`
pub fn window_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(Error::validation(format!(
            "window must be between 1 and {} days, got {}",
            MAX_WINDOW_DAYS, days
        )));
    }
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| Error::validation(format!("{} days before {} is out of range", days, now)))
}

/// Completed sessions started within the trailing window, newest first
pub fn recent_progress(
    state: &TrackerState,
    window_days: i64,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<Vec<&Session>> {
    let cutoff = window_start(now, window_days)?;
    let mut sessions: Vec<_> = state
        .sessions
        .iter()
        .filter(|s| s.is_completed() && s.started_at >= cutoff)
        .collect();
    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    sessions.truncate(limit);
    Ok(sessions)
}

/// One forward scan over all sets ordered by log time
pub fn exercise_stats(state: &TrackerState) -> BTreeMap<String, ExerciseStats> {
    let mut sets: Vec<&SetLog> = state.sessions.iter().flat_map(|s| s.sets.iter()).collect();
    sets.sort_by_key(|s| s.logged_at);

    let mut stats: BTreeMap<String, ExerciseStats> = BTreeMap::new();
    for set in sets {
        let entry = stats
            .entry(set.exercise_id.clone())
            .or_insert_with(|| ExerciseStats {
                first_weight: set.weight,
                latest_weight: set.weight,
                max_weight: set.weight,
                total_sets: 0,
            });
        entry.latest_weight = set.weight;
        entry.max_weight = entry.max_weight.max(set.weight);
        entry.total_sets += 1;
    }
    stats
}

pub fn wrapped(state: &TrackerState) -> WrappedReport {
    let mut completed: Vec<&Session> = state.sessions.iter().filter(|s| s.is_completed()).collect();
    completed.sort_by_key(|s| s.started_at);

    WrappedReport {
        total_workouts: completed.len(),
        total_sets: total_sets_logged(state),
        exercise_stats: exercise_stats(state),
        first_workout_date: completed.first().map(|s| s.started_at),
        last_workout_date: completed.last().and_then(|s| s.completed_at),
        body_weight_stats: body_weight_stats(&state.body_weights),
    }
}
