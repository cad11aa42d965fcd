//! Workout session state machine.
//!
//! ```text
//! NoActiveSession --start--> InProgress --last set logged--> Completed
//!                                 |
//!                                 +--cancel--> (removed)
//! ```
//!
//! Every function here mutates a `TrackerState` in place and nothing else.
//! Callers get all-or-nothing behaviour by running them against a working
//! copy and persisting it only on success (see `tracker`).

use crate::config::ProgressionConfig;
use crate::progression::{self, ProgressionChange};
use crate::rotation::Rotation;
use crate::{
    Catalog, Error, Exercise, Result, Session, SetEntry, SetLog, Step, TrackerState, Workout,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Outcome of completing a session
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub session_id: Uuid,
    pub progressions: Vec<ProgressionChange>,
    /// Workout the rotation points at after advancing
    pub next_workout_id: String,
}

/// A persisted set plus the completion it triggered, if it was the last one
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedSet {
    pub set: SetLog,
    pub completion: Option<Completion>,
}

/// Open a new session for `workout_id`
pub fn start(
    state: &mut TrackerState,
    catalog: &Catalog,
    workout_id: &str,
    now: DateTime<Utc>,
) -> Result<Session> {
    if let Some(active) = state.app.active_session_id {
        return Err(Error::conflict(format!(
            "session {} is already in progress",
            active
        )));
    }
    let workout = catalog.workout(workout_id)?;

    let session = Session {
        id: Uuid::new_v4(),
        workout_id: workout.id.clone(),
        started_at: now,
        completed_at: None,
        sets: Vec::new(),
    };
    state.sessions.push(session.clone());
    state.app.active_session_id = Some(session.id);

    tracing::info!("Started {} session {}", workout.id, session.id);
    Ok(session)
}

/// Next exercise and set number, or `None` once every target is met
///
/// Walks the workout's exercises in catalog order and returns the first one
/// with fewer logged sets than its target.
pub fn current_step<'c>(
    state: &TrackerState,
    catalog: &'c Catalog,
    session_id: Uuid,
) -> Result<Option<Step<'c>>> {
    let session = state
        .session(session_id)
        .ok_or_else(|| Error::not_found(format!("session {}", session_id)))?;
    let workout = catalog.workout(&session.workout_id)?;
    let total_sets = workout.total_sets();

    Ok(next_exercise(workout, session).map(|exercise| Step {
        exercise,
        set_number: session.logged_count(&exercise.id) as u32 + 1,
        completed_sets: session.sets.len(),
        total_sets,
    }))
}

/// First exercise, in catalog order, still short of its target set count
fn next_exercise<'w>(workout: &'w Workout, session: &Session) -> Option<&'w Exercise> {
    workout
        .exercises
        .iter()
        .find(|e| session.logged_count(&e.id) < e.sets as usize)
}

/// Append a set to the active session
///
/// Side effects, applied together: the set is stored, the exercise's
/// suggested weight becomes `entry.weight`, and if this was the session's
/// final required set the session is completed.
pub fn log_set(
    state: &mut TrackerState,
    catalog: &Catalog,
    config: &ProgressionConfig,
    session_id: Uuid,
    entry: SetEntry,
    now: DateTime<Utc>,
) -> Result<LoggedSet> {
    let session = state
        .session(session_id)
        .ok_or_else(|| Error::not_found(format!("session {}", session_id)))?;
    if session.is_completed() || state.app.active_session_id != Some(session_id) {
        return Err(Error::conflict(format!(
            "session {} is not the active session",
            session_id
        )));
    }

    let workout = catalog.workout(&session.workout_id)?;
    let exercise = workout.exercise(&entry.exercise_id).ok_or_else(|| {
        Error::not_found(format!(
            "exercise '{}' in workout '{}'",
            entry.exercise_id, workout.id
        ))
    })?;

    if !entry.weight.is_finite() || entry.weight < 0.0 {
        return Err(Error::validation(format!(
            "weight must be a non-negative number, got {}",
            entry.weight
        )));
    }
    if entry.reps < 0 {
        return Err(Error::validation(format!(
            "reps must be non-negative, got {}",
            entry.reps
        )));
    }
    if entry.set_number == 0 || entry.set_number > exercise.sets {
        return Err(Error::validation(format!(
            "set {} is out of range for '{}' (1..={})",
            entry.set_number, exercise.id, exercise.sets
        )));
    }

    // The entry must be exactly the step current_step would hand out
    let logged_for_exercise = session.logged_count(&exercise.id) as u32;
    if entry.set_number <= logged_for_exercise {
        return Err(Error::validation(format!(
            "set {} of '{}' is already logged",
            entry.set_number, exercise.id
        )));
    }
    if let Some(expected) = next_exercise(workout, session) {
        if expected.id != exercise.id {
            return Err(Error::validation(format!(
                "'{}' is not next; log set {} of '{}' first",
                exercise.id,
                session.logged_count(&expected.id) + 1,
                expected.id
            )));
        }
    }
    if entry.set_number != logged_for_exercise + 1 {
        return Err(Error::validation(format!(
            "expected set {} of '{}', got set {}",
            logged_for_exercise + 1,
            exercise.id,
            entry.set_number
        )));
    }

    let required = workout.total_sets();
    let set = SetLog {
        id: Uuid::new_v4(),
        session_id,
        exercise_id: exercise.id.clone(),
        set_number: entry.set_number,
        weight: entry.weight,
        reps: entry.reps,
        logged_at: now,
        duration_seconds: entry.duration_seconds,
    };

    let logged = {
        let session = state
            .session_mut(session_id)
            .ok_or_else(|| Error::not_found(format!("session {}", session_id)))?;
        session.sets.push(set.clone());
        session.sets.len()
    };
    progression::record_set_weight(&mut state.progressions, &set.exercise_id, set.weight, now);

    tracing::debug!(
        "Logged {} set {} ({} x {}), {}/{} in session",
        set.exercise_id,
        set.set_number,
        set.weight,
        set.reps,
        logged,
        required
    );

    let completion = if logged >= required {
        Some(complete(state, catalog, config, session_id, now)?)
    } else {
        None
    };

    Ok(LoggedSet { set, completion })
}

/// Close a session: stamp it, run the progression rule, advance the rotation
pub fn complete(
    state: &mut TrackerState,
    catalog: &Catalog,
    config: &ProgressionConfig,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Completion> {
    let session = state
        .sessions
        .iter_mut()
        .find(|s| s.id == session_id)
        .ok_or_else(|| Error::not_found(format!("session {}", session_id)))?;
    if session.is_completed() {
        return Err(Error::conflict(format!(
            "session {} is already completed",
            session_id
        )));
    }
    session.completed_at = Some(now);

    let workout = catalog.workout(&session.workout_id)?;
    let changes = progression::apply_progression(
        workout,
        session,
        &mut state.progressions,
        config,
        now,
    );

    let rotation = Rotation::new(catalog);
    rotation.advance(&mut state.app)?;
    if state.app.active_session_id == Some(session_id) {
        state.app.active_session_id = None;
    }
    let next = rotation.peek_next(&state.app)?;

    tracing::info!(
        "Completed {} session {}; {} exercise(s) progressed, next up {}",
        workout.id,
        session_id,
        changes.len(),
        next.id
    );

    Ok(Completion {
        session_id,
        progressions: changes,
        next_workout_id: next.id.clone(),
    })
}

/// Discard the active session and every set logged in it
pub fn cancel(state: &mut TrackerState, session_id: Uuid) -> Result<Session> {
    if state.app.active_session_id != Some(session_id) {
        return Err(Error::conflict(format!(
            "session {} is not the active session",
            session_id
        )));
    }

    let position = state.sessions.iter().position(|s| s.id == session_id);
    state.app.active_session_id = None;

    match position {
        Some(idx) => {
            let removed = state.sessions.remove(idx);
            tracing::info!(
                "Canceled {} session {} ({} set(s) discarded)",
                removed.workout_id,
                removed.id,
                removed.sets.len()
            );
            Ok(removed)
        }
        None => Err(Error::not_found(format!("session {}", session_id))),
    }
}
