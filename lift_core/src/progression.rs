//! Weight progression and suggestion.
//!
//! Two writers touch `ExerciseProgression`:
//! - every logged set overwrites the suggestion with the weight just used
//! - a completed session bumps it when every set of an exercise hit the top
//!   of its rep range
//!
//! The rule is additive only. A lower suggestion only ever comes from the
//! user logging a lighter set.

use crate::config::ProgressionConfig;
use crate::{Catalog, ExerciseProgression, ExerciseType, Session, SetLog, TrackerState, Workout};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// An increase applied at session completion
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionChange {
    pub exercise_id: String,
    pub from: f64,
    pub to: f64,
}

/// Increment for one exercise type
pub fn increment_for(kind: ExerciseType, config: &ProgressionConfig) -> f64 {
    match kind {
        ExerciseType::Compound => config.compound_increment,
        ExerciseType::Isolation => config.isolation_increment,
    }
}

/// Weight the next session's increase is based on.
///
/// This is the first set logged for the exercise, i.e. the planned working
/// weight. Do not swap it for the heaviest set: back-off or ramped sets
/// would then inflate the next session's target.
pub fn working_weight<'a>(mut sets: impl Iterator<Item = &'a SetLog>) -> Option<f64> {
    sets.next().map(|s| s.weight)
}

/// Overwrite the suggestion with the weight of the set just logged
pub fn record_set_weight(
    progressions: &mut BTreeMap<String, ExerciseProgression>,
    exercise_id: &str,
    weight: f64,
    now: DateTime<Utc>,
) {
    progressions
        .entry(exercise_id.to_string())
        .and_modify(|p| {
            p.current_weight = weight;
            p.last_updated = now;
        })
        .or_insert_with(|| ExerciseProgression {
            exercise_id: exercise_id.to_string(),
            current_weight: weight,
            last_updated: now,
        });
}

/// Run the post-completion rule over a finished session
///
/// Exercises are visited in workout order. Exercises with no sets in the
/// session are skipped.
pub fn apply_progression(
    workout: &Workout,
    session: &Session,
    progressions: &mut BTreeMap<String, ExerciseProgression>,
    config: &ProgressionConfig,
    now: DateTime<Utc>,
) -> Vec<ProgressionChange> {
    let mut changes = Vec::new();

    for exercise in &workout.exercises {
        let Some(basis) = working_weight(session.sets_for(&exercise.id)) else {
            continue;
        };

        let all_hit_top_reps = session
            .sets_for(&exercise.id)
            .all(|s| s.reps >= exercise.max_reps);

        if !all_hit_top_reps {
            tracing::debug!(
                "No progression for {}: not every set reached {} reps",
                exercise.id,
                exercise.max_reps
            );
            continue;
        }

        let new_weight = basis + increment_for(exercise.kind, config);
        record_set_weight(progressions, &exercise.id, new_weight, now);

        tracing::info!(
            "Progressed {}: {} -> {}",
            exercise.id,
            basis,
            new_weight
        );
        changes.push(ProgressionChange {
            exercise_id: exercise.id.clone(),
            from: basis,
            to: new_weight,
        });
    }

    changes
}

/// Weight to pre-fill for the next set of an exercise
///
/// Lookup order: progression row, then the most recently logged set, then the
/// catalog default, then `catalog::FALLBACK_WEIGHT`.
pub fn suggested_weight(catalog: &Catalog, state: &TrackerState, exercise_id: &str) -> f64 {
    if let Some(progression) = state.progressions.get(exercise_id) {
        return progression.current_weight;
    }

    let last_logged = state
        .sessions
        .iter()
        .flat_map(|s| s.sets_for(exercise_id))
        .max_by_key(|s| s.logged_at);

    match last_logged {
        Some(set) => set.weight,
        None => {
            if catalog.exercise(exercise_id).is_none() {
                tracing::warn!("Unknown exercise '{}', suggesting fallback weight", exercise_id);
            }
            catalog.default_weight(exercise_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{get_default_catalog, FALLBACK_WEIGHT};
    use chrono::Duration;
    use uuid::Uuid;

    fn set(session_id: Uuid, exercise_id: &str, n: u32, weight: f64, reps: i32, at: DateTime<Utc>) -> SetLog {
        SetLog {
            id: Uuid::new_v4(),
            session_id,
            exercise_id: exercise_id.into(),
            set_number: n,
            weight,
            reps,
            logged_at: at,
            duration_seconds: None,
        }
    }

    fn session_with(workout_id: &str, sets: &[(&str, f64, i32)]) -> Session {
        let id = Uuid::new_v4();
        let start = Utc::now() - Duration::hours(1);
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        let sets = sets
            .iter()
            .enumerate()
            .map(|(i, (ex, w, r))| {
                let n = counts.entry(*ex).or_insert(0);
                *n += 1;
                set(id, ex, *n, *w, *r, start + Duration::minutes(i as i64))
            })
            .collect();
        Session {
            id,
            workout_id: workout_id.into(),
            started_at: start,
            completed_at: Some(Utc::now()),
            sets,
        }
    }

    #[test]
    fn test_all_top_reps_compound_adds_five_to_first_set() {
        let catalog = get_default_catalog();
        let workout = catalog.workout("lower-a").unwrap();
        let session = session_with(
            "lower-a",
            &[
                ("smith-squat", 135.0, 10),
                ("smith-squat", 145.0, 10),
                ("smith-squat", 140.0, 11),
                ("smith-squat", 140.0, 10),
            ],
        );

        let mut progressions = BTreeMap::new();
        let changes = apply_progression(
            workout,
            &session,
            &mut progressions,
            &ProgressionConfig::default(),
            Utc::now(),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(progressions["smith-squat"].current_weight, 140.0);
        assert_eq!(changes[0].from, 135.0);
    }

    #[test]
    fn test_isolation_adds_two_and_a_half() {
        let catalog = get_default_catalog();
        let workout = catalog.workout("upper-a").unwrap();
        let session = session_with(
            "upper-a",
            &[
                ("cable-triceps-pushdown", 45.0, 15),
                ("cable-triceps-pushdown", 45.0, 15),
                ("cable-triceps-pushdown", 45.0, 16),
            ],
        );

        let mut progressions = BTreeMap::new();
        apply_progression(
            workout,
            &session,
            &mut progressions,
            &ProgressionConfig::default(),
            Utc::now(),
        );

        assert_eq!(progressions["cable-triceps-pushdown"].current_weight, 47.5);
    }

    #[test]
    fn test_one_short_set_blocks_progression() {
        let catalog = get_default_catalog();
        let workout = catalog.workout("lower-a").unwrap();
        let session = session_with(
            "lower-a",
            &[("smith-squat", 135.0, 10), ("smith-squat", 135.0, 9)],
        );

        let mut progressions = BTreeMap::new();
        record_set_weight(&mut progressions, "smith-squat", 135.0, Utc::now());

        let changes = apply_progression(
            workout,
            &session,
            &mut progressions,
            &ProgressionConfig::default(),
            Utc::now(),
        );

        assert!(changes.is_empty());
        assert_eq!(progressions["smith-squat"].current_weight, 135.0);
    }

    #[test]
    fn test_configured_increment_is_used() {
        let catalog = get_default_catalog();
        let workout = catalog.workout("lower-a").unwrap();
        let session = session_with("lower-a", &[("smith-squat", 100.0, 10)]);
        let config = ProgressionConfig {
            compound_increment: 10.0,
            isolation_increment: 1.0,
        };

        let mut progressions = BTreeMap::new();
        apply_progression(workout, &session, &mut progressions, &config, Utc::now());
        assert_eq!(progressions["smith-squat"].current_weight, 110.0);
    }

    #[test]
    fn test_record_set_weight_overwrites_even_when_lower() {
        let mut progressions = BTreeMap::new();
        let now = Utc::now();
        record_set_weight(&mut progressions, "hip-thrust", 100.0, now);
        record_set_weight(&mut progressions, "hip-thrust", 80.0, now + Duration::minutes(2));

        let p = &progressions["hip-thrust"];
        assert_eq!(p.current_weight, 80.0);
        assert_eq!(p.last_updated, now + Duration::minutes(2));
    }

    #[test]
    fn test_suggestion_prefers_progression_then_history_then_default() {
        let catalog = get_default_catalog();
        let mut state = TrackerState::default();

        assert_eq!(suggested_weight(catalog, &state, "smith-squat"), 135.0);
        assert_eq!(suggested_weight(catalog, &state, "unknown"), FALLBACK_WEIGHT);

        let earlier = session_with("lower-a", &[("smith-squat", 155.0, 8)]);
        let mut later = session_with("lower-a", &[("smith-squat", 150.0, 8)]);
        later.sets[0].logged_at = earlier.sets[0].logged_at + Duration::days(1);
        // Stored order must not matter, only log time
        state.sessions.push(later);
        state.sessions.push(earlier);
        assert_eq!(suggested_weight(catalog, &state, "smith-squat"), 150.0);

        record_set_weight(&mut state.progressions, "smith-squat", 160.0, Utc::now());
        assert_eq!(suggested_weight(catalog, &state, "smith-squat"), 160.0);
    }
}
