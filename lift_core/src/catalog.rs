//! Default catalog of workouts, exercises and the rotation order.
//!
//! The catalog is compiled in. It is built once into id-keyed maps and never
//! mutated afterwards.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Suggested weight for an exercise with no history and no listed default
pub const FALLBACK_WEIGHT: f64 = 20.0;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for tests that need an owned copy.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(
    id: &str,
    name: &str,
    sets: u32,
    reps: (i32, i32),
    kind: ExerciseType,
    default_weight: f64,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        sets,
        min_reps: reps.0,
        max_reps: reps.1,
        kind,
        per_side: false,
        default_weight: Some(default_weight),
    }
}

fn per_side(mut exercise: Exercise) -> Exercise {
    exercise.per_side = true;
    exercise
}

fn build_default_catalog_internal() -> Catalog {
    use ExerciseType::{Compound, Isolation};

    let workouts = vec![
        Workout {
            id: "upper-a".into(),
            name: "Upper A".into(),
            exercises: vec![
                exercise("incline-db-press", "Incline DB Press", 4, (6, 10), Compound, 65.0),
                exercise("flat-db-bench", "Flat DB Bench", 3, (8, 12), Compound, 65.0),
                exercise("seated-db-shoulder-press", "Seated DB Shoulder Press", 3, (8, 10), Compound, 45.0),
                exercise("cable-lateral-raise-a", "Cable Lateral Raise", 4, (12, 20), Isolation, 20.0),
                exercise("cable-triceps-pushdown", "Cable Triceps Pushdown", 3, (10, 15), Isolation, 45.0),
                exercise("overhead-triceps-extension", "Overhead Triceps Extension", 3, (12, 15), Isolation, 35.0),
            ],
        },
        Workout {
            id: "lower-a".into(),
            name: "Lower A".into(),
            exercises: vec![
                exercise("smith-squat", "Smith Squat", 4, (6, 10), Compound, 135.0),
                exercise("db-romanian-deadlift", "DB Romanian Deadlift", 3, (8, 12), Compound, 55.0),
                per_side(exercise("walking-lunges", "Walking Lunges", 3, (10, 12), Compound, 35.0)),
                exercise("standing-calf-raise", "Standing Calf Raise", 4, (12, 20), Isolation, 90.0),
                exercise("core-a", "Core", 3, (1, 1), Isolation, 0.0),
            ],
        },
        Workout {
            id: "upper-b".into(),
            name: "Upper B".into(),
            exercises: vec![
                exercise("neutral-pulldown", "Neutral Pulldown", 4, (8, 12), Compound, 110.0),
                per_side(exercise("single-arm-db-row", "Single-Arm DB Row", 3, (8, 12), Compound, 55.0)),
                exercise("cable-face-pull", "Cable Face Pull", 4, (12, 20), Isolation, 35.0),
                exercise("incline-db-curl", "Incline DB Curl", 3, (10, 15), Isolation, 20.0),
                exercise("cable-lateral-raise-b", "Cable Lateral Raise", 3, (15, 20), Isolation, 20.0),
                exercise("hammer-curl", "Hammer Curl", 3, (10, 14), Isolation, 25.0),
            ],
        },
        Workout {
            id: "lower-b".into(),
            name: "Lower B".into(),
            exercises: vec![
                exercise("smith-rdl", "Smith RDL", 4, (6, 10), Compound, 115.0),
                exercise("goblet-squat", "Goblet Squat", 3, (10, 12), Compound, 45.0),
                exercise("hip-thrust", "Hip Thrust", 3, (8, 12), Compound, 90.0),
                exercise("seated-calf-raise", "Seated Calf Raise", 4, (12, 20), Isolation, 70.0),
                exercise("core-b", "Core", 3, (1, 1), Isolation, 0.0),
            ],
        },
    ];

    let sequence = workouts.iter().map(|w| w.id.clone()).collect();
    Catalog::from_workouts(workouts, sequence)
}

impl Catalog {
    /// Index a list of workouts by id
    ///
    /// Later duplicates overwrite earlier ones; run `validate()` to catch them.
    pub fn from_workouts(workouts: Vec<Workout>, sequence: Vec<String>) -> Self {
        let mut exercises = HashMap::new();
        let mut by_id = HashMap::new();

        for workout in workouts {
            for ex in &workout.exercises {
                exercises.insert(ex.id.clone(), ex.clone());
            }
            by_id.insert(workout.id.clone(), workout);
        }

        Catalog {
            exercises,
            workouts: by_id,
            sequence,
        }
    }

    pub fn workout(&self, id: &str) -> Result<&Workout> {
        self.workouts
            .get(id)
            .ok_or_else(|| Error::not_found(format!("workout '{}'", id)))
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    /// Catalog default weight, or `FALLBACK_WEIGHT` when none is listed
    pub fn default_weight(&self, exercise_id: &str) -> f64 {
        self.exercise(exercise_id)
            .and_then(|e| e.default_weight)
            .unwrap_or(FALLBACK_WEIGHT)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sequence.is_empty() {
            errors.push("Rotation sequence is empty".to_string());
        }
        for id in &self.sequence {
            if !self.workouts.contains_key(id) {
                errors.push(format!("Rotation references non-existent workout '{}'", id));
            }
        }

        let mut seen_exercises = HashSet::new();
        let total_exercises: usize = self.workouts.values().map(|w| w.exercises.len()).sum();
        if total_exercises != self.exercises.len() {
            errors.push(format!(
                "Exercise ids are not unique across workouts ({} listed, {} distinct)",
                total_exercises,
                self.exercises.len()
            ));
        }

        for (id, workout) in &self.workouts {
            if id.is_empty() || workout.id.is_empty() {
                errors.push("Workout has empty ID".to_string());
            }
            if id != &workout.id {
                errors.push(format!(
                    "Workout key '{}' doesn't match workout.id '{}'",
                    id, workout.id
                ));
            }
            if workout.name.is_empty() {
                errors.push(format!("Workout '{}' has empty name", id));
            }
            if workout.exercises.is_empty() {
                errors.push(format!("Workout '{}' has no exercises", id));
            }

            let mut in_workout = HashSet::new();
            for ex in &workout.exercises {
                seen_exercises.insert(ex.id.as_str());
                if !in_workout.insert(ex.id.as_str()) {
                    errors.push(format!(
                        "Workout '{}' lists exercise '{}' twice",
                        id, ex.id
                    ));
                }
                if ex.id.is_empty() {
                    errors.push(format!("Workout '{}' has an exercise with empty ID", id));
                }
                if ex.sets == 0 {
                    errors.push(format!("Exercise '{}' has zero target sets", ex.id));
                }
                if ex.min_reps < 0 {
                    errors.push(format!(
                        "Exercise '{}': min reps {} is negative",
                        ex.id, ex.min_reps
                    ));
                }
                if ex.min_reps > ex.max_reps {
                    errors.push(format!(
                        "Exercise '{}': min reps {} > max {}",
                        ex.id, ex.min_reps, ex.max_reps
                    ));
                }
                if let Some(w) = ex.default_weight {
                    if !w.is_finite() || w < 0.0 {
                        errors.push(format!(
                            "Exercise '{}': invalid default weight {}",
                            ex.id, w
                        ));
                    }
                }
            }
        }

        for id in self.exercises.keys() {
            if !seen_exercises.contains(id.as_str()) {
                errors.push(format!("Exercise '{}' belongs to no workout", id));
            }
        }

        errors
    }
}
