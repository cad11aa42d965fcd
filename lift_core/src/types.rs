//! Core domain types for the lift tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and workouts (catalog-owned, immutable)
//! - Sessions and the sets logged inside them
//! - Per-exercise progression and body-weight entries
//! - The persisted tracker state that ties them together

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

// ============================================================================
// Catalog Types
// ============================================================================

/// Type of exercise; decides the progression increment
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Compound,
    Isolation,
}

/// An exercise definition (e.g., "Smith Squat", 4 sets of 6-10)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Target number of sets per session
    pub sets: u32,
    pub min_reps: i32,
    pub max_reps: i32,
    pub kind: ExerciseType,
    /// Unilateral work: reps are counted per side
    pub per_side: bool,
    /// Starting weight before anything has been logged
    pub default_weight: Option<f64>,
}

/// A workout: an ordered list of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    /// Sum of target sets over every exercise
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets as usize).sum()
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }
}

/// The complete catalog of workouts, their exercises, and the rotation order
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub workouts: HashMap<String, Workout>,
    /// Cyclic rotation of workout ids
    pub sequence: Vec<String>,
}

// ============================================================================
// Session Types
// ============================================================================

/// One performed set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetLog {
    pub id: Uuid,
    pub session_id: Uuid,
    pub exercise_id: String,
    /// 1-based ordinal within the exercise
    pub set_number: u32,
    pub weight: f64,
    pub reps: i32,
    pub logged_at: DateTime<Utc>,
    pub duration_seconds: Option<u32>,
}

/// Caller-supplied values for a set about to be logged
#[derive(Clone, Debug, PartialEq)]
pub struct SetEntry {
    pub exercise_id: String,
    pub set_number: u32,
    pub weight: f64,
    pub reps: i32,
    pub duration_seconds: Option<u32>,
}

/// One instance of performing a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub workout_id: String,
    pub started_at: DateTime<Utc>,
    /// `None` while the session is in progress
    pub completed_at: Option<DateTime<Utc>>,
    /// Sets in log order, which is also chronological order
    pub sets: Vec<SetLog>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Sets logged for one exercise, in log order
    pub fn sets_for<'a>(&'a self, exercise_id: &'a str) -> impl Iterator<Item = &'a SetLog> + 'a {
        self.sets.iter().filter(move |s| s.exercise_id == exercise_id)
    }

    pub fn logged_count(&self, exercise_id: &str) -> usize {
        self.sets_for(exercise_id).count()
    }
}

/// What to do next inside a session
#[derive(Clone, Debug, PartialEq)]
pub struct Step<'a> {
    pub exercise: &'a Exercise,
    /// 1-based set number to log next
    pub set_number: u32,
    pub completed_sets: usize,
    pub total_sets: usize,
}

// ============================================================================
// Progression and Body Weight
// ============================================================================

/// Suggested working weight for an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseProgression {
    pub exercise_id: String,
    pub current_weight: f64,
    pub last_updated: DateTime<Utc>,
}

/// A body-weight measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BodyWeightEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub weight: f64,
}

// ============================================================================
// Persisted State
// ============================================================================

/// Singleton application state: rotation pointer and active session
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct AppState {
    pub next_workout_index: usize,
    pub active_session_id: Option<Uuid>,
}

/// Everything the tracker persists, saved and loaded as one unit
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct TrackerState {
    #[serde(default)]
    pub app: AppState,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub progressions: BTreeMap<String, ExerciseProgression>,
    #[serde(default)]
    pub body_weights: Vec<BodyWeightEntry>,
}

impl TrackerState {
    pub fn session(&self, id: Uuid) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_mut(&mut self, id: Uuid) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// The in-flight session, if `active_session_id` points at one
    pub fn active_session(&self) -> Option<&Session> {
        self.app.active_session_id.and_then(|id| self.session(id))
    }
}
