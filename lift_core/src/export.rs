//! CSV export of completed training history and body weight.
//!
//! Each file is written to a temp file in the target directory, synced, and
//! renamed into place, so a reader never sees a half-written export.

use crate::{BodyWeightEntry, Result, Session, SetLog, TrackerState};
use serde::Serialize;
use std::path::Path;
use tempfile::NamedTempFile;

pub const SETS_FILE: &str = "sets.csv";
pub const BODY_WEIGHT_FILE: &str = "body_weight.csv";

/// A row in `sets.csv`
#[derive(Debug, Serialize)]
struct SetRow {
    session_id: String,
    workout_id: String,
    exercise_id: String,
    set_number: u32,
    weight: f64,
    reps: i32,
    duration_seconds: Option<u32>,
    logged_at: String,
}

impl SetRow {
    fn new(session: &Session, set: &SetLog) -> Self {
        SetRow {
            session_id: session.id.to_string(),
            workout_id: session.workout_id.clone(),
            exercise_id: set.exercise_id.clone(),
            set_number: set.set_number,
            weight: set.weight,
            reps: set.reps,
            duration_seconds: set.duration_seconds,
            logged_at: set.logged_at.to_rfc3339(),
        }
    }
}

/// A row in `body_weight.csv`
#[derive(Debug, Serialize)]
struct BodyWeightRow {
    recorded_at: String,
    weight: f64,
}

impl From<&BodyWeightEntry> for BodyWeightRow {
    fn from(entry: &BodyWeightEntry) -> Self {
        BodyWeightRow {
            recorded_at: entry.recorded_at.to_rfc3339(),
            weight: entry.weight,
        }
    }
}

/// Row counts written by `export_csv`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub sets: usize,
    pub body_weights: usize,
}

/// Write `sets.csv` (completed sessions only) and `body_weight.csv` into `dir`
pub fn export_csv(state: &TrackerState, dir: &Path) -> Result<ExportSummary> {
    std::fs::create_dir_all(dir)?;

    let mut completed: Vec<&Session> = state.sessions.iter().filter(|s| s.is_completed()).collect();
    completed.sort_by_key(|s| s.started_at);
    let set_rows: Vec<SetRow> = completed
        .iter()
        .flat_map(|session| session.sets.iter().map(move |set| SetRow::new(session, set)))
        .collect();

    let mut weights: Vec<&BodyWeightEntry> = state.body_weights.iter().collect();
    weights.sort_by_key(|e| e.recorded_at);
    let weight_rows: Vec<BodyWeightRow> = weights.into_iter().map(BodyWeightRow::from).collect();

    write_rows(&dir.join(SETS_FILE), &set_rows)?;
    write_rows(&dir.join(BODY_WEIGHT_FILE), &weight_rows)?;

    tracing::info!(
        "Exported {} sets and {} body-weight entries to {:?}",
        set_rows.len(),
        weight_rows.len(),
        dir
    );

    Ok(ExportSummary {
        sets: set_rows.len(),
        body_weights: weight_rows.len(),
    })
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(parent)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(temp.as_file());
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| crate::Error::Io(e.error))?;
    tracing::debug!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn state_with_history() -> TrackerState {
        let mut state = TrackerState::default();
        for (completed, exercise) in [(true, "smith-squat"), (false, "incline-db-press")] {
            let id = Uuid::new_v4();
            let started_at = Utc::now() - Duration::hours(2);
            state.sessions.push(Session {
                id,
                workout_id: "lower-a".into(),
                started_at,
                completed_at: completed.then(Utc::now),
                sets: vec![SetLog {
                    id: Uuid::new_v4(),
                    session_id: id,
                    exercise_id: exercise.into(),
                    set_number: 1,
                    weight: 135.0,
                    reps: 8,
                    logged_at: started_at,
                    duration_seconds: Some(45),
                }],
            });
        }
        state.body_weights.push(BodyWeightEntry {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            weight: 180.0,
        });
        state
    }

    #[test]
    fn test_export_writes_completed_sets_and_weights() {
        let temp_dir = tempfile::tempdir().unwrap();
        let out = temp_dir.path().join("export");

        let summary = export_csv(&state_with_history(), &out).unwrap();
        assert_eq!(summary, ExportSummary { sets: 1, body_weights: 1 });

        let sets = std::fs::read_to_string(out.join(SETS_FILE)).unwrap();
        let mut lines = sets.lines();
        assert_eq!(
            lines.next().unwrap(),
            "session_id,workout_id,exercise_id,set_number,weight,reps,duration_seconds,logged_at"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("lower-a,smith-squat,1,135.0,8,45,"));
        assert!(lines.next().is_none());

        let weights = std::fs::read_to_string(out.join(BODY_WEIGHT_FILE)).unwrap();
        assert!(weights.starts_with("recorded_at,weight"));
    }

    #[test]
    fn test_export_empty_state_still_creates_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let summary = export_csv(&TrackerState::default(), temp_dir.path()).unwrap();
        assert_eq!(summary, ExportSummary { sets: 0, body_weights: 0 });
        assert!(temp_dir.path().join(SETS_FILE).exists());
        assert!(temp_dir.path().join(BODY_WEIGHT_FILE).exists());
    }
}
