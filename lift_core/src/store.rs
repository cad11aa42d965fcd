//! Tracker state persistence with file locking.
//!
//! The whole `TrackerState` is saved as one JSON document. A save either
//! fully replaces the previous file or leaves it untouched, which is what
//! gives each tracker operation its all-or-nothing behaviour.

use crate::{Error, Result, TrackerState};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage backend for the tracker state
pub trait StateStore {
    fn load(&self) -> Result<TrackerState>;
    fn save(&mut self, state: &TrackerState) -> Result<()>;
}

/// JSON file store with shared/exclusive locking and atomic replace
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    /// Load state with a shared lock
    ///
    /// Returns default state if the file doesn't exist. A file that exists but
    /// cannot be parsed is an error: resetting would silently drop history.
    fn load(&self) -> Result<TrackerState> {
        if !self.path.exists() {
            tracing::info!("No state file at {:?}, starting fresh", self.path);
            return Ok(TrackerState::default());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let state: TrackerState = serde_json::from_str(&contents).map_err(|e| {
            Error::State(format!("Failed to parse state file {:?}: {}", self.path, e))
        })?;

        if let Some(active) = state.app.active_session_id {
            if state.session(active).is_none() {
                return Err(Error::State(format!(
                    "active session {} is missing from {:?}",
                    active, self.path
                )));
            }
        }

        tracing::debug!(
            "Loaded state from {:?} ({} sessions)",
            self.path,
            state.sessions.len()
        );
        Ok(state)
    }

    /// Save state with an exclusive lock
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&mut self, state: &TrackerState) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::State(format!("state path {:?} has no parent", self.path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(state)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved state to {:?}", self.path);
        Ok(())
    }
}

/// In-memory store; can be switched to fail saves
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: TrackerState,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: TrackerState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Make every following `save` return an IO error
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<TrackerState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &TrackerState) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory store configured to fail",
            )));
        }
        self.state = state.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyWeightEntry, Session};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_state() -> TrackerState {
        let session = Session {
            id: Uuid::new_v4(),
            workout_id: "upper-a".into(),
            started_at: Utc::now(),
            completed_at: None,
            sets: vec![],
        };
        let mut state = TrackerState::default();
        state.app.next_workout_index = 2;
        state.app.active_session_id = Some(session.id);
        state.sessions.push(session);
        state.body_weights.push(BodyWeightEntry {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            weight: 181.5,
        });
        state
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path().join("state.json"));

        let state = sample_state();
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("missing.json"));

        let state = store.load().unwrap();
        assert_eq!(state, TrackerState::default());
    }

    #[test]
    fn test_corrupted_state_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(Error::State(_))));
    }

    #[test]
    fn test_dangling_active_session_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path().join("state.json"));

        let mut state = sample_state();
        state.sessions.clear();
        store.save(&state).unwrap();

        assert!(matches!(store.load(), Err(Error::State(_))));
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join("nested");
        let mut store = JsonFileStore::new(data_dir.join("state.json"));

        store.save(&TrackerState::default()).unwrap();
        store.save(&sample_state()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(&data_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only state.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_memory_store_failure_keeps_previous_state() {
        let mut store = MemoryStore::new();
        store.save(&sample_state()).unwrap();
        let before = store.state().clone();

        store.set_fail_saves(true);
        assert!(store.save(&TrackerState::default()).is_err());
        assert_eq!(store.state(), &before);
        assert_eq!(store.saves(), 1);
    }
}
