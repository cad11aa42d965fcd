//! The tracker facade used by the CLI.
//!
//! A `Tracker` owns the single `AppState` (inside `TrackerState`) together
//! with the store it came from. Mutating operations run against a working
//! copy; the copy replaces the live state only after the store accepted it.
//! A failed save therefore leaves nothing half-applied, in memory or on disk.

use crate::body_weight;
use crate::catalog::get_default_catalog;
use crate::export::{self, ExportSummary};
use crate::progression;
use crate::report::{self, WrappedReport};
use crate::rotation::Rotation;
use crate::session::{self, LoggedSet};
use crate::store::StateStore;
use crate::{
    BodyWeightEntry, Catalog, Config, Error, Result, Session, SetEntry, Step, TrackerState,
    Workout,
};
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

/// Source of "now"; swapped out in tests
pub type Clock = fn() -> DateTime<Utc>;

pub struct Tracker<S: StateStore> {
    store: S,
    catalog: &'static Catalog,
    config: Config,
    state: TrackerState,
    clock: Clock,
}

impl<S: StateStore> Tracker<S> {
    /// Load state from `store` and validate the built-in catalog
    pub fn open(store: S, config: Config) -> Result<Self> {
        let catalog = get_default_catalog();
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        config.validate()?;

        let state = store.load()?;
        tracing::debug!(
            "Opened tracker: next workout index {}, active session {:?}",
            state.app.next_workout_index,
            state.app.active_session_id
        );

        Ok(Self {
            store,
            catalog,
            config,
            state,
            clock: Utc::now,
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Run `op` on a working copy and commit it through the store
    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut TrackerState, &'static Catalog, &Config, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        let now = self.now();
        let mut working = self.state.clone();
        let value = op(&mut working, self.catalog, &self.config, now)?;
        self.store.save(&working)?;
        self.state = working;
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Workout lifecycle
    // ------------------------------------------------------------------

    /// Workout the rotation currently points at
    pub fn next_workout(&self) -> Result<&'static Workout> {
        Rotation::new(self.catalog).peek_next(&self.state.app)
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.state.active_session()
    }

    /// Start the next workout in the rotation
    pub fn start_workout(&mut self) -> Result<Session> {
        self.transact(|state, catalog, _, now| {
            let workout = Rotation::new(catalog).peek_next(&state.app)?;
            session::start(state, catalog, &workout.id, now)
        })
    }

    pub fn current_exercise_and_set(&self, session_id: Uuid) -> Result<Option<Step<'static>>> {
        session::current_step(&self.state, self.catalog, session_id)
    }

    /// Weight to pre-fill for the next set of `exercise_id`
    pub fn last_weight_for_exercise(&self, exercise_id: &str) -> f64 {
        progression::suggested_weight(self.catalog, &self.state, exercise_id)
    }

    /// Log a set; completes the session when it was the last one required
    pub fn log_set(&mut self, session_id: Uuid, entry: SetEntry) -> Result<LoggedSet> {
        self.transact(|state, catalog, config, now| {
            session::log_set(state, catalog, &config.progression, session_id, entry, now)
        })
    }

    /// Drop the active session, if any. Returns what was discarded.
    pub fn cancel_workout(&mut self) -> Result<Option<Session>> {
        let Some(active) = self.state.app.active_session_id else {
            tracing::info!("No active session to cancel");
            return Ok(None);
        };
        self.transact(|state, _, _, _| session::cancel(state, active).map(Some))
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    pub fn completed_workouts_count(&self) -> usize {
        report::completed_workouts_count(&self.state)
    }

    pub fn total_sets_logged(&self) -> usize {
        report::total_sets_logged(&self.state)
    }

    /// Completed sessions from the configured trailing window, newest first
    pub fn recent_progress(&self) -> Result<Vec<&Session>> {
        let reports = &self.config.reports;
        report::recent_progress(
            &self.state,
            reports.recent_window_days,
            reports.recent_session_limit,
            self.now(),
        )
    }

    pub fn wrapped_data(&self) -> WrappedReport {
        report::wrapped(&self.state)
    }

    pub fn export_csv(&self, dir: &Path) -> Result<ExportSummary> {
        export::export_csv(&self.state, dir)
    }

    // ------------------------------------------------------------------
    // Body weight
    // ------------------------------------------------------------------

    pub fn log_body_weight(&mut self, weight: f64) -> Result<BodyWeightEntry> {
        self.transact(|state, _, _, now| body_weight::log_body_weight(state, weight, now))
    }

    pub fn today_weight(&self) -> Option<&BodyWeightEntry> {
        body_weight::today_weight(&self.state, self.now())
    }

    pub fn recent_body_weights(&self, days: i64) -> Result<Vec<&BodyWeightEntry>> {
        body_weight::recent_body_weights(&self.state, days, self.now())
    }

    pub fn latest_body_weight(&self) -> Option<&BodyWeightEntry> {
        body_weight::latest_body_weight(&self.state)
    }
}
