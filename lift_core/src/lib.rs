#![forbid(unsafe_code)]

//! Core domain model and business logic for the Lift rotation tracker.
//!
//! This crate provides:
//! - Domain types (exercises, workouts, sessions, set logs, body weight)
//! - The compiled-in workout catalog and its rotation
//! - The session state machine and progression rule
//! - Persistence (locked JSON state file, CSV export)
//! - Reporting queries and the `Tracker` facade tying it all together

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod rotation;
pub mod progression;
pub mod session;
pub mod body_weight;
pub mod report;
pub mod store;
pub mod export;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, FALLBACK_WEIGHT};
pub use config::Config;
pub use session::{Completion, LoggedSet};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use report::{ExerciseStats, WrappedReport};
pub use body_weight::BodyWeightStats;
pub use tracker::Tracker;
