//! Round-robin rotation over the catalog's workout sequence.
//!
//! The only memory is `AppState::next_workout_index`. It moves forward by one
//! when a session completes and never otherwise.

use crate::{AppState, Catalog, Error, Result, Workout};

/// Read/advance view over the rotation pointer
pub struct Rotation<'a> {
    catalog: &'a Catalog,
}

impl<'a> Rotation<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Workout id at `index`, wrapping around the sequence
    pub fn workout_id_at(&self, index: usize) -> Result<&'a str> {
        let len = self.catalog.sequence.len();
        if len == 0 {
            return Err(Error::CatalogValidation("rotation sequence is empty".into()));
        }
        Ok(self.catalog.sequence[index % len].as_str())
    }

    /// The workout the next session will use, without moving the pointer
    pub fn peek_next(&self, app: &AppState) -> Result<&'a Workout> {
        let id = self.workout_id_at(app.next_workout_index)?;
        self.catalog.workout(id)
    }

    /// Move the pointer to the following workout
    pub fn advance(&self, app: &mut AppState) -> Result<()> {
        let len = self.catalog.sequence.len();
        if len == 0 {
            return Err(Error::CatalogValidation("rotation sequence is empty".into()));
        }
        let previous = app.next_workout_index;
        app.next_workout_index = (previous + 1) % len;
        tracing::debug!(
            "Rotation advanced from {} to {}",
            previous,
            app.next_workout_index
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;

    #[test]
    fn test_peek_does_not_mutate() {
        let rotation = Rotation::new(get_default_catalog());
        let app = AppState::default();

        assert_eq!(rotation.peek_next(&app).unwrap().id, "upper-a");
        assert_eq!(rotation.peek_next(&app).unwrap().id, "upper-a");
        assert_eq!(app.next_workout_index, 0);
    }

    #[test]
    fn test_advance_cycles_through_sequence() {
        let rotation = Rotation::new(get_default_catalog());
        let mut app = AppState::default();

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(rotation.peek_next(&app).unwrap().id.clone());
            rotation.advance(&mut app).unwrap();
        }

        assert_eq!(
            seen,
            vec!["upper-a", "lower-a", "upper-b", "lower-b", "upper-a"]
        );
        assert_eq!(app.next_workout_index, 1);
    }

    #[test]
    fn test_out_of_range_index_wraps() {
        let rotation = Rotation::new(get_default_catalog());
        let app = AppState {
            next_workout_index: 6,
            active_session_id: None,
        };
        assert_eq!(rotation.peek_next(&app).unwrap().id, "upper-b");
    }

    #[test]
    fn test_empty_sequence_is_an_error() {
        let catalog = Catalog::from_workouts(vec![], vec![]);
        let rotation = Rotation::new(&catalog);
        let mut app = AppState::default();
        assert!(rotation.peek_next(&app).is_err());
        assert!(rotation.advance(&mut app).is_err());
    }
}
