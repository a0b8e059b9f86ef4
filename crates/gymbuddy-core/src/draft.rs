//! In-progress workout being logged.
//!
//! A draft collects sets for the current exercise, moves finished exercises
//! into the session, and finally builds a [`WorkoutSession`] ready for
//! [`crate::storage::WorkoutStorage::save_workout`].

use thiserror::Error;
use uuid::Uuid;

use crate::model::{ExerciseEntry, SetEntry, WorkoutSession};

/// Upper bound on reps accepted while logging.
pub const MAX_REPS: i64 = 999;

/// Name used when the draft is built without one.
pub const DEFAULT_WORKOUT_NAME: &str = "Workout";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("Pick an exercise before adding sets.")]
    NoCurrentExercise,

    #[error("Weight must be zero or greater (got {0})")]
    InvalidWeight(f64),

    #[error("Reps must be between 0 and {max} (got {0})", max = MAX_REPS)]
    InvalidReps(i64),

    #[error("Could not read weight {weight:?} and reps {reps:?} as numbers")]
    UnparsableInput { weight: String, reps: String },

    #[error("Add at least one exercise with sets.")]
    NoExercises,
}

/// Mutable state of the logging screen.
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    workout_name: String,
    exercises: Vec<ExerciseEntry>,
    current_exercise: String,
    current_sets: Vec<SetEntry>,
}

impl SessionDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workout_name(&self) -> &str {
        &self.workout_name
    }

    pub fn exercises(&self) -> &[ExerciseEntry] {
        &self.exercises
    }

    pub fn current_exercise(&self) -> &str {
        &self.current_exercise
    }

    pub fn current_sets(&self) -> &[SetEntry] {
        &self.current_sets
    }

    pub fn set_workout_name(&mut self, name: impl Into<String>) {
        self.workout_name = name.into();
    }

    /// Switch the exercise sets are being logged for.
    ///
    /// Sets already collected stay with the draft until
    /// [`finish_current_exercise`](Self::finish_current_exercise) or
    /// [`reset`](Self::reset).
    pub fn set_current_exercise(&mut self, name: impl Into<String>) {
        self.current_exercise = name.into();
    }

    /// Append a set to the current exercise.
    pub fn add_set(&mut self, weight: f64, reps: i64) -> Result<(), DraftError> {
        if self.current_exercise.trim().is_empty() {
            return Err(DraftError::NoCurrentExercise);
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(DraftError::InvalidWeight(weight));
        }
        if !(0..=MAX_REPS).contains(&reps) {
            return Err(DraftError::InvalidReps(reps));
        }

        self.current_sets.push(SetEntry::new(weight, reps));
        Ok(())
    }

    /// Parse raw text fields and append a set.
    ///
    /// The weight accepts `,` as the decimal separator.
    pub fn add_set_from_input(&mut self, weight: &str, reps: &str) -> Result<(), DraftError> {
        let parsed_weight = weight.trim().replacen(',', ".", 1).parse::<f64>();
        let parsed_reps = reps.trim().parse::<i64>();

        match (parsed_weight, parsed_reps) {
            (Ok(w), Ok(r)) => self.add_set(w, r),
            _ => Err(DraftError::UnparsableInput {
                weight: weight.to_string(),
                reps: reps.to_string(),
            }),
        }
    }

    /// Drop the most recent set of the current exercise, if any.
    pub fn remove_last_set(&mut self) {
        self.current_sets.pop();
    }

    /// Move the current exercise and its sets into the session.
    ///
    /// Does nothing while the exercise name is blank or no sets were logged.
    pub fn finish_current_exercise(&mut self) {
        let name = self.current_exercise.trim();
        if name.is_empty() || self.current_sets.is_empty() {
            return;
        }

        self.exercises.push(ExerciseEntry {
            exercise_name: name.to_string(),
            sets: std::mem::take(&mut self.current_sets),
        });
        self.current_exercise.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build a session from the finished exercises.
    ///
    /// The current, unfinished exercise is not included. The draft itself is
    /// left untouched so a failed save can be retried.
    pub fn build(
        &self,
        date: impl Into<String>,
        template_id: Option<String>,
    ) -> Result<WorkoutSession, DraftError> {
        if self.exercises.is_empty() {
            return Err(DraftError::NoExercises);
        }

        let name = match self.workout_name.trim() {
            "" => DEFAULT_WORKOUT_NAME,
            trimmed => trimmed,
        };

        Ok(WorkoutSession {
            id: Uuid::new_v4().to_string(),
            date: date.into(),
            template_id,
            name: name.to_string(),
            exercises: self.exercises.clone(),
        })
    }
}
