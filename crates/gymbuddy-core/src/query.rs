//! History queries built on the storage engine.
//!
//! Nothing here is persisted or indexed; every query filters the full
//! workout collection in memory.

use std::fmt;

use crate::model::{ExerciseEntry, SetEntry, WorkoutSession};
use crate::storage::WorkoutStorage;

/// How many trailing sets a last-result summary shows.
pub const LAST_RESULT_SETS: usize = 3;

/// What the user did the last time they logged an exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct LastResult {
    /// Session the sets came from.
    pub session_id: String,
    /// That session's date, as stored.
    pub date: String,
    /// The trailing sets of the exercise, in performance order.
    pub sets: Vec<SetEntry>,
}

impl LastResult {
    /// `weight kg × reps` pairs joined with `, `.
    pub fn summary(&self) -> String {
        self.sets
            .iter()
            .map(|s| format!("{} kg × {}", s.weight, s.reps))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Last time: {}", self.summary())
    }
}

/// The last `n` sets of an exercise entry, in performance order.
pub fn last_sets(entry: &ExerciseEntry, n: usize) -> &[SetEntry] {
    let start = entry.sets.len().saturating_sub(n);
    &entry.sets[start..]
}

/// Look up the most recent logged sets for `exercise_name`.
///
/// The name is trimmed before matching. Returns `None` for a blank name, when
/// no stored session has the exercise, or when its entry has no sets.
pub async fn lookup_last_result(
    storage: &WorkoutStorage,
    exercise_name: &str,
) -> Option<LastResult> {
    let name = exercise_name.trim();
    if name.is_empty() {
        return None;
    }

    let past = storage.get_workouts_by_exercise(name, Some(1)).await;
    let session = past.first()?;
    let entry = session.exercise(name)?;
    if entry.sets.is_empty() {
        return None;
    }

    Some(LastResult {
        session_id: session.id.clone(),
        date: session.date.clone(),
        sets: last_sets(entry, LAST_RESULT_SETS).to_vec(),
    })
}

/// Sessions ordered newest date first, truncated to `limit`.
///
/// The sort is stable, so sessions on the same date keep storage order.
/// Sessions whose date does not parse sort after all dated ones.
pub fn recent_workouts(workouts: &[WorkoutSession], limit: usize) -> Vec<&WorkoutSession> {
    let mut sorted: Vec<_> = workouts.iter().collect();
    sorted.sort_by(|a, b| b.calendar_date().cmp(&a.calendar_date()));
    sorted.truncate(limit);
    sorted
}
