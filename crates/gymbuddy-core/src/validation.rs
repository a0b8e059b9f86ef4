//! Validation of untrusted record data.
//!
//! Everything loaded from storage is parsed with [`safe_parse`] (or
//! [`parse_collection`] for array documents) before the rest of the crate
//! sees it, and everything saved is checked with [`Validate::validate`]
//! first. None of these functions panic; failures are values.
//!
//! # Policy
//!
//! Collections and single records fail differently on read, and saves
//! report differently per document:
//!
//! | Document  | On read                 | On save                            |
//! |-----------|-------------------------|------------------------------------|
//! | workouts  | drop invalid elements   | reject, return [`ValidationError`] |
//! | schedule  | whole record or nothing | reject, return [`ValidationError`] |
//! | templates | drop invalid elements   | reject silently, no error          |
//!
//! Validation never touches storage. Rules that need the stored data, such
//! as unique workout ids, are checked by [`crate::storage`] after it reads
//! the current collection and are reported as their own
//! [`SaveError`](crate::storage::SaveError) variant.
//!
//! # Constraints
//!
//! - `weight` is finite and `>= 0`; `reps` is an integer `>= 0`. There is no
//!   upper bound on `reps` here; the 999 cap belongs to [`crate::draft`].
//! - Identifiers and names are non-empty.
//! - `templateId` and schedule slots are required keys with nullable values.
//! - Schedules reject unknown keys; other records ignore them.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{ExerciseEntry, SetEntry, WeeklySchedule, WorkoutSession, WorkoutTemplate};

/// Why a record was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Wrong JSON shape: missing key, wrong type, unknown schedule key.
    #[error("{entity} has an invalid shape: {message}")]
    Shape {
        entity: &'static str,
        message: String,
    },

    #[error("{path} must not be empty")]
    Empty { path: String },

    #[error("{path} must be zero or greater (got {value})")]
    Negative { path: String, value: f64 },

    #[error("{path} must be a finite number")]
    NotFinite { path: String },

    #[error("expected a list of {entity} records")]
    NotAList { entity: &'static str },
}

/// Semantic checks on a record that already has the right shape.
pub trait Validate {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Check this record, reporting field paths relative to `at`.
    fn check(&self, at: &str) -> Result<(), ValidationError>;

    /// Check this record as a top-level value.
    fn validate(&self) -> Result<(), ValidationError> {
        self.check("")
    }
}

/// Parse and validate one record from an untyped JSON value.
pub fn safe_parse<T>(raw: &Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let record = T::deserialize(raw).map_err(|e| ValidationError::Shape {
        entity: T::ENTITY,
        message: e.to_string(),
    })?;
    record.validate()?;
    Ok(record)
}

/// Parse an array document, keeping only the elements that validate.
///
/// Fails only when `raw` is not an array. Dropped elements are logged.
pub fn parse_collection<T>(raw: &Value) -> Result<Vec<T>, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let items = raw
        .as_array()
        .ok_or(ValidationError::NotAList { entity: T::ENTITY })?;

    let mut valid = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match safe_parse::<T>(item) {
            Ok(record) => valid.push(record),
            Err(e) => log::warn!("Dropping invalid {} at index {}: {}", T::ENTITY, i, e),
        }
    }

    Ok(valid)
}

/// Validate every element of a collection, failing on the first bad one.
pub fn validate_all<T: Validate>(items: &[T]) -> Result<(), ValidationError> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(i, item)| item.check(&format!("[{i}]")))
}

// ============================================================================
// Field checks
// ============================================================================

fn field(at: &str, name: &str) -> String {
    if at.is_empty() {
        name.to_string()
    } else {
        format!("{at}.{name}")
    }
}

fn non_empty(value: &str, path: impl FnOnce() -> String) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { path: path() });
    }
    Ok(())
}

// ============================================================================
// Entity rules
// ============================================================================

impl Validate for SetEntry {
    const ENTITY: &'static str = "set";

    fn check(&self, at: &str) -> Result<(), ValidationError> {
        if !self.weight.is_finite() {
            return Err(ValidationError::NotFinite {
                path: field(at, "weight"),
            });
        }
        if self.weight < 0.0 {
            return Err(ValidationError::Negative {
                path: field(at, "weight"),
                value: self.weight,
            });
        }
        if self.reps < 0 {
            return Err(ValidationError::Negative {
                path: field(at, "reps"),
                value: self.reps as f64,
            });
        }
        Ok(())
    }
}

impl Validate for ExerciseEntry {
    const ENTITY: &'static str = "exercise";

    fn check(&self, at: &str) -> Result<(), ValidationError> {
        non_empty(&self.exercise_name, || field(at, "exerciseName"))?;
        for (i, set) in self.sets.iter().enumerate() {
            set.check(&field(at, &format!("sets[{i}]")))?;
        }
        Ok(())
    }
}

impl Validate for WorkoutSession {
    const ENTITY: &'static str = "workout";

    fn check(&self, at: &str) -> Result<(), ValidationError> {
        non_empty(&self.id, || field(at, "id"))?;
        non_empty(&self.date, || field(at, "date"))?;
        non_empty(&self.name, || field(at, "name"))?;
        for (i, exercise) in self.exercises.iter().enumerate() {
            exercise.check(&field(at, &format!("exercises[{i}]")))?;
        }
        Ok(())
    }
}

impl Validate for WorkoutTemplate {
    const ENTITY: &'static str = "template";

    fn check(&self, at: &str) -> Result<(), ValidationError> {
        non_empty(&self.id, || field(at, "id"))?;
        non_empty(&self.name, || field(at, "name"))?;
        for (i, name) in self.exercise_names.iter().enumerate() {
            non_empty(name, || field(at, &format!("exerciseNames[{i}]")))?;
        }
        Ok(())
    }
}

impl Validate for WeeklySchedule {
    const ENTITY: &'static str = "schedule";

    // Shape (seven keys, string or null) is the whole contract.
    fn check(&self, _at: &str) -> Result<(), ValidationError> {
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_session_json(id: &str) -> Value {
        json!({
            "id": id,
            "date": "2026-10-19",
            "templateId": null,
            "name": "Push",
            "exercises": [
                {"exerciseName": "Bench press", "sets": [{"weight": 60, "reps": 8}]}
            ]
        })
    }

    mod sets {
        use super::*;

        #[test]
        fn valid_set_round_trips() {
            let set = SetEntry {
                weight: 62.5,
                reps: 6,
                note: Some("paused".to_string()),
            };
            let raw = serde_json::to_value(&set).unwrap();

            assert_eq!(safe_parse::<SetEntry>(&raw).unwrap(), set);
        }

        #[test]
        fn negative_weight_is_rejected() {
            let err = safe_parse::<SetEntry>(&json!({"weight": -1, "reps": 5})).unwrap_err();
            assert!(matches!(err, ValidationError::Negative { ref path, .. } if path == "weight"));
        }

        #[test]
        fn negative_reps_is_rejected() {
            let err = safe_parse::<SetEntry>(&json!({"weight": 1, "reps": -1})).unwrap_err();
            assert_eq!(
                err,
                ValidationError::Negative {
                    path: "reps".to_string(),
                    value: -1.0
                }
            );
        }

        #[test]
        fn fractional_reps_is_rejected() {
            let err = safe_parse::<SetEntry>(&json!({"weight": 1, "reps": 5.5})).unwrap_err();
            assert!(matches!(err, ValidationError::Shape { entity: "set", .. }));
        }

        #[test]
        fn whole_number_float_reps_are_accepted() {
            let set = safe_parse::<SetEntry>(&json!({"weight": 60, "reps": 8.0})).unwrap();
            assert_eq!(set, SetEntry::new(60.0, 8));

            let err = safe_parse::<SetEntry>(&json!({"weight": 60, "reps": 5.5})).unwrap_err();
            assert!(matches!(err, ValidationError::Shape { entity: "set", .. }));
        }

        #[test]
        fn negative_float_reps_reach_validation() {
            let err = safe_parse::<SetEntry>(&json!({"weight": 60, "reps": -2.0})).unwrap_err();
            assert!(matches!(err, ValidationError::Negative { ref path, .. } if path == "reps"));
        }

        #[test]
        fn reps_beyond_i64_are_rejected() {
            assert!(safe_parse::<SetEntry>(&json!({"weight": 60, "reps": 1e30})).is_err());
            assert!(safe_parse::<SetEntry>(&json!({"weight": 60, "reps": u64::MAX})).is_err());
        }

        #[test]
        fn zero_values_are_allowed() {
            assert!(safe_parse::<SetEntry>(&json!({"weight": 0, "reps": 0})).is_ok());
        }

        #[test]
        fn reps_above_ui_cap_pass_storage_validation() {
            assert!(safe_parse::<SetEntry>(&json!({"weight": 20, "reps": 5000})).is_ok());
        }

        #[test]
        fn non_finite_weight_is_rejected() {
            let set = SetEntry::new(f64::NAN, 5);
            assert!(matches!(
                set.validate(),
                Err(ValidationError::NotFinite { .. })
            ));
        }
    }

    mod sessions {
        use super::*;

        #[test]
        fn valid_session_parses() {
            let session = safe_parse::<WorkoutSession>(&valid_session_json("w-1")).unwrap();
            assert_eq!(session.id, "w-1");
            assert_eq!(session.exercises[0].sets.len(), 1);
        }

        #[test]
        fn extra_keys_are_ignored() {
            let mut raw = valid_session_json("w-1");
            raw["durationMinutes"] = json!(45);
            assert!(safe_parse::<WorkoutSession>(&raw).is_ok());
        }

        #[test]
        fn empty_exercises_are_allowed_in_storage() {
            let mut raw = valid_session_json("w-1");
            raw["exercises"] = json!([]);
            assert!(safe_parse::<WorkoutSession>(&raw).is_ok());
        }

        #[test]
        fn missing_name_is_a_shape_error() {
            let mut raw = valid_session_json("w-1");
            raw.as_object_mut().unwrap().remove("name");

            let err = safe_parse::<WorkoutSession>(&raw).unwrap_err();
            assert!(matches!(err, ValidationError::Shape { entity: "workout", .. }));
            assert!(err.to_string().contains("name"));
        }

        #[test]
        fn empty_id_is_rejected() {
            let raw = valid_session_json("");
            let err = safe_parse::<WorkoutSession>(&raw).unwrap_err();
            assert_eq!(
                err,
                ValidationError::Empty {
                    path: "id".to_string()
                }
            );
        }

        #[test]
        fn nested_error_reports_path() {
            let mut raw = valid_session_json("w-1");
            raw["exercises"][0]["sets"] = json!([
                {"weight": 60, "reps": 8},
                {"weight": -5, "reps": 8}
            ]);

            let err = safe_parse::<WorkoutSession>(&raw).unwrap_err();
            assert_eq!(
                err.to_string(),
                "exercises[0].sets[1].weight must be zero or greater (got -5)"
            );
        }

        #[test]
        fn empty_exercise_name_is_rejected() {
            let mut raw = valid_session_json("w-1");
            raw["exercises"][0]["exerciseName"] = json!("");

            let err = safe_parse::<WorkoutSession>(&raw).unwrap_err();
            assert!(err.to_string().contains("exercises[0].exerciseName"));
        }
    }

    mod templates {
        use super::*;

        #[test]
        fn empty_exercise_name_in_template_is_rejected() {
            let raw = json!({"id": "t", "name": "Push", "exerciseNames": ["Bench", ""]});
            let err = safe_parse::<WorkoutTemplate>(&raw).unwrap_err();
            assert!(err.to_string().contains("exerciseNames[1]"));
        }

        #[test]
        fn validate_all_reports_index() {
            let templates = vec![
                WorkoutTemplate {
                    id: "t-1".to_string(),
                    name: "Push".to_string(),
                    exercise_names: vec![],
                },
                WorkoutTemplate {
                    id: "t-2".to_string(),
                    name: String::new(),
                    exercise_names: vec![],
                },
            ];

            let err = validate_all(&templates).unwrap_err();
            assert_eq!(
                err,
                ValidationError::Empty {
                    path: "[1].name".to_string()
                }
            );
        }
    }

    mod schedules {
        use super::*;

        #[test]
        fn complete_schedule_parses() {
            let raw = json!({
                "monday": "Push", "tuesday": null, "wednesday": "Pull",
                "thursday": null, "friday": "Legs", "saturday": null, "sunday": null
            });
            let schedule = safe_parse::<WeeklySchedule>(&raw).unwrap();
            assert_eq!(schedule.friday.as_deref(), Some("Legs"));
        }

        #[test]
        fn six_day_schedule_is_rejected() {
            let raw = json!({
                "monday": "Push", "tuesday": null, "wednesday": "Pull",
                "thursday": null, "friday": "Legs", "saturday": null
            });
            assert!(safe_parse::<WeeklySchedule>(&raw).is_err());
        }

        #[test]
        fn non_string_slot_is_rejected() {
            let raw = json!({
                "monday": 1, "tuesday": null, "wednesday": null,
                "thursday": null, "friday": null, "saturday": null, "sunday": null
            });
            assert!(safe_parse::<WeeklySchedule>(&raw).is_err());
        }
    }

    mod collections {
        use super::*;

        #[test]
        fn invalid_elements_are_dropped() {
            let mut invalid = valid_session_json("w-2");
            invalid.as_object_mut().unwrap().remove("name");
            let raw = json!([valid_session_json("w-1"), invalid, valid_session_json("w-3")]);

            let sessions = parse_collection::<WorkoutSession>(&raw).unwrap();
            let ids: Vec<_> = sessions.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(ids, vec!["w-1", "w-3"]);
        }

        #[test]
        fn non_array_fails_whole_parse() {
            let err = parse_collection::<WorkoutSession>(&json!({"id": "w-1"})).unwrap_err();
            assert_eq!(err, ValidationError::NotAList { entity: "workout" });
        }

        #[test]
        fn empty_array_is_fine() {
            assert!(parse_collection::<WorkoutTemplate>(&json!([])).unwrap().is_empty());
        }
    }
}
