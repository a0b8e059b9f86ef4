//! Persisted record types.
//!
//! # Data Model Overview
//!
//! GymBuddy persists three JSON documents, each under its own storage key:
//!
//! ```text
//! @GymBuddy/workouts    [WorkoutSession, ...]   append order = recency
//! @GymBuddy/schedule    WeeklySchedule          exactly seven day keys
//! @GymBuddy/templates   [WorkoutTemplate, ...]
//! ```
//!
//! Field names are camelCase on disk. The serde attributes here encode the
//! *shape* of each record (which keys are required, which may be null);
//! the value constraints (non-empty names, non-negative numbers) live in
//! [`crate::validation`].

use chrono::{NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize};

// ============================================================================
// Workout Types
// ============================================================================

/// One resistance-exercise set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    /// Load in kilograms.
    pub weight: f64,

    /// Repetitions performed. Signed so that out-of-range input reaches
    /// validation instead of failing to deserialize. Whole-number floats
    /// (`8.0`) are read as integers.
    #[serde(deserialize_with = "whole_number")]
    pub reps: i64,

    /// Free-text note. May be absent, but not `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_string"
    )]
    pub note: Option<String>,
}

impl SetEntry {
    pub fn new(weight: f64, reps: i64) -> Self {
        Self {
            weight,
            reps,
            note: None,
        }
    }
}

/// A named exercise and its sets in performance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub exercise_name: String,
    pub sets: Vec<SetEntry>,
}

/// A logged training session, the unit of persistence for workouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    /// Caller-generated identifier, unique across the collection.
    pub id: String,

    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,

    /// Schedule slot this session was logged against. The key is required
    /// on disk; the value may be `null`. Never checked against templates.
    #[serde(deserialize_with = "required_nullable")]
    pub template_id: Option<String>,

    /// User-visible session name.
    pub name: String,

    /// Exercises in the order they were performed.
    pub exercises: Vec<ExerciseEntry>,
}

impl WorkoutSession {
    /// Parse `date` as a calendar date, if it is one.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Find the first entry for `exercise_name` (exact match).
    pub fn exercise(&self, exercise_name: &str) -> Option<&ExerciseEntry> {
        self.exercises
            .iter()
            .find(|e| e.exercise_name == exercise_name)
    }

    /// True if any entry has exactly this exercise name.
    pub fn contains_exercise(&self, exercise_name: &str) -> bool {
        self.exercise(exercise_name).is_some()
    }
}

// ============================================================================
// Template Types
// ============================================================================

/// A named, reusable list of exercise names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    pub exercise_names: Vec<String>,
}

// ============================================================================
// Schedule Types
// ============================================================================

/// A day of the week, as used for schedule keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayKey {
    /// All seven days, Monday first.
    pub const ALL: [DayKey; 7] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
    ];

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayKey::Monday,
            Weekday::Tue => DayKey::Tuesday,
            Weekday::Wed => DayKey::Wednesday,
            Weekday::Thu => DayKey::Thursday,
            Weekday::Fri => DayKey::Friday,
            Weekday::Sat => DayKey::Saturday,
            Weekday::Sun => DayKey::Sunday,
        }
    }

    /// The JSON key for this day.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayKey::Monday => "monday",
            DayKey::Tuesday => "tuesday",
            DayKey::Wednesday => "wednesday",
            DayKey::Thursday => "thursday",
            DayKey::Friday => "friday",
            DayKey::Saturday => "saturday",
            DayKey::Sunday => "sunday",
        }
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels offered for a schedule slot. `None` is a rest day.
pub const SCHEDULE_OPTIONS: [Option<&str>; 5] =
    [None, Some("Push"), Some("Pull"), Some("Legs"), Some("Full")];

/// The weekly plan: one slot per weekday, `None` meaning rest.
///
/// All seven keys must be present on disk and no others are allowed.
/// `Default` is an all-rest week.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeeklySchedule {
    #[serde(deserialize_with = "required_nullable")]
    pub monday: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub tuesday: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub wednesday: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub thursday: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub friday: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub saturday: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub sunday: Option<String>,
}

impl WeeklySchedule {
    /// Get the label for a day (`None` for rest).
    pub fn slot(&self, day: DayKey) -> Option<&str> {
        self.slot_ref(day).as_deref()
    }

    /// Return a copy with one day replaced.
    ///
    /// Schedules are edited as whole local copies and saved back in full.
    pub fn with_slot(&self, day: DayKey, label: Option<String>) -> Self {
        let mut next = self.clone();
        *next.slot_mut(day) = label;
        next
    }

    /// Iterate over `(day, label)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (DayKey, Option<&str>)> + '_ {
        DayKey::ALL.into_iter().map(move |day| (day, self.slot(day)))
    }

    fn slot_ref(&self, day: DayKey) -> &Option<String> {
        match day {
            DayKey::Monday => &self.monday,
            DayKey::Tuesday => &self.tuesday,
            DayKey::Wednesday => &self.wednesday,
            DayKey::Thursday => &self.thursday,
            DayKey::Friday => &self.friday,
            DayKey::Saturday => &self.saturday,
            DayKey::Sunday => &self.sunday,
        }
    }

    fn slot_mut(&mut self, day: DayKey) -> &mut Option<String> {
        match day {
            DayKey::Monday => &mut self.monday,
            DayKey::Tuesday => &mut self.tuesday,
            DayKey::Wednesday => &mut self.wednesday,
            DayKey::Thursday => &mut self.thursday,
            DayKey::Friday => &mut self.friday,
            DayKey::Saturday => &mut self.saturday,
            DayKey::Sunday => &mut self.sunday,
        }
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

/// Key must be present; value may be `null`.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Any JSON number without a fractional part that fits in an `i64`.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }

    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(de::Error::custom(format!(
            "expected a whole number, got {}",
            number
        ))),
    }
}

/// Key may be absent (via `#[serde(default)]`); if present it must be a string.
fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

// ============================================================================
// TESTS
// ============================================================================
