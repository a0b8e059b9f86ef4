//! The storage engine: the only gateway to persisted workout data.
//!
//! # Overview
//!
//! [`WorkoutStorage`] reads and writes three JSON documents through a
//! [`KeyValueStore`]. Every value it returns has passed validation, and
//! every value it writes was validated first.
//!
//! # Failure Handling
//!
//! Saves and loads fail differently:
//!
//! - **Loads never fail.** Missing, unreadable or corrupt documents come
//!   back as empty collections or `None`, and the reason is logged.
//!   [`WorkoutStorage::read_workouts`] and [`WorkoutStorage::read_schedule`]
//!   are the variants that still report a backend read failure.
//! - **Saves report.** A save returns [`SaveError::Invalid`] (checked before
//!   any I/O), [`SaveError::DuplicateId`] (checked against the stored
//!   collection) or [`SaveError::Io`] (the backend failed; the raw error is
//!   logged, not returned). Nothing is written in any of these cases. `save_templates` is the exception and reports
//!   nothing; see [`WorkoutStorage::save_templates`].
//!
//! # Write Serialization
//!
//! Saving a workout is read-append-write over the whole collection. Each
//! document has its own async mutex held for the full sequence, so two
//! overlapping saves cannot both read the old collection and drop each
//! other's append.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::model::{WeeklySchedule, WorkoutSession, WorkoutTemplate};
use crate::store::{KeyValueStore, KvError};
use crate::validation::{
    parse_collection, safe_parse, validate_all, Validate, ValidationError,
};

/// Storage key for the workout collection.
pub const WORKOUTS_KEY: &str = "@GymBuddy/workouts";
/// Storage key for the weekly schedule.
pub const SCHEDULE_KEY: &str = "@GymBuddy/schedule";
/// Storage key for the template collection.
pub const TEMPLATES_KEY: &str = "@GymBuddy/templates";

/// How many sessions [`WorkoutStorage::get_workouts_by_exercise`] returns
/// when the caller gives no limit.
pub const DEFAULT_EXERCISE_HISTORY_LIMIT: usize = 5;

// ============================================================================
// Documents and errors
// ============================================================================

/// One of the persisted JSON documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Workouts,
    Schedule,
    Templates,
}

impl Document {
    /// The storage key this document lives under.
    pub fn key(&self) -> &'static str {
        match self {
            Document::Workouts => WORKOUTS_KEY,
            Document::Schedule => SCHEDULE_KEY,
            Document::Templates => TEMPLATES_KEY,
        }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Document::Workouts => "workout",
            Document::Schedule => "schedule",
            Document::Templates => "template",
        })
    }
}

/// Why a save did not happen.
#[derive(Error, Debug)]
pub enum SaveError {
    /// The value failed validation. Nothing was written.
    #[error("Invalid {document} data: {source}")]
    Invalid {
        document: Document,
        #[source]
        source: ValidationError,
    },

    /// The record is valid but its id is already stored. Detected after
    /// reading the current collection; nothing was written.
    #[error("A {document} with id \"{id}\" is already stored.")]
    DuplicateId { document: Document, id: String },

    /// The backend failed. The underlying error is logged, not carried.
    #[error("Saving {document} failed.")]
    Io { document: Document },
}

impl SaveError {
    /// The validation failure, if this was one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            SaveError::Invalid { source, .. } => Some(source),
            SaveError::DuplicateId { .. } | SaveError::Io { .. } => None,
        }
    }
}

/// Result of a save through the engine.
pub type SaveResult = Result<(), SaveError>;

// ============================================================================
// WorkoutStorage
// ============================================================================

/// Validated access to workouts, schedule and templates.
pub struct WorkoutStorage {
    store: Arc<dyn KeyValueStore>,
    workouts_lock: Mutex<()>,
    schedule_lock: Mutex<()>,
    templates_lock: Mutex<()>,
}

impl WorkoutStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            workouts_lock: Mutex::new(()),
            schedule_lock: Mutex::new(()),
            templates_lock: Mutex::new(()),
        }
    }

    /// The underlying key-value store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn write_lock(&self, document: Document) -> &Mutex<()> {
        match document {
            Document::Workouts => &self.workouts_lock,
            Document::Schedule => &self.schedule_lock,
            Document::Templates => &self.templates_lock,
        }
    }

    // ------------------------------------------------------------------------
    // Raw document access
    // ------------------------------------------------------------------------

    /// Read and deserialize a document.
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored text is not
    /// JSON. Only backend failures are errors.
    async fn read_document(&self, document: Document) -> Result<Option<Value>, KvError> {
        let Some(raw) = self.store.get_item(document.key()).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Ignoring malformed {} document: {}", document, e);
                Ok(None)
            }
        }
    }

    async fn write_document<T>(&self, document: Document, value: &T) -> SaveResult
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value).map_err(|e| {
            log::error!("Failed to serialize {} document: {}", document, e);
            SaveError::Io { document }
        })?;

        self.store
            .set_item(document.key(), &json)
            .await
            .map_err(|e| {
                log::error!("Failed to write {} document: {}", document, e);
                SaveError::Io { document }
            })
    }

    /// Load a collection document, dropping invalid elements.
    async fn load_collection<T>(&self, document: Document) -> Result<Vec<T>, KvError>
    where
        T: serde::de::DeserializeOwned + Validate,
    {
        let Some(raw) = self.read_document(document).await? else {
            return Ok(Vec::new());
        };

        match parse_collection(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                log::warn!("Ignoring unreadable {} document: {}", document, e);
                Ok(Vec::new())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------------

    /// All stored workouts in insertion order, failing only when the backend
    /// cannot be read. Missing or corrupt data still reads as empty, and
    /// individual invalid sessions are dropped.
    pub async fn read_workouts(&self) -> Result<Vec<WorkoutSession>, KvError> {
        self.load_collection(Document::Workouts).await
    }

    /// All stored workouts in insertion order.
    ///
    /// Never fails: a missing or corrupt document yields an empty list, and
    /// individual invalid sessions are dropped.
    pub async fn get_workouts(&self) -> Vec<WorkoutSession> {
        self.read_workouts()
            .await
            .unwrap_or_else(|e| {
                log::warn!("Failed to read workouts, returning none: {}", e);
                Vec::new()
            })
    }

    /// Validate `session` and append it to the stored collection.
    ///
    /// The id must not already be in the collection. The whole collection is
    /// rewritten in one write.
    pub async fn save_workout(&self, session: &WorkoutSession) -> SaveResult {
        let document = Document::Workouts;
        session
            .validate()
            .map_err(|source| SaveError::Invalid { document, source })?;

        let _guard = self.write_lock(document).lock().await;

        // A failed read must not turn into an overwrite with a one-item list.
        let mut workouts: Vec<WorkoutSession> =
            self.load_collection(document).await.map_err(|e| {
                log::error!("Failed to read workouts before save: {}", e);
                SaveError::Io { document }
            })?;

        if workouts.iter().any(|w| w.id == session.id) {
            return Err(SaveError::DuplicateId {
                document,
                id: session.id.clone(),
            });
        }

        workouts.push(session.clone());
        self.write_document(document, &workouts).await?;

        log::info!(
            "Saved workout {} ({} stored)",
            session.id,
            workouts.len()
        );
        Ok(())
    }

    /// Parse an untyped session (for hosts that hand over JSON) and save it.
    pub async fn save_workout_value(&self, raw: &Value) -> SaveResult {
        let session = safe_parse(raw).map_err(|source| SaveError::Invalid {
            document: Document::Workouts,
            source,
        })?;
        self.save_workout(&session).await
    }

    /// The most recent `limit` sessions (default 5) that contain an exercise
    /// named exactly `exercise_name`, most recent first.
    ///
    /// Recency is position in storage, not the `date` field.
    pub async fn get_workouts_by_exercise(
        &self,
        exercise_name: &str,
        limit: Option<usize>,
    ) -> Vec<WorkoutSession> {
        let limit = limit.unwrap_or(DEFAULT_EXERCISE_HISTORY_LIMIT);
        let matching: Vec<_> = self
            .get_workouts()
            .await
            .into_iter()
            .filter(|w| w.contains_exercise(exercise_name))
            .collect();

        let skip = matching.len().saturating_sub(limit);
        let mut recent: Vec<_> = matching.into_iter().skip(skip).collect();
        recent.reverse();
        recent
    }

    // ------------------------------------------------------------------------
    // Schedule
    // ------------------------------------------------------------------------

    /// Like [`get_schedule`](Self::get_schedule), but a backend read
    /// failure is returned instead of treated as "no schedule".
    pub async fn read_schedule(&self) -> Result<Option<WeeklySchedule>, KvError> {
        let Some(raw) = self.read_document(Document::Schedule).await? else {
            return Ok(None);
        };

        match safe_parse(&raw) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(e) => {
                log::warn!("Ignoring invalid schedule: {}", e);
                Ok(None)
            }
        }
    }

    /// The stored schedule, or `None` if missing or not a complete
    /// seven-day record. Callers substitute an all-rest week.
    pub async fn get_schedule(&self) -> Option<WeeklySchedule> {
        self.read_schedule().await.unwrap_or_else(|e| {
            log::warn!("Failed to read schedule: {}", e);
            None
        })
    }

    /// Validate and replace the stored schedule in a single write.
    pub async fn save_schedule(&self, schedule: &WeeklySchedule) -> SaveResult {
        let document = Document::Schedule;
        schedule
            .validate()
            .map_err(|source| SaveError::Invalid { document, source })?;

        let _guard = self.write_lock(document).lock().await;
        self.write_document(document, schedule).await?;

        log::info!("Saved weekly schedule");
        Ok(())
    }

    /// Parse an untyped schedule and save it. Anything short of a complete
    /// seven-day record is rejected and the stored schedule is kept.
    pub async fn save_schedule_value(&self, raw: &Value) -> SaveResult {
        let schedule = safe_parse(raw).map_err(|source| SaveError::Invalid {
            document: Document::Schedule,
            source,
        })?;
        self.save_schedule(&schedule).await
    }

    // ------------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------------

    /// All stored templates, dropping invalid ones. Never fails.
    pub async fn get_templates(&self) -> Vec<WorkoutTemplate> {
        self.load_collection(Document::Templates)
            .await
            .unwrap_or_else(|e| {
                log::warn!("Failed to read templates, returning none: {}", e);
                Vec::new()
            })
    }

    /// Replace the stored template collection.
    ///
    /// Unlike the other saves this reports nothing: an invalid collection
    /// is skipped and a failed write is only logged.
    pub async fn save_templates(&self, templates: &[WorkoutTemplate]) {
        let document = Document::Templates;
        if let Err(e) = validate_all(templates) {
            log::warn!("Not saving invalid templates: {}", e);
            return;
        }

        let _guard = self.write_lock(document).lock().await;
        if self.write_document(document, templates).await.is_ok() {
            log::info!("Saved {} templates", templates.len());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
