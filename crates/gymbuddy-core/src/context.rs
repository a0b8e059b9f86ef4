//! WorkoutContext - the in-memory view of stored workouts and schedule.
//!
//! Screens read from the context and mutate through it. Every mutation is
//! persisted through [`WorkoutStorage`] first; in-memory state only changes
//! once the save succeeded, and listeners hear about it on the event bus.
//!
//! ## Architecture
//!
//! ```text
//!         ┌──────────────────────────┐
//!         │      WorkoutContext      │
//!         ├──────────────────────────┤
//!         │  - workouts, schedule    │──emit──▶ ContextEvents ──▶ screens
//!         │  - is_loading, has_error │
//!         └────────────┬─────────────┘
//!                      │ save / load
//!                      ▼
//!         ┌──────────────────────────┐
//!         │      WorkoutStorage      │
//!         └────────────┬─────────────┘
//!                      ▼
//!         KeyValueStore (FileStore / MemoryStore)
//! ```

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::events::{ContextEvent, ContextEvents};
use crate::model::{DayKey, WeeklySchedule, WorkoutSession};
use crate::paths;
use crate::query::{self, LastResult};
use crate::storage::{SaveError, WorkoutStorage};
use crate::store::{FileStore, KeyValueStore};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Workout context has been disposed")]
    Disposed,

    #[error("Could not resolve data directory: {0}")]
    DataDir(String),

    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Configuration for building a WorkoutContext.
#[derive(Default)]
pub struct WorkoutContextBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    data_dir: Option<PathBuf>,
    events: Option<Arc<ContextEvents>>,
}

impl WorkoutContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing store. Takes precedence over [`data_dir`](Self::data_dir).
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Keep documents as files in `dir`.
    pub fn data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = Some(dir);
        self
    }

    /// Use an existing event bus (for sharing with other components).
    pub fn event_bus(mut self, events: Arc<ContextEvents>) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the context. Without a store or data directory, documents live
    /// under [`paths::default_data_dir`].
    pub fn build(self) -> Result<WorkoutContext, ContextError> {
        let store = match (self.store, self.data_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileStore::new(dir)) as Arc<dyn KeyValueStore>,
            (None, None) => {
                let dir = paths::default_data_dir().map_err(ContextError::DataDir)?;
                Arc::new(FileStore::new(dir)) as Arc<dyn KeyValueStore>
            }
        };
        let events = self.events.unwrap_or_else(|| Arc::new(ContextEvents::new()));

        Ok(WorkoutContext {
            storage: Arc::new(WorkoutStorage::new(store)),
            events,
            state: Arc::new(RwLock::new(ContextState::default())),
            op_lock: Arc::new(Mutex::new(())),
        })
    }
}

struct ContextState {
    workouts: Vec<WorkoutSession>,
    schedule: Option<WeeklySchedule>,
    is_loading: bool,
    has_error: bool,
    disposed: bool,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            workouts: Vec::new(),
            schedule: None,
            // Nothing has been read yet.
            is_loading: true,
            has_error: false,
            disposed: false,
        }
    }
}

/// Shared workout state.
///
/// Cloning is cheap and every clone sees the same state. Loads and
/// mutations run one at a time: each holds `op_lock` from its first storage
/// call until its in-memory update, so a reload cannot overwrite a
/// concurrent add and in-memory order always matches storage order.
#[derive(Clone)]
pub struct WorkoutContext {
    storage: Arc<WorkoutStorage>,
    events: Arc<ContextEvents>,
    state: Arc<RwLock<ContextState>>,
    op_lock: Arc<Mutex<()>>,
}

impl WorkoutContext {
    pub fn builder() -> WorkoutContextBuilder {
        WorkoutContextBuilder::new()
    }

    pub fn storage(&self) -> &Arc<WorkoutStorage> {
        &self.storage
    }

    pub fn events(&self) -> &Arc<ContextEvents> {
        &self.events
    }

    fn read(&self) -> RwLockReadGuard<'_, ContextState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_live(&self) -> Result<(), ContextError> {
        if self.read().disposed {
            Err(ContextError::Disposed)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// First load after construction.
    pub async fn initialize(&self) -> Result<(), ContextError> {
        log::info!("Initializing workout context");
        self.load_data().await
    }

    /// Read workouts and schedule from storage, replacing in-memory state.
    ///
    /// Corrupt or missing documents load as empty/default. If the backend
    /// itself cannot be read, the previous state is kept and
    /// [`has_error`](Self::has_error) turns true until the next good load.
    pub async fn load_data(&self) -> Result<(), ContextError> {
        let _op = self.op_lock.lock().await;
        {
            let mut state = self.write();
            if state.disposed {
                return Err(ContextError::Disposed);
            }
            state.is_loading = true;
            state.has_error = false;
        }

        let loaded = match tokio::join!(
            self.storage.read_workouts(),
            self.storage.read_schedule()
        ) {
            (Ok(workouts), Ok(schedule)) => Ok((workouts, schedule)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        let workout_count = {
            let mut state = self.write();
            if state.disposed {
                return Err(ContextError::Disposed);
            }
            state.is_loading = false;

            match loaded {
                Ok((workouts, schedule)) => {
                    state.workouts = workouts;
                    state.schedule = Some(schedule.unwrap_or_default());
                    state.workouts.len()
                }
                Err(e) => {
                    log::error!("Failed to load workout data: {}", e);
                    state.has_error = true;
                    return Ok(());
                }
            }
        };

        log::debug!("Loaded {} workouts", workout_count);
        self.events.emit(ContextEvent::Loaded { workout_count });
        Ok(())
    }

    /// Drop in-memory state. Later loads and mutations fail with
    /// [`ContextError::Disposed`]; stored documents are untouched.
    pub fn dispose(&self) {
        {
            let mut state = self.write();
            if state.disposed {
                return;
            }
            state.workouts.clear();
            state.schedule = None;
            state.is_loading = false;
            state.disposed = true;
        }
        self.events.emit(ContextEvent::Disposed);
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Persist `session`, then append it to the in-memory list.
    ///
    /// On failure the in-memory list is unchanged.
    pub async fn add_workout(&self, session: WorkoutSession) -> Result<(), ContextError> {
        let _op = self.op_lock.lock().await;
        self.ensure_live()?;
        self.storage.save_workout(&session).await?;

        let workout_id = session.id.clone();
        {
            let mut state = self.write();
            if state.disposed {
                return Err(ContextError::Disposed);
            }
            state.workouts.push(session);
        }

        self.events.emit(ContextEvent::WorkoutAdded { workout_id });
        Ok(())
    }

    /// Persist `schedule` as a whole, then replace the in-memory one.
    pub async fn update_schedule(&self, schedule: WeeklySchedule) -> Result<(), ContextError> {
        let _op = self.op_lock.lock().await;
        self.ensure_live()?;
        self.storage.save_schedule(&schedule).await?;

        {
            let mut state = self.write();
            if state.disposed {
                return Err(ContextError::Disposed);
            }
            state.schedule = Some(schedule);
        }

        self.events.emit(ContextEvent::ScheduleUpdated);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn workouts(&self) -> Vec<WorkoutSession> {
        self.read().workouts.clone()
    }

    /// The current schedule; an all-rest week until one is loaded or saved.
    pub fn schedule(&self) -> WeeklySchedule {
        self.read().schedule.clone().unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    pub fn has_error(&self) -> bool {
        self.read().has_error
    }

    pub fn is_disposed(&self) -> bool {
        self.read().disposed
    }

    /// Label planned for today's weekday, `None` on a rest day.
    pub fn scheduled_today(&self) -> Option<String> {
        self.schedule().slot(DayKey::today()).map(str::to_string)
    }

    /// What was logged the last time for `exercise_name`.
    pub async fn last_result(&self, exercise_name: &str) -> Option<LastResult> {
        query::lookup_last_result(&self.storage, exercise_name).await
    }
}
