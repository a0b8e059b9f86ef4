//! # gymbuddy-core
//!
//! Local persistence, validation and history queries for GymBuddy, a
//! single-user workout log.
//!
//! This crate is UI-agnostic: a mobile shell, desktop app or CLI drives it
//! through [`WorkoutContext`] and renders what it holds.
//!
//! ## Key Concepts
//!
//! - **Session**: one logged workout with its exercises and sets
//! - **Schedule**: the weekly plan, one template label or rest per weekday
//! - **Template**: a named list of exercise names
//! - **Draft**: the session being logged, before it is saved
//!
//! Reads are lenient (bad data is dropped or replaced by defaults and
//! logged); saves validate first and report why they did not happen.

pub mod context;
pub mod dates;
pub mod draft;
pub mod events;
pub mod model;
pub mod paths;
pub mod query;
pub mod storage;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use context::{ContextError, WorkoutContext};
pub use draft::{DraftError, SessionDraft};
pub use model::{DayKey, ExerciseEntry, SetEntry, WeeklySchedule, WorkoutSession, WorkoutTemplate};
pub use query::LastResult;
pub use storage::{SaveError, WorkoutStorage};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use validation::{Validate, ValidationError};
