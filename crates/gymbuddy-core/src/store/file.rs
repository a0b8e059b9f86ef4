//! File-backed key-value store.
//!
//! # File Locations
//!
//! Each key maps to one file in the data directory. Characters outside
//! `[A-Za-z0-9._-]` are replaced with `_`, so keys can never escape the
//! directory:
//!
//! ```text
//! ~/.config/gymbuddy/
//! ├── _GymBuddy_workouts.json
//! ├── _GymBuddy_schedule.json
//! └── _GymBuddy_templates.json
//! ```
//!
//! # Atomic Writes
//!
//! Writes go to `<file>.tmp` first and are then renamed over the target,
//! so a crash mid-write leaves the previous document intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{KeyValueStore, KvError};

/// A [`KeyValueStore`] that keeps one file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
        Ok(self.dir.join(format!("{}.json", file_stem(key)?)))
    }
}

fn file_stem(key: &str) -> Result<String, KvError> {
    if key.is_empty() {
        return Err(KvError::Unavailable("Storage key cannot be empty".to_string()));
    }

    Ok(key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, KvError> {
        let file_path = self.path_for(key)?;

        match fs::read_to_string(&file_path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), KvError> {
        fs::create_dir_all(&self.dir).await?;

        let file_path = self.path_for(key)?;
        let mut temp_path = file_path.clone().into_os_string();
        temp_path.push(".tmp");

        fs::write(&temp_path, value).await?;
        fs::rename(&temp_path, &file_path).await?;

        log::debug!("Wrote {} bytes to {}", value.len(), file_path.display());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
