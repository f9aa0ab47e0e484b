//! Price History Persistence
//!
//! Durable snapshot storage for the price history, enabling the rolling
//! window to survive restarts. The snapshot is a single JSON document
//! mapping instrument id to its ordered samples; every save overwrites it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::price::PriceSample;

/// Default history file name
pub const DEFAULT_HISTORY_FILE: &str = "price_history.json";

/// Whole-document representation of the price history
pub type Snapshot = BTreeMap<String, Vec<PriceSample>>;

#[derive(Error, Debug, Clone)]
pub enum PersistError {
    #[error("Failed to serialize price history: {0}")]
    SerializationError(String),

    #[error("Failed to deserialize price history: {0}")]
    DeserializationError(String),

    #[error("Failed to write history file: {0}")]
    WriteError(String),

    #[error("Failed to read history file: {0}")]
    ReadError(String),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),
}

/// Whole-document snapshot storage
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, `None` if nothing was ever saved
    fn load(&self) -> Result<Option<Snapshot>, PersistError>;

    /// Overwrite the stored snapshot
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// Snapshot storage backed by a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file inside a data directory, using the default file name
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DEFAULT_HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| PersistError::ReadError(e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| PersistError::DeserializationError(e.to_string()))?;

        tracing::debug!(
            category = "System",
            "History snapshot loaded from {} ({} instruments)",
            self.path.display(),
            snapshot.len()
        );

        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PersistError::DirectoryError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PersistError::SerializationError(e.to_string()))?;

        fs::write(&self.path, content)
            .map_err(|e| PersistError::WriteError(e.to_string()))
    }
}
