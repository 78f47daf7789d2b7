//! Durable key-value storage module
//!
//! This module provides the small persistent store the application keeps
//! its user state in. The file-backed store writes one file per key into
//! the system's standard data directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::fs;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to determine data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to create or access the storage directory
    #[error("Failed to create storage directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a stored value
    #[error("Failed to read storage file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a stored value
    #[error("Failed to write storage file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A string-valued key-value store
///
/// `get` returns `None` for keys that were never written.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// A key-value store backed by one file per key
pub struct FileStore {
    /// The directory where values are stored
    dir: PathBuf,
}

impl FileStore {
    /// Opens or creates a store in the given directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        std::fs::create_dir_all(&dir).map_err(|e| StorageError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;

        Ok(Self { dir })
    }

    /// Returns the path to the storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed { path, source: e }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");

        // Write aside and rename so a crash never leaves half a snapshot
        fs::write(&staging, value)
            .await
            .map_err(|e| StorageError::WriteFailed {
                path: staging.clone(),
                source: e,
            })?;
        fs::rename(&staging, &path)
            .await
            .map_err(|e| StorageError::WriteFailed { path, source: e })
    }
}

/// A key-value store that lives only as long as the process
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Resolves the platform data directory for this application
pub fn default_data_dir() -> Result<PathBuf, StorageError> {
    let proj_dirs = directories::ProjectDirs::from("de", "westhoffswelt", "showdown")
        .ok_or(StorageError::DataDirectoryNotFound)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// Sanitizes a key for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
