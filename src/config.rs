//! Runtime configuration
//!
//! Resolves where the catalog lives and where user state is stored, falling
//! back to the public TVMaze API and the platform data directory.

use crate::catalog::{CatalogError, TvMazeProvider};
use crate::storage::{FileStore, StorageError, default_data_dir};
use crate::{DEFAULT_BASE_URL, ShowdownError};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the TVMaze-compatible catalog API
    pub api_url: String,
    /// Directory holding the favourites snapshot
    pub data_dir: PathBuf,
}

impl Config {
    /// Builds a configuration, filling unset values with defaults
    pub fn resolve(
        api_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, StorageError> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        Ok(Self {
            api_url: api_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            data_dir,
        })
    }

    pub fn provider(&self) -> Result<TvMazeProvider, CatalogError> {
        TvMazeProvider::with_base_url(&self.api_url)
    }

    pub fn store(&self) -> Result<FileStore, StorageError> {
        FileStore::open(&self.data_dir)
    }

    /// Opens both the catalog provider and the durable store
    pub fn open(&self) -> Result<(TvMazeProvider, FileStore), ShowdownError> {
        Ok((self.provider()?, self.store()?))
    }
}
