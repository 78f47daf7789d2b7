//! Showdown - Browse tv shows and count down to their next episodes
//!
//! This library provides the core functionality for searching a tv catalog,
//! enriching shows with their season counts and next episode, aggregating
//! show details, and keeping a persistent list of favourites.

pub mod app;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod details;
pub mod enrichment;
pub mod favourites;
pub mod search;
pub mod storage;

// Re-export error types
pub use catalog::CatalogError;
pub use storage::StorageError;

// Re-export the types most callers need
pub use app::{SearchOutcome, SearchState, Showdown};
pub use catalog::DEFAULT_BASE_URL;
pub use catalog::{
    CastMember, CatalogProvider, Episode, NextEpisode, Person, Show, ShowStatus, TvMazeProvider,
};
pub use config::Config;
pub use countdown::{Countdown, countdown, countdown_from_str, format_airdate};
pub use details::{SeasonGroup, Section, ShowDetails};
pub use favourites::FavouritesStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore};

use thiserror::Error;

/// Top-level error type for Showdown operations
#[derive(Debug, Error)]
pub enum ShowdownError {
    /// Error during a catalog lookup
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
