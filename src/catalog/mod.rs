/// Data structures and traits for tv catalog lookups.
///
/// This module provides the view models for shows, episodes, cast and people
/// as served by a catalog service, as well as the provider trait the rest of
/// the crate talks to.
#[cfg(test)]
pub(crate) mod fake;
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::{DEFAULT_BASE_URL, TvMazeProvider};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request to the catalog service failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The catalog answered with a non-success status
    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Failed to parse the catalog's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Lifecycle status of a show
///
/// Only `Running` and `Ended` carry meaning; everything else the catalog
/// reports is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShowStatus {
    Running,
    Ended,
    Other(String),
}

impl Default for ShowStatus {
    fn default() -> Self {
        ShowStatus::Other(String::new())
    }
}

impl From<String> for ShowStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Running" => ShowStatus::Running,
            "Ended" => ShowStatus::Ended,
            _ => ShowStatus::Other(value),
        }
    }
}

impl From<ShowStatus> for String {
    fn from(value: ShowStatus) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowStatus::Running => write!(f, "Running"),
            ShowStatus::Ended => write!(f, "Ended"),
            ShowStatus::Other(other) => write!(f, "{}", other),
        }
    }
}

/// The next known episode of a running show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextEpisode {
    /// The season number of the episode
    pub season: u32,
    /// The episode number within the season
    pub episode: u32,
    /// When the episode airs
    pub airdate: DateTime<Utc>,
}

/// Represents a tv show.
///
/// A show coming straight from a search only carries the summary fields;
/// the counts and the next episode are filled in by enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    /// Catalog identifier, stable across lookups
    pub id: u64,
    /// Display name of the show
    pub name: String,
    /// Poster image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Summary text, may contain HTML markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: ShowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_episode: Option<NextEpisode>,
}

impl Show {
    /// Returns the summary with its HTML markup stripped
    pub fn summary_text(&self) -> Option<String> {
        self.summary
            .as_deref()
            .map(|s| nanohtml2text::html2text(s).trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Whether the show is still producing new episodes
    pub fn is_running(&self) -> bool {
        self.status == ShowStatus::Running
    }
}

/// Represents a single episode of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    /// The episode title
    pub name: String,
    /// The season number this episode belongs to
    pub season: u32,
    /// The episode number within the season (0 for unnumbered specials)
    pub number: u32,
    /// When the episode airs, if the catalog knows
    pub airdate: Option<DateTime<Utc>>,
}

/// A person appearing in a show and the character they play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    /// Identifier of the person
    pub id: u64,
    /// Name of the person
    pub name: String,
    /// Name of the character played
    pub character: String,
    pub image: Option<String>,
}

/// A person from the catalog's people search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub country: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub image: Option<String>,
}

/// Trait for catalog services that can answer show and people lookups.
///
/// Implementors must be shareable across tasks, since enrichment issues
/// several lookups against the same provider at once.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Searches shows by free text, in the order the catalog ranks them.
    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError>;

    /// Fetches a single show summary by identifier.
    async fn show(&self, id: u64) -> Result<Show, CatalogError>;

    /// Fetches the full episode list of a show, in catalog order.
    async fn episodes(&self, show_id: u64) -> Result<Vec<Episode>, CatalogError>;

    /// Fetches the cast of a show.
    async fn cast(&self, show_id: u64) -> Result<Vec<CastMember>, CatalogError>;

    /// Searches people by free text.
    async fn search_people(&self, query: &str) -> Result<Vec<Person>, CatalogError>;
}
