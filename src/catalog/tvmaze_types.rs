/// TVMaze API response types for deserialization.
///
/// These structures mirror the JSON response format from the TVMaze API.
use serde::Deserialize;

/// One hit from the `/search/shows` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShowHit {
    pub show: TvMazeShow,
}

/// A show as returned by `/search/shows` and `/shows/{id}`.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShow {
    pub id: u64,
    /// The name of the TV show
    pub name: String,
    /// Lifecycle status, e.g. "Running" or "Ended" (may be null)
    pub status: Option<String>,
    /// Summary in HTML format (may be null)
    pub summary: Option<String>,
    pub image: Option<TvMazeImage>,
}

/// Image references; only the medium variant is used.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    pub medium: Option<String>,
}

/// A single episode from the `/shows/{id}/episodes` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisode {
    pub id: u64,
    /// Episode title (may be null for episodes without a title)
    pub name: Option<String>,
    /// Season number
    pub season: u32,
    /// Episode number within the season (null for specials)
    pub number: Option<u32>,
    /// Air date as `YYYY-MM-DD`, empty when unknown
    pub airdate: Option<String>,
    /// Air date and time in RFC 3339 (may be null)
    pub airstamp: Option<String>,
}

/// One entry from the `/shows/{id}/cast` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCastCredit {
    pub person: TvMazePerson,
    pub character: TvMazeCharacter,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCharacter {
    pub name: String,
}

/// One hit from the `/search/people` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazePersonHit {
    pub person: TvMazePerson,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazePerson {
    pub id: u64,
    pub name: String,
    pub country: Option<TvMazeCountry>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub image: Option<TvMazeImage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCountry {
    pub name: String,
}
