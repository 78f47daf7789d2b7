/// TVMaze catalog provider implementation.
use super::tvmaze_types::{
    TvMazeCastCredit, TvMazeEpisode, TvMazeImage, TvMazePerson, TvMazePersonHit, TvMazeShow,
    TvMazeShowHit,
};
use super::{CastMember, CatalogError, CatalogProvider, Episode, Person, Show, ShowStatus};
use crate::countdown::parse_air_time;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default location of the public TVMaze API
pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// Catalog provider for the TVMaze API.
///
/// This provider fetches show, episode, cast and people information from
/// https://api.tvmaze.com (or any API-compatible base URL).
pub struct TvMazeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl TvMazeProvider {
    /// Creates a new TVMaze provider against the public API.
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a new TVMaze provider against the given base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| CatalogError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issues a GET request and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?query, "catalog request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::RequestError(e.to_string()))?;

        if response.status() == 404 {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus {
                status: response.status().as_u16(),
                reason: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }

    fn medium_image(image: Option<TvMazeImage>) -> Option<String> {
        image.and_then(|i| i.medium)
    }

    /// Converts a TVMaze show to our internal Show structure.
    fn convert_show(show: TvMazeShow) -> Show {
        Show {
            id: show.id,
            name: show.name,
            image: Self::medium_image(show.image),
            summary: show.summary,
            status: show.status.map(ShowStatus::from).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Converts a TVMaze episode to our internal Episode structure.
    ///
    /// The air stamp wins over the bare air date, which only has day
    /// precision.
    fn convert_episode(episode: TvMazeEpisode) -> Episode {
        let airdate = episode
            .airstamp
            .as_deref()
            .and_then(parse_air_time)
            .or_else(|| episode.airdate.as_deref().and_then(parse_air_time));

        Episode {
            id: episode.id,
            name: episode.name.unwrap_or_else(|| "Unknown".to_string()),
            season: episode.season,
            number: episode.number.unwrap_or(0),
            airdate,
        }
    }

    fn convert_cast(credit: TvMazeCastCredit) -> CastMember {
        CastMember {
            id: credit.person.id,
            name: credit.person.name,
            character: credit.character.name,
            image: Self::medium_image(credit.person.image),
        }
    }

    fn convert_person(person: TvMazePerson) -> Person {
        Person {
            id: person.id,
            name: person.name,
            country: person.country.map(|c| c.name),
            birthday: person.birthday,
            gender: person.gender,
            image: Self::medium_image(person.image),
        }
    }
}

#[async_trait]
impl CatalogProvider for TvMazeProvider {
    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError> {
        let hits: Vec<TvMazeShowHit> = self.get_json("/search/shows", &[("q", query)]).await?;
        Ok(hits
            .into_iter()
            .map(|hit| Self::convert_show(hit.show))
            .collect())
    }

    async fn show(&self, id: u64) -> Result<Show, CatalogError> {
        let show: TvMazeShow = self.get_json(&format!("/shows/{}", id), &[]).await?;
        Ok(Self::convert_show(show))
    }

    async fn episodes(&self, show_id: u64) -> Result<Vec<Episode>, CatalogError> {
        let episodes: Vec<TvMazeEpisode> = self
            .get_json(&format!("/shows/{}/episodes", show_id), &[])
            .await?;
        Ok(episodes.into_iter().map(Self::convert_episode).collect())
    }

    async fn cast(&self, show_id: u64) -> Result<Vec<CastMember>, CatalogError> {
        let credits: Vec<TvMazeCastCredit> = self
            .get_json(&format!("/shows/{}/cast", show_id), &[])
            .await?;
        Ok(credits.into_iter().map(Self::convert_cast).collect())
    }

    async fn search_people(&self, query: &str) -> Result<Vec<Person>, CatalogError> {
        let hits: Vec<TvMazePersonHit> =
            self.get_json("/search/people", &[("q", query)]).await?;
        Ok(hits
            .into_iter()
            .map(|hit| Self::convert_person(hit.person))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_convert_search_hit() {
        let json = r#"[{
            "score": 0.9,
            "show": {
                "id": 169,
                "name": "Breaking Bad",
                "status": "Ended",
                "summary": "<p>A chemistry teacher.</p>",
                "image": {"medium": "https://img/m.jpg", "original": "https://img/o.jpg"},
                "language": "English"
            }
        }, {
            "score": 0.4,
            "show": {"id": 7, "name": "Odd One", "status": null, "summary": null, "image": null}
        }]"#;

        let hits: Vec<TvMazeShowHit> = serde_json::from_str(json).unwrap();
        let shows: Vec<Show> = hits
            .into_iter()
            .map(|h| TvMazeProvider::convert_show(h.show))
            .collect();

        assert_eq!(shows[0].id, 169);
        assert_eq!(shows[0].status, ShowStatus::Ended);
        assert_eq!(shows[0].image.as_deref(), Some("https://img/m.jpg"));
        assert_eq!(shows[0].seasons_count, None);
        assert_eq!(shows[1].image, None);
        assert_eq!(shows[1].status, ShowStatus::Other(String::new()));
    }

    #[test]
    fn test_convert_episode_prefers_airstamp() {
        let json = r#"[
            {"id": 1, "name": "Pilot", "season": 1, "number": 1,
             "airdate": "2024-01-10", "airstamp": "2024-01-10T02:00:00+00:00"},
            {"id": 2, "name": null, "season": 1, "number": null,
             "airdate": "2024-01-17", "airstamp": null},
            {"id": 3, "name": "TBA", "season": 2, "number": 1,
             "airdate": "", "airstamp": null}
        ]"#;

        let episodes: Vec<Episode> = serde_json::from_str::<Vec<TvMazeEpisode>>(json)
            .unwrap()
            .into_iter()
            .map(TvMazeProvider::convert_episode)
            .collect();

        assert_eq!(
            episodes[0].airdate,
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 2, 0, 0).unwrap())
        );
        assert_eq!(episodes[1].name, "Unknown");
        assert_eq!(episodes[1].number, 0);
        assert_eq!(
            episodes[1].airdate,
            Some(Utc.with_ymd_and_hms(2024, 1, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(episodes[2].airdate, None);
    }

    #[test]
    fn test_convert_cast_and_people() {
        let cast_json = r#"[{
            "person": {"id": 14245, "name": "Bryan Cranston", "country": null,
                       "birthday": "1956-03-07", "gender": "Male",
                       "image": {"medium": "https://img/bc.jpg"}},
            "character": {"id": 1, "name": "Walter White", "image": null}
        }]"#;
        let credits: Vec<TvMazeCastCredit> = serde_json::from_str(cast_json).unwrap();
        let cast = TvMazeProvider::convert_cast(credits.into_iter().next().unwrap());
        assert_eq!(cast.id, 14245);
        assert_eq!(cast.character, "Walter White");
        assert_eq!(cast.image.as_deref(), Some("https://img/bc.jpg"));

        let people_json = r#"[{
            "score": 1.0,
            "person": {"id": 1, "name": "Jane Doe",
                       "country": {"name": "Canada", "code": "CA"},
                       "birthday": null, "gender": null, "image": null}
        }]"#;
        let hits: Vec<TvMazePersonHit> = serde_json::from_str(people_json).unwrap();
        let person = TvMazeProvider::convert_person(hits.into_iter().next().unwrap().person);
        assert_eq!(person.country.as_deref(), Some("Canada"));
        assert_eq!(person.birthday, None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = TvMazeProvider::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080");
    }
}
