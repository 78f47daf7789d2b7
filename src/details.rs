//! Show details module
//!
//! Aggregates everything the detail view shows about one show: its episode
//! list grouped by season, the updated counts, and the cast. Episodes and
//! cast are fetched concurrently and fail independently.

use crate::catalog::{CastMember, CatalogProvider, Episode, Show};
use crate::enrichment::{apply_episodes, distinct_seasons};
use chrono::{DateTime, Utc};

/// The episodes of one season plus its collapse state in the detail view
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonGroup {
    pub season: u32,
    pub episodes: Vec<Episode>,
    /// Whether the season's episode list is hidden
    pub collapsed: bool,
}

/// Everything the detail view renders for a show
#[derive(Debug, Clone, PartialEq)]
pub struct ShowDetails {
    /// The show, with counts filled in when the episode lookup succeeded
    pub show: Show,
    /// Episodes in catalog order; empty if the lookup failed
    pub episodes: Vec<Episode>,
    /// Seasons in order of first appearance, all collapsed initially
    pub seasons: Vec<SeasonGroup>,
    /// Cast; empty if the lookup failed
    pub cast: Vec<CastMember>,
    /// Whether the whole episodes section is hidden
    pub episodes_collapsed: bool,
    /// Whether the cast section is hidden
    pub cast_collapsed: bool,
}

/// A collapsible section of the detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Episodes,
    Cast,
}

impl ShowDetails {
    /// Details with no facets loaded yet
    pub fn empty(show: Show) -> Self {
        Self {
            show,
            episodes: Vec::new(),
            seasons: Vec::new(),
            cast: Vec::new(),
            episodes_collapsed: true,
            cast_collapsed: true,
        }
    }

    pub fn season(&self, season: u32) -> Option<&SeasonGroup> {
        self.seasons.iter().find(|g| g.season == season)
    }

    pub fn is_collapsed(&self, season: u32) -> Option<bool> {
        self.season(season).map(|g| g.collapsed)
    }

    pub fn is_section_collapsed(&self, section: Section) -> bool {
        match section {
            Section::Episodes => self.episodes_collapsed,
            Section::Cast => self.cast_collapsed,
        }
    }

    /// Flips the collapse state of a section, returning the new state
    pub fn toggle_section(&mut self, section: Section) -> bool {
        let collapsed = match section {
            Section::Episodes => &mut self.episodes_collapsed,
            Section::Cast => &mut self.cast_collapsed,
        };
        *collapsed = !*collapsed;
        *collapsed
    }

    /// Flips the collapse state of a season
    ///
    /// Returns the new state, or `None` for an unknown season.
    pub fn toggle_season(&mut self, season: u32) -> Option<bool> {
        let group = self.seasons.iter_mut().find(|g| g.season == season)?;
        group.collapsed = !group.collapsed;
        Some(group.collapsed)
    }
}

/// Groups episodes by season, seasons in order of first appearance
pub fn group_by_season(episodes: &[Episode]) -> Vec<SeasonGroup> {
    distinct_seasons(episodes)
        .into_iter()
        .map(|season| SeasonGroup {
            season,
            episodes: episodes
                .iter()
                .filter(|e| e.season == season)
                .cloned()
                .collect(),
            collapsed: true,
        })
        .collect()
}

/// Fetches episodes and cast for `base` and builds its details
///
/// `base` is whatever is already known about the show (from a search or
/// the favourites); it is enriched, not replaced.
pub async fn aggregate(
    provider: &dyn CatalogProvider,
    base: Show,
    now: DateTime<Utc>,
) -> ShowDetails {
    let (episodes, cast) = tokio::join!(provider.episodes(base.id), provider.cast(base.id));
    let mut details = ShowDetails::empty(base);

    match episodes {
        Ok(episodes) => {
            details.show = apply_episodes(details.show, &episodes, now);
            details.seasons = group_by_season(&episodes);
            details.episodes = episodes;
        }
        Err(e) => {
            tracing::warn!(show_id = details.show.id, error = %e, "failed to fetch episodes");
        }
    }

    match cast {
        Ok(cast) => details.cast = cast,
        Err(e) => {
            tracing::warn!(show_id = details.show.id, error = %e, "failed to fetch cast");
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::{FakeCatalog, episode, show};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn cast_member(id: u64, name: &str, character: &str) -> CastMember {
        CastMember {
            id,
            name: name.to_string(),
            character: character.to_string(),
            image: None,
        }
    }

    fn five_episodes() -> Vec<Episode> {
        [1, 1, 2, 2, 3]
            .iter()
            .enumerate()
            .map(|(i, s)| episode(i as u64 + 1, *s, (i % 2) as u32 + 1, None))
            .collect()
    }

    #[test]
    fn test_group_by_season() {
        let groups = group_by_season(&five_episodes());

        assert_eq!(
            groups.iter().map(|g| g.season).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(groups.iter().all(|g| g.collapsed));
        assert_eq!(groups[0].episodes.len(), 2);
        assert_eq!(groups[2].episodes.len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_merges_both_facets() {
        let mut catalog = FakeCatalog::default();
        let mut episodes = five_episodes();
        episodes.push(episode(6, 3, 2, Some(now() + Duration::hours(5))));
        catalog.episodes.insert(1, episodes);
        catalog
            .cast
            .insert(1, vec![cast_member(7, "Adam Scott", "Mark S.")]);

        let base = Show {
            image: Some("https://img/poster.jpg".to_string()),
            ..show(1, "Severance", "Running")
        };
        let details = aggregate(&catalog, base, now()).await;

        assert_eq!(details.show.seasons_count, Some(3));
        assert_eq!(details.show.episodes_count, Some(6));
        assert_eq!(details.show.image.as_deref(), Some("https://img/poster.jpg"));
        assert_eq!(details.show.next_episode.as_ref().map(|n| n.episode), Some(2));
        assert_eq!(details.episodes.len(), 6);
        assert_eq!(details.seasons.len(), 3);
        assert_eq!(details.cast[0].character, "Mark S.");
    }

    #[tokio::test]
    async fn test_failed_cast_keeps_episodes() {
        let mut catalog = FakeCatalog::default();
        catalog.episodes.insert(1, five_episodes());

        let details = aggregate(&catalog, show(1, "Severance", "Running"), now()).await;

        assert_eq!(details.seasons.len(), 3);
        assert!(details.cast.is_empty());
    }

    #[tokio::test]
    async fn test_failed_episodes_keeps_cast() {
        let mut catalog = FakeCatalog::default();
        catalog.cast.insert(1, vec![cast_member(7, "Adam Scott", "Mark S.")]);

        let base = show(1, "Severance", "Running");
        let details = aggregate(&catalog, base.clone(), now()).await;

        assert_eq!(details.show, base);
        assert!(details.episodes.is_empty());
        assert!(details.seasons.is_empty());
        assert_eq!(details.cast.len(), 1);
    }

    #[test]
    fn test_toggle_season() {
        let mut details = ShowDetails::empty(show(1, "Severance", "Running"));
        details.seasons = group_by_season(&five_episodes());

        assert_eq!(details.is_collapsed(2), Some(true));
        assert_eq!(details.toggle_season(2), Some(false));
        assert_eq!(details.is_collapsed(2), Some(false));
        assert_eq!(details.is_collapsed(1), Some(true));
        assert_eq!(details.toggle_season(9), None);
    }

    #[tokio::test]
    async fn test_sections_start_collapsed() {
        let mut catalog = FakeCatalog::default();
        catalog.episodes.insert(1, five_episodes());
        catalog.cast.insert(1, vec![cast_member(7, "Adam Scott", "Mark S.")]);

        let mut details = aggregate(&catalog, show(1, "Severance", "Running"), now()).await;

        assert!(details.episodes_collapsed);
        assert!(details.cast_collapsed);

        assert!(!details.toggle_section(Section::Cast));
        assert!(!details.is_section_collapsed(Section::Cast));
        assert!(details.is_section_collapsed(Section::Episodes));
        assert!(details.toggle_section(Section::Cast));
    }
}
