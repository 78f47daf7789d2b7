//! Show enrichment module
//!
//! Derives season and episode counts and the next upcoming episode from a
//! show's episode list. Each enrichment attempt produces an explicit
//! [`Enrichment`] so a failed lookup degrades only the show it belongs to.

use crate::catalog::{CatalogError, CatalogProvider, Episode, NextEpisode, Show};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Outcome of enriching one show
#[derive(Debug)]
pub enum Enrichment {
    /// Counts (and for running shows, the next episode) were filled in
    Enriched(Show),
    /// The episode lookup failed; the show keeps its base fields only
    BaseOnly { show: Show, error: CatalogError },
}

impl Enrichment {
    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }

    /// The show, enriched or not
    pub fn into_show(self) -> Show {
        match self {
            Enrichment::Enriched(show) => show,
            Enrichment::BaseOnly { show, .. } => show,
        }
    }
}

/// Distinct season numbers in order of first appearance
pub fn distinct_seasons(episodes: &[Episode]) -> Vec<u32> {
    let mut seen = HashSet::new();
    episodes
        .iter()
        .map(|e| e.season)
        .filter(|season| seen.insert(*season))
        .collect()
}

/// The earliest episode airing strictly after `now`
///
/// Episodes without an air time are never upcoming.
pub fn next_episode(episodes: &[Episode], now: DateTime<Utc>) -> Option<NextEpisode> {
    episodes
        .iter()
        .filter_map(|e| e.airdate.filter(|at| *at > now).map(|at| (at, e)))
        .min_by_key(|(at, _)| *at)
        .map(|(airdate, e)| NextEpisode {
            season: e.season,
            episode: e.number,
            airdate,
        })
}

/// Applies the derived fields from `episodes` to `show`
///
/// The next episode is only looked for while the show is running.
pub fn apply_episodes(mut show: Show, episodes: &[Episode], now: DateTime<Utc>) -> Show {
    show.seasons_count = Some(distinct_seasons(episodes).len());
    show.episodes_count = Some(episodes.len());
    show.next_episode = if show.is_running() {
        next_episode(episodes, now)
    } else {
        None
    };
    show
}

/// Merges the result of an episode lookup into `show`
pub fn enrich(
    show: Show,
    episodes: Result<Vec<Episode>, CatalogError>,
    now: DateTime<Utc>,
) -> Enrichment {
    match episodes {
        Ok(episodes) => Enrichment::Enriched(apply_episodes(show, &episodes, now)),
        Err(error) => Enrichment::BaseOnly { show, error },
    }
}

/// Looks up the episodes of `show` and enriches it
pub async fn enrich_show(
    provider: &dyn CatalogProvider,
    show: Show,
    now: DateTime<Utc>,
) -> Enrichment {
    let episodes = provider.episodes(show.id).await;
    let enrichment = enrich(show, episodes, now);

    if let Enrichment::BaseOnly { show, error } = &enrichment {
        tracing::debug!(show_id = show.id, %error, "keeping base fields, enrichment failed");
    }

    enrichment
}
