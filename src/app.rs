//! Application state module
//!
//! [`Showdown`] owns all view state: favourites, show and people search
//! results, the registry of every show seen this session, and the details
//! of the selected show. Views read snapshots of that state and change it
//! only through the methods here.
//!
//! Searches and detail lookups are tagged with a generation number when
//! they start. A response whose generation is no longer the latest is
//! dropped, so a slow earlier query can never overwrite a newer one.

use crate::catalog::{CatalogError, CatalogProvider, Person, Show};
use crate::details::{Section, ShowDetails, aggregate};
use crate::enrichment::enrich_show;
use crate::favourites::{FavouritesStore, compare_by_next_episode};
use crate::search::search_shows;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Error shown when the show search itself fails
pub const SHOW_SEARCH_ERROR: &str = "Failed to fetch shows";

/// Error shown when the people search itself fails
pub const PEOPLE_SEARCH_ERROR: &str = "Failed to fetch people";

/// Maximum number of shows in the upcoming view
pub const UPCOMING_LIMIT: usize = 10;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What happened to the result of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query was blank; results were cleared without a request
    Cleared,
    /// The response (or error) is now the visible state
    Applied,
    /// A newer query started meanwhile; the response was dropped
    Stale,
}

/// Results of one kind of search as the view renders them
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState<T> {
    pub query: String,
    pub results: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T> SearchState<T> {
    /// Starts a new query and returns its generation
    fn begin(&mut self, query: &str) -> u64 {
        self.generation += 1;
        self.query = query.to_string();
        self.error = None;
        if query.is_empty() {
            self.results.clear();
            self.loading = false;
        } else {
            self.loading = true;
        }
        self.generation
    }

    /// Publishes a response unless a newer query has started
    fn finish(&mut self, generation: u64, result: Result<Vec<T>, String>) -> SearchOutcome {
        if generation != self.generation {
            return SearchOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(results) => self.results = results,
            Err(message) => {
                self.results.clear();
                self.error = Some(message);
            }
        }
        SearchOutcome::Applied
    }
}

#[derive(Default)]
struct DetailState {
    details: Option<ShowDetails>,
    loading: bool,
    generation: u64,
}

struct ViewState {
    favourites: FavouritesStore,
    shows: SearchState<Show>,
    people: SearchState<Person>,
    /// Every show seen this session, in order of first sighting
    seen: Vec<Show>,
    selected: DetailState,
}

/// The application controller
pub struct Showdown {
    provider: Arc<dyn CatalogProvider>,
    state: Mutex<ViewState>,
    clock: Clock,
}

impl Showdown {
    /// Creates the controller and loads the favourites from `store`
    pub async fn new(provider: Arc<dyn CatalogProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let favourites = FavouritesStore::load(store).await;

        Self {
            provider,
            state: Mutex::new(ViewState {
                favourites,
                shows: SearchState::default(),
                people: SearchState::default(),
                seen: Vec::new(),
                selected: DetailState::default(),
            }),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for next-episode computation
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The instant next episodes and countdowns are measured against
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Searches shows and publishes the enriched results
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        let generation = self.lock().shows.begin(query);
        if query.is_empty() {
            return SearchOutcome::Cleared;
        }

        let result = search_shows(self.provider.as_ref(), query, self.now()).await;

        let mut state = self.lock();
        let result = match result {
            Ok(shows) => Ok(shows),
            Err(e) => {
                tracing::warn!(query, error = %e, "show search failed");
                Err(SHOW_SEARCH_ERROR.to_string())
            }
        };

        let registered = result.as_ref().ok().cloned().unwrap_or_default();
        let outcome = state.shows.finish(generation, result);
        match outcome {
            SearchOutcome::Applied => register_seen(&mut state.seen, registered),
            _ => tracing::debug!(query, "discarding stale show search response"),
        }
        outcome
    }

    /// Searches people and publishes the results
    pub async fn search_people(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        let generation = self.lock().people.begin(query);
        if query.is_empty() {
            return SearchOutcome::Cleared;
        }

        let result = self
            .provider
            .search_people(query)
            .await
            .map_err(|e| {
                tracing::warn!(query, error = %e, "people search failed");
                PEOPLE_SEARCH_ERROR.to_string()
            });

        let outcome = self.lock().people.finish(generation, result);
        if outcome == SearchOutcome::Stale {
            tracing::debug!(query, "discarding stale people search response");
        }
        outcome
    }

    /// Selects a show and loads its details
    ///
    /// The base show is visible immediately; episodes and cast arrive when
    /// both lookups have settled. Returns `false` if another show was
    /// selected in the meantime and this result was dropped.
    pub async fn open_details(&self, show: Show) -> bool {
        let generation = {
            let mut state = self.lock();
            let selected = &mut state.selected;
            selected.generation += 1;
            selected.loading = true;
            selected.details = Some(ShowDetails::empty(show.clone()));
            selected.generation
        };

        let details = aggregate(self.provider.as_ref(), show, self.now()).await;

        let mut state = self.lock();
        if state.selected.generation != generation {
            tracing::debug!(show_id = details.show.id, "discarding stale show details");
            return false;
        }
        state.selected.loading = false;
        state.selected.details = Some(details);
        true
    }

    /// Deselects the current show
    pub fn close_details(&self) {
        let mut state = self.lock();
        state.selected.generation += 1;
        state.selected.loading = false;
        state.selected.details = None;
    }

    /// Details of the selected show, if any
    pub fn details(&self) -> Option<ShowDetails> {
        self.lock().selected.details.clone()
    }

    /// Whether the selected show's episodes and cast are still loading
    pub fn details_loading(&self) -> bool {
        self.lock().selected.loading
    }

    /// Expands or collapses a season of the selected show
    pub fn toggle_season(&self, season: u32) -> Option<bool> {
        self.lock()
            .selected
            .details
            .as_mut()
            .and_then(|d| d.toggle_season(season))
    }

    /// Expands or collapses the episodes or cast section of the selected show
    pub fn toggle_section(&self, section: Section) -> Option<bool> {
        self.lock()
            .selected
            .details
            .as_mut()
            .map(|d| d.toggle_section(section))
    }

    /// The current show search state
    pub fn show_search(&self) -> SearchState<Show> {
        self.lock().shows.clone()
    }

    /// The current people search state
    pub fn people_search(&self) -> SearchState<Person> {
        self.lock().people.clone()
    }

    /// Every show seen in a search this session
    pub fn seen_shows(&self) -> Vec<Show> {
        self.lock().seen.clone()
    }

    /// Seen shows with a known next episode, soonest first
    pub fn upcoming(&self) -> Vec<Show> {
        let mut upcoming: Vec<Show> = self
            .lock()
            .seen
            .iter()
            .filter(|s| s.next_episode.is_some())
            .cloned()
            .collect();
        upcoming.sort_by(compare_by_next_episode);
        upcoming.truncate(UPCOMING_LIMIT);
        upcoming
    }

    /// Favourites, soonest next episode first
    pub fn favourites(&self) -> Vec<Show> {
        self.lock().favourites.sorted()
    }

    pub fn is_favourite(&self, id: u64) -> bool {
        self.lock().favourites.contains(id)
    }

    /// Toggles a show's favourite membership, returning the new membership
    pub fn toggle_favourite(&self, show: Show) -> bool {
        self.lock().favourites.toggle(show)
    }

    pub fn add_favourite(&self, show: Show) -> bool {
        self.lock().favourites.add(show)
    }

    pub fn remove_favourite(&self, id: u64) -> bool {
        self.lock().favourites.remove(id)
    }

    /// Looks up a show, preferring what this session has already seen
    pub async fn find_show(&self, id: u64) -> Result<Show, CatalogError> {
        let known = self.lock().seen.iter().find(|s| s.id == id).cloned();
        match known {
            Some(show) => Ok(show),
            None => self.provider.show(id).await,
        }
    }

    /// Toggles a favourite knowing only the show's identifier
    ///
    /// Removing needs no lookup. Adding uses the show as already seen this
    /// session, or looks it up and enriches it first.
    pub async fn toggle_favourite_by_id(&self, id: u64) -> Result<bool, CatalogError> {
        let known = {
            let mut state = self.lock();
            if state.favourites.remove(id) {
                return Ok(false);
            }
            state.seen.iter().find(|s| s.id == id).cloned()
        };

        let show = match known {
            Some(show) => show,
            None => {
                let base = self.provider.show(id).await?;
                enrich_show(self.provider.as_ref(), base, self.now())
                    .await
                    .into_show()
            }
        };

        Ok(self.lock().favourites.add(show))
    }

    /// Resolves once all favourites changes so far are persisted
    pub fn flush(&self) -> impl Future<Output = ()> + Send + 'static {
        self.lock().favourites.flush()
    }
}

/// Appends shows not seen before, keeping the first sighting
fn register_seen(seen: &mut Vec<Show>, shows: Vec<Show>) {
    let mut known: HashSet<u64> = seen.iter().map(|s| s.id).collect();
    seen.extend(shows.into_iter().filter(|s| known.insert(s.id)));
}
