//! Scripted in-memory catalog for tests
//!
//! Every lookup answers from the tables below. Lookups with no entry fail
//! with a request error, which is how tests simulate a broken catalog.

use super::{CastMember, CatalogError, CatalogProvider, Episode, Person, Show};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub searches: HashMap<String, Vec<Show>>,
    pub shows: HashMap<u64, Show>,
    pub episodes: HashMap<u64, Vec<Episode>>,
    pub cast: HashMap<u64, Vec<CastMember>>,
    pub people: HashMap<String, Vec<Person>>,
    /// Lookups that block until the paired sender fires
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    requests: AtomicUsize,
}

impl FakeCatalog {
    /// Holds back lookups keyed by `key` until the returned sender fires.
    ///
    /// Keys are a search query or `show:{id}` / `episodes:{id}` / `cast:{id}`.
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    /// Number of lookups issued so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` lookups have been issued
    ///
    /// Panics if that does not happen within a few seconds, so a lookup
    /// that never starts fails the test instead of hanging it.
    pub async fn wait_for_requests(&self, count: usize) {
        let reached = async {
            while self.request_count() < count {
                tokio::task::yield_now().await;
            }
        };
        if tokio::time::timeout(Duration::from_secs(5), reached).await.is_err() {
            panic!(
                "expected {} lookups, only {} were issued",
                count,
                self.request_count()
            );
        }
    }

    async fn enter(&self, key: &str) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

fn missing(what: String) -> CatalogError {
    CatalogError::RequestError(format!("no scripted answer for {}", what))
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError> {
        self.enter(query).await;
        self.searches
            .get(query)
            .cloned()
            .ok_or_else(|| missing(format!("search '{}'", query)))
    }

    async fn show(&self, id: u64) -> Result<Show, CatalogError> {
        self.enter(&format!("show:{}", id)).await;
        self.shows
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("/shows/{}", id)))
    }

    async fn episodes(&self, show_id: u64) -> Result<Vec<Episode>, CatalogError> {
        self.enter(&format!("episodes:{}", show_id)).await;
        self.episodes
            .get(&show_id)
            .cloned()
            .ok_or_else(|| missing(format!("episodes of {}", show_id)))
    }

    async fn cast(&self, show_id: u64) -> Result<Vec<CastMember>, CatalogError> {
        self.enter(&format!("cast:{}", show_id)).await;
        self.cast
            .get(&show_id)
            .cloned()
            .ok_or_else(|| missing(format!("cast of {}", show_id)))
    }

    async fn search_people(&self, query: &str) -> Result<Vec<Person>, CatalogError> {
        self.enter(query).await;
        self.people
            .get(query)
            .cloned()
            .ok_or_else(|| missing(format!("people '{}'", query)))
    }
}

/// Builds a bare search summary
pub(crate) fn show(id: u64, name: &str, status: &str) -> Show {
    Show {
        id,
        name: name.to_string(),
        status: status.to_string().into(),
        ..Default::default()
    }
}

/// Builds an episode airing at the given instant
pub(crate) fn episode(
    id: u64,
    season: u32,
    number: u32,
    airdate: Option<chrono::DateTime<chrono::Utc>>,
) -> Episode {
    Episode {
        id,
        name: format!("Episode {}", id),
        season,
        number,
        airdate,
    }
}
