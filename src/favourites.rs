//! Favourites module
//!
//! Keeps the user's favourite shows in memory and mirrors every change to
//! durable storage as a full JSON snapshot. Writes happen on a background
//! task in mutation order; the caller never waits for them.

use crate::catalog::Show;
use crate::storage::KeyValueStore;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Storage key holding the favourites snapshot
pub const FAVOURITES_KEY: &str = "favourites";

enum WriteCommand {
    Snapshot(String),
    Flush(oneshot::Sender<()>),
}

/// The list of favourite shows, ordered by when they were added
pub struct FavouritesStore {
    shows: Vec<Show>,
    writer: mpsc::UnboundedSender<WriteCommand>,
}

impl FavouritesStore {
    /// Loads the favourites snapshot from `store`
    ///
    /// A missing, unreadable or malformed snapshot yields an empty list.
    /// Must be called from within a tokio runtime, since it spawns the
    /// snapshot writer.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let shows = match store.get(FAVOURITES_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Show>>(&raw) {
                Ok(shows) => dedup_by_id(shows),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed favourites snapshot");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favourites snapshot");
                Vec::new()
            }
        };
        tracing::debug!(count = shows.len(), "loaded favourites");

        let (writer, commands) = mpsc::unbounded_channel();
        tokio::spawn(write_snapshots(store, commands));

        Self { shows, writer }
    }

    /// Favourites in the order they were added
    pub fn shows(&self) -> &[Show] {
        &self.shows
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.shows.iter().any(|s| s.id == id)
    }

    /// Adds a show unless one with the same id is already present
    ///
    /// Returns whether the list changed.
    pub fn add(&mut self, show: Show) -> bool {
        if self.contains(show.id) {
            return false;
        }
        self.shows.push(show);
        self.persist();
        true
    }

    /// Removes the show with the given id, returning whether it was present
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.shows.len();
        self.shows.retain(|s| s.id != id);
        if self.shows.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Adds the show if absent, removes it if present
    ///
    /// Returns whether the show is a favourite afterwards.
    pub fn toggle(&mut self, show: Show) -> bool {
        if self.remove(show.id) {
            false
        } else {
            self.add(show)
        }
    }

    /// Favourites ordered by the next episode's air time, soonest first
    ///
    /// Shows without a known next episode go last. Ties and the shows
    /// without a next episode are ordered by name, ignoring case.
    pub fn sorted(&self) -> Vec<Show> {
        let mut sorted = self.shows.clone();
        sorted.sort_by(compare_by_next_episode);
        sorted
    }

    /// Resolves once every snapshot queued so far has been written
    ///
    /// The returned future does not borrow the store.
    pub fn flush(&self) -> impl Future<Output = ()> + Send + 'static + use<> {
        let (done, finished) = oneshot::channel();
        let queued = self.writer.send(WriteCommand::Flush(done)).is_ok();
        async move {
            if queued {
                let _ = finished.await;
            }
        }
    }

    /// Queues a snapshot of the current list for writing
    fn persist(&self) {
        let snapshot = match serde_json::to_string(&self.shows) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize favourites");
                return;
            }
        };

        if self.writer.send(WriteCommand::Snapshot(snapshot)).is_err() {
            tracing::warn!("favourites writer has stopped, change not persisted");
        }
    }
}

/// Orders shows by next episode air time, then by case-insensitive name
pub fn compare_by_next_episode(a: &Show, b: &Show) -> Ordering {
    let a_time = a.next_episode.as_ref().map(|n| n.airdate);
    let b_time = b.next_episode.as_ref().map(|n| n.airdate);

    let by_time = match (a_time, b_time) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_time.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

fn dedup_by_id(shows: Vec<Show>) -> Vec<Show> {
    let mut seen = HashSet::new();
    shows.into_iter().filter(|s| seen.insert(s.id)).collect()
}

async fn write_snapshots(
    store: Arc<dyn KeyValueStore>,
    mut commands: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            WriteCommand::Snapshot(snapshot) => {
                if let Err(e) = store.set(FAVOURITES_KEY, &snapshot).await {
                    tracing::warn!(error = %e, "failed to persist favourites");
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
