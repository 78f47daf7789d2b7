//! Show search module
//!
//! Runs a free-text show search and enriches every hit with its season and
//! episode counts and next episode. Per-show lookups run concurrently and a
//! failing one only leaves its own show un-enriched.

use crate::catalog::{CatalogError, CatalogProvider, Show};
use crate::enrichment::{Enrichment, enrich_show};
use chrono::{DateTime, Utc};
use futures::future::join_all;

/// Searches shows matching `query` and enriches each of them
///
/// Results keep the order the catalog returned them in. Only a failure of
/// the search itself is an error.
pub async fn search_shows(
    provider: &dyn CatalogProvider,
    query: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Show>, CatalogError> {
    let summaries = provider.search_shows(query).await?;
    tracing::debug!(query, hits = summaries.len(), "show search answered");

    let enrichments = join_all(
        summaries
            .into_iter()
            .map(|show| enrich_show(provider, show, now)),
    )
    .await;

    let degraded = enrichments.iter().filter(|e| !e.is_enriched()).count();
    if degraded > 0 {
        tracing::info!(query, degraded, "some search results could not be enriched");
    }

    Ok(enrichments.into_iter().map(Enrichment::into_show).collect())
}
