use futures::future::join_all;

use crate::data_models::{FullListing, ScoredShallowListing};
use crate::provider::SearchProvider;

/// A shallow candidate whose detail fetch succeeded, still carrying its shallow signals.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedListing {
    pub listing: FullListing,
    pub relevance: f64,
    pub price_score: f64,
    pub shallow_score: f64,
    pub shallow_rank: usize,
}

/// Fetches detail for every candidate concurrently and waits for all of them. A failed fetch
/// drops only that listing. Output keeps the input order; results are joined back to their
/// candidate by position, never by completion order.
pub async fn enrich(
    provider: &dyn SearchProvider,
    candidates: Vec<ScoredShallowListing>,
) -> Vec<EnrichedListing> {
    let fetches = candidates
        .iter()
        .map(|c| provider.fetch_detail(&c.listing.id));
    let details = join_all(fetches).await;

    let total = candidates.len();
    let enriched: Vec<EnrichedListing> = candidates
        .into_iter()
        .zip(details)
        .filter_map(|(scored, detail)| match detail {
            Ok(detail) => Some(EnrichedListing {
                listing: scored.listing.merge(detail),
                relevance: scored.relevance,
                price_score: scored.price_score,
                shallow_score: scored.shallow_score,
                shallow_rank: scored.shallow_rank,
            }),
            Err(e) => {
                tracing::warn!(id = %scored.listing.id, error = %e, "enrichment failed, dropping listing");
                None
            }
        })
        .collect();

    tracing::debug!(requested = total, enriched = enriched.len(), "enrichment finished");
    enriched
}
