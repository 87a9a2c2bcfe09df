use std::collections::HashSet;

use crate::analyzer::TextAnalyzer;
use crate::data_models::{SearchRequest, ShallowListing};
use crate::error::ProviderError;

/// The deduplicated working set of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    /// Listings in first-seen order.
    pub listings: Vec<ShallowListing>,
    pub searched: usize,
    pub failed: usize,
}

impl Pool {
    /// Merges per-candidate search outcomes, given in submission order. The first occurrence of
    /// an id wins; later duplicates are dropped whole, not merged. A failed candidate
    /// contributes nothing.
    pub fn from_outcomes(
        candidates: &[SearchRequest],
        outcomes: Vec<Result<Vec<ShallowListing>, ProviderError>>,
    ) -> Pool {
        let mut pool = Pool::default();
        let mut seen_ids: HashSet<String> = HashSet::new();

        for (idx, outcome) in outcomes.into_iter().enumerate() {
            pool.searched += 1;
            let keywords = candidates
                .get(idx)
                .map(|c| c.keywords.as_str())
                .unwrap_or_default();
            match outcome {
                Ok(listings) => {
                    tracing::debug!(keywords, count = listings.len(), "candidate search returned");
                    for listing in listings {
                        if seen_ids.insert(listing.id.clone()) {
                            pool.listings.push(listing);
                        }
                    }
                }
                Err(e) => {
                    pool.failed += 1;
                    tracing::warn!(keywords, error = %e, "candidate search failed");
                }
            }
        }
        pool
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Terms every pooled listing is scored against: the user's own words followed by each
/// candidate's keywords, without repeats. Location and brand are not part of it.
pub fn relevance_tokens(
    analyzer: &TextAnalyzer,
    candidates: &[SearchRequest],
    user_query: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(user_query)
        .chain(candidates.iter().map(|c| c.keywords.as_str()))
        .flat_map(|text| analyzer.terms(text))
        .filter(|term| seen.insert(term.clone()))
        .collect()
}
