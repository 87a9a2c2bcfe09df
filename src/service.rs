use futures::future::join_all;
use nanoid::nanoid;
use std::sync::Arc;
use tracing::Instrument;

use crate::analyzer::TextAnalyzer;
use crate::config::RecommenderConfig;
use crate::data_models::{RankedList, SearchRequest};
use crate::enricher::enrich;
use crate::error::RecommendError;
use crate::pool::{Pool, relevance_tokens};
use crate::provider::SearchProvider;
use crate::ranking::deep_rank;
use crate::scoring::{ShallowScorer, active_budget};

/// Shallow search → pool → filter and score → enrich → deep rank.
pub struct RecommendationService {
    provider: Arc<dyn SearchProvider>,
    analyzer: TextAnalyzer,
    config: RecommenderConfig,
}

impl RecommendationService {
    pub fn new(provider: Arc<dyn SearchProvider>, config: RecommenderConfig) -> Self {
        Self {
            provider,
            analyzer: TextAnalyzer::default(),
            config,
        }
    }

    /// Runs the whole pipeline for one user request.
    ///
    /// Fails only when no usable candidate is given. Provider failures are absorbed: a
    /// failed search contributes nothing, a failed detail fetch drops one listing, and if
    /// every search fails the result is simply empty.
    pub async fn recommend(
        &self,
        candidates: &[SearchRequest],
        user_query: &str,
    ) -> Result<RankedList, RecommendError> {
        let candidates: Vec<SearchRequest> = candidates
            .iter()
            .filter(|c| !c.keywords.trim().is_empty())
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Err(RecommendError::EmptyInput);
        }

        let run_id = nanoid!(8);
        let span = tracing::info_span!("recommend", run = %run_id);
        self.run(candidates, user_query).instrument(span).await
    }

    async fn run(
        &self,
        candidates: Vec<SearchRequest>,
        user_query: &str,
    ) -> Result<RankedList, RecommendError> {
        let searches = candidates
            .iter()
            .map(|c| self.provider.search(c, self.config.max_shallow));
        let outcomes = join_all(searches).await;
        let pool = Pool::from_outcomes(&candidates, outcomes);
        tracing::info!(
            searched = pool.searched,
            failed = pool.failed,
            pooled = pool.len(),
            "searches settled"
        );
        if pool.is_empty() {
            return Ok(RankedList::default());
        }

        let tokens = relevance_tokens(&self.analyzer, &candidates, user_query);
        let budget = active_budget(&candidates, &self.config);
        let scorer = ShallowScorer::new(&self.analyzer, &tokens, budget, &self.config);
        let shortlisted = scorer.rank(pool.listings);
        tracing::debug!(?budget, tokens = ?tokens, shortlisted = shortlisted.len(), "shallow ranking done");

        let enriched = enrich(self.provider.as_ref(), shortlisted).await;
        let ranked = deep_rank(enriched, &self.config);
        tracing::info!(returned = ranked.len(), "recommendation ready");
        Ok(ranked)
    }
}
