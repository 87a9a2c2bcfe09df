use crate::analyzer::TextAnalyzer;
use crate::config::RecommenderConfig;
use crate::data_models::{ItemType, ScoredShallowListing, SearchRequest, ShallowListing};

/// Why a listing was dropped before enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    NotMarketplaceItem,
    OverBudget,
    LowSellerRating,
    BelowReasonablePrice,
}

/// The tightest max price among the candidates, else the configured default.
pub fn active_budget(candidates: &[SearchRequest], config: &RecommenderConfig) -> Option<u64> {
    candidates
        .iter()
        .filter_map(|c| c.max_price)
        .min()
        .or(config.default_max_budget)
}

/// Minimum price accepted for high budgets, where near-free listings are almost always
/// accessories or junk rather than the product asked for.
pub fn reasonable_price_floor(budget: Option<u64>, config: &RecommenderConfig) -> Option<u64> {
    let budget = budget?;
    if budget < config.high_budget_threshold {
        return None;
    }
    let scaled = (budget as f64 * config.reasonable_price_fraction) as u64;
    Some(scaled.max(config.reasonable_price_floor))
}

pub fn check_seller_rating(
    seller_rating: Option<f64>,
    config: &RecommenderConfig,
) -> Result<(), Exclusion> {
    match seller_rating {
        Some(rating) if rating < config.min_seller_rating => Err(Exclusion::LowSellerRating),
        _ => Ok(()),
    }
}

/// Hard filters, in order. The first failing one is reported.
pub fn check_filters(
    listing: &ShallowListing,
    budget: Option<u64>,
    config: &RecommenderConfig,
) -> Result<(), Exclusion> {
    if listing.item_type != ItemType::Marketplace {
        return Err(Exclusion::NotMarketplaceItem);
    }
    if let Some(budget) = budget
        && listing.price > budget
    {
        return Err(Exclusion::OverBudget);
    }
    check_seller_rating(listing.seller_rating, config)?;
    if let Some(floor) = reasonable_price_floor(budget, config)
        && listing.price < floor
    {
        return Err(Exclusion::BelowReasonablePrice);
    }
    Ok(())
}

/// Share of relevance tokens found in the listing name, in [0, 1]. A token counts when some
/// name term contains it, so "テレビ" matches "スマートテレビ".
pub fn relevance(name_terms: &[String], tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens
        .iter()
        .filter(|token| name_terms.iter().any(|term| term.contains(token.as_str())))
        .count();
    hits as f64 / tokens.len() as f64
}

/// Triangular proximity to `budget * target_price_fraction`: 1.0 at the target, falling
/// linearly to 0.0 at `target * price_decay` away from it. Zero without a budget.
pub fn price_score(price: u64, budget: Option<u64>, config: &RecommenderConfig) -> f64 {
    let Some(budget) = budget else {
        return 0.0;
    };
    let target = (budget as f64 * config.target_price_fraction).max(1.0);
    let diff = (price as f64 - target).abs();
    (1.0 - diff / (target * config.price_decay)).max(0.0)
}

pub fn combined_score(
    relevance: f64,
    seller_rating: Option<f64>,
    price_score: f64,
    config: &RecommenderConfig,
) -> f64 {
    let rating = seller_rating.unwrap_or(config.neutral_seller_rating);
    relevance * config.weights.relevance
        + rating * config.weights.seller_rating
        + price_score * config.weights.price
}

/// Filters and scores pooled listings against one run's relevance tokens and budget.
pub struct ShallowScorer<'a> {
    analyzer: &'a TextAnalyzer,
    tokens: &'a [String],
    budget: Option<u64>,
    config: &'a RecommenderConfig,
}

impl<'a> ShallowScorer<'a> {
    pub fn new(
        analyzer: &'a TextAnalyzer,
        tokens: &'a [String],
        budget: Option<u64>,
        config: &'a RecommenderConfig,
    ) -> Self {
        Self {
            analyzer,
            tokens,
            budget,
            config,
        }
    }

    pub fn score(&self, listing: ShallowListing) -> ScoredShallowListing {
        let name_terms = self.analyzer.terms(&listing.name);
        let relevance = relevance(&name_terms, self.tokens);
        let price_score = price_score(listing.price, self.budget, self.config);
        let shallow_score =
            combined_score(relevance, listing.seller_rating, price_score, self.config);
        ScoredShallowListing {
            listing,
            relevance,
            price_score,
            shallow_score,
            shallow_rank: 0,
        }
    }

    /// Drops ineligible listings, scores the rest, and keeps the best `max_candidates`.
    /// The sort is stable, so equal scores keep pool order.
    pub fn rank(&self, listings: Vec<ShallowListing>) -> Vec<ScoredShallowListing> {
        let mut scored: Vec<ScoredShallowListing> = listings
            .into_iter()
            .filter(|listing| match check_filters(listing, self.budget, self.config) {
                Ok(()) => true,
                Err(reason) => {
                    tracing::trace!(id = %listing.id, ?reason, "listing excluded");
                    false
                }
            })
            .map(|listing| self.score(listing))
            .collect();

        scored.sort_by(|a, b| b.shallow_score.total_cmp(&a.shallow_score));
        scored.truncate(self.config.max_candidates);
        for (rank, s) in scored.iter_mut().enumerate() {
            s.shallow_rank = rank;
        }
        scored
    }
}
