use crate::config::RecommenderConfig;
use crate::data_models::{ItemStatus, ItemType, RankedList, RankedListing};
use crate::enricher::EnrichedListing;
use crate::scoring::{check_seller_rating, combined_score};

/// Deep score of one enriched listing, or `None` when its detail disqualifies it: the merged
/// seller rating is below the minimum, or the listing is no longer an on-sale marketplace item.
///
/// The base is recomputed with merged attributes, so a detail seller rating replaces the
/// shallow one; without new detail it equals the shallow score.
pub fn deep_score(enriched: &EnrichedListing, config: &RecommenderConfig) -> Option<f64> {
    let listing = &enriched.listing;
    if listing.item_type != ItemType::Marketplace || listing.status != ItemStatus::OnSale {
        return None;
    }
    check_seller_rating(listing.seller_rating, config).ok()?;

    let base = combined_score(
        enriched.relevance,
        listing.seller_rating,
        enriched.price_score,
        config,
    );
    let bonus = if listing.seller_pays_shipping() {
        config.shipping_bonus
    } else {
        0.0
    };
    Some(base + bonus)
}

/// Orders enriched listings by deep score, best first, ties going to the better shallow rank,
/// and cuts the list at `max_return`.
pub fn deep_rank(enriched: Vec<EnrichedListing>, config: &RecommenderConfig) -> RankedList {
    let mut ranked: Vec<RankedListing> = enriched
        .into_iter()
        .filter_map(|e| {
            let deep_score = deep_score(&e, config)?;
            Some(RankedListing {
                listing: e.listing,
                shallow_score: e.shallow_score,
                shallow_rank: e.shallow_rank,
                deep_score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.deep_score
            .total_cmp(&a.deep_score)
            .then(a.shallow_rank.cmp(&b.shallow_rank))
    });
    ranked.truncate(config.max_return);
    RankedList(ranked)
}
