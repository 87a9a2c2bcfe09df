#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bazaar::data_models::{ListingDetail, SearchRequest, ShallowListing, ShippingPayer};
use bazaar::error::ProviderError;
use bazaar::provider::SearchProvider;

/// In-memory provider with scripted results and failures, keyed by candidate keywords and
/// listing id.
#[derive(Default)]
pub struct StubProvider {
    searches: HashMap<String, Vec<ShallowListing>>,
    failing_searches: Vec<String>,
    details: HashMap<String, ListingDetail>,
    failing_details: Vec<String>,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, keywords: &str, listings: Vec<ShallowListing>) -> Self {
        self.searches.insert(keywords.to_string(), listings);
        self
    }

    pub fn with_failing_search(mut self, keywords: &str) -> Self {
        self.failing_searches.push(keywords.to_string());
        self
    }

    pub fn with_detail(mut self, id: &str, detail: ListingDetail) -> Self {
        self.details.insert(id.to_string(), detail);
        self
    }

    pub fn with_failing_detail(mut self, id: &str) -> Self {
        self.failing_details.push(id.to_string());
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StubProvider {
    async fn search(
        &self,
        request: &SearchRequest,
        limit: usize,
    ) -> Result<Vec<ShallowListing>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing_searches.contains(&request.keywords) {
            return Err(ProviderError::Status {
                endpoint: "search".to_string(),
                status: 503,
            });
        }
        let mut listings = self
            .searches
            .get(&request.keywords)
            .cloned()
            .unwrap_or_default();
        listings.truncate(limit);
        Ok(listings)
    }

    async fn fetch_detail(&self, id: &str) -> Result<ListingDetail, ProviderError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing_details.iter().any(|f| f == id) {
            return Err(ProviderError::Decode(format!("detail for {id} unavailable")));
        }
        Ok(self.details.get(id).cloned().unwrap_or_default())
    }
}

pub fn listing(id: &str, name: &str, price: u64, rating: f64) -> ShallowListing {
    ShallowListing::new(id, name, price).with_rating(rating)
}

pub fn shipped_by(payer: ShippingPayer) -> ListingDetail {
    ListingDetail {
        shipping_payer: Some(payer),
        ..ListingDetail::default()
    }
}
