use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ITEM_URL_BASE: &str = "https://jp.mercari.com/item";

/// Who pays shipping, as requested by a search candidate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPreference {
    #[default]
    Any,
    BuyerPays,
    SellerPays,
}

/// One structured search candidate, as produced by the analyst.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    #[serde(alias = "query_text")]
    pub keywords: String,
    #[serde(default, alias = "min_price_jpy")]
    pub min_price: Option<u64>,
    #[serde(default, alias = "max_price_jpy")]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub shipping_preference: Option<ShippingPreference>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl SearchRequest {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Self::default()
        }
    }

    pub fn with_max_price(mut self, max_price: u64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_shipping(mut self, preference: ShippingPreference) -> Self {
        self.shipping_preference = Some(preference);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    /// Peer-to-peer listing, the marketplace's primary listing type.
    #[serde(rename = "ITEM_TYPE_MERCARI")]
    Marketplace,
    #[serde(rename = "ITEM_TYPE_BEYOND")]
    Shops,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    #[serde(rename = "ITEM_STATUS_ON_SALE", alias = "on_sale")]
    OnSale,
    #[serde(rename = "ITEM_STATUS_TRADING", alias = "trading")]
    Trading,
    #[serde(rename = "ITEM_STATUS_SOLD_OUT", alias = "sold_out")]
    SoldOut,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPayer {
    Buyer,
    Seller,
}

/// A search hit, cheap to get, without seller or shipping detail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShallowListing {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub seller_rating: Option<f64>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl ShallowListing {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            item_type: ItemType::Marketplace,
            status: ItemStatus::OnSale,
            seller_rating: None,
            thumbnail: None,
            url: None,
            created: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.seller_rating = Some(rating);
        self
    }

    /// Overlays every present detail field onto this listing. Absent detail
    /// fields keep the shallow value.
    pub fn merge(self, detail: ListingDetail) -> FullListing {
        FullListing {
            seller_rating: detail.seller_rating.or(self.seller_rating),
            id: self.id,
            name: self.name,
            price: self.price,
            item_type: self.item_type,
            status: self.status,
            thumbnail: self.thumbnail,
            url: self.url,
            created: self.created,
            seller_sales_count: detail.seller_sales_count,
            condition_label: detail.condition_label,
            shipping_payer: detail.shipping_payer,
            category: detail.category,
            description: detail.description,
            shipping_days_min: detail.shipping_days_min,
            shipping_days_max: detail.shipping_days_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredShallowListing {
    pub listing: ShallowListing,
    pub relevance: f64,
    pub price_score: f64,
    pub shallow_score: f64,
    /// Position after the shallow sort.
    pub shallow_rank: usize,
}

/// Item detail as returned by the provider's detail endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ListingDetail {
    pub seller_rating: Option<f64>,
    pub seller_sales_count: Option<u64>,
    pub condition_label: Option<String>,
    pub shipping_payer: Option<ShippingPayer>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub shipping_days_min: Option<u32>,
    pub shipping_days_max: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FullListing {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub seller_rating: Option<f64>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub seller_sales_count: Option<u64>,
    pub condition_label: Option<String>,
    pub shipping_payer: Option<ShippingPayer>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub shipping_days_min: Option<u32>,
    pub shipping_days_max: Option<u32>,
}

impl FullListing {
    pub fn seller_pays_shipping(&self) -> bool {
        self.shipping_payer == Some(ShippingPayer::Seller)
    }

    /// The listing's own url, or the public item page derived from its id.
    pub fn public_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{ITEM_URL_BASE}/{}", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
    pub listing: FullListing,
    pub shallow_score: f64,
    pub shallow_rank: usize,
    pub deep_score: f64,
}

/// Final shortlist, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedList(pub Vec<RankedListing>);

impl RankedList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedListing> {
        self.0.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|r| r.listing.id.as_str()).collect()
    }

    /// Serializable view handed to the presenter.
    pub fn to_records(&self) -> Vec<ListingRecord> {
        self.0.iter().map(ListingRecord::from).collect()
    }
}

/// What the presenter sees of a ranked listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub condition: Option<String>,
    pub seller_rating: Option<f64>,
    pub seller_sales_count: Option<u64>,
    pub shipping_payer: Option<ShippingPayer>,
    pub category: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub url: String,
}

impl From<&RankedListing> for ListingRecord {
    fn from(ranked: &RankedListing) -> Self {
        let l = &ranked.listing;
        ListingRecord {
            id: l.id.clone(),
            name: l.name.clone(),
            price: l.price,
            condition: l.condition_label.clone(),
            seller_rating: l.seller_rating,
            seller_sales_count: l.seller_sales_count,
            shipping_payer: l.shipping_payer,
            category: l.category.clone(),
            created: l.created,
            url: l.public_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlays_present_detail_fields() {
        let shallow = ShallowListing::new("m1", "Sony Bravia", 15_500).with_rating(4.0);
        let full = shallow.merge(ListingDetail {
            seller_rating: Some(4.8),
            seller_sales_count: Some(120),
            shipping_payer: Some(ShippingPayer::Seller),
            ..ListingDetail::default()
        });
        assert_eq!(full.seller_rating, Some(4.8));
        assert_eq!(full.seller_sales_count, Some(120));
        assert!(full.seller_pays_shipping());
        assert_eq!(full.name, "Sony Bravia");
    }

    #[test]
    fn test_merge_keeps_shallow_rating_when_detail_has_none() {
        let shallow = ShallowListing::new("m1", "Sony Bravia", 15_500).with_rating(4.0);
        let full = shallow.merge(ListingDetail::default());
        assert_eq!(full.seller_rating, Some(4.0));
        assert!(!full.seller_pays_shipping());
    }

    #[test]
    fn test_public_url_derived_from_id() {
        let full = ShallowListing::new("m123", "x", 1).merge(ListingDetail::default());
        assert_eq!(full.public_url(), "https://jp.mercari.com/item/m123");
    }

    #[test]
    fn test_search_request_accepts_analyst_aliases() {
        let req: SearchRequest = serde_json::from_str(
            r#"{"query_text": "PS5 本体", "max_price_jpy": 50000, "shipping_preference": "seller_pays", "product_type": "console"}"#,
        )
        .unwrap();
        assert_eq!(req.keywords, "PS5 本体");
        assert_eq!(req.max_price, Some(50_000));
        assert_eq!(req.shipping_preference, Some(ShippingPreference::SellerPays));
    }
}
