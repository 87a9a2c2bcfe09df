use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::data_models::{
    ItemStatus, ItemType, ListingDetail, SearchRequest, ShallowListing, ShippingPayer,
    ShippingPreference,
};
use crate::error::ProviderError;

pub const STATUS_ON_SALE: &str = "STATUS_ON_SALE";
pub const SHIPPING_PAYER_BUYER: u8 = 1;
pub const SHIPPING_PAYER_SELLER: u8 = 2;

/// The product search collaborator. One instance is shared by every pipeline run, so
/// implementations must not keep request-scoped mutable state.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs one search and returns at most `limit` listings that are on sale.
    async fn search(
        &self,
        request: &SearchRequest,
        limit: usize,
    ) -> Result<Vec<ShallowListing>, ProviderError>;

    /// Fetches seller, condition and shipping detail for one listing.
    async fn fetch_detail(&self, id: &str) -> Result<ListingDetail, ProviderError>;
}

/// Free text sent to the provider. The provider has no structured location or brand filter,
/// so both ride along in the keyword string.
pub fn compose_keyword(request: &SearchRequest) -> Result<String, ProviderError> {
    let mut keyword = request.keywords.trim().to_string();
    if keyword.is_empty() {
        return Err(ProviderError::InvalidRequest(
            "search keywords are empty".to_string(),
        ));
    }
    if let Some(brand) = request.brand.as_deref().map(str::trim)
        && !brand.is_empty()
        && !keyword.to_lowercase().contains(&brand.to_lowercase())
    {
        keyword.push(' ');
        keyword.push_str(brand);
    }
    if let Some(location) = request.location.as_deref().map(str::trim)
        && !location.is_empty()
    {
        keyword.push(' ');
        keyword.push_str(location);
    }
    Ok(keyword)
}

/// Provider shipping-payer codes for a preference; `any` means no filter.
pub fn shipping_payer_codes(preference: Option<ShippingPreference>) -> Vec<u8> {
    match preference {
        Some(ShippingPreference::BuyerPays) => vec![SHIPPING_PAYER_BUYER],
        Some(ShippingPreference::SellerPays) => vec![SHIPPING_PAYER_SELLER],
        Some(ShippingPreference::Any) | None => Vec::new(),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchCondition {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shipping_payer_id: Vec<u8>,
    pub status: Vec<&'static str>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    pub search_condition: SearchCondition,
    pub page_size: usize,
}

impl SearchBody {
    pub fn from_request(request: &SearchRequest, limit: usize) -> Result<Self, ProviderError> {
        Ok(SearchBody {
            search_condition: SearchCondition {
                keyword: compose_keyword(request)?,
                price_min: request.min_price,
                price_max: request.max_price,
                shipping_payer_id: shipping_payer_codes(request.shipping_preference),
                status: vec![STATUS_ON_SALE],
            },
            page_size: limit,
        })
    }
}

#[derive(Deserialize, Debug)]
struct RawSearchResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawPrice {
    Number(u64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: String,
    name: String,
    price: RawPrice,
    item_type: Option<ItemType>,
    status: Option<ItemStatus>,
    seller_rating: Option<f64>,
    #[serde(default)]
    thumbnails: Vec<String>,
    /// Unix seconds, sent as a string.
    created: Option<String>,
}

impl RawItem {
    fn into_listing(self) -> Result<ShallowListing, ProviderError> {
        let price = match self.price {
            RawPrice::Number(price) => price,
            RawPrice::Float(price) if price.is_finite() && price >= 0.0 => price.round() as u64,
            RawPrice::Float(price) => {
                return Err(ProviderError::Decode(format!(
                    "item {} has invalid price {price}",
                    self.id
                )));
            }
            RawPrice::Text(text) => text.trim().parse().map_err(|_| {
                ProviderError::Decode(format!("item {} has invalid price {text:?}", self.id))
            })?,
        };
        let created = self
            .created
            .and_then(|secs| secs.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        Ok(ShallowListing {
            id: self.id,
            name: self.name,
            price,
            item_type: self.item_type.unwrap_or(ItemType::Unknown),
            status: self.status.unwrap_or(ItemStatus::Unknown),
            seller_rating: self.seller_rating,
            thumbnail: self.thumbnails.into_iter().next(),
            url: None,
            created,
        })
    }
}

/// Decodes a search response body. Listings that are not on sale are dropped here and never
/// reach the pipeline. Items are decoded one by one, so a malformed item is skipped and only a
/// body that is not a search response at all fails.
pub fn decode_search_response(
    body: &str,
    limit: usize,
) -> Result<Vec<ShallowListing>, ProviderError> {
    let response: RawSearchResponse = serde_json::from_str(body)?;
    let listings = response
        .items
        .into_iter()
        .filter_map(|item| match decode_item(item) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable search item");
                None
            }
        })
        .filter(|listing| listing.status == ItemStatus::OnSale)
        .take(limit)
        .collect();
    Ok(listings)
}

fn decode_item(item: serde_json::Value) -> Result<ShallowListing, ProviderError> {
    serde_json::from_value::<RawItem>(item)?.into_listing()
}

#[derive(Deserialize, Debug)]
struct RawDetailResponse {
    data: RawDetail,
}

#[derive(Deserialize, Debug)]
struct RawNamed {
    name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawSeller {
    star_rating_score: Option<f64>,
    num_sell_items: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct RawShippingPayer {
    code: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawShippingDuration {
    min_days: Option<u32>,
    max_days: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct RawDetail {
    seller: Option<RawSeller>,
    item_condition: Option<RawNamed>,
    shipping_payer: Option<RawShippingPayer>,
    item_category: Option<RawNamed>,
    description: Option<String>,
    shipping_duration: Option<RawShippingDuration>,
}

pub fn decode_detail_response(body: &str) -> Result<ListingDetail, ProviderError> {
    let RawDetailResponse { data } = serde_json::from_str(body)?;

    let shipping_payer = data
        .shipping_payer
        .and_then(|payer| payer.code)
        .and_then(|code| match code.as_str() {
            "seller" => Some(ShippingPayer::Seller),
            "buyer" => Some(ShippingPayer::Buyer),
            _ => None,
        });
    let (shipping_days_min, shipping_days_max) = data
        .shipping_duration
        .map(|d| (d.min_days, d.max_days))
        .unwrap_or_default();

    Ok(ListingDetail {
        seller_rating: data.seller.as_ref().and_then(|s| s.star_rating_score),
        seller_sales_count: data.seller.as_ref().and_then(|s| s.num_sell_items),
        condition_label: data.item_condition.and_then(|c| c.name),
        shipping_payer,
        category: data.item_category.and_then(|c| c.name),
        description: data.description,
        shipping_days_min,
        shipping_days_max,
    })
}

/// JSON-over-HTTP adapter for the marketplace search API. Holds one pooled client; the
/// configured timeout surfaces as an ordinary [`ProviderError::Transport`].
pub struct HttpSearchProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_body(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<String, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(
        &self,
        request: &SearchRequest,
        limit: usize,
    ) -> Result<Vec<ShallowListing>, ProviderError> {
        let body = SearchBody::from_request(request, limit)?;
        let endpoint = format!("{}/v2/entities:search", self.base_url);
        tracing::debug!(keyword = %body.search_condition.keyword, "searching provider");

        let response = self
            .client
            .post(&endpoint)
            .header("X-Platform", "web")
            .json(&body)
            .send()
            .await?;
        let text = self.read_body(&endpoint, response).await?;
        decode_search_response(&text, limit)
    }

    async fn fetch_detail(&self, id: &str) -> Result<ListingDetail, ProviderError> {
        let endpoint = format!("{}/items/get", self.base_url);
        let response = self
            .client
            .get(&endpoint)
            .header("X-Platform", "web")
            .query(&[("id", id)])
            .send()
            .await?;
        let text = self.read_body(&endpoint, response).await?;
        decode_detail_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_appended_to_keywords() {
        let mut req = SearchRequest::new("ソファ");
        req.location = Some("大阪".to_string());
        assert_eq!(compose_keyword(&req).unwrap(), "ソファ 大阪");
    }

    #[test]
    fn test_brand_appended_only_when_missing() {
        let mut req = SearchRequest::new("Bravia 4K");
        req.brand = Some("Sony".to_string());
        assert_eq!(compose_keyword(&req).unwrap(), "Bravia 4K Sony");

        let mut req = SearchRequest::new("sony bravia");
        req.brand = Some("Sony".to_string());
        assert_eq!(compose_keyword(&req).unwrap(), "sony bravia");
    }

    #[test]
    fn test_blank_keywords_rejected() {
        let req = SearchRequest::new("   ");
        assert!(matches!(
            compose_keyword(&req),
            Err(ProviderError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_shipping_preference_codes() {
        assert_eq!(
            shipping_payer_codes(Some(ShippingPreference::SellerPays)),
            vec![SHIPPING_PAYER_SELLER]
        );
        assert_eq!(
            shipping_payer_codes(Some(ShippingPreference::BuyerPays)),
            vec![SHIPPING_PAYER_BUYER]
        );
        assert!(shipping_payer_codes(Some(ShippingPreference::Any)).is_empty());
        assert!(shipping_payer_codes(None).is_empty());
    }

    #[test]
    fn test_search_body_serialization_omits_any_shipping() {
        let req = SearchRequest::new("PS5").with_max_price(50_000);
        let body = serde_json::to_value(SearchBody::from_request(&req, 120).unwrap()).unwrap();
        assert_eq!(body["pageSize"], 120);
        assert_eq!(body["searchCondition"]["keyword"], "PS5");
        assert_eq!(body["searchCondition"]["priceMax"], 50_000);
        assert_eq!(body["searchCondition"]["status"][0], STATUS_ON_SALE);
        assert!(body["searchCondition"].get("shippingPayerId").is_none());
        assert!(body["searchCondition"].get("priceMin").is_none());
    }

    #[test]
    fn test_decode_search_elides_items_not_on_sale() {
        let body = r#"{"items": [
            {"id": "m1", "name": "Sony TV", "price": "15500", "itemType": "ITEM_TYPE_MERCARI",
             "status": "ITEM_STATUS_ON_SALE", "thumbnails": ["https://img/1.jpg"], "created": "1700000000"},
            {"id": "m2", "name": "Sony TV sold", "price": 9000, "itemType": "ITEM_TYPE_MERCARI",
             "status": "ITEM_STATUS_SOLD_OUT"},
            {"id": "m3", "name": "Shop TV", "price": 12000, "itemType": "ITEM_TYPE_BEYOND",
             "status": "ITEM_STATUS_ON_SALE"}
        ]}"#;
        let listings = decode_search_response(body, 120).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, "m1");
        assert_eq!(listings[0].price, 15_500);
        assert_eq!(listings[0].thumbnail.as_deref(), Some("https://img/1.jpg"));
        assert!(listings[0].created.is_some());
        assert_eq!(listings[1].item_type, ItemType::Shops);
    }

    #[test]
    fn test_decode_search_respects_limit_and_skips_bad_prices() {
        let body = r#"{"items": [
            {"id": "a", "name": "x", "price": "abc", "status": "ITEM_STATUS_ON_SALE"},
            {"id": "b", "name": "x", "price": 1, "status": "ITEM_STATUS_ON_SALE"},
            {"id": "c", "name": "x", "price": 2, "status": "ITEM_STATUS_ON_SALE"}
        ]}"#;
        let listings = decode_search_response(body, 1).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "b");
    }

    #[test]
    fn test_decode_search_keeps_good_items_beside_malformed_ones() {
        let body = r#"{"items": [
            {"id": "ok", "name": "Sony TV", "price": "15500", "status": "ITEM_STATUS_ON_SALE"},
            {"id": "nameless", "price": 9000, "status": "ITEM_STATUS_ON_SALE"},
            {"id": "negative", "name": "x", "price": -3.0, "status": "ITEM_STATUS_ON_SALE"},
            {"id": "nested", "name": "x", "price": {"amount": 1}, "status": "ITEM_STATUS_ON_SALE"},
            "not an object"
        ]}"#;
        let listings = decode_search_response(body, 120).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "ok");
    }

    #[test]
    fn test_decode_search_accepts_decimal_prices() {
        let body = r#"{"items": [
            {"id": "ok", "name": "Sony TV", "price": 15500, "status": "ITEM_STATUS_ON_SALE"},
            {"id": "dec", "name": "Sony TV", "price": 15500.0, "status": "ITEM_STATUS_ON_SALE"}
        ]}"#;
        let listings = decode_search_response(body, 120).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].price, 15_500);
    }

    #[test]
    fn test_decode_search_untyped_item_is_unknown() {
        let body = r#"{"items": [{"id": "u", "name": "x", "price": 1, "status": "ITEM_STATUS_ON_SALE"}]}"#;
        let listings = decode_search_response(body, 10).unwrap();
        assert_eq!(listings[0].item_type, ItemType::Unknown);
    }

    #[test]
    fn test_decode_search_rejects_garbage() {
        assert!(matches!(
            decode_search_response("<html>busy</html>", 10),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_detail() {
        let body = r#"{"data": {
            "seller": {"star_rating_score": 4.8, "num_sell_items": 321},
            "item_condition": {"name": "目立った傷や汚れなし"},
            "shipping_payer": {"code": "seller"},
            "item_category": {"name": "テレビ"},
            "shipping_duration": {"min_days": 1, "max_days": 2}
        }}"#;
        let detail = decode_detail_response(body).unwrap();
        assert_eq!(detail.seller_rating, Some(4.8));
        assert_eq!(detail.seller_sales_count, Some(321));
        assert_eq!(detail.shipping_payer, Some(ShippingPayer::Seller));
        assert_eq!(detail.category.as_deref(), Some("テレビ"));
        assert_eq!(detail.shipping_days_max, Some(2));
        assert_eq!(detail.description, None);
    }

    #[test]
    fn test_decode_detail_unknown_shipping_code() {
        let body = r#"{"data": {"shipping_payer": {"code": "unknown"}}}"#;
        let detail = decode_detail_response(body).unwrap();
        assert_eq!(detail.shipping_payer, None);
        assert_eq!(detail.seller_rating, None);
    }
}
