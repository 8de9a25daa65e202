//! Outbound HotPepper gourmet search: the flat parameter record the engine
//! produces and the HTTP client that executes it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://webservice.recruit.co.jp/hotpepper/gourmet/v1/";

/// The flat query record accepted by the gourmet search API. Code-typed
/// fields hold either nothing or a code that exists verbatim in the taxonomy;
/// the engine never invents codes. Flags are 0/1, zero meaning "not
/// requested" and omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Search radius band around `lat`/`lng`, 1 (300m) through 5 (3km).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<u8>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub private_room: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub lunch: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub free_food: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub free_drink: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub midnight: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cocktail: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sake: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub wine: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

impl SearchParams {
    /// Query-string pairs, only for the fields that are actually set; the
    /// API treats a present-but-empty parameter as a constraint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let text_fields: [(&'static str, &Option<String>); 6] = [
            ("keyword", &self.keyword),
            ("large_area", &self.large_area),
            ("middle_area", &self.middle_area),
            ("small_area", &self.small_area),
            ("genre", &self.genre),
            ("budget", &self.budget),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value {
                if !value.is_empty() {
                    pairs.push((key, value.clone()));
                }
            }
        }

        if let Some(lat) = self.lat {
            pairs.push(("lat", lat.to_string()));
        }
        if let Some(lng) = self.lng {
            pairs.push(("lng", lng.to_string()));
        }
        if let Some(range) = self.range {
            pairs.push(("range", range.to_string()));
        }

        let flag_fields: [(&'static str, u8); 8] = [
            ("private_room", self.private_room),
            ("lunch", self.lunch),
            ("free_food", self.free_food),
            ("free_drink", self.free_drink),
            ("midnight", self.midnight),
            ("cocktail", self.cocktail),
            ("sake", self.sake),
            ("wine", self.wine),
        ];
        for (key, value) in flag_fields {
            if value != 0 {
                pairs.push((key, value.to_string()));
            }
        }

        if let Some(count) = self.count {
            pairs.push(("count", count.to_string()));
        }
        if let Some(start) = self.start {
            pairs.push(("start", start.to_string()));
        }

        pairs
    }
}

/// One restaurant in the search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub access: String,
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
    #[serde(default, rename = "catch")]
    pub catch_copy: String,
    #[serde(default)]
    pub genre: NamedField,
    #[serde(default)]
    pub budget: NamedField,
    #[serde(default)]
    pub urls: ShopUrls,
    #[serde(default)]
    pub photo: ShopPhoto,
    #[serde(default)]
    pub coupon_urls: CouponUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedField {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopUrls {
    #[serde(default)]
    pub pc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopPhoto {
    #[serde(default)]
    pub pc: PhotoSizes,
    #[serde(default)]
    pub mobile: MobilePhotoSizes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoSizes {
    #[serde(default)]
    pub l: String,
    #[serde(default)]
    pub m: String,
    #[serde(default)]
    pub s: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobilePhotoSizes {
    #[serde(default)]
    pub l: String,
    #[serde(default)]
    pub s: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouponUrls {
    #[serde(default)]
    pub pc: String,
    #[serde(default)]
    pub sp: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    results: EnvelopeResults,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResults {
    #[serde(default)]
    results_available: u32,
    #[serde(default)]
    results_returned: StringOrInt,
    #[serde(default)]
    shop: Vec<Shop>,
    #[serde(default)]
    error: Vec<ApiError>,
}

/// `results_returned` arrives as a string or an integer depending on the API
/// version; accept both.
#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum StringOrInt {
    #[default]
    Missing,
    Text(String),
    Int(u32),
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HOTPEPPER_API_KEY is not configured")]
    MissingApiKey,
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search API rejected the request (code {code}): {message}")]
    Api { code: i32, message: String },
}

/// Seam for the outbound search call.
#[async_trait]
pub trait RestaurantSearch: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<Vec<Shop>, SearchError>;
}

/// HTTP client for the HotPepper gourmet search API.
pub struct HotPepperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HotPepperClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    pub fn from_settings(settings: &crate::config::HotPepperSettings) -> Result<Self, SearchError> {
        let api_key = settings.api_key.clone().ok_or(SearchError::MissingApiKey)?;
        Ok(Self::new(
            reqwest::Client::new(),
            api_key,
            settings.base_url.clone(),
        ))
    }
}

#[async_trait]
impl RestaurantSearch for HotPepperClient {
    async fn search(&self, params: &SearchParams) -> Result<Vec<Shop>, SearchError> {
        let mut query: Vec<(&str, String)> = vec![
            ("key", self.api_key.clone()),
            ("format", "json".to_string()),
        ];
        query.extend(params.query_pairs());

        debug!(param_count = query.len() - 2, "calling gourmet search API");
        let envelope: Envelope = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = envelope.results.error.first() {
            return Err(SearchError::Api {
                code: error.code,
                message: error.message.clone(),
            });
        }

        info!(
            available = envelope.results.results_available,
            returned = ?envelope.results.results_returned,
            shops = envelope.results.shop.len(),
            "gourmet search completed"
        );
        Ok(envelope.results.shop)
    }
}
