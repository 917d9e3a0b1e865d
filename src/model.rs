// Core structs: upstream wire schema, persisted records, error enums.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One search to track: the query string plus the upstream sort key.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub sort: String,
}

/// Top-level search response. Everything below `data.products` is optional
/// on the wire; a missing or null container is an empty result, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub data: Option<SearchData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchData {
    pub products: Option<Vec<RawProduct>>,
}

impl SearchResponse {
    /// Ranked product list; the element at index i holds rank i + 1.
    pub fn into_products(self) -> Vec<RawProduct> {
        self.data.and_then(|d| d.products).unwrap_or_default()
    }
}

/// Raw product record as the search endpoint returns it. `id` is mandatory;
/// a record without one fails the cycle's decode. Every other field has a
/// defined fallback: empty name/brand, zero rating/feedbacks, absent price.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub feedbacks: Option<u64>,
    #[serde(default)]
    pub sizes: Option<Vec<RawSize>>,
    #[serde(default)]
    pub log: Option<PromoLog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSize {
    #[serde(default)]
    pub price: Option<RawPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrice {
    #[serde(default)]
    pub total: Option<u64>,
}

/// Sponsorship block attached to promoted listings.
#[derive(Debug, Clone, Deserialize)]
pub struct PromoLog {
    #[serde(default)]
    pub promotion: Value,
}

impl RawProduct {
    /// Total price of the first size variant, when the listing carries one.
    pub fn price(&self) -> Option<u64> {
        self.sizes
            .as_deref()
            .and_then(|sizes| sizes.first())
            .and_then(|size| size.price.as_ref())
            .and_then(|price| price.total)
    }

    /// Computed once at ingestion: a truthy promotion marker makes the
    /// listing advertised, everything else is organic.
    pub fn placement(&self) -> Placement {
        let promoted = self
            .log
            .as_ref()
            .is_some_and(|log| is_truthy(&log.promotion));
        if promoted {
            Placement::Advertised
        } else {
            Placement::Organic
        }
    }
}

/// The promotion marker's type varies across result sets (ids, flags,
/// nested objects). Any non-null, non-zero, non-empty value counts.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Advertised,
    Organic,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Advertised => "advertised",
            Placement::Organic => "organic",
        }
    }
}

/// One product inside a persisted analysis record, enriched with where it
/// stood the cycle before. A newly seen product reports its current rank as
/// the previous one and a zero change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub position: u32,
    pub previous_position: u32,
    pub position_change: i64,
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub rating: f64,
    pub feedbacks: u64,
    pub price: Option<u64>,
}

/// Write-once result of one tracking cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub total_products: usize,
    pub advertised_products: Vec<ProductEntry>,
    pub organic_products: Vec<ProductEntry>,
    pub position_changes: Vec<PositionChange>,
    pub advertised_count: usize,
    pub organic_count: usize,
}

impl AnalysisRecord {
    /// Advertised then organic — the order the read-side tools search in.
    pub fn combined(&self) -> impl Iterator<Item = &ProductEntry> {
        self.advertised_products
            .iter()
            .chain(self.organic_products.iter())
    }

    pub fn products_for(&self, placement: Placement) -> &[ProductEntry] {
        match placement {
            Placement::Advertised => &self.advertised_products,
            Placement::Organic => &self.organic_products,
        }
    }
}

/// Emitted when a product moved up between two observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionChange {
    pub id: u64,
    pub name: String,
    pub old_position: u32,
    pub new_position: u32,
    pub improvement: u32,
}

/// End-of-day aggregate over the tracking period's position history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub query: String,
    pub sort: String,
    pub position_improvements: Vec<PositionImprovement>,
    pub total_movements: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionImprovement {
    pub product_id: u64,
    pub start_position: u32,
    pub end_position: u32,
    pub improvement: u32,
    pub timestamps: ImprovementWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("render failed: {0}")]
    Render(String),
}
