use serde::{Deserialize, Serialize};

/// Summary of one search-result card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCardSummary {
    /// Canonical listing URL (query string stripped); the dedup key
    pub business_url: String,
    pub business_name: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

/// Attributes extracted from a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetail {
    /// First top-level heading; empty when the page has none
    pub business_name: String,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub categories: Option<Vec<String>>,
    pub price_range: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub hours: Option<Vec<String>>,
    /// At most ten distinct photo URLs, in page order
    pub photos: Vec<String>,
    pub url: String,
}

/// One review extracted from a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author: String,
    pub rating: Option<f64>,
    pub text: String,
    pub date: Option<String>,
}
