//! Raw upstream payloads, kept close to the wire format.
//!
//! Every numeric field is optional: providers omit, null out, or zero fields
//! freely, and deciding what that means is the normalizer's job.

use serde::{Deserialize, Serialize};

/// Finnhub `/quote`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    #[serde(default)]
    pub c: Option<f64>,
    /// Change
    #[serde(default)]
    pub d: Option<f64>,
    /// Percent change
    #[serde(default)]
    pub dp: Option<f64>,
    #[serde(default)]
    pub h: Option<f64>,
    #[serde(default)]
    pub l: Option<f64>,
    #[serde(default)]
    pub o: Option<f64>,
    /// Previous close
    #[serde(default)]
    pub pc: Option<f64>,
    #[serde(default)]
    pub t: Option<i64>,
}

/// Finnhub `/stock/profile2`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinnhubProfile {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub finnhub_industry: Option<String>,
    /// Millions of dollars.
    #[serde(default)]
    pub market_capitalization: Option<f64>,
    /// Millions of shares.
    #[serde(default)]
    pub share_outstanding: Option<f64>,
}

/// Finnhub `/stock/metric?metric=all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinnhubMetrics {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub metric: MetricSnapshot,
    #[serde(default)]
    pub series: Option<MetricSeries>,
}

/// Point-in-time metrics. Only the fields the valuation reads are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    #[serde(default, rename = "epsTTM")]
    pub eps_ttm: Option<f64>,
    #[serde(default, rename = "epsAnnual")]
    pub eps_annual: Option<f64>,
    #[serde(default, rename = "peTTM")]
    pub pe_ttm: Option<f64>,
    #[serde(default, rename = "peAnnual")]
    pub pe_annual: Option<f64>,
    #[serde(default, rename = "bookValuePerShareAnnual")]
    pub book_value_per_share_annual: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    #[serde(default)]
    pub annual: AnnualSeries,
}

/// Annual series, most recent period first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualSeries {
    #[serde(default)]
    pub eps: Vec<SeriesPoint>,
    #[serde(default)]
    pub pe: Vec<SeriesPoint>,
    /// Aggregate book value, not per share.
    #[serde(default)]
    pub book_value: Vec<SeriesPoint>,
    #[serde(default)]
    pub roe: Vec<SeriesPoint>,
    #[serde(default)]
    pub total_debt_to_equity: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Fiscal period end, `YYYY-MM-DD`.
    pub period: String,
    #[serde(default)]
    pub v: Option<f64>,
}

impl SeriesPoint {
    pub fn new(period: impl Into<String>, v: Option<f64>) -> Self {
        Self { period: period.into(), v }
    }
}

/// Finnhub `/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub result: Option<Vec<SearchHit>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchHit {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_symbol: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Bing finance autosuggest
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BingSuggestResponse {
    #[serde(default)]
    pub data: Option<BingSuggestData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BingSuggestData {
    #[serde(default)]
    pub stocks: Vec<BingStockSuggestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BingStockSuggestion {
    /// Ticker symbol.
    #[serde(default, rename = "RT00S")]
    pub symbol: Option<String>,
    /// MSN security id.
    #[serde(default, rename = "SecId")]
    pub sec_id: Option<String>,
}

/// One element of the MSN quotes array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MsnQuote {
    #[serde(default)]
    pub pe_ratio: Option<f64>,
}
