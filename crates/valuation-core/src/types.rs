use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current quote snapshot for one ticker.
///
/// Built once per successful search and replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    pub symbol: String,
    pub name: String,
    /// Always finite and strictly positive.
    pub price: f64,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    /// In dollars, not millions.
    pub market_cap: Option<f64>,
    pub exchange: String,
}

impl QuoteData {
    /// P/E that can be shown and compared against.
    pub fn valid_pe(&self) -> Option<f64> {
        self.pe.filter(|pe| pe.is_finite() && *pe > 0.0)
    }
}

/// One fiscal-year point of a metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<V = Option<f64>> {
    pub year: String,
    pub value: V,
}

impl<V> HistoryEntry<V> {
    pub fn new(year: impl Into<String>, value: V) -> Self {
        Self { year: year.into(), value }
    }
}

/// Annual metric series, most recent first.
///
/// Position is the time offset: `eps[3]` is three fiscal years before `eps[0]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricHistory {
    pub eps: Vec<HistoryEntry>,
    /// Only positive P/E points survive normalization.
    pub pe: Vec<HistoryEntry<f64>>,
    pub bvps: Vec<HistoryEntry>,
    pub roe: Vec<HistoryEntry>,
    pub debt_to_equity: Vec<HistoryEntry>,
}

impl MetricHistory {
    pub fn eps_values(&self) -> Vec<Option<f64>> {
        self.eps.iter().map(|e| e.value).collect()
    }

    pub fn bvps_values(&self) -> Vec<Option<f64>> {
        self.bvps.iter().map(|e| e.value).collect()
    }

    pub fn pe_values(&self) -> Vec<f64> {
        self.pe.iter().map(|e| e.value).collect()
    }

    pub fn roe_values(&self) -> Vec<Option<f64>> {
        self.roe.iter().map(|e| e.value).collect()
    }

    pub fn debt_to_equity_values(&self) -> Vec<Option<f64>> {
        self.debt_to_equity.iter().map(|e| e.value).collect()
    }
}

/// Historical compound growth over 3, 5 and 7 years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CagrResult {
    pub three_year: Option<f64>,
    pub five_year: Option<f64>,
    pub seven_year: Option<f64>,
}

impl CagrResult {
    /// Shortest period that could be computed, used as the default input hint.
    pub fn first_available(&self) -> Option<f64> {
        self.three_year.or(self.five_year).or(self.seven_year)
    }
}

/// Present value of a future price at one discount rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpvResult {
    pub discount_rate: f64,
    pub discount_rate_label: String,
    pub npv: f64,
}

/// User-chosen inputs for both valuation methods. Rates are fractions (0.08 = 8%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub expected_cagr: Option<f64>,
    pub expected_pe: Option<f64>,
    pub expected_bvps_cagr: Option<f64>,
    pub expected_roe: Option<f64>,
    pub expected_pe_bv: Option<f64>,
}

impl Assumptions {
    pub fn is_empty(&self) -> bool {
        *self == Assumptions::default()
    }
}

/// Derived outputs captured alongside a watchlist entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistResults {
    pub future_price: Option<f64>,
    pub npv_at_10_earnings: Option<f64>,
    pub future_price_from_bv: Option<f64>,
    pub npv_at_10_book_value: Option<f64>,
}

/// A saved analysis. The persisted watchlist is an array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub ticker: String,
    pub name: String,
    pub price_at_save: f64,
    pub assumptions: Assumptions,
    pub results: WatchlistResults,
    pub saved_at: DateTime<Utc>,
}

impl WatchlistItem {
    pub fn matches_ticker(&self, ticker: &str) -> bool {
        self.ticker.eq_ignore_ascii_case(ticker)
    }
}

/// Lifecycle of the current analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Fair-value verdict at the benchmark discount rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Undervalued,
    FairlyValued,
    Overvalued,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Undervalued => "undervalued",
            Verdict::FairlyValued => "fairly-valued",
            Verdict::Overvalued => "overvalued",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Undervalued => "Potentially Undervalued",
            Verdict::FairlyValued => "Fairly Valued",
            Verdict::Overvalued => "Potentially Overvalued",
        }
    }

    /// Label without the hedge, for tables.
    pub fn short_label(&self) -> &'static str {
        self.label().trim_start_matches("Potentially ")
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Undervalued => "Based on your inputs, the stock appears to be trading below its estimated fair value at a 10% discount rate.",
            Verdict::FairlyValued => "Based on your inputs, the stock appears to be trading near its estimated fair value at a 10% discount rate.",
            Verdict::Overvalued => "Based on your inputs, the stock appears to be trading above its estimated fair value at a 10% discount rate.",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticker search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSuggestion {
    pub ticker: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}
