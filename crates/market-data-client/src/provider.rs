use async_trait::async_trait;
use valuation_core::{StockSuggestion, ValuationError};

use crate::models::{FinnhubMetrics, FinnhubProfile, FinnhubQuote};

/// Primary source of price, profile and annual metrics.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<FinnhubQuote, ValuationError>;

    async fn profile(&self, ticker: &str) -> Result<FinnhubProfile, ValuationError>;

    async fn basic_financials(&self, ticker: &str) -> Result<FinnhubMetrics, ValuationError>;
}

/// Best-effort current P/E from a second provider. Any failure is `None`.
#[async_trait]
pub trait PeRatioProvider: Send + Sync {
    async fn current_pe(&self, ticker: &str) -> Option<f64>;
}

/// Free-text ticker lookup for the search box.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<StockSuggestion>, ValuationError>;
}

/// Used when no supplementary provider is configured.
#[async_trait]
impl PeRatioProvider for () {
    async fn current_pe(&self, _ticker: &str) -> Option<f64> {
        None
    }
}
