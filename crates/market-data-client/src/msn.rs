use async_trait::async_trait;
use reqwest::Client;
use valuation_core::ValuationError;

use crate::models::{BingSuggestResponse, MsnQuote};
use crate::provider::PeRatioProvider;

const BING_SUGGEST_URL: &str =
    "https://services.bingapis.com/contentservices-finance.csautosuggest/api/v1/Query";
const MSN_QUOTES_URL: &str = "https://assets.msn.com/service/Finance/Quotes";

/// Supplementary current P/E via Bing autosuggest (ticker -> SecId) and MSN quotes.
///
/// Every failure degrades to `None`; this client never produces an error for
/// the caller.
#[derive(Clone)]
pub struct MsnClient {
    api_key: Option<String>,
    bing_url: String,
    quotes_url: String,
    client: Client,
}

impl MsnClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            bing_url: BING_SUGGEST_URL.to_string(),
            quotes_url: MSN_QUOTES_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_urls(mut self, bing_url: impl Into<String>, quotes_url: impl Into<String>) -> Self {
        self.bing_url = bing_url.into();
        self.quotes_url = quotes_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Exact (case-insensitive) symbol match first, else the top suggestion.
    async fn resolve_sec_id(&self, ticker: &str) -> Result<Option<String>, ValuationError> {
        let symbol = ticker.to_uppercase();
        let response = self
            .client
            .get(&self.bing_url)
            .query(&[("query", symbol.as_str()), ("market", "en-us"), ("count", "1")])
            .send()
            .await
            .map_err(|e| ValuationError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body: BingSuggestResponse = response
            .json()
            .await
            .map_err(|e| ValuationError::Decode(e.without_url().to_string()))?;
        let stocks = body.data.map(|d| d.stocks).unwrap_or_default();

        let exact = stocks.iter().find(|s| {
            s.symbol
                .as_deref()
                .is_some_and(|sym| sym.eq_ignore_ascii_case(&symbol))
        });

        Ok(exact
            .or_else(|| stocks.first())
            .and_then(|s| s.sec_id.clone()))
    }

    async fn fetch_pe(&self, api_key: &str, ticker: &str) -> Result<Option<f64>, ValuationError> {
        let Some(sec_id) = self.resolve_sec_id(ticker).await? else {
            return Ok(None);
        };

        let response = self
            .client
            .get(&self.quotes_url)
            .query(&[
                ("apikey", api_key),
                ("activityId", "s1"),
                ("ocid", "finance-utils-peregrine"),
                ("cm", "en-us"),
                ("it", "web"),
                ("ids", sec_id.as_str()),
                ("wrapodata", "false"),
            ])
            .send()
            .await
            .map_err(|e| ValuationError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let quotes: Vec<MsnQuote> = response
            .json()
            .await
            .map_err(|e| ValuationError::Decode(e.without_url().to_string()))?;

        Ok(quotes
            .first()
            .and_then(|q| q.pe_ratio)
            .filter(|pe| pe.is_finite() && *pe > 0.0))
    }
}

#[async_trait]
impl PeRatioProvider for MsnClient {
    async fn current_pe(&self, ticker: &str) -> Option<f64> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(ticker, "MSN_API_KEY not set, skipping supplementary P/E");
            return None;
        };

        match self.fetch_pe(api_key, ticker).await {
            Ok(pe) => {
                tracing::debug!(ticker, ?pe, "MSN P/E lookup");
                pe
            }
            Err(e) => {
                tracing::debug!(ticker, error = %e, "MSN P/E lookup failed");
                None
            }
        }
    }
}
