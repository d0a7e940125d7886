use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use valuation_core::{StockSuggestion, ValuationError, MAX_SEARCH_SUGGESTIONS};

use crate::models::{FinnhubMetrics, FinnhubProfile, FinnhubQuote, SearchResponse};
use crate::provider::{FundamentalsProvider, SymbolSearch};
use crate::rate_limiter::RateLimiter;

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// Free tier budget.
const DEFAULT_RATE_LIMIT: usize = 60;

#[derive(Clone)]
pub struct FinnhubClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Result<Self, ValuationError> {
        if api_key.trim().is_empty() {
            return Err(missing_key());
        }

        let client = Client::builder()
            .user_agent(concat!("value-calc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ValuationError::Configuration(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT, Duration::from_secs(60)),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Requests allowed per minute.
    pub fn with_rate_limit(mut self, max_per_minute: usize) -> Self {
        self.rate_limiter = RateLimiter::new(max_per_minute, Duration::from_secs(60));
        self
    }

    /// GET `endpoint`, translating HTTP and payload-level failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ValuationError> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(endpoint, ?params, "Finnhub request");

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| ValuationError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "Finnhub request failed");
            return Err(match status.as_u16() {
                429 => ValuationError::RateLimited {
                    endpoint: endpoint.to_string(),
                },
                403 => ValuationError::PremiumRequired {
                    endpoint: endpoint.to_string(),
                },
                code => ValuationError::Status {
                    status: code,
                    endpoint: endpoint.to_string(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unknown status")
                        .to_string(),
                },
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ValuationError::Decode(e.without_url().to_string()))?;

        // Finnhub reports some failures as 200 with an `error` field.
        if let Some(message) = body.get("error").and_then(|e| e.as_str()) {
            return Err(ValuationError::Status {
                status: 400,
                endpoint: endpoint.to_string(),
                message: message.to_string(),
            });
        }

        Ok(serde_json::from_value(body)?)
    }

    pub async fn fetch_quote(&self, ticker: &str) -> Result<FinnhubQuote, ValuationError> {
        let symbol = ticker.to_uppercase();
        let quote: Option<FinnhubQuote> = self.get_json("/quote", &[("symbol", &symbol)]).await?;

        match quote {
            Some(q) if q.c.is_some_and(|c| c != 0.0) => Ok(q),
            _ => Err(ValuationError::not_found(
                "/quote",
                "No quote data found for this ticker symbol",
            )),
        }
    }

    pub async fn fetch_profile(&self, ticker: &str) -> Result<FinnhubProfile, ValuationError> {
        let symbol = ticker.to_uppercase();
        let profile: Option<FinnhubProfile> = self
            .get_json("/stock/profile2", &[("symbol", &symbol)])
            .await?;

        match profile {
            Some(p) if p.ticker.as_deref().is_some_and(|t| !t.is_empty()) => Ok(p),
            _ => Err(ValuationError::not_found(
                "/stock/profile2",
                "No profile data found for this ticker symbol",
            )),
        }
    }

    pub async fn fetch_basic_financials(&self, ticker: &str) -> Result<FinnhubMetrics, ValuationError> {
        let symbol = ticker.to_uppercase();
        self.get_json("/stock/metric", &[("symbol", &symbol), ("metric", "all")])
            .await
    }

    /// Common-stock suggestions for a free-text query, primary listings only.
    pub async fn search_stocks(&self, query: &str) -> Result<Vec<StockSuggestion>, ValuationError> {
        let response: SearchResponse = self.get_json("/search", &[("q", query)]).await?;

        Ok(response
            .result
            .unwrap_or_default()
            .into_iter()
            .filter(|hit| hit.kind == "Common Stock" && !hit.symbol.contains('.'))
            .take(MAX_SEARCH_SUGGESTIONS)
            .map(|hit| StockSuggestion {
                ticker: hit.display_symbol,
                name: hit.description,
                kind: hit.kind,
            })
            .collect())
    }
}

fn missing_key() -> ValuationError {
    ValuationError::Configuration("Finnhub API key not configured (FINNHUB_API_KEY)".to_string())
}

#[async_trait]
impl FundamentalsProvider for FinnhubClient {
    async fn quote(&self, ticker: &str) -> Result<FinnhubQuote, ValuationError> {
        self.fetch_quote(ticker).await
    }

    async fn profile(&self, ticker: &str) -> Result<FinnhubProfile, ValuationError> {
        self.fetch_profile(ticker).await
    }

    async fn basic_financials(&self, ticker: &str) -> Result<FinnhubMetrics, ValuationError> {
        self.fetch_basic_financials(ticker).await
    }
}

#[async_trait]
impl SymbolSearch for FinnhubClient {
    async fn search(&self, query: &str) -> Result<Vec<StockSuggestion>, ValuationError> {
        self.search_stocks(query).await
    }
}
