use anyhow::{Context, Result};
use serde::Serialize;
use std::env;

const DEFAULT_RATE_LIMIT: usize = 60;
const DEFAULT_WATCHLIST_DATABASE_URL: &str = "sqlite:watchlist.db";

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    // Finnhub
    #[serde(skip_serializing)]
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: Option<String>,
    pub finnhub_rate_limit: usize, // requests per minute

    // Supplementary P/E (optional)
    #[serde(skip_serializing)]
    pub msn_api_key: Option<String>,

    // Watchlist storage
    pub watchlist_database_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let finnhub_rate_limit = match non_empty("FINNHUB_RATE_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("FINNHUB_RATE_LIMIT must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_RATE_LIMIT,
        };
        if finnhub_rate_limit == 0 {
            anyhow::bail!("FINNHUB_RATE_LIMIT must be at least 1");
        }

        Ok(Self {
            finnhub_api_key: non_empty("FINNHUB_API_KEY"),
            finnhub_base_url: non_empty("FINNHUB_BASE_URL"),
            finnhub_rate_limit,
            msn_api_key: non_empty("MSN_API_KEY"),
            watchlist_database_url: non_empty("WATCHLIST_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_WATCHLIST_DATABASE_URL.to_string()),
        })
    }

    /// Required by every command that talks to Finnhub.
    pub fn finnhub_api_key(&self) -> Result<&str> {
        self.finnhub_api_key
            .as_deref()
            .context("FINNHUB_API_KEY not set. Add it to the environment or a .env file")
    }
}
