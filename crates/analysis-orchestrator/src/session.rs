use chrono::{DateTime, Utc};
use data_normalizer::{normalize, RawBundle};
use market_data_client::{FundamentalsProvider, PeRatioProvider, SymbolSearch};
use std::sync::Arc;
use tokio::sync::RwLock;
use valuation_core::{
    AppStatus, Assumptions, StockSuggestion, ValuationError, WatchlistItem, WatchlistResults,
};
use valuation_engine::{project, AssumptionBounds, ProjectionInputs, Projections};

use crate::state::{AnalysisState, SearchOutcome};

/// Owns the current analysis and is the only thing that mutates it.
///
/// Searches may overlap. Each one takes a fresh
/// [`RequestToken`](crate::RequestToken) and only the latest token is allowed
/// to write its result back, so a slow response for an earlier ticker can
/// never overwrite a later one.
pub struct AnalysisSession {
    fundamentals: Arc<dyn FundamentalsProvider>,
    pe_provider: Arc<dyn PeRatioProvider>,
    symbol_search: Option<Arc<dyn SymbolSearch>>,
    state: RwLock<AnalysisState>,
}

impl AnalysisSession {
    pub fn new(fundamentals: Arc<dyn FundamentalsProvider>, pe_provider: Arc<dyn PeRatioProvider>) -> Self {
        Self {
            fundamentals,
            pe_provider,
            symbol_search: None,
            state: RwLock::new(AnalysisState::default()),
        }
    }

    pub fn with_symbol_search(mut self, search: Arc<dyn SymbolSearch>) -> Self {
        self.symbol_search = Some(search);
        self
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> AnalysisState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> AppStatus {
        self.state.read().await.status
    }

    pub async fn search(&self, ticker: &str) -> SearchOutcome {
        self.search_with_assumptions(ticker, Assumptions::default()).await
    }

    /// Starts a search with pre-seeded assumptions, as when reopening a saved item.
    pub async fn search_with_assumptions(&self, ticker: &str, assumptions: Assumptions) -> SearchOutcome {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return SearchOutcome::Ignored;
        }

        let token = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.ticker = ticker.clone();
            state.status = AppStatus::Loading;
            state.error = None;
            state.assumptions = assumptions;
            state.current_token()
        };

        tracing::info!("Starting valuation fetch for {} (request {})", ticker, token.value());

        let result = self.fetch(&ticker).await;

        let mut state = self.state.write().await;
        if state.current_token() != token {
            tracing::info!(
                "Discarding stale response for {} (request {}, current {})",
                ticker,
                token.value(),
                state.generation
            );
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(stock) => {
                tracing::info!(
                    "Loaded {} at {:.2} ({} EPS points)",
                    ticker,
                    stock.quote.price,
                    stock.history.eps.len()
                );
                state.stock = Some(stock);
                state.status = AppStatus::Loaded;
                SearchOutcome::Loaded { ticker }
            }
            Err(e) => {
                tracing::warn!("Valuation fetch for {} failed: {}", ticker, e);
                let message = e.user_message();
                state.stock = None;
                state.error = Some(message.clone());
                state.status = AppStatus::Error;
                SearchOutcome::Failed { message }
            }
        }
    }

    async fn fetch(&self, ticker: &str) -> Result<data_normalizer::NormalizedStock, ValuationError> {
        let (quote, profile, metrics, supplementary_pe) = tokio::join!(
            self.fundamentals.quote(ticker),
            self.fundamentals.profile(ticker),
            self.fundamentals.basic_financials(ticker),
            self.pe_provider.current_pe(ticker),
        );

        let bundle = RawBundle {
            quote: quote?,
            profile: profile?,
            metrics: metrics?,
            supplementary_pe,
        };
        normalize(&bundle)
    }

    /// Invalidates any in-flight search and returns to idle.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let generation = state.generation + 1;
        *state = AnalysisState {
            generation,
            ..AnalysisState::default()
        };
    }

    async fn update_assumptions(&self, value: f64, apply: impl FnOnce(&mut Assumptions, f64)) {
        if !value.is_finite() {
            return;
        }
        apply(&mut self.state.write().await.assumptions, value);
    }

    /// Expected EPS growth as a fraction.
    pub async fn set_expected_cagr(&self, cagr: f64) {
        self.update_assumptions(cagr, |a, v| {
            a.expected_cagr = Some(AssumptionBounds::EPS_CAGR.clamp_fraction(v))
        })
        .await
    }

    pub async fn set_expected_pe(&self, pe: f64) {
        self.update_assumptions(pe, |a, v| a.expected_pe = Some(AssumptionBounds::PE.clamp(v)))
            .await
    }

    /// Expected book value growth as a fraction.
    pub async fn set_expected_bvps_cagr(&self, cagr: f64) {
        self.update_assumptions(cagr, |a, v| {
            a.expected_bvps_cagr = Some(AssumptionBounds::BVPS_CAGR.clamp_fraction(v))
        })
        .await
    }

    /// Expected year-five ROE as a fraction.
    pub async fn set_expected_roe(&self, roe: f64) {
        self.update_assumptions(roe, |a, v| {
            a.expected_roe = Some(AssumptionBounds::ROE.clamp_fraction(v))
        })
        .await
    }

    pub async fn set_expected_pe_bv(&self, pe: f64) {
        self.update_assumptions(pe, |a, v| a.expected_pe_bv = Some(AssumptionBounds::PE.clamp(v)))
            .await
    }

    /// Both projection chains over the current state.
    pub async fn projections(&self) -> Projections {
        let state = self.state.read().await;
        project(&ProjectionInputs {
            current_eps: state.current_eps(),
            current_bvps: state.current_bvps(),
            assumptions: state.assumptions,
        })
    }

    /// The loaded analysis as a watchlist entry, `None` before a successful load.
    pub async fn watchlist_entry(&self, now: DateTime<Utc>) -> Option<WatchlistItem> {
        let state = self.state.read().await;
        if !state.is_loaded() {
            return None;
        }
        let stock = state.stock.as_ref()?;
        let projections = project(&ProjectionInputs {
            current_eps: stock.quote.eps,
            current_bvps: stock.current_bvps,
            assumptions: state.assumptions,
        });

        Some(WatchlistItem {
            ticker: stock.quote.symbol.clone(),
            name: stock.quote.name.clone(),
            price_at_save: stock.quote.price,
            assumptions: state.assumptions,
            results: WatchlistResults {
                future_price: projections.earnings.future_price,
                npv_at_10_earnings: projections.earnings.benchmark_npv(),
                future_price_from_bv: projections.book_value.future_price,
                npv_at_10_book_value: projections.book_value.benchmark_npv(),
            },
            saved_at: now,
        })
    }

    /// Ticker suggestions for a partial query. Empty without a search provider.
    pub async fn suggest(&self, query: &str) -> Result<Vec<StockSuggestion>, ValuationError> {
        let query = query.trim();
        match &self.symbol_search {
            Some(search) if !query.is_empty() => search.search(query).await,
            _ => Ok(Vec::new()),
        }
    }
}
