use data_normalizer::NormalizedStock;
use serde::Serialize;
use valuation_core::{AppStatus, Assumptions};

/// Identifies one search. Only the most recently issued token may write state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(pub(crate) u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank ticker, nothing was requested.
    Ignored,
    Loaded { ticker: String },
    Failed { message: String },
    /// A newer search or a reset was issued while this one was in flight.
    /// Its result was dropped without touching state.
    Superseded,
}

/// The single "current analysis" bundle.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisState {
    pub status: AppStatus,
    pub error: Option<String>,
    pub ticker: String,
    pub stock: Option<NormalizedStock>,
    pub assumptions: Assumptions,
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl AnalysisState {
    pub fn is_loaded(&self) -> bool {
        self.status == AppStatus::Loaded && self.stock.is_some()
    }

    pub fn current_eps(&self) -> Option<f64> {
        self.stock.as_ref().and_then(|s| s.quote.eps)
    }

    pub fn current_pe(&self) -> Option<f64> {
        self.stock.as_ref().and_then(|s| s.quote.pe)
    }

    pub fn current_bvps(&self) -> Option<f64> {
        self.stock.as_ref().and_then(|s| s.current_bvps)
    }

    pub fn current_roe(&self) -> Option<f64> {
        self.stock.as_ref().and_then(|s| s.current_roe)
    }

    pub fn current_token(&self) -> RequestToken {
        RequestToken(self.generation)
    }
}
