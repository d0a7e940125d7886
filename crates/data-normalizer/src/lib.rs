//! Turns raw provider payloads into the validated per-stock snapshot the
//! valuation runs on.

pub mod quote;
pub mod series;

pub use quote::{normalize_quote, resolve_earnings, resolve_price, Earnings};
pub use series::{build_history, current_bvps, current_roe, extract_year, to_finite};

use market_data_client::{FinnhubMetrics, FinnhubProfile, FinnhubQuote};
use serde::{Deserialize, Serialize};
use valuation_core::{CagrResult, MetricHistory, QuoteData, ValuationError};
use valuation_engine::compute_cagr_set;

/// Everything fetched for one ticker in a single search.
#[derive(Debug, Clone, Default)]
pub struct RawBundle {
    pub quote: FinnhubQuote,
    pub profile: FinnhubProfile,
    pub metrics: FinnhubMetrics,
    pub supplementary_pe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStock {
    pub quote: QuoteData,
    pub history: MetricHistory,
    pub eps_cagr: CagrResult,
    pub bvps_cagr: CagrResult,
    pub current_bvps: Option<f64>,
    pub current_roe: Option<f64>,
}

pub fn normalize(bundle: &RawBundle) -> Result<NormalizedStock, ValuationError> {
    let price = resolve_price(&bundle.quote)?;
    let earnings = resolve_earnings(&bundle.metrics, price, bundle.supplementary_pe);
    if bundle.supplementary_pe.is_some() {
        tracing::debug!(pe = ?earnings.pe, eps = ?earnings.eps, "Using supplementary P/E");
    }

    let quote = normalize_quote(&bundle.profile, price, earnings);
    let history = build_history(&bundle.metrics, &bundle.profile);

    Ok(NormalizedStock {
        eps_cagr: compute_cagr_set(&history.eps_values()),
        bvps_cagr: compute_cagr_set(&history.bvps_values()),
        current_bvps: current_bvps(&bundle.metrics, &history),
        current_roe: current_roe(&history),
        quote,
        history,
    })
}
