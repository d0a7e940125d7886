//! Annual series extraction.

use market_data_client::{FinnhubMetrics, FinnhubProfile, SeriesPoint};
use valuation_core::{HistoryEntry, MetricHistory, MAX_HISTORY_POINTS};

pub fn to_finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `"2023-09-30"` -> `"2023"`. Shorter strings pass through unchanged.
pub fn extract_year(period: &str) -> String {
    period.chars().take(4).collect()
}

fn recent(points: &[SeriesPoint]) -> impl Iterator<Item = &SeriesPoint> {
    points.iter().take(MAX_HISTORY_POINTS)
}

fn nullable_history(points: &[SeriesPoint]) -> Vec<HistoryEntry> {
    recent(points)
        .map(|p| HistoryEntry::new(extract_year(&p.period), to_finite(p.v)))
        .collect()
}

pub fn eps_history(points: &[SeriesPoint]) -> Vec<HistoryEntry> {
    nullable_history(points)
}

/// Missing and non-positive P/E points are dropped rather than kept as gaps.
pub fn pe_history(points: &[SeriesPoint]) -> Vec<HistoryEntry<f64>> {
    recent(points)
        .filter_map(|p| {
            to_finite(p.v)
                .filter(|pe| *pe > 0.0)
                .map(|pe| HistoryEntry::new(extract_year(&p.period), pe))
        })
        .collect()
}

/// Aggregate book value divided by the current share count.
pub fn bvps_history(book_value: &[SeriesPoint], shares_outstanding: Option<f64>) -> Vec<HistoryEntry> {
    let shares = to_finite(shares_outstanding).filter(|s| *s > 0.0);
    recent(book_value)
        .map(|p| {
            let bvps = to_finite(p.v).zip(shares).map(|(total, shares)| total / shares);
            HistoryEntry::new(extract_year(&p.period), bvps)
        })
        .collect()
}

pub fn roe_history(points: &[SeriesPoint]) -> Vec<HistoryEntry> {
    nullable_history(points)
}

pub fn debt_to_equity_history(points: &[SeriesPoint]) -> Vec<HistoryEntry> {
    nullable_history(points)
}

pub fn build_history(metrics: &FinnhubMetrics, profile: &FinnhubProfile) -> MetricHistory {
    let Some(series) = metrics.series.as_ref() else {
        return MetricHistory::default();
    };
    let annual = &series.annual;

    MetricHistory {
        eps: eps_history(&annual.eps),
        pe: pe_history(&annual.pe),
        bvps: bvps_history(&annual.book_value, profile.share_outstanding),
        roe: roe_history(&annual.roe),
        debt_to_equity: debt_to_equity_history(&annual.total_debt_to_equity),
    }
}

/// The reported per-share metric wins over the derived series.
pub fn current_bvps(metrics: &FinnhubMetrics, history: &MetricHistory) -> Option<f64> {
    to_finite(metrics.metric.book_value_per_share_annual)
        .or_else(|| history.bvps.first().and_then(|e| e.value))
}

pub fn current_roe(history: &MetricHistory) -> Option<f64> {
    history.roe.first().and_then(|e| e.value)
}
