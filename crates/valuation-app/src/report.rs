//! Plain-text rendering of an analysis and of the watchlist.

use analysis_orchestrator::AnalysisState;
use std::fmt::Write;
use valuation_core::{CagrResult, NpvResult, WatchlistItem};
use valuation_engine::formatters::{
    format_currency, format_de_ratio, format_market_cap, format_optional, format_pb_ratio,
    format_pe_ratio, format_percent,
};
use valuation_engine::insights::{average, average_pe, is_high_leverage, roe_trend, RoeTrend};
use valuation_engine::{npv_range, npv_vs_price, Projections};

fn cagr_line(label: &str, cagr: &CagrResult) -> String {
    format!(
        "{label}: 3y {} | 5y {} | 7y {}",
        format_optional(cagr.three_year, format_percent),
        format_optional(cagr.five_year, format_percent),
        format_optional(cagr.seven_year, format_percent),
    )
}

fn npv_table(out: &mut String, results: &[NpvResult], price: f64) {
    for r in results {
        let gap = format_optional(npv_vs_price(r.npv, price), format_percent);
        let _ = writeln!(out, "    {:>4}  {:>14}  {:>8} vs price", r.discount_rate_label, format_currency(r.npv), gap);
    }
    if let Some((low, high)) = npv_range(results) {
        let _ = writeln!(out, "    range {} - {}", format_currency(low), format_currency(high));
    }
}

/// `supplementary_pe` says whether the MSN P/E lookup was enabled for this run.
pub fn render_analysis(state: &AnalysisState, projections: &Projections, supplementary_pe: bool) -> String {
    let mut out = String::new();
    let Some(stock) = state.stock.as_ref() else {
        let _ = writeln!(out, "No analysis loaded ({:?})", state.status);
        return out;
    };
    let quote = &stock.quote;
    let history = &stock.history;
    let assumptions = &state.assumptions;

    let _ = writeln!(out, "{} ({}) {}", quote.name, quote.symbol, quote.exchange);
    let _ = writeln!(
        out,
        "Price {} | Market cap {} | EPS {} | P/E {}",
        format_currency(quote.price),
        format_market_cap(quote.market_cap),
        format_optional(quote.eps, format_currency),
        format_optional(quote.valid_pe(), format_pe_ratio),
    );
    if !supplementary_pe {
        let _ = writeln!(out, "P/E and EPS from Finnhub only (set MSN_API_KEY to prefer the MSN P/E)");
    }

    // Earnings method
    let _ = writeln!(out, "\nEarnings valuation");
    let _ = writeln!(out, "  {}", cagr_line("EPS CAGR", &stock.eps_cagr));
    let _ = writeln!(
        out,
        "  Average historical P/E {}",
        format_optional(average_pe(&history.pe_values()), format_pe_ratio)
    );
    let earnings = &projections.earnings;
    let _ = writeln!(
        out,
        "  Assumed growth {} at exit P/E {}",
        format_optional(assumptions.expected_cagr, format_percent),
        format_optional(assumptions.expected_pe, format_pe_ratio),
    );
    let _ = writeln!(
        out,
        "  Year-5 EPS {} -> price {}",
        format_optional(earnings.future_eps, format_currency),
        format_optional(earnings.future_price, format_currency),
    );
    if earnings.npv_results.is_empty() {
        let _ = writeln!(out, "  Pass --cagr and --pe to complete this method");
    } else {
        npv_table(&mut out, &earnings.npv_results, quote.price);
        if let Some(verdict) = earnings.verdict(quote.price) {
            let _ = writeln!(out, "  {}: {}", verdict.label(), verdict.description());
        }
        let _ = writeln!(
            out,
            "  Implied annual return {}",
            format_optional(earnings.implied_annual_return(quote.price), format_percent)
        );
    }

    // Book value method
    let _ = writeln!(out, "\nBook value valuation");
    let _ = writeln!(out, "  {}", cagr_line("BVPS CAGR", &stock.bvps_cagr));
    let roe_values = history.roe_values();
    let trend = match roe_trend(&roe_values) {
        RoeTrend::Up => "rising",
        RoeTrend::Down => "falling",
        RoeTrend::Flat => "stable",
    };
    let _ = writeln!(
        out,
        "  BVPS {} | ROE {} (avg {}, {trend})",
        format_optional(stock.current_bvps, format_currency),
        format_optional(stock.current_roe, format_percent),
        format_optional(average(&roe_values), format_percent),
    );
    let de_values = history.debt_to_equity_values();
    let _ = writeln!(
        out,
        "  Average debt/equity {}",
        format_optional(average(&de_values), format_de_ratio)
    );
    if is_high_leverage(&de_values) {
        let _ = writeln!(out, "  High leverage: ROE may be inflated by debt");
    }
    let book_value = &projections.book_value;
    let _ = writeln!(
        out,
        "  Year-5 BVPS {} -> EPS {} -> price {}",
        format_optional(book_value.future_bvps, format_currency),
        format_optional(book_value.future_eps, format_currency),
        format_optional(book_value.future_price, format_currency),
    );
    if book_value.npv_results.is_empty() {
        let _ = writeln!(out, "  Pass --bvps-cagr, --roe and --pe-bv to complete this method");
    } else {
        npv_table(&mut out, &book_value.npv_results, quote.price);
        if let Some(verdict) = book_value.verdict(quote.price) {
            let _ = writeln!(out, "  {}", verdict.label());
        }
    }
    if let Some(pb) = stock
        .current_bvps
        .and_then(|bvps| book_value.price_to_book(quote.price, bvps))
    {
        let _ = writeln!(
            out,
            "  P/B today {} | implied year 5 {}",
            format_optional(pb.current_pb, format_pb_ratio),
            format_optional(pb.implied_pb, format_pb_ratio),
        );
        if let Some(assessment) = pb.assessment {
            let _ = writeln!(out, "  {}", assessment.message());
        }
    }

    if let Some(cmp) = projections.comparison() {
        let _ = writeln!(out, "\nCross-method comparison at 10%");
        let _ = writeln!(
            out,
            "  Earnings {} | Book value {} | Average {} | Divergence {}",
            format_currency(cmp.earnings_npv),
            format_currency(cmp.book_value_npv),
            format_currency(cmp.average),
            format_percent(cmp.divergence),
        );
        let _ = writeln!(
            out,
            "  {}",
            if cmp.converges {
                "Both methods point to a similar value."
            } else {
                "The methods disagree; revisit the assumptions behind each."
            }
        );
    }

    out
}

pub fn render_watchlist(items: &[WatchlistItem]) -> String {
    if items.is_empty() {
        return "Watchlist is empty\n".to_string();
    }

    let mut out = String::new();
    for item in items {
        let verdict = watchlist::verdict(item)
            .map(|v| v.short_label())
            .unwrap_or("Incomplete");
        let _ = writeln!(
            out,
            "{:<8} {:<28} saved at {:>12}  NPV@10% {:>12}  {}  ({})",
            item.ticker,
            item.name,
            format_currency(item.price_at_save),
            format_optional(watchlist::best_npv(item), format_currency),
            verdict,
            item.saved_at.format("%Y-%m-%d"),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use data_normalizer::NormalizedStock;
    use valuation_core::{AppStatus, Assumptions, HistoryEntry, MetricHistory, QuoteData, WatchlistResults};
    use valuation_engine::pipeline::{project, ProjectionInputs};

    fn loaded_state(assumptions: Assumptions) -> AnalysisState {
        let mut state = AnalysisState::default();
        state.status = AppStatus::Loaded;
        state.ticker = "AAPL".to_string();
        state.assumptions = assumptions;
        state.stock = Some(NormalizedStock {
            quote: QuoteData {
                symbol: "AAPL".to_string(),
                name: "Apple Inc".to_string(),
                price: 150.0,
                eps: Some(6.0),
                pe: Some(25.0),
                market_cap: Some(2.5e12),
                exchange: "NASDAQ".to_string(),
            },
            history: MetricHistory {
                roe: vec![HistoryEntry::new("2024", Some(0.30)), HistoryEntry::new("2023", Some(0.20))],
                debt_to_equity: vec![HistoryEntry::new("2024", Some(2.0))],
                ..Default::default()
            },
            eps_cagr: Default::default(),
            bvps_cagr: Default::default(),
            current_bvps: Some(40.0),
            current_roe: Some(0.30),
        });
        state
    }

    fn projections_for(state: &AnalysisState) -> Projections {
        project(&ProjectionInputs {
            current_eps: state.current_eps(),
            current_bvps: state.current_bvps(),
            assumptions: state.assumptions,
        })
    }

    #[test]
    fn test_report_for_complete_earnings_method() {
        let state = loaded_state(Assumptions {
            expected_cagr: Some(0.08),
            expected_pe: Some(20.0),
            ..Default::default()
        });
        let report = render_analysis(&state, &projections_for(&state), true);

        assert!(report.contains("Apple Inc (AAPL)"));
        assert!(!report.contains("Finnhub only"));
        assert!(report.contains("$2.50T"));
        assert!(report.contains("Potentially Overvalued"));
        assert!(report.contains("$109.48"));
        assert!(report.contains("rising"));
        assert!(report.contains("High leverage"));
        assert!(report.contains("Pass --bvps-cagr"));
        assert!(!report.contains("Cross-method"));
    }

    #[test]
    fn test_report_with_both_methods() {
        let state = loaded_state(Assumptions {
            expected_cagr: Some(0.08),
            expected_pe: Some(20.0),
            expected_bvps_cagr: Some(0.06),
            expected_roe: Some(0.15),
            expected_pe_bv: Some(18.0),
        });
        let report = render_analysis(&state, &projections_for(&state), true);
        assert!(report.contains("Cross-method comparison"));
        assert!(report.contains("P/B today 3.75x"));
    }

    #[test]
    fn test_unloaded_state() {
        let state = AnalysisState::default();
        let report = render_analysis(&state, &projections_for(&state), false);
        assert!(report.starts_with("No analysis loaded"));
    }

    #[test]
    fn test_report_flags_primary_only_pe() {
        let state = loaded_state(Assumptions::default());
        let report = render_analysis(&state, &projections_for(&state), false);
        assert!(report.contains("P/E and EPS from Finnhub only"));
        assert!(report.contains("MSN_API_KEY"));
    }

    #[test]
    fn test_watchlist_rendering() {
        assert_eq!(render_watchlist(&[]), "Watchlist is empty\n");

        let item = WatchlistItem {
            ticker: "KO".to_string(),
            name: "Coca-Cola".to_string(),
            price_at_save: 60.0,
            assumptions: Assumptions::default(),
            results: WatchlistResults {
                npv_at_10_book_value: Some(80.0),
                ..Default::default()
            },
            saved_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let out = render_watchlist(&[item]);
        assert!(out.contains("KO"));
        assert!(out.contains("$80.00"));
        assert!(out.contains("Undervalued"));
        assert!(out.contains("2024-05-01"));
    }
}
