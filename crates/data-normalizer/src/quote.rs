//! Price, EPS and P/E resolution across the primary and supplementary providers.

use market_data_client::{FinnhubMetrics, FinnhubProfile, FinnhubQuote};
use valuation_core::{QuoteData, ValuationError};

use crate::series::to_finite;

/// Current price, which must be finite and strictly positive.
pub fn resolve_price(quote: &FinnhubQuote) -> Result<f64, ValuationError> {
    to_finite(quote.c).filter(|p| *p > 0.0).ok_or_else(|| {
        ValuationError::InvalidData("Quote data did not include a valid stock price".to_string())
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Earnings {
    pub eps: Option<f64>,
    pub pe: Option<f64>,
}

/// Picks EPS and P/E.
///
/// A supplementary P/E replaces the primary one and the EPS is back-derived
/// from it so the pair stays consistent with the current price. A
/// supplementary P/E that is not finite and positive is ignored. Without one,
/// trailing values are preferred over annual ones.
pub fn resolve_earnings(metrics: &FinnhubMetrics, price: f64, supplementary_pe: Option<f64>) -> Earnings {
    let m = &metrics.metric;
    let primary_eps = to_finite(m.eps_ttm).or_else(|| to_finite(m.eps_annual));
    let primary_pe = to_finite(m.pe_ttm).or_else(|| to_finite(m.pe_annual));

    match supplementary_pe.filter(|pe| pe.is_finite() && *pe > 0.0) {
        Some(pe) if price > 0.0 => Earnings {
            eps: Some(price / pe),
            pe: Some(pe),
        },
        _ => Earnings {
            eps: primary_eps,
            pe: primary_pe,
        },
    }
}

pub fn normalize_quote(profile: &FinnhubProfile, price: f64, earnings: Earnings) -> QuoteData {
    let symbol = profile.ticker.clone().unwrap_or_default();
    let name = profile
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| symbol.clone());

    QuoteData {
        symbol,
        name,
        price,
        eps: earnings.eps,
        pe: earnings.pe,
        market_cap: to_finite(profile.market_capitalization)
            .filter(|cap| *cap != 0.0)
            .map(|cap| cap * 1_000_000.0),
        exchange: profile.exchange.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use market_data_client::MetricSnapshot;

    fn metrics(snapshot: MetricSnapshot) -> FinnhubMetrics {
        FinnhubMetrics {
            metric: snapshot,
            ..Default::default()
        }
    }

    #[test]
    fn test_price_must_be_positive() {
        let ok = FinnhubQuote { c: Some(150.0), ..Default::default() };
        assert_eq!(resolve_price(&ok), Ok(150.0));

        for c in [None, Some(0.0), Some(-1.0), Some(f64::NAN)] {
            let err = resolve_price(&FinnhubQuote { c, ..Default::default() }).unwrap_err();
            assert_eq!(err.user_message(), "Quote data did not include a valid stock price");
        }
    }

    #[test]
    fn test_trailing_preferred_over_annual() {
        let m = metrics(MetricSnapshot {
            eps_ttm: Some(6.1),
            eps_annual: Some(5.9),
            pe_ttm: None,
            pe_annual: Some(24.0),
            ..Default::default()
        });
        let e = resolve_earnings(&m, 150.0, None);
        assert_eq!(e, Earnings { eps: Some(6.1), pe: Some(24.0) });
    }

    #[test]
    fn test_supplementary_pe_rederives_eps() {
        let m = metrics(MetricSnapshot {
            eps_ttm: Some(1.2),
            pe_ttm: Some(120.0),
            ..Default::default()
        });
        let e = resolve_earnings(&m, 150.0, Some(25.0));
        assert_eq!(e.pe, Some(25.0));
        assert_relative_eq!(e.eps.unwrap(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_supplementary_pe_falls_back_to_primary() {
        let m = metrics(MetricSnapshot {
            eps_ttm: Some(6.0),
            pe_ttm: Some(25.0),
            ..Default::default()
        });
        for pe in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let e = resolve_earnings(&m, 150.0, Some(pe));
            assert_eq!(e, Earnings { eps: Some(6.0), pe: Some(25.0) }, "supplementary pe {pe}");
        }

        let e = resolve_earnings(&FinnhubMetrics::default(), 150.0, Some(0.0));
        assert_eq!(e, Earnings { eps: None, pe: None });
    }

    #[test]
    fn test_quote_assembly() {
        let profile = FinnhubProfile {
            ticker: Some("AAPL".to_string()),
            name: Some(String::new()),
            exchange: Some("NASDAQ NMS - GLOBAL MARKET".to_string()),
            market_capitalization: Some(2_500_000.0),
            ..Default::default()
        };
        let quote = normalize_quote(&profile, 150.0, Earnings { eps: Some(6.0), pe: Some(25.0) });

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.name, "AAPL");
        assert_relative_eq!(quote.market_cap.unwrap(), 2.5e12, epsilon = 1.0);

        let no_cap = FinnhubProfile {
            market_capitalization: Some(0.0),
            ..profile
        };
        assert_eq!(normalize_quote(&no_cap, 150.0, Earnings { eps: None, pe: None }).market_cap, None);
    }
}
