//! Secondary readings derived from history and projections: cross-method
//! agreement, price-to-book sanity, ROE trend and leverage.

use serde::{Deserialize, Serialize};
use valuation_core::CONVERGENCE_THRESHOLD;

/// Agreement between the earnings and book-value NPVs at the benchmark rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub earnings_npv: f64,
    pub book_value_npv: f64,
    pub average: f64,
    pub divergence: f64,
    pub converges: bool,
}

pub fn compare_methods(earnings_npv: f64, book_value_npv: f64) -> MethodComparison {
    let average = (earnings_npv + book_value_npv) / 2.0;
    let divergence = if average > 0.0 {
        (earnings_npv - book_value_npv).abs() / average
    } else {
        0.0
    };

    MethodComparison {
        earnings_npv,
        book_value_npv,
        average,
        divergence,
        converges: divergence < CONVERGENCE_THRESHOLD,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PbAssessment {
    MuchHigher,
    MuchLower,
    Consistent,
}

impl PbAssessment {
    pub fn message(&self) -> &'static str {
        match self {
            PbAssessment::MuchHigher => "Your assumptions imply a much higher P/B in Year 5 than today. Verify that the expected P/E and ROE are realistic.",
            PbAssessment::MuchLower => "Your assumptions imply a much lower P/B in Year 5 than today. The stock may currently be priced for higher growth.",
            PbAssessment::Consistent => "The implied P/B in Year 5 is reasonably consistent with the current P/B ratio.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceToBookInsight {
    pub current_pb: Option<f64>,
    pub implied_pb: Option<f64>,
    pub assessment: Option<PbAssessment>,
}

/// Today's P/B against the P/B the book-value projection implies in year five.
pub fn price_to_book_insight(
    current_price: f64,
    current_bvps: f64,
    future_bvps: f64,
    future_price_from_bv: f64,
) -> PriceToBookInsight {
    let current_pb = (current_bvps > 0.0).then(|| current_price / current_bvps);
    let implied_pb = (future_bvps > 0.0).then(|| future_price_from_bv / future_bvps);

    let assessment = match (current_pb, implied_pb) {
        (Some(current), Some(implied)) if implied > current * 1.5 => Some(PbAssessment::MuchHigher),
        (Some(current), Some(implied)) if implied < current * 0.5 => Some(PbAssessment::MuchLower),
        (Some(_), Some(_)) => Some(PbAssessment::Consistent),
        _ => None,
    };

    PriceToBookInsight {
        current_pb,
        implied_pb,
        assessment,
    }
}

/// Mean of the present values, `None` when every point is missing.
pub fn average(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

pub fn average_pe(pe_values: &[f64]) -> Option<f64> {
    if pe_values.is_empty() {
        None
    } else {
        Some(pe_values.iter().sum::<f64>() / pe_values.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoeTrend {
    Up,
    Down,
    Flat,
}

/// Newest present ROE against the oldest present one, with a 10% dead zone.
pub fn roe_trend(roe_values: &[Option<f64>]) -> RoeTrend {
    let present: Vec<f64> = roe_values.iter().filter_map(|v| *v).collect();
    if present.len() < 2 {
        return RoeTrend::Flat;
    }
    let newest = present[0];
    let oldest = present[present.len() - 1];

    if newest > oldest * 1.1 {
        RoeTrend::Up
    } else if newest < oldest * 0.9 {
        RoeTrend::Down
    } else {
        RoeTrend::Flat
    }
}

const HIGH_LEVERAGE_DEBT_TO_EQUITY: f64 = 1.5;

/// Average D/E above 1.5 can inflate ROE.
pub fn is_high_leverage(debt_to_equity: &[Option<f64>]) -> bool {
    average(debt_to_equity).is_some_and(|avg| avg > HIGH_LEVERAGE_DEBT_TO_EQUITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_methods_converge_within_threshold() {
        let cmp = compare_methods(100.0, 110.0);
        assert_relative_eq!(cmp.average, 105.0, epsilon = 1e-12);
        assert_relative_eq!(cmp.divergence, 10.0 / 105.0, epsilon = 1e-12);
        assert!(cmp.converges);

        let cmp = compare_methods(100.0, 140.0);
        assert!(!cmp.converges);
    }

    #[test]
    fn test_methods_with_non_positive_average() {
        let cmp = compare_methods(-50.0, 20.0);
        assert_eq!(cmp.divergence, 0.0);
        assert!(cmp.converges);
    }

    #[test]
    fn test_price_to_book_assessment() {
        // current P/B = 3.0, implied = 200 / 40 = 5.0
        let insight = price_to_book_insight(90.0, 30.0, 40.0, 200.0);
        assert_relative_eq!(insight.current_pb.unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(insight.implied_pb.unwrap(), 5.0, epsilon = 1e-12);
        assert_eq!(insight.assessment, Some(PbAssessment::MuchHigher));

        let insight = price_to_book_insight(90.0, 30.0, 40.0, 40.0);
        assert_eq!(insight.assessment, Some(PbAssessment::MuchLower));

        let insight = price_to_book_insight(90.0, 30.0, 40.0, 120.0);
        assert_eq!(insight.assessment, Some(PbAssessment::Consistent));
    }

    #[test]
    fn test_price_to_book_without_book_value() {
        let insight = price_to_book_insight(90.0, 0.0, 40.0, 120.0);
        assert_eq!(insight.current_pb, None);
        assert_eq!(insight.assessment, None);
    }

    #[test]
    fn test_history_averages() {
        assert_relative_eq!(average(&[Some(1.0), None, Some(3.0)]).unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(average(&[None, None]), None);
        assert_relative_eq!(average_pe(&[20.0, 30.0]).unwrap(), 25.0, epsilon = 1e-12);
        assert_eq!(average_pe(&[]), None);
    }

    #[test]
    fn test_roe_trend() {
        assert_eq!(roe_trend(&[Some(0.30), Some(0.25), Some(0.20)]), RoeTrend::Up);
        assert_eq!(roe_trend(&[Some(0.10), None, Some(0.20)]), RoeTrend::Down);
        assert_eq!(roe_trend(&[Some(0.21), Some(0.20)]), RoeTrend::Flat);
        assert_eq!(roe_trend(&[Some(0.21)]), RoeTrend::Flat);
    }

    #[test]
    fn test_leverage_flag() {
        assert!(is_high_leverage(&[Some(2.0), Some(1.8), None]));
        assert!(!is_high_leverage(&[Some(0.4), Some(0.6)]));
        assert!(!is_high_leverage(&[]));
    }
}
