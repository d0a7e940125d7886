//! Step-gated projection pipeline.
//!
//! Each stage is a pure function of the stages before it and stays `None` (or
//! empty) until every upstream input exists, so a half-filled set of
//! assumptions never yields a partial number.

use serde::{Deserialize, Serialize};
use valuation_core::{Assumptions, NpvResult, Verdict, BENCHMARK_DISCOUNT_RATE};

use crate::calculations::{
    classify_verdict, compute_all_npvs, compute_future_eps_from_book_value, compute_future_price,
    compute_future_value, compute_implied_annual_return, npv_at,
};
use crate::insights::{compare_methods, price_to_book_insight, MethodComparison, PriceToBookInsight};

/// Everything the projections depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    pub current_eps: Option<f64>,
    pub current_bvps: Option<f64>,
    pub assumptions: Assumptions,
}

/// EPS growth -> exit P/E -> discounted price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsProjection {
    pub future_eps: Option<f64>,
    pub future_price: Option<f64>,
    pub npv_results: Vec<NpvResult>,
}

/// BVPS growth -> ROE -> exit P/E -> discounted price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookValueProjection {
    pub future_bvps: Option<f64>,
    pub future_eps: Option<f64>,
    pub future_price: Option<f64>,
    pub npv_results: Vec<NpvResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projections {
    pub earnings: EarningsProjection,
    pub book_value: BookValueProjection,
}

pub fn project_earnings(current_eps: Option<f64>, assumptions: &Assumptions) -> EarningsProjection {
    let future_eps = current_eps
        .zip(assumptions.expected_cagr)
        .map(|(eps, cagr)| compute_future_value(eps, cagr));

    let future_price = future_eps
        .zip(assumptions.expected_pe)
        .map(|(eps, pe)| compute_future_price(eps, pe));

    EarningsProjection {
        future_eps,
        future_price,
        npv_results: future_price.map(compute_all_npvs).unwrap_or_default(),
    }
}

pub fn project_book_value(current_bvps: Option<f64>, assumptions: &Assumptions) -> BookValueProjection {
    let future_bvps = current_bvps
        .zip(assumptions.expected_bvps_cagr)
        .map(|(bvps, cagr)| compute_future_value(bvps, cagr));

    let future_eps = future_bvps
        .zip(assumptions.expected_roe)
        .map(|(bvps, roe)| compute_future_eps_from_book_value(bvps, roe));

    let future_price = future_eps
        .zip(assumptions.expected_pe_bv)
        .map(|(eps, pe)| compute_future_price(eps, pe));

    BookValueProjection {
        future_bvps,
        future_eps,
        future_price,
        npv_results: future_price.map(compute_all_npvs).unwrap_or_default(),
    }
}

pub fn project(inputs: &ProjectionInputs) -> Projections {
    Projections {
        earnings: project_earnings(inputs.current_eps, &inputs.assumptions),
        book_value: project_book_value(inputs.current_bvps, &inputs.assumptions),
    }
}

impl EarningsProjection {
    pub fn benchmark_npv(&self) -> Option<f64> {
        npv_at(&self.npv_results, BENCHMARK_DISCOUNT_RATE)
    }

    pub fn verdict(&self, current_price: f64) -> Option<Verdict> {
        self.benchmark_npv().map(|npv| classify_verdict(current_price, npv))
    }

    pub fn implied_annual_return(&self, current_price: f64) -> Option<f64> {
        self.future_price
            .map(|price| compute_implied_annual_return(price, current_price))
    }
}

impl BookValueProjection {
    pub fn benchmark_npv(&self) -> Option<f64> {
        npv_at(&self.npv_results, BENCHMARK_DISCOUNT_RATE)
    }

    pub fn verdict(&self, current_price: f64) -> Option<Verdict> {
        self.benchmark_npv().map(|npv| classify_verdict(current_price, npv))
    }

    pub fn implied_annual_return(&self, current_price: f64) -> Option<f64> {
        self.future_price
            .map(|price| compute_implied_annual_return(price, current_price))
    }

    pub fn price_to_book(&self, current_price: f64, current_bvps: f64) -> Option<PriceToBookInsight> {
        let future_bvps = self.future_bvps?;
        let future_price = self.future_price?;
        Some(price_to_book_insight(current_price, current_bvps, future_bvps, future_price))
    }
}

impl Projections {
    pub fn both_methods_complete(&self) -> bool {
        !self.earnings.npv_results.is_empty() && !self.book_value.npv_results.is_empty()
    }

    /// Cross-method comparison once both NPV tables exist.
    pub fn comparison(&self) -> Option<MethodComparison> {
        let earnings = self.earnings.benchmark_npv()?;
        let book_value = self.book_value.benchmark_npv()?;
        Some(compare_methods(earnings, book_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_assumptions() -> Assumptions {
        Assumptions {
            expected_cagr: Some(0.08),
            expected_pe: Some(20.0),
            expected_bvps_cagr: Some(0.06),
            expected_roe: Some(0.15),
            expected_pe_bv: Some(18.0),
        }
    }

    #[test]
    fn test_earnings_chain_is_step_gated() {
        let mut assumptions = Assumptions::default();
        let p = project_earnings(Some(6.0), &assumptions);
        assert_eq!(p, EarningsProjection::default());

        assumptions.expected_cagr = Some(0.08);
        let p = project_earnings(Some(6.0), &assumptions);
        assert!(p.future_eps.is_some());
        assert_eq!(p.future_price, None);
        assert!(p.npv_results.is_empty());

        assumptions.expected_pe = Some(20.0);
        let p = project_earnings(Some(6.0), &assumptions);
        assert_relative_eq!(p.future_price.unwrap(), 176.4, epsilon = 0.1);
        assert_eq!(p.npv_results.len(), 5);

        let p = project_earnings(None, &assumptions);
        assert_eq!(p, EarningsProjection::default());
    }

    #[test]
    fn test_book_value_chain() {
        let p = project_book_value(Some(40.0), &full_assumptions());
        let future_bvps = 40.0 * 1.06_f64.powi(5);
        assert_relative_eq!(p.future_bvps.unwrap(), future_bvps, epsilon = 1e-9);
        assert_relative_eq!(p.future_eps.unwrap(), future_bvps * 0.15, epsilon = 1e-9);
        assert_relative_eq!(p.future_price.unwrap(), future_bvps * 0.15 * 18.0, epsilon = 1e-9);
        assert_eq!(p.npv_results.len(), 5);

        let mut missing_roe = full_assumptions();
        missing_roe.expected_roe = None;
        let p = project_book_value(Some(40.0), &missing_roe);
        assert!(p.future_bvps.is_some());
        assert_eq!(p.future_eps, None);
        assert_eq!(p.future_price, None);
        assert!(p.npv_results.is_empty());
    }

    #[test]
    fn test_full_projection_and_verdicts() {
        let inputs = ProjectionInputs {
            current_eps: Some(6.0),
            current_bvps: Some(40.0),
            assumptions: full_assumptions(),
        };
        let projections = project(&inputs);

        assert!(projections.both_methods_complete());
        assert_relative_eq!(projections.earnings.benchmark_npv().unwrap(), 109.5, epsilon = 0.1);
        assert_eq!(projections.earnings.verdict(150.0), Some(Verdict::Overvalued));
        assert!(projections.comparison().is_some());

        let ret = projections.earnings.implied_annual_return(150.0).unwrap();
        assert_relative_eq!(ret, (176.319_f64 / 150.0).powf(0.2) - 1.0, epsilon = 1e-4);

        let pb = projections.book_value.price_to_book(150.0, 40.0).unwrap();
        assert_relative_eq!(pb.current_pb.unwrap(), 3.75, epsilon = 1e-12);
        assert_relative_eq!(pb.implied_pb.unwrap(), 0.15 * 18.0, epsilon = 1e-9);
    }

    #[test]
    fn test_comparison_requires_both_methods() {
        let inputs = ProjectionInputs {
            current_eps: Some(6.0),
            current_bvps: None,
            assumptions: full_assumptions(),
        };
        let projections = project(&inputs);
        assert!(!projections.both_methods_complete());
        assert_eq!(projections.comparison(), None);
        assert_eq!(projections.book_value.verdict(150.0), None);
    }
}
