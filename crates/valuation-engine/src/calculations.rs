use valuation_core::{
    CagrResult, NpvResult, Verdict, DISCOUNT_RATES, OVERVALUED_MULTIPLE, PROJECTION_YEARS,
    UNDERVALUED_MULTIPLE,
};

/// Compound annual growth rate between two values.
///
/// Returns `None` unless `years`, `begin` and `end` are all finite and strictly
/// positive: growth from or to a loss is not a meaningful compound rate.
pub fn compute_cagr(begin: f64, end: f64, years: f64) -> Option<f64> {
    if !(begin.is_finite() && end.is_finite() && years.is_finite()) {
        return None;
    }
    if years <= 0.0 || begin <= 0.0 || end <= 0.0 {
        return None;
    }
    Some((end / begin).powf(1.0 / years) - 1.0)
}

/// 3, 5 and 7 year CAGR from a most-recent-first series.
///
/// `values[0]` is the latest year and `values[n]` is `n` years earlier. A period
/// is only reported when the series is strictly longer than the offset.
pub fn compute_cagr_set(values: &[Option<f64>]) -> CagrResult {
    let current = values.first().copied().flatten();

    let period = |years: usize| -> Option<f64> {
        if values.len() <= years {
            return None;
        }
        let start = values[years]?;
        compute_cagr(start, current?, years as f64)
    };

    CagrResult {
        three_year: period(3),
        five_year: period(5),
        seven_year: period(7),
    }
}

/// `current * (1 + rate)^PROJECTION_YEARS`
pub fn compute_future_value(current: f64, rate: f64) -> f64 {
    compute_future_value_over(current, rate, PROJECTION_YEARS)
}

pub fn compute_future_value_over(current: f64, rate: f64, years: i32) -> f64 {
    current * (1.0 + rate).powi(years)
}

/// Future price from projected earnings and an exit multiple.
pub fn compute_future_price(future_earnings: f64, expected_multiple: f64) -> f64 {
    future_earnings * expected_multiple
}

/// Earnings implied by a book value per share and a return on equity (fraction).
pub fn compute_future_eps_from_book_value(future_bvps: f64, roe: f64) -> f64 {
    future_bvps * roe
}

/// `future_value / (1 + rate)^PROJECTION_YEARS`
pub fn compute_npv(future_value: f64, discount_rate: f64) -> f64 {
    compute_npv_over(future_value, discount_rate, PROJECTION_YEARS)
}

pub fn compute_npv_over(future_value: f64, discount_rate: f64, years: i32) -> f64 {
    future_value / (1.0 + discount_rate).powi(years)
}

/// NPV at every standard discount rate, in rate order.
pub fn compute_all_npvs(future_value: f64) -> Vec<NpvResult> {
    DISCOUNT_RATES
        .iter()
        .map(|&rate| NpvResult {
            discount_rate: rate,
            discount_rate_label: format!("{:.0}%", rate * 100.0),
            npv: compute_npv(future_value, rate),
        })
        .collect()
}

/// NPV computed at `rate`, if the table has one.
pub fn npv_at(results: &[NpvResult], rate: f64) -> Option<f64> {
    results
        .iter()
        .find(|r| (r.discount_rate - rate).abs() < 1e-9)
        .map(|r| r.npv)
}

/// Lowest and highest NPV in a table.
pub fn npv_range(results: &[NpvResult]) -> Option<(f64, f64)> {
    if results.is_empty() {
        return None;
    }
    let min = results.iter().map(|r| r.npv).fold(f64::INFINITY, f64::min);
    let max = results.iter().map(|r| r.npv).fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Relative gap between an NPV and the current price.
pub fn npv_vs_price(npv: f64, current_price: f64) -> Option<f64> {
    if current_price > 0.0 {
        Some((npv - current_price) / current_price)
    } else {
        None
    }
}

/// Annualized return from buying at `current_price` and selling at `future_price`
/// after the projection horizon. Zero when there is no usable current price.
pub fn compute_implied_annual_return(future_price: f64, current_price: f64) -> f64 {
    if current_price <= 0.0 {
        return 0.0;
    }
    (future_price / current_price).powf(1.0 / PROJECTION_YEARS as f64) - 1.0
}

/// Compare the benchmark NPV against the current price with a ±15% band.
///
/// Exactly 1.15x or 0.85x is still fairly valued.
pub fn classify_verdict(current_price: f64, npv_at_benchmark: f64) -> Verdict {
    // Compare as a ratio: 100.0 * 1.15 rounds below 115.0 in binary floating point.
    let (upper, lower) = if current_price > 0.0 {
        let ratio = npv_at_benchmark / current_price;
        (ratio > UNDERVALUED_MULTIPLE, ratio < OVERVALUED_MULTIPLE)
    } else {
        (
            npv_at_benchmark > current_price * UNDERVALUED_MULTIPLE,
            npv_at_benchmark < current_price * OVERVALUED_MULTIPLE,
        )
    };

    if upper {
        Verdict::Undervalued
    } else if lower {
        Verdict::Overvalued
    } else {
        Verdict::FairlyValued
    }
}
