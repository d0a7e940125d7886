//! Display formatting. Non-finite input always renders as "N/A".

const NOT_AVAILABLE: &str = "N/A";

fn format_with_commas(whole: u64) -> String {
    let digits = whole.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// USD with thousands separators and two decimals, e.g. `-$1,234.50`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let cents = (value.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u64;
    let fraction = (cents % 100.0) as u64;
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, format_with_commas(whole), fraction)
}

/// Fraction as a percentage with one decimal: `0.163` -> `"16.3%"`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}%", value * 100.0)
}

/// `30.2` -> `"30.2x"`
pub fn format_pe_ratio(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}x", value)
}

/// `1.254` -> `"1.25x"`
pub fn format_pb_ratio(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}x", value)
}

pub fn format_de_ratio(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}", value)
}

/// Abbreviated market cap: `$2.50T`, `$150.00B`, `$3.20M`, else plain currency.
pub fn format_market_cap(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format_currency(value)
    }
}

/// Formats an optional value, rendering a missing one as "N/A".
pub fn format_optional(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
