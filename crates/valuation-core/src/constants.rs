//! Fixed policy constants shared by every projection in the workspace.
//!
//! Both projection chains share one horizon and one discount-rate set.

/// Years every forward projection runs for.
pub const PROJECTION_YEARS: i32 = 5;

/// Discount rates an NPV table is computed at, lowest first.
pub const DISCOUNT_RATES: [f64; 5] = [0.05, 0.08, 0.10, 0.12, 0.15];

/// Rate whose NPV drives the verdict and the watchlist snapshot.
pub const BENCHMARK_DISCOUNT_RATE: f64 = 0.10;

/// NPV above `price * UNDERVALUED_MULTIPLE` reads as undervalued.
pub const UNDERVALUED_MULTIPLE: f64 = 1.15;

/// NPV below `price * OVERVALUED_MULTIPLE` reads as overvalued.
pub const OVERVALUED_MULTIPLE: f64 = 0.85;

/// Relative divergence under which the earnings and book-value methods "converge".
/// Independent of the verdict band even though the values currently match.
pub const CONVERGENCE_THRESHOLD: f64 = 0.15;

/// Annual points kept per metric series.
pub const MAX_HISTORY_POINTS: usize = 8;

/// Suggestions returned by ticker search.
pub const MAX_SEARCH_SUGGESTIONS: usize = 6;

/// Storage slot the watchlist array is serialized under.
pub const WATCHLIST_STORAGE_KEY: &str = "value-investing-watchlist";
