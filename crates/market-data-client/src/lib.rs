pub mod finnhub;
pub mod models;
pub mod msn;
pub mod provider;
mod rate_limiter;

pub use finnhub::FinnhubClient;
pub use models::*;
pub use msn::MsnClient;
pub use provider::{FundamentalsProvider, PeRatioProvider, SymbolSearch};
