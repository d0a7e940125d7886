//! Fetch orchestration for a single on-screen analysis.
//!
//! `idle -> loading -> {loaded, error}`, with `reset` returning to idle and a
//! new search always going back to loading.

pub mod session;
pub mod state;

pub use session::AnalysisSession;
pub use state::{AnalysisState, RequestToken, SearchOutcome};
