//! Saved analyses.
//!
//! The list lives behind [`valuation_core::WatchlistRepository`]; the SQLite
//! implementation keeps it as a single JSON slot so the stored shape matches
//! what the list serializes to.

pub mod repository;
pub mod service;
pub mod sqlite;

pub use repository::{remove_item, upsert_item, InMemoryWatchlistRepository};
pub use service::{best_npv, verdict, Watchlist};
pub use sqlite::SqliteWatchlistRepository;
