use async_trait::async_trait;
use crate::{ValuationError, WatchlistItem};

/// Durable home of the saved watchlist.
///
/// Upserts are keyed by case-insensitive ticker and keep the original `saved_at`
/// of an entry that already exists.
#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<WatchlistItem>, ValuationError>;

    async fn upsert(&self, item: WatchlistItem) -> Result<Vec<WatchlistItem>, ValuationError>;

    async fn remove(&self, ticker: &str) -> Result<Vec<WatchlistItem>, ValuationError>;
}
