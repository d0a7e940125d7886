use async_trait::async_trait;
use tokio::sync::Mutex;
use valuation_core::{ValuationError, WatchlistItem, WatchlistRepository};

/// Replaces the entry with the same ticker in place, keeping its original
/// `saved_at`, or appends a new one.
pub fn upsert_item(items: &mut Vec<WatchlistItem>, item: WatchlistItem) {
    match items.iter_mut().find(|existing| existing.matches_ticker(&item.ticker)) {
        Some(existing) => {
            let saved_at = existing.saved_at;
            *existing = WatchlistItem { saved_at, ..item };
        }
        None => items.push(item),
    }
}

pub fn remove_item(items: &mut Vec<WatchlistItem>, ticker: &str) {
    items.retain(|item| !item.matches_ticker(ticker));
}

/// Non-persistent repository.
#[derive(Default)]
pub struct InMemoryWatchlistRepository {
    items: Mutex<Vec<WatchlistItem>>,
}

impl InMemoryWatchlistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<WatchlistItem>) -> Self {
        Self { items: Mutex::new(items) }
    }
}

#[async_trait]
impl WatchlistRepository for InMemoryWatchlistRepository {
    async fn load(&self) -> Result<Vec<WatchlistItem>, ValuationError> {
        Ok(self.items.lock().await.clone())
    }

    async fn upsert(&self, item: WatchlistItem) -> Result<Vec<WatchlistItem>, ValuationError> {
        let mut items = self.items.lock().await;
        upsert_item(&mut items, item);
        Ok(items.clone())
    }

    async fn remove(&self, ticker: &str) -> Result<Vec<WatchlistItem>, ValuationError> {
        let mut items = self.items.lock().await;
        remove_item(&mut items, ticker);
        Ok(items.clone())
    }
}
