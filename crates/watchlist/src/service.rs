use std::sync::Arc;
use valuation_core::{ValuationError, Verdict, WatchlistItem, WatchlistRepository};
use valuation_engine::classify_verdict;

/// Cached watchlist over a repository. Every mutation goes through the
/// repository and the cache is replaced with what it returns.
pub struct Watchlist {
    repository: Arc<dyn WatchlistRepository>,
    items: Vec<WatchlistItem>,
}

impl Watchlist {
    pub async fn load(repository: Arc<dyn WatchlistRepository>) -> Result<Self, ValuationError> {
        let items = repository.load().await?;
        tracing::debug!("Loaded watchlist with {} items", items.len());
        Ok(Self { repository, items })
    }

    pub fn items(&self) -> &[WatchlistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&WatchlistItem> {
        self.items.iter().find(|item| item.matches_ticker(ticker))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.get(ticker).is_some()
    }

    pub async fn add_or_update(&mut self, item: WatchlistItem) -> Result<(), ValuationError> {
        tracing::info!("Saving {} to watchlist", item.ticker);
        self.items = self.repository.upsert(item).await?;
        Ok(())
    }

    pub async fn remove(&mut self, ticker: &str) -> Result<(), ValuationError> {
        tracing::info!("Removing {} from watchlist", ticker);
        self.items = self.repository.remove(ticker).await?;
        Ok(())
    }
}

/// Earnings NPV at the benchmark rate, else the book-value one.
pub fn best_npv(item: &WatchlistItem) -> Option<f64> {
    item.results
        .npv_at_10_earnings
        .or(item.results.npv_at_10_book_value)
}

/// Verdict against the price at the time the item was saved.
pub fn verdict(item: &WatchlistItem) -> Option<Verdict> {
    best_npv(item).map(|npv| classify_verdict(item.price_at_save, npv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::item;
    use crate::InMemoryWatchlistRepository;

    #[tokio::test]
    async fn test_service_tracks_repository() {
        let repo = Arc::new(InMemoryWatchlistRepository::with_items(vec![item("AAPL", 150.0)]));
        let mut watchlist = Watchlist::load(repo.clone()).await.unwrap();
        assert_eq!(watchlist.len(), 1);
        assert!(watchlist.contains("aapl"));

        watchlist.add_or_update(item("JNJ", 155.0)).await.unwrap();
        assert_eq!(watchlist.len(), 2);
        assert_eq!(repo.load().await.unwrap().len(), 2);

        watchlist.remove("AAPL").await.unwrap();
        assert!(!watchlist.contains("AAPL"));
        assert_eq!(watchlist.items()[0].ticker, "JNJ");
        assert_eq!(watchlist.get("jnj").unwrap().price_at_save, 155.0);
    }

    #[test]
    fn test_best_npv_falls_back_to_book_value() {
        let mut saved = item("AAPL", 150.0);
        assert_eq!(best_npv(&saved), Some(109.48));
        assert_eq!(verdict(&saved), Some(Verdict::Overvalued));

        saved.results.npv_at_10_earnings = None;
        saved.results.npv_at_10_book_value = Some(200.0);
        assert_eq!(best_npv(&saved), Some(200.0));
        assert_eq!(verdict(&saved), Some(Verdict::Undervalued));

        saved.results.npv_at_10_book_value = None;
        assert_eq!(verdict(&saved), None);
    }
}
