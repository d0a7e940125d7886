use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tokio::sync::Mutex;
use valuation_core::{ValuationError, WatchlistItem, WatchlistRepository, WATCHLIST_STORAGE_KEY};

use crate::repository::{remove_item, upsert_item};

fn storage_error(err: impl std::fmt::Display) -> ValuationError {
    ValuationError::Storage(err.to_string())
}

/// Watchlist stored as one JSON array under a single key of a `kv_store` table.
///
/// The whole array is rewritten on every mutation.
pub struct SqliteWatchlistRepository {
    pool: SqlitePool,
    key: String,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl SqliteWatchlistRepository {
    pub async fn new(database_url: &str) -> Result<Self, ValuationError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage_error)?
            .create_if_missing(true);

        // Every connection to an in-memory database is a separate database.
        let in_memory = database_url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(if in_memory { None } else { Some(std::time::Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(std::time::Duration::from_secs(1800)) })
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        let repo = Self {
            pool,
            key: WATCHLIST_STORAGE_KEY.to_string(),
            write_lock: Mutex::new(()),
        };
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Use a different slot in the same table.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), ValuationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn read_raw(&self) -> Result<Option<String>, ValuationError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)
    }

    /// Unreadable content is treated as an empty watchlist.
    async fn read_items(&self) -> Result<Vec<WatchlistItem>, ValuationError> {
        let Some(raw) = self.read_raw().await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<WatchlistItem>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!("Ignoring unreadable watchlist under '{}': {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    async fn write_items(&self, items: &[WatchlistItem]) -> Result<(), ValuationError> {
        let json = serde_json::to_string(items)?;
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(&self.key)
        .bind(json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl WatchlistRepository for SqliteWatchlistRepository {
    async fn load(&self) -> Result<Vec<WatchlistItem>, ValuationError> {
        self.read_items().await
    }

    async fn upsert(&self, item: WatchlistItem) -> Result<Vec<WatchlistItem>, ValuationError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;
        upsert_item(&mut items, item);
        self.write_items(&items).await?;
        tracing::debug!("Watchlist now holds {} items", items.len());
        Ok(items)
    }

    async fn remove(&self, ticker: &str) -> Result<Vec<WatchlistItem>, ValuationError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;
        remove_item(&mut items, ticker);
        self.write_items(&items).await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::item;

    #[tokio::test]
    async fn test_round_trip_through_slot() {
        let repo = SqliteWatchlistRepository::new("sqlite::memory:").await.unwrap();
        assert!(repo.load().await.unwrap().is_empty());

        repo.upsert(item("AAPL", 150.0)).await.unwrap();
        repo.upsert(item("MSFT", 300.0)).await.unwrap();
        let original_saved = repo.load().await.unwrap()[0].saved_at;

        let items = repo.upsert(item("aapl", 155.0)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price_at_save, 155.0);
        assert_eq!(items[0].saved_at, original_saved);

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, items);

        let items = repo.remove("AAPL").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(repo.load().await.unwrap()[0].ticker, "MSFT");
    }

    #[tokio::test]
    async fn test_stored_format_is_a_camel_case_array() {
        let repo = SqliteWatchlistRepository::new("sqlite::memory:").await.unwrap();
        repo.upsert(item("KO", 60.0)).await.unwrap();

        let raw = repo.read_raw().await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["ticker"], "KO");
        assert_eq!(first["priceAtSave"], 60.0);
        assert_eq!(first["results"]["npvAt10Earnings"], 109.48);
        assert!(first["savedAt"].is_string());
    }

    #[tokio::test]
    async fn test_corrupt_content_loads_as_empty() {
        let repo = SqliteWatchlistRepository::new("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(WATCHLIST_STORAGE_KEY)
            .bind("{not json")
            .bind("2024-01-01T00:00:00Z")
            .execute(repo.pool())
            .await
            .unwrap();

        assert!(repo.load().await.unwrap().is_empty());

        // The next write replaces the corrupt slot.
        let items = repo.upsert(item("AAPL", 150.0)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(repo.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let repo = SqliteWatchlistRepository::new("sqlite::memory:")
            .await
            .unwrap()
            .with_key("other-slot");
        repo.upsert(item("AAPL", 150.0)).await.unwrap();

        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(WATCHLIST_STORAGE_KEY)
            .fetch_optional(repo.pool())
            .await
            .unwrap();
        assert!(raw.is_none());
    }
}
