//! Persistent Payload Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{PersistentStore, StorageKey},
    time::{Clock, SystemClock},
};
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS entries (
        key TEXT NOT NULL,
        id TEXT NOT NULL DEFAULT '',
        payload TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (key, id)
    )
"#;

/// SQLite-backed persistent store
///
/// One row per `(key, id)` pair; a namespace-level entry is stored with an
/// empty id. Payloads are kept as JSON text.
pub struct SqlitePersistentStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqlitePersistentStore {
    /// Open (or create) the store at `db_path`
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            db_path.to_string_lossy().replace('\\', "/")
        ))
        .map_err(|e| BridgeError::DatabaseError(format!("Invalid database path: {}", e)))?
        .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        let store = Self::from_pool(pool).await?;
        debug!(path = ?db_path, "Initialized persistent store");
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        // A second connection would see a different empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        Self::from_pool(pool).await
    }

    /// Default on-disk location under the user's data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("study-core").join("store.db"))
    }

    /// Replace the clock used for `updated_at` stamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(Self {
            pool,
            clock: Arc::new(SystemClock),
        })
    }

    fn id_column(key: &StorageKey) -> &str {
        key.id.as_deref().unwrap_or("")
    }

    /// Last write time of an entry, in Unix milliseconds
    pub async fn updated_at(&self, key: &StorageKey) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT updated_at FROM entries WHERE key = ? AND id = ?")
            .bind(&key.key)
            .bind(Self::id_column(key))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to read entry: {}", e)))?;

        Ok(row.map(|row| row.get(0)))
    }

    /// Number of entries stored under a namespace
    pub async fn count(&self, key: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM entries WHERE key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to count entries: {}", e)))?;

        Ok(row.get(0))
    }
}

#[async_trait]
impl PersistentStore for SqlitePersistentStore {
    async fn load(&self, key: &StorageKey) -> Result<Value> {
        let row = sqlx::query("SELECT payload FROM entries WHERE key = ? AND id = ?")
            .bind(&key.key)
            .bind(Self::id_column(key))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to read entry: {}", e)))?;

        let Some(row) = row else {
            return Err(BridgeError::NotFound(key.to_string()));
        };

        let payload: String = row.get(0);
        serde_json::from_str(&payload).map_err(|e| {
            BridgeError::OperationFailed(format!("Stored payload for {} is not JSON: {}", key, e))
        })
    }

    async fn save(&self, key: &StorageKey, raw_data: &Value) -> Result<()> {
        let payload = serde_json::to_string(raw_data)
            .map_err(|e| BridgeError::OperationFailed(format!("Serialize failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO entries (key, id, payload, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key, id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&key.key)
        .bind(Self::id_column(key))
        .bind(payload)
        .bind(self.clock.unix_timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to write entry: {}", e)))?;

        debug!(key = %key, "Stored entry");
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::DatabaseError(format!("Failed to clear entries: {}", e))
            })?;

        debug!(key = key, removed = result.rows_affected(), "Cleared namespace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::FixedClock;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip_with_and_without_id() {
        let store = SqlitePersistentStore::in_memory().await.unwrap();
        let book = StorageKey::namespace("BOOK");
        let lesson = StorageKey::new("LESSON", Some("2018-1"));

        store.save(&book, &json!(["Genesis"])).await.unwrap();
        store.save(&lesson, &json!({"title": "Day 1"})).await.unwrap();

        assert_eq!(store.load(&book).await.unwrap(), json!(["Genesis"]));
        assert_eq!(store.load(&lesson).await.unwrap(), json!({"title": "Day 1"}));
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let store = SqlitePersistentStore::in_memory().await.unwrap();

        let err = store
            .load(&StorageKey::new("LESSON", Some("nope")))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = SqlitePersistentStore::in_memory().await.unwrap();
        let key = StorageKey::new("ANSWER", Some("q1"));

        store.save(&key, &json!("first")).await.unwrap();
        store.save(&key, &json!("second")).await.unwrap();

        assert_eq!(store.load(&key).await.unwrap(), json!("second"));
        assert_eq!(store.count("ANSWER").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_whole_namespace() {
        let store = SqlitePersistentStore::in_memory().await.unwrap();

        store.save(&StorageKey::namespace("ANSWER"), &json!(1)).await.unwrap();
        store.save(&StorageKey::new("ANSWER", Some("a")), &json!(2)).await.unwrap();
        store.save(&StorageKey::new("BOOK", Some("a")), &json!(3)).await.unwrap();

        store.clear("ANSWER").await.unwrap();

        assert_eq!(store.count("ANSWER").await.unwrap(), 0);
        assert_eq!(store.count("BOOK").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_updated_at_uses_clock() {
        let store = SqlitePersistentStore::in_memory()
            .await
            .unwrap()
            .with_clock(Arc::new(FixedClock::from_millis(42_000)));
        let key = StorageKey::namespace("BOOK");

        store.save(&key, &json!({})).await.unwrap();

        assert_eq!(store.updated_at(&key).await.unwrap(), Some(42_000));
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("study-core-store-{}", std::process::id()));
        let path = dir.join("store.db");
        let key = StorageKey::new("LESSON", Some("1"));

        {
            let store = SqlitePersistentStore::new(path.clone()).await.unwrap();
            store.save(&key, &json!({"kept": true})).await.unwrap();
        }

        let reopened = SqlitePersistentStore::new(path).await.unwrap();
        assert_eq!(reopened.load(&key).await.unwrap(), json!({"kept": true}));

        let _ = std::fs::remove_dir_all(dir);
    }
}
