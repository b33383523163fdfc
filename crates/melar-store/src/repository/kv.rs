//! # Key-Value Repository
//!
//! The single table every other repository is built on.
//!
//! ```text
//! kv_entries
//! ┌──────────────────────────────┬─────────────────────────┬──────────────┐
//! │ key (PK)                     │ value (JSON text)       │ updated_at   │
//! ├──────────────────────────────┼─────────────────────────┼──────────────┤
//! │ authToken                    │ "9f2c..."               │ 2024-01-01.. │
//! │ user                         │ {"id":"12",...}         │ 2024-01-01.. │
//! │ melarShopOrders_3            │ [{"order_id":"99",..}]  │ 2024-01-02.. │
//! └──────────────────────────────┴─────────────────────────┴──────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Raw stored text for `key`.
    pub async fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_entries WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Inserts or replaces `key`.
    pub async fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing entry");

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deserializes the value at `key`.
    ///
    /// ## Returns
    /// * `Ok(None)` - key absent
    /// * `Err(StoreError::Corrupt)` - present but not a valid `T`
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_raw(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e)),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set_raw(key, &raw).await
    }

    /// Like [`get_json`](Self::get_json), but a corrupt value is deleted and
    /// read as absent.
    pub async fn get_json_or_discard<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> StoreResult<Option<T>> {
        match self.get_json(key).await {
            Err(StoreError::Corrupt { key, reason }) => {
                warn!(key = %key, reason = %reason, "Discarding corrupt entry");
                self.remove(&key).await?;
                Ok(None)
            }
            other => other,
        }
    }

    /// Deletes `key`. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn contains(&self, key: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Keys starting with `prefix`, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT key FROM kv_entries WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    /// Deletes every key starting with `prefix`.
    pub async fn remove_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM kv_entries WHERE substr(key, 1, length(?1)) = ?1")
                .bind(prefix)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// When `key` was last written.
    pub async fn updated_at(&self, key: &str) -> StoreResult<Option<DateTime<Utc>>> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT updated_at FROM kv_entries WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        raw.map(|ts| {
            DateTime::parse_from_rfc3339(&ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StoreError::corrupt(key, e))
        })
        .transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig, StoreError};

    async fn store() -> Store {
        Store::open(StoreConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_overwrite_remove() {
        let kv = store().await.kv();

        assert_eq!(kv.get_raw("k").await.unwrap(), None);

        kv.set_raw("k", "\"one\"").await.unwrap();
        kv.set_raw("k", "\"two\"").await.unwrap();
        assert_eq!(kv.get_json::<String>("k").await.unwrap().as_deref(), Some("two"));
        assert!(kv.updated_at("k").await.unwrap().is_some());

        assert!(kv.remove("k").await.unwrap());
        assert!(!kv.remove("k").await.unwrap());
        assert!(!kv.contains("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_value() {
        let kv = store().await.kv();
        kv.set_raw("user", "{not json").await.unwrap();

        assert!(matches!(
            kv.get_json::<serde_json::Value>("user").await,
            Err(StoreError::Corrupt { .. })
        ));

        let discarded: Option<serde_json::Value> = kv.get_json_or_discard("user").await.unwrap();
        assert!(discarded.is_none());
        assert!(!kv.contains("user").await.unwrap());
    }

    #[tokio::test]
    async fn test_prefix_scan_is_literal() {
        let kv = store().await.kv();
        kv.set_json("melarShopOrders_1", &1).await.unwrap();
        kv.set_json("melarShopOrders_2", &2).await.unwrap();
        kv.set_json("melarShopProducts_1", &3).await.unwrap();
        // `_` must not act as a wildcard
        kv.set_json("melarShopOrdersX1", &4).await.unwrap();

        let keys = kv.keys_with_prefix("melarShopOrders_").await.unwrap();
        assert_eq!(keys, vec!["melarShopOrders_1", "melarShopOrders_2"]);

        assert_eq!(kv.remove_prefix("melarShopOrders_").await.unwrap(), 2);
        assert!(kv.contains("melarShopOrdersX1").await.unwrap());
    }
}
