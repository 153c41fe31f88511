//! # Local Storage Repository
//!
//! A string key-value table standing in for browser local storage.
//!
//! ```text
//! ┌──────────────────┬───────────────────────────────┬──────────────────────┐
//! │ key              │ value                         │ updated_at           │
//! ├──────────────────┼───────────────────────────────┼──────────────────────┤
//! │ guest.cart       │ [{"productId":"p1",...}]      │ 2026-10-16T09:12:..Z │
//! │ guest.wishlist   │ []                            │ 2026-10-16T09:13:..Z │
//! └──────────────────┴───────────────────────────────┴──────────────────────┘
//! ```
//!
//! `set` replaces the whole value; there are no partial updates.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `local_storage` table.
#[derive(Debug, Clone)]
pub struct LocalStorageRepository {
    pool: SqlitePool,
}

impl LocalStorageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocalStorageRepository { pool }
    }

    /// Returns the stored value, or `None` if the key was never written.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Inserts or replaces the value under `key`.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing local storage");

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
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

    /// Deletes the key. Returns whether a row existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        debug!(key = %key, "Removing local storage key");

        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn repo() -> super::LocalStorageRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .local_storage()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let repo = repo().await;
        assert_eq!(repo.get("guest.cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let repo = repo().await;
        repo.set("guest.cart", "[1]").await.unwrap();
        repo.set("guest.cart", "[1,2]").await.unwrap();

        assert_eq!(repo.get("guest.cart").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = repo().await;
        repo.set("guest.wishlist", "[]").await.unwrap();

        assert!(repo.remove("guest.wishlist").await.unwrap());
        assert!(!repo.remove("guest.wishlist").await.unwrap());
        assert_eq!(repo.get("guest.wishlist").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.local_storage().set("guest.cart", r#"[{"productId":"p1"}]"#).await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let value = db.local_storage().get("guest.cart").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"productId":"p1"}]"#));
    }
}
