//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{SettingsStore, SettingsTransaction},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::PathBuf;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

const UPSERT: &str = r#"
    INSERT INTO settings (key, value, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

fn storage_error(action: &str, e: sqlx::Error) -> BridgeError {
    BridgeError::StorageError(format!("{}: {}", action, e))
}

/// SQLite-backed settings store.
///
/// Desktop counterpart of the browser's `localStorage`: the session slots
/// and UI preferences live in one `settings` table, and multi-key writes go
/// through a real SQL transaction.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (or create) the settings database at `db_path`.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to open settings database", e))?;

        let store = Self::with_pool(pool).await?;
        debug!(path = ?db_path, "Initialized settings store");
        Ok(store)
    }

    /// In-memory store for tests.
    ///
    /// Pinned to one connection; each SQLite memory connection is its own
    /// database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| storage_error("Failed to open in-memory database", e))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| storage_error("Failed to create settings table", e))?;

        Ok(Self { pool })
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(Self::now())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to set setting", e))?;

        debug!(key, "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get setting", e))?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete setting", e))?;

        debug!(key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to check key", e))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list keys", e))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn SettingsTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        Ok(Box::new(SqliteSettingsTransaction { tx: Some(tx) }))
    }
}

struct SqliteSettingsTransaction {
    tx: Option<sqlx::Transaction<'static, sqlx::Sqlite>>,
}

impl SqliteSettingsTransaction {
    fn active(&mut self) -> Result<&mut sqlx::Transaction<'static, sqlx::Sqlite>> {
        self.tx.as_mut().ok_or_else(|| {
            BridgeError::StorageError("Transaction already finished".to_string())
        })
    }
}

#[async_trait]
impl SettingsTransaction for SqliteSettingsTransaction {
    async fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let tx = self.active()?;
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .bind(SqliteSettingsStore::now())
            .execute(&mut **tx)
            .await
            .map_err(|e| storage_error("Failed to set setting", e))?;

        Ok(())
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        let tx = self.active()?;
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&mut **tx)
            .await
            .map_err(|e| storage_error("Failed to delete setting", e))?;

        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let tx = self.tx.take().ok_or_else(|| {
            BridgeError::StorageError("Transaction already finished".to_string())
        })?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit", e))?;

        debug!("Committed settings transaction");
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        let tx = self.tx.take().ok_or_else(|| {
            BridgeError::StorageError("Transaction already finished".to_string())
        })?;

        tx.rollback()
            .await
            .map_err(|e| storage_error("Failed to rollback", e))?;

        debug!("Rolled back settings transaction");
        Ok(())
    }
}
