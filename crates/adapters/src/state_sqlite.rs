//! SQLite dedup store implementation

use async_trait::async_trait;
use komori_domain::{DedupStore, PostId, StorageError};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::collections::HashSet;
use std::path::Path;

/// SQLite-backed ledger of handled submissions.
///
/// The `submissions` table deliberately has no uniqueness constraint; the
/// processing loop is responsible for not recording an id twice.
pub struct SqliteDedupStore {
    pool: SqlitePool,
}

impl SqliteDedupStore {
    /// Open (or create) the database file and ensure the schema exists
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Database(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        // Single writer, single reader
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let store = Self { pool };
        store.ensure_schema().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let store = Self { pool };
        store.ensure_schema().await?;

        Ok(store)
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS submissions (submissionid TEXT)")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn load_all(&self) -> Result<HashSet<PostId>, StorageError> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as("SELECT submissionid FROM submissions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(id,)| match id {
                Some(id) if !id.is_empty() => Ok(PostId::from(id)),
                _ => Err(StorageError::Corrupt(
                    "submission row without an id".to_string(),
                )),
            })
            .collect()
    }

    async fn record(&self, id: &PostId) -> Result<(), StorageError> {
        // Autocommit insert: a crash mid-call leaves no partial row
        sqlx::query("INSERT INTO submissions (submissionid) VALUES (?)")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tracing::debug!(post_id = %id, "Recorded submission");

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
