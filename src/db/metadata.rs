//! Field-level metadata reads and writes.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::store::MetadataStore;
use crate::types::MetadataRecord;
use crate::{Error, Result};

use super::Database;

impl Database {
    /// Check whether any field is stored under `key`
    pub async fn key_exists(&self, key: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM metadata WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to check if key exists: {}",
                e
            )))
        })?;

        Ok(count > 0)
    }

    /// Upsert every field/value pair on `key` in a single transaction
    ///
    /// `pairs` alternates field and value; a dangling trailing field is ignored.
    pub async fn set_metadata_fields(&self, key: &str, pairs: &[String]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to begin transaction: {}",
                e
            )))
        })?;

        for pair in pairs.chunks_exact(2) {
            sqlx::query(
                r#"
                INSERT INTO metadata (key, field, value, updated_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(key, field) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(&pair[0])
            .bind(&pair[1])
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to set metadata field: {}",
                    e
                )))
            })?;
        }

        tx.commit().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to commit metadata fields: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Get a single field value
    pub async fn get_metadata_field(&self, key: &str, field: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            r#"
            SELECT value FROM metadata WHERE key = ? AND field = ?
            "#,
        )
        .bind(key)
        .bind(field)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get metadata field: {}",
                e
            )))
        })?;

        Ok(value)
    }

    /// Get every field stored under `key`, `None` if there are none
    pub async fn get_metadata(&self, key: &str) -> Result<Option<MetadataRecord>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT field, value FROM metadata WHERE key = ? ORDER BY field
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get metadata: {}",
                e
            )))
        })?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(rows.into_iter().collect()))
    }
}

#[async_trait]
impl MetadataStore for Database {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.key_exists(key).await
    }

    async fn set_fields(&self, key: &str, pairs: &[String]) -> Result<()> {
        self.set_metadata_fields(key, pairs).await
    }

    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.get_metadata_field(key, field).await
    }

    async fn get_all(&self, key: &str) -> Result<Option<MetadataRecord>> {
        self.get_metadata(key).await
    }

    async fn close(&self) {
        Database::close(self).await;
    }
}
