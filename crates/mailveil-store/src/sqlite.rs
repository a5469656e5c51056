//! `SQLite`-backed document store.
//!
//! Each collection is a table of `(id TEXT PRIMARY KEY, data TEXT)` rows
//! where `data` holds the document body as a JSON object. Collection and
//! field names are validated identifiers (`mailveil-core`), which is what
//! makes their interpolation into statements below safe.

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::DocumentStore;
use async_trait::async_trait;
use mailveil_core::{CollectionName, FieldName};
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Document store over a `SQLite` snapshot file.
#[derive(Debug)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open an existing snapshot database.
    ///
    /// # Errors
    /// Returns `StoreError::Open` if the file cannot be opened. The file is
    /// not created; anonymization runs operate on pre-existing snapshots.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(path, false).await
    }

    /// Open a snapshot database, creating the file if it does not exist.
    ///
    /// Used by snapshot preparation tooling and tests.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(path, true).await
    }

    async fn connect(path: impl AsRef<Path>, create_if_missing: bool) -> Result<Self> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| StoreError::Open("invalid database path: not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(create_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to open '{path_str}': {e}")))?;

        tracing::debug!("Opened SQLite store at {}", path_str);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Create a collection table if it does not already exist.
    pub async fn create_collection(&self, collection: &CollectionName) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{collection}\" (id TEXT PRIMARY KEY, data TEXT NOT NULL)"
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a document into a collection.
    pub async fn insert_document(&self, collection: &CollectionName, doc: &Document) -> Result<()> {
        let body = serde_json::to_string(&doc.fields)
            .map_err(|e| StoreError::Decode(format!("failed to encode document body: {e}")))?;

        let sql = format!("INSERT INTO \"{collection}\" (id, data) VALUES (?, ?)");
        sqlx::query(&sql)
            .bind(&doc.id)
            .bind(&body)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn collection_exists(&self, collection: &CollectionName) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(collection.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    async fn list_ids(&self, collection: &CollectionName) -> Result<Vec<String>> {
        if !self.collection_exists(collection).await? {
            return Err(StoreError::UnknownCollection {
                name: collection.to_string(),
            });
        }

        let sql = format!("SELECT id FROM \"{collection}\" ORDER BY rowid");
        let ids = sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn fetch_by_ids(
        &self,
        collection: &CollectionName,
        ids: &[String],
    ) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, data FROM \"{collection}\" WHERE id IN ({placeholders}) ORDER BY rowid"
        );

        let mut query = sqlx::query_as::<_, (String, String)>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|(id, data)| {
                let value: JsonValue = serde_json::from_str(&data).map_err(|e| {
                    StoreError::Decode(format!("invalid JSON body for document '{id}': {e}"))
                })?;
                match value {
                    JsonValue::Object(fields) => Ok(Document { id, fields }),
                    _ => Err(StoreError::Decode(format!(
                        "document '{id}' body is not a JSON object"
                    ))),
                }
            })
            .collect()
    }

    async fn update_field(
        &self,
        collection: &CollectionName,
        id: &str,
        field: &FieldName,
        value: &str,
    ) -> Result<()> {
        let sql =
            format!("UPDATE \"{collection}\" SET data = json_set(data, '$.\"{field}\"', ?) WHERE id = ?");
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
