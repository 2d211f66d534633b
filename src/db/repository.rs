//! Generic document repository.
//!
//! Each operation is a single round-trip against the store. There are no
//! multi-document transactions and no optimistic concurrency checks.

use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::AppError;

/// A JSON document owned by a single collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the document lives in.
    const COLLECTION: &'static str;
    /// Human-readable name used in not-found messages.
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> &str;

    fn not_found() -> AppError {
        AppError::NotFound(format!("{} not found", Self::LABEL))
    }

    fn duplicate() -> AppError {
        AppError::Conflict(format!("{} already exists", Self::LABEL))
    }
}

/// Equality filter on a top-level document field.
#[derive(Debug, Clone)]
pub struct Filter {
    field: &'static str,
    value: String,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    fn json_path(&self) -> String {
        format!("$.{}", self.field)
    }
}

/// Generate a fresh document identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 timestamp with microsecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Validate that an identifier is a well-formed key for `T`.
pub fn parse_id<T: Document>(id: &str) -> Result<String, AppError> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| AppError::InvalidId(format!("{} not found", T::LABEL)))
}

/// Store handle shared by all handlers.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the underlying pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// List documents newest-first, optionally filtered on one field.
    pub async fn list<T: Document>(&self, filter: Option<&Filter>) -> Result<Vec<T>, AppError> {
        let rows = match filter {
            Some(filter) => {
                sqlx::query(
                    "SELECT body FROM documents WHERE collection = ? AND json_extract(body, ?) = ? ORDER BY created_at DESC, seq DESC",
                )
                .bind(T::COLLECTION)
                .bind(filter.json_path())
                .bind(&filter.value)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT body FROM documents WHERE collection = ? ORDER BY created_at DESC, seq DESC",
                )
                .bind(T::COLLECTION)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(|row| document_from_row(row)).collect()
    }

    /// Fetch a document by identifier.
    pub async fn get<T: Document>(&self, id: &str) -> Result<T, AppError> {
        let id = parse_id::<T>(id)?;
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(T::COLLECTION)
            .bind(&id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => document_from_row(&row),
            None => Err(T::not_found()),
        }
    }

    /// Fetch the first document matching a filter.
    pub async fn find_one<T: Document>(&self, filter: &Filter) -> Result<Option<T>, AppError> {
        let row = sqlx::query(
            "SELECT body FROM documents WHERE collection = ? AND json_extract(body, ?) = ? LIMIT 1",
        )
        .bind(T::COLLECTION)
        .bind(filter.json_path())
        .bind(&filter.value)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Persist a new document. A unique-index violation surfaces as `Conflict`.
    pub async fn insert<T: Document>(&self, document: &T) -> Result<(), AppError> {
        let body = serde_json::to_string(document)?;

        let result = sqlx::query(
            "INSERT INTO documents (id, collection, body, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(document.id())
        .bind(T::COLLECTION)
        .bind(&body)
        .bind(document.created_at())
        .bind(now_timestamp())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(T::duplicate()),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite an existing document with its merged state.
    pub async fn replace<T: Document>(&self, document: &T) -> Result<(), AppError> {
        let body = serde_json::to_string(document)?;

        let result = sqlx::query(
            "UPDATE documents SET body = ?, updated_at = ? WHERE collection = ? AND id = ?",
        )
        .bind(&body)
        .bind(now_timestamp())
        .bind(T::COLLECTION)
        .bind(document.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(T::not_found());
        }
        Ok(())
    }

    /// Remove a document permanently, optionally requiring a field match.
    pub async fn delete<T: Document>(&self, id: &str, filter: Option<&Filter>) -> Result<(), AppError> {
        let id = parse_id::<T>(id)?;

        let result = match filter {
            Some(filter) => {
                sqlx::query(
                    "DELETE FROM documents WHERE collection = ? AND id = ? AND json_extract(body, ?) = ?",
                )
                .bind(T::COLLECTION)
                .bind(&id)
                .bind(filter.json_path())
                .bind(&filter.value)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                    .bind(T::COLLECTION)
                    .bind(&id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(T::not_found());
        }
        Ok(())
    }
}

fn document_from_row<T: Document>(row: &sqlx::sqlite::SqliteRow) -> Result<T, AppError> {
    let body: String = row.get("body");
    Ok(serde_json::from_str(&body)?)
}
