//! SQLite image metadata repository implementation.

use kindred_core::repository::image::ImageRepository;
use kindred_types::error::RepositoryError;
use kindred_types::image::{ImageModel, ImageParams, ImageRecord};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::profile::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ImageRepository`.
pub struct SqliteImageRepository {
    pool: DatabasePool,
}

impl SqliteImageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ImageRecord, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| RepositoryError::Query(format!("invalid image id: {e}")))?;
    let model: String = row
        .try_get("model")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let model: ImageModel = model
        .parse()
        .map_err(|e: String| RepositoryError::Query(e))?;
    let parameters: String = row
        .try_get("parameters")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let params: ImageParams = serde_json::from_str(&parameters)
        .map_err(|e| RepositoryError::Query(format!("invalid parameters JSON: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(ImageRecord {
        id,
        prompt: row
            .try_get("prompt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        negative_prompt: row
            .try_get("negative_prompt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        model,
        params,
        path: row
            .try_get("path")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl ImageRepository for SqliteImageRepository {
    async fn record(&self, record: &ImageRecord) -> Result<(), RepositoryError> {
        let parameters = serde_json::to_string(&record.params)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO generated_images
                 (id, prompt, negative_prompt, model, parameters, path, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.prompt)
        .bind(&record.negative_prompt)
        .bind(record.model.to_string())
        .bind(&parameters)
        .bind(&record.path)
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ImageRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM generated_images ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }
}
