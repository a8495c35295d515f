//! SQLite profile repository implementation.
//!
//! Implements `ProfileRepository` from `kindred-core` using sqlx with split
//! read/write pools. One table per kind; the kind-to-table mapping is an
//! exhaustive match, so no dynamic identifiers reach the SQL.

use chrono::{DateTime, Utc};
use kindred_core::repository::profile::ProfileRepository;
use kindred_types::error::RepositoryError;
use kindred_types::profile::{Profile, ProfileData, ProfileKind};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ProfileRepository`.
pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn table(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Chatbot => "chatbot_profiles",
        ProfileKind::User => "user_profiles",
    }
}

/// Internal row type for mapping SQLite rows to domain Profile.
struct ProfileRow {
    id: String,
    name: String,
    data: String,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_profile(self, kind: ProfileKind) -> Result<Profile, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid profile id: {e}")))?;
        let data: ProfileData = serde_json::from_str(&self.data)
            .map_err(|e| RepositoryError::Query(format!("invalid profile data JSON: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Profile {
            id,
            kind,
            name: self.name,
            data,
            created_at,
            updated_at,
        })
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl ProfileRepository for SqliteProfileRepository {
    async fn list(&self, kind: ProfileKind) -> Result<Vec<Profile>, RepositoryError> {
        let sql = format!("SELECT * FROM {} ORDER BY updated_at DESC", table(kind));
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut profiles = Vec::with_capacity(rows.len());
        for row in &rows {
            let profile_row =
                ProfileRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            profiles.push(profile_row.into_profile(kind)?);
        }
        Ok(profiles)
    }

    async fn get(
        &self,
        kind: ProfileKind,
        name: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT * FROM {} WHERE name = ?", table(kind));
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let profile_row = ProfileRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(profile_row.into_profile(kind)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        kind: ProfileKind,
        name: &str,
        data: &ProfileData,
    ) -> Result<Profile, RepositoryError> {
        let data_json =
            serde_json::to_string(data).map_err(|e| RepositoryError::Query(e.to_string()))?;
        let now = format_datetime(&Utc::now());

        // On conflict the original id and created_at are kept; only the
        // payload and updated_at change.
        let sql = format!(
            "INSERT INTO {} (id, name, data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                 data = excluded.data,
                 updated_at = excluded.updated_at",
            table(kind)
        );
        sqlx::query(&sql)
            .bind(Uuid::now_v7().to_string())
            .bind(name)
            .bind(&data_json)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Read the row back via the writer so the result reflects this write
        // even before WAL checkpointing.
        let sql = format!("SELECT * FROM {} WHERE name = ?", table(kind));
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let profile_row =
            ProfileRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        profile_row.into_profile(kind)
    }

    async fn delete(&self, kind: ProfileKind, name: &str) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE name = ?", table(kind));
        sqlx::query(&sql)
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}
