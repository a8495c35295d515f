//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `kindred-core` using sqlx with split
//! read/write pools. Sessions are upserted by `session_name`; messages and
//! the profile data snapshots are JSON columns.

use chrono::Utc;
use kindred_core::repository::session::SessionRepository;
use kindred_types::error::RepositoryError;
use kindred_types::profile::ProfileData;
use kindred_types::session::{NewSession, SessionRecord, SessionSummary, Turn};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::profile::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain SessionRecord.
struct SessionRow {
    id: String,
    session_name: String,
    chatbot_name: String,
    user_name: String,
    chatbot_data: String,
    user_data: String,
    messages: String,
    created_at: String,
    updated_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_name: row.try_get("session_name")?,
            chatbot_name: row.try_get("chatbot_name")?,
            user_name: row.try_get("user_name")?,
            chatbot_data: row.try_get("chatbot_data")?,
            user_data: row.try_get("user_data")?,
            messages: row.try_get("messages")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<SessionRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let chatbot_data: ProfileData = serde_json::from_str(&self.chatbot_data)
            .map_err(|e| RepositoryError::Query(format!("invalid chatbot data JSON: {e}")))?;
        let user_data: ProfileData = serde_json::from_str(&self.user_data)
            .map_err(|e| RepositoryError::Query(format!("invalid user data JSON: {e}")))?;
        let messages: Vec<Turn> = serde_json::from_str(&self.messages)
            .map_err(|e| RepositoryError::Query(format!("invalid messages JSON: {e}")))?;

        Ok(SessionRecord {
            id,
            session_name: self.session_name,
            chatbot_name: self.chatbot_name,
            user_name: self.user_name,
            chatbot_data,
            user_data,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn upsert(&self, session: &NewSession) -> Result<Uuid, RepositoryError> {
        let chatbot_data = serde_json::to_string(&session.chatbot_data)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let user_data = serde_json::to_string(&session.user_data)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let messages = serde_json::to_string(&session.messages)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let now = format_datetime(&Utc::now());

        // Updating an existing name keeps its id and created_at.
        sqlx::query(
            "INSERT INTO chat_sessions
                 (id, session_name, chatbot_profile_id, user_profile_id,
                  chatbot_name, user_name, chatbot_data, user_data,
                  messages, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(session_name) DO UPDATE SET
                 chatbot_profile_id = excluded.chatbot_profile_id,
                 user_profile_id = excluded.user_profile_id,
                 chatbot_name = excluded.chatbot_name,
                 user_name = excluded.user_name,
                 chatbot_data = excluded.chatbot_data,
                 user_data = excluded.user_data,
                 messages = excluded.messages,
                 updated_at = excluded.updated_at",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(&session.session_name)
        .bind(session.chatbot_profile_id.to_string())
        .bind(session.user_profile_id.to_string())
        .bind(&session.chatbot_name)
        .bind(&session.user_name)
        .bind(&chatbot_data)
        .bind(&user_data)
        .bind(&messages)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT id FROM chat_sessions WHERE session_name = ?")
            .bind(&session.session_name)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let id: String = row
            .try_get("id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Uuid::parse_str(&id).map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, session_name, chatbot_name, user_name, created_at, updated_at
             FROM chat_sessions
             ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
            let created_at: String = row
                .try_get("created_at")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let updated_at: String = row
                .try_get("updated_at")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

            summaries.push(SessionSummary {
                id,
                session_name: row
                    .try_get("session_name")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                chatbot_name: row
                    .try_get("chatbot_name")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                user_name: row
                    .try_get("user_name")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                created_at: parse_datetime(&created_at)?,
                updated_at: parse_datetime(&updated_at)?,
            });
        }
        Ok(summaries)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<SessionRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_record()?))
            }
            None => Ok(None),
        }
    }

    async fn messages(&self, id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        let row = sqlx::query("SELECT messages FROM chat_sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let messages: String = row
                    .try_get("messages")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                serde_json::from_str(&messages)
                    .map_err(|e| RepositoryError::Query(format!("invalid messages JSON: {e}")))
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::repository::profile::ProfileRepository;
    use kindred_types::profile::{AttrValue, ProfileKind};

    use crate::sqlite::profile::SqliteProfileRepository;

    async fn test_pool(dir: &tempfile::TempDir) -> DatabasePool {
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        DatabasePool::new(&url).await.unwrap()
    }

    async fn seed_profiles(pool: &DatabasePool) -> (Uuid, Uuid) {
        let profiles = SqliteProfileRepository::new(pool.clone());
        let mut data = ProfileData::new();
        data.insert("mood".to_string(), AttrValue::from("cheerful"));
        let chatbot = profiles
            .upsert(ProfileKind::Chatbot, "Aria", &data)
            .await
            .unwrap();
        let user = profiles
            .upsert(ProfileKind::User, "Sam", &ProfileData::new())
            .await
            .unwrap();
        (chatbot.id, user.id)
    }

    fn new_session(
        name: &str,
        chatbot_id: Uuid,
        user_id: Uuid,
        messages: Vec<Turn>,
    ) -> NewSession {
        NewSession {
            session_name: name.to_string(),
            chatbot_profile_id: chatbot_id,
            user_profile_id: user_id,
            chatbot_name: "Aria".to_string(),
            user_name: "Sam".to_string(),
            chatbot_data: ProfileData::new(),
            user_data: ProfileData::new(),
            messages,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let (chatbot_id, user_id) = seed_profiles(&pool).await;
        let repo = SqliteSessionRepository::new(pool);

        let messages = vec![Turn::user("Hello"), Turn::assistant("Hi Sam!")];
        let id = repo
            .upsert(&new_session("s1", chatbot_id, user_id, messages.clone()))
            .await
            .unwrap();

        let record = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(record.session_name, "s1");
        assert_eq!(record.chatbot_name, "Aria");
        assert_eq!(record.user_name, "Sam");
        assert_eq!(record.messages, messages);
    }

    #[tokio::test]
    async fn test_upsert_same_name_keeps_id() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let (chatbot_id, user_id) = seed_profiles(&pool).await;
        let repo = SqliteSessionRepository::new(pool);

        let first = repo
            .upsert(&new_session("s1", chatbot_id, user_id, vec![Turn::user("a")]))
            .await
            .unwrap();
        let second = repo
            .upsert(&new_session(
                "s1",
                chatbot_id,
                user_id,
                vec![Turn::user("a"), Turn::assistant("b")],
            ))
            .await
            .unwrap();

        assert_eq!(first, second, "upsert by name must keep the session id");
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(repo.messages(&first).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_messages_empty_for_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let repo = SqliteSessionRepository::new(pool);

        assert!(repo.messages(&Uuid::now_v7()).await.unwrap().is_empty());
        assert!(repo.get(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_desc() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let (chatbot_id, user_id) = seed_profiles(&pool).await;
        let repo = SqliteSessionRepository::new(pool);

        repo.upsert(&new_session("old", chatbot_id, user_id, vec![]))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        repo.upsert(&new_session("new", chatbot_id, user_id, vec![]))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.session_name)
            .collect();
        assert_eq!(names, vec!["new".to_string(), "old".to_string()]);
    }

    #[tokio::test]
    async fn test_profile_delete_leaves_session_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool(&dir).await;
        let (chatbot_id, user_id) = seed_profiles(&pool).await;
        let repo = SqliteSessionRepository::new(pool.clone());

        let id = repo
            .upsert(&new_session("s1", chatbot_id, user_id, vec![Turn::user("hi")]))
            .await
            .unwrap();

        // FK is ON DELETE SET NULL; the snapshot columns keep the session whole
        let profiles = SqliteProfileRepository::new(pool);
        profiles.delete(ProfileKind::Chatbot, "Aria").await.unwrap();

        let record = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(record.chatbot_name, "Aria");
        assert_eq!(record.messages.len(), 1);
    }
}
