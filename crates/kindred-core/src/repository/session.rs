//! Session repository trait definition.

use kindred_types::error::RepositoryError;
use kindred_types::session::{NewSession, SessionRecord, SessionSummary, Turn};
use uuid::Uuid;

/// Repository trait for chat session persistence.
///
/// Implementations live in kindred-infra (e.g., `SqliteSessionRepository`).
/// Follows the same RPITIT pattern as `ProfileRepository`.
pub trait SessionRepository: Send + Sync {
    /// Insert or update a session keyed by `session_name`, returning the
    /// row id (stable across updates of the same name).
    fn upsert(
        &self,
        session: &NewSession,
    ) -> impl std::future::Future<Output = Result<Uuid, RepositoryError>> + Send;

    /// List all sessions, most-recently-updated first.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, RepositoryError>> + Send;

    /// Get a full session record by id.
    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<SessionRecord>, RepositoryError>> + Send;

    /// Get a session's messages by id. Empty Vec when the id is unknown.
    fn messages(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;
}
