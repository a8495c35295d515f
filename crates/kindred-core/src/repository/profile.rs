//! Profile repository trait definition.

use kindred_types::error::RepositoryError;
use kindred_types::profile::{Profile, ProfileData, ProfileKind};

/// Repository trait for profile persistence.
///
/// Implementations live in kindred-infra (e.g., `SqliteProfileRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ProfileRepository: Send + Sync {
    /// List all profiles of a kind, most-recently-updated first.
    fn list(
        &self,
        kind: ProfileKind,
    ) -> impl std::future::Future<Output = Result<Vec<Profile>, RepositoryError>> + Send;

    /// Get a profile by its unique name within a kind.
    fn get(
        &self,
        kind: ProfileKind,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;

    /// Insert or update a profile keyed by name. An update overwrites the
    /// data and bumps `updated_at`; `created_at` and the row id are kept.
    fn upsert(
        &self,
        kind: ProfileKind,
        name: &str,
        data: &ProfileData,
    ) -> impl std::future::Future<Output = Result<Profile, RepositoryError>> + Send;

    /// Delete a profile by name. No-op when the name is absent.
    fn delete(
        &self,
        kind: ProfileKind,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
