//! Image metadata repository trait definition.

use kindred_types::error::RepositoryError;
use kindred_types::image::ImageRecord;

/// Repository trait for generated-image metadata.
pub trait ImageRepository: Send + Sync {
    /// Record the metadata of one generated image.
    fn record(
        &self,
        record: &ImageRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The most recent generations, newest first.
    fn recent(
        &self,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ImageRecord>, RepositoryError>> + Send;
}
