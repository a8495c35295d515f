//! Image generation orchestration.
//!
//! Validates requests, delegates the diffusion run to an external backend,
//! writes the PNG to the output directory, and records generation metadata.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use kindred_types::error::ImageError;
use kindred_types::image::{ImageParams, ImageRecord, ImageRequest};

use crate::repository::image::ImageRepository;

/// Trait for diffusion backends.
///
/// Returns encoded PNG bytes; sampling, schedulers, and GPU management are
/// entirely the backend's concern. Implementations live in kindred-infra
/// (e.g., `SdWebuiBackend`).
pub trait ImageBackend: Send + Sync {
    fn generate(
        &self,
        request: &ImageRequest,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ImageError>> + Send;
}

/// Orchestrates image generation: validate, delegate, store, record.
pub struct ImageService<B: ImageBackend, R: ImageRepository> {
    backend: B,
    repo: R,
    output_dir: PathBuf,
}

impl<B: ImageBackend, R: ImageRepository> ImageService<B, R> {
    pub fn new(backend: B, repo: R, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            repo,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate one image and return its metadata record.
    ///
    /// Validation failures surface before the backend is contacted; a
    /// backend failure fails this request only.
    pub async fn generate(&self, request: &ImageRequest) -> Result<ImageRecord, ImageError> {
        request.validate()?;

        let png = self.backend.generate(request).await?;

        let id = Uuid::now_v7();
        let created_at = Utc::now();
        let filename = format!(
            "{}-{}.png",
            created_at.format("%Y%m%d-%H%M%S"),
            &id.simple().to_string()[..8]
        );
        let path = self.output_dir.join(&filename);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ImageError::Storage(e.to_string()))?;
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| ImageError::Storage(e.to_string()))?;

        let record = ImageRecord {
            id,
            prompt: request.prompt.clone(),
            negative_prompt: request.negative_prompt.clone(),
            model: request.model,
            params: ImageParams::from(request),
            path: path.to_string_lossy().into_owned(),
            created_at,
        };

        self.repo.record(&record).await?;
        info!(model = %request.model, path = %record.path, "Image generated");
        Ok(record)
    }

    /// The most recent generations, newest first.
    pub async fn history(&self, limit: i64) -> Result<Vec<ImageRecord>, ImageError> {
        Ok(self.repo.recent(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use kindred_types::error::RepositoryError;
    use kindred_types::image::ImageModel;

    struct PngBackend;

    impl ImageBackend for PngBackend {
        async fn generate(&self, _request: &ImageRequest) -> Result<Vec<u8>, ImageError> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    #[derive(Default)]
    struct FakeImageRepo {
        rows: Mutex<Vec<ImageRecord>>,
    }

    impl ImageRepository for FakeImageRepo {
        async fn record(&self, record: &ImageRecord) -> Result<(), RepositoryError> {
            self.rows.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn recent(&self, limit: i64) -> Result<Vec<ImageRecord>, RepositoryError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<ImageRecord> = rows.iter().rev().cloned().collect();
            out.truncate(limit as usize);
            Ok(out)
        }
    }

    #[tokio::test]
    async fn test_generate_writes_png_and_records_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let svc = ImageService::new(PngBackend, FakeImageRepo::default(), dir.path());

        let record = svc
            .generate(&ImageRequest::new("a lighthouse at dusk"))
            .await
            .unwrap();

        assert!(record.path.ends_with(".png"));
        let bytes = tokio::fs::read(&record.path).await.unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let history = svc.history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prompt, "a lighthouse at dusk");
        assert_eq!(history[0].model, ImageModel::StableDiffusion);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backend() {
        struct PanicBackend;
        impl ImageBackend for PanicBackend {
            async fn generate(&self, _request: &ImageRequest) -> Result<Vec<u8>, ImageError> {
                panic!("backend must not be called for an invalid request");
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let svc = ImageService::new(PanicBackend, FakeImageRepo::default(), dir.path());

        let mut request = ImageRequest::new("x");
        request.steps = 0;
        let err = svc.generate(&request).await.unwrap_err();
        assert!(matches!(err, ImageError::StepsOutOfRange(0)));
        assert!(svc.history(10).await.unwrap().is_empty());
    }
}
