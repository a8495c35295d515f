//! Text-generation capability trait.
//!
//! The conversation engine depends only on this: a prompt goes in, the
//! assistant text comes out. Backends live in kindred-infra.

use std::sync::Arc;

use kindred_types::error::GenerateError;

/// Trait for text-generation backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in kindred-infra (e.g., `OpenAiCompatGenerator`).
pub trait TextGenerator: Send + Sync {
    /// Model identifier this backend generates with.
    fn model_name(&self) -> &str;

    /// Generate a completion for the assembled prompt.
    ///
    /// Latency is model-dependent and unbounded; callers bound it with the
    /// timeout/cancellation options on the engine.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerateError>> + Send;
}

impl<T: TextGenerator> TextGenerator for &T {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        (**self).generate(prompt).await
    }
}

// Lets one backend instance serve many conversations (e.g., the REST API's
// conversation map).
impl<T: TextGenerator> TextGenerator for Arc<T> {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        (**self).generate(prompt).await
    }
}
