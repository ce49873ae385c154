//! Embedding service trait: turns free text into a vector.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// An external text embedding model.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// The service name (e.g., "openai", "local-minilm").
    fn name(&self) -> &str;

    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError>;
}
