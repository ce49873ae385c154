//! Vector search trait: nearest-neighbour lookup over stored document vectors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::DocumentId;
use crate::error::SearchError;

/// A single nearest-neighbour result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document the stored vector belongs to
    pub id: DocumentId,
    /// Similarity to the query vector (0.0–1.0 for cosine on normalized vectors)
    pub score: f32,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// The persistent vector index.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// The index name (e.g., "in_memory", "qdrant").
    fn name(&self) -> &str;

    /// Return up to `k` hits scoring at least `min_score`, sorted by
    /// descending score.
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        min_score: f32,
    ) -> std::result::Result<Vec<SearchHit>, SearchError>;

    /// Fetch the stored vector for a document, if it has one.
    async fn get(&self, id: &str) -> std::result::Result<Option<Vec<f32>>, SearchError>;
}
