//! Vector similarity and an in-memory nearest-neighbour index.
//!
//! Pure-Rust brute-force search: every query scores every stored vector
//! with cosine similarity. Good enough for tests and corpora of a few
//! thousand documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use contextloom_core::document::DocumentId;
use contextloom_core::error::SearchError;
use contextloom_core::search::{SearchHit, VectorSearch};
use tokio::sync::RwLock;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

#[derive(Default)]
struct IndexState {
    dimension: Option<usize>,
    vectors: BTreeMap<DocumentId, Vec<f32>>,
}

/// Brute-force cosine index keyed by document id.
///
/// The first stored vector fixes the index dimension; later vectors and
/// queries of a different length are rejected.
#[derive(Clone, Default)]
pub struct InMemoryVectorIndex {
    state: Arc<RwLock<IndexState>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the vector for a document.
    pub async fn upsert(&self, id: impl Into<String>, vector: Vec<f32>) -> Result<(), SearchError> {
        let mut state = self.state.write().await;
        match state.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(SearchError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            None => state.dimension = Some(vector.len()),
            _ => {}
        }
        state.vectors.insert(id.into(), vector);
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.state.write().await.vectors.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.vectors.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.vectors.is_empty()
    }
}

#[async_trait]
impl VectorSearch for InMemoryVectorIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(&self, vector: &[f32], k: usize, min_score: f32) -> Result<Vec<SearchHit>, SearchError> {
        let state = self.state.read().await;
        if let Some(expected) = state.dimension
            && expected != vector.len()
        {
            return Err(SearchError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let mut hits: Vec<SearchHit> = state
            .vectors
            .iter()
            .filter_map(|(id, stored)| {
                let sim = cosine_similarity(stored, vector);
                (sim >= min_score).then(|| SearchHit::new(id.clone(), sim))
            })
            .collect();

        // Descending score; ids break ties so results are stable.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn get(&self, id: &str) -> Result<Option<Vec<f32>>, SearchError> {
        Ok(self.state.read().await.vectors.get(id).cloned())
    }
}
