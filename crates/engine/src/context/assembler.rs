//! Context assembler: the orchestrator.
//!
//! Packs a primary document plus previews of its semantic neighbours into
//! one text blob under a token budget:
//!
//! 1. **Embed** the query via the embedding service
//! 2. **Search** the vector index for the top neighbours above a similarity floor
//! 3. **Seed** the output with the primary document's full content
//! 4. **Append** neighbour previews in search order until one would overflow
//!
//! # Greedy packing
//!
//! Step 4 stops at the *first* candidate that does not fit. Smaller
//! candidates further down the list are never tried, so the output is
//! fully determined by the search order and may under-fill the budget.
//! Changing this to best-fit packing changes which documents callers see
//! and needs product sign-off.
//!
//! # Determinism
//!
//! Candidates are read one at a time in the order vector search returned
//! them. There is no parallel fan-out.

use std::collections::BTreeSet;
use std::sync::Arc;

use contextloom_config::EngineConfig;
use contextloom_core::document::DocumentStore;
use contextloom_core::embedding::EmbeddingService;
use contextloom_core::error::{Error, Result, StoreError};
use contextloom_core::retrieval::{AdaptiveContext, IncludedDocument, ProjectBoundary};
use contextloom_core::search::{SearchHit, VectorSearch};
use tracing::{debug, info};

use crate::context::token;

// ── Types ─────────────────────────────────────────────────────────────────

/// Inputs for a single assembly.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyRequest<'a> {
    /// Focal document id, always included in full.
    pub primary: &'a str,
    /// Free-text query used for the semantic search.
    pub query: &'a str,
    /// Maximum estimated tokens of the assembled text.
    pub token_budget: usize,
    /// Known project boundaries, used to report touched clusters.
    pub boundaries: &'a [ProjectBoundary],
}

impl<'a> AssemblyRequest<'a> {
    pub fn new(primary: &'a str, query: &'a str, token_budget: usize) -> Self {
        Self {
            primary,
            query,
            token_budget,
            boundaries: &[],
        }
    }

    pub fn with_boundaries(mut self, boundaries: &'a [ProjectBoundary]) -> Self {
        self.boundaries = boundaries;
        self
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The context assembler. Holds collaborators only; safe to reuse.
pub struct ContextAssembler {
    store: Arc<dyn DocumentStore>,
    embedder: Option<Arc<dyn EmbeddingService>>,
    search: Option<Arc<dyn VectorSearch>>,
    search_limit: usize,
    min_similarity: f32,
    preview_chars: usize,
}

impl ContextAssembler {
    /// Create an assembler over a document store. Attach the embedding and
    /// search collaborators with [`with_embedder`](Self::with_embedder) and
    /// [`with_search`](Self::with_search) before assembling.
    pub fn new(store: Arc<dyn DocumentStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            embedder: None,
            search: None,
            search_limit: config.assembly.search_limit,
            min_similarity: config.assembly.min_similarity,
            preview_chars: config.assembly.preview_chars,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingService>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn VectorSearch>) -> Self {
        self.search = Some(search);
        self
    }

    fn embedder(&self) -> Result<&Arc<dyn EmbeddingService>> {
        self.embedder
            .as_ref()
            .ok_or_else(|| Error::config("context assembly requires an embedding service"))
    }

    fn search(&self) -> Result<&Arc<dyn VectorSearch>> {
        self.search
            .as_ref()
            .ok_or_else(|| Error::config("context assembly requires a vector search service"))
    }

    /// Assemble context for `request`.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the embedding or search collaborator is missing
    /// - `Error::BudgetExceeded` if the primary section alone exceeds the budget
    /// - collaborator errors, including `StoreError::NotFound` for the primary
    pub async fn assemble(&self, request: &AssemblyRequest<'_>) -> Result<AdaptiveContext> {
        let embedder = self.embedder()?;
        let search = self.search()?;
        let budget = request.token_budget;

        info!(
            primary = request.primary,
            budget,
            embedder = embedder.name(),
            index = search.name(),
            "Assembling context"
        );

        let vector = embedder.embed(request.query).await?;
        let hits = search
            .search(&vector, self.search_limit, self.min_similarity)
            .await?;
        debug!(hits = hits.len(), "Vector search returned candidates");

        let content = self.store.read(request.primary).await?;
        let mut text = primary_section(request.primary, &content);
        let primary_tokens = token::estimate_tokens(&text);
        if primary_tokens > budget {
            return Err(Error::BudgetExceeded {
                primary_tokens,
                budget,
            });
        }

        let mut used = primary_tokens;
        let mut included: Vec<IncludedDocument> = Vec::new();

        for hit in &hits {
            if hit.id == request.primary {
                continue;
            }

            let content = match self.store.read(&hit.id).await {
                Ok(content) => content,
                Err(StoreError::NotFound(_)) => {
                    debug!(candidate = %hit.id, "Skipping candidate that no longer resolves");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let section = candidate_section(hit, token::preview(&content, self.preview_chars));
            let section_tokens = token::estimate_tokens(&section);
            if used + section_tokens > budget {
                debug!(
                    candidate = %hit.id,
                    section_tokens,
                    remaining = budget - used,
                    "Budget reached, stopping"
                );
                break;
            }

            text.push_str(&section);
            used += section_tokens;
            included.push(IncludedDocument {
                id: hit.id.clone(),
                similarity: hit.score,
                tokens: section_tokens,
            });
        }

        let clusters: BTreeSet<String> = request
            .boundaries
            .iter()
            .filter(|b| b.contains(request.primary) || included.iter().any(|d| b.contains(&d.id)))
            .map(|b| b.name.clone())
            .collect();

        info!(
            primary = request.primary,
            included = included.len(),
            tokens = used,
            budget,
            "Context assembled"
        );

        Ok(AdaptiveContext {
            primary: request.primary.to_string(),
            included,
            text,
            token_estimate: used,
            budget,
            clusters,
        })
    }

    /// Nearest neighbours of a document's own stored vector, excluding itself.
    ///
    /// Returns an empty list when the document has no stored vector.
    pub async fn cluster_mates(&self, id: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let search = self.search()?;
        let Some(vector) = search.get(id).await? else {
            debug!(document = id, "No stored vector, no cluster mates");
            return Ok(Vec::new());
        };

        let mut hits = search
            .search(&vector, limit.saturating_add(1), self.min_similarity)
            .await?;
        hits.retain(|h| h.id != id);
        hits.truncate(limit);
        Ok(hits)
    }
}

fn primary_section(id: &str, content: &str) -> String {
    format!("# {id}\n\n{content}\n")
}

fn candidate_section(hit: &SearchHit, preview: &str) -> String {
    let pct = (hit.score * 100.0).round().clamp(0.0, 100.0) as u32;
    format!("\n---\n## {} (relevance {}%)\n{}\n", hit.id, pct, preview)
}

// ── Tests ─────────────────────────────────────────────────────────────────
