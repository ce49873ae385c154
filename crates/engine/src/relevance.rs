//! Relevance scorer: recency decay plus link distance, optionally plus
//! semantic similarity, folded into a 0–100 composite with reasons.
//!
//! The lightweight path ([`RelevanceScorer::score`], [`RelevanceScorer::rank`])
//! needs no embedding round trip and always reports `semantic = 0`.

use chrono::{DateTime, Utc};
use contextloom_config::EngineConfig;
use contextloom_core::document::{Document, DocumentStore};
use contextloom_core::error::Result;
use contextloom_core::retrieval::RelevanceScore;
use tracing::debug;

use crate::graph::{LinkGraph, LinkGraphCache, UNCONNECTED};

const MS_PER_DAY: f64 = 86_400_000.0;

pub const REASON_RECENT: &str = "Recently modified";
pub const REASON_LINKED: &str = "Connected via links";
pub const REASON_SEMANTIC: &str = "Semantically similar";
pub const REASON_NO_SEMANTIC: &str = "No semantic signal (topology and recency only)";

/// Stateless scorer; configuration is copied in at construction.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    decay_days: f64,
    recent_threshold: f64,
    max_hops: usize,
    connected_threshold: f64,
    recency_weight: f64,
    link_weight: f64,
    semantic_weight: f64,
    semantic_threshold: f64,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl RelevanceScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            decay_days: config.recency.decay_days,
            recent_threshold: config.recency.recent_threshold,
            max_hops: config.links.max_hops,
            connected_threshold: config.links.connected_threshold,
            recency_weight: config.scoring.recency_weight,
            link_weight: config.scoring.link_weight,
            semantic_weight: config.scoring.semantic_weight,
            semantic_threshold: config.scoring.semantic_threshold,
        }
    }

    /// `100 * exp(-age_days / decay_days)`. Future timestamps count as age 0.
    ///
    /// Computed in `f64` so documents decades old still order by age.
    pub fn recency_score(&self, modified_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let age_days = ((now - modified_at).num_milliseconds() as f64 / MS_PER_DAY).max(0.0);
        100.0 * (-age_days / self.decay_days).exp()
    }

    /// Map a hop distance to a link score.
    ///
    /// The `_ => 10.0` arm is only reachable with a hop cap above 3; at the
    /// default cap the distance query already returns `UNCONNECTED`.
    pub fn link_score(distance: usize) -> f64 {
        match distance {
            UNCONNECTED => 0.0,
            1 => 100.0,
            2 => 60.0,
            3 => 30.0,
            _ => 10.0,
        }
    }

    fn link_component(&self, doc: &Document, current: Option<&str>, graph: &LinkGraph) -> f64 {
        match current {
            Some(current) => Self::link_score(graph.distance(current, &doc.id, self.max_hops)),
            None => 0.0,
        }
    }

    fn base_reasons(&self, recency: f64, link: f64) -> Vec<String> {
        let mut reasons = Vec::new();
        if recency > self.recent_threshold {
            reasons.push(REASON_RECENT.to_string());
        }
        if link > self.connected_threshold {
            reasons.push(REASON_LINKED.to_string());
        }
        reasons
    }

    /// Score a document on recency and link distance only.
    pub fn score(
        &self,
        doc: &Document,
        current: Option<&str>,
        graph: &LinkGraph,
        now: DateTime<Utc>,
    ) -> RelevanceScore {
        let recency = self.recency_score(doc.modified_at, now);
        let link = self.link_component(doc, current, graph);
        let mut reasons = self.base_reasons(recency, link);
        reasons.push(REASON_NO_SEMANTIC.to_string());

        RelevanceScore {
            document: doc.id.clone(),
            total: recency * self.recency_weight + link * self.link_weight,
            recency,
            link,
            semantic: 0.0,
            reasons,
        }
    }

    /// Score a document including a vector-search similarity (0.0–1.0).
    pub fn score_with_semantic(
        &self,
        doc: &Document,
        current: Option<&str>,
        graph: &LinkGraph,
        similarity: f32,
        now: DateTime<Utc>,
    ) -> RelevanceScore {
        let recency = self.recency_score(doc.modified_at, now);
        let link = self.link_component(doc, current, graph);
        let semantic = (f64::from(similarity) * 100.0).clamp(0.0, 100.0);
        let mut reasons = self.base_reasons(recency, link);
        if semantic > self.semantic_threshold {
            reasons.push(REASON_SEMANTIC.to_string());
        }

        let total = recency * self.recency_weight
            + link * self.link_weight
            + semantic * self.semantic_weight;

        RelevanceScore {
            document: doc.id.clone(),
            total: total.clamp(0.0, 100.0),
            recency,
            link,
            semantic,
            reasons,
        }
    }

    /// Score every document except `current` and return the top `limit`,
    /// highest total first. Ties are broken by id.
    pub fn rank(
        &self,
        docs: &[Document],
        current: Option<&str>,
        graph: &LinkGraph,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<RelevanceScore> {
        let mut scores: Vec<RelevanceScore> = docs
            .iter()
            .filter(|d| Some(d.id.as_str()) != current)
            .map(|d| self.score(d, current, graph, now))
            .collect();

        scores.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.cmp(&b.document))
        });
        scores.truncate(limit);
        scores
    }

    /// Rank the whole corpus against `current` using the caller's graph cache.
    pub async fn rank_corpus(
        &self,
        store: &dyn DocumentStore,
        cache: &mut LinkGraphCache,
        version: u64,
        current: Option<&str>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<RelevanceScore>> {
        let graph = cache.graph(store, version).await?;
        let docs = store.list_documents().await?;
        let ranked = self.rank(&docs, current, &graph, now, limit);
        debug!(
            candidates = docs.len(),
            returned = ranked.len(),
            current = current.unwrap_or("-"),
            "Ranked corpus by recency and links"
        );
        Ok(ranked)
    }
}
