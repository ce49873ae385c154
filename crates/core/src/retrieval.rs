//! Result types produced by the retrieval engine.
//!
//! All of these are ephemeral: they are recomputed on every call and never
//! persisted by the engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentId;

/// Composite relevance of one candidate document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceScore {
    /// The scored document
    pub document: DocumentId,
    /// Weighted aggregate (0.0–100.0)
    pub total: f64,
    /// Recency component (0.0–100.0)
    pub recency: f64,
    /// Link-distance component (0.0–100.0)
    pub link: f64,
    /// Semantic component (0.0–100.0); always 0 on the lightweight path
    pub semantic: f64,
    /// Human-readable explanations
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// A related document that made it into an assembled context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludedDocument {
    pub id: DocumentId,
    /// Similarity reported by vector search
    pub similarity: f32,
    /// Estimated tokens of the section appended for this document
    pub tokens: usize,
}

/// The output of a context assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveContext {
    /// The focal document, always included in full
    pub primary: DocumentId,
    /// Related documents in the order they were appended (descending similarity)
    pub included: Vec<IncludedDocument>,
    /// The assembled text
    pub text: String,
    /// Estimated token count of `text`; never exceeds `budget`
    pub token_estimate: usize,
    /// The caller-supplied token budget
    pub budget: usize,
    /// Names of project boundaries touched by the included documents
    #[serde(default)]
    pub clusters: BTreeSet<String>,
}

impl AdaptiveContext {
    /// Ids of the related documents, in inclusion order.
    pub fn included_ids(&self) -> Vec<&str> {
        self.included.iter().map(|d| d.id.as_str()).collect()
    }

    /// Budget utilization percentage (0.0–100.0).
    pub fn utilization_pct(&self) -> f32 {
        if self.budget == 0 {
            return 0.0;
        }
        (self.token_estimate as f32 / self.budget as f32) * 100.0
    }
}

/// How a project boundary was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Documents sharing a project-marker tag
    Tag,
    /// Documents sharing a containing folder
    Folder,
}

/// An inferred grouping of documents representing one body of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBoundary {
    /// Tag remainder, or the full folder path for folder boundaries
    pub name: String,
    pub kind: BoundaryKind,
    pub members: BTreeSet<DocumentId>,
    /// Earliest creation time across members
    pub first_created: DateTime<Utc>,
    /// Latest modification time across members
    pub last_modified: DateTime<Utc>,
    /// Whether a member was modified within the active window
    pub active: bool,
    /// Union of all member tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ProjectBoundary {
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_handles_zero_budget() {
        let ctx = AdaptiveContext {
            primary: "a.md".into(),
            included: vec![],
            text: String::new(),
            token_estimate: 0,
            budget: 0,
            clusters: BTreeSet::new(),
        };
        assert_eq!(ctx.utilization_pct(), 0.0);
    }

    #[test]
    fn included_ids_preserve_order() {
        let ctx = AdaptiveContext {
            primary: "a.md".into(),
            included: vec![
                IncludedDocument {
                    id: "c.md".into(),
                    similarity: 0.9,
                    tokens: 10,
                },
                IncludedDocument {
                    id: "b.md".into(),
                    similarity: 0.7,
                    tokens: 10,
                },
            ],
            text: "...".into(),
            token_estimate: 50,
            budget: 100,
            clusters: BTreeSet::new(),
        };
        assert_eq!(ctx.included_ids(), vec!["c.md", "b.md"]);
        assert_eq!(ctx.utilization_pct(), 50.0);
    }

    #[test]
    fn boundary_kind_orders_tags_first() {
        assert!(BoundaryKind::Tag < BoundaryKind::Folder);
        let json = serde_json::to_string(&BoundaryKind::Folder).unwrap();
        assert_eq!(json, "\"folder\"");
    }
}
