//! Document model and the document store trait.
//!
//! A `Document` is the engine's view of one file in the host corpus: its
//! identity (a stable path), timestamps, tags, outgoing link references,
//! and containing folder. Text content is never carried on the value; the
//! engine fetches it on demand through [`DocumentStore::read`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Stable document identity (a corpus-relative path such as `notes/alpha.md`).
pub type DocumentId = String;

/// Metadata for a single document in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable path identity
    pub id: DocumentId,

    /// Last modification time
    pub modified_at: DateTime<Utc>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Tags, stored without a leading `#`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Raw outgoing link references, unresolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outgoing_links: Vec<String>,

    /// Containing folder (empty for the corpus root)
    #[serde(default)]
    pub folder: String,
}

impl Document {
    /// Create a document whose folder is derived from its path and whose
    /// creation and modification times are both `at`.
    pub fn new(id: impl Into<String>, at: DateTime<Utc>) -> Self {
        let id = id.into();
        let folder = Self::folder_of(&id).to_string();
        Self {
            id,
            modified_at: at,
            created_at: at,
            tags: Vec::new(),
            outgoing_links: Vec::new(),
            folder,
        }
    }

    pub fn with_created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags
            .into_iter()
            .map(|t| {
                let t: String = t.into();
                t.trim_start_matches('#').to_string()
            })
            .collect();
        self
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outgoing_links = links.into_iter().map(Into::into).collect();
        self
    }

    /// The parent folder of a path-like id (`"a/b/c.md"` → `"a/b"`, `"c.md"` → `""`).
    pub fn folder_of(id: &str) -> &str {
        match id.rfind('/') {
            Some(idx) => &id[..idx],
            None => "",
        }
    }

    /// The file stem of a path-like id (`"a/b/c.md"` → `"c"`).
    pub fn stem_of(id: &str) -> &str {
        let name = match id.rfind('/') {
            Some(idx) => &id[idx + 1..],
            None => id,
        };
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }
}

/// The host document store.
///
/// The engine only reads through this trait; it never writes or caches
/// document content.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The store name (e.g., "in_memory", "vault").
    fn name(&self) -> &str;

    /// List metadata for every document in the corpus.
    async fn list_documents(&self) -> std::result::Result<Vec<Document>, StoreError>;

    /// Read the full text of a document. Unknown ids yield `StoreError::NotFound`.
    async fn read(&self, id: &str) -> std::result::Result<String, StoreError>;

    /// Resolve a raw link reference written in `from` to a concrete document.
    ///
    /// Returns `Ok(None)` for dangling links.
    async fn resolve_link(
        &self,
        reference: &str,
        from: &str,
    ) -> std::result::Result<Option<DocumentId>, StoreError>;
}
