//! In-memory document store: useful for testing and ephemeral corpora.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use contextloom_core::document::{Document, DocumentId, DocumentStore};
use contextloom_core::error::StoreError;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredDocument {
    meta: Document,
    content: String,
}

/// A document store backed by a sorted map of id → (metadata, content).
///
/// Link references resolve in this order:
/// 1. exact id (`notes/b.md`)
/// 2. id with `.md` appended (`notes/b`)
/// 3. relative to the linking document's folder (`b` from `notes/a.md`)
/// 4. unique file-stem match anywhere in the corpus (`b`)
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    docs: Arc<RwLock<BTreeMap<DocumentId, StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub async fn insert(&self, meta: Document, content: impl Into<String>) {
        let id = meta.id.clone();
        self.docs.write().await.insert(
            id,
            StoredDocument {
                meta,
                content: content.into(),
            },
        );
    }

    /// Add an outgoing link reference to an existing document and bump its
    /// modification time. Returns `false` if the document does not exist.
    pub async fn add_link(&self, id: &str, reference: impl Into<String>) -> bool {
        let mut docs = self.docs.write().await;
        match docs.get_mut(id) {
            Some(doc) => {
                doc.meta.outgoing_links.push(reference.into());
                doc.meta.modified_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Replace a document's content and bump its modification time.
    pub async fn update_content(&self, id: &str, content: impl Into<String>) -> bool {
        let mut docs = self.docs.write().await;
        match docs.get_mut(id) {
            Some(doc) => {
                doc.content = content.into();
                doc.meta.modified_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.docs.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.values().map(|d| d.meta.clone()).collect())
    }

    async fn read(&self, id: &str) -> Result<String, StoreError> {
        let docs = self.docs.read().await;
        docs.get(id)
            .map(|d| d.content.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn resolve_link(&self, reference: &str, from: &str) -> Result<Option<DocumentId>, StoreError> {
        // Strip `#heading` / `|alias` suffixes written in wiki-style links.
        let target = reference
            .split(['#', '|'])
            .next()
            .unwrap_or_default()
            .trim();
        if target.is_empty() {
            return Ok(None);
        }

        let docs = self.docs.read().await;

        if docs.contains_key(target) {
            return Ok(Some(target.to_string()));
        }

        let with_ext = format!("{target}.md");
        if docs.contains_key(&with_ext) {
            return Ok(Some(with_ext));
        }

        let folder = Document::folder_of(from);
        if !folder.is_empty() {
            for candidate in [format!("{folder}/{target}"), format!("{folder}/{with_ext}")] {
                if docs.contains_key(&candidate) {
                    return Ok(Some(candidate));
                }
            }
        }

        let mut by_stem = docs.keys().filter(|id| Document::stem_of(id) == target);
        match (by_stem.next(), by_stem.next()) {
            (Some(only), None) => Ok(Some(only.clone())),
            (Some(_), Some(_)) => {
                tracing::debug!(reference, from, "Ambiguous link reference left unresolved");
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        let now = Utc::now();
        store.insert(Document::new("notes/a.md", now), "alpha").await;
        store.insert(Document::new("notes/b.md", now), "bravo").await;
        store.insert(Document::new("archive/b.md", now), "old bravo").await;
        store.insert(Document::new("journal/c.md", now), "charlie").await;
        store
    }

    #[tokio::test]
    async fn read_known_and_unknown() {
        let store = seeded().await;
        assert_eq!(store.read("notes/a.md").await.unwrap(), "alpha");
        let err = store.read("nope.md").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_sorted_by_id() {
        let store = seeded().await;
        let ids: Vec<String> = store
            .list_documents()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["archive/b.md", "journal/c.md", "notes/a.md", "notes/b.md"]);
    }

    #[tokio::test]
    async fn resolves_exact_and_extensionless() {
        let store = seeded().await;
        assert_eq!(
            store.resolve_link("journal/c.md", "notes/a.md").await.unwrap(),
            Some("journal/c.md".into())
        );
        assert_eq!(
            store.resolve_link("journal/c", "notes/a.md").await.unwrap(),
            Some("journal/c.md".into())
        );
    }

    #[tokio::test]
    async fn relative_link_prefers_own_folder() {
        let store = seeded().await;
        // "b" exists in both notes/ and archive/; the linking folder wins.
        assert_eq!(
            store.resolve_link("b", "notes/a.md").await.unwrap(),
            Some("notes/b.md".into())
        );
    }

    #[tokio::test]
    async fn unique_stem_resolves_across_folders() {
        let store = seeded().await;
        assert_eq!(
            store.resolve_link("c#Summary", "notes/a.md").await.unwrap(),
            Some("journal/c.md".into())
        );
    }

    #[tokio::test]
    async fn ambiguous_and_dangling_links_unresolved() {
        let store = seeded().await;
        assert_eq!(store.resolve_link("b", "journal/c.md").await.unwrap(), None);
        assert_eq!(store.resolve_link("ghost", "notes/a.md").await.unwrap(), None);
        assert_eq!(store.resolve_link("  ", "notes/a.md").await.unwrap(), None);
    }

    #[tokio::test]
    async fn add_link_mutates_metadata() {
        let store = seeded().await;
        assert!(store.add_link("notes/a.md", "c").await);
        assert!(!store.add_link("missing.md", "c").await);

        let docs = store.list_documents().await.unwrap();
        let a = docs.iter().find(|d| d.id == "notes/a.md").unwrap();
        assert_eq!(a.outgoing_links, vec!["c"]);
    }

    #[tokio::test]
    async fn update_content_bumps_modification_time() {
        let store = InMemoryDocumentStore::new();
        let then = Utc::now() - chrono::Duration::days(30);
        store.insert(Document::new("notes/a.md", then), "draft").await;

        assert!(store.update_content("notes/a.md", "final").await);
        assert!(!store.update_content("missing.md", "x").await);

        assert_eq!(store.read("notes/a.md").await.unwrap(), "final");
        let docs = store.list_documents().await.unwrap();
        assert!(docs[0].modified_at > then);
        assert_eq!(docs[0].created_at, then);
    }

    #[tokio::test]
    async fn remove_and_len() {
        let store = seeded().await;
        assert_eq!(store.len().await, 4);
        assert!(store.remove("archive/b.md").await);
        assert!(!store.remove("archive/b.md").await);
        assert_eq!(store.len().await, 3);
        assert!(!store.is_empty().await);
    }
}
