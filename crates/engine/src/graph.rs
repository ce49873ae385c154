//! Link graph index: capped shortest-hop distance over outgoing links.
//!
//! The graph is a snapshot: it reflects link state at build time only.
//! [`LinkGraphCache`] owns the snapshot on behalf of the caller and keys it
//! by a corpus version, so a caller that bumps its version on every edit
//! never sees a stale graph.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use contextloom_core::document::{DocumentId, DocumentStore};
use contextloom_core::error::StoreError;
use tracing::debug;

/// Default hop cap for distance queries.
pub const MAX_HOPS: usize = 3;

/// Distance reported when no path exists within the hop cap.
pub const UNCONNECTED: usize = 0;

/// Adjacency map from each document to the documents it links to.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    adjacency: HashMap<DocumentId, BTreeSet<DocumentId>>,
    edge_count: usize,
    dropped_links: usize,
}

impl LinkGraph {
    /// Build the graph by resolving every outgoing link in the corpus.
    ///
    /// Dangling references are dropped silently.
    pub async fn build(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let documents = store.list_documents().await?;
        let mut graph = Self::default();

        for doc in &documents {
            let mut targets = BTreeSet::new();
            for reference in &doc.outgoing_links {
                match store.resolve_link(reference, &doc.id).await? {
                    Some(target) => {
                        targets.insert(target);
                    }
                    None => graph.dropped_links += 1,
                }
            }
            graph.edge_count += targets.len();
            graph.adjacency.insert(doc.id.clone(), targets);
        }

        debug!(
            store = store.name(),
            nodes = graph.adjacency.len(),
            edges = graph.edge_count,
            dropped = graph.dropped_links,
            "Link graph built"
        );
        Ok(graph)
    }

    /// Build a graph from already-resolved `(from, to)` pairs.
    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut graph = Self::default();
        for (from, to) in edges {
            let to = to.into();
            graph.adjacency.entry(to.clone()).or_default();
            if graph.adjacency.entry(from.into()).or_default().insert(to) {
                graph.edge_count += 1;
            }
        }
        graph
    }

    /// Shortest directed hop count from `from` to `to`, capped at `max_hops`.
    ///
    /// Returns [`UNCONNECTED`] when `to` is not reachable within the cap,
    /// when either id is unknown, and when `from == to`.
    pub fn distance(&self, from: &str, to: &str, max_hops: usize) -> usize {
        if from == to || !self.adjacency.contains_key(from) {
            return UNCONNECTED;
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut frontier: VecDeque<(&str, usize)> = VecDeque::new();
        visited.insert(from);
        frontier.push_back((from, 0));

        while let Some((node, depth)) = frontier.pop_front() {
            if depth >= max_hops {
                continue;
            }
            let Some(targets) = self.adjacency.get(node) else {
                continue;
            };
            for next in targets {
                if next == to {
                    return depth + 1;
                }
                if visited.insert(next.as_str()) {
                    frontier.push_back((next.as_str(), depth + 1));
                }
            }
        }

        UNCONNECTED
    }

    /// Documents directly linked from `id`, in sorted order.
    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Link references that did not resolve at build time.
    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }
}

/// Caller-owned link graph snapshot keyed by corpus version.
///
/// Pass the host's current corpus version on every call; the graph is
/// rebuilt whenever the version differs from the one it was built at.
/// [`invalidate`](Self::invalidate) forces a rebuild without a version bump.
#[derive(Debug, Default)]
pub struct LinkGraphCache {
    built: Option<(u64, Arc<LinkGraph>)>,
    builds: usize,
}

impl LinkGraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the graph for `version`, building it if needed.
    pub async fn graph(
        &mut self,
        store: &dyn DocumentStore,
        version: u64,
    ) -> Result<Arc<LinkGraph>, StoreError> {
        if let Some((built_at, graph)) = &self.built
            && *built_at == version
        {
            return Ok(Arc::clone(graph));
        }

        debug!(version, previous = ?self.version(), "Rebuilding link graph");
        let graph = Arc::new(LinkGraph::build(store).await?);
        self.built = Some((version, Arc::clone(&graph)));
        self.builds += 1;
        Ok(graph)
    }

    /// Discard the cached graph.
    pub fn invalidate(&mut self) {
        self.built = None;
    }

    /// Version the cached graph was built at, if any.
    pub fn version(&self) -> Option<u64> {
        self.built.as_ref().map(|(v, _)| *v)
    }

    /// Number of builds performed over the cache's lifetime.
    pub fn build_count(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contextloom_core::document::Document;
    use contextloom_memory::InMemoryDocumentStore;

    fn chain() -> LinkGraph {
        // a → b → c → d → e
        LinkGraph::from_edges([("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")])
    }

    #[test]
    fn direct_link_is_one_hop() {
        assert_eq!(chain().distance("a", "b", MAX_HOPS), 1);
    }

    #[test]
    fn distances_within_cap() {
        let g = chain();
        assert_eq!(g.distance("a", "c", MAX_HOPS), 2);
        assert_eq!(g.distance("a", "d", MAX_HOPS), 3);
    }

    #[test]
    fn beyond_cap_is_unconnected() {
        let g = chain();
        assert_eq!(g.distance("a", "e", MAX_HOPS), UNCONNECTED);
        assert_eq!(g.distance("a", "e", 4), 4);
    }

    #[test]
    fn links_are_directed() {
        assert_eq!(chain().distance("c", "a", MAX_HOPS), UNCONNECTED);
    }

    #[test]
    fn unknown_and_self_are_unconnected() {
        let g = chain();
        assert_eq!(g.distance("a", "missing", MAX_HOPS), UNCONNECTED);
        assert_eq!(g.distance("missing", "a", MAX_HOPS), UNCONNECTED);
        assert_eq!(g.distance("a", "a", MAX_HOPS), UNCONNECTED);
    }

    #[test]
    fn shortest_path_wins_over_longer() {
        let g = LinkGraph::from_edges([("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        assert_eq!(g.distance("a", "d", MAX_HOPS), 1);
    }

    #[test]
    fn cycles_terminate() {
        let g = LinkGraph::from_edges([("a", "b"), ("b", "a"), ("b", "c")]);
        assert_eq!(g.distance("a", "c", MAX_HOPS), 2);
        assert_eq!(g.distance("c", "a", MAX_HOPS), UNCONNECTED);
    }

    #[test]
    fn from_edges_counts_unique_edges() {
        let g = LinkGraph::from_edges([("a", "b"), ("a", "b"), ("b", "c")]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.neighbors("a").collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(g.neighbors("zzz").count(), 0);
    }

    #[tokio::test]
    async fn build_drops_dangling_links() {
        let store = InMemoryDocumentStore::new();
        let now = Utc::now();
        store
            .insert(Document::new("a.md", now).with_links(["b", "ghost"]), "")
            .await;
        store.insert(Document::new("b.md", now), "").await;

        let g = LinkGraph::build(&store).await.unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.dropped_links(), 1);
        assert_eq!(g.distance("a.md", "b.md", MAX_HOPS), 1);
    }

    #[tokio::test]
    async fn cache_reuses_graph_for_same_version() {
        let store = InMemoryDocumentStore::new();
        store.insert(Document::new("a.md", Utc::now()), "").await;

        let mut cache = LinkGraphCache::new();
        let first = cache.graph(&store, 1).await.unwrap();
        let second = cache.graph(&store, 1).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);
        assert_eq!(cache.version(), Some(1));
    }

    #[tokio::test]
    async fn cache_rebuilds_on_version_change_and_invalidate() {
        let store = InMemoryDocumentStore::new();
        store.insert(Document::new("a.md", Utc::now()), "").await;

        let mut cache = LinkGraphCache::new();
        cache.graph(&store, 1).await.unwrap();
        cache.graph(&store, 2).await.unwrap();
        assert_eq!(cache.build_count(), 2);

        cache.invalidate();
        assert_eq!(cache.version(), None);
        cache.graph(&store, 2).await.unwrap();
        assert_eq!(cache.build_count(), 3);
    }
}
