//! Project boundary detection: infer bodies of work from shared project
//! tags and shared folders.
//!
//! Recomputed in full on every call; nothing is cached between runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use contextloom_config::EngineConfig;
use contextloom_core::document::{Document, DocumentStore};
use contextloom_core::error::Result;
use contextloom_core::retrieval::{BoundaryKind, ProjectBoundary};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProjectBoundaryDetector {
    tag_prefixes: Vec<String>,
    min_tag_members: usize,
    min_folder_members: usize,
    /// `None` when the configured window is too large to represent; every
    /// boundary then counts as active.
    active_window: Option<Duration>,
}

impl Default for ProjectBoundaryDetector {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ProjectBoundaryDetector {
    pub fn new(config: &EngineConfig) -> Self {
        let projects = &config.projects;
        Self {
            tag_prefixes: projects
                .tag_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            min_tag_members: projects.min_tag_members,
            min_folder_members: projects.min_folder_members,
            active_window: Duration::try_days(projects.active_window_days),
        }
    }

    /// The project name a tag marks, if it looks like a project marker.
    ///
    /// `"#Project/Alpha"` → `Some("alpha")`; `"draft"` → `None`.
    pub fn project_name_for_tag(&self, tag: &str) -> Option<String> {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        self.tag_prefixes.iter().find_map(|prefix| {
            tag.strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
    }

    /// Group documents into project boundaries.
    ///
    /// Tag groups need `min_tag_members` members and folder groups need
    /// `min_folder_members`. Folder boundaries are named by their full
    /// folder path; a folder whose path or leaf name matches a tag
    /// boundary's name is skipped. Output is sorted by kind then name.
    pub fn detect(&self, docs: &[Document], now: DateTime<Utc>) -> Vec<ProjectBoundary> {
        let mut by_tag: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
        let mut by_folder: BTreeMap<&str, Vec<&Document>> = BTreeMap::new();

        for doc in docs {
            let names: BTreeSet<String> = doc
                .tags
                .iter()
                .filter_map(|t| self.project_name_for_tag(t))
                .collect();
            for name in names {
                by_tag.entry(name).or_default().push(doc);
            }
            if !doc.folder.is_empty() {
                by_folder.entry(doc.folder.as_str()).or_default().push(doc);
            }
        }

        let mut boundaries: Vec<ProjectBoundary> = by_tag
            .into_iter()
            .filter(|(_, members)| members.len() >= self.min_tag_members)
            .filter_map(|(name, members)| self.boundary(name, BoundaryKind::Tag, &members, now))
            .collect();

        let tag_names: BTreeSet<String> = boundaries.iter().map(|b| b.name.to_lowercase()).collect();

        for (folder, members) in by_folder {
            if members.len() < self.min_folder_members {
                continue;
            }
            let leaf = folder.rsplit('/').next().unwrap_or(folder);
            let represented = tag_names.contains(&leaf.to_lowercase())
                || tag_names.contains(&folder.to_lowercase());
            if represented {
                debug!(folder, "Folder already represented by a tag boundary");
                continue;
            }
            if let Some(b) = self.boundary(folder.to_string(), BoundaryKind::Folder, &members, now) {
                boundaries.push(b);
            }
        }

        boundaries.sort_by(|a, b| {
            (a.kind, &a.name, a.members.iter().next())
                .cmp(&(b.kind, &b.name, b.members.iter().next()))
        });

        debug!(
            documents = docs.len(),
            boundaries = boundaries.len(),
            active = boundaries.iter().filter(|b| b.active).count(),
            "Project boundaries detected"
        );
        boundaries
    }

    /// List the corpus from `store` and run [`detect`](Self::detect).
    pub async fn detect_from_store(
        &self,
        store: &dyn DocumentStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectBoundary>> {
        let docs = store.list_documents().await?;
        Ok(self.detect(&docs, now))
    }

    fn boundary(
        &self,
        name: String,
        kind: BoundaryKind,
        members: &[&Document],
        now: DateTime<Utc>,
    ) -> Option<ProjectBoundary> {
        let first_created = members.iter().map(|d| d.created_at).min()?;
        let last_modified = members.iter().map(|d| d.modified_at).max()?;
        let active = match self.active_window.and_then(|w| now.checked_sub_signed(w)) {
            Some(cutoff) => last_modified >= cutoff,
            None => true,
        };

        Some(ProjectBoundary {
            name,
            kind,
            members: members.iter().map(|d| d.id.clone()).collect(),
            first_created,
            last_modified,
            active,
            tags: members.iter().flat_map(|d| d.tags.iter().cloned()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn doc(id: &str, age_days: i64, tags: &[&str]) -> Document {
        Document::new(id, now() - Duration::days(age_days)).with_tags(tags.iter().copied())
    }

    #[test]
    fn project_tag_detection() {
        let d = ProjectBoundaryDetector::default();
        assert_eq!(d.project_name_for_tag("#Project/Alpha"), Some("alpha".into()));
        assert_eq!(d.project_name_for_tag("proj-beta"), Some("beta".into()));
        assert_eq!(d.project_name_for_tag("project/"), None);
        assert_eq!(d.project_name_for_tag("projector"), None);
        assert_eq!(d.project_name_for_tag("draft"), None);
    }

    #[test]
    fn tag_group_of_two_forms_boundary() {
        let d = ProjectBoundaryDetector::default();
        let docs = vec![
            doc("a.md", 1, &["project/alpha"]),
            doc("b.md", 2, &["project/alpha", "urgent"]),
            doc("c.md", 3, &["project/solo"]),
        ];
        let boundaries = d.detect(&docs, now());
        assert_eq!(boundaries.len(), 1);
        let alpha = &boundaries[0];
        assert_eq!(alpha.name, "alpha");
        assert_eq!(alpha.kind, BoundaryKind::Tag);
        assert!(alpha.contains("a.md") && alpha.contains("b.md"));
        assert!(alpha.tags.contains("urgent"));
    }

    #[test]
    fn folder_needs_three_members() {
        let d = ProjectBoundaryDetector::default();
        let two = vec![doc("research/a.md", 1, &[]), doc("research/b.md", 1, &[])];
        assert!(d.detect(&two, now()).is_empty());

        let mut three = two.clone();
        three.push(doc("research/c.md", 1, &[]));
        let boundaries = d.detect(&three, now());
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].kind, BoundaryKind::Folder);
        assert_eq!(boundaries[0].name, "research");
    }

    #[test]
    fn root_documents_never_form_folder_boundary() {
        let d = ProjectBoundaryDetector::default();
        let docs = vec![doc("a.md", 1, &[]), doc("b.md", 1, &[]), doc("c.md", 1, &[])];
        assert!(d.detect(&docs, now()).is_empty());
    }

    #[test]
    fn folder_covered_by_tag_not_duplicated() {
        let d = ProjectBoundaryDetector::default();
        let docs = vec![
            doc("work/alpha/a.md", 1, &["project/alpha"]),
            doc("work/alpha/b.md", 1, &["project/alpha"]),
            doc("work/alpha/c.md", 1, &[]),
        ];
        let boundaries = d.detect(&docs, now());
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].kind, BoundaryKind::Tag);
    }

    #[test]
    fn timestamps_and_activity() {
        let d = ProjectBoundaryDetector::default();
        let docs = vec![
            doc("old/a.md", 30, &[]).with_created(now() - Duration::days(100)),
            doc("old/b.md", 20, &[]),
            doc("old/c.md", 10, &[]),
            doc("new/a.md", 2, &[]),
            doc("new/b.md", 40, &[]),
            doc("new/c.md", 50, &[]),
        ];
        let boundaries = d.detect(&docs, now());
        let old = boundaries.iter().find(|b| b.name == "old").unwrap();
        let new = boundaries.iter().find(|b| b.name == "new").unwrap();

        assert_eq!(old.first_created, now() - Duration::days(100));
        assert_eq!(old.last_modified, now() - Duration::days(10));
        assert!(!old.active);
        assert_eq!(new.last_modified, now() - Duration::days(2));
        assert!(new.active);
    }

    #[test]
    fn detection_is_idempotent_and_sorted() {
        let d = ProjectBoundaryDetector::default();
        let docs = vec![
            doc("z/a.md", 1, &["proj/zeta"]),
            doc("z/b.md", 1, &["proj/zeta"]),
            doc("m/a.md", 1, &["project/alpha"]),
            doc("m/b.md", 1, &["project/alpha"]),
            doc("m/c.md", 1, &[]),
        ];
        let first = d.detect(&docs, now());
        let second = d.detect(&docs, now());
        assert_eq!(first, second);

        let names: Vec<(BoundaryKind, &str)> =
            first.iter().map(|b| (b.kind, b.name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (BoundaryKind::Tag, "alpha"),
                (BoundaryKind::Tag, "zeta"),
                (BoundaryKind::Folder, "m"),
            ]
        );
    }

    #[test]
    fn nested_folders_with_same_leaf_stay_distinct() {
        let d = ProjectBoundaryDetector::default();
        let docs = vec![
            doc("a/notes/1.md", 1, &[]),
            doc("a/notes/2.md", 1, &[]),
            doc("a/notes/3.md", 1, &[]),
            doc("b/notes/1.md", 1, &[]),
            doc("b/notes/2.md", 1, &[]),
            doc("b/notes/3.md", 1, &[]),
        ];
        let names: Vec<String> = d.detect(&docs, now()).into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["a/notes", "b/notes"]);
    }

    #[test]
    fn huge_active_window_marks_everything_active() {
        let mut config = EngineConfig::default();
        let docs = vec![
            doc("old/a.md", 5000, &[]),
            doc("old/b.md", 6000, &[]),
            doc("old/c.md", 7000, &[]),
        ];

        config.projects.active_window_days = 100_000_000;
        let boundaries = ProjectBoundaryDetector::new(&config).detect(&docs, now());
        assert!(boundaries[0].active);

        config.projects.active_window_days = i64::MAX;
        let boundaries = ProjectBoundaryDetector::new(&config).detect(&docs, now());
        assert!(boundaries[0].active);
    }

    #[test]
    fn configurable_thresholds_and_prefixes() {
        let mut config = EngineConfig::default();
        config.projects.tag_prefixes = vec!["client/".into()];
        config.projects.min_tag_members = 1;
        let d = ProjectBoundaryDetector::new(&config);
        let docs = vec![doc("a.md", 1, &["client/acme"]), doc("b.md", 1, &["project/x"])];
        let boundaries = d.detect(&docs, now());
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].name, "acme");
    }
}
