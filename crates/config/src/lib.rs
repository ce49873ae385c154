//! Configuration loading, validation, and management for ContextLoom.
//!
//! Loads engine tuning from a TOML file with environment variable
//! overrides. Every field has a default, so an empty file (or no file at
//! all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Recency decay settings
    #[serde(default)]
    pub recency: RecencyConfig,

    /// Link graph settings
    #[serde(default)]
    pub links: LinkConfig,

    /// Composite score weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Context assembly settings
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// Project boundary detection settings
    #[serde(default)]
    pub projects: ProjectConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyConfig {
    /// Characteristic decay constant in days
    #[serde(default = "default_decay_days")]
    pub decay_days: f64,

    /// Recency above this earns the "Recently modified" reason
    #[serde(default = "default_recent_threshold")]
    pub recent_threshold: f64,
}

fn default_decay_days() -> f64 {
    30.0
}
fn default_recent_threshold() -> f64 {
    70.0
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            decay_days: default_decay_days(),
            recent_threshold: default_recent_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Hop cap for distance queries
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Link score above this earns the "Connected via links" reason
    #[serde(default = "default_connected_threshold")]
    pub connected_threshold: f64,
}

fn default_max_hops() -> usize {
    3
}
fn default_connected_threshold() -> f64 {
    50.0
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            connected_threshold: default_connected_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    #[serde(default = "default_link_weight")]
    pub link_weight: f64,

    /// Only applied on the semantic (full pipeline) scoring path
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,

    /// Semantic score above this earns the "Semantically similar" reason
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,
}

fn default_recency_weight() -> f64 {
    0.3
}
fn default_link_weight() -> f64 {
    0.2
}
fn default_semantic_weight() -> f64 {
    0.5
}
fn default_semantic_threshold() -> f64 {
    70.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            recency_weight: default_recency_weight(),
            link_weight: default_link_weight(),
            semantic_weight: default_semantic_weight(),
            semantic_threshold: default_semantic_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Number of neighbours requested from vector search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Similarity floor passed to vector search
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Characters of each related document included as a preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_search_limit() -> usize {
    20
}
fn default_min_similarity() -> f32 {
    0.4
}
fn default_preview_chars() -> usize {
    500
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            min_similarity: default_min_similarity(),
            preview_chars: default_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// A boundary is active if modified within this many days (0..=36500)
    #[serde(default = "default_active_window_days")]
    pub active_window_days: i64,

    /// Lowercase tag prefixes that mark a project tag
    #[serde(default = "default_tag_prefixes")]
    pub tag_prefixes: Vec<String>,

    #[serde(default = "default_min_tag_members")]
    pub min_tag_members: usize,

    #[serde(default = "default_min_folder_members")]
    pub min_folder_members: usize,
}

fn default_active_window_days() -> i64 {
    7
}

/// Upper bound for `projects.active_window_days` (about a century).
pub const MAX_ACTIVE_WINDOW_DAYS: i64 = 36_500;
fn default_tag_prefixes() -> Vec<String> {
    vec![
        "project/".into(),
        "project-".into(),
        "proj/".into(),
        "proj-".into(),
    ]
}
fn default_min_tag_members() -> usize {
    2
}
fn default_min_folder_members() -> usize {
    3
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            active_window_days: default_active_window_days(),
            tag_prefixes: default_tag_prefixes(),
            min_tag_members: default_min_tag_members(),
            min_folder_members: default_min_folder_members(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific file path, then apply
    /// `CONTEXTLOOM_*` environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str::<Self>(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Recognized keys:
    /// - `CONTEXTLOOM_DECAY_DAYS`
    /// - `CONTEXTLOOM_MAX_HOPS`
    /// - `CONTEXTLOOM_MIN_SIMILARITY`
    /// - `CONTEXTLOOM_SEARCH_LIMIT`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CONTEXTLOOM_DECAY_DAYS") {
            self.recency.decay_days = parse_override("CONTEXTLOOM_DECAY_DAYS", &v)?;
        }
        if let Some(v) = lookup("CONTEXTLOOM_MAX_HOPS") {
            self.links.max_hops = parse_override("CONTEXTLOOM_MAX_HOPS", &v)?;
        }
        if let Some(v) = lookup("CONTEXTLOOM_MIN_SIMILARITY") {
            self.assembly.min_similarity = parse_override("CONTEXTLOOM_MIN_SIMILARITY", &v)?;
        }
        if let Some(v) = lookup("CONTEXTLOOM_SEARCH_LIMIT") {
            self.assembly.search_limit = parse_override("CONTEXTLOOM_SEARCH_LIMIT", &v)?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.recency.decay_days > 0.0) {
            return Err(ConfigError::ValidationError(
                "recency.decay_days must be > 0".into(),
            ));
        }

        if self.links.max_hops == 0 {
            return Err(ConfigError::ValidationError(
                "links.max_hops must be at least 1".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.assembly.min_similarity) {
            return Err(ConfigError::ValidationError(
                "assembly.min_similarity must be between 0.0 and 1.0".into(),
            ));
        }

        if self.assembly.search_limit == 0 {
            return Err(ConfigError::ValidationError(
                "assembly.search_limit must be > 0".into(),
            ));
        }

        let s = &self.scoring;
        if s.recency_weight < 0.0 || s.link_weight < 0.0 || s.semantic_weight < 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring weights must be non-negative".into(),
            ));
        }

        if !(0.0..=100.0).contains(&s.semantic_threshold) {
            return Err(ConfigError::ValidationError(
                "scoring.semantic_threshold must be between 0 and 100".into(),
            ));
        }

        if !(0..=MAX_ACTIVE_WINDOW_DAYS).contains(&self.projects.active_window_days) {
            return Err(ConfigError::ValidationError(format!(
                "projects.active_window_days must be between 0 and {MAX_ACTIVE_WINDOW_DAYS}"
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} has invalid value '{value}'")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
