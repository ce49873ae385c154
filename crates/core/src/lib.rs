//! # ContextLoom Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! ContextLoom adaptive context retrieval engine. This crate has **no engine
//! logic**: it defines the model that the engine and every collaborator
//! implementation are written against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (document store, embedding service, vector
//! search) is a trait here. Implementations live elsewhere. This enables:
//! - Plugging the engine into any host document store
//! - Easy testing with in-memory or scripted implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod document;
pub mod embedding;
pub mod error;
pub mod retrieval;
pub mod search;

// Re-export key types at crate root for ergonomics
pub use document::{Document, DocumentId, DocumentStore};
pub use embedding::EmbeddingService;
pub use error::{EmbeddingError, Error, Result, SearchError, StoreError};
pub use retrieval::{
    AdaptiveContext, BoundaryKind, IncludedDocument, ProjectBoundary, RelevanceScore,
};
pub use search::{SearchHit, VectorSearch};
