//! The adaptive context retrieval engine.
//!
//! Given a focal document, a query, and a token budget, decides which
//! other documents in an interlinked corpus to include as supporting
//! context and packs them into a bounded window.
//!
//! | Component | Module | Needs embeddings |
//! |-----------|--------|------------------|
//! | Link Graph Index | [`graph`] | no |
//! | Relevance Scorer | [`relevance`] | no (optional semantic term) |
//! | Project Boundary Detector | [`boundary`] | no |
//! | Context Assembler | [`context`] | yes |
//!
//! # Concurrency
//!
//! Every operation is `async` and suspends only on collaborator calls.
//! Nothing here spawns tasks or locks: the only state shared across calls
//! is the caller-owned [`LinkGraphCache`], which takes `&mut self` and so
//! cannot be rebuilt twice at once. Cancellation is by dropping the future;
//! no partial result is produced.

pub mod boundary;
pub mod context;
pub mod graph;
pub mod relevance;

pub use boundary::ProjectBoundaryDetector;
pub use context::{AssemblyRequest, ContextAssembler};
pub use graph::{LinkGraph, LinkGraphCache, MAX_HOPS, UNCONNECTED};
pub use relevance::RelevanceScorer;
