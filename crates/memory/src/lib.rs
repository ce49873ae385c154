//! In-memory collaborator implementations for ContextLoom.
//!
//! Hosts that keep their corpus in memory (and the engine's own tests) use
//! these instead of a persistent store or vector database.

pub mod in_memory;
pub mod vector;

pub use in_memory::InMemoryDocumentStore;
pub use vector::{InMemoryVectorIndex, cosine_similarity};
