//! Budgeted context assembly.
//!
//! Combines a primary document with previews of its nearest semantic
//! neighbours, packed greedily until the token budget would overflow.

pub mod assembler;
pub mod token;

pub use assembler::{AssemblyRequest, ContextAssembler};
