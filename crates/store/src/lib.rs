//! Read-only retrieval stores for minirag
//!
//! Provides the flat vector index and the entity graph. Both are built
//! once from the corpus and only read afterwards.

pub mod error;
pub mod graph;
pub mod vector;

pub use error::{Result, StoreError};
pub use graph::{EdgeData, EntityGraph, GraphStats, IngestReport};
pub use vector::{ScoredDocument, VectorStore};
