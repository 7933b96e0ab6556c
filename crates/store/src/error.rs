//! Store error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Corpus is empty")]
    EmptyCorpus,

    #[error("Invalid top_k {top_k}: must be between 1 and the corpus size ({corpus_size})")]
    InvalidTopK { top_k: usize, corpus_size: usize },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidEmbeddingDimension { expected: usize, actual: usize },

    #[error("Got {embeddings} embeddings for {documents} documents")]
    LengthMismatch { documents: usize, embeddings: usize },
}

pub type Result<T> = std::result::Result<T, StoreError>;
