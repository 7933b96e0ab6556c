//! Agent error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Store error: {0}")]
    Store(#[from] minirag_store::StoreError),

    #[error("Core error: {0}")]
    Core(#[from] minirag_core::CoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
