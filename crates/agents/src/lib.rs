//! Retrieval agents for MiniRAG
//!
//! This crate contains the agent implementations:
//! - Librarian: Embeds the corpus and builds the entity graph
//! - Search: Answers queries with vector, graph or hybrid retrieval
//! - Evaluation: Scores answers against the benchmark suites

pub mod librarian;
pub mod search;
pub mod answer;
pub mod evaluation;
pub mod inference;
pub mod error;

pub use librarian::{KnowledgeBase, LibrarianAgent};
pub use search::{
    select_context, ContextSource, GraphAnswer, HybridAnswer, SearchAgent, SearchConfig,
    VectorAnswer,
};
pub use answer::{AnswerRule, AnswerStub};
pub use evaluation::{
    benchmark_queries, evaluate, run_benchmark, BenchmarkQuery, Evaluation, EvaluationReport,
    QueryEvaluation, Strategy,
};
pub use inference::{ConfiguredEmbedder, Embedder, HashEmbedder, TeiClient};
pub use error::{AgentError, Result};
