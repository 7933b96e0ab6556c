//! Keyword-overlap evaluation and the built-in benchmark suites

use crate::{Embedder, Result, SearchAgent};
use chrono::{DateTime, Utc};
use minirag_core::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// Scores for one generated answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Share of expected keywords present in the answer
    pub faithfulness: f64,
    /// Share of query terms present in the answer
    pub relevance: f64,
}

/// Score an answer by keyword overlap.
///
/// Matching is case-insensitive substring containment. Query terms are the
/// distinct whitespace-separated words longer than two characters. An empty
/// keyword or term set scores 0.
pub fn evaluate<S: AsRef<str>>(query: &str, expected_keywords: &[S], answer: &str) -> Evaluation {
    let answer = answer.to_lowercase();

    let keywords: BTreeSet<String> = expected_keywords
        .iter()
        .map(|kw| kw.as_ref().to_lowercase())
        .collect();
    let terms: BTreeSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .filter(|term| term.chars().count() > 2)
        .map(str::to_string)
        .collect();

    Evaluation {
        faithfulness: overlap(&keywords, &answer),
        relevance: overlap(&terms, &answer),
    }
}

fn overlap(needles: &BTreeSet<String>, haystack: &str) -> f64 {
    if needles.is_empty() {
        return 0.0;
    }
    let hits = needles.iter().filter(|n| haystack.contains(n.as_str())).count();
    hits as f64 / needles.len() as f64
}

/// A retrieval strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Vector,
    Graph,
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Vector, Strategy::Graph, Strategy::Hybrid];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Vector => write!(f, "vector"),
            Strategy::Graph => write!(f, "graph"),
            Strategy::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" => Ok(Strategy::Vector),
            "graph" => Ok(Strategy::Graph),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(CoreError::Validation(format!("unknown strategy: {}", other))),
        }
    }
}

/// A query with the keywords a good answer should mention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkQuery {
    pub query: &'static str,
    pub expected_keywords: &'static [&'static str],
}

const fn bq(query: &'static str, expected_keywords: &'static [&'static str]) -> BenchmarkQuery {
    BenchmarkQuery {
        query,
        expected_keywords,
    }
}

const VECTOR_BENCHMARK: [BenchmarkQuery; 5] = [
    bq("What is the capital of France?", &["paris", "eiffel tower"]),
    bq("Tell me about the highest mountain.", &["mount everest", "himalayas"]),
    bq(
        "Which creatures live in the Amazon rainforest?",
        &["jaguars", "toucans", "biodiversity"],
    ),
    bq("What is the importance of H2O?", &["water", "life", "earth's surface"]),
    bq("Describe machine learning.", &["artificial intelligence", "learn from data"]),
];

const GRAPH_BENCHMARK: [BenchmarkQuery; 5] = [
    bq(
        "What city is the Eiffel Tower in and what country is it the capital of?",
        &["paris", "france", "eiffel tower"],
    ),
    bq("Tell me about the biggest mountain and its range.", &["mount everest", "himalayas"]),
    bq(
        "What animals are found in the large forest?",
        &["jaguars", "toucans", "amazon rainforest"],
    ),
    bq(
        "Can you explain the connection between machine learning and AI?",
        &["machine learning", "artificial intelligence", "part of"],
    ),
    bq(
        "Which bridge connects San Francisco to Marin County and where is it located?",
        &["golden gate bridge", "san francisco", "california"],
    ),
];

const HYBRID_BENCHMARK: [BenchmarkQuery; 5] = [
    bq(
        "What is the capital of France and what famous landmark is there?",
        &["paris", "eiffel tower", "france"],
    ),
    bq(
        "Which mountain is the highest and in what range is it located?",
        &["mount everest", "himalayas"],
    ),
    bq(
        "Tell me about the animals in the largest rainforest.",
        &["jaguars", "toucans", "amazon rainforest"],
    ),
    bq(
        "What is AI and how does machine learning relate to it?",
        &["machine learning", "artificial intelligence", "part of"],
    ),
    bq(
        "What is a characteristic of dogs, and what's a common breed?",
        &["loyalty", "golden retrievers", "german shepherds"],
    ),
];

/// The benchmark queries for a strategy
pub fn benchmark_queries(strategy: Strategy) -> &'static [BenchmarkQuery] {
    match strategy {
        Strategy::Vector => &VECTOR_BENCHMARK,
        Strategy::Graph => &GRAPH_BENCHMARK,
        Strategy::Hybrid => &HYBRID_BENCHMARK,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryEvaluation {
    pub query: String,
    pub answer: String,
    pub evaluation: Evaluation,
}

/// Per-query scores and their averages for one strategy
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub strategy: Strategy,
    pub top_k: usize,
    pub results: Vec<QueryEvaluation>,
    pub average_faithfulness: f64,
    pub average_relevance: f64,
    pub generated_at: DateTime<Utc>,
}

impl EvaluationReport {
    fn new(strategy: Strategy, top_k: usize, results: Vec<QueryEvaluation>) -> Self {
        let mean = |score: fn(&Evaluation) -> f64| {
            if results.is_empty() {
                0.0
            } else {
                results.iter().map(|r| score(&r.evaluation)).sum::<f64>() / results.len() as f64
            }
        };
        let average_faithfulness = mean(|e| e.faithfulness);
        let average_relevance = mean(|e| e.relevance);

        Self {
            strategy,
            top_k,
            results,
            average_faithfulness,
            average_relevance,
            generated_at: Utc::now(),
        }
    }
}

/// Answer every benchmark query of `strategy` and score the answers
#[instrument(skip(agent))]
pub async fn run_benchmark<E: Embedder>(
    agent: &SearchAgent<E>,
    strategy: Strategy,
    top_k: usize,
) -> Result<EvaluationReport> {
    let mut results = Vec::new();

    for item in benchmark_queries(strategy) {
        let answer = match strategy {
            Strategy::Vector => agent.vector_rag(item.query, top_k).await?.response,
            Strategy::Graph => agent.graph_rag(item.query).response,
            Strategy::Hybrid => agent.hybrid_rag(item.query, top_k).await?.response,
        };
        let evaluation = evaluate(item.query, item.expected_keywords, &answer);
        results.push(QueryEvaluation {
            query: item.query.to_string(),
            answer,
            evaluation,
        });
    }

    let report = EvaluationReport::new(strategy, top_k, results);
    info!(
        "{} RAG average faithfulness {:.2}, relevance {:.2}",
        strategy, report.average_faithfulness, report.average_relevance
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashEmbedder, LibrarianAgent};
    use minirag_core::{sample_corpus, Vocabulary};

    #[test]
    fn test_evaluate_example() {
        let evaluation = evaluate("capital of France", &["paris"], "the capital is Paris");

        assert_eq!(evaluation.faithfulness, 1.0);
        // "of" is too short to count; "france" is missing
        assert_eq!(evaluation.relevance, 0.5);
    }

    #[test]
    fn test_evaluate_empty_sets_score_zero() {
        let none: [&str; 0] = [];
        let evaluation = evaluate("a to", &none, "anything");

        assert_eq!(evaluation.faithfulness, 0.0);
        assert_eq!(evaluation.relevance, 0.0);
    }

    #[test]
    fn test_evaluate_counts_distinct_keywords() {
        let evaluation = evaluate("dogs", &["Loyalty", "loyalty", "breeds"], "known for loyalty");

        assert_eq!(evaluation.faithfulness, 0.5);
        assert_eq!(evaluation.relevance, 0.0);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Hybrid".parse::<Strategy>().unwrap(), Strategy::Hybrid);
        assert!("bm25".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Graph.to_string(), "graph");
    }

    #[tokio::test]
    async fn test_run_every_benchmark() {
        let embedder = HashEmbedder::default();
        let kb = LibrarianAgent::new(embedder.clone(), Vocabulary::default())
            .index(sample_corpus())
            .await
            .unwrap();
        let agent = SearchAgent::new(kb, embedder);

        for strategy in Strategy::ALL {
            let report = run_benchmark(&agent, strategy, 2).await.unwrap();

            assert_eq!(report.strategy, strategy);
            assert_eq!(report.results.len(), 5);
            assert!((0.0..=1.0).contains(&report.average_faithfulness));
            assert!((0.0..=1.0).contains(&report.average_relevance));
        }
    }

    #[tokio::test]
    async fn test_hybrid_benchmark_finds_paris() {
        let embedder = HashEmbedder::default();
        let kb = LibrarianAgent::new(embedder.clone(), Vocabulary::default())
            .index(sample_corpus())
            .await
            .unwrap();
        let agent = SearchAgent::new(kb, embedder);

        let report = run_benchmark(&agent, Strategy::Hybrid, 2).await.unwrap();
        let first = &report.results[0];

        assert!(first
            .answer
            .starts_with("Based on the information, the capital of France is Paris."));
        assert!(first.evaluation.faithfulness > 0.0);
    }
}
