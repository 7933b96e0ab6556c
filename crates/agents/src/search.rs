//! Search Agent - vector, graph and hybrid retrieval over a knowledge base

use crate::inference::env_usize;
use crate::{AnswerStub, Embedder, KnowledgeBase, Result};
use minirag_core::EntityMatching;
use minirag_store::ScoredDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

const DEFAULT_TOP_K: usize = 2;

/// Retrieval knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Vector candidates per query
    pub top_k: usize,
    /// Entity matching breadth for plain graph retrieval
    pub graph_matching: EntityMatching,
    /// Entity matching breadth for hybrid retrieval
    pub hybrid_matching: EntityMatching,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            graph_matching: EntityMatching::QueryIntents,
            hybrid_matching: EntityMatching::FullVocabulary,
        }
    }
}

impl SearchConfig {
    /// Defaults with `top_k` from `RAG_TOP_K`. The value is validated per
    /// query like any other `top_k`, so `RAG_TOP_K=0` fails the same way.
    pub fn from_env() -> Self {
        Self {
            top_k: env_usize("RAG_TOP_K").unwrap_or(DEFAULT_TOP_K),
            ..Self::default()
        }
    }
}

/// Which retrieval output became the answer context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Graph,
    Vector,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorAnswer {
    pub response: String,
    pub documents: Vec<ScoredDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphAnswer {
    pub response: String,
    pub entities: Vec<String>,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HybridAnswer {
    pub response: String,
    pub vector_documents: Vec<ScoredDocument>,
    pub entities: Vec<String>,
    pub graph_snippets: Vec<String>,
    pub context_source: ContextSource,
    pub context: String,
}

/// Pick the answer context: graph snippets when there are any, otherwise
/// the vector documents. The two are never blended.
pub fn select_context(
    graph_snippets: &[String],
    vector_documents: &[ScoredDocument],
) -> (ContextSource, String) {
    if graph_snippets.is_empty() {
        let context = vector_documents
            .iter()
            .map(|scored| scored.document.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        (ContextSource::Vector, context)
    } else {
        (ContextSource::Graph, graph_snippets.join("\n"))
    }
}

/// The Search agent answers queries
#[derive(Clone)]
pub struct SearchAgent<E> {
    kb: KnowledgeBase,
    embedder: E,
    answerer: AnswerStub,
    config: SearchConfig,
}

impl<E: Embedder> SearchAgent<E> {
    /// Create a new Search agent
    pub fn new(kb: KnowledgeBase, embedder: E) -> Self {
        Self {
            kb,
            embedder,
            answerer: AnswerStub::default(),
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_answerer(mut self, answerer: AnswerStub) -> Self {
        self.answerer = answerer;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Nearest documents to the query
    #[instrument(skip(self))]
    pub async fn retrieve_documents(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>> {
        // fail before paying for an embedding call
        self.kb.vectors.validate_top_k(top_k)?;

        debug!("Generating query embedding...");
        let embedding = self.embedder.embed(query).await?;
        let documents = self.kb.vectors.search(&embedding, top_k)?;

        debug!("Retrieved {} documents", documents.len());
        Ok(documents)
    }

    /// Graph entities for `text` and their one-hop snippets
    pub fn expand_graph(&self, text: &str, matching: EntityMatching) -> (Vec<String>, Vec<String>) {
        let entities = self
            .kb
            .graph
            .resolve_entities(text, &self.kb.vocabulary, matching);
        let snippets: BTreeSet<String> = self.kb.graph.expand(&entities);

        (
            entities.into_iter().map(str::to_string).collect(),
            snippets.into_iter().collect(),
        )
    }

    /// Vector-only RAG
    #[instrument(skip(self))]
    pub async fn vector_rag(&self, query: &str, top_k: usize) -> Result<VectorAnswer> {
        info!("Vector retrieval for: {}", query);

        let documents = self.retrieve_documents(query, top_k).await?;
        let context = documents
            .iter()
            .map(|scored| scored.document.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let response = self.answerer.generate(query, Some(&context));

        Ok(VectorAnswer {
            response,
            documents,
        })
    }

    /// Graph-only RAG with the configured matching breadth
    pub fn graph_rag(&self, query: &str) -> GraphAnswer {
        self.graph_rag_with(query, self.config.graph_matching)
    }

    /// Graph-only RAG
    #[instrument(skip(self))]
    pub fn graph_rag_with(&self, query: &str, matching: EntityMatching) -> GraphAnswer {
        info!("Graph retrieval for: {}", query);

        let (entities, snippets) = self.expand_graph(query, matching);
        debug!("Matched entities {:?}, {} snippets", entities, snippets.len());

        let context = snippets.join("\n");
        let response = self.answerer.generate(query, Some(&context));

        GraphAnswer {
            response,
            entities,
            snippets,
        }
    }

    /// Hybrid RAG with the configured matching breadth
    pub async fn hybrid_rag(&self, query: &str, top_k: usize) -> Result<HybridAnswer> {
        self.hybrid_rag_with(query, top_k, self.config.hybrid_matching)
            .await
    }

    /// Hybrid RAG.
    ///
    /// Vector hits seed entity detection over the query plus their text; the
    /// graph neighbourhood of those entities replaces the vector hits as
    /// context whenever it is non-empty.
    #[instrument(skip(self))]
    pub async fn hybrid_rag_with(
        &self,
        query: &str,
        top_k: usize,
        matching: EntityMatching,
    ) -> Result<HybridAnswer> {
        info!("Hybrid retrieval for: {}", query);

        let vector_documents = self.retrieve_documents(query, top_k).await?;

        let mut candidate_text = query.to_string();
        for scored in &vector_documents {
            candidate_text.push(' ');
            candidate_text.push_str(&scored.document.text);
        }

        let (entities, graph_snippets) = self.expand_graph(&candidate_text, matching);
        let (context_source, context) = select_context(&graph_snippets, &vector_documents);
        debug!(
            "Matched {} entities, {} snippets, context from {:?}",
            entities.len(),
            graph_snippets.len(),
            context_source
        );

        let response = self.answerer.generate(query, Some(&context));

        Ok(HybridAnswer {
            response,
            vector_documents,
            entities,
            graph_snippets,
            context_source,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentError, HashEmbedder, LibrarianAgent};
    use minirag_core::{sample_corpus, Document, Vocabulary};
    use minirag_store::StoreError;

    async fn sample_agent() -> SearchAgent<HashEmbedder> {
        let embedder = HashEmbedder::default();
        let kb = LibrarianAgent::new(embedder.clone(), Vocabulary::default())
            .index(sample_corpus())
            .await
            .unwrap();
        SearchAgent::new(kb, embedder)
    }

    fn scored(index: usize, text: &str) -> ScoredDocument {
        ScoredDocument {
            document: Document::new(index, text),
            distance: 0.5,
        }
    }

    #[test]
    fn test_select_context_prefers_graph() {
        let docs = vec![scored(0, "vector text")];
        let snippets = vec!["graph one".to_string(), "graph two".to_string()];

        let (source, context) = select_context(&snippets, &docs);

        assert_eq!(source, ContextSource::Graph);
        assert_eq!(context, "graph one\ngraph two");
    }

    #[test]
    fn test_select_context_falls_back_to_vector() {
        let docs = vec![scored(3, "first hit"), scored(1, "second hit")];

        let (source, context) = select_context(&[], &docs);

        assert_eq!(source, ContextSource::Vector);
        assert_eq!(context, "first hit\nsecond hit");
    }

    #[tokio::test]
    async fn test_vector_rag_ranks_paris_first() {
        let agent = sample_agent().await;
        let answer = agent
            .vector_rag("What is the capital of France?", 2)
            .await
            .unwrap();

        assert_eq!(answer.documents.len(), 2);
        assert_eq!(answer.documents[0].document.index, 0);
        assert!(answer.documents[0].distance <= answer.documents[1].distance);
        assert!(answer
            .response
            .starts_with("Based on the information, the capital of France is Paris."));
    }

    #[tokio::test]
    async fn test_vector_rag_rejects_bad_top_k() {
        let agent = sample_agent().await;

        for top_k in [0, 11] {
            let err = agent.vector_rag("anything", top_k).await.unwrap_err();
            assert!(matches!(
                err,
                AgentError::Store(StoreError::InvalidTopK { corpus_size: 10, .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_graph_rag_query_intents() {
        let agent = sample_agent().await;
        let heart = sample_corpus()[9].text.clone();

        let answer = agent.graph_rag("How does the human heart work?");

        assert_eq!(answer.entities, vec!["human heart"]);
        assert_eq!(
            answer.snippets,
            vec![heart, "human heart --(pumps)--> blood".to_string()]
        );
        assert!(answer
            .response
            .starts_with("The human heart is a muscular organ"));
    }

    #[tokio::test]
    async fn test_graph_rag_without_intent_has_no_context() {
        let agent = sample_agent().await;
        let answer = agent.graph_rag("Tell me about the biggest mountain and its range.");

        assert!(answer.entities.is_empty());
        assert!(answer.snippets.is_empty());
        assert_eq!(
            answer.response,
            "I don't have specific context for 'Tell me about the biggest mountain and its range.'. Can you provide more details?"
        );

        let broad = agent.graph_rag_with(
            "Tell me about Mount Everest",
            EntityMatching::FullVocabulary,
        );
        assert_eq!(broad.entities, vec!["Mount Everest"]);
    }

    #[tokio::test]
    async fn test_graph_rag_is_idempotent() {
        let agent = sample_agent().await;
        let query = "Is the Golden Gate bridge near water?";

        let first = agent.graph_rag(query);
        let second = agent.graph_rag(query);

        assert_eq!(first.snippets, second.snippets);
        assert_eq!(first.response, second.response);
    }

    #[tokio::test]
    async fn test_hybrid_graph_overrides_vector() {
        let agent = sample_agent().await;
        let answer = agent
            .hybrid_rag("What is the capital of France?", 2)
            .await
            .unwrap();

        assert_eq!(answer.vector_documents[0].document.index, 0);
        for entity in ["France", "Paris", "Eiffel Tower"] {
            assert!(answer.entities.iter().any(|e| e == entity), "missing {}", entity);
        }
        assert!(answer
            .graph_snippets
            .contains(&"Paris --(is_capital_of)--> France".to_string()));
        assert!(answer
            .graph_snippets
            .contains(&"Eiffel Tower --(located_in)--> Paris".to_string()));

        assert_eq!(answer.context_source, ContextSource::Graph);
        assert_eq!(answer.context, answer.graph_snippets.join("\n"));
    }

    #[tokio::test]
    async fn test_hybrid_falls_back_without_entities() {
        let embedder = HashEmbedder::default();
        let corpus = Document::from_texts([
            "Cats sleep for most of the afternoon.",
            "Rivers carry sediment toward the ocean.",
            "Violins have four strings.",
        ]);
        let kb = LibrarianAgent::new(embedder.clone(), Vocabulary::default())
            .index(corpus)
            .await
            .unwrap();
        let agent = SearchAgent::new(kb, embedder);

        let answer = agent.hybrid_rag("Where do rivers go?", 2).await.unwrap();

        assert!(answer.entities.is_empty());
        assert!(answer.graph_snippets.is_empty());
        assert_eq!(answer.context_source, ContextSource::Vector);
        let expected: Vec<&str> = answer
            .vector_documents
            .iter()
            .map(|d| d.document.text.as_str())
            .collect();
        assert_eq!(answer.context, expected.join("\n"));
        assert_eq!(answer.vector_documents[0].document.index, 1);
    }
}
