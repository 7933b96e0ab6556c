//! Librarian Agent - Builds the retrieval stores from a corpus

use crate::{Embedder, Result};
use minirag_core::{Document, Vocabulary};
use minirag_store::{EntityGraph, StoreError, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The read-only stores every retrieval strategy works against
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub vectors: Arc<VectorStore>,
    pub graph: Arc<EntityGraph>,
    pub vocabulary: Arc<Vocabulary>,
}

/// The Librarian agent handles corpus indexing
pub struct LibrarianAgent<E> {
    embedder: E,
    vocabulary: Arc<Vocabulary>,
}

impl<E: Embedder> LibrarianAgent<E> {
    /// Create a new Librarian agent
    pub fn new(embedder: E, vocabulary: Vocabulary) -> Self {
        Self {
            embedder,
            vocabulary: Arc::new(vocabulary),
        }
    }

    /// Embed the corpus and extract its entity graph
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn index(&self, documents: Vec<Document>) -> Result<KnowledgeBase> {
        if documents.is_empty() {
            return Err(StoreError::EmptyCorpus.into());
        }
        info!("Indexing {} documents", documents.len());

        debug!("Generating document embeddings...");
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let graph = EntityGraph::build(&documents, &self.vocabulary);
        let vectors = VectorStore::build(documents, embeddings)?;

        info!(
            "Indexed {} documents ({} dims), {} entities",
            vectors.len(),
            vectors.dimension(),
            graph.stats().entity_count
        );

        Ok(KnowledgeBase {
            vectors: Arc::new(vectors),
            graph: Arc::new(graph),
            vocabulary: Arc::clone(&self.vocabulary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentError, HashEmbedder};
    use minirag_core::sample_corpus;

    #[tokio::test]
    async fn test_index_sample_corpus() {
        let librarian = LibrarianAgent::new(HashEmbedder::new(128), Vocabulary::default());
        let kb = librarian.index(sample_corpus()).await.unwrap();

        assert_eq!(kb.vectors.len(), 10);
        assert_eq!(kb.vectors.dimension(), 128);
        assert_eq!(kb.graph.stats().entity_count, 23);
        assert_eq!(kb.vocabulary.entities.len(), 23);
    }

    #[tokio::test]
    async fn test_index_empty_corpus() {
        let librarian = LibrarianAgent::new(HashEmbedder::default(), Vocabulary::default());
        let err = librarian.index(Vec::new()).await.unwrap_err();

        assert!(matches!(err, AgentError::Store(StoreError::EmptyCorpus)));
    }
}
