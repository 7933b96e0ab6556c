//! Common test utilities

use minirag_agents::{HashEmbedder, KnowledgeBase, LibrarianAgent, SearchAgent};
use minirag_core::{sample_corpus, Document, Vocabulary};

/// Index `documents` with the offline embedder
pub async fn index(documents: Vec<Document>, vocabulary: Vocabulary) -> KnowledgeBase {
    LibrarianAgent::new(HashEmbedder::default(), vocabulary)
        .index(documents)
        .await
        .expect("Failed to index corpus")
}

/// Search agent over the sample corpus and default vocabulary
pub async fn sample_search_agent() -> SearchAgent<HashEmbedder> {
    let kb = index(sample_corpus(), Vocabulary::default()).await;
    SearchAgent::new(kb, HashEmbedder::default())
}
