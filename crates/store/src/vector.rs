//! Flat nearest-neighbour index over document embeddings

use crate::{Result, StoreError};
use minirag_core::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A document returned by a vector search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    /// Squared L2 distance to the query
    pub distance: f32,
}

/// Exhaustive squared-L2 index. Documents and embeddings are parallel.
#[derive(Debug, Clone)]
pub struct VectorStore {
    documents: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
}

impl VectorStore {
    /// Build the index. Every embedding must share the first one's dimension.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn build(documents: Vec<Document>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(StoreError::LengthMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(StoreError::InvalidEmbeddingDimension {
                expected: dimension,
                actual: bad.len(),
            });
        }

        debug!("Indexed {} embeddings of dimension {}", embeddings.len(), dimension);

        Ok(Self {
            documents,
            embeddings,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Check `top_k` against the corpus size
    pub fn validate_top_k(&self, top_k: usize) -> Result<()> {
        if self.is_empty() {
            return Err(StoreError::EmptyCorpus);
        }
        if top_k == 0 || top_k > self.len() {
            return Err(StoreError::InvalidTopK {
                top_k,
                corpus_size: self.len(),
            });
        }
        Ok(())
    }

    /// The `top_k` nearest documents, by non-decreasing distance.
    ///
    /// Equal distances keep corpus order.
    #[instrument(skip(self, query))]
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>> {
        self.validate_top_k(top_k)?;
        if query.len() != self.dimension {
            return Err(StoreError::InvalidEmbeddingDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, embedding)| (i, squared_l2(query, embedding)))
            .collect();

        // stable sort keeps index order among ties
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| ScoredDocument {
                document: self.documents[i].clone(),
                distance,
            })
            .collect())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VectorStore {
        let documents = Document::from_texts(["a", "b", "c", "d"]);
        let embeddings = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![1.0, 0.0],
        ];
        VectorStore::build(documents, embeddings).unwrap()
    }

    #[test]
    fn test_search_orders_by_distance() {
        let results = store().search(&[0.9, 0.0], 4).unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(results[3].document.text, "c");
    }

    #[test]
    fn test_search_returns_exactly_top_k() {
        let store = store();
        for k in 1..=store.len() {
            assert_eq!(store.search(&[0.0, 0.0], k).unwrap().len(), k);
        }
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let results = store().search(&[1.0, 0.0], 2).unwrap();

        assert_eq!(results[0].document.index, 1);
        assert_eq!(results[1].document.index, 3);
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn test_invalid_top_k() {
        let store = store();

        assert_eq!(
            store.search(&[0.0, 0.0], 0).unwrap_err(),
            StoreError::InvalidTopK { top_k: 0, corpus_size: 4 }
        );
        assert_eq!(
            store.search(&[0.0, 0.0], 5).unwrap_err(),
            StoreError::InvalidTopK { top_k: 5, corpus_size: 4 }
        );
    }

    #[test]
    fn test_empty_corpus() {
        let store = VectorStore::build(Vec::new(), Vec::new()).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.search(&[], 1).unwrap_err(), StoreError::EmptyCorpus);
    }

    #[test]
    fn test_build_validation() {
        let err = VectorStore::build(Document::from_texts(["a"]), Vec::new()).unwrap_err();
        assert_eq!(
            err,
            StoreError::LengthMismatch { documents: 1, embeddings: 0 }
        );

        let err = VectorStore::build(
            Document::from_texts(["a", "b"]),
            vec![vec![0.0, 1.0], vec![0.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidEmbeddingDimension { expected: 2, actual: 1 }
        );

        assert!(matches!(
            store().search(&[0.0], 1),
            Err(StoreError::InvalidEmbeddingDimension { expected: 2, actual: 1 })
        ));
    }
}
