//! Documents - the immutable units of the corpus

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// The built-in demonstration corpus.
pub const SAMPLE_DOCUMENTS: [&str; 10] = [
    "Doc 1: The capital of France is Paris. Paris is known for its Eiffel Tower and delicious croissants.",
    "Doc 2: Mount Everest is the highest mountain in the world, located in the Himalayas. Scaling it is a huge challenge.",
    "Doc 3: The Amazon rainforest is the largest rainforest on Earth, home to incredible biodiversity, including jaguars and toucans.",
    "Doc 4: Water (H2O) is essential for all known forms of life. It covers about 71% of the Earth's surface.",
    "Doc 5: Machine learning is a field of artificial intelligence that enables systems to learn from data without explicit programming.",
    "Doc 6: The Golden Gate Bridge is an iconic suspension bridge spanning the Golden Gate strait in California, connecting San Francisco to Marin County.",
    "Doc 7: Renewable energy sources like solar and wind power are crucial for a sustainable future, reducing reliance on fossil fuels.",
    "Doc 8: Historical records indicate that ancient Egypt was a civilization of ancient Northeastern Africa, concentrated along the lower reaches of the Nile River.",
    "Doc 9: Dogs are domesticated mammals, known for their loyalty and diverse breeds like Golden Retrievers and German Shepherds.",
    "Doc 10: The human heart is a muscular organ that pumps blood through the circulatory system, supplying oxygen and nutrients to the body.",
];

/// A corpus document. Identity is its position in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Zero-based position in the corpus
    pub index: usize,

    /// The document text
    pub text: String,
}

impl Document {
    /// Create a document at a corpus position
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Human-facing identifier, `doc_1` for the first document
    pub fn doc_id(&self) -> String {
        format!("doc_{}", self.index + 1)
    }

    /// Number the given texts in order
    pub fn from_texts<I, S>(texts: I) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Document::new(index, text))
            .collect()
    }
}

/// The built-in sample corpus as documents
pub fn sample_corpus() -> Vec<Document> {
    Document::from_texts(SAMPLE_DOCUMENTS)
}

/// Parse a corpus from a JSON array of strings.
pub fn corpus_from_json(json: &str) -> Result<Vec<Document>> {
    let texts: Vec<String> = serde_json::from_str(json)?;

    if let Some(position) = texts.iter().position(|t| t.trim().is_empty()) {
        return Err(CoreError::Validation(format!(
            "document {} is empty",
            position + 1
        )));
    }

    Ok(Document::from_texts(texts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_corpus() {
        let corpus = sample_corpus();

        assert_eq!(corpus.len(), 10);
        assert_eq!(corpus[0].index, 0);
        assert_eq!(corpus[0].doc_id(), "doc_1");
        assert_eq!(corpus[9].doc_id(), "doc_10");
        assert!(corpus[0].text.contains("Eiffel Tower"));
    }

    #[test]
    fn test_corpus_from_json() {
        let corpus = corpus_from_json(r#"["first text", "second text"]"#).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[1], Document::new(1, "second text"));
    }

    #[test]
    fn test_corpus_from_json_rejects_blank_document() {
        let err = corpus_from_json(r#"["fine", "   "]"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = corpus_from_json(r#"{"not": "an array"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
