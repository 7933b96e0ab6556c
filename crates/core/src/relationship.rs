//! Relationship types - labelled co-occurrence edges between entities

use serde::{Deserialize, Serialize};

/// A relationship between two entities found in one document.
///
/// The graph stores relationships undirected; `source`/`target` only record
/// the orientation of the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,

    /// Relation label, e.g. `located_in`
    pub relation: String,

    /// Document the relationship was detected in
    pub doc_id: String,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            doc_id: doc_id.into(),
        }
    }
}

/// Render one traversed hop as a context snippet: `from --(relation)--> to`
pub fn hop_snippet(from: &str, relation: &str, to: &str) -> String {
    format!("{} --({})--> {}", from, relation, to)
}
