//! Rule-based entity and relationship extraction

use crate::{Document, ExtractedEntity, Relationship, Vocabulary};
use serde::{Deserialize, Serialize};

/// Everything detected in one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub entities: Vec<ExtractedEntity>,
    pub relationships: Vec<Relationship>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}

/// Run every vocabulary rule against a document's text.
///
/// Entities come out in rule order with duplicate names dropped. Relationship
/// endpoints are not checked here; the graph builder decides whether both
/// ends exist.
pub fn extract(document: &Document, vocabulary: &Vocabulary) -> Extraction {
    let doc_id = document.doc_id();
    let text = document.text.as_str();

    let mut entities: Vec<ExtractedEntity> = Vec::new();
    for rule in &vocabulary.entities {
        if !rule.trigger.fires_on(text) || entities.iter().any(|e| e.name == rule.name) {
            continue;
        }
        entities.push(ExtractedEntity {
            name: rule.name.clone(),
            entity_type: rule.entity_type.clone(),
            doc_id: doc_id.clone(),
        });
    }

    let relationships = vocabulary
        .relations
        .iter()
        .filter(|rule| rule.fires_on(text))
        .map(|rule| Relationship::new(&rule.source, &rule.target, &rule.relation, &doc_id))
        .collect();

    Extraction {
        entities,
        relationships,
    }
}
