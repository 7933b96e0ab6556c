//! Entity types - named concepts detected in documents

use serde::{Deserialize, Serialize};

/// A node of the entity graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical name, also the graph key
    pub name: String,

    /// Free-form category ("City", "Mountain Range", ...)
    pub entity_type: String,

    /// Doc id of the first document the entity was detected in
    pub first_seen_in: String,

    /// Texts of every document the entity was detected in, in ingestion order.
    /// Append-only.
    #[serde(default)]
    pub source_texts: Vec<String>,
}

impl Entity {
    /// Create a new entity
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        first_seen_in: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            first_seen_in: first_seen_in.into(),
            source_texts: Vec::new(),
        }
    }

    /// Record another document the entity appeared in
    pub fn add_source_text(&mut self, text: impl Into<String>) {
        self.source_texts.push(text.into());
    }

    /// Case-insensitive check whether the entity name occurs in `text`
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.name.to_lowercase())
    }
}

/// An entity detected in one document by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub name: String,
    pub entity_type: String,
    pub doc_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let mut entity = Entity::new("Paris", "City", "doc_1");
        entity.add_source_text("Paris text");
        entity.add_source_text("Paris text");

        assert_eq!(entity.name, "Paris");
        assert_eq!(entity.entity_type, "City");
        assert_eq!(entity.first_seen_in, "doc_1");
        assert_eq!(entity.source_texts.len(), 2);
    }

    #[test]
    fn test_is_mentioned_in() {
        let entity = Entity::new("Eiffel Tower", "Landmark", "doc_1");

        assert!(entity.is_mentioned_in("what about the EIFFEL tower?"));
        assert!(!entity.is_mentioned_in("the tower of eiffel"));
    }
}
