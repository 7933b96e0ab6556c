//! In-memory entity graph
//!
//! An undirected petgraph graph with one labelled edge per endpoint pair,
//! plus a name index. Built once from the corpus and read-only afterwards.

use crate::{Result, StoreError};
use minirag_core::{
    extract, hop_snippet, Document, Entity, EntityMatching, ExtractedEntity, Relationship,
    Vocabulary,
};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// Attributes stored on an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub relation: String,
    pub doc_id: String,
}

/// Outcome of ingesting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub entities_created: usize,
    pub entities_updated: usize,
    pub relationships_added: usize,
    /// Relationships dropped because an endpoint is not a node
    pub skipped: Vec<Relationship>,
}

/// Node and edge counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub entity_count: usize,
    pub relationship_count: usize,
    pub skipped_relationship_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    graph: UnGraph<Entity, EdgeData>,
    /// Entity name -> node, in name order
    index: BTreeMap<String, NodeIndex>,
    skipped: Vec<Relationship>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every document of the corpus into a new graph
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn build(documents: &[Document], vocabulary: &Vocabulary) -> Self {
        let mut graph = Self::new();
        for document in documents {
            graph.ingest(document, vocabulary);
        }

        let stats = graph.stats();
        info!(
            "Graph created with {} nodes and {} edges ({} relationships skipped)",
            stats.entity_count, stats.relationship_count, stats.skipped_relationship_count
        );
        graph
    }

    /// Extract one document and merge it into the graph.
    ///
    /// Entities are merged before relationships so edges between entities
    /// first seen in this document are kept.
    pub fn ingest(&mut self, document: &Document, vocabulary: &Vocabulary) -> IngestReport {
        let extraction = extract(document, vocabulary);
        let mut report = IngestReport::default();

        for entity in &extraction.entities {
            if self.upsert_entity(entity, &document.text) {
                report.entities_created += 1;
            } else {
                report.entities_updated += 1;
            }
        }

        for relationship in extraction.relationships {
            match self.add_relationship(&relationship) {
                Ok(()) => report.relationships_added += 1,
                Err(e) => {
                    debug!(
                        "Skipping {} --({})--> {} from {}: {}",
                        relationship.source,
                        relationship.relation,
                        relationship.target,
                        relationship.doc_id,
                        e
                    );
                    self.skipped.push(relationship.clone());
                    report.skipped.push(relationship);
                }
            }
        }

        report
    }

    /// Create the node or append the text to it. Returns true when created.
    pub fn upsert_entity(&mut self, extracted: &ExtractedEntity, text: &str) -> bool {
        match self.index.get(&extracted.name) {
            Some(&node) => {
                self.graph[node].add_source_text(text);
                false
            }
            None => {
                let mut entity = Entity::new(
                    &extracted.name,
                    &extracted.entity_type,
                    &extracted.doc_id,
                );
                entity.add_source_text(text);
                let node = self.graph.add_node(entity);
                self.index.insert(extracted.name.clone(), node);
                true
            }
        }
    }

    /// Add or overwrite the edge between two existing entities
    pub fn add_relationship(&mut self, relationship: &Relationship) -> Result<()> {
        let source = self.node(&relationship.source)?;
        let target = self.node(&relationship.target)?;

        let data = EdgeData {
            relation: relationship.relation.clone(),
            doc_id: relationship.doc_id.clone(),
        };
        self.graph.update_edge(source, target, data);
        Ok(())
    }

    fn node(&self, name: &str) -> Result<NodeIndex> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownEntity(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn entity(&self, name: &str) -> Result<&Entity> {
        self.node(name).map(|node| &self.graph[node])
    }

    /// All entities in name order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.index.values().map(|&node| &self.graph[node])
    }

    /// Direct neighbours with the connecting edge, in name order
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = (&'a str, &'a EdgeData)> {
        let mut neighbors: Vec<(&'a str, &'a EdgeData)> = match self.index.get(name) {
            Some(&node) => self
                .graph
                .edges(node)
                .map(|edge| {
                    let other = if edge.source() == node {
                        edge.target()
                    } else {
                        edge.source()
                    };
                    (self.graph[other].name.as_str(), edge.weight())
                })
                .collect(),
            None => Vec::new(),
        };
        neighbors.sort_by(|a, b| a.0.cmp(b.0));
        neighbors.into_iter()
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&EdgeData> {
        let (a, b) = (self.index.get(a)?, self.index.get(b)?);
        self.graph.find_edge(*a, *b).map(|edge| &self.graph[edge])
    }

    pub fn skipped_relationships(&self) -> &[Relationship] {
        &self.skipped
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            entity_count: self.graph.node_count(),
            relationship_count: self.graph.edge_count(),
            skipped_relationship_count: self.skipped.len(),
        }
    }

    /// Entities whose name occurs case-insensitively in `text`
    pub fn entities_mentioned_in(&self, text: &str) -> Vec<&str> {
        let text = text.to_lowercase();
        self.index
            .keys()
            .filter(|name| text.contains(&name.to_lowercase()))
            .map(String::as_str)
            .collect()
    }

    /// Map text to graph entities with the requested breadth.
    ///
    /// Names that are not graph nodes are dropped silently.
    pub fn resolve_entities<'a>(
        &'a self,
        text: &str,
        vocabulary: &'a Vocabulary,
        matching: EntityMatching,
    ) -> Vec<&'a str> {
        match matching {
            EntityMatching::QueryIntents => vocabulary
                .match_query_intents(text)
                .into_iter()
                .filter(|name| self.contains(name))
                .collect(),
            EntityMatching::FullVocabulary => self.entities_mentioned_in(text),
        }
    }

    /// One-hop expansion around the given entities.
    ///
    /// Collects each entity's source texts, each neighbour's source texts and
    /// one `entity --(relation)--> neighbor` line per traversed edge.
    pub fn expand<S: AsRef<str>>(&self, entities: &[S]) -> BTreeSet<String> {
        let mut snippets = BTreeSet::new();

        for name in entities {
            let name = name.as_ref();
            let Some(&node) = self.index.get(name) else {
                debug!("Ignoring unknown entity {}", name);
                continue;
            };
            snippets.extend(self.graph[node].source_texts.iter().cloned());

            for edge in self.graph.edges(node) {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                let neighbor = &self.graph[other];
                snippets.extend(neighbor.source_texts.iter().cloned());
                snippets.insert(hop_snippet(name, &edge.weight().relation, &neighbor.name));
            }
        }

        snippets
    }
}
