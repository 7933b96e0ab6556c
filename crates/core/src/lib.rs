//! Core domain types for minirag
//!
//! This crate defines the fundamental data structures used throughout
//! the application: Documents, Entities, Relationships, the rule
//! Vocabulary and the extractor that applies it.

pub mod document;
pub mod entity;
pub mod relationship;
pub mod vocabulary;
pub mod extract;
pub mod text;
pub mod error;

pub use document::{corpus_from_json, sample_corpus, Document, SAMPLE_DOCUMENTS};
pub use entity::{Entity, ExtractedEntity};
pub use relationship::{hop_snippet, Relationship};
pub use vocabulary::{EntityMatching, EntityRule, QueryIntent, RelationRule, Trigger, Vocabulary};
pub use extract::{extract, Extraction};
pub use error::{CoreError, Result};
