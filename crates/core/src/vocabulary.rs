//! Vocabulary - the declarative rule table driving entity detection
//!
//! Three rule kinds:
//! - entity rules: a name, a type and trigger substrings
//! - relationship rules: an (entity, entity, label) triple that fires when
//!   every trigger group is satisfied by the same text
//! - query intents: lower-case cues mapping a query to an entity for the
//!   narrow graph retrieval path

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A set of alternative substrings; satisfied when any one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger(pub Vec<String>);

impl Trigger {
    pub fn any<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(alternatives.into_iter().map(Into::into).collect())
    }

    /// Case-sensitive substring test
    pub fn fires_on(&self, text: &str) -> bool {
        self.0.iter().any(|needle| text.contains(needle.as_str()))
    }
}

/// Detects one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRule {
    pub name: String,
    pub entity_type: String,
    pub trigger: Trigger,
}

impl EntityRule {
    pub fn new(name: &str, entity_type: &str, trigger: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            trigger: Trigger::any(trigger.iter().copied()),
        }
    }

    /// Rule triggered by the entity name itself
    pub fn named(name: &str, entity_type: &str) -> Self {
        Self::new(name, entity_type, &[name])
    }
}

/// Detects one co-occurrence relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRule {
    pub source: String,
    pub target: String,
    pub relation: String,
    /// Every group must fire
    pub requires: Vec<Trigger>,
}

impl RelationRule {
    pub fn new(source: &str, target: &str, relation: &str, requires: &[&[&str]]) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation: relation.to_string(),
            requires: requires
                .iter()
                .map(|group| Trigger::any(group.iter().copied()))
                .collect(),
        }
    }

    /// Rule that fires when both endpoint names occur in the text
    pub fn between(source: &str, target: &str, relation: &str) -> Self {
        Self::new(source, target, relation, &[&[source], &[target]])
    }

    pub fn fires_on(&self, text: &str) -> bool {
        !self.requires.is_empty() && self.requires.iter().all(|t| t.fires_on(text))
    }
}

/// Maps lower-case query cues to an entity name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub entity: String,
    pub cues: Vec<String>,
}

impl QueryIntent {
    pub fn new(entity: &str, cues: &[&str]) -> Self {
        Self {
            entity: entity.to_string(),
            cues: cues.iter().map(|c| c.to_lowercase()).collect(),
        }
    }
}

/// How broadly a query is matched against the known entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityMatching {
    /// Only the fixed query intents (narrow, query text only)
    QueryIntents,
    /// Every graph entity whose name occurs in the text
    FullVocabulary,
}

impl fmt::Display for EntityMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityMatching::QueryIntents => write!(f, "query_intents"),
            EntityMatching::FullVocabulary => write!(f, "full_vocabulary"),
        }
    }
}

impl FromStr for EntityMatching {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "query_intents" | "intents" => Ok(EntityMatching::QueryIntents),
            "full_vocabulary" | "vocabulary" | "full" => Ok(EntityMatching::FullVocabulary),
            other => Err(CoreError::Validation(format!(
                "unknown entity matching mode: {}",
                other
            ))),
        }
    }
}

/// The complete rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub entities: Vec<EntityRule>,
    #[serde(default)]
    pub relations: Vec<RelationRule>,
    #[serde(default)]
    pub query_intents: Vec<QueryIntent>,
}

impl Vocabulary {
    /// Load and validate a vocabulary from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let vocabulary: Vocabulary = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject rules that could never fire or name nothing
    pub fn validate(&self) -> Result<()> {
        for rule in &self.entities {
            if rule.name.trim().is_empty() {
                return Err(CoreError::Validation("entity rule with empty name".into()));
            }
            if rule.trigger.0.is_empty() {
                return Err(CoreError::Validation(format!(
                    "entity rule '{}' has no trigger",
                    rule.name
                )));
            }
            if has_blank(&rule.trigger.0) {
                return Err(CoreError::Validation(format!(
                    "entity rule '{}' has an empty trigger",
                    rule.name
                )));
            }
        }
        for rule in &self.relations {
            if rule.relation.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "relation rule {} -> {} has empty label",
                    rule.source, rule.target
                )));
            }
            if rule.requires.is_empty() {
                return Err(CoreError::Validation(format!(
                    "relation rule '{}' has no trigger groups",
                    rule.relation
                )));
            }
            if rule
                .requires
                .iter()
                .any(|group| group.0.is_empty() || has_blank(&group.0))
            {
                return Err(CoreError::Validation(format!(
                    "relation rule '{}' has an empty trigger group entry",
                    rule.relation
                )));
            }
        }
        for intent in &self.query_intents {
            if intent.cues.is_empty() {
                return Err(CoreError::Validation(format!(
                    "query intent for '{}' has no cues",
                    intent.entity
                )));
            }
            if has_blank(&intent.cues) {
                return Err(CoreError::Validation(format!(
                    "query intent for '{}' has an empty cue",
                    intent.entity
                )));
            }
        }
        Ok(())
    }

    /// Entity names in rule order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|rule| rule.name.as_str())
    }

    /// Entities whose query intent cues occur in the query, in intent order.
    /// Cues match case-insensitively.
    pub fn match_query_intents(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        let mut matched: Vec<&str> = Vec::new();
        for intent in &self.query_intents {
            let hit = intent
                .cues
                .iter()
                .any(|cue| query.contains(&cue.to_lowercase()));
            if hit && !matched.contains(&intent.entity.as_str()) {
                matched.push(intent.entity.as_str());
            }
        }
        matched
    }
}

/// An empty needle matches every text
fn has_blank(needles: &[String]) -> bool {
    needles.iter().any(|needle| needle.trim().is_empty())
}

impl Default for Vocabulary {
    /// The vocabulary matching the sample corpus
    fn default() -> Self {
        let entities = vec![
            EntityRule::named("France", "Country"),
            EntityRule::named("Paris", "City"),
            EntityRule::named("Eiffel Tower", "Landmark"),
            EntityRule::named("Mount Everest", "Mountain"),
            EntityRule::named("Himalayas", "Mountain Range"),
            EntityRule::named("Amazon rainforest", "Forest"),
            EntityRule::named("biodiversity", "Concept"),
            EntityRule::named("jaguars", "Animal"),
            EntityRule::named("toucans", "Animal"),
            EntityRule::new("Water (H2O)", "Compound", &["Water", "H2O"]),
            EntityRule::named("Machine learning", "Field"),
            EntityRule::new("Artificial Intelligence", "Field", &["artificial intelligence"]),
            EntityRule::named("Golden Gate Bridge", "Bridge"),
            EntityRule::named("San Francisco", "City"),
            EntityRule::named("California", "State"),
            EntityRule::named("Renewable energy", "Concept"),
            EntityRule::new("solar power", "Energy Source", &["solar"]),
            EntityRule::named("wind power", "Energy Source"),
            EntityRule::named("ancient Egypt", "Civilization"),
            EntityRule::named("Nile River", "River"),
            EntityRule::named("Dogs", "Animal"),
            EntityRule::named("human heart", "Organ"),
            EntityRule::named("blood", "Body Fluid"),
        ];

        let relations = vec![
            RelationRule::between("Paris", "France", "is_capital_of"),
            RelationRule::between("Eiffel Tower", "Paris", "located_in"),
            RelationRule::between("Mount Everest", "Himalayas", "located_in"),
            RelationRule::new(
                "Amazon rainforest",
                "biodiversity",
                "known_for",
                &[&["Amazon rainforest"], &["jaguars", "toucans"]],
            ),
            RelationRule::new(
                "Machine learning",
                "Artificial Intelligence",
                "part_of",
                &[&["Machine learning"], &["artificial intelligence"]],
            ),
            RelationRule::between("Golden Gate Bridge", "San Francisco", "connects"),
            RelationRule::between("Golden Gate Bridge", "California", "located_in_state"),
            RelationRule::new(
                "Renewable energy",
                "sustainable future",
                "leads_to",
                &[&["Renewable energy"], &["solar power", "wind power"]],
            ),
            RelationRule::between("ancient Egypt", "Nile River", "located_along"),
            RelationRule::between("Dogs", "mammals", "is_a_type_of"),
            RelationRule::between("human heart", "blood", "pumps"),
        ];

        let query_intents = vec![
            QueryIntent::new("France", &["france"]),
            QueryIntent::new("Mount Everest", &["everest"]),
            QueryIntent::new("Amazon rainforest", &["amazon"]),
            QueryIntent::new("Water (H2O)", &["h2o", "water"]),
            QueryIntent::new("Machine learning", &["machine learning"]),
            QueryIntent::new("Golden Gate Bridge", &["golden gate"]),
            QueryIntent::new("Renewable energy", &["renewable energy"]),
            QueryIntent::new("ancient Egypt", &["ancient egypt"]),
            QueryIntent::new("Dogs", &["dogs"]),
            QueryIntent::new("human heart", &["heart"]),
        ];

        Self {
            entities,
            relations,
            query_intents,
        }
    }
}
