//! Rule-based answer stub standing in for a language model

use minirag_core::text::distinct_keywords;
use serde::{Deserialize, Serialize};

const KEYWORDS_PLACEHOLDER: &str = "{keywords}";
const DEFAULT_KEYWORD_LIMIT: usize = 5;

/// Fires when the lower-cased prompt contains `prompt_cue` and the
/// lower-cased context contains `context_cue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRule {
    pub prompt_cue: String,
    pub context_cue: String,
    /// Answer text; `{keywords}` is replaced with context keywords
    pub template: String,
}

impl AnswerRule {
    pub fn new(prompt_cue: &str, context_cue: &str, template: &str) -> Self {
        Self {
            prompt_cue: prompt_cue.to_lowercase(),
            context_cue: context_cue.to_lowercase(),
            template: template.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnswerStub {
    rules: Vec<AnswerRule>,
    keyword_limit: usize,
}

impl AnswerStub {
    pub fn new(rules: Vec<AnswerRule>) -> Self {
        Self {
            rules,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }

    pub fn with_keyword_limit(mut self, limit: usize) -> Self {
        self.keyword_limit = limit;
        self
    }

    /// Produce an answer for `prompt` grounded on `context`.
    ///
    /// The first matching rule wins. Empty context counts as no context.
    pub fn generate(&self, prompt: &str, context: Option<&str>) -> String {
        let question = prompt.replace('?', "");

        let context = match context {
            Some(context) if !context.is_empty() => context,
            _ => {
                return format!(
                    "I don't have specific context for '{}'. Can you provide more details?",
                    question
                )
            }
        };

        let keywords = distinct_keywords(context, 3)
            .into_iter()
            .take(self.keyword_limit)
            .collect::<Vec<_>>()
            .join(" ");

        let prompt_lower = prompt.to_lowercase();
        let context_lower = context.to_lowercase();

        match self.rules.iter().find(|rule| {
            prompt_lower.contains(&rule.prompt_cue) && context_lower.contains(&rule.context_cue)
        }) {
            Some(rule) => rule.template.replace(KEYWORDS_PLACEHOLDER, &keywords),
            None => format!(
                "Based on the provided context: '{}', I can tell you that: {}. Key themes include {}.",
                context, question, keywords
            ),
        }
    }
}

impl Default for AnswerStub {
    fn default() -> Self {
        Self::new(vec![
            AnswerRule::new(
                "capital of france",
                "paris",
                "Based on the information, the capital of France is Paris. It is known for its {keywords}.",
            ),
            AnswerRule::new(
                "highest mountain",
                "everest",
                "According to the context, the highest mountain is Mount Everest, located in the Himalayas. It is {keywords}.",
            ),
            AnswerRule::new(
                "amazon rainforest",
                "biodiversity",
                "The Amazon rainforest, as described, is the largest rainforest, known for its {keywords} and vast biodiversity.",
            ),
            AnswerRule::new(
                "water",
                "h2o",
                "The context states that Water, or H2O, is crucial for life and covers much of Earth. It's {keywords}.",
            ),
            AnswerRule::new(
                "machine learning",
                "ai",
                "Machine learning, a field of AI, enables systems to learn from data without explicit programming, as per the text. It involves {keywords}.",
            ),
            AnswerRule::new(
                "golden gate bridge",
                "san francisco",
                "The Golden Gate Bridge is an iconic suspension bridge in California, connecting San Francisco, known for its {keywords}.",
            ),
            AnswerRule::new(
                "renewable energy",
                "solar",
                "Renewable energy, like solar and wind, is vital for sustainability, as mentioned. It aims to reduce {keywords}.",
            ),
            AnswerRule::new(
                "ancient egypt",
                "nile river",
                "Ancient Egypt was a civilization along the Nile River in Northeastern Africa, as the context indicates. It has a rich {keywords}.",
            ),
            AnswerRule::new(
                "dogs",
                "loyalty",
                "Dogs are domesticated mammals recognized for their loyalty and diverse breeds, including {keywords}.",
            ),
            AnswerRule::new(
                "human heart",
                "blood",
                "The human heart is a muscular organ that pumps blood through the circulatory system, supplying {keywords} to the body.",
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_rule() {
        let stub = AnswerStub::default();
        let answer = stub.generate(
            "What is the capital of France?",
            Some("Doc 1: The capital of France is Paris."),
        );

        assert_eq!(
            answer,
            "Based on the information, the capital of France is Paris. It is known for its capital france paris."
        );
    }

    #[test]
    fn test_rule_needs_context_cue() {
        let stub = AnswerStub::default();
        let answer = stub.generate("What is the capital of France?", Some("Rome is old."));

        assert_eq!(
            answer,
            "Based on the provided context: 'Rome is old.', I can tell you that: What is the capital of France. Key themes include rome."
        );
    }

    #[test]
    fn test_missing_context() {
        let stub = AnswerStub::default();
        let expected =
            "I don't have specific context for 'Where is Atlantis'. Can you provide more details?";

        assert_eq!(stub.generate("Where is Atlantis?", None), expected);
        assert_eq!(stub.generate("Where is Atlantis?", Some("")), expected);
    }

    #[test]
    fn test_keyword_limit() {
        let stub = AnswerStub::new(vec![AnswerRule::new("list", "", "{keywords}")])
            .with_keyword_limit(2);

        assert_eq!(
            stub.generate("list them", Some("alpha beta gamma delta")),
            "alpha beta"
        );
    }
}
