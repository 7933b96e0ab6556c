//! Word tokenization shared by the embedder and the answer stub

/// Split text into word tokens (runs of alphanumerics and underscores).
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

/// Lower-cased words longer than `min_len` characters, first-seen order, no repeats.
pub fn distinct_keywords(text: &str, min_len: usize) -> Vec<String> {
    let mut seen = Vec::new();
    for word in words(text) {
        if word.chars().count() <= min_len {
            continue;
        }
        let word = word.to_lowercase();
        if !seen.contains(&word) {
            seen.push(word);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        let tokens: Vec<&str> = words("Water (H2O) covers 71% of Earth's surface.").collect();
        assert_eq!(
            tokens,
            vec!["Water", "H2O", "covers", "71", "of", "Earth", "s", "surface"]
        );
    }

    #[test]
    fn test_distinct_keywords() {
        let keywords = distinct_keywords("Paris is PARIS, known for the Eiffel Tower", 3);
        assert_eq!(keywords, vec!["paris", "known", "eiffel", "tower"]);
    }
}
