//! Rule-based part-of-speech tagging for content-word extraction.
//!
//! Only the distinction "content word (noun / verb / adjective)" versus
//! "everything else" matters to the semantic-diversity metric, so the
//! tagger is a closed-class lookup plus suffix rules rather than a
//! statistical model. Output is deterministic for a given token.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Coarse part-of-speech tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Adverb,
    /// Determiners, pronouns, prepositions, conjunctions, auxiliaries
    Function,
    Number,
}

impl PosTag {
    /// Nouns, verbs and adjectives carry concepts
    pub fn is_content(&self) -> bool {
        matches!(self, PosTag::Noun | PosTag::Verb | PosTag::Adjective)
    }
}

static FUNCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // determiners and quantifiers
        "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "every",
        "all", "both", "either", "neither", "no", "much", "many", "more", "most", "few",
        "fewer", "less", "least", "several", "such", "own", "other", "another",
        // pronouns
        "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you",
        "your", "yours", "yourself", "he", "him", "his", "himself", "she", "her", "hers",
        "herself", "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
        "who", "whom", "whose", "which", "what", "whatever", "whoever", "one", "ones",
        // prepositions
        "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
        "through", "during", "before", "after", "above", "below", "to", "from", "up", "down",
        "out", "off", "over", "under", "across", "along", "among", "around", "behind",
        "beyond", "despite", "toward", "towards", "upon", "within", "without", "via", "per",
        // conjunctions and subordinators
        "and", "or", "but", "nor", "so", "yet", "if", "then", "than", "because", "while",
        "although", "though", "whether", "unless", "since", "until", "when", "where", "why",
        "how", "as", "once",
        // auxiliaries and modals
        "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "will", "would", "shall", "should", "can",
        "could", "may", "might", "must", "ought",
        // particles and common adverbs without -ly
        "not", "there", "here", "very", "too", "also", "just", "only", "even", "still",
        "already", "again", "ever", "never", "always", "often", "sometimes", "now", "well",
        "however", "therefore", "thus", "hence", "perhaps", "maybe", "quite", "rather",
        "almost", "instead", "indeed", "else",
    ]
    .into_iter()
    .collect()
});

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "ical", "less", "ish", "ant", "ent", "ary",
];

const VERB_SUFFIXES: &[&str] = &["ize", "ise", "yze", "yse", "ify", "ate", "ed", "ing", "en"];

/// Tag a single lowercase token.
pub fn tag(token: &str) -> PosTag {
    if token.is_empty() || token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return PosTag::Number;
    }
    if FUNCTION_WORDS.contains(token) {
        return PosTag::Function;
    }
    let len = token.chars().count();
    if len > 4 && token.ends_with("ly") {
        return PosTag::Adverb;
    }
    // suffix rules need a stem of at least three characters
    let suffix_match = |suffixes: &[&str]| {
        suffixes
            .iter()
            .any(|s| token.ends_with(s) && len >= s.len() + 3)
    };
    if suffix_match(VERB_SUFFIXES) {
        PosTag::Verb
    } else if suffix_match(ADJECTIVE_SUFFIXES) {
        PosTag::Adjective
    } else {
        PosTag::Noun
    }
}

/// Distinct content words (nouns, verbs, adjectives) among `tokens`.
pub fn content_words<'a>(tokens: &'a [String]) -> HashSet<&'a str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|t| tag(t).is_content())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_words() {
        for w in ["the", "and", "of", "might", "they", "is"] {
            assert_eq!(tag(w), PosTag::Function, "{w}");
        }
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(tag("analyze"), PosTag::Verb);
        assert_eq!(tag("running"), PosTag::Verb);
        assert_eq!(tag("dangerous"), PosTag::Adjective);
        assert_eq!(tag("quickly"), PosTag::Adverb);
        assert_eq!(tag("model"), PosTag::Noun);
        assert_eq!(tag("2024"), PosTag::Number);
    }

    #[test]
    fn test_short_words_fall_back_to_noun() {
        // "red" ends with "ed" but has no stem
        assert_eq!(tag("red"), PosTag::Noun);
        assert_eq!(tag("ally"), PosTag::Noun);
    }

    #[test]
    fn test_content_words_dedup() {
        let tokens: Vec<String> = "the model and the model predict outcomes"
            .split_whitespace()
            .map(String::from)
            .collect();
        let set = content_words(&tokens);
        assert_eq!(set.len(), 3);
        assert!(set.contains("model"));
        assert!(!set.contains("the"));
    }
}
