//! Fixed word lists and self-reference patterns used by the lexical metrics.
//!
//! A [`Lexicon`] is plain configuration data (serde, `Default` holds the
//! built-in lists). It is compiled once into a [`CompiledLexicon`] when a
//! [`crate::lexical::LexicalMetrics`] is constructed, so alternate lexicons
//! can be swapped in without touching the metric code.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ContainmentError, Result};

/// Built-in hedge words (epistemic uncertainty markers).
pub const HEDGE_WORDS: &[&str] = &[
    "might",
    "could",
    "possibly",
    "perhaps",
    "maybe",
    "potentially",
    "sometimes",
    "often",
    "generally",
    "usually",
    "tend",
    "tends",
    "appears",
    "seems",
    "suggests",
    "indicates",
    "may",
];

/// Built-in certainty words (definitive claim markers).
pub const CERTAINTY_WORDS: &[&str] = &[
    "certain",
    "definitely",
    "clearly",
    "obviously",
    "undoubtedly",
    "undisputed",
    "unquestionably",
    "absolutely",
    "conclusively",
    "definitively",
    "established",
    "proven",
    "confirmed",
];

/// Family a self-reference pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfReferenceFamily {
    /// "as I ...", "we mentioned"
    Backreference,
    /// "this shows", "this proves"
    Declaration,
    /// "therefore", "thus"
    Connective,
    /// "it follows that"
    Entailment,
}

impl SelfReferenceFamily {
    /// Stable name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            SelfReferenceFamily::Backreference => "backreference",
            SelfReferenceFamily::Declaration => "declaration",
            SelfReferenceFamily::Connective => "connective",
            SelfReferenceFamily::Entailment => "entailment",
        }
    }
}

/// One self-reference pattern: a regex fragment matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfReferencePattern {
    pub family: SelfReferenceFamily,
    pub pattern: String,
}

impl SelfReferencePattern {
    fn new(family: SelfReferenceFamily, pattern: &str) -> Self {
        Self { family, pattern: pattern.to_string() }
    }
}

/// Word lists and patterns consumed by the lexical metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Hedge words, matched whole-word and case-insensitive
    pub hedge_words: Vec<String>,
    /// Certainty words, matched whole-word and case-insensitive
    pub certainty_words: Vec<String>,
    /// Self-reference patterns (regex fragments)
    pub self_reference: Vec<SelfReferencePattern>,
}

impl Default for Lexicon {
    fn default() -> Self {
        use SelfReferenceFamily::*;
        Self {
            hedge_words: HEDGE_WORDS.iter().map(|w| w.to_string()).collect(),
            certainty_words: CERTAINTY_WORDS.iter().map(|w| w.to_string()).collect(),
            self_reference: vec![
                SelfReferencePattern::new(
                    Backreference,
                    r"\b(?:as (?:i|we)|(?:i|we) (?:mentioned|discussed|stated|noted))\b",
                ),
                SelfReferencePattern::new(
                    Declaration,
                    r"\bthis (?:shows|demonstrates|proves|confirms)\b",
                ),
                SelfReferencePattern::new(
                    Connective,
                    r"\b(?:therefore|thus|hence|consequently)\b",
                ),
                SelfReferencePattern::new(
                    Entailment,
                    r"\b(?:it follows that|this means that)\b",
                ),
            ],
        }
    }
}

impl Lexicon {
    /// Reject lexicons that would make a metric meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.hedge_words.iter().all(|w| w.trim().is_empty()) {
            return Err(ContainmentError::Config("hedge word list is empty".into()));
        }
        if self.certainty_words.iter().all(|w| w.trim().is_empty()) {
            return Err(ContainmentError::Config("certainty word list is empty".into()));
        }
        if self.self_reference.is_empty() {
            return Err(ContainmentError::Config(
                "self-reference pattern list is empty".into(),
            ));
        }
        Ok(())
    }

    /// Compile into regexes.
    pub fn compile(&self) -> Result<CompiledLexicon> {
        self.validate()?;
        let hedge = word_set_regex(&self.hedge_words)?;
        let certainty = word_set_regex(&self.certainty_words)?;
        let self_reference = self
            .self_reference
            .iter()
            .map(|p| Ok((p.family, Regex::new(&format!("(?i){}", p.pattern))?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompiledLexicon { hedge, certainty, self_reference })
    }
}

/// Regex form of a [`Lexicon`].
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    pub(crate) hedge: Regex,
    pub(crate) certainty: Regex,
    pub(crate) self_reference: Vec<(SelfReferenceFamily, Regex)>,
}

/// `(?i)\b(?:w1|w2|...)\b` over the escaped, non-empty words.
fn word_set_regex(words: &[String]) -> Result<Regex> {
    let alternation = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?)
}
