//! Lexical metrics over a single response text.
//!
//! Every function accepts empty or whitespace-only text and returns the
//! documented zero value. Nothing here panics on malformed input.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lexicon::{CompiledLexicon, Lexicon, SelfReferenceFamily};
use crate::pos;

/// Recursion depth above which self-reference is considered present
pub const RECURSION_THRESHOLD: f64 = 0.3;

/// Maximum number of self-reference matches kept for diagnostics
pub const MAX_RECURSION_EXAMPLES: usize = 5;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static word pattern"));
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("static sentence pattern"));

/// Lowercase word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Non-empty, trimmed sentences split on `.`, `!` and `?`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whitespace-delimited word count, the denominator for lexical densities.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Shannon entropy (bits) of the word-frequency distribution.
///
/// Not normalized for length: longer texts tend to score higher.
pub fn entropy(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }
    // BTreeMap keeps the summation order fixed so results are bit-identical
    let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &tokens {
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }
    let n = tokens.len() as f64;
    freq.values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Distinct nouns, verbs and adjectives per 100 tokens.
pub fn semantic_diversity(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }
    pos::content_words(&tokens).len() as f64 / tokens.len() as f64 * 100.0
}

/// Mean Jaccard word overlap of consecutive sentences, scaled by 2 and
/// clamped to `[0, 1]`. Empty text is 0, a single sentence is 1.
pub fn coherence(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return 1.0;
    }
    let sets: Vec<HashSet<String>> = sentences
        .iter()
        .map(|s| tokenize(s).into_iter().collect())
        .collect();
    let pairs = sets.len() - 1;
    let total: f64 = sets.windows(2).map(|w| jaccard(&w[0], &w[1])).sum();
    (total / pairs as f64 * 2.0).clamp(0.0, 1.0)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Count and per-100-word density of lexicon matches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LexicalDensity {
    pub count: usize,
    pub density: f64,
}

/// One self-reference match kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursionMatch {
    pub family: SelfReferenceFamily,
    pub text: String,
}

/// Self-reference density of a text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecursionResult {
    /// Matches per sentence, capped at 1.0
    pub depth: f64,
    pub detected: bool,
    pub total_matches: usize,
    pub sentence_count: usize,
    /// First [`MAX_RECURSION_EXAMPLES`] matches in text order
    pub examples: Vec<RecursionMatch>,
}

/// Per-sample metric vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricVector {
    pub entropy: f64,
    pub hedge_count: usize,
    pub hedge_density: f64,
    pub certainty_count: usize,
    pub certainty_density: f64,
    pub semantic_diversity: f64,
    pub coherence: f64,
    pub recursion_depth: f64,
    pub word_count: usize,
    pub token_count: usize,
}

/// Lexicon-driven metrics. Holds the compiled lexicon handed in at
/// construction; the free functions above need no lexicon.
#[derive(Debug, Clone)]
pub struct LexicalMetrics {
    lexicon: CompiledLexicon,
}

static STANDARD: Lazy<LexicalMetrics> = Lazy::new(|| {
    LexicalMetrics::new(&Lexicon::default()).expect("built-in lexicon is valid")
});

impl LexicalMetrics {
    /// Compile `lexicon` into a metrics engine.
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        Ok(Self { lexicon: lexicon.compile()? })
    }

    /// Metrics over the built-in lexicon.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn entropy(&self, text: &str) -> f64 {
        entropy(text)
    }

    /// Hedge-word count and density per 100 words.
    pub fn hedge_density(&self, text: &str) -> LexicalDensity {
        density(&self.lexicon.hedge, text)
    }

    /// Certainty-word count and density per 100 words.
    pub fn certainty_density(&self, text: &str) -> LexicalDensity {
        density(&self.lexicon.certainty, text)
    }

    pub fn semantic_diversity(&self, text: &str) -> f64 {
        semantic_diversity(text)
    }

    pub fn coherence(&self, text: &str) -> f64 {
        coherence(text)
    }

    /// Self-reference matches per sentence.
    pub fn recursion_depth(&self, text: &str) -> RecursionResult {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return RecursionResult::default();
        }

        let mut total_matches = 0usize;
        let mut examples = Vec::new();
        for sentence in &sentences {
            for (family, re) in &self.lexicon.self_reference {
                for m in re.find_iter(sentence) {
                    total_matches += 1;
                    if examples.len() < MAX_RECURSION_EXAMPLES {
                        examples.push(RecursionMatch {
                            family: *family,
                            text: m.as_str().to_string(),
                        });
                    }
                }
            }
        }

        let depth = (total_matches as f64 / sentences.len() as f64).min(1.0);
        RecursionResult {
            depth,
            detected: depth > RECURSION_THRESHOLD,
            total_matches,
            sentence_count: sentences.len(),
            examples,
        }
    }

    /// All metrics for one text.
    pub fn metric_vector(&self, text: &str) -> MetricVector {
        let hedge = self.hedge_density(text);
        let certainty = self.certainty_density(text);
        MetricVector {
            entropy: entropy(text),
            hedge_count: hedge.count,
            hedge_density: hedge.density,
            certainty_count: certainty.count,
            certainty_density: certainty.density,
            semantic_diversity: semantic_diversity(text),
            coherence: coherence(text),
            recursion_depth: self.recursion_depth(text).depth,
            word_count: word_count(text),
            token_count: tokenize(text).len(),
        }
    }
}

impl Default for LexicalMetrics {
    fn default() -> Self {
        Self::standard()
    }
}

fn density(re: &Regex, text: &str) -> LexicalDensity {
    let words = word_count(text);
    if words == 0 {
        return LexicalDensity::default();
    }
    let count = re.find_iter(text).count();
    LexicalDensity { count, density: count as f64 / words as f64 * 100.0 }
}
