//! Prompt-text heuristics that infer the experimental condition.
//!
//! Isolated behind [`BranchClassifier`] so explicit metadata or a different
//! prompt protocol can replace it without touching the aggregators.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ContainmentError, Result};

/// Condition inferred from a two-condition prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchClass {
    Baseline,
    Trigger,
    Unresolved,
}

/// Strategy for recovering a record's condition from its prompt.
pub trait BranchClassifier {
    /// Baseline vs. trigger for two-condition runs.
    fn classify_branch(&self, prompt: &str) -> BranchClass;

    /// Turn number (1..=5) for multi-turn runs.
    fn infer_turn(&self, prompt: &str) -> Option<u8>;
}

/// Vocabulary behind [`PromptHeuristics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptHeuristicsConfig {
    /// Verbs that open an analysis-framed (baseline) prompt
    pub analysis_verbs: Vec<String>,
    /// Expert/consensus keywords marking a trigger prompt
    pub consensus_keywords: Vec<String>,
    /// Turn 2 marker
    pub consensus_turn_phrase: String,
    /// Turn 3 markers (dissenter introduction)
    pub dissent_phrases: Vec<String>,
    /// Turn 4 marker
    pub conflict_phrase: String,
    /// Separates turn 5 from turn 1 among analysis-framed prompts
    pub repeat_word: String,
}

impl Default for PromptHeuristicsConfig {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            analysis_verbs: owned(&[
                "analyze", "analyse", "examine", "evaluate", "assess", "explain", "describe",
                "discuss", "consider", "review",
            ]),
            consensus_keywords: owned(&[
                "expert",
                "experts",
                "consensus",
                "scientists agree",
                "widely accepted",
            ]),
            consensus_turn_phrase: "most experts agree".into(),
            dissent_phrases: owned(&[
                "disagrees",
                "dissenting",
                "challenges the consensus",
                "argues against",
            ]),
            conflict_phrase: "conflicting views".into(),
            repeat_word: "again".into(),
        }
    }
}

/// Regex-based [`BranchClassifier`].
#[derive(Debug, Clone)]
pub struct PromptHeuristics {
    leading_verb: Regex,
    framing: Regex,
    consensus: Regex,
    consensus_turn: Regex,
    dissent: Regex,
    conflict: Regex,
    repeat: Regex,
}

impl PromptHeuristics {
    pub fn new(config: &PromptHeuristicsConfig) -> Result<Self> {
        let verbs = alternation(&config.analysis_verbs, "analysis_verbs")?;
        Ok(Self {
            leading_verb: Regex::new(&format!(r"(?i)^\W*(?:{verbs})\b"))?,
            framing: Regex::new(&format!(r"(?i)\b(?:{verbs})\b"))?,
            consensus: phrase_set(&config.consensus_keywords, "consensus_keywords")?,
            consensus_turn: phrase_set(
                std::slice::from_ref(&config.consensus_turn_phrase),
                "consensus_turn_phrase",
            )?,
            dissent: phrase_set(&config.dissent_phrases, "dissent_phrases")?,
            conflict: phrase_set(std::slice::from_ref(&config.conflict_phrase), "conflict_phrase")?,
            repeat: phrase_set(std::slice::from_ref(&config.repeat_word), "repeat_word")?,
        })
    }

    fn is_analysis_framed(&self, prompt: &str) -> bool {
        self.framing.is_match(prompt)
    }
}

impl Default for PromptHeuristics {
    fn default() -> Self {
        // built-in vocabulary is non-empty and escaped
        Self::new(&PromptHeuristicsConfig::default()).expect("built-in heuristics are valid")
    }
}

impl BranchClassifier for PromptHeuristics {
    /// Consensus keywords win over a leading analysis verb, since trigger
    /// prompts usually wrap the baseline question.
    fn classify_branch(&self, prompt: &str) -> BranchClass {
        if self.consensus.is_match(prompt) {
            BranchClass::Trigger
        } else if self.leading_verb.is_match(prompt) {
            BranchClass::Baseline
        } else {
            BranchClass::Unresolved
        }
    }

    fn infer_turn(&self, prompt: &str) -> Option<u8> {
        if self.conflict.is_match(prompt) {
            Some(4)
        } else if self.dissent.is_match(prompt) {
            Some(3)
        } else if self.consensus_turn.is_match(prompt) {
            Some(2)
        } else if self.is_analysis_framed(prompt) {
            Some(if self.repeat.is_match(prompt) { 5 } else { 1 })
        } else {
            None
        }
    }
}

fn alternation(items: &[String], field: &str) -> Result<String> {
    let escaped: Vec<String> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Err(ContainmentError::Config(format!("heuristics.{field} is empty")));
    }
    Ok(escaped.join("|"))
}

fn phrase_set(items: &[String], field: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation(items, field)?))?)
}
