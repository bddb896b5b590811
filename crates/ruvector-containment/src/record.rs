//! Raw result-record shapes and the canonical sample record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Experimental condition of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Baseline,
    Trigger,
    /// Conversational turn, 1-based
    Turn(u8),
}

impl Branch {
    pub fn turn(&self) -> Option<u8> {
        match self {
            Branch::Turn(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Baseline => write!(f, "baseline"),
            Branch::Trigger => write!(f, "trigger"),
            Branch::Turn(n) => write!(f, "turn{n}"),
        }
    }
}

/// One model response under one experimental condition.
///
/// Built once by [`crate::normalizer::RecordNormalizer`]; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    /// Model identifier, empty when the input did not name one
    pub model: String,
    pub group_key: String,
    pub branch: Branch,
    /// Secondary grouping key such as challenger identity
    pub dimension: Option<String>,
    pub text: String,
    pub token_count: u64,
    pub latency_ms: u64,
}

impl SampleRecord {
    pub fn turn(&self) -> Option<u8> {
        self.branch.turn()
    }

    /// Identity within one analysis run.
    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            model: &self.model,
            group_key: &self.group_key,
            branch: self.branch,
            dimension: self.dimension.as_deref(),
        }
    }
}

/// Borrowed uniqueness key of a [`SampleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey<'a> {
    pub model: &'a str,
    pub group_key: &'a str,
    pub branch: Branch,
    pub dimension: Option<&'a str>,
}

/// `branchOrTurn` as it appears in input: a number or a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchOrTurn {
    Number(u64),
    Label(String),
}

/// Input record carrying its metadata explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplicitRecord {
    #[serde(alias = "group_key")]
    pub group_key: String,
    #[serde(alias = "branch_or_turn", alias = "branch", alias = "turn")]
    pub branch_or_turn: BranchOrTurn,
    #[serde(default)]
    pub dimension: Option<String>,
    pub text: String,
    #[serde(alias = "token_count")]
    pub token_count: u64,
    #[serde(default, alias = "latency_ms")]
    pub latency_ms: Option<u64>,
    #[serde(default, alias = "prompt_text")]
    pub prompt_text: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Older record shape: metadata lives in a compound label, a
/// conversation identifier, or the prompt text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    /// `"{group}-{dimension}-Turn{n}"`, or a plain group label
    #[serde(default)]
    pub description: Option<String>,
    /// `"{group}::{dimension}"`
    #[serde(default, alias = "conversation_id")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(alias = "output", alias = "text")]
    pub response: String,
    #[serde(default, alias = "tokens", alias = "token_count")]
    pub token_count: Option<u64>,
    #[serde(default, alias = "latency_ms")]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Either input shape; explicit is tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    Explicit(ExplicitRecord),
    Legacy(LegacyRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_shape_detected() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"groupKey":"vaccines","branchOrTurn":"baseline","text":"x","tokenCount":12}"#,
        )
        .unwrap();
        match raw {
            RawRecord::Explicit(r) => {
                assert_eq!(r.group_key, "vaccines");
                assert_eq!(r.branch_or_turn, BranchOrTurn::Label("baseline".into()));
                assert_eq!(r.latency_ms, None);
            }
            RawRecord::Legacy(_) => panic!("expected explicit shape"),
        }
    }

    #[test]
    fn test_numeric_turn() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"group_key":"g","turn":3,"dimension":"skeptic","text":"x","token_count":5}"#,
        )
        .unwrap();
        let RawRecord::Explicit(r) = raw else { panic!("expected explicit shape") };
        assert_eq!(r.branch_or_turn, BranchOrTurn::Number(3));
        assert_eq!(r.dimension.as_deref(), Some("skeptic"));
    }

    #[test]
    fn test_legacy_shape_fallback() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"description":"climate-skeptic-Turn2","output":"some answer","tokens":40}"#,
        )
        .unwrap();
        let RawRecord::Legacy(r) = raw else { panic!("expected legacy shape") };
        assert_eq!(r.response, "some answer");
        assert_eq!(r.token_count, Some(40));
    }

    #[test]
    fn test_branch_display_and_turn() {
        assert_eq!(Branch::Turn(4).to_string(), "turn4");
        assert_eq!(Branch::Trigger.turn(), None);
        assert_eq!(Branch::Turn(2).turn(), Some(2));
    }

    #[test]
    fn test_record_key_ordering() {
        let a = SampleRecord {
            model: "m".into(),
            group_key: "a".into(),
            branch: Branch::Turn(1),
            dimension: None,
            text: String::new(),
            token_count: 0,
            latency_ms: 0,
        };
        let mut b = a.clone();
        b.branch = Branch::Turn(2);
        assert!(a.key() < b.key());
        assert_ne!(a.key(), b.key());
    }
}
