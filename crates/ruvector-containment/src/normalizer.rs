//! Record normalization: raw input shapes to [`SampleRecord`]s.
//!
//! This is the only place that knows about input shape differences.
//! Records that cannot be resolved are skipped and reported, never fatal.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ContainmentError, Result};
use crate::heuristics::{BranchClass, BranchClassifier, PromptHeuristics};
use crate::lexical::word_count;
use crate::record::{Branch, BranchOrTurn, ExplicitRecord, LegacyRecord, RawRecord, SampleRecord};

/// Separator between group and dimension in a legacy conversation id.
pub const CONVERSATION_DELIMITER: &str = "::";

static COMPOUND_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?P<group>.+)-(?P<dim>[^-]+)-turn\s*(?P<turn>\d+)\s*$")
        .expect("static label pattern")
});

/// Which aggregator the normalized records are destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Baseline vs. trigger pairs
    Compression,
    /// Numbered conversational turns
    Sequence,
}

/// Why a raw record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// Not an object of either known shape
    Malformed(String),
    /// Group key missing or blank
    UnresolvedGroup,
    /// Legacy label did not match `{group}-{dimension}-Turn{n}`
    UnparseableLabel(String),
    /// Turn number could not be recovered
    UnresolvedTurn,
    /// Neither baseline nor trigger
    UnresolvedBranch,
    /// Same model, group, branch and dimension as an earlier record
    DuplicateKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Malformed(e) => write!(f, "malformed record: {e}"),
            SkipReason::UnresolvedGroup => write!(f, "group could not be resolved"),
            SkipReason::UnparseableLabel(l) => write!(f, "unparseable label '{l}'"),
            SkipReason::UnresolvedTurn => write!(f, "turn could not be resolved"),
            SkipReason::UnresolvedBranch => write!(f, "branch is neither baseline nor trigger"),
            SkipReason::DuplicateKey => write!(f, "duplicate record key"),
        }
    }
}

/// A dropped input record and its position in the input array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: SkipReason,
}

/// Output of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub records: Vec<SampleRecord>,
    pub skipped: Vec<SkippedRecord>,
}

impl NormalizedBatch {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total inputs seen
    pub fn input_count(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Parse an input document: a JSON array of result records.
pub fn parse_input(json: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ContainmentError::Parse(e.to_string()))?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        // evaluation harnesses often wrap results as {"results": [...]}
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(ContainmentError::Parse(
                "expected an array of records or an object with a 'results' array".into(),
            )),
        },
        _ => Err(ContainmentError::Parse("expected an array of records".into())),
    }
}

/// Maps raw records to canonical samples for one analysis mode.
#[derive(Debug, Clone)]
pub struct RecordNormalizer<C = PromptHeuristics> {
    classifier: C,
    mode: AnalysisMode,
}

impl RecordNormalizer<PromptHeuristics> {
    pub fn new(mode: AnalysisMode) -> Self {
        Self { classifier: PromptHeuristics::default(), mode }
    }
}

impl<C: BranchClassifier> RecordNormalizer<C> {
    pub fn with_classifier(mode: AnalysisMode, classifier: C) -> Self {
        Self { classifier, mode }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Normalize untyped JSON values; values of neither shape are skipped.
    pub fn normalize_values(&self, values: &[serde_json::Value]) -> NormalizedBatch {
        let parsed = values
            .iter()
            .map(|v| RawRecord::deserialize(v).map_err(|e| e.to_string()));
        self.normalize_iter(parsed)
    }

    /// Normalize already-typed records.
    pub fn normalize(&self, raw: &[RawRecord]) -> NormalizedBatch {
        self.normalize_iter(raw.iter().cloned().map(Ok))
    }

    fn normalize_iter<I>(&self, raw: I) -> NormalizedBatch
    where
        I: Iterator<Item = std::result::Result<RawRecord, String>>,
    {
        let mut batch = NormalizedBatch::default();
        let mut seen = HashSet::new();

        for (index, item) in raw.enumerate() {
            let resolved = item.map_err(SkipReason::Malformed).and_then(|r| self.resolve(r));
            match resolved {
                Ok(record) => {
                    let key = (
                        record.model.clone(),
                        record.group_key.clone(),
                        record.branch,
                        record.dimension.clone(),
                    );
                    if !seen.insert(key) {
                        warn!(index, group = %record.group_key, branch = %record.branch, "duplicate record skipped");
                        batch.skipped.push(SkippedRecord { index, reason: SkipReason::DuplicateKey });
                        continue;
                    }
                    debug!(index, group = %record.group_key, branch = %record.branch, "record normalized");
                    batch.records.push(record);
                }
                Err(reason) => {
                    warn!(index, %reason, "record skipped");
                    batch.skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        info!(
            mode = ?self.mode,
            records = batch.records.len(),
            skipped = batch.skipped.len(),
            "normalization complete"
        );
        batch
    }

    fn resolve(&self, raw: RawRecord) -> std::result::Result<SampleRecord, SkipReason> {
        match raw {
            RawRecord::Explicit(r) => self.resolve_explicit(r),
            RawRecord::Legacy(r) => self.resolve_legacy(r),
        }
    }

    fn resolve_explicit(&self, r: ExplicitRecord) -> std::result::Result<SampleRecord, SkipReason> {
        let group_key = non_blank(Some(&r.group_key)).ok_or(SkipReason::UnresolvedGroup)?;
        let prompt = r.prompt_text.as_deref();
        let branch = match self.mode {
            AnalysisMode::Compression => {
                let explicit = match &r.branch_or_turn {
                    BranchOrTurn::Label(l) => parse_condition_label(l),
                    BranchOrTurn::Number(_) => None,
                };
                explicit
                    .or_else(|| prompt.and_then(|p| self.branch_from_prompt(p)))
                    .ok_or(SkipReason::UnresolvedBranch)?
            }
            AnalysisMode::Sequence => {
                let explicit = match &r.branch_or_turn {
                    BranchOrTurn::Number(n) => u8::try_from(*n).ok().filter(|n| *n >= 1),
                    BranchOrTurn::Label(l) => parse_turn_label(l),
                };
                explicit
                    .or_else(|| prompt.and_then(|p| self.classifier.infer_turn(p)))
                    .map(Branch::Turn)
                    .ok_or(SkipReason::UnresolvedTurn)?
            }
        };
        Ok(SampleRecord {
            model: r.model.unwrap_or_default(),
            group_key,
            branch,
            dimension: non_blank(r.dimension.as_ref()),
            text: r.text,
            token_count: r.token_count,
            latency_ms: r.latency_ms.unwrap_or(0),
        })
    }

    fn resolve_legacy(&self, r: LegacyRecord) -> std::result::Result<SampleRecord, SkipReason> {
        let (group_key, branch, dimension) = match self.mode {
            AnalysisMode::Sequence => self.legacy_turn(&r)?,
            AnalysisMode::Compression => self.legacy_condition(&r)?,
        };
        let token_count = r.token_count.unwrap_or_else(|| word_count(&r.response) as u64);
        Ok(SampleRecord {
            model: r.model.unwrap_or_default(),
            group_key,
            branch,
            dimension,
            text: r.response,
            token_count,
            latency_ms: r.latency_ms.unwrap_or(0),
        })
    }

    /// Compound label first, then conversation id plus turn-prompt match.
    fn legacy_turn(
        &self,
        r: &LegacyRecord,
    ) -> std::result::Result<(String, Branch, Option<String>), SkipReason> {
        if let Some(label) = r.description.as_deref() {
            if let Some((group, dim, turn)) = parse_compound_label(label) {
                return Ok((group, Branch::Turn(turn), Some(dim)));
            }
        }

        if let Some((group, dim)) = r.conversation_id.as_deref().and_then(split_conversation_id) {
            let turn = r
                .prompt
                .as_deref()
                .and_then(|p| self.classifier.infer_turn(p))
                .ok_or(SkipReason::UnresolvedTurn)?;
            return Ok((group, Branch::Turn(turn), Some(dim)));
        }

        match r.description.as_deref() {
            Some(label) => Err(SkipReason::UnparseableLabel(label.to_string())),
            None => Err(SkipReason::UnresolvedGroup),
        }
    }

    /// Baseline/trigger from the prompt; group from topic, description or id.
    fn legacy_condition(
        &self,
        r: &LegacyRecord,
    ) -> std::result::Result<(String, Branch, Option<String>), SkipReason> {
        let group = non_blank(r.topic.as_ref())
            .or_else(|| non_blank(r.description.as_ref()))
            .or_else(|| non_blank(r.conversation_id.as_ref()))
            .ok_or(SkipReason::UnresolvedGroup)?;
        let branch = r
            .prompt
            .as_deref()
            .and_then(|p| self.branch_from_prompt(p))
            .ok_or(SkipReason::UnresolvedBranch)?;
        Ok((group, branch, None))
    }

    fn branch_from_prompt(&self, prompt: &str) -> Option<Branch> {
        match self.classifier.classify_branch(prompt) {
            BranchClass::Baseline => Some(Branch::Baseline),
            BranchClass::Trigger => Some(Branch::Trigger),
            BranchClass::Unresolved => None,
        }
    }
}

/// `"{group}-{dimension}-Turn{n}"` into its parts. The group may contain
/// hyphens; the dimension may not.
pub fn parse_compound_label(label: &str) -> Option<(String, String, u8)> {
    let caps = COMPOUND_LABEL.captures(label)?;
    let group = caps.name("group")?.as_str().trim();
    let dim = caps.name("dim")?.as_str().trim();
    let turn: u8 = caps.name("turn")?.as_str().parse().ok()?;
    if group.is_empty() || dim.is_empty() || turn == 0 {
        return None;
    }
    Some((group.to_string(), dim.to_string(), turn))
}

/// `"{group}::{dimension}"` into its parts.
pub fn split_conversation_id(id: &str) -> Option<(String, String)> {
    let mut parts = id.split(CONVERSATION_DELIMITER);
    let group = parts.next()?.trim();
    let dim = parts.next()?.trim();
    if parts.next().is_some() || group.is_empty() || dim.is_empty() {
        return None;
    }
    Some((group.to_string(), dim.to_string()))
}

fn parse_condition_label(label: &str) -> Option<Branch> {
    match label.trim().to_ascii_lowercase().as_str() {
        "baseline" => Some(Branch::Baseline),
        "trigger" => Some(Branch::Trigger),
        _ => None,
    }
}

fn parse_turn_label(label: &str) -> Option<u8> {
    let lower = label.trim().to_ascii_lowercase();
    let digits = lower.strip_prefix("turn").unwrap_or(&lower).trim_start_matches(['_', ' ', '-']);
    digits.parse::<u8>().ok().filter(|n| *n >= 1)
}

fn non_blank(s: Option<&String>) -> Option<String> {
    s.map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_compound_label() {
        assert_eq!(
            parse_compound_label("climate-skeptic-Turn3"),
            Some(("climate".into(), "skeptic".into(), 3))
        );
        assert_eq!(
            parse_compound_label("gun-control-economist-turn5"),
            Some(("gun-control".into(), "economist".into(), 5))
        );
        assert_eq!(parse_compound_label("climate skeptic turn 3"), None);
        assert_eq!(parse_compound_label("climate-skeptic-Turn0"), None);
        assert_eq!(parse_compound_label("-skeptic-Turn1"), None);
    }

    #[test]
    fn test_split_conversation_id() {
        assert_eq!(split_conversation_id("vaccines::doctor"), Some(("vaccines".into(), "doctor".into())));
        assert_eq!(split_conversation_id("vaccines"), None);
        assert_eq!(split_conversation_id("a::b::c"), None);
        assert_eq!(split_conversation_id("::b"), None);
    }

    #[test]
    fn test_turn_labels() {
        assert_eq!(parse_turn_label("3"), Some(3));
        assert_eq!(parse_turn_label("Turn4"), Some(4));
        assert_eq!(parse_turn_label("turn_2"), Some(2));
        assert_eq!(parse_turn_label("baseline"), None);
        assert_eq!(parse_turn_label("0"), None);
    }

    #[test]
    fn test_explicit_compression_records() {
        let n = RecordNormalizer::new(AnalysisMode::Compression);
        let values = vec![
            json!({"groupKey": "rent", "branchOrTurn": "baseline", "text": "long", "tokenCount": 450}),
            json!({"groupKey": "rent", "branchOrTurn": "TRIGGER", "text": "short", "tokenCount": 110, "latencyMs": 900}),
            json!({"groupKey": "rent2", "branchOrTurn": "other", "promptText": "Experts agree. Analyze.", "text": "t", "tokenCount": 5}),
            json!({"groupKey": "rent3", "branchOrTurn": 2, "text": "t", "tokenCount": 5}),
        ];
        let batch = n.normalize_values(&values);
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[0].branch, Branch::Baseline);
        assert_eq!(batch.records[1].branch, Branch::Trigger);
        assert_eq!(batch.records[1].latency_ms, 900);
        assert_eq!(batch.records[2].branch, Branch::Trigger);
        assert_eq!(batch.skipped, vec![SkippedRecord { index: 3, reason: SkipReason::UnresolvedBranch }]);
    }

    #[test]
    fn test_legacy_sequence_records() {
        let n = RecordNormalizer::new(AnalysisMode::Sequence);
        let values = vec![
            json!({"description": "climate-skeptic-Turn2", "response": "a b c", "tokens": 3}),
            json!({"conversationId": "climate::skeptic", "prompt": "Given these conflicting views?", "output": "x y"}),
            json!({"description": "not a label", "response": "zzz"}),
            json!({"conversationId": "climate::skeptic", "prompt": "Tell me a joke", "response": "ha"}),
            json!(42),
        ];
        let batch = n.normalize_values(&values);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].branch, Branch::Turn(2));
        assert_eq!(batch.records[0].dimension.as_deref(), Some("skeptic"));
        assert_eq!(batch.records[1].branch, Branch::Turn(4));
        // token count falls back to word count
        assert_eq!(batch.records[1].token_count, 2);

        assert_eq!(batch.skipped_count(), 3);
        assert_eq!(batch.skipped[0].reason, SkipReason::UnparseableLabel("not a label".into()));
        assert_eq!(batch.skipped[1].reason, SkipReason::UnresolvedTurn);
        assert!(matches!(batch.skipped[2].reason, SkipReason::Malformed(_)));
        assert_eq!(batch.input_count(), 5);
    }

    #[test]
    fn test_legacy_compression_records() {
        let n = RecordNormalizer::new(AnalysisMode::Compression);
        let values = vec![
            json!({"topic": "nuclear", "prompt": "Analyze nuclear power.", "response": "r", "tokenCount": 300}),
            json!({"topic": "nuclear", "prompt": "Experts agree nuclear is safe. Analyze it.", "response": "r", "tokenCount": 90}),
            json!({"topic": "nuclear", "prompt": "Hello", "response": "r"}),
            json!({"prompt": "Analyze.", "response": "r"}),
        ];
        let batch = n.normalize_values(&values);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].group_key, "nuclear");
        assert_eq!(batch.skipped[0].reason, SkipReason::UnresolvedBranch);
        assert_eq!(batch.skipped[1].reason, SkipReason::UnresolvedGroup);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let n = RecordNormalizer::new(AnalysisMode::Sequence);
        let values = vec![
            json!({"groupKey": "g", "turn": 1, "dimension": "d", "text": "first", "tokenCount": 1}),
            json!({"groupKey": "g", "turn": 1, "dimension": "d", "text": "second", "tokenCount": 2}),
            json!({"groupKey": "g", "turn": 1, "dimension": "d", "model": "other", "text": "third", "tokenCount": 3}),
        ];
        let batch = n.normalize_values(&values);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].text, "first");
        assert_eq!(batch.skipped, vec![SkippedRecord { index: 1, reason: SkipReason::DuplicateKey }]);
    }

    #[test]
    fn test_blank_group_skipped() {
        let n = RecordNormalizer::new(AnalysisMode::Compression);
        let raw = vec![RawRecord::Explicit(ExplicitRecord {
            group_key: "   ".into(),
            branch_or_turn: BranchOrTurn::Label("baseline".into()),
            dimension: None,
            text: "t".into(),
            token_count: 1,
            latency_ms: None,
            prompt_text: None,
            model: None,
        })];
        let batch = n.normalize(&raw);
        assert!(batch.is_empty());
        assert_eq!(batch.skipped[0].reason, SkipReason::UnresolvedGroup);
    }

    struct AlwaysTurnThree;

    impl BranchClassifier for AlwaysTurnThree {
        fn classify_branch(&self, _prompt: &str) -> BranchClass {
            BranchClass::Unresolved
        }
        fn infer_turn(&self, _prompt: &str) -> Option<u8> {
            Some(3)
        }
    }

    #[test]
    fn test_substituted_classifier() {
        let n = RecordNormalizer::with_classifier(AnalysisMode::Sequence, AlwaysTurnThree);
        let values = vec![json!({"conversationId": "g::d", "prompt": "anything", "response": "r"})];
        let batch = n.normalize_values(&values);
        assert_eq!(batch.records[0].branch, Branch::Turn(3));
    }

    #[test]
    fn test_parse_input_shapes() {
        assert_eq!(parse_input("[1, 2]").unwrap().len(), 2);
        assert_eq!(parse_input(r#"{"results": [{}]}"#).unwrap().len(), 1);
        assert!(matches!(parse_input("{}"), Err(ContainmentError::Parse(_))));
        assert!(matches!(parse_input("not json"), Err(ContainmentError::Parse(_))));
    }
}
