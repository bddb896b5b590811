//! Multi-turn sequence analysis.
//!
//! Records are grouped by turn and by (turn, dimension). Four fixed
//! comparisons run over the per-turn means:
//!
//! | Analysis | Turns | Formula | Classified |
//! |----------|-------|---------|------------|
//! | lock-in | 1 -> 2 | `(t1 - t2) / t1` | yes |
//! | persistence | 1 -> 4 | `(t1 - t4) / t1` | no |
//! | dimension bias | 3 | `(max - min) / min` over dimensions | flag at 20% |
//! | escape | 1 -> 5 | `t5 / t1` | yes |
//!
//! Escape uses a ratio rather than a normalized loss, so values above 100%
//! mean the later turn exceeded the first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compression::compression_percent;
use crate::detector::{ContainmentType, DetectionContext, PairwiseDetector};
use crate::error::{ContainmentError, Result};
use crate::lexical::MetricVector;
use crate::normalizer::NormalizedBatch;
use crate::record::SampleRecord;

/// Dimension bias is flagged above this absolute percentage difference.
pub const BIAS_FLAG_PERCENT: f64 = 20.0;

/// Turn of the dimension-bias comparison.
pub const BIAS_TURN: u8 = 3;

/// `later / base * 100`. A zero base has nothing to recover and counts as 100%.
pub fn recovery_percent(base: f64, later: f64) -> f64 {
    if base > 0.0 {
        later / base * 100.0
    } else {
        100.0
    }
}

/// Difference between the highest and lowest value relative to the lowest.
/// `None` when the lowest is zero.
pub fn bias_percent(lowest: f64, highest: f64) -> Option<f64> {
    if lowest > 0.0 {
        Some((highest - lowest) / lowest * 100.0)
    } else if highest > 0.0 {
        None
    } else {
        Some(0.0)
    }
}

/// Per-sample metrics, one row of the sequence export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleMetrics {
    pub model: String,
    pub group: String,
    pub dimension: String,
    pub turn: u8,
    pub tokens: u64,
    pub entropy: f64,
    pub hedge_count: usize,
    pub certainty_count: usize,
    pub latency_ms: u64,
    /// Response length in characters
    pub length: usize,
}

/// Means over the samples of one turn, or one (turn, dimension) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    pub turn: u8,
    pub dimension: Option<String>,
    pub sample_count: usize,
    pub mean_tokens: f64,
    pub mean_entropy: f64,
    pub mean_hedge_count: f64,
    pub mean_certainty_count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockInClass {
    StrongLockIn,
    ModerateLockIn,
    Minimal,
}

impl LockInClass {
    /// Both >= 50% is strong; either >= 30% is moderate.
    pub fn classify(token_compression: f64, hedge_drop: f64) -> Self {
        if token_compression >= 50.0 && hedge_drop >= 50.0 {
            LockInClass::StrongLockIn
        } else if token_compression >= 30.0 || hedge_drop >= 30.0 {
            LockInClass::ModerateLockIn
        } else {
            LockInClass::Minimal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LockInClass::StrongLockIn => "strong lock-in",
            LockInClass::ModerateLockIn => "moderate lock-in",
            LockInClass::Minimal => "minimal",
        }
    }
}

/// Turn 1 -> 2 shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInAnalysis {
    pub token_compression_percent: f64,
    pub hedge_drop_percent: f64,
    pub classification: LockInClass,
}

/// Turn 1 -> 4 sustained suppression. Left unclassified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceAnalysis {
    pub token_suppression_percent: f64,
    pub hedge_suppression_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionHedge {
    pub dimension: String,
    pub sample_count: usize,
    pub mean_hedge_count: f64,
}

/// Hedging spread across dimensions at turn 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionBiasAnalysis {
    /// Sorted by dimension
    pub dimensions: Vec<DimensionHedge>,
    pub highest: String,
    pub lowest: String,
    /// `None` when the lowest mean is zero and the highest is not
    pub difference_percent: Option<f64>,
    pub significant_bias: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeClass {
    FullEscape,
    EscapeSuccessful,
    PartialEscape,
    EscapeFailed,
}

impl EscapeClass {
    /// Both >= 95% full, both >= 80% successful, either >= 60% partial.
    pub fn classify(token_recovery: f64, hedge_recovery: f64) -> Self {
        if token_recovery >= 95.0 && hedge_recovery >= 95.0 {
            EscapeClass::FullEscape
        } else if token_recovery >= 80.0 && hedge_recovery >= 80.0 {
            EscapeClass::EscapeSuccessful
        } else if token_recovery >= 60.0 || hedge_recovery >= 60.0 {
            EscapeClass::PartialEscape
        } else {
            EscapeClass::EscapeFailed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EscapeClass::FullEscape => "full escape",
            EscapeClass::EscapeSuccessful => "escape successful",
            EscapeClass::PartialEscape => "partial escape",
            EscapeClass::EscapeFailed => "escape failed, containment irreversible",
        }
    }
}

/// Turn 1 -> 5 recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscapeAnalysis {
    pub token_recovery_percent: f64,
    pub hedge_recovery_percent: f64,
    pub classification: EscapeClass,
}

/// Detector outcomes for all samples of one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDetectionSummary {
    pub turn: u8,
    pub samples: usize,
    pub detected: usize,
    pub by_type: BTreeMap<ContainmentType, usize>,
    pub mean_confidence: f64,
}

/// Result of a sequence run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceReport {
    pub total_records: usize,
    pub skipped_records: usize,
    /// Turns with at least one record, ascending
    pub turns: Vec<TurnSummary>,
    pub turn_dimensions: Vec<TurnSummary>,
    pub lock_in: Option<LockInAnalysis>,
    pub persistence: Option<PersistenceAnalysis>,
    pub dimension_bias: Option<DimensionBiasAnalysis>,
    pub escape: Option<EscapeAnalysis>,
    pub containment: Vec<TurnDetectionSummary>,
    /// Sorted by model, group, dimension, turn
    pub samples: Vec<SampleMetrics>,
}

impl SequenceReport {
    pub fn turn(&self, turn: u8) -> Option<&TurnSummary> {
        self.turns.iter().find(|t| t.turn == turn)
    }
}

struct Scored<'a> {
    record: &'a SampleRecord,
    turn: u8,
    metrics: MetricVector,
}

/// Runs the fixed multi-turn analyses.
#[derive(Debug, Clone, Default)]
pub struct SequenceAggregator {
    detector: PairwiseDetector,
}

impl SequenceAggregator {
    pub fn new(detector: PairwiseDetector) -> Self {
        Self { detector }
    }

    pub fn aggregate_batch(&self, batch: &NormalizedBatch) -> Result<SequenceReport> {
        let mut report = self.aggregate(&batch.records)?;
        report.skipped_records = batch.skipped_count();
        Ok(report)
    }

    /// Aggregate turn records; baseline/trigger records are ignored.
    pub fn aggregate(&self, records: &[SampleRecord]) -> Result<SequenceReport> {
        let metrics = self.detector.metrics();
        let scored: Vec<Scored<'_>> = records
            .iter()
            .filter_map(|r| {
                r.turn().map(|turn| Scored { record: r, turn, metrics: metrics.metric_vector(&r.text) })
            })
            .collect();
        if scored.is_empty() {
            return Err(ContainmentError::EmptyInput("no turn records to analyze".into()));
        }

        let by_turn: BTreeMap<u8, Vec<&Scored<'_>>> =
            scored.iter().fold(BTreeMap::new(), |mut acc, s| {
                acc.entry(s.turn).or_insert_with(Vec::new).push(s);
                acc
            });
        let by_turn_dim: BTreeMap<(u8, Option<&str>), Vec<&Scored<'_>>> =
            scored.iter().fold(BTreeMap::new(), |mut acc, s| {
                acc.entry((s.turn, s.record.dimension.as_deref()))
                    .or_insert_with(Vec::new)
                    .push(s);
                acc
            });

        let turns: Vec<TurnSummary> =
            by_turn.iter().map(|(turn, xs)| summarize(*turn, None, xs)).collect();
        let turn_dimensions: Vec<TurnSummary> = by_turn_dim
            .iter()
            .map(|((turn, dim), xs)| summarize(*turn, dim.map(str::to_string), xs))
            .collect();

        let summary = |turn: u8| turns.iter().find(|t| t.turn == turn);

        let lock_in = match (summary(1), summary(2)) {
            (Some(t1), Some(t2)) => {
                let tokens = compression_percent(t1.mean_tokens, t2.mean_tokens);
                let hedges = compression_percent(t1.mean_hedge_count, t2.mean_hedge_count);
                Some(LockInAnalysis {
                    token_compression_percent: tokens,
                    hedge_drop_percent: hedges,
                    classification: LockInClass::classify(tokens, hedges),
                })
            }
            _ => {
                debug!("lock-in analysis skipped, turn 1 or 2 missing");
                None
            }
        };

        let persistence = match (summary(1), summary(4)) {
            (Some(t1), Some(t4)) => Some(PersistenceAnalysis {
                token_suppression_percent: compression_percent(t1.mean_tokens, t4.mean_tokens),
                hedge_suppression_percent: compression_percent(
                    t1.mean_hedge_count,
                    t4.mean_hedge_count,
                ),
            }),
            _ => {
                debug!("persistence analysis skipped, turn 1 or 4 missing");
                None
            }
        };

        let escape = match (summary(1), summary(5)) {
            (Some(t1), Some(t5)) => {
                let tokens = recovery_percent(t1.mean_tokens, t5.mean_tokens);
                let hedges = recovery_percent(t1.mean_hedge_count, t5.mean_hedge_count);
                Some(EscapeAnalysis {
                    token_recovery_percent: tokens,
                    hedge_recovery_percent: hedges,
                    classification: EscapeClass::classify(tokens, hedges),
                })
            }
            _ => {
                debug!("escape analysis skipped, turn 1 or 5 missing");
                None
            }
        };

        let dimension_bias = dimension_bias(by_turn.get(&BIAS_TURN).map(Vec::as_slice).unwrap_or(&[]));
        let containment = self.detect_containment(&scored);

        let mut samples: Vec<SampleMetrics> = scored.iter().map(sample_metrics).collect();
        samples.sort_by(|a, b| {
            (&a.model, &a.group, &a.dimension, a.turn).cmp(&(&b.model, &b.group, &b.dimension, b.turn))
        });

        info!(
            records = scored.len(),
            turns = turns.len(),
            lock_in = lock_in.as_ref().map(|l| l.classification.label()).unwrap_or("n/a"),
            escape = escape.as_ref().map(|e| e.classification.label()).unwrap_or("n/a"),
            "sequence analysis complete"
        );

        Ok(SequenceReport {
            total_records: scored.len(),
            skipped_records: 0,
            turns,
            turn_dimensions,
            lock_in,
            persistence,
            dimension_bias,
            escape,
            containment,
            samples,
        })
    }

    /// Each conversation is checked turn by turn against its first turn,
    /// with the earlier turns as history.
    fn detect_containment(&self, scored: &[Scored<'_>]) -> Vec<TurnDetectionSummary> {
        let conversations: BTreeMap<(&str, &str, Option<&str>), Vec<&Scored<'_>>> =
            scored.iter().fold(BTreeMap::new(), |mut acc, s| {
                let key = (
                    s.record.model.as_str(),
                    s.record.group_key.as_str(),
                    s.record.dimension.as_deref(),
                );
                acc.entry(key).or_insert_with(Vec::new).push(s);
                acc
            });

        let mut per_turn: BTreeMap<u8, (usize, usize, BTreeMap<ContainmentType, usize>, f64)> =
            BTreeMap::new();
        for ((model, group, dimension), mut turns) in conversations {
            turns.sort_by_key(|s| s.turn);
            let Some((first, rest)) = turns.split_first() else { continue };
            if first.turn != 1 {
                debug!(
                    model,
                    group,
                    dimension = dimension.unwrap_or(""),
                    first_turn = first.turn,
                    "conversation has no turn 1, detection skipped"
                );
                continue;
            }
            let mut history = vec![first.record.text.clone()];
            for s in rest {
                let ctx = DetectionContext::new()
                    .with_baseline(&first.record.text)
                    .with_history(&history);
                let result = self.detector.detect(&s.record.text, &ctx);
                let entry = per_turn.entry(s.turn).or_default();
                entry.0 += 1;
                if result.detected {
                    entry.1 += 1;
                }
                *entry.2.entry(result.containment_type).or_insert(0) += 1;
                entry.3 += result.confidence;
                history.push(s.record.text.clone());
            }
        }

        per_turn
            .into_iter()
            .map(|(turn, (samples, detected, by_type, confidence))| TurnDetectionSummary {
                turn,
                samples,
                detected,
                by_type,
                mean_confidence: confidence / samples as f64,
            })
            .collect()
    }
}

fn summarize(turn: u8, dimension: Option<String>, xs: &[&Scored<'_>]) -> TurnSummary {
    TurnSummary {
        turn,
        dimension,
        sample_count: xs.len(),
        mean_tokens: mean(xs, |s| s.record.token_count as f64),
        mean_entropy: mean(xs, |s| s.metrics.entropy),
        mean_hedge_count: mean(xs, |s| s.metrics.hedge_count as f64),
        mean_certainty_count: mean(xs, |s| s.metrics.certainty_count as f64),
    }
}

fn mean<F>(xs: &[&Scored<'_>], f: F) -> f64
where
    F: Fn(&Scored<'_>) -> f64,
{
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().map(|s| f(*s)).sum::<f64>() / xs.len() as f64
}

fn dimension_bias(turn_samples: &[&Scored<'_>]) -> Option<DimensionBiasAnalysis> {
    let by_dim: BTreeMap<&str, (usize, f64)> =
        turn_samples.iter().fold(BTreeMap::new(), |mut acc, s| {
            if let Some(dim) = s.record.dimension.as_deref() {
                let e = acc.entry(dim).or_insert((0, 0.0));
                e.0 += 1;
                e.1 += s.metrics.hedge_count as f64;
            }
            acc
        });
    if by_dim.len() < 2 {
        debug!(dimensions = by_dim.len(), "dimension bias analysis skipped");
        return None;
    }

    let dimensions: Vec<DimensionHedge> = by_dim
        .into_iter()
        .map(|(dim, (n, hedges))| DimensionHedge {
            dimension: dim.to_string(),
            sample_count: n,
            mean_hedge_count: hedges / n as f64,
        })
        .collect();

    // first in dimension order wins ties
    let mut highest = &dimensions[0];
    let mut lowest = &dimensions[0];
    for d in &dimensions[1..] {
        if d.mean_hedge_count > highest.mean_hedge_count {
            highest = d;
        }
        if d.mean_hedge_count < lowest.mean_hedge_count {
            lowest = d;
        }
    }

    let difference_percent = bias_percent(lowest.mean_hedge_count, highest.mean_hedge_count);
    let significant_bias = match difference_percent {
        Some(p) => p.abs() > BIAS_FLAG_PERCENT,
        None => true,
    };
    let (highest, lowest) = (highest.dimension.clone(), lowest.dimension.clone());

    Some(DimensionBiasAnalysis { dimensions, highest, lowest, difference_percent, significant_bias })
}

fn sample_metrics(s: &Scored<'_>) -> SampleMetrics {
    SampleMetrics {
        model: s.record.model.clone(),
        group: s.record.group_key.clone(),
        dimension: s.record.dimension.clone().unwrap_or_default(),
        turn: s.turn,
        tokens: s.record.token_count,
        entropy: s.metrics.entropy,
        hedge_count: s.metrics.hedge_count,
        certainty_count: s.metrics.certainty_count,
        latency_ms: s.record.latency_ms,
        length: s.record.text.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Branch;

    fn rec(group: &str, dim: &str, turn: u8, tokens: u64, text: &str) -> SampleRecord {
        SampleRecord {
            model: "m".into(),
            group_key: group.into(),
            branch: Branch::Turn(turn),
            dimension: Some(dim.into()),
            text: text.into(),
            token_count: tokens,
            latency_ms: 100,
        }
    }

    #[test]
    fn test_formulas() {
        assert!((recovery_percent(412.5, 476.5) - 115.515_151_5).abs() < 1e-6);
        assert_eq!(recovery_percent(0.0, 3.0), 100.0);
        let p = bias_percent(0.33, 1.67).unwrap();
        assert!((p - 406.06).abs() < 0.01);
        assert_eq!(bias_percent(0.67, 0.67), Some(0.0));
        assert_eq!(bias_percent(0.0, 1.0), None);
        assert_eq!(bias_percent(0.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_classifications() {
        assert_eq!(LockInClass::classify(50.0, 50.0), LockInClass::StrongLockIn);
        assert_eq!(LockInClass::classify(60.0, 10.0), LockInClass::ModerateLockIn);
        assert_eq!(LockInClass::classify(10.0, 30.0), LockInClass::ModerateLockIn);
        assert_eq!(LockInClass::classify(29.0, 29.0), LockInClass::Minimal);

        assert_eq!(EscapeClass::classify(115.5, 100.0), EscapeClass::FullEscape);
        assert_eq!(EscapeClass::classify(96.0, 85.0), EscapeClass::EscapeSuccessful);
        assert_eq!(EscapeClass::classify(70.0, 10.0), EscapeClass::PartialEscape);
        assert_eq!(EscapeClass::classify(50.0, 59.9), EscapeClass::EscapeFailed);
    }

    #[test]
    fn test_escape_from_means() {
        // turn 1 tokens 400 and 425 -> 412.5; turn 5 tokens 450 and 503 -> 476.5
        let records = vec![
            rec("a", "x", 1, 400, "It might work."),
            rec("b", "x", 1, 425, "It may work."),
            rec("a", "x", 5, 450, "It might work, perhaps."),
            rec("b", "x", 5, 503, "It could work."),
        ];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        let e = r.escape.unwrap();
        assert!((e.token_recovery_percent - 115.515).abs() < 1e-3);
        // hedges: turn 1 mean 1.0, turn 5 mean 1.5
        assert!((e.hedge_recovery_percent - 150.0).abs() < 1e-9);
        assert_eq!(e.classification, EscapeClass::FullEscape);
        assert!(r.lock_in.is_none());
        assert!(r.persistence.is_none());
    }

    #[test]
    fn test_lock_in_and_persistence() {
        let records = vec![
            rec("a", "x", 1, 400, "It might, perhaps, possibly work."),
            rec("a", "x", 2, 100, "It works."),
            rec("a", "x", 4, 200, "It may work."),
        ];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        let l = r.lock_in.unwrap();
        assert!((l.token_compression_percent - 75.0).abs() < 1e-9);
        assert!((l.hedge_drop_percent - 100.0).abs() < 1e-9);
        assert_eq!(l.classification, LockInClass::StrongLockIn);

        let p = r.persistence.unwrap();
        assert!((p.token_suppression_percent - 50.0).abs() < 1e-9);
        assert!((p.hedge_suppression_percent - (2.0 / 3.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_bias() {
        let records = vec![
            rec("a", "doctor", 3, 10, "Clear answer."),
            rec("b", "doctor", 3, 10, "It might be."),
            rec("a", "skeptic", 3, 10, "It might be, perhaps."),
            rec("b", "skeptic", 3, 10, "It may perhaps seem so."),
        ];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        let b = r.dimension_bias.unwrap();
        assert_eq!(b.highest, "skeptic");
        assert_eq!(b.lowest, "doctor");
        // 0.5 vs 2.0
        assert!((b.difference_percent.unwrap() - 300.0).abs() < 1e-9);
        assert!(b.significant_bias);
    }

    #[test]
    fn test_dimension_bias_equal_means() {
        let records = vec![
            rec("a", "doctor", 3, 10, "It might be."),
            rec("a", "skeptic", 3, 10, "It may be."),
        ];
        let b = SequenceAggregator::default().aggregate(&records).unwrap().dimension_bias.unwrap();
        assert_eq!(b.difference_percent, Some(0.0));
        assert!(!b.significant_bias);
    }

    #[test]
    fn test_dimension_bias_needs_two_dimensions() {
        let records = vec![rec("a", "doctor", 3, 10, "x"), rec("b", "doctor", 3, 10, "y")];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        assert!(r.dimension_bias.is_none());
    }

    #[test]
    fn test_missing_turns_not_zero_filled() {
        let records = vec![rec("a", "x", 1, 10, "x"), rec("a", "x", 3, 10, "y")];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        assert_eq!(r.turns.iter().map(|t| t.turn).collect::<Vec<_>>(), vec![1, 3]);
        assert!(r.turn(2).is_none());
    }

    #[test]
    fn test_containment_summary_per_turn() {
        let records = vec![
            rec("a", "x", 1, 10, "Rates might rise or fall depending on many varied economic factors."),
            rec("a", "x", 2, 10, "Rates rise."),
            rec("a", "x", 3, 10, "Therefore rates rise. Thus it is proven."),
        ];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        assert_eq!(r.containment.len(), 2);
        assert_eq!(r.containment[0].turn, 2);
        assert_eq!(r.containment[0].samples, 1);
        assert_eq!(r.containment[0].detected, 1);
        assert_eq!(r.containment[1].by_type.values().sum::<usize>(), 1);
    }

    #[test]
    fn test_conversation_without_turn_one_not_detected() {
        let records = vec![
            rec("a", "x", 2, 10, "Rates might rise or fall depending on many varied economic factors."),
            rec("a", "x", 3, 10, "Rates rise."),
            rec("b", "x", 1, 10, "Rates might rise or fall depending on many varied economic factors."),
            rec("b", "x", 3, 10, "Rates rise."),
        ];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        // only conversation "b" is scored; "a" would otherwise add a turn 2 baseline
        assert_eq!(r.containment.len(), 1);
        assert_eq!(r.containment[0].turn, 3);
        assert_eq!(r.containment[0].samples, 1);
    }

    #[test]
    fn test_samples_sorted() {
        let records = vec![
            rec("b", "x", 2, 10, "x"),
            rec("a", "y", 1, 10, "y"),
            rec("a", "x", 2, 10, "z"),
            rec("a", "x", 1, 10, "w"),
        ];
        let r = SequenceAggregator::default().aggregate(&records).unwrap();
        let order: Vec<_> = r.samples.iter().map(|s| (s.group.as_str(), s.dimension.as_str(), s.turn)).collect();
        assert_eq!(order, vec![("a", "x", 1), ("a", "x", 2), ("a", "y", 1), ("b", "x", 2)]);
        assert_eq!(r.turn_dimensions.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let agg = SequenceAggregator::default();
        assert!(matches!(agg.aggregate(&[]), Err(ContainmentError::EmptyInput(_))));
    }
}
