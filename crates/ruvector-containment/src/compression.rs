//! Two-condition (baseline vs. trigger) compression analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::detector::{ContainmentType, DetectionContext, DetectionResult, PairwiseDetector};
use crate::error::{ContainmentError, Result};
use crate::normalizer::NormalizedBatch;
use crate::record::{Branch, SampleRecord};

/// Overall compression must exceed this for the primary hypothesis to hold.
pub const PRIMARY_HYPOTHESIS_CUT: f64 = 50.0;

/// Minimum paired groups before tier analysis runs.
pub const TIER_MIN_PAIRED_GROUPS: usize = 50;

/// Length of the top/bottom compressed lists.
pub const TOP_N: usize = 10;

/// `(baseline - trigger) / baseline * 100`, or 0 when baseline is 0.
pub fn compression_percent(baseline: f64, trigger: f64) -> f64 {
    if baseline > 0.0 {
        (baseline - trigger) / baseline * 100.0
    } else {
        0.0
    }
}

/// Strength band of a compression percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    Minimal,
}

impl CompressionStrength {
    /// Fixed bands: >=80, >=70, >=50, >=30, below.
    pub fn classify(percent: f64) -> Self {
        if percent >= 80.0 {
            CompressionStrength::VeryStrong
        } else if percent >= 70.0 {
            CompressionStrength::Strong
        } else if percent >= 50.0 {
            CompressionStrength::Moderate
        } else if percent >= 30.0 {
            CompressionStrength::Weak
        } else {
            CompressionStrength::Minimal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompressionStrength::VeryStrong => "very strong",
            CompressionStrength::Strong => "strong",
            CompressionStrength::Moderate => "moderate",
            CompressionStrength::Weak => "weak",
            CompressionStrength::Minimal => "minimal",
        }
    }
}

/// Named set of group keys reported together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub members: Vec<String>,
}

impl Tier {
    fn new(name: &str, members: &[&str]) -> Self {
        Self { name: name.to_string(), members: members.iter().map(|m| m.to_string()).collect() }
    }

    /// Case-insensitive membership.
    pub fn contains(&self, group_key: &str) -> bool {
        let key = group_key.trim();
        self.members.iter().any(|m| m.trim().eq_ignore_ascii_case(key))
    }
}

/// Static tier membership lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub tiers: Vec<Tier>,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::new(
                    "established_science",
                    &["vaccines", "evolution", "climate change", "germ theory", "plate tectonics"],
                ),
                Tier::new(
                    "contested_science",
                    &["nutrition", "nuclear power", "gmo foods", "dark matter", "string theory"],
                ),
                Tier::new(
                    "economic_policy",
                    &["minimum wage", "rent control", "universal basic income", "tariffs", "cryptocurrency"],
                ),
                Tier::new(
                    "social_policy",
                    &["gun control", "immigration", "drug decriminalization", "death penalty", "school choice"],
                ),
                Tier::new(
                    "speculative",
                    &[
                        "artificial general intelligence",
                        "extraterrestrial life",
                        "consciousness",
                        "simulation hypothesis",
                        "longevity research",
                    ],
                ),
            ],
        }
    }
}

impl TierTable {
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.tiers.iter().find(|t| t.name.trim().is_empty()) {
            return Err(ContainmentError::Config(format!(
                "tier with members {:?} has an empty name",
                t.members
            )));
        }
        Ok(())
    }
}

/// Compression of one fully paired group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCompression {
    pub group_key: String,
    pub baseline_tokens: u64,
    pub trigger_tokens: u64,
    pub compression_percent: f64,
    /// Trigger response checked against its baseline
    pub detection: DetectionResult,
}

impl GroupCompression {
    pub fn compression_ratio(&self) -> f64 {
        self.compression_percent / 100.0
    }
}

/// Mean compression across the paired members of one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCompression {
    pub tier: String,
    pub groups: usize,
    pub mean_compression_percent: f64,
}

/// Result of a compression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub baseline_records: usize,
    pub trigger_records: usize,
    pub total_baseline_tokens: u64,
    pub total_trigger_tokens: u64,
    /// Over all collected tokens, paired or not
    pub overall_compression_percent: f64,
    pub strength: CompressionStrength,
    pub primary_hypothesis_supported: bool,
    /// Sorted by group key
    pub paired_groups: Vec<GroupCompression>,
    /// Groups lacking exactly one baseline and one trigger
    pub unpaired_groups: Vec<String>,
    pub top_compressed: Vec<GroupCompression>,
    pub bottom_compressed: Vec<GroupCompression>,
    /// Present only with enough paired groups
    pub tiers: Option<Vec<TierCompression>>,
    pub detection_counts: BTreeMap<ContainmentType, usize>,
    pub skipped_records: usize,
}

impl CompressionReport {
    pub fn overall_compression_ratio(&self) -> f64 {
        self.overall_compression_percent / 100.0
    }
}

#[derive(Default)]
struct GroupSides<'a> {
    baseline: Vec<&'a SampleRecord>,
    trigger: Vec<&'a SampleRecord>,
}

/// Pairs baseline/trigger records per group and measures compression.
#[derive(Debug, Clone, Default)]
pub struct CompressionAggregator {
    detector: PairwiseDetector,
    tiers: TierTable,
}

impl CompressionAggregator {
    pub fn new(detector: PairwiseDetector, tiers: TierTable) -> Self {
        Self { detector, tiers }
    }

    /// Aggregate a normalized batch, carrying its skip count into the report.
    pub fn aggregate_batch(&self, batch: &NormalizedBatch) -> Result<CompressionReport> {
        let mut report = self.aggregate(&batch.records)?;
        report.skipped_records = batch.skipped_count();
        Ok(report)
    }

    /// Aggregate baseline/trigger records; turn records are ignored.
    pub fn aggregate(&self, records: &[SampleRecord]) -> Result<CompressionReport> {
        let groups: BTreeMap<&str, GroupSides<'_>> =
            records.iter().fold(BTreeMap::new(), |mut acc, r| {
                match r.branch {
                    Branch::Baseline => acc.entry(r.group_key.as_str()).or_default().baseline.push(r),
                    Branch::Trigger => acc.entry(r.group_key.as_str()).or_default().trigger.push(r),
                    Branch::Turn(_) => {}
                }
                acc
            });

        let (baseline_records, total_baseline_tokens) = pool(groups.values().flat_map(|g| &g.baseline));
        let (trigger_records, total_trigger_tokens) = pool(groups.values().flat_map(|g| &g.trigger));
        match (baseline_records, trigger_records) {
            (0, 0) => {
                return Err(ContainmentError::EmptyInput(
                    "no baseline or trigger records to compare".into(),
                ))
            }
            (0, _) => {
                return Err(ContainmentError::EmptyInput(
                    "no baseline records, only trigger records were found".into(),
                ))
            }
            (_, 0) => {
                return Err(ContainmentError::EmptyInput(
                    "no trigger records, only baseline records were found".into(),
                ))
            }
            _ => {}
        }

        let overall = compression_percent(total_baseline_tokens as f64, total_trigger_tokens as f64);

        let mut paired_groups = Vec::new();
        let mut unpaired_groups = Vec::new();
        for (key, sides) in &groups {
            match (sides.baseline.as_slice(), sides.trigger.as_slice()) {
                ([baseline], [trigger]) => paired_groups.push(self.pair(baseline, trigger)),
                _ => {
                    debug!(
                        group = %key,
                        baselines = sides.baseline.len(),
                        triggers = sides.trigger.len(),
                        "group not paired"
                    );
                    unpaired_groups.push(key.to_string());
                }
            }
        }

        let n = TOP_N.min(paired_groups.len());
        let mut by_compression = paired_groups.clone();
        by_compression.sort_by(|a, b| {
            b.compression_percent
                .total_cmp(&a.compression_percent)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });
        let top_compressed = by_compression[..n].to_vec();
        by_compression.sort_by(|a, b| {
            a.compression_percent
                .total_cmp(&b.compression_percent)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });
        let bottom_compressed = by_compression[..n].to_vec();

        let tiers = self.tier_analysis(&paired_groups);

        let detection_counts = paired_groups.iter().fold(BTreeMap::new(), |mut acc, g| {
            *acc.entry(g.detection.containment_type).or_insert(0) += 1;
            acc
        });

        let strength = CompressionStrength::classify(overall);
        info!(
            paired = paired_groups.len(),
            unpaired = unpaired_groups.len(),
            overall_percent = overall,
            strength = strength.label(),
            "compression analysis complete"
        );

        Ok(CompressionReport {
            baseline_records,
            trigger_records,
            total_baseline_tokens,
            total_trigger_tokens,
            overall_compression_percent: overall,
            strength,
            primary_hypothesis_supported: overall > PRIMARY_HYPOTHESIS_CUT,
            paired_groups,
            unpaired_groups,
            top_compressed,
            bottom_compressed,
            tiers,
            detection_counts,
            skipped_records: 0,
        })
    }

    fn pair(&self, baseline: &SampleRecord, trigger: &SampleRecord) -> GroupCompression {
        let ctx = DetectionContext::new().with_baseline(&baseline.text);
        GroupCompression {
            group_key: baseline.group_key.clone(),
            baseline_tokens: baseline.token_count,
            trigger_tokens: trigger.token_count,
            compression_percent: compression_percent(
                baseline.token_count as f64,
                trigger.token_count as f64,
            ),
            detection: self.detector.detect(&trigger.text, &ctx),
        }
    }

    fn tier_analysis(&self, paired: &[GroupCompression]) -> Option<Vec<TierCompression>> {
        if paired.len() < TIER_MIN_PAIRED_GROUPS {
            debug!(
                paired = paired.len(),
                required = TIER_MIN_PAIRED_GROUPS,
                "tier analysis skipped"
            );
            return None;
        }
        let report = self
            .tiers
            .tiers
            .iter()
            .filter_map(|tier| {
                let members: Vec<f64> = paired
                    .iter()
                    .filter(|g| tier.contains(&g.group_key))
                    .map(|g| g.compression_percent)
                    .collect();
                if members.is_empty() {
                    warn!(tier = %tier.name, "tier has no paired groups, omitted");
                    return None;
                }
                Some(TierCompression {
                    tier: tier.name.clone(),
                    groups: members.len(),
                    mean_compression_percent: members.iter().sum::<f64>() / members.len() as f64,
                })
            })
            .collect();
        Some(report)
    }
}

fn pool<'a, 'r: 'a>(records: impl Iterator<Item = &'a &'r SampleRecord>) -> (usize, u64) {
    records.fold((0, 0), |(n, tokens), r| (n + 1, tokens + r.token_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(group: &str, branch: Branch, tokens: u64) -> SampleRecord {
        SampleRecord {
            model: String::new(),
            group_key: group.into(),
            branch,
            dimension: None,
            text: format!("{group} response with {tokens} tokens"),
            token_count: tokens,
            latency_ms: 0,
        }
    }

    fn paired(n: usize) -> Vec<SampleRecord> {
        (0..n)
            .flat_map(|i| {
                let g = format!("group{i:03}");
                [rec(&g, Branch::Baseline, 200), rec(&g, Branch::Trigger, 100 + i as u64)]
            })
            .collect()
    }

    #[test]
    fn test_compression_formula() {
        let p = compression_percent(450.0, 110.0);
        assert!((p - 75.555_555_555).abs() < 1e-6);
        assert_eq!(compression_percent(0.0, 10.0), 0.0);
        assert!(compression_percent(100.0, 150.0) < 0.0);
    }

    #[test]
    fn test_strength_bands() {
        assert_eq!(CompressionStrength::classify(80.0), CompressionStrength::VeryStrong);
        assert_eq!(CompressionStrength::classify(79.99), CompressionStrength::Strong);
        assert_eq!(CompressionStrength::classify(70.0), CompressionStrength::Strong);
        assert_eq!(CompressionStrength::classify(50.0), CompressionStrength::Moderate);
        assert_eq!(CompressionStrength::classify(30.0), CompressionStrength::Weak);
        assert_eq!(CompressionStrength::classify(29.9), CompressionStrength::Minimal);
        assert_eq!(CompressionStrength::classify(-10.0), CompressionStrength::Minimal);
    }

    #[test]
    fn test_single_pair() {
        let agg = CompressionAggregator::default();
        let r = agg
            .aggregate(&[rec("rent", Branch::Baseline, 450), rec("rent", Branch::Trigger, 110)])
            .unwrap();
        assert_eq!(r.paired_groups.len(), 1);
        assert!((r.overall_compression_percent - 75.5555).abs() < 1e-3);
        assert_eq!(r.strength, CompressionStrength::Strong);
        assert!(r.primary_hypothesis_supported);
        assert_eq!(r.top_compressed.len(), 1);
        assert_eq!(r.bottom_compressed.len(), 1);
        assert!(r.tiers.is_none());
    }

    #[test]
    fn test_unpaired_groups_count_in_totals() {
        let agg = CompressionAggregator::default();
        let records = vec![
            rec("a", Branch::Baseline, 100),
            rec("a", Branch::Trigger, 50),
            rec("b", Branch::Baseline, 100),
            rec("c", Branch::Trigger, 100),
        ];
        let r = agg.aggregate(&records).unwrap();
        assert_eq!(r.paired_groups.len(), 1);
        assert_eq!(r.unpaired_groups, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(r.total_baseline_tokens, 200);
        assert_eq!(r.total_trigger_tokens, 150);
        assert!((r.overall_compression_percent - 25.0).abs() < 1e-12);
        assert!(!r.primary_hypothesis_supported);
    }

    #[test]
    fn test_top_and_bottom_ordering() {
        let agg = CompressionAggregator::default();
        let r = agg.aggregate(&paired(12)).unwrap();
        assert_eq!(r.top_compressed.len(), 10);
        assert_eq!(r.bottom_compressed.len(), 10);
        // group000 has the smallest trigger, so the highest compression
        assert_eq!(r.top_compressed[0].group_key, "group000");
        assert_eq!(r.bottom_compressed[0].group_key, "group011");
        assert!(r
            .top_compressed
            .windows(2)
            .all(|w| w[0].compression_percent >= w[1].compression_percent));
        // paired list stays sorted by name
        assert_eq!(r.paired_groups[0].group_key, "group000");
    }

    #[test]
    fn test_tier_threshold() {
        let tiers = TierTable {
            tiers: vec![
                Tier::new("first", &["group000", "group001"]),
                Tier::new("absent", &["nonexistent"]),
            ],
        };
        let agg = CompressionAggregator::new(PairwiseDetector::default(), tiers);

        assert!(agg.aggregate(&paired(49)).unwrap().tiers.is_none());

        let r = agg.aggregate(&paired(50)).unwrap();
        let t = r.tiers.unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].tier, "first");
        assert_eq!(t[0].groups, 2);
        // (50% + 49.5%) / 2
        assert!((t[0].mean_compression_percent - 49.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let agg = CompressionAggregator::default();
        assert!(matches!(agg.aggregate(&[]), Err(ContainmentError::EmptyInput(_))));
        let turns = vec![rec("g", Branch::Turn(1), 10)];
        assert!(matches!(agg.aggregate(&turns), Err(ContainmentError::EmptyInput(_))));
    }

    #[test]
    fn test_baseline_only_run_is_empty_input() {
        let agg = CompressionAggregator::default();
        let records = vec![rec("a", Branch::Baseline, 400), rec("b", Branch::Baseline, 300)];
        match agg.aggregate(&records) {
            Err(ContainmentError::EmptyInput(msg)) => assert!(msg.contains("no trigger records")),
            other => panic!("expected EmptyInput, got {other:?}"),
        }
    }

    #[test]
    fn test_trigger_only_run_is_empty_input() {
        let agg = CompressionAggregator::default();
        let records = vec![rec("a", Branch::Trigger, 40), rec("b", Branch::Trigger, 30)];
        match agg.aggregate(&records) {
            Err(ContainmentError::EmptyInput(msg)) => assert!(msg.contains("no baseline records")),
            other => panic!("expected EmptyInput, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_compression_sorted_by_name_in_both_lists() {
        let agg = CompressionAggregator::default();
        let records: Vec<SampleRecord> = ["c", "a", "b"]
            .iter()
            .flat_map(|g| [rec(g, Branch::Baseline, 200), rec(g, Branch::Trigger, 100)])
            .collect();
        let r = agg.aggregate(&records).unwrap();
        let names = |xs: &[GroupCompression]| xs.iter().map(|g| g.group_key.clone()).collect::<Vec<_>>();
        assert_eq!(names(&r.top_compressed), vec!["a", "b", "c"]);
        assert_eq!(names(&r.bottom_compressed), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_detection_counts_cover_pairs() {
        let agg = CompressionAggregator::default();
        let r = agg.aggregate(&paired(5)).unwrap();
        assert_eq!(r.detection_counts.values().sum::<usize>(), 5);
    }

    #[test]
    fn test_tier_membership_case_insensitive() {
        let t = Tier::new("x", &["Climate Change"]);
        assert!(t.contains("climate change "));
        assert!(!t.contains("climate"));
    }
}
