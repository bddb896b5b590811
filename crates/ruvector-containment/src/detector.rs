//! Pairwise containment detection.
//!
//! Three independent checks are run against one response, optionally
//! relative to a baseline response and a history of earlier responses:
//!
//! | Mechanism | Signal | Detected when |
//! |-----------|--------|---------------|
//! | consensus collapse | relative entropy drop vs. baseline | drop > threshold |
//! | recursive defense | self-reference depth | depth > 0.3 (fixed) |
//! | certainty escalation | OLS slope of certainty density | slope > 0.01 (fixed) |
//!
//! The dominant mechanism is the detected one with the highest confidence;
//! exact ties go to the earliest mechanism in the order above.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ContainmentError, Result};
use crate::lexical::{entropy, LexicalMetrics, RECURSION_THRESHOLD};

/// Depth at which recursive-defense confidence saturates.
pub const RECURSION_SATURATION: f64 = 0.5;

/// Certainty-density slope above which escalation is detected.
pub const CERTAINTY_SLOPE_THRESHOLD: f64 = 0.01;

/// Tunable detector thresholds.
///
/// Only the consensus threshold is tunable; the recursion and certainty
/// thresholds are the fixed [`RECURSION_THRESHOLD`], [`RECURSION_SATURATION`]
/// and [`CERTAINTY_SLOPE_THRESHOLD`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Relative entropy drop that counts as consensus collapse
    pub consensus_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { consensus_threshold: 0.30 }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        let value = self.consensus_threshold;
        if !(value.is_finite() && value > 0.0) {
            return Err(ContainmentError::Config(format!(
                "consensus_threshold must be > 0, got {value}"
            )));
        }
        Ok(())
    }
}

/// Containment mechanism, in tie-breaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    ConsensusCollapse,
    RecursiveDefense,
    CertaintyEscalation,
}

impl Mechanism {
    pub const ALL: [Mechanism; 3] = [
        Mechanism::ConsensusCollapse,
        Mechanism::RecursiveDefense,
        Mechanism::CertaintyEscalation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mechanism::ConsensusCollapse => "consensus_collapse",
            Mechanism::RecursiveDefense => "recursive_defense",
            Mechanism::CertaintyEscalation => "certainty_escalation",
        }
    }
}

/// Overall classification: a mechanism or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentType {
    ConsensusCollapse,
    RecursiveDefense,
    CertaintyEscalation,
    None,
}

impl From<Mechanism> for ContainmentType {
    fn from(m: Mechanism) -> Self {
        match m {
            Mechanism::ConsensusCollapse => ContainmentType::ConsensusCollapse,
            Mechanism::RecursiveDefense => ContainmentType::RecursiveDefense,
            Mechanism::CertaintyEscalation => ContainmentType::CertaintyEscalation,
        }
    }
}

impl ContainmentType {
    pub fn name(&self) -> &'static str {
        match self {
            ContainmentType::ConsensusCollapse => "consensus_collapse",
            ContainmentType::RecursiveDefense => "recursive_defense",
            ContainmentType::CertaintyEscalation => "certainty_escalation",
            ContainmentType::None => "none",
        }
    }
}

/// Outcome of one mechanism check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanismResult {
    pub detected: bool,
    /// In `[0, 1]`
    pub confidence: f64,
    /// Raw signal: entropy drop, recursion depth, or certainty slope
    pub signal: f64,
}

impl MechanismResult {
    fn inactive() -> Self {
        Self { detected: false, confidence: 0.0, signal: 0.0 }
    }
}

/// Combined detection outcome for one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected: bool,
    #[serde(rename = "type")]
    pub containment_type: ContainmentType,
    pub confidence: f64,
    pub per_mechanism: BTreeMap<Mechanism, MechanismResult>,
}

impl DetectionResult {
    pub fn mechanism(&self, m: Mechanism) -> Option<&MechanismResult> {
        self.per_mechanism.get(&m)
    }
}

/// What a response is compared against.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionContext<'a> {
    pub baseline_text: Option<&'a str>,
    /// Earlier responses, oldest first
    pub history: &'a [String],
}

impl<'a> DetectionContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(mut self, baseline: &'a str) -> Self {
        self.baseline_text = Some(baseline);
        self
    }

    pub fn with_history(mut self, history: &'a [String]) -> Self {
        self.history = history;
        self
    }
}

/// Applies threshold rules on top of [`LexicalMetrics`].
#[derive(Debug, Clone)]
pub struct PairwiseDetector {
    metrics: LexicalMetrics,
    config: DetectorConfig,
}

impl Default for PairwiseDetector {
    fn default() -> Self {
        Self { metrics: LexicalMetrics::standard(), config: DetectorConfig::default() }
    }
}

impl PairwiseDetector {
    pub fn new(metrics: LexicalMetrics, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { metrics, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Run all checks and pick the dominant mechanism.
    pub fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> DetectionResult {
        let mut per_mechanism = BTreeMap::new();
        per_mechanism.insert(Mechanism::ConsensusCollapse, self.check_consensus_collapse(text, ctx));
        per_mechanism.insert(Mechanism::RecursiveDefense, self.check_recursive_loop(text));
        per_mechanism.insert(
            Mechanism::CertaintyEscalation,
            self.check_certainty_escalation(text, ctx),
        );

        let mut dominant: Option<(Mechanism, f64)> = None;
        for m in Mechanism::ALL {
            let r = &per_mechanism[&m];
            if !r.detected {
                continue;
            }
            // strict comparison keeps the earlier mechanism on exact ties
            if dominant.map_or(true, |(_, best)| r.confidence > best) {
                dominant = Some((m, r.confidence));
            }
        }

        debug!(
            dominant = dominant.map(|(m, _)| m.name()).unwrap_or("none"),
            confidence = dominant.map(|(_, c)| c).unwrap_or(0.0),
            "detection complete"
        );

        match dominant {
            Some((m, confidence)) => DetectionResult {
                detected: true,
                containment_type: m.into(),
                confidence,
                per_mechanism,
            },
            None => DetectionResult {
                detected: false,
                containment_type: ContainmentType::None,
                confidence: 0.0,
                per_mechanism,
            },
        }
    }

    /// Relative entropy drop against the baseline.
    pub fn check_consensus_collapse(&self, text: &str, ctx: &DetectionContext<'_>) -> MechanismResult {
        let Some(baseline) = ctx.baseline_text else {
            return MechanismResult::inactive();
        };
        let baseline_entropy = entropy(baseline);
        let drop = if baseline_entropy > 0.0 {
            (baseline_entropy - entropy(text)) / baseline_entropy
        } else {
            0.0
        };
        let threshold = self.config.consensus_threshold;
        MechanismResult {
            detected: drop > threshold,
            confidence: (drop / threshold).clamp(0.0, 1.0),
            signal: drop,
        }
    }

    /// Self-reference depth of the response itself.
    pub fn check_recursive_loop(&self, text: &str) -> MechanismResult {
        let depth = self.metrics.recursion_depth(text).depth;
        MechanismResult {
            detected: depth > RECURSION_THRESHOLD,
            confidence: (depth / RECURSION_SATURATION).clamp(0.0, 1.0),
            signal: depth,
        }
    }

    /// Trend of certainty density over `history + [text]`.
    pub fn check_certainty_escalation(&self, text: &str, ctx: &DetectionContext<'_>) -> MechanismResult {
        if ctx.history.is_empty() {
            return MechanismResult::inactive();
        }
        let series: Vec<f64> = ctx
            .history
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(text))
            .map(|t| self.metrics.certainty_density(t).density)
            .collect();
        let slope = ols_slope(&series);
        MechanismResult {
            detected: slope > CERTAINTY_SLOPE_THRESHOLD,
            confidence: (slope.abs() * 100.0).min(1.0),
            signal: slope,
        }
    }
}

/// Ordinary-least-squares slope of `ys` against `0..n`.
pub fn ols_slope(ys: &[f64]) -> f64 {
    let n = ys.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut num, mut den) = (0.0_f64, 0.0_f64);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den > 0.0 { num / den } else { 0.0 }
}
