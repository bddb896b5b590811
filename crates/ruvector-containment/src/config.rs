//! Run configuration loaded from TOML.
//!
//! Every section is optional; omitted sections fall back to the built-in
//! lexicon, tier table, heuristics vocabulary and detector thresholds.
//!
//! ```toml
//! [detector]
//! consensus_threshold = 0.25
//!
//! [lexicon]
//! hedge_words = ["might", "may", "perhaps"]
//!
//! [[tiers.tiers]]
//! name = "energy"
//! members = ["nuclear power", "solar"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compression::{CompressionAggregator, TierTable};
use crate::detector::{DetectorConfig, PairwiseDetector};
use crate::error::{ContainmentError, Result};
use crate::heuristics::{PromptHeuristics, PromptHeuristicsConfig};
use crate::lexical::LexicalMetrics;
use crate::lexicon::Lexicon;
use crate::normalizer::{AnalysisMode, RecordNormalizer};
use crate::sequence::SequenceAggregator;

/// Immutable configuration handed to the engine at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detector: DetectorConfig,
    pub lexicon: Lexicon,
    pub tiers: TierTable,
    pub heuristics: PromptHeuristicsConfig,
}

impl AnalysisConfig {
    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| ContainmentError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded analysis config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.lexicon.validate()?;
        self.tiers.validate()?;
        Ok(())
    }

    pub fn metrics(&self) -> Result<LexicalMetrics> {
        LexicalMetrics::new(&self.lexicon)
    }

    pub fn detector(&self) -> Result<PairwiseDetector> {
        PairwiseDetector::new(self.metrics()?, self.detector.clone())
    }

    pub fn normalizer(&self, mode: AnalysisMode) -> Result<RecordNormalizer<PromptHeuristics>> {
        let heuristics = PromptHeuristics::new(&self.heuristics)?;
        Ok(RecordNormalizer::with_classifier(mode, heuristics))
    }

    pub fn compression_aggregator(&self) -> Result<CompressionAggregator> {
        Ok(CompressionAggregator::new(self.detector()?, self.tiers.clone()))
    }

    pub fn sequence_aggregator(&self) -> Result<SequenceAggregator> {
        Ok(SequenceAggregator::new(self.detector()?))
    }
}
