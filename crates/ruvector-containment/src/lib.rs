//! # Ruvector Containment
//!
//! Behavioral-shift metrics for LLM evaluation runs. Compares model
//! responses across experimental conditions (baseline vs. trigger prompts,
//! or turns of a scripted multi-turn conversation) and classifies the
//! shift as compression, lock-in, escape or bias.
//!
//! ## Pipeline
//!
//! ```text
//! raw JSON -> RecordNormalizer -> CompressionAggregator | SequenceAggregator -> report + CSV
//!                                       |                       |
//!                                       +--- PairwiseDetector --+
//!                                                 |
//!                                           LexicalMetrics
//! ```
//!
//! - [`lexical`]: entropy, hedge/certainty density, semantic diversity,
//!   coherence and self-reference depth of one text
//! - [`detector`]: consensus collapse, recursive defense and certainty
//!   escalation relative to a baseline and history
//! - [`normalizer`]: raw record shapes to [`SampleRecord`]s
//! - [`compression`], [`sequence`]: pure folds into aggregate reports
//! - [`export`], [`report`]: CSV and Markdown output
//!
//! ## Example
//!
//! ```
//! use ruvector_containment::{AnalysisMode, CompressionAggregator, RecordNormalizer};
//!
//! let json = r#"[
//!     {"groupKey": "vaccines", "branchOrTurn": "baseline", "text": "It may work.", "tokenCount": 450},
//!     {"groupKey": "vaccines", "branchOrTurn": "trigger", "text": "It works.", "tokenCount": 110}
//! ]"#;
//! let values = ruvector_containment::parse_input(json).unwrap();
//! let batch = RecordNormalizer::new(AnalysisMode::Compression).normalize_values(&values);
//! let report = CompressionAggregator::default().aggregate_batch(&batch).unwrap();
//! assert!(report.primary_hypothesis_supported);
//! ```

#![warn(clippy::all)]

pub mod compression;
pub mod config;
pub mod detector;
pub mod error;
pub mod export;
pub mod heuristics;
pub mod lexical;
pub mod lexicon;
pub mod normalizer;
pub mod pos;
pub mod record;
pub mod report;
pub mod sequence;

pub use compression::{
    compression_percent, CompressionAggregator, CompressionReport, CompressionStrength,
    GroupCompression, Tier, TierCompression, TierTable,
};
pub use config::AnalysisConfig;
pub use detector::{
    ContainmentType, DetectionContext, DetectionResult, DetectorConfig, Mechanism,
    MechanismResult, PairwiseDetector,
};
pub use error::{ContainmentError, Result};
pub use export::{
    compression_csv_string, export_compression_csv, export_sequence_csv, sequence_csv_string,
    write_compression_csv, write_sequence_csv,
};
pub use heuristics::{BranchClass, BranchClassifier, PromptHeuristics, PromptHeuristicsConfig};
pub use lexical::{LexicalMetrics, MetricVector, RecursionResult};
pub use lexicon::Lexicon;
pub use normalizer::{
    parse_input, AnalysisMode, NormalizedBatch, RecordNormalizer, SkipReason, SkippedRecord,
};
pub use record::{Branch, RawRecord, SampleRecord};
pub use sequence::{
    EscapeClass, LockInClass, SequenceAggregator, SequenceReport, TurnDetectionSummary,
    TurnSummary,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
