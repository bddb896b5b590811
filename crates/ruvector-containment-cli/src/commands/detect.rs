//! Detect command implementation

use std::path::{Path, PathBuf};

use anyhow::Result;
use ruvector_containment::{AnalysisConfig, DetectionContext, PairwiseDetector};

use super::read_text;
use crate::format;

/// Run the detect command
pub fn run(
    config: &AnalysisConfig,
    text: &Path,
    baseline: Option<&Path>,
    history: &[PathBuf],
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut detector_config = config.detector.clone();
    if let Some(t) = threshold {
        detector_config.consensus_threshold = t;
    }
    let detector = PairwiseDetector::new(config.metrics()?, detector_config)?;

    let response = read_text(text)?;
    let baseline_text = baseline.map(read_text).transpose()?;
    let history_texts = history.iter().map(|p| read_text(p)).collect::<Result<Vec<_>>>()?;

    let mut ctx = DetectionContext::new().with_history(&history_texts);
    if let Some(b) = baseline_text.as_deref() {
        ctx = ctx.with_baseline(b);
    }
    let result = detector.detect(&response, &ctx);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format::format_detection(&result));
    }
    Ok(())
}
