//! Metrics command implementation

use std::path::Path;

use anyhow::Result;
use ruvector_containment::AnalysisConfig;

use super::read_text;
use crate::format;

/// Run the metrics command
pub fn run(config: &AnalysisConfig, text: &Path, json: bool) -> Result<()> {
    let metrics = config.metrics()?;
    let content = read_text(text)?;
    let vector = metrics.metric_vector(&content);
    let recursion = metrics.recursion_depth(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&vector)?);
    } else {
        print!("{}", format::format_metric_vector(&vector, &recursion));
    }
    Ok(())
}
