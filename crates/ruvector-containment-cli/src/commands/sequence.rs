//! Sequence command implementation

use std::path::Path;

use anyhow::{Context, Result};
use ruvector_containment::{export_sequence_csv, AnalysisConfig, AnalysisMode};

use super::{announce, load_batch, write_markdown};
use crate::format;

/// Run the sequence command
pub fn run(
    config: &AnalysisConfig,
    input: &Path,
    csv: Option<&Path>,
    markdown: Option<&Path>,
    json: bool,
) -> Result<()> {
    let batch = load_batch(config, input, AnalysisMode::Sequence)?;
    let report = config
        .sequence_aggregator()?
        .aggregate_batch(&batch)
        .context("sequence analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format::format_sequence_report(&report));
    }

    if let Some(path) = csv {
        export_sequence_csv(&report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        announce(json, &format!("CSV written to {}", path.display()));
    }
    if let Some(path) = markdown {
        write_markdown(path, &report.to_markdown(), json)?;
    }

    Ok(())
}
