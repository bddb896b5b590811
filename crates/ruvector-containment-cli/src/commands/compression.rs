//! Compression command implementation

use std::path::Path;

use anyhow::{Context, Result};
use ruvector_containment::{export_compression_csv, AnalysisConfig, AnalysisMode};

use super::{announce, load_batch, write_markdown};
use crate::format;

/// Run the compression command
pub fn run(
    config: &AnalysisConfig,
    input: &Path,
    csv: Option<&Path>,
    markdown: Option<&Path>,
    json: bool,
) -> Result<()> {
    let batch = load_batch(config, input, AnalysisMode::Compression)?;
    let report = config
        .compression_aggregator()?
        .aggregate_batch(&batch)
        .context("compression analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format::format_compression_report(&report));
    }

    if let Some(path) = csv {
        export_compression_csv(&report, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        announce(json, &format!("CSV written to {}", path.display()));
    }
    if let Some(path) = markdown {
        write_markdown(path, &report.to_markdown(), json)?;
    }

    Ok(())
}
