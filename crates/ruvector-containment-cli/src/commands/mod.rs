//! Subcommand implementations:
//! - `compression` - baseline vs. trigger analysis
//! - `sequence` - multi-turn analysis
//! - `detect` - pairwise detector on one response
//! - `metrics` - lexical metric vector of one response

use std::path::Path;

use anyhow::{Context, Result};
use ruvector_containment::{parse_input, AnalysisConfig, AnalysisMode, NormalizedBatch};

use crate::format;

pub mod compression;
pub mod detect;
pub mod metrics;
pub mod sequence;

/// Built-in configuration unless a file is given.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read, parse and normalize an input file, warning about skipped records.
pub fn load_batch(config: &AnalysisConfig, input: &Path, mode: AnalysisMode) -> Result<NormalizedBatch> {
    let content = read_text(input)?;
    let values = parse_input(&content).with_context(|| format!("invalid input {}", input.display()))?;
    let batch = config.normalizer(mode)?.normalize_values(&values);
    if batch.skipped_count() > 0 {
        eprintln!(
            "{}",
            format::format_warning(&format!(
                "{} of {} records skipped",
                batch.skipped_count(),
                batch.input_count()
            ))
        );
    }
    Ok(batch)
}

/// Confirm a written file. Goes to stderr in JSON mode so stdout stays parseable.
pub fn announce(json: bool, msg: &str) {
    if json {
        eprintln!("{}", format::format_success(msg));
    } else {
        println!("{}", format::format_success(msg));
    }
}

/// Write a Markdown report and say so.
pub fn write_markdown(path: &Path, markdown: &str, json: bool) -> Result<()> {
    std::fs::write(path, markdown).with_context(|| format!("failed to write {}", path.display()))?;
    announce(json, &format!("Markdown report written to {}", path.display()));
    Ok(())
}
