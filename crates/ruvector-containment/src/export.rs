//! Flat CSV export of aggregate results for external statistics tooling.
//!
//! Tokens and counts are written as integers, percentages with 2 decimals,
//! ratios with 3 and entropy with 4.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::compression::CompressionReport;
use crate::error::{ContainmentError, Result};
use crate::sequence::SequenceReport;

pub const COMPRESSION_HEADER: [&str; 5] =
    ["group", "baselineTokens", "triggerTokens", "compressionPercent", "compressionRatio"];

pub const SEQUENCE_HEADER: [&str; 10] = [
    "model",
    "group",
    "dimension",
    "turn",
    "tokens",
    "entropy",
    "hedgeCount",
    "certaintyCount",
    "latency",
    "length",
];

/// Group label of the compression summary row.
pub const SUMMARY_GROUP: &str = "OVERALL";

/// One row per paired group sorted by group, then the summary row.
pub fn write_compression_csv<W: Write>(report: &CompressionReport, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(COMPRESSION_HEADER)?;

    let mut groups: Vec<_> = report.paired_groups.iter().collect();
    groups.sort_by(|a, b| a.group_key.cmp(&b.group_key));
    for g in groups {
        wtr.write_record([
            g.group_key.clone(),
            g.baseline_tokens.to_string(),
            g.trigger_tokens.to_string(),
            format!("{:.2}", g.compression_percent),
            format!("{:.3}", g.compression_ratio()),
        ])?;
    }
    wtr.write_record([
        SUMMARY_GROUP.to_string(),
        report.total_baseline_tokens.to_string(),
        report.total_trigger_tokens.to_string(),
        format!("{:.2}", report.overall_compression_percent),
        format!("{:.3}", report.overall_compression_ratio()),
    ])?;
    wtr.flush()?;
    debug!(rows = report.paired_groups.len() + 1, "wrote compression csv");
    Ok(())
}

/// One row per (model, group, dimension, turn).
pub fn write_sequence_csv<W: Write>(report: &SequenceReport, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(SEQUENCE_HEADER)?;

    let mut samples: Vec<_> = report.samples.iter().collect();
    samples.sort_by(|a, b| {
        (&a.model, &a.group, &a.dimension, a.turn).cmp(&(&b.model, &b.group, &b.dimension, b.turn))
    });
    for s in samples {
        wtr.write_record([
            s.model.clone(),
            s.group.clone(),
            s.dimension.clone(),
            s.turn.to_string(),
            s.tokens.to_string(),
            format!("{:.4}", s.entropy),
            s.hedge_count.to_string(),
            s.certainty_count.to_string(),
            s.latency_ms.to_string(),
            s.length.to_string(),
        ])?;
    }
    wtr.flush()?;
    debug!(rows = report.samples.len(), "wrote sequence csv");
    Ok(())
}

pub fn compression_csv_string(report: &CompressionReport) -> Result<String> {
    let mut buf = Vec::new();
    write_compression_csv(report, &mut buf)?;
    into_string(buf)
}

pub fn sequence_csv_string(report: &SequenceReport) -> Result<String> {
    let mut buf = Vec::new();
    write_sequence_csv(report, &mut buf)?;
    into_string(buf)
}

pub fn export_compression_csv(report: &CompressionReport, path: impl AsRef<Path>) -> Result<()> {
    write_compression_csv(report, File::create(path.as_ref())?)
}

pub fn export_sequence_csv(report: &SequenceReport, path: impl AsRef<Path>) -> Result<()> {
    write_sequence_csv(report, File::create(path.as_ref())?)
}

fn into_string(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf).map_err(|e| ContainmentError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionAggregator;
    use crate::record::{Branch, SampleRecord};
    use crate::sequence::SequenceAggregator;

    fn rec(group: &str, branch: Branch, dim: Option<&str>, tokens: u64, text: &str) -> SampleRecord {
        SampleRecord {
            model: "gpt".into(),
            group_key: group.into(),
            branch,
            dimension: dim.map(str::to_string),
            text: text.into(),
            token_count: tokens,
            latency_ms: 250,
        }
    }

    #[test]
    fn compression_rows_and_summary() {
        let records = vec![
            rec("vaccines", Branch::Baseline, None, 450, "a"),
            rec("vaccines", Branch::Trigger, None, 110, "b"),
            rec("alpha, beta", Branch::Baseline, None, 100, "c"),
            rec("alpha, beta", Branch::Trigger, None, 100, "d"),
        ];
        let report = CompressionAggregator::default().aggregate(&records).unwrap();
        let csv = compression_csv_string(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "group,baselineTokens,triggerTokens,compressionPercent,compressionRatio");
        assert_eq!(lines[1], "\"alpha, beta\",100,100,0.00,0.000");
        assert_eq!(lines[2], "vaccines,450,110,75.56,0.756");
        assert!(lines[3].starts_with("OVERALL,550,210,61.82,0.618"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn sequence_rows_sorted() {
        let records = vec![
            rec("b", Branch::Turn(1), Some("x"), 10, "one two"),
            rec("a", Branch::Turn(2), Some("x"), 20, "It might rain."),
            rec("a", Branch::Turn(1), Some("x"), 30, "Clearly."),
        ];
        let report = SequenceAggregator::default().aggregate(&records).unwrap();
        let csv = sequence_csv_string(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], SEQUENCE_HEADER.join(","));
        assert_eq!(lines[1], "gpt,a,x,1,30,0.0000,0,1,250,8");
        assert_eq!(lines[2], "gpt,a,x,2,20,1.5850,1,0,250,14");
        assert_eq!(lines[3], "gpt,b,x,1,10,1.0000,0,0,250,7");
    }

    #[test]
    fn export_to_file() {
        let d = tempfile::tempdir().unwrap();
        let p = d.path().join("seq.csv");
        let records = vec![rec("g", Branch::Turn(1), None, 5, "text")];
        let report = SequenceAggregator::default().aggregate(&records).unwrap();
        export_sequence_csv(&report, &p).unwrap();
        let c = std::fs::read_to_string(&p).unwrap();
        assert_eq!(c.lines().count(), 2);
        assert!(c.contains("gpt,g,,1,5,"));
    }

    #[test]
    fn export_to_missing_dir_is_io_error() {
        let d = tempfile::tempdir().unwrap();
        let p = d.path().join("missing").join("out.csv");
        let records = vec![rec("g", Branch::Turn(1), None, 5, "text")];
        let report = SequenceAggregator::default().aggregate(&records).unwrap();
        assert!(matches!(export_sequence_csv(&report, &p), Err(ContainmentError::Io(_))));
    }
}
