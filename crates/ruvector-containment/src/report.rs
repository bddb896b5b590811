//! Markdown and one-line text renderings of the aggregate reports.

use crate::compression::{CompressionReport, GroupCompression};
use crate::sequence::{SequenceReport, TurnSummary};

impl CompressionReport {
    /// One-line summary for console output.
    pub fn summary(&self) -> String {
        format!(
            "{} paired groups, overall compression {:.2}% ({}), hypothesis {}",
            self.paired_groups.len(),
            self.overall_compression_percent,
            self.strength.label(),
            if self.primary_hypothesis_supported { "supported" } else { "not supported" },
        )
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Compression Report\n\n");

        md.push_str("## Overall\n\n");
        md.push_str(&format!("- Baseline records: {}\n", self.baseline_records));
        md.push_str(&format!("- Trigger records: {}\n", self.trigger_records));
        md.push_str(&format!("- Baseline tokens: {}\n", self.total_baseline_tokens));
        md.push_str(&format!("- Trigger tokens: {}\n", self.total_trigger_tokens));
        md.push_str(&format!(
            "- Compression: **{:.2}%** ({})\n",
            self.overall_compression_percent,
            self.strength.label()
        ));
        md.push_str(&format!(
            "- Primary hypothesis (> 50%): {}\n",
            if self.primary_hypothesis_supported { "supported" } else { "not supported" }
        ));
        if self.skipped_records > 0 {
            md.push_str(&format!("- Skipped records: {}\n", self.skipped_records));
        }
        md.push('\n');

        md.push_str("## Most Compressed\n\n");
        group_table(&mut md, &self.top_compressed);

        md.push_str("## Least Compressed\n\n");
        group_table(&mut md, &self.bottom_compressed);

        match &self.tiers {
            Some(tiers) => {
                md.push_str("## Tiers\n\n");
                md.push_str("| Tier | Groups | Mean compression |\n");
                md.push_str("|------|--------|------------------|\n");
                for t in tiers {
                    md.push_str(&format!(
                        "| {} | {} | {:.2}% |\n",
                        t.tier, t.groups, t.mean_compression_percent
                    ));
                }
                md.push('\n');
            }
            None => md.push_str("_Tier analysis needs at least 50 paired groups._\n\n"),
        }

        md.push_str("## Containment\n\n");
        for (kind, count) in &self.detection_counts {
            md.push_str(&format!("- {}: {}\n", kind.name(), count));
        }
        if !self.unpaired_groups.is_empty() {
            md.push_str(&format!("\nUnpaired groups: {}\n", self.unpaired_groups.join(", ")));
        }

        md
    }
}

fn group_table(md: &mut String, groups: &[GroupCompression]) {
    md.push_str("| Group | Baseline | Trigger | Compression | Containment |\n");
    md.push_str("|-------|----------|---------|-------------|-------------|\n");
    for g in groups {
        md.push_str(&format!(
            "| {} | {} | {} | {:.2}% | {} |\n",
            g.group_key,
            g.baseline_tokens,
            g.trigger_tokens,
            g.compression_percent,
            g.detection.containment_type.name(),
        ));
    }
    md.push('\n');
}

impl SequenceReport {
    pub fn summary(&self) -> String {
        format!(
            "{} records over {} turns, lock-in: {}, escape: {}",
            self.total_records,
            self.turns.len(),
            self.lock_in.as_ref().map(|l| l.classification.label()).unwrap_or("n/a"),
            self.escape.as_ref().map(|e| e.classification.label()).unwrap_or("n/a"),
        )
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Sequence Report\n\n");
        md.push_str(&format!("- Records: {}\n", self.total_records));
        if self.skipped_records > 0 {
            md.push_str(&format!("- Skipped records: {}\n", self.skipped_records));
        }
        md.push('\n');

        md.push_str("## Turns\n\n");
        turn_table(&mut md, &self.turns, false);

        md.push_str("## Turns by Dimension\n\n");
        turn_table(&mut md, &self.turn_dimensions, true);

        md.push_str("## Analyses\n\n");
        match &self.lock_in {
            Some(l) => md.push_str(&format!(
                "- **Lock-in** (turn 1 -> 2): tokens {:.2}%, hedges {:.2}% ({})\n",
                l.token_compression_percent,
                l.hedge_drop_percent,
                l.classification.label()
            )),
            None => md.push_str("- **Lock-in**: n/a\n"),
        }
        match &self.persistence {
            Some(p) => md.push_str(&format!(
                "- **Persistence** (turn 1 -> 4): tokens {:.2}%, hedges {:.2}%\n",
                p.token_suppression_percent, p.hedge_suppression_percent
            )),
            None => md.push_str("- **Persistence**: n/a\n"),
        }
        match &self.dimension_bias {
            Some(b) => {
                let diff = b
                    .difference_percent
                    .map(|d| format!("{d:.2}%"))
                    .unwrap_or_else(|| "undefined".to_string());
                md.push_str(&format!(
                    "- **Dimension bias** (turn 3): {} highest, {} lowest, difference {}{}\n",
                    b.highest,
                    b.lowest,
                    diff,
                    if b.significant_bias { " (significant)" } else { "" }
                ));
            }
            None => md.push_str("- **Dimension bias**: n/a\n"),
        }
        match &self.escape {
            Some(e) => md.push_str(&format!(
                "- **Escape** (turn 1 -> 5): tokens {:.2}%, hedges {:.2}% ({})\n",
                e.token_recovery_percent,
                e.hedge_recovery_percent,
                e.classification.label()
            )),
            None => md.push_str("- **Escape**: n/a\n"),
        }
        md.push('\n');

        if !self.containment.is_empty() {
            md.push_str("## Containment by Turn\n\n");
            md.push_str("| Turn | Samples | Detected | Mean confidence | Types |\n");
            md.push_str("|------|---------|----------|-----------------|-------|\n");
            for c in &self.containment {
                let types: Vec<String> =
                    c.by_type.iter().map(|(k, n)| format!("{} {}", k.name(), n)).collect();
                md.push_str(&format!(
                    "| {} | {} | {} | {:.2} | {} |\n",
                    c.turn,
                    c.samples,
                    c.detected,
                    c.mean_confidence,
                    types.join(", ")
                ));
            }
            md.push('\n');
        }

        md
    }
}

fn turn_table(md: &mut String, rows: &[TurnSummary], with_dimension: bool) {
    if with_dimension {
        md.push_str("| Turn | Dimension | Samples | Tokens | Entropy | Hedges | Certainty |\n");
        md.push_str("|------|-----------|---------|--------|---------|--------|-----------|\n");
    } else {
        md.push_str("| Turn | Samples | Tokens | Entropy | Hedges | Certainty |\n");
        md.push_str("|------|---------|--------|---------|--------|-----------|\n");
    }
    for t in rows {
        let dim = if with_dimension {
            format!(" {} |", t.dimension.as_deref().unwrap_or("-"))
        } else {
            String::new()
        };
        md.push_str(&format!(
            "| {} |{} {} | {:.1} | {:.4} | {:.2} | {:.2} |\n",
            t.turn,
            dim,
            t.sample_count,
            t.mean_tokens,
            t.mean_entropy,
            t.mean_hedge_count,
            t.mean_certainty_count
        ));
    }
    md.push('\n');
}
