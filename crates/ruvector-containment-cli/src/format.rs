//! Console rendering of reports and results

use colored::*;
use ruvector_containment::lexical::RecursionResult;
use ruvector_containment::{
    CompressionReport, DetectionResult, EscapeClass, LockInClass, Mechanism, MetricVector,
    SequenceReport,
};

/// Format success message
pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg)
}

/// Format warning message
pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), msg)
}

pub fn format_compression_report(report: &CompressionReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "Compression Analysis".bold().green()));
    out.push_str(&format!(
        "  Records: {} baseline, {} trigger\n",
        report.baseline_records.to_string().cyan(),
        report.trigger_records.to_string().cyan()
    ));
    out.push_str(&format!(
        "  Tokens: {} -> {}\n",
        report.total_baseline_tokens.to_string().cyan(),
        report.total_trigger_tokens.to_string().cyan()
    ));
    out.push_str(&format!(
        "  Compression: {} ({})\n",
        format!("{:.2}%", report.overall_compression_percent).bold(),
        report.strength.label()
    ));
    let verdict = if report.primary_hypothesis_supported {
        "supported".green()
    } else {
        "not supported".red()
    };
    out.push_str(&format!("  Primary hypothesis: {}\n", verdict));
    out.push_str(&format!(
        "  Paired groups: {} ({} unpaired)\n",
        report.paired_groups.len(),
        report.unpaired_groups.len()
    ));

    if !report.top_compressed.is_empty() {
        out.push_str(&format!("\n{}\n", "Most compressed".bold()));
        for g in &report.top_compressed {
            out.push_str(&format!(
                "  {:<32} {:>8.2}%  {}\n",
                g.group_key,
                g.compression_percent,
                g.detection.containment_type.name().dimmed()
            ));
        }
    }

    if let Some(tiers) = &report.tiers {
        out.push_str(&format!("\n{}\n", "Tiers".bold()));
        for t in tiers {
            out.push_str(&format!(
                "  {:<32} {:>8.2}%  ({} groups)\n",
                t.tier, t.mean_compression_percent, t.groups
            ));
        }
    }

    out.push_str(&format!("\n{}\n", "Containment".bold()));
    for (kind, count) in &report.detection_counts {
        out.push_str(&format!("  {:<24} {}\n", kind.name(), count));
    }
    out
}

pub fn format_sequence_report(report: &SequenceReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "Sequence Analysis".bold().green()));
    out.push_str(&format!("  Records: {}\n\n", report.total_records.to_string().cyan()));

    out.push_str(&format!(
        "  {:<6} {:>8} {:>10} {:>9} {:>8} {:>10}\n",
        "Turn", "Samples", "Tokens", "Entropy", "Hedges", "Certainty"
    ));
    for t in &report.turns {
        out.push_str(&format!(
            "  {:<6} {:>8} {:>10.1} {:>9.4} {:>8.2} {:>10.2}\n",
            t.turn,
            t.sample_count,
            t.mean_tokens,
            t.mean_entropy,
            t.mean_hedge_count,
            t.mean_certainty_count
        ));
    }
    out.push('\n');

    match &report.lock_in {
        Some(l) => {
            let label = match l.classification {
                LockInClass::StrongLockIn => l.classification.label().red(),
                LockInClass::ModerateLockIn => l.classification.label().yellow(),
                LockInClass::Minimal => l.classification.label().green(),
            };
            out.push_str(&format!(
                "  Lock-in:     tokens {:.2}%, hedges {:.2}% ({})\n",
                l.token_compression_percent, l.hedge_drop_percent, label
            ));
        }
        None => out.push_str(&format!("  Lock-in:     {}\n", "n/a".dimmed())),
    }
    match &report.persistence {
        Some(p) => out.push_str(&format!(
            "  Persistence: tokens {:.2}%, hedges {:.2}%\n",
            p.token_suppression_percent, p.hedge_suppression_percent
        )),
        None => out.push_str(&format!("  Persistence: {}\n", "n/a".dimmed())),
    }
    match &report.dimension_bias {
        Some(b) => {
            let diff = b
                .difference_percent
                .map(|d| format!("{d:.2}%"))
                .unwrap_or_else(|| "undefined".to_string());
            let flag = if b.significant_bias {
                " significant bias".yellow().to_string()
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  Bias:        {} vs {} {}{}\n",
                b.highest, b.lowest, diff, flag
            ));
        }
        None => out.push_str(&format!("  Bias:        {}\n", "n/a".dimmed())),
    }
    match &report.escape {
        Some(e) => {
            let label = match e.classification {
                EscapeClass::FullEscape | EscapeClass::EscapeSuccessful => {
                    e.classification.label().green()
                }
                EscapeClass::PartialEscape => e.classification.label().yellow(),
                EscapeClass::EscapeFailed => e.classification.label().red(),
            };
            out.push_str(&format!(
                "  Escape:      tokens {:.2}%, hedges {:.2}% ({})\n",
                e.token_recovery_percent, e.hedge_recovery_percent, label
            ));
        }
        None => out.push_str(&format!("  Escape:      {}\n", "n/a".dimmed())),
    }
    out
}

pub fn format_detection(result: &DetectionResult) -> String {
    let mut out = String::new();
    let headline = if result.detected {
        format!("{} ({:.2})", result.containment_type.name(), result.confidence).red().bold()
    } else {
        "no containment detected".green().bold()
    };
    out.push_str(&format!("\n{}\n", headline));
    for m in Mechanism::ALL {
        if let Some(r) = result.mechanism(m) {
            let mark = if r.detected { "✓".red() } else { "·".dimmed() };
            out.push_str(&format!(
                "  {} {:<22} signal {:>8.4}  confidence {:.2}\n",
                mark,
                m.name(),
                r.signal,
                r.confidence
            ));
        }
    }
    out
}

pub fn format_metric_vector(v: &MetricVector, recursion: &RecursionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "Lexical Metrics".bold().green()));
    out.push_str(&format!("  Words:              {}\n", v.word_count));
    out.push_str(&format!("  Tokens:             {}\n", v.token_count));
    out.push_str(&format!("  Entropy:            {:.4} bits\n", v.entropy));
    out.push_str(&format!(
        "  Hedges:             {} ({:.2} per 100 words)\n",
        v.hedge_count, v.hedge_density
    ));
    out.push_str(&format!(
        "  Certainty:          {} ({:.2} per 100 words)\n",
        v.certainty_count, v.certainty_density
    ));
    out.push_str(&format!("  Semantic diversity: {:.2}%\n", v.semantic_diversity));
    out.push_str(&format!("  Coherence:          {:.4}\n", v.coherence));
    out.push_str(&format!(
        "  Recursion depth:    {:.4} ({} matches in {} sentences)\n",
        v.recursion_depth, recursion.total_matches, recursion.sentence_count
    ));
    for ex in &recursion.examples {
        out.push_str(&format!("    {} \"{}\"\n", ex.family.name().dimmed(), ex.text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruvector_containment::{DetectionContext, LexicalMetrics, PairwiseDetector};

    #[test]
    fn test_messages() {
        colored::control::set_override(false);
        assert_eq!(format_warning("2 skipped"), "Warning: 2 skipped");
        assert_eq!(format_success("done"), "✓ done");
    }

    #[test]
    fn test_detection_lists_all_mechanisms() {
        colored::control::set_override(false);
        let detector = PairwiseDetector::default();
        let r = detector.detect("Therefore yes.", &DetectionContext::new());
        let out = format_detection(&r);
        for m in Mechanism::ALL {
            assert!(out.contains(m.name()));
        }
        assert!(out.contains("recursive"));
    }

    #[test]
    fn test_metric_vector_output() {
        colored::control::set_override(false);
        let m = LexicalMetrics::standard();
        let text = "It might work. Therefore it works.";
        let out = format_metric_vector(&m.metric_vector(text), &m.recursion_depth(text));
        assert!(out.contains("Hedges:             1"));
        assert!(out.contains("connective \"Therefore\""));
    }
}
