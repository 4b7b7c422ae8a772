//! Terminal report renderer.
//!
//! Colors critical findings red and prints the gate verdict the way a
//! CI log is read: score first, then the evidence.

use colored::Colorize;

use crate::pipeline::AuditOutcome;

/// Categories that mark a finding as critical for display purposes.
const CRITICAL_MARKERS: &[&str] = &["loss", "drift", "violation", "missing", "failed"];

/// Render a full audit outcome for the terminal.
pub fn render(outcome: &AuditOutcome, threshold: f64) -> String {
    let mut out = String::new();
    let report = &outcome.report;

    out.push_str(&format!(
        "\nFinal Score: {}/100 (Threshold: {threshold})\n",
        format!("{:.1}", report.score).bold(),
    ));

    if report.score >= threshold {
        out.push_str(&format!("{}\n", "Quality gate passed.".green().bold()));
    } else {
        out.push_str(&format!("{}\n", "Quality gate failed.".red().bold()));
    }

    if !report.summary.is_empty() {
        out.push_str(&format!("\nSummary: {}\n", report.summary));
    }

    if let (Some(base), Some(head)) = (&outcome.base_commit, &outcome.head_commit) {
        out.push_str(&format!(
            "\nAnalyzed range: {} → {} ({} commit(s), {} with deletions)\n",
            base.dimmed(),
            head.dimmed(),
            outcome.commits_analyzed,
            outcome.commits_with_deletions,
        ));
    } else if outcome.insufficient_history {
        out.push_str(&format!(
            "\n{}\n",
            "Insufficient commit history — snapshot-only audit.".yellow(),
        ));
    }

    if !report.findings.is_empty() {
        out.push_str("\n--- Findings ---\n");
        for finding in &report.findings {
            let label = format!("[{}]", finding.category);
            let is_critical = is_critical_category(&finding.category);
            let label = if is_critical {
                label.red().bold().to_string()
            } else {
                label.normal().to_string()
            };

            out.push_str(&format!("{label} {}\n", finding.description));
            if !finding.evidence.is_empty() {
                out.push_str(&format!("   Evidence: {}\n", finding.evidence));
            }
            if !finding.rationale.is_empty() {
                out.push_str(&format!("   Rationale: {}\n", finding.rationale));
            }
            if !finding.remediation.is_empty() {
                out.push_str(&format!("   Remediation: {}\n", finding.remediation));
            }
        }
    }

    if !report.feature_changes.is_empty() {
        out.push_str("\n--- Feature Evolution (Loss/Replacement) ---\n");
        for change in &report.feature_changes {
            let marker = if change.is_loss() { "✖" } else { "↻" };
            let header = format!("{marker} {} ({})", change.feature_name, change.status);
            let header = if change.is_loss() {
                header.red().to_string()
            } else {
                header.normal().to_string()
            };
            out.push_str(&format!("{header}\n"));

            if !change.impact.is_empty() {
                out.push_str(&format!("   Impact: {}\n", change.impact));
            }
            if !change.replacement_logic.is_empty() {
                out.push_str(&format!("   Replacement: {}\n", change.replacement_logic));
            }
            if !change.evidence.is_empty() {
                out.push_str(&format!("   Evidence: {}\n", change.evidence));
            }
        }
    }

    out
}

fn is_critical_category(category: &str) -> bool {
    let lower = category.to_lowercase();
    CRITICAL_MARKERS.iter().any(|m| lower.contains(m))
}
