//! JSON summary for the `--json` results file.

use crate::models::AnalysisMode;
use crate::pipeline::AuditOutcome;

/// Build the machine-readable summary written next to CI artifacts.
pub fn summary(
    repo: &str,
    mode: AnalysisMode,
    outcome: &AuditOutcome,
    threshold: f64,
) -> serde_json::Value {
    serde_json::json!({
        "repo": repo,
        "mode": mode.to_string(),
        "score": outcome.report.score,
        "threshold": threshold,
        "passed": outcome.report.score >= threshold,
        "summary": outcome.report.summary,
        "findings": outcome.report.findings,
        "feature_changes": outcome.report.feature_changes,
        "commits_analyzed": outcome.commits_analyzed,
        "commits_with_deletions": outcome.commits_with_deletions,
        "insufficient_history": outcome.insufficient_history,
        "base_commit": outcome.base_commit,
        "head_commit": outcome.head_commit,
    })
}
