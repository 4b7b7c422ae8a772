//! The audit pipeline.
//!
//! Single-threaded, synchronous flow per invocation: read prior audits,
//! assemble the evidence bundle, invoke the judgment service (with
//! retries on transient failures), clamp the score, and write the
//! outcome back to the history store. The store is only written after
//! the judgment step produced a usable report, so an aborted or failed
//! audit never advances the incremental range.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::evidence::{self, EvidenceBundle};
use crate::history::{AuditHistoryEntry, HistoryStore};
use crate::judge::rig::{MAX_RETRIES, classify_error, is_retryable, retry_backoff};
use crate::judge::{JudgeError, JudgeProvider, prompt};
use crate::models::{AnalysisMode, AuditFinding, AuditReport};

/// The result of one audit run.
#[derive(Debug)]
pub struct AuditOutcome {
    /// The clamped judgment report.
    pub report: AuditReport,
    /// Commits found in the history window.
    pub commits_analyzed: usize,
    /// Commits in the window that deleted source lines.
    pub commits_with_deletions: usize,
    /// Whether diff-based evidence could not be produced.
    pub insufficient_history: bool,
    /// Character length of the snapshot handed to the judgment step.
    pub snapshot_chars: usize,
    /// Audited range, abbreviated hashes.
    pub base_commit: Option<String>,
    pub head_commit: Option<String>,
}

/// Runs audits end to end.
pub struct AuditPipeline {
    judge: Arc<dyn JudgeProvider>,
    config: Config,
    store: HistoryStore,
    quiet: bool,
}

impl AuditPipeline {
    pub fn new(
        judge: Arc<dyn JudgeProvider>,
        config: &Config,
        store: HistoryStore,
        quiet: bool,
    ) -> Self {
        Self {
            judge,
            config: config.clone(),
            store,
            quiet,
        }
    }

    /// Run one audit against an acquired workspace.
    ///
    /// Judgment failures degrade to a zero-score report; in that case
    /// no history entry is written, so the next run re-examines the
    /// same range.
    pub async fn run(
        &self,
        repo_id: &str,
        workspace: &Path,
        mode: AnalysisMode,
        requirements: &str,
        guidelines: &str,
        explicit_base: Option<&str>,
        explicit_head: Option<&str>,
    ) -> AuditOutcome {
        let prior_audits = self.store.list(repo_id);

        let bundle = evidence::assemble(
            workspace,
            &prior_audits,
            self.config.audit.max_commits,
            self.config.audit.snapshot_total_chars,
            self.config.audit.snapshot_file_chars,
            explicit_base,
            explicit_head,
        )
        .await;

        let system_prompt = prompt::system_prompt(mode);
        let user_prompt = prompt::build_prompt(mode, &bundle, requirements, guidelines);

        let (mut report, judged) = match self.judge_with_retries(system_prompt, &user_prompt).await
        {
            Ok(report) => (report, true),
            Err(e) => (
                AuditReport::failure(format!("Judgment service failed: {e}")),
                false,
            ),
        };
        report.clamp_score();
        merge_critical_losses(&mut report);

        let head_hash = bundle.range.as_ref().map(|r| r.head.hash.clone());
        if judged {
            let summary = if report.summary.is_empty() {
                "Audit completed.".to_string()
            } else {
                report.summary.clone()
            };
            let entry =
                AuditHistoryEntry::now(mode.to_string(), report.score, summary, head_hash.clone());
            if let Err(e) = self.store.append(repo_id, entry) {
                eprintln!("Warning: could not record audit history: {e}");
            }
        }

        outcome(report, &bundle)
    }

    /// Call the judgment service, retrying transient API errors with
    /// exponential backoff.
    async fn judge_with_retries(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<AuditReport, JudgeError> {
        let mut attempt = 0;
        loop {
            match self.judge.judge(system_prompt, user_prompt).await {
                Ok(report) => return Ok(report),
                Err(ref e) if is_retryable(e) && attempt < MAX_RETRIES => {
                    let backoff = retry_backoff(attempt);
                    if !self.quiet {
                        let reason = classify_error(e).unwrap_or("Transient error");
                        eprintln!(
                            "Warning: {reason} — retry {}/{} in {}s",
                            attempt + 1,
                            MAX_RETRIES,
                            backoff.as_secs(),
                        );
                    }
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Promote critical unreplaced feature losses into first-class
/// findings so they surface in every report view.
fn merge_critical_losses(report: &mut AuditReport) {
    let promoted: Vec<AuditFinding> = report
        .feature_changes
        .iter()
        .filter(|change| change.is_loss() && change.is_critical())
        .map(|change| AuditFinding {
            category: "Critical Feature Loss".to_string(),
            description: format!(
                "Evolution analysis detected a missing feature: {}",
                change.feature_name
            ),
            evidence: change.evidence.clone(),
            rationale: change.reasoning.clone(),
            remediation: change.remediation.clone(),
        })
        .collect();
    report.findings.extend(promoted);
}

fn outcome(report: AuditReport, bundle: &EvidenceBundle) -> AuditOutcome {
    AuditOutcome {
        report,
        commits_analyzed: bundle.history_window.len(),
        commits_with_deletions: bundle.deletion_timeline.len(),
        insufficient_history: bundle.insufficient_history(),
        snapshot_chars: bundle.code_snapshot.chars().count(),
        base_commit: bundle
            .range
            .as_ref()
            .map(|r| r.base.short_hash().to_string()),
        head_commit: bundle
            .range
            .as_ref()
            .map(|r| r.head.short_hash().to_string()),
    }
}
