//! Evidence bundle assembly.
//!
//! Pure composition over the history reader, diff extractor, timeline
//! builder, snapshot summarizer, and range selector. One bundle is
//! built per audit invocation and discarded after the judgment step
//! consumes it — nothing here is cached across runs.

use std::path::Path;

use crate::git::{diff, history, timeline};
use crate::history::AuditHistoryEntry;
use crate::models::{Commit, DeletionEvent, DiffRecord};
use crate::range::{self, AuditRange, RangeSelection};
use crate::snapshot;

/// Everything the judgment step gets to see for one audit.
#[derive(Debug, Clone)]
pub struct EvidenceBundle {
    /// Budget-capped, line-numbered snapshot of the working tree.
    pub code_snapshot: String,
    /// Commit window, newest-first; empty when history is unavailable.
    pub history_window: Vec<Commit>,
    /// The resolved audit range, or `None` when fewer than two commits
    /// were available (snapshot-only evidence).
    pub range: Option<AuditRange>,
    /// Zero-context diff between base and head. Empty without a range.
    pub diff_since_base: DiffRecord,
    /// Commits in the window that deleted source lines, newest-first.
    pub deletion_timeline: Vec<DeletionEvent>,
}

impl EvidenceBundle {
    /// Whether diff-based evidence could not be produced.
    pub fn insufficient_history(&self) -> bool {
        self.range.is_none()
    }
}

/// Assemble the evidence bundle for one audit.
///
/// The snapshot is always produced. Diff and timeline evidence require
/// a resolvable range; when history is insufficient the bundle carries
/// only the snapshot and whatever commits were found.
pub async fn assemble(
    workspace: &Path,
    prior_audits: &[AuditHistoryEntry],
    max_commits: usize,
    snapshot_total_chars: usize,
    snapshot_file_chars: usize,
    explicit_base: Option<&str>,
    explicit_head: Option<&str>,
) -> EvidenceBundle {
    let code_snapshot = snapshot::summarize(workspace, snapshot_total_chars, snapshot_file_chars);
    let history_window = history::list_commits(workspace, max_commits).await;

    match range::select_range(prior_audits, &history_window, explicit_base, explicit_head) {
        RangeSelection::Range(range) => {
            let diff_since_base = diff::diff(workspace, &range.base.hash, &range.head.hash).await;
            let deletion_timeline = timeline::build_timeline(workspace, &history_window).await;
            EvidenceBundle {
                code_snapshot,
                history_window,
                range: Some(range),
                diff_since_base,
                deletion_timeline,
            }
        }
        RangeSelection::InsufficientHistory { .. } => EvidenceBundle {
            code_snapshot,
            history_window,
            range: None,
            diff_since_base: DiffRecord::default(),
            deletion_timeline: Vec::new(),
        },
    }
}
