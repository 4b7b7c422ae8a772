//! Deletion timeline builder.
//!
//! Walks adjacent commit pairs and records which commits deleted source
//! lines and how much. One diff per pair; the pairs are independent, so
//! this could run concurrently, but the pipeline is single-threaded and
//! the output ordering must follow the input ordering either way.

use std::path::Path;

use crate::models::{Commit, DeletionEvent};

use super::diff::diff;

/// Build the deletion timeline for a newest-first commit sequence.
///
/// For each adjacent pair `(newer, older)`, diffs `older..newer` and
/// emits an event when any recognized source file lost lines. Events
/// preserve the input (newest-first) ordering.
pub async fn build_timeline(workspace: &Path, commits: &[Commit]) -> Vec<DeletionEvent> {
    let mut events = Vec::new();

    for pair in commits.windows(2) {
        let (newer, older) = (&pair[0], &pair[1]);
        let record = diff(workspace, &older.hash, &newer.hash).await;

        let files_modified: Vec<String> = record
            .files_with_removals()
            .into_iter()
            .map(str::to_string)
            .collect();
        if files_modified.is_empty() {
            continue;
        }

        events.push(DeletionEvent {
            commit: newer.clone(),
            files_modified,
            total_lines_deleted: record.total_removed(),
        });
    }

    events
}
