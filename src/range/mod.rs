//! Incremental range selection.
//!
//! Decides which (base, head) commit pair an audit examines. Repeat
//! audits are incremental by default: the base is the head of the last
//! persisted audit, so the same range is never re-examined twice unless
//! the caller overrides it explicitly.

use crate::history::AuditHistoryEntry;
use crate::models::Commit;

/// The outcome of range selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSelection {
    /// A usable (base, head) pair.
    Range(AuditRange),
    /// Fewer than two commits available — diff-based evidence cannot be
    /// produced; snapshot-only evidence still can.
    InsufficientHistory { commits_found: usize },
}

/// A resolved commit range, base older than (or equal to) head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRange {
    pub base: Commit,
    pub head: Commit,
}

/// Select the audit range.
///
/// Resolution order:
/// 1. Explicit base/head win outright (resolved by hash prefix; an
///    unresolvable ref falls back to the corresponding default).
/// 2. Head defaults to the newest available commit.
/// 3. Base defaults to the most recent persisted `last_commit_hash`
///    that matches an available commit.
/// 4. Otherwise base is the oldest available commit (full-range audit).
pub fn select_range(
    history: &[AuditHistoryEntry],
    available: &[Commit],
    explicit_base: Option<&str>,
    explicit_head: Option<&str>,
) -> RangeSelection {
    if available.len() < 2 {
        return RangeSelection::InsufficientHistory {
            commits_found: available.len(),
        };
    }

    let head = explicit_head
        .and_then(|r| find_by_prefix(available, r))
        .unwrap_or(&available[0]);

    let base = explicit_base
        .and_then(|r| find_by_prefix(available, r))
        .or_else(|| {
            last_analyzed_hash(history).and_then(|hash| find_by_prefix(available, hash))
        })
        .unwrap_or_else(|| available.last().expect("len checked above"));

    RangeSelection::Range(AuditRange {
        base: base.clone(),
        head: head.clone(),
    })
}

/// The most recent persisted commit hash, scanning newest-first.
fn last_analyzed_hash(history: &[AuditHistoryEntry]) -> Option<&str> {
    history
        .iter()
        .find_map(|entry| entry.last_commit_hash.as_deref())
}

fn find_by_prefix<'a>(available: &'a [Commit], reference: &str) -> Option<&'a Commit> {
    if reference.is_empty() {
        return None;
    }
    available.iter().find(|c| c.hash.starts_with(reference))
}
