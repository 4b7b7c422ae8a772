//! Diff-related types: per-file changed lines and deletion timeline events.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Commit;

/// Whether a changed line was added or removed.
///
/// Context lines never appear — the extractor runs git with zero
/// context lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
}

/// A single changed line with the diff marker stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedLine {
    pub kind: ChangeKind,
    pub text: String,
}

impl ChangedLine {
    pub fn added(text: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Added,
            text: text.into(),
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Removed,
            text: text.into(),
        }
    }
}

/// A zero-context diff between two commit references: file path →
/// ordered changed lines. Only recognized source files appear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffRecord {
    pub files: IndexMap<String, Vec<ChangedLine>>,
}

impl DiffRecord {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths that lost at least one line in this diff, in record order.
    pub fn files_with_removals(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|(_, lines)| lines.iter().any(|l| l.kind == ChangeKind::Removed))
            .map(|(path, _)| path.as_str())
            .collect()
    }

    /// Total removed lines across all files.
    pub fn total_removed(&self) -> usize {
        self.files
            .values()
            .flatten()
            .filter(|l| l.kind == ChangeKind::Removed)
            .count()
    }

    /// Total added lines across all files.
    pub fn total_added(&self) -> usize {
        self.files
            .values()
            .flatten()
            .filter(|l| l.kind == ChangeKind::Added)
            .count()
    }

    /// Render as `{path: ["-old", "+new", ...]}` for prompt embedding,
    /// re-attaching the diff markers the judgment step reasons about.
    pub fn to_prompt_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .files
            .iter()
            .map(|(path, lines)| {
                let rendered: Vec<serde_json::Value> = lines
                    .iter()
                    .map(|l| {
                        let marker = match l.kind {
                            ChangeKind::Added => '+',
                            ChangeKind::Removed => '-',
                        };
                        serde_json::Value::String(format!("{marker}{}", l.text))
                    })
                    .collect();
                (path.clone(), serde_json::Value::Array(rendered))
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

/// One entry in the deletion timeline: a commit that deleted source
/// lines relative to its parent in the analyzed window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionEvent {
    pub commit: Commit,
    pub files_modified: Vec<String>,
    pub total_lines_deleted: usize,
}
