//! Commit metadata as read from `git log`.

use serde::{Deserialize, Serialize};

/// A single commit. Immutable once read; identity is the full hash.
///
/// The history reader returns commits newest-first; callers needing
/// chronological order must reverse explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full SHA.
    pub hash: String,
    /// Subject line of the commit message.
    pub message: String,
    /// Author date in git's local ISO-like format (`%ai`).
    pub timestamp: String,
    /// Author name.
    pub author: String,
}

impl Commit {
    /// Abbreviated hash for display and prompt embedding.
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(8);
        &self.hash[..end]
    }
}
