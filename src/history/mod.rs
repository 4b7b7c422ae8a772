//! Audit history store.
//!
//! A single JSON file mapping repository identifier → newest-first list
//! of past audit outcomes, capped at 10 entries per repository. The
//! store is what makes repeat audits incremental: the range selector
//! reads the most recent `last_commit_hash` back out of it.
//!
//! Writes are read-modify-write over the whole file, finished with an
//! atomic temp-file rename, so a half-written file can never be
//! observed. Two concurrent processes appending to the same store can
//! still lose one side's update (last-writer-wins) — an accepted
//! limitation for a single-operator tool.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::report::clamp_score;

/// Maximum retained entries per repository.
pub const MAX_ENTRIES_PER_REPO: usize = 10;

/// Errors from the history store. Read paths never error — corrupt or
/// absent storage reads as empty — so these only surface on writes.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("history store location could not be determined")]
    NoStorePath,

    #[error("failed to write history store: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to serialize history store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One past audit outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditHistoryEntry {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub analysis_type: String,
    pub score: f64,
    pub summary: String,
    #[serde(default)]
    pub last_commit_hash: Option<String>,
}

impl AuditHistoryEntry {
    /// Build an entry stamped with the current local time.
    pub fn now(
        analysis_type: impl Into<String>,
        score: f64,
        summary: impl Into<String>,
        last_commit_hash: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            analysis_type: analysis_type.into(),
            score,
            summary: summary.into(),
            last_commit_hash,
        }
    }
}

type HistoryMap = IndexMap<String, Vec<AuditHistoryEntry>>;

/// File-backed audit history store.
pub struct HistoryStore {
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Create a store at the default location
    /// (`~/.config/driftwatch/history.json`).
    pub fn new() -> Self {
        let path = dirs::config_dir()
            .map(|d| d.join(crate::constants::CONFIG_DIR).join(crate::constants::HISTORY_FILENAME));
        Self { path }
    }

    /// Create a store backed by a specific file (useful for testing).
    pub fn new_with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Prepend an entry for `repo_id`, truncate to the cap, and rewrite
    /// the store. The score is clamped before persistence.
    pub fn append(&self, repo_id: &str, mut entry: AuditHistoryEntry) -> Result<(), HistoryError> {
        entry.score = clamp_score(entry.score);

        let mut map = self.load_all();
        let entries = map.entry(repo_id.to_string()).or_default();
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES_PER_REPO);

        self.save_all(&map)
    }

    /// Past entries for `repo_id`, newest-first. Missing repo, missing
    /// file, and corrupt file all read as empty.
    pub fn list(&self, repo_id: &str) -> Vec<AuditHistoryEntry> {
        self.load_all().shift_remove(repo_id).unwrap_or_default()
    }

    /// Remove all entries for `repo_id`. Returns whether any existed.
    pub fn clear(&self, repo_id: &str) -> Result<bool, HistoryError> {
        let mut map = self.load_all();
        if map.shift_remove(repo_id).is_none() {
            return Ok(false);
        }
        self.save_all(&map)?;
        Ok(true)
    }

    /// The backing file path, if one could be determined.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    fn load_all(&self) -> HistoryMap {
        let Some(ref path) = self.path else {
            return HistoryMap::new();
        };
        let Ok(content) = std::fs::read_to_string(path) else {
            return HistoryMap::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Rewrite the whole store via temp file + atomic rename.
    fn save_all(&self, map: &HistoryMap) -> Result<(), HistoryError> {
        let Some(ref path) = self.path else {
            return Err(HistoryError::NoStorePath);
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(map)?;
        let tmp = tmp_path(path);
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
