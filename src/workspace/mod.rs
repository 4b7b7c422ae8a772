//! Workspace provider: materializes a repository URL into a local
//! clone and reverses the operation on release.
//!
//! Browser-style GitHub URLs (`.../tree/<branch>/<subpath>`) are parsed
//! into a root clone URL, a branch (cloned with `--single-branch`), and
//! a subpath resolved inside the clone. A failed clone leaves no
//! partial workspace behind.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::CLONE_TIMEOUT;

/// Errors from workspace acquisition.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("failed to run git clone: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to clone repository: {0}")]
    CloneFailed(String),

    #[error("git clone timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A repository URL decomposed into its cloneable parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRepoUrl {
    /// The root URL `git clone` accepts.
    pub clone_url: String,
    /// Branch from a `/tree/<branch>` browser URL, if any.
    pub branch: Option<String>,
    /// Path inside the repository from a browser URL, if any.
    pub subpath: Option<String>,
}

static BROWSER_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)/(?:tree|blob)/([^/]+)(.*)$")
        .expect("browser URL regex is valid")
});

/// Parse a repository URL, handling GitHub browser URLs like
/// `https://github.com/user/repo/tree/branch-name/sub/folder`.
pub fn parse_repo_url(url: &str) -> ParsedRepoUrl {
    if url.ends_with(".git") {
        return ParsedRepoUrl {
            clone_url: url.to_string(),
            branch: None,
            subpath: None,
        };
    }

    if let Some(caps) = BROWSER_URL_RE.captures(url) {
        let (owner, repo, branch, subpath) = (&caps[1], &caps[2], &caps[3], &caps[4]);
        let subpath = subpath.trim_start_matches('/');
        return ParsedRepoUrl {
            clone_url: format!("https://github.com/{owner}/{repo}.git"),
            branch: Some(branch.to_string()),
            subpath: (!subpath.is_empty()).then(|| subpath.to_string()),
        };
    }

    ParsedRepoUrl {
        clone_url: url.to_string(),
        branch: None,
        subpath: None,
    }
}

/// An acquired workspace: a temporary clone of a repository.
#[derive(Debug)]
pub struct Workspace {
    /// The clone root — what gets removed on release.
    root: PathBuf,
    /// The directory audits operate in: the clone root, or the resolved
    /// subpath when the URL named one.
    checkout: PathBuf,
}

impl Workspace {
    /// Clone `repo_url` into a fresh temporary directory.
    pub async fn acquire(repo_url: &str) -> Result<Self, WorkspaceError> {
        let root = std::env::temp_dir().join(format!("driftwatch-{}", uuid::Uuid::new_v4()));
        Self::acquire_at(root, repo_url).await
    }

    /// Clone into a specific root directory. On any failure the root is
    /// removed, so no partial workspace survives.
    async fn acquire_at(root: PathBuf, repo_url: &str) -> Result<Self, WorkspaceError> {
        let parsed = parse_repo_url(repo_url);
        let root_str = root.display().to_string();

        let mut args: Vec<&str> = vec!["clone"];
        if let Some(ref branch) = parsed.branch {
            args.extend(["--branch", branch.as_str(), "--single-branch"]);
        }
        args.push(&parsed.clone_url);
        args.push(&root_str);

        let command = tokio::process::Command::new("git").args(&args).output();
        let result = tokio::time::timeout(CLONE_TIMEOUT, command).await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                remove_partial(&root);
                return Err(WorkspaceError::Spawn(e));
            }
            Err(_) => {
                remove_partial(&root);
                return Err(WorkspaceError::Timeout(CLONE_TIMEOUT));
            }
        };

        if !output.status.success() {
            remove_partial(&root);
            return Err(WorkspaceError::CloneFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let checkout = match parsed.subpath {
            Some(ref sub) => {
                let target = root.join(sub);
                if target.exists() { target } else { root.clone() }
            }
            None => root.clone(),
        };

        Ok(Self { root, checkout })
    }

    /// The directory audits operate in.
    pub fn path(&self) -> &Path {
        &self.checkout
    }

    /// Remove the workspace from disk. Best-effort — a leftover temp
    /// directory is not worth failing an audit over.
    pub fn release(self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn remove_partial(root: &Path) {
    if root.exists() {
        let _ = std::fs::remove_dir_all(root);
    }
}
