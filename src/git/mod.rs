//! Git evidence extraction: history reading, zero-context diffs, and
//! the deletion timeline.
//!
//! Shells out to `git` via `tokio::process::Command`. Every invocation
//! runs under a hard timeout so a hung git process degrades to "no
//! data" instead of blocking the pipeline.

pub mod diff;
pub mod history;
pub mod timeline;

use std::path::Path;

use thiserror::Error;

use crate::constants::GIT_COMMAND_TIMEOUT;

/// Errors from git invocations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git command failed (exit {status}): {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("git command timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Run a git subcommand against `workspace` and return stdout.
///
/// Output is decoded lossily — git can emit arbitrary bytes in diffs
/// and commit messages, and dropping undecodable content is preferable
/// to failing the whole query.
pub async fn run_git(workspace: &Path, args: &[&str]) -> Result<String, GitError> {
    let command = tokio::process::Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(args)
        .output();

    let output = tokio::time::timeout(GIT_COMMAND_TIMEOUT, command)
        .await
        .map_err(|_| GitError::Timeout(GIT_COMMAND_TIMEOUT))??;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
