//! Commit history reader.

use std::path::Path;

use crate::models::Commit;

use super::run_git;

/// Field separator used in the `git log` pretty format. Commit subjects
/// can contain `|`, so parsing splits on the first three separators only.
const LOG_FORMAT: &str = "--pretty=format:%H|%s|%ai|%an";

/// List commits for a workspace, newest-first, at most `max_count`.
///
/// Any git failure (no history, missing binary, timeout) degrades to an
/// empty list — absent history is evidence, not a fatal condition.
pub async fn list_commits(workspace: &Path, max_count: usize) -> Vec<Commit> {
    let max_arg = format!("--max-count={max_count}");
    match run_git(workspace, &["log", &max_arg, LOG_FORMAT]).await {
        Ok(output) => parse_log(&output),
        Err(_) => Vec::new(),
    }
}

/// Parse `%H|%s|%ai|%an` log output into commits.
fn parse_log(output: &str) -> Vec<Commit> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(4, '|');
            Some(Commit {
                hash: parts.next()?.to_string(),
                message: parts.next()?.to_string(),
                timestamp: parts.next()?.to_string(),
                author: parts.next()?.to_string(),
            })
        })
        .collect()
}
