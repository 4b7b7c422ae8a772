//! Zero-context diff extractor.
//!
//! Compares two commit references with `git diff --unified=0` so the
//! evidence contains only changed lines, and filters the result to
//! recognized source-code files.

use std::path::Path;

use crate::constants::SOURCE_FILE_EXTENSIONS;
use crate::models::{ChangedLine, DiffRecord};

use super::run_git;

/// Whether a path counts as source code for evidence purposes.
///
/// Single source of truth for the extension allow-list; see
/// [`SOURCE_FILE_EXTENSIONS`].
pub fn is_source_file(path: &str) -> bool {
    SOURCE_FILE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Compute the zero-context diff between two refs.
///
/// Non-comparable refs (unrelated histories, missing ref, timeout)
/// yield an empty record — diff absence means "nothing comparable",
/// not a failure.
pub async fn diff(workspace: &Path, ref_old: &str, ref_new: &str) -> DiffRecord {
    match run_git(workspace, &["diff", ref_old, ref_new, "--unified=0"]).await {
        Ok(output) => parse_zero_context_diff(&output),
        Err(_) => DiffRecord::default(),
    }
}

/// Parse `--unified=0` diff output into a per-file change record.
///
/// File identity comes from `+++ b/<path>` headers. Content lines seen
/// before the first such header are dropped.
pub fn parse_zero_context_diff(input: &str) -> DiffRecord {
    let mut record = DiffRecord::default();
    let mut current_file: Option<String> = None;

    for line in input.lines() {
        if let Some(path) = line.strip_prefix("+++ b/") {
            current_file = Some(path.to_string());
            continue;
        }
        // File header lines are never content.
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }

        let changed = if let Some(text) = line.strip_prefix('+') {
            ChangedLine::added(text)
        } else if let Some(text) = line.strip_prefix('-') {
            ChangedLine::removed(text)
        } else {
            continue;
        };

        let Some(ref file) = current_file else {
            continue;
        };
        if !is_source_file(file) {
            continue;
        }
        record.files.entry(file.clone()).or_default().push(changed);
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeKind;

    const SAMPLE: &str = "\
diff --git a/src/app.py b/src/app.py
index 1111111..2222222 100644
--- a/src/app.py
+++ b/src/app.py
@@ -3,2 +3,1 @@
-def removed_helper():
-    return 1
+def replacement():
diff --git a/README.md b/README.md
index 3333333..4444444 100644
--- a/README.md
+++ b/README.md
@@ -1 +1 @@
-old readme
+new readme
";

    #[test]
    fn is_source_file_allow_list() {
        assert!(is_source_file("src/main.rs"));
        assert!(is_source_file("pages/index.html"));
        assert!(is_source_file("styles/app.scss"));
        assert!(!is_source_file("Cargo.lock"));
        assert!(!is_source_file("logo.png"));
        assert!(!is_source_file("README.md"));
    }

    #[test]
    fn parse_tracks_files_and_kinds() {
        let record = parse_zero_context_diff(SAMPLE);
        assert_eq!(record.files.len(), 1, "README.md must be filtered out");

        let lines = &record.files["src/app.py"];
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].kind, ChangeKind::Removed);
        assert_eq!(lines[0].text, "def removed_helper():");
        assert_eq!(lines[2].kind, ChangeKind::Added);
        assert_eq!(lines[2].text, "def replacement():");
    }

    #[test]
    fn parse_strips_markers() {
        let record = parse_zero_context_diff(SAMPLE);
        for line in &record.files["src/app.py"] {
            assert!(!line.text.starts_with('+'));
            assert!(!line.text.starts_with('-'));
        }
    }

    #[test]
    fn parse_ignores_hunk_and_index_lines() {
        let record = parse_zero_context_diff(SAMPLE);
        let all_text: Vec<&str> = record.files["src/app.py"]
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        assert!(!all_text.iter().any(|t| t.contains("@@")));
        assert!(!all_text.iter().any(|t| t.contains("index")));
    }

    #[test]
    fn parse_drops_lines_before_first_file_header() {
        // Content lines with no preceding `+++ b/` header are discarded.
        let input = "-orphan removal\n+orphan addition\n+++ b/late.py\n-kept\n";
        let record = parse_zero_context_diff(input);
        assert_eq!(record.files.len(), 1);
        assert_eq!(record.files["late.py"].len(), 1);
        assert_eq!(record.files["late.py"][0].text, "kept");
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_zero_context_diff("").is_empty());
    }

    #[test]
    fn parse_file_header_lines_are_not_content() {
        // `---`-prefixed lines must never be recorded as removals.
        let input = "+++ b/x.py\n--- a/x.py\n-real removal\n";
        let record = parse_zero_context_diff(input);
        assert_eq!(record.files["x.py"].len(), 1);
        assert_eq!(record.files["x.py"][0].text, "real removal");
    }

    #[tokio::test]
    async fn diff_on_non_git_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let record = diff(dir.path(), "HEAD~1", "HEAD").await;
        assert!(record.is_empty());
    }
}
