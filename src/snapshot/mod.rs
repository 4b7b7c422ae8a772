//! Budget-capped code snapshot of a working tree.
//!
//! Produces the line-numbered textual summary the judgment step reads.
//! The walk is lexicographic so the same tree state always yields the
//! same snapshot, and truncation is deterministic: per-file budgets cut
//! at the last whole line that fits, and the final string is hard-capped
//! to the total budget.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::constants::{SNAPSHOT_MAX_FILE_BYTES, SNAPSHOT_PRUNE_DIRS, SNAPSHOT_SKIP_SUFFIXES};

/// Summarize the tree under `root`.
///
/// Tooling/VCS/dependency directories are pruned before descent and
/// never opened. Files matching the skip suffixes or exceeding the
/// on-disk size ceiling are never opened either. Everything else is
/// read as best-effort UTF-8 with undecodable bytes dropped.
pub fn summarize(root: &Path, total_budget_chars: usize, per_file_budget_chars: usize) -> String {
    let mut summary = String::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_pruned_dir(e));

    for entry in walker.flatten() {
        if entry.file_type().is_dir() {
            push_directory_header(&mut summary, entry.path());
        } else if entry.file_type().is_file() {
            push_file_block(&mut summary, entry.path(), per_file_budget_chars);
        }
    }

    truncate_chars(&summary, total_budget_chars).to_string()
}

/// Truncate to at most `max_chars` characters, never splitting a char.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn is_pruned_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SNAPSHOT_PRUNE_DIRS.contains(&name))
}

/// Emit `Directory: <path>` with its direct file names, sorted.
fn push_directory_header(summary: &mut String, dir: &Path) {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.file_type().is_ok_and(|ft| ft.is_file()))
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();

    summary.push_str(&format!(
        "\nDirectory: {}\nFiles: {}\n",
        dir.display(),
        names.join(", ")
    ));
}

/// Emit one line-numbered file block, stopping at the last whole line
/// that fits the per-file budget.
fn push_file_block(summary: &mut String, path: &Path, per_file_budget_chars: usize) {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if SNAPSHOT_SKIP_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        return;
    }

    // Size check before opening the file.
    let Ok(meta) = path.metadata() else {
        return;
    };
    if meta.len() > SNAPSHOT_MAX_FILE_BYTES {
        return;
    }

    let Ok(bytes) = std::fs::read(path) else {
        return;
    };
    let text = decode_dropping_invalid(&bytes);

    let mut block = String::new();
    let mut used_chars = 0usize;
    for (i, line) in text.lines().enumerate() {
        let entry = format!("{}: {line}\n", i + 1);
        let entry_chars = entry.chars().count();
        if used_chars + entry_chars > per_file_budget_chars {
            break;
        }
        block.push_str(&entry);
        used_chars += entry_chars;
    }

    summary.push_str(&format!("--- {name} ---\n{block}\n"));
}

/// Decode bytes as UTF-8, dropping undecodable sequences.
fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SNAPSHOT_FILE_CHARS, SNAPSHOT_TOTAL_CHARS};

    fn chars(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn truncate_chars_at_boundary() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn truncate_chars_multibyte() {
        // Never panics mid-char on multibyte input.
        let s = "日本語テキスト";
        assert_eq!(truncate_chars(s, 2), "日本");
    }

    #[test]
    fn summarize_numbers_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), "first\nsecond\n").unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert!(out.contains("--- app.py ---"));
        assert!(out.contains("1: first\n"));
        assert!(out.contains("2: second\n"));
    }

    #[test]
    fn summarize_emits_directory_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "y\n").unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert!(out.contains("Directory: "));
        assert!(out.contains("Files: a.py, b.py"));
    }

    #[test]
    fn summarize_prunes_tooling_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules").join("dep.js"), "secret").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git").join("HEAD"), "ref: main").unwrap();
        std::fs::write(dir.path().join("main.py"), "visible\n").unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert!(out.contains("main.py"));
        assert!(!out.contains("dep.js"));
        assert!(!out.contains("node_modules"));
        assert!(!out.contains("HEAD"));
    }

    #[test]
    fn summarize_skips_binary_and_lock_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), [0xFFu8, 0xD8]).unwrap();
        std::fs::write(dir.path().join("package-lock.json"), "{}").unwrap();
        std::fs::write(dir.path().join("debug.log"), "noise").unwrap();
        std::fs::write(dir.path().join("keep.rs"), "fn main() {}\n").unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert!(out.contains("--- keep.rs ---"));
        assert!(!out.contains("--- logo.png ---"));
        assert!(!out.contains("--- package-lock.json ---"));
        assert!(!out.contains("--- debug.log ---"));
    }

    #[test]
    fn summarize_skips_oversized_files_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let big = "x".repeat((SNAPSHOT_MAX_FILE_BYTES + 1) as usize);
        std::fs::write(dir.path().join("huge.py"), &big).unwrap();
        std::fs::write(dir.path().join("small.py"), "ok\n").unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert!(out.contains("--- small.py ---"));
        assert!(!out.contains("--- huge.py ---"));
    }

    #[test]
    fn per_file_budget_truncates_at_line_boundary() {
        let dir = tempfile::tempdir().unwrap();
        // Each numbered entry is "N: 0123456789\n" — 14+ chars. A budget
        // of 40 fits two whole entries, never a partial third.
        let content = (0..10).map(|_| "0123456789\n").collect::<String>();
        std::fs::write(dir.path().join("f.py"), &content).unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, 40);
        assert!(out.contains("1: 0123456789\n"));
        assert!(out.contains("2: 0123456789\n"));
        assert!(!out.contains("3: 0123456789"));
        // No partial line: every emitted content line ends with the full text.
        for line in out.lines().filter(|l| l.contains(": 0123")) {
            assert!(line.ends_with("0123456789"), "partial line: {line}");
        }
    }

    #[test]
    fn total_budget_is_a_hard_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..20 {
            std::fs::write(
                dir.path().join(format!("file_{i:02}.py")),
                "line\n".repeat(50),
            )
            .unwrap();
        }

        let out = summarize(dir.path(), 500, SNAPSHOT_FILE_CHARS);
        assert!(chars(&out) <= 500);
    }

    #[test]
    fn summarize_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.py"), "bee\n").unwrap();
        std::fs::write(dir.path().join("a.py"), "ay\n").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.py"), "sea\n").unwrap();

        let first = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        let second = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert_eq!(first, second);

        // Lexicographic: a.py before b.py before the sub directory block.
        let a = first.find("--- a.py ---").unwrap();
        let b = first.find("--- b.py ---").unwrap();
        let c = first.find("--- c.py ---").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn undecodable_bytes_are_dropped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"valid ".to_vec();
        bytes.extend([0xFF, 0xFE]);
        bytes.extend(b" tail\n");
        std::fs::write(dir.path().join("mixed.py"), &bytes).unwrap();

        let out = summarize(dir.path(), SNAPSHOT_TOTAL_CHARS, SNAPSHOT_FILE_CHARS);
        assert!(out.contains("valid  tail"));
        assert!(!out.contains('\u{FFFD}'));
    }

    #[test]
    fn decode_dropping_invalid_drops_bad_bytes() {
        let bytes = [b'a', 0xFF, b'b'];
        assert_eq!(decode_dropping_invalid(&bytes), "ab");
    }
}
