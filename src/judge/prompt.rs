//! Judgment prompt construction.
//!
//! Every evidence section is capped before it enters the prompt, and
//! the caps are sized to leave headroom below the judgment service's
//! own input limits for the surrounding instructions.

use crate::constants::{
    PROMPT_DIFF_CHARS, PROMPT_GUIDELINES_CHARS, PROMPT_REQUIREMENTS_CHARS, PROMPT_SNAPSHOT_CHARS,
    PROMPT_TIMELINE_CHARS,
};
use crate::evidence::EvidenceBundle;
use crate::models::AnalysisMode;
use crate::snapshot::truncate_chars;

/// The system prompt for a given analysis mode.
pub fn system_prompt(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Standard => {
            "You are a Senior Quality & Compliance Auditor. You analyze implemented \
             code against requirements and guidelines and respond with JSON only."
        }
        AnalysisMode::Evolution => {
            "You are a Feature Loss Detective. You analyze commit history to identify \
             removed or silently replaced features and respond with JSON only."
        }
    }
}

/// Build the user prompt for one audit.
pub fn build_prompt(
    mode: AnalysisMode,
    bundle: &EvidenceBundle,
    requirements: &str,
    guidelines: &str,
) -> String {
    match mode {
        AnalysisMode::Standard => build_standard_prompt(bundle, requirements, guidelines),
        AnalysisMode::Evolution => build_evolution_prompt(bundle, requirements, guidelines),
    }
}

/// Unified compliance analysis: requirement drift, feature
/// completeness, and guideline coverage over the current snapshot.
fn build_standard_prompt(bundle: &EvidenceBundle, requirements: &str, guidelines: &str) -> String {
    let mut prompt = String::new();

    push_corpus_sections(&mut prompt, requirements, guidelines);

    prompt.push_str(&format!(
        "## Implemented Code Context\n\n{}\n\n",
        bundle.code_snapshot
    ));

    prompt.push_str(
        "## Your Task\n\n\
         Perform a UNIFIED ANALYSIS of the implemented code for three critical areas:\n\n\
         1. **REQUIREMENT DRIFT**:\n\
            - Detect **MISSING** features (in requirements but not in code).\n\
            - Detect **EXTRA** features (in code but not in requirements — \"gold plating\").\n\
            - Detect **MODIFIED** features (implemented differently than required).\n\
         2. **FEATURE COMPLETENESS**:\n\
            - Identify features from requirements that are partially implemented or missing.\n\
            - Assess implementation quality and depth.\n\
         3. **GUIDELINE COVERAGE (Do's & Don'ts)**:\n\
            - Validate that \"do's\" are followed and \"don'ts\" are avoided.\n\
            - Identify gaps in best practices, security, and error handling.\n\n\
         Scoring rubric (0 to 100):\n\
         - Start at 100 points and subtract per issue found. The minimum score is 0.\n\
         - -20: major feature missing or incomplete.\n\
         - -15: violation of a critical \"don't\" guideline.\n\
         - -10: feature modified significantly without justification.\n\
         - -10: missing critical \"do\" (security/validation).\n\
         - -5: minor extra feature (gold plating).\n\
         - -5: minor guideline deviation or code smell.\n\n\
         DEDUPLICATION: if two or more issues are semantically the same, merge them \
         into a single concise item.\n\n\
         For EACH issue provide: \"category\" (Drift/Completeness/Guideline Violation), \
         \"description\", \"evidence\" (specific file and LINE NUMBERS, e.g. app.py:L45-L50), \
         \"rationale\", and \"remediation\".\n\n\
         Output JSON only, in this shape:\n\
         {\n\
           \"score\": 85,\n\
           \"summary\": \"Overall quality summary...\",\n\
           \"findings\": [\n\
             {\"category\": \"...\", \"description\": \"...\", \"evidence\": \"...\", \
         \"rationale\": \"...\", \"remediation\": \"...\"}\n\
           ]\n\
         }\n",
    );

    prompt
}

/// Feature-loss analysis over the selected commit range.
fn build_evolution_prompt(bundle: &EvidenceBundle, requirements: &str, guidelines: &str) -> String {
    let mut prompt = String::new();

    push_corpus_sections(&mut prompt, requirements, guidelines);

    prompt.push_str(&format!(
        "## Current Code Context (Current Implementation)\n\n{}\n\n",
        truncate_chars(&bundle.code_snapshot, PROMPT_SNAPSHOT_CHARS)
    ));

    let timeline_json = serde_json::to_string_pretty(&timeline_context(bundle))
        .unwrap_or_else(|_| "{}".to_string());
    prompt.push_str(&format!(
        "## Commit History Timeline\n\n{}\n\n",
        truncate_chars(&timeline_json, PROMPT_TIMELINE_CHARS)
    ));

    let (base_hash, head_hash) = match bundle.range {
        Some(ref range) => (range.base.short_hash(), range.head.short_hash()),
        None => ("unknown", "unknown"),
    };
    let diff_json = serde_json::to_string_pretty(&bundle.diff_since_base.to_prompt_json())
        .unwrap_or_else(|_| "{}".to_string());
    prompt.push_str(&format!(
        "## Full Code Diff (Between Base: {base_hash} and Head: {head_hash})\n\n{}\n\n",
        truncate_chars(&diff_json, PROMPT_DIFF_CHARS)
    ));

    prompt.push_str(
        "## Your Task\n\n\
         1. **Identify feature loss**: find features that existed in requirements or \
         base commits but are now altered or removed.\n\
         2. **Detect REPLACEMENTS**: check whether code marked with '-' (deleted) was \
         replaced by code marked with '+' (added) or exists in the current implementation.\n\
            - Replaced by new logic performing the same feature → \"Replacement - Feature Preserved\".\n\
            - Deleted or changed with NO equivalent code found → \"Accidental Loss - Feature Missing\".\n\
         3. **Analyze the entire evolution**: use the whole commit history provided to \
         understand the developer's intent.\n\n\
         Scoring rubric (0 to 100):\n\
         - Start at 100 points and subtract per issue found. The minimum score is 0.\n\
         - -30: critical feature deleted and NOT replaced.\n\
         - -10: feature replaced with inferior logic.\n\
         - -5: feature replaced with better or equivalent logic (refactor).\n\n\
         Output JSON only, in this shape:\n\
         {\n\
           \"score\": 85,\n\
           \"summary\": \"Full evolution summary...\",\n\
           \"feature_changes\": [\n\
             {\"feature_name\": \"...\", \"status\": \"Loss/Replacement/Updated\", \
         \"severity\": \"Critical/High/Medium/Low\", \"evidence\": \"deleted vs added code \
         with LINE NUMBERS where possible\", \"replacement_logic\": \"...\", \
         \"requirement_reference\": \"...\", \"impact\": \"...\", \"commit_info\": \"...\", \
         \"reasoning\": \"...\", \"remediation\": \"...\"}\n\
           ]\n\
         }\n",
    );

    prompt
}

/// Requirements and guidelines sections, shared by both modes.
fn push_corpus_sections(prompt: &mut String, requirements: &str, guidelines: &str) {
    prompt.push_str(&format!(
        "## Requirements Document\n\n{}\n\n",
        truncate_chars(requirements, PROMPT_REQUIREMENTS_CHARS)
    ));

    let guidelines = if guidelines.trim().is_empty() {
        "No specific guidelines provided."
    } else {
        truncate_chars(guidelines, PROMPT_GUIDELINES_CHARS)
    };
    prompt.push_str(&format!(
        "## Do's and Don'ts Guidelines\n\n{guidelines}\n\n"
    ));
}

/// Aggregate timeline view for prompt embedding, commit hashes
/// abbreviated.
fn timeline_context(bundle: &EvidenceBundle) -> serde_json::Value {
    let timeline: Vec<serde_json::Value> = bundle
        .deletion_timeline
        .iter()
        .map(|event| {
            serde_json::json!({
                "commit": {
                    "hash": event.commit.short_hash(),
                    "message": event.commit.message,
                    "date": event.commit.timestamp,
                    "author": event.commit.author,
                },
                "files_modified": event.files_modified,
                "total_lines_deleted": event.total_lines_deleted,
            })
        })
        .collect();

    let mut context = serde_json::json!({
        "total_commits_analyzed": bundle.history_window.len(),
        "commits_with_deletions": bundle.deletion_timeline.len(),
        "deletion_timeline": timeline,
    });

    if let (Some(newest), Some(oldest)) =
        (bundle.history_window.first(), bundle.history_window.last())
    {
        context["newest_commit"] = serde_json::json!({
            "hash": newest.short_hash(),
            "date": newest.timestamp,
        });
        context["oldest_commit"] = serde_json::json!({
            "hash": oldest.short_hash(),
            "date": oldest.timestamp,
        });
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangedLine, Commit, DeletionEvent, DiffRecord};
    use crate::range::AuditRange;

    fn commit(hash: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: format!("commit {hash}"),
            timestamp: "2026-01-01 00:00:00 +0000".to_string(),
            author: "dev".to_string(),
        }
    }

    fn bundle_with_range() -> EvidenceBundle {
        let mut diff = DiffRecord::default();
        diff.files.insert(
            "app.py".to_string(),
            vec![ChangedLine::removed("def gone():")],
        );
        EvidenceBundle {
            code_snapshot: "--- app.py ---\n1: def gone():\n".to_string(),
            history_window: vec![commit("headhash1"), commit("basehash1")],
            range: Some(AuditRange {
                base: commit("basehash1"),
                head: commit("headhash1"),
            }),
            diff_since_base: diff,
            deletion_timeline: vec![DeletionEvent {
                commit: commit("headhash1"),
                files_modified: vec!["app.py".to_string()],
                total_lines_deleted: 1,
            }],
        }
    }

    #[test]
    fn standard_prompt_contains_sections_and_rubric() {
        let prompt = build_prompt(
            AnalysisMode::Standard,
            &bundle_with_range(),
            "REQ-1: must parse",
            "Don't unwrap",
        );
        assert!(prompt.contains("## Requirements Document"));
        assert!(prompt.contains("REQ-1: must parse"));
        assert!(prompt.contains("Don't unwrap"));
        assert!(prompt.contains("## Implemented Code Context"));
        assert!(prompt.contains("REQUIREMENT DRIFT"));
        assert!(prompt.contains("Start at 100 points"));
        assert!(prompt.contains("\"findings\""));
    }

    #[test]
    fn evolution_prompt_embeds_diff_and_timeline() {
        let prompt = build_prompt(
            AnalysisMode::Evolution,
            &bundle_with_range(),
            "REQ-1",
            "",
        );
        assert!(prompt.contains("## Commit History Timeline"));
        assert!(prompt.contains("total_lines_deleted"));
        assert!(prompt.contains("-def gone():"));
        assert!(prompt.contains("Between Base: basehash and Head: headhash"));
        assert!(prompt.contains("\"feature_changes\""));
    }

    #[test]
    fn empty_guidelines_get_placeholder() {
        let prompt = build_prompt(AnalysisMode::Standard, &bundle_with_range(), "req", "  ");
        assert!(prompt.contains("No specific guidelines provided."));
    }

    #[test]
    fn requirements_are_capped() {
        let long = "r".repeat(PROMPT_REQUIREMENTS_CHARS + 5_000);
        let prompt = build_prompt(AnalysisMode::Standard, &bundle_with_range(), &long, "");
        // The prompt holds at most the cap's worth of requirement text.
        let count = prompt.matches('r').count();
        assert!(count <= PROMPT_REQUIREMENTS_CHARS + 1_000);
    }

    #[test]
    fn evolution_prompt_without_range_says_unknown() {
        let bundle = EvidenceBundle {
            code_snapshot: String::new(),
            history_window: vec![],
            range: None,
            diff_since_base: DiffRecord::default(),
            deletion_timeline: vec![],
        };
        let prompt = build_prompt(AnalysisMode::Evolution, &bundle, "req", "");
        assert!(prompt.contains("Between Base: unknown and Head: unknown"));
    }

    #[test]
    fn system_prompts_differ_by_mode() {
        assert_ne!(
            system_prompt(AnalysisMode::Standard),
            system_prompt(AnalysisMode::Evolution)
        );
    }
}
