//! Judgment report types.
//!
//! The judgment service returns JSON; these types deserialize it
//! defensively. LLMs drift on field names and value types, so scores
//! accept numbers or numeric strings (clamped to [0, 100]) and every
//! text field defaults to empty rather than failing the parse.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single finding produced by the judgment step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuditFinding {
    /// Issue category, e.g. "Drift", "Completeness", "Guideline Violation".
    #[serde(default, alias = "type")]
    pub category: String,
    /// What the issue is.
    #[serde(default)]
    pub description: String,
    /// Where the issue lives: file and line numbers, or a code snippet.
    #[serde(default)]
    pub evidence: String,
    /// Why it is a problem.
    #[serde(default, alias = "reasoning")]
    pub rationale: String,
    /// Suggested fix.
    #[serde(default)]
    pub remediation: String,
}

/// A feature-level change detected by the evolution analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FeatureChange {
    #[serde(default)]
    pub feature_name: String,
    /// "Loss", "Replacement", or "Updated" (free-form from the model).
    #[serde(default)]
    pub status: String,
    /// "Critical", "High", "Medium", or "Low" (free-form from the model).
    #[serde(default)]
    pub severity: String,
    /// Deleted vs added code, with line numbers where available.
    #[serde(default)]
    pub evidence: String,
    /// The replacement logic found, if any.
    #[serde(default)]
    pub replacement_logic: String,
    /// The requirement the feature traces back to.
    #[serde(default)]
    pub requirement_reference: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub commit_info: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub remediation: String,
}

impl FeatureChange {
    /// Whether this change represents lost (not replaced) functionality.
    pub fn is_loss(&self) -> bool {
        let s = self.status.to_lowercase();
        s.contains("loss") || s.contains("missing")
    }

    /// Whether the model rated this change critical.
    pub fn is_critical(&self) -> bool {
        self.severity.to_lowercase().contains("critical")
    }
}

/// The structured result of one judgment invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuditReport {
    /// Compliance score in [0, 100]. Clamped on deserialization and
    /// again before persistence or display.
    #[serde(
        default,
        alias = "feature_loss_score",
        deserialize_with = "deserialize_score"
    )]
    pub score: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default, alias = "issues")]
    pub findings: Vec<AuditFinding>,
    #[serde(default)]
    pub feature_changes: Vec<FeatureChange>,
}

impl AuditReport {
    /// A zero-score report carrying an explanatory summary, used when
    /// the judgment step fails or returns something unparseable.
    pub fn failure(summary: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            summary: summary.into(),
            findings: Vec::new(),
            feature_changes: Vec::new(),
        }
    }

    /// Clamp the score to [0, 100]. NaN collapses to 0.
    pub fn clamp_score(&mut self) {
        self.score = clamp_score(self.score);
    }
}

/// Clamp a raw score into [0, 100]; non-finite values collapse to 0.
pub fn clamp_score(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Accept a score as a JSON number or a numeric string; anything else
/// (including absent, handled by `default`) becomes 0. Always clamped.
fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(clamp_score(raw))
}
