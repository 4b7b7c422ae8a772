//! Anonymous usage telemetry — privacy-respecting heartbeat.
//!
//! Sends a single fire-and-forget POST on each `audit` run containing
//! only aggregate, non-identifying statistics: commit count, deletion
//! event count, snapshot size, analysis mode, and whether the run is
//! inside CI.
//!
//! The heartbeat:
//! - contains **no** personally identifiable information (no repository
//!   URL, no file paths, no code)
//! - is disabled with `--no-telemetry`, `DRIFTWATCH_TELEMETRY=false`,
//!   or `[telemetry] enabled = false` in config
//! - fails silently — never affects the audit outcome

use serde::Serialize;
use std::time::Duration;

const HEARTBEAT_URL: &str = crate::constants::TELEMETRY_URL;

/// Maximum time we'll wait for the heartbeat POST before giving up.
const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(2);

/// Payload sent with each heartbeat. Contains only anonymous aggregate data.
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatPayload {
    /// Random identifier for this single run (not persisted across runs).
    pub run_id: String,
    /// Number of commits in the analyzed window.
    pub commits_analyzed: usize,
    /// Number of commits that deleted source lines.
    pub commits_with_deletions: usize,
    /// Character length of the code snapshot.
    pub snapshot_chars: usize,
    /// Analysis mode label ("standard" or "evolution").
    pub mode: String,
    /// Whether the run appears to be inside a CI environment.
    pub is_ci: bool,
    /// CLI version string.
    pub version: &'static str,
}

impl HeartbeatPayload {
    /// Build a payload from the available audit parameters.
    pub fn from_audit(
        commits_analyzed: usize,
        commits_with_deletions: usize,
        snapshot_chars: usize,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            commits_analyzed,
            commits_with_deletions,
            snapshot_chars,
            mode: mode.into(),
            is_ci: detect_ci(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Detect whether we are running inside a CI environment by checking
/// common environment variables set by popular CI providers.
pub fn detect_ci() -> bool {
    // Generic
    if std::env::var("CI").is_ok() {
        return true;
    }
    // Provider-specific variables (for systems that don't set `CI`)
    const CI_VARS: &[&str] = &[
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "BITBUCKET_BUILD_NUMBER",
        "JENKINS_URL",
        "CIRCLECI",
        "TF_BUILD",        // Azure Pipelines
        "BUILDKITE",
        "TRAVIS",
        "CODEBUILD_BUILD_ID", // AWS CodeBuild
        "TEAMCITY_VERSION",
    ];
    CI_VARS.iter().any(|var| std::env::var(var).is_ok())
}

/// Fire-and-forget: send the heartbeat payload. Returns immediately via
/// `tokio::spawn`. The spawned task will silently discard any errors.
pub fn send_heartbeat(payload: HeartbeatPayload) {
    tokio::spawn(async move {
        let _ = post_heartbeat(&payload).await;
    });
}

/// Actually perform the HTTP POST. Separated for testability.
async fn post_heartbeat(payload: &HeartbeatPayload) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(HEARTBEAT_TIMEOUT)
        .build()?;

    client.post(HEARTBEAT_URL).json(payload).send().await?;

    Ok(())
}
