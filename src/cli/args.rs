//! Clap argument types and validation.

use clap::Parser;
use std::path::PathBuf;

use driftwatch::models::AnalysisMode;

/// Audits a repository's evolution against a requirements corpus and
/// gates on the resulting compliance score.
#[derive(Parser, Debug)]
#[command(name = "driftwatch", version = driftwatch::constants::VERSION)]
pub struct Cli {
    /// Disable anonymous usage telemetry.
    #[arg(long, global = true, default_value_t = false)]
    pub no_telemetry: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run an audit against a repository.
    Audit(Box<AuditArgs>),

    /// Inspect or reset the per-repository audit history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Print version and build information.
    Version,
}

/// Arguments for the `audit` subcommand.
#[derive(Parser, Debug)]
pub struct AuditArgs {
    /// Git repository URL (or local path) to audit.
    #[arg(long)]
    pub repo: String,

    /// Path to the requirements document (txt/md).
    #[arg(long)]
    pub requirements: PathBuf,

    /// Path to the do's and don'ts guidelines document (txt/md).
    #[arg(long)]
    pub guidelines: Option<PathBuf>,

    /// Analysis mode.
    #[arg(long, value_enum, default_value_t = AnalysisMode::Standard)]
    pub mode: AnalysisMode,

    /// Minimum score to pass; overrides the configured threshold.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Path to save the results summary as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Explicit base commit (hash prefix) for the audited range.
    #[arg(long)]
    pub base: Option<String>,

    /// Explicit head commit (hash prefix) for the audited range.
    #[arg(long)]
    pub head: Option<String>,

    /// How many commits to read from history; overrides config.
    #[arg(long)]
    pub max_commits: Option<usize>,

    /// Suppress the banner and progress messages. Only the report and
    /// errors are shown.
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

impl AuditArgs {
    /// Validate the threshold, when given, is a sensible score.
    pub fn validate_threshold(&self) -> Result<(), String> {
        match self.threshold {
            Some(t) if !(0.0..=100.0).contains(&t) => {
                Err(format!("--threshold must be within 0..=100, got {t}"))
            }
            _ => Ok(()),
        }
    }
}

/// History management subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum HistoryAction {
    /// Show past audits for a repository.
    List {
        /// Repository URL the history is keyed by.
        #[arg(long)]
        repo: String,
    },
    /// Clear the stored history for a repository, forcing the next
    /// audit to examine the full range.
    Clear {
        /// Repository URL the history is keyed by.
        #[arg(long)]
        repo: String,
    },
}
