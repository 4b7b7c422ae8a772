//! driftwatch — repository evolution audit CLI.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use driftwatch::config::Config;
use driftwatch::constants;
use driftwatch::env::Env;
use driftwatch::history::HistoryStore;
use driftwatch::judge::JudgeProvider;
use driftwatch::judge::rig::RigJudge;
use driftwatch::output;
use driftwatch::pipeline::AuditPipeline;
use driftwatch::telemetry;
use driftwatch::workspace::Workspace;

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::args::{AuditArgs, Cli, Command, HistoryAction};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let no_telemetry = cli.no_telemetry;

    match cli.command {
        Command::Audit(args) => run_audit(*args, no_telemetry).await,
        Command::History { action } => run_history(action),
        Command::Version => run_version(),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!("{} {}", "driftwatch".bold(), constants::VERSION.green().bold());
    println!("{}     {}", "commit:".dimmed(), constants::GIT_SHA);
    println!("{}      {}", "built:".dimmed(), constants::BUILD_DATE);
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Inspect or reset the per-repository audit history.
fn run_history(action: HistoryAction) -> Result<()> {
    use colored::Colorize;

    let store = HistoryStore::new();

    match action {
        HistoryAction::List { repo } => {
            let entries = store.list(&repo);
            if entries.is_empty() {
                println!("No audit history for {repo}.");
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "  {}  {}  {}",
                    entry.timestamp.dimmed(),
                    format!("{:.1}/100", entry.score).bold(),
                    entry.analysis_type,
                );
                println!("         {}", entry.summary.dimmed());
                if let Some(ref hash) = entry.last_commit_hash {
                    println!("         {}  {}", "head:".cyan(), hash);
                }
            }
        }
        HistoryAction::Clear { repo } => {
            let existed = store.clear(&repo).context("failed to clear history")?;
            if existed {
                println!("History cleared. The next audit will examine the full range.");
            } else {
                println!("No audit history for {repo}.");
            }
        }
    }

    Ok(())
}

async fn run_audit(args: AuditArgs, no_telemetry: bool) -> Result<()> {
    args.validate_threshold()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    // The requirements corpus is the one input worth aborting over.
    let requirements = std::fs::read_to_string(&args.requirements).with_context(|| {
        format!(
            "failed to read requirements file {}",
            args.requirements.display()
        )
    })?;

    // Guidelines are optional; a read failure degrades to "none".
    let guidelines = match args.guidelines {
        Some(ref path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!(
                    "Warning: could not read guidelines file {}: {e}",
                    path.display()
                );
                String::new()
            }
        },
        None => String::new(),
    };

    let mut config =
        Config::load(Some(Path::new(".")), &Env::real()).context("failed to load configuration")?;
    if let Some(max_commits) = args.max_commits {
        config.audit.max_commits = max_commits;
    }
    let threshold = args.threshold.unwrap_or(config.audit.threshold);

    if !args.quiet {
        cli::print_banner(&args.repo, &args.mode.to_string());
    }

    let judge: Arc<dyn JudgeProvider> = Arc::new(
        RigJudge::new(config.provider.clone()).map_err(|e| anyhow::anyhow!("{e}"))?,
    );

    if !args.quiet {
        eprintln!("Acquiring repository workspace...");
    }
    let workspace = Workspace::acquire(&args.repo)
        .await
        .context("failed to acquire workspace")?;

    let pipeline = AuditPipeline::new(judge, &config, HistoryStore::new(), args.quiet);
    let outcome = pipeline
        .run(
            &args.repo,
            workspace.path(),
            args.mode,
            &requirements,
            &guidelines,
            args.base.as_deref(),
            args.head.as_deref(),
        )
        .await;

    workspace.release();

    // Fire anonymous telemetry heartbeat (non-blocking, fails silently)
    if config.telemetry.enabled && !no_telemetry {
        let payload = telemetry::HeartbeatPayload::from_audit(
            outcome.commits_analyzed,
            outcome.commits_with_deletions,
            outcome.snapshot_chars,
            args.mode.to_string(),
        );
        telemetry::send_heartbeat(payload);
    }

    print!("{}", output::terminal::render(&outcome, threshold));

    if let Some(ref path) = args.json {
        let summary = output::json::summary(&args.repo, args.mode, &outcome, threshold);
        let write_result = serde_json::to_string_pretty(&summary)
            .map_err(anyhow::Error::from)
            .and_then(|content| std::fs::write(path, content).map_err(anyhow::Error::from));
        match write_result {
            Ok(()) => {
                if !args.quiet {
                    eprintln!("Saved results to {}", path.display());
                }
            }
            Err(e) => eprintln!("Warning: could not save results to {}: {e}", path.display()),
        }
    }

    if outcome.report.score < threshold {
        bail!(
            "score {:.1} is below the threshold {threshold}",
            outcome.report.score,
        );
    }

    Ok(())
}
