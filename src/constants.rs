//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! resource budgets, and the file-classification sets shared by the diff
//! extractor and the snapshot summarizer.

use std::time::Duration;

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "driftwatch";

/// Local config filename (e.g. `.driftwatch.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".driftwatch.toml";

/// Directory name under `~/.config/` for global config and the history store.
pub const CONFIG_DIR: &str = "driftwatch";

/// Filename of the audit history store inside the config directory.
pub const HISTORY_FILENAME: &str = "history.json";

/// Telemetry heartbeat endpoint.
pub const TELEMETRY_URL: &str = "https://driftwatch.dev/v1/heartbeat";

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git SHA of the build tree (from build.rs).
pub const GIT_SHA: &str = env!("DRIFTWATCH_GIT_SHA");

/// Build date (from build.rs).
pub const BUILD_DATE: &str = env!("DRIFTWATCH_BUILD_DATE");

/// Compilation target triple (from build.rs).
pub const TARGET: &str = env!("TARGET");

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "DRIFTWATCH_PROVIDER";
pub const ENV_MODEL: &str = "DRIFTWATCH_MODEL";
pub const ENV_API_KEY: &str = "DRIFTWATCH_API_KEY";
pub const ENV_BASE_URL: &str = "DRIFTWATCH_BASE_URL";
pub const ENV_TELEMETRY: &str = "DRIFTWATCH_TELEMETRY";

// ── Process boundaries ──────────────────────────────────────────────

/// Hard ceiling on any single git query (log/diff). A hung git process
/// degrades to "no data" instead of blocking the pipeline forever.
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling on `git clone` — network-bound, so considerably longer.
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(300);

// ── Evidence budgets (characters unless noted) ──────────────────────

/// Total size of the code snapshot handed to the judgment step.
pub const SNAPSHOT_TOTAL_CHARS: usize = 45_000;

/// Per-file share of the snapshot; truncated at the last whole line.
pub const SNAPSHOT_FILE_CHARS: usize = 3_000;

/// Files larger than this on disk are never opened by the summarizer.
pub const SNAPSHOT_MAX_FILE_BYTES: u64 = 102_400;

/// Requirements document cap inside the judgment prompt.
pub const PROMPT_REQUIREMENTS_CHARS: usize = 10_000;

/// Guidelines document cap inside the judgment prompt.
pub const PROMPT_GUIDELINES_CHARS: usize = 5_000;

/// Code snapshot cap inside the evolution prompt (leaves headroom for
/// the diff and timeline sections).
pub const PROMPT_SNAPSHOT_CHARS: usize = 15_000;

/// Deletion timeline JSON cap inside the judgment prompt.
pub const PROMPT_TIMELINE_CHARS: usize = 5_000;

/// Range diff JSON cap inside the judgment prompt.
pub const PROMPT_DIFF_CHARS: usize = 5_000;

// ── File classification ─────────────────────────────────────────────

/// Recognized source-code extensions. The diff extractor only records
/// changes to paths ending in one of these.
pub const SOURCE_FILE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".java", ".cpp", ".c", ".cs", ".go", ".rb", ".php",
    ".swift", ".kt", ".rs", ".scala", ".r", ".jsx", ".tsx", ".vue", ".html",
    ".css", ".scss",
];

/// Filename suffixes the snapshot summarizer skips without opening.
pub const SNAPSHOT_SKIP_SUFFIXES: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".ico", ".pyc", ".exe", ".dll", ".so",
    ".dylib", ".pdf", ".zip", ".tar.gz", "-lock.json", ".lock", ".log",
];

/// Directories pruned before descent — never opened or read.
pub const SNAPSHOT_PRUNE_DIRS: &[&str] = &[
    ".git", "node_modules", "__pycache__", "build", "dist", ".next", ".venv",
    "venv", "env", "target", ".idea", ".vscode",
];
