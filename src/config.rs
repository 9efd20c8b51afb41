use crate::cli::{CommonArgs, Period};
use anyhow::bail;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};

pub const CACHE_DIR_NAME: &str = ".commitscope";
pub const LOG_ENV: &str = "COMMITSCOPE_LOG";
const DEFAULT_LOG: &str = "commitscope=warn";

/// Where commits come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Repository,
    Reflog,
    Json(PathBuf),
}

/// Settings resolved from flags, environment and `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: Option<PathBuf>,
    pub source: Source,
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    pub include_merges: bool,
    pub binary: bool,
    pub name: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

impl Config {
    pub fn from_args(args: &CommonArgs) -> anyhow::Result<Self> {
        let source = match (&args.input, args.reflog) {
            (Some(path), false) => Source::Json(path.clone()),
            (None, true) => Source::Reflog,
            (None, false) => Source::Repository,
            (Some(_), true) => bail!("--input and --reflog cannot be combined"),
        };

        let (since, until) = match args.period {
            Some(period) => (period_start(period, Utc::now()).map(|s| s.to_rfc3339()), None),
            None => (args.since.clone(), args.until.clone()),
        };

        Ok(Self {
            repo: args.repo.clone(),
            use_cache: !args.no_cache && source == Source::Repository,
            source,
            cache_dir: args.cache.clone(),
            include_merges: !args.no_merges,
            binary: args.binary,
            name: args.name.clone().filter(|n| !n.trim().is_empty()),
            since,
            until,
        })
    }

    /// Cache directory for a repository rooted at `repo_path`.
    pub fn cache_dir_for(&self, repo_path: &Path) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| repo_path.join(CACHE_DIR_NAME))
    }
}

/// Start of a quick-filter window ending at `now`.
pub fn period_start(period: Period, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    period.days().map(|d| now - Duration::days(d))
}

/// Default filter directive for the given `-v` count.
pub fn default_log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => DEFAULT_LOG,
        1 => "commitscope=info",
        _ => "commitscope=debug",
    }
}
