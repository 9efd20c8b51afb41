//! Gathers the commit list and repository metadata a command works on.

use crate::cache::Cache;
use crate::config::{Config, Source};
use crate::error::{Result, ScopeError};
use crate::git::{reflog, GitRepo};
use crate::ingest;
use crate::model::{CommitRecord, DateRange, RepositoryMeta};
use crate::util::parse_instant;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub struct Collected {
    pub commits: Vec<CommitRecord>,
    pub repository: RepositoryMeta,
    pub range: DateRange,
}

pub fn collect(config: &Config) -> anyhow::Result<Collected> {
    match &config.source {
        Source::Json(path) => collect_json(config, path),
        Source::Reflog => collect_reflog(config),
        Source::Repository => collect_repository(config),
    }
}

fn collect_json(config: &Config, path: &Path) -> anyhow::Result<Collected> {
    let commits = ingest::load_commits(path)
        .with_context(|| format!("Failed to load commits from {}", path.display()))?;
    let range = parse_range(config.since.as_deref(), config.until.as_deref())
        .context("Failed to resolve date range")?;

    let stdin = path == Path::new("-");
    let repository = RepositoryMeta {
        name: config.name.clone().or_else(|| {
            (!stdin)
                .then(|| path.file_stem().map(|s| s.to_string_lossy().to_string()))
                .flatten()
        }),
        path: (!stdin).then(|| path.display().to_string()),
        ..RepositoryMeta::default()
    };

    Ok(Collected {
        commits,
        repository,
        range,
    })
}

fn collect_reflog(config: &Config) -> anyhow::Result<Collected> {
    // The object database may be unusable; fall back to the plain `.git` directory.
    let (git_dir, repository) = match GitRepo::open(config.repo.as_ref()) {
        Ok(repo) => (repo.git_dir().to_path_buf(), repository_meta(&repo, config)),
        Err(e) => {
            let root = match &config.repo {
                Some(p) => p.clone(),
                None => std::env::current_dir()?,
            };
            tracing::warn!(error = %e, "could not open repository, reading reflog files directly");
            let git_dir = locate_git_dir(&root)
                .with_context(|| format!("No .git directory found under {}", root.display()))?;
            let repository = RepositoryMeta {
                name: config.name.clone().or_else(|| {
                    root.file_name().map(|n| n.to_string_lossy().to_string())
                }),
                path: Some(root.display().to_string()),
                ..RepositoryMeta::default()
            };
            (git_dir, repository)
        }
    };

    let commits = reflog::read_reflogs(&git_dir).context("Failed to read reflog files")?;
    let range = parse_range(config.since.as_deref(), config.until.as_deref())
        .context("Failed to resolve date range")?;

    Ok(Collected {
        commits,
        repository,
        range,
    })
}

fn collect_repository(config: &Config) -> anyhow::Result<Collected> {
    let repo = GitRepo::open(config.repo.as_ref()).context("Failed to open git repository")?;

    let range = repo
        .resolve_range(config.since.as_deref(), config.until.as_deref())
        .context("Failed to resolve date range")?;

    let ids = repo
        .commit_ids(config.include_merges)
        .context("Failed to walk commit history")?;
    tracing::info!(commits = ids.len(), "walked repository history");

    let commits = if config.use_cache {
        let mut cache = Cache::open(config.cache_dir_for(repo.path()))
            .context("Failed to initialize cache")?;
        fetch_with_cache(&repo, &mut cache, &ids, config.binary)?
    } else {
        repo.collect_commits(&ids, config.binary)
            .context("Failed to collect commits from repository")?
    };

    Ok(Collected {
        commits,
        repository: repository_meta(&repo, config),
        range,
    })
}

/// Diff only the commits the cache has not seen, then serve everything from it.
pub fn fetch_with_cache(
    repo: &GitRepo,
    cache: &mut Cache,
    ids: &[String],
    binary: bool,
) -> anyhow::Result<Vec<CommitRecord>> {
    let missing = cache
        .get_missing_commits(ids)
        .context("Failed to query commit cache")?;
    tracing::info!(
        cached = ids.len() - missing.len(),
        missing = missing.len(),
        "commit cache lookup"
    );

    if !missing.is_empty() {
        let fresh = repo
            .collect_commits(&missing, binary)
            .context("Failed to collect commits from repository")?;
        cache
            .store_commits(&fresh)
            .context("Failed to store commits in cache")?;
    }

    cache
        .get_commits(ids)
        .context("Failed to read cached commits")
}

fn repository_meta(repo: &GitRepo, config: &Config) -> RepositoryMeta {
    let mut meta = RepositoryMeta {
        name: config.name.clone().or_else(|| repo.name()),
        url: repo.remote_url(),
        path: Some(repo.path().display().to_string()),
        ..RepositoryMeta::default()
    };
    if let Some(branch) = repo.current_branch() {
        meta.extra
            .insert("branch".to_string(), serde_json::Value::String(branch));
    }
    meta
}

fn locate_git_dir(root: &Path) -> Option<PathBuf> {
    let dot_git = root.join(".git");
    if dot_git.join("logs").is_dir() {
        Some(dot_git)
    } else if root.join("logs").is_dir() {
        Some(root.to_path_buf())
    } else {
        None
    }
}

/// Date window from `--since` / `--until` when no repository is available to
/// resolve revisions against.
pub fn parse_range(since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
    let parse = |input: &str, end_of_day: bool| {
        parse_instant(input, end_of_day)
            .ok_or_else(|| ScopeError::InvalidDate(format!("Unrecognized date '{input}'")))
    };

    let since = since.map(|s| parse(s, false)).transpose()?;
    let until = until.map(|u| parse(u, true)).transpose()?;

    if let (Some(s), Some(u)) = (since, until) {
        if s > u {
            return Err(ScopeError::InvalidDate(format!(
                "Invalid range: since ({s}) is after until ({u})"
            )));
        }
    }

    let mut range = DateRange::new();
    if let Some(s) = since {
        range = range.with_since(s);
    }
    if let Some(u) = until {
        range = range.with_until(u);
    }
    Ok(range)
}
