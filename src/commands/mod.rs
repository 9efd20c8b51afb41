//! One module per report subcommand. Each gathers commits through
//! [`crate::collect`], runs the matching aggregation and renders a table,
//! JSON envelope or NDJSON stream.

pub mod contributors;
pub mod files;
pub mod log;
pub mod report;
pub mod summary;
pub mod timeline;

use crate::collect::Collected;
use crate::metrics::filter_commits;
use crate::model::{CommitRecord, DateRange, Output, RepositoryMeta};
use console::style;
use serde::Serialize;

pub(crate) const RULE_WIDTH: usize = 78;

/// Commits inside the requested window, or all of them when unbounded.
pub(crate) fn windowed(collected: &Collected) -> Vec<CommitRecord> {
    filter_commits(&collected.commits, &collected.range)
        .cloned()
        .collect()
}

pub(crate) fn output_json<T: Serialize>(
    repository: &RepositoryMeta,
    range: &DateRange,
    body: T,
) -> anyhow::Result<()> {
    let output = Output::new(repository.clone(), range, body);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) fn output_ndjson<T: Serialize>(items: &[T]) -> anyhow::Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

pub(crate) fn print_title(title: &str, repository: &RepositoryMeta, range: &DateRange) {
    match &repository.name {
        Some(name) => println!("{} {}", style(title).bold(), style(name).cyan()),
        None => println!("{}", style(title).bold()),
    }
    match (range.since, range.until) {
        (Some(since), Some(until)) => println!(
            "Filtering commits from {} to {}",
            since.format("%Y-%m-%d %H:%M"),
            until.format("%Y-%m-%d %H:%M")
        ),
        (Some(since), None) => println!("Filtering commits since {}", since.format("%Y-%m-%d %H:%M")),
        (None, Some(until)) => println!("Filtering commits until {}", until.format("%Y-%m-%d %H:%M")),
        (None, None) => {}
    }
    println!("{}", "─".repeat(RULE_WIDTH));
}

pub(crate) fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
