use super::score::productivity_score;
use crate::model::{CommitRecord, DateRange};
use crate::util::ceil_days;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recomputed totals for a date-bounded subset of commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredMetrics {
    pub filtered_commits: u64,
    pub filtered_additions: u64,
    pub filtered_deletions: u64,
    pub filtered_productivity: f64,
    /// Present only when both bounds were given.
    pub date_range: Option<FilterWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: u64,
}

/// Commits inside the inclusive window. Without bounds every commit is kept,
/// with any bound undated commits are dropped.
pub fn filter_commits<'a>(
    commits: &'a [CommitRecord],
    range: &'a DateRange,
) -> impl Iterator<Item = &'a CommitRecord> + 'a {
    commits.iter().filter(move |commit| {
        if !range.is_bounded() {
            return true;
        }
        commit.timestamp.as_ref().is_some_and(|ts| range.contains(ts))
    })
}

pub fn calculate_date_filtered_metrics(commits: &[CommitRecord], range: &DateRange) -> FilteredMetrics {
    let mut filtered_commits = 0u64;
    let mut filtered_additions = 0u64;
    let mut filtered_deletions = 0u64;

    for commit in filter_commits(commits, range) {
        filtered_commits += 1;
        filtered_additions = filtered_additions.saturating_add(commit.additions());
        filtered_deletions = filtered_deletions.saturating_add(commit.deletions());
    }

    // the span comes from the window itself, not from the commits inside it
    let date_range = match (range.since, range.until) {
        (Some(start), Some(end)) => Some(FilterWindow {
            start,
            end,
            days: ceil_days(&start, &end),
        }),
        _ => None,
    };
    let days = date_range.as_ref().map_or(1, |w| w.days);

    FilteredMetrics {
        filtered_commits,
        filtered_additions,
        filtered_deletions,
        filtered_productivity: productivity_score(
            filtered_commits,
            filtered_additions,
            filtered_deletions,
            days,
        ),
        date_range,
    }
}
