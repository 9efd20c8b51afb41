use super::score::{estimate_repository_size, productivity_score, SizeEstimate};
use crate::model::CommitRecord;
use crate::util::{day_key, inclusive_days, round_to};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_commits: u64,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub net_changes: i64,
    pub total_files: u64,
    pub contributor_count: u64,
    pub date_range: DateSpan,
    pub commit_frequency: CommitFrequency,
    pub average_commit_size: u64,
    pub productivity_score: f64,
    pub repository_size_estimate: SizeEstimate,
    pub total_lines_of_code: u64,
}

/// Calendar span covered by the commits. `days` counts both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitFrequency {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl DateSpan {
    pub fn from_timestamps<'a>(timestamps: impl IntoIterator<Item = &'a DateTime<Utc>>) -> Self {
        let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for ts in timestamps {
            bounds = Some(match bounds {
                None => (*ts, *ts),
                Some((lo, hi)) => (lo.min(*ts), hi.max(*ts)),
            });
        }

        match bounds {
            None => DateSpan::default(),
            Some((start, end)) => DateSpan {
                start: Some(day_key(&start)),
                end: Some(day_key(&end)),
                days: inclusive_days(&start, &end),
            },
        }
    }
}

impl CommitFrequency {
    pub fn new(commits: u64, days: u64) -> Self {
        if days == 0 {
            return Self::default();
        }
        let commits = commits as f64;
        let days = days as f64;
        Self {
            daily: round_to(commits / days, 2),
            weekly: round_to(commits / (days / 7.0), 2),
            monthly: round_to(commits / (days / 30.0), 2),
        }
    }
}

pub fn calculate_summary(commits: &[CommitRecord]) -> MetricsSummary {
    let total_commits = commits.len() as u64;

    let mut total_additions = 0u64;
    let mut total_deletions = 0u64;
    let mut files: HashSet<&str> = HashSet::new();
    let mut emails: HashSet<&str> = HashSet::new();

    for commit in commits {
        total_additions = total_additions.saturating_add(commit.additions());
        total_deletions = total_deletions.saturating_add(commit.deletions());
        files.extend(commit.files().map(|f| f.filename()));
        emails.insert(commit.author.email.as_str());
    }

    let dated: Vec<&DateTime<Utc>> = commits.iter().filter_map(|c| c.timestamp.as_ref()).collect();
    let date_range = DateSpan::from_timestamps(dated.iter().copied());
    let net_changes = net_change(total_additions, total_deletions);

    let average_commit_size = if total_commits > 0 {
        (total_additions.saturating_add(total_deletions) as f64 / total_commits as f64).round() as u64
    } else {
        0
    };

    MetricsSummary {
        total_commits,
        total_additions,
        total_deletions,
        net_changes,
        total_files: files.len() as u64,
        contributor_count: emails.len() as u64,
        // frequency counts dated commits only; the productivity score counts all
        commit_frequency: CommitFrequency::new(dated.len() as u64, date_range.days),
        average_commit_size,
        productivity_score: productivity_score(
            total_commits,
            total_additions,
            total_deletions,
            date_range.days,
        ),
        repository_size_estimate: estimate_repository_size(total_additions, files.len()),
        total_lines_of_code: net_changes.max(0) as u64,
        date_range,
    }
}

/// `additions - deletions`, clamped to the `i64` range.
pub(crate) fn net_change(additions: u64, deletions: u64) -> i64 {
    let net = i128::from(additions) - i128::from(deletions);
    net.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
