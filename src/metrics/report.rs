use super::{
    analyze_contributors, analyze_file_changes, calculate_date_filtered_metrics,
    calculate_summary, create_timeline, ContributorReport, FileChangeReport, FilteredMetrics,
    MetricsSummary, Timeline,
};
use crate::format::{format_for_display, FormattedCommit};
use crate::model::{CommitRecord, DateRange, RepositoryMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything derived from one commit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub repository: RepositoryMeta,
    pub summary: MetricsSummary,
    pub timeline: Timeline,
    pub contributors: ContributorReport,
    pub file_analysis: FileChangeReport,
    pub commits: Vec<FormattedCommit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered: Option<FilteredMetrics>,
}

/// Run every aggregation over `commits`.
///
/// The all-time sections always cover the whole input; `range` only feeds
/// the `filtered` section, which is omitted when the range is unbounded.
pub fn analyze(
    commits: &[CommitRecord],
    repository: RepositoryMeta,
    range: &DateRange,
    now: DateTime<Utc>,
) -> RepositoryReport {
    tracing::debug!(commits = commits.len(), "aggregating commit metrics");

    RepositoryReport {
        repository,
        summary: calculate_summary(commits),
        timeline: create_timeline(commits),
        contributors: analyze_contributors(commits),
        file_analysis: analyze_file_changes(commits),
        commits: format_for_display(commits, now),
        filtered: range
            .is_bounded()
            .then(|| calculate_date_filtered_metrics(commits, range)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{at, commit};

    #[test]
    fn unbounded_range_skips_filtered_section() {
        let commits = vec![commit("1", "a@e.com", "2025-01-01T00:00:00Z", 1, 0, &["a"])];
        let report = analyze(&commits, RepositoryMeta::default(), &DateRange::default(), at("2025-01-02T00:00:00Z"));
        assert!(report.filtered.is_none());
        assert_eq!(report.commits.len(), 1);
    }

    #[test]
    fn filter_leaves_all_time_summary_alone() {
        let commits = vec![
            commit("1", "a@e.com", "2025-01-01T00:00:00Z", 1, 0, &[]),
            commit("2", "a@e.com", "2025-02-01T00:00:00Z", 1, 0, &[]),
        ];
        let range = DateRange::new().with_since(at("2025-01-15T00:00:00Z"));
        let report = analyze(&commits, RepositoryMeta::default(), &range, at("2025-03-01T00:00:00Z"));
        assert_eq!(report.summary.total_commits, 2);
        assert_eq!(report.filtered.unwrap().filtered_commits, 1);
    }
}
