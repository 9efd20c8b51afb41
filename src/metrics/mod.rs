pub mod contributors;
pub mod files;
pub mod filtered;
pub mod report;
pub mod score;
pub mod summary;
pub mod timeline;

pub use contributors::{analyze_contributors, Contributor, ContributorReport, ContributorSummary};
pub use files::{analyze_file_changes, FileChange, FileChangeReport, FileTypeStats};
pub use filtered::{calculate_date_filtered_metrics, filter_commits, FilterWindow, FilteredMetrics};
pub use report::{analyze, RepositoryReport};
pub use score::{estimate_repository_size, productivity_score, SizeEstimate, SizeUnit};
pub use summary::{calculate_summary, CommitFrequency, DateSpan, MetricsSummary};
pub use timeline::{create_timeline, DayBucket, Timeline, TimelineSummary};
