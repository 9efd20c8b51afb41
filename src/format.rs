//! Display projection of commit records.

use crate::model::{Author, CommitRecord, FileEntry};
use crate::util::{truncate_chars, MS_PER_DAY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SHORT_ID_LEN: usize = 7;
const PREVIEW_MAX: usize = 80;
const PREVIEW_KEEP: usize = 77;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedCommit {
    pub id: String,
    pub short_id: String,
    pub author: Author,
    pub timestamp: Option<DateTime<Utc>>,
    pub absolute_date: Option<String>,
    pub relative_date: Option<String>,
    /// Full, unabridged message.
    pub message: String,
    pub message_preview: String,
    pub stats: Option<FormattedStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedStats {
    pub additions: u64,
    pub deletions: u64,
    pub files: Vec<FileEntry>,
    pub total_changes: u64,
}

pub fn format_for_display(commits: &[CommitRecord], now: DateTime<Utc>) -> Vec<FormattedCommit> {
    commits.iter().map(|c| format_commit(c, now)).collect()
}

pub fn format_commit(commit: &CommitRecord, now: DateTime<Utc>) -> FormattedCommit {
    FormattedCommit {
        id: commit.id.clone(),
        short_id: truncate_chars(&commit.id, SHORT_ID_LEN),
        author: commit.author.clone(),
        timestamp: commit.timestamp,
        absolute_date: commit
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        relative_date: commit.timestamp.map(|ts| relative_date(&ts, &now)),
        message: commit.message.clone(),
        message_preview: message_preview(&commit.message),
        stats: commit.stats.as_ref().map(|s| FormattedStats {
            additions: s.additions,
            deletions: s.deletions,
            files: s.files.clone(),
            total_changes: s.additions.saturating_add(s.deletions),
        }),
        url: commit.url.clone(),
    }
}

/// First line of the message, cut to 77 characters plus `...` when it runs past 80.
pub fn message_preview(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    if first_line.chars().count() > PREVIEW_MAX {
        format!("{}...", truncate_chars(first_line, PREVIEW_KEEP))
    } else {
        first_line.to_string()
    }
}

pub fn relative_date(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let ms = (*now - *timestamp).num_milliseconds().max(0);
    let days = (ms as f64 / MS_PER_DAY).floor() as u64;

    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d if d < 365 => format!("{} months ago", d / 30),
        d => format!("{} years ago", d / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{at, commit, commit_without_stats};
    use chrono::Duration;

    #[test]
    fn relative_buckets() {
        let now = at("2025-06-30T12:00:00Z");
        let ago = |d: i64| relative_date(&(now - Duration::days(d)), &now);
        assert_eq!(ago(0), "Today");
        assert_eq!(relative_date(&(now - Duration::hours(23)), &now), "Today");
        assert_eq!(ago(1), "Yesterday");
        assert_eq!(ago(6), "6 days ago");
        assert_eq!(ago(7), "1 weeks ago");
        assert_eq!(ago(29), "4 weeks ago");
        assert_eq!(ago(30), "1 months ago");
        assert_eq!(ago(364), "12 months ago");
        assert_eq!(ago(365), "1 years ago");
        assert_eq!(ago(800), "2 years ago");
        assert_eq!(relative_date(&(now + Duration::days(3)), &now), "Today");
    }

    #[test]
    fn preview_keeps_77_when_over_80() {
        let exactly_80 = "x".repeat(80);
        assert_eq!(message_preview(&exactly_80), exactly_80);

        let long = "y".repeat(81);
        let preview = message_preview(&long);
        assert_eq!(preview.chars().count(), 80);
        assert!(preview.ends_with("..."));
        assert_eq!(&preview[..77], &long[..77]);
    }

    #[test]
    fn preview_uses_first_line_and_keeps_full_message() {
        let mut c = commit("0123456789abcdef", "a@e.com", "2025-06-29T08:00:00Z", 3, 2, &["a.rs"]);
        c.message = "feat: add thing\n\nlong body".into();
        let f = format_commit(&c, at("2025-06-30T09:00:00Z"));
        assert_eq!(f.short_id, "0123456");
        assert_eq!(f.message_preview, "feat: add thing");
        assert_eq!(f.message, "feat: add thing\n\nlong body");
        assert_eq!(f.relative_date.as_deref(), Some("Yesterday"));
        assert_eq!(f.absolute_date.as_deref(), Some("2025-06-29 08:00:00 UTC"));
        assert_eq!(f.stats.unwrap().total_changes, 5);
    }

    #[test]
    fn total_changes_saturate() {
        let c = commit("big", "a@e.com", "2025-06-29T08:00:00Z", u64::MAX, 7, &[]);
        let f = format_commit(&c, at("2025-06-30T09:00:00Z"));
        assert_eq!(f.stats.unwrap().total_changes, u64::MAX);
    }

    #[test]
    fn preview_drops_trailing_carriage_return() {
        assert_eq!(message_preview("fix: crlf\r\nbody"), "fix: crlf");
    }

    #[test]
    fn missing_stats_stay_missing() {
        let c = commit_without_stats("abc", "a@e.com", "2025-06-29T08:00:00Z");
        let f = format_commit(&c, at("2025-06-30T09:00:00Z"));
        assert_eq!(f.short_id, "abc");
        assert!(f.stats.is_none());
    }

    #[test]
    fn formatting_does_not_touch_input() {
        let commits = vec![commit("abc", "a@e.com", "2025-06-29T08:00:00Z", 1, 1, &[])];
        let before = commits.clone();
        let out = format_for_display(&commits, at("2025-06-30T09:00:00Z"));
        assert_eq!(out.len(), 1);
        assert_eq!(commits, before);
    }
}
