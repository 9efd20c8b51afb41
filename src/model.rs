use crate::util::{day_key, parse_absolute};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

/// One change-set as delivered by a commit source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(alias = "sha", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: Author,
    #[serde(alias = "date", default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stats: Option<CommitStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub additions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deletions: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<FileEntry>,
}

/// A touched file, either a bare path or a path with line counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Path(String),
    Detailed(FileStat),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FileEntry {
    pub fn filename(&self) -> &str {
        match self {
            FileEntry::Path(path) => path,
            FileEntry::Detailed(stat) => &stat.filename,
        }
    }

    /// Line counts carried by the entry. Bare paths carry none.
    pub fn line_counts(&self) -> (u64, u64) {
        match self {
            FileEntry::Path(_) => (0, 0),
            FileEntry::Detailed(stat) => {
                (stat.additions.unwrap_or(0), stat.deletions.unwrap_or(0))
            }
        }
    }
}

impl CommitRecord {
    pub fn additions(&self) -> u64 {
        self.stats.as_ref().map_or(0, |s| s.additions)
    }

    pub fn deletions(&self) -> u64 {
        self.stats.as_ref().map_or(0, |s| s.deletions)
    }

    /// Files touched by the commit, skipping entries without a name.
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> + '_ {
        self.stats
            .iter()
            .flat_map(|s| s.files.iter())
            .filter(|f| !f.filename().is_empty())
    }

    pub fn day(&self) -> Option<String> {
        self.timestamp.as_ref().map(day_key)
    }

    pub fn export_row(&self) -> ExportRow {
        ExportRow {
            id: self.id.clone(),
            message: self.message.clone(),
            author_name: self.author.name.clone(),
            author_email: self.author.email.clone(),
            timestamp: self.timestamp,
            additions: self.additions(),
            deletions: self.deletions(),
        }
    }
}

/// Flattened per-commit row used by CSV and NDJSON exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub id: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
}

/// Display metadata about the analyzed repository. Never read by the metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Versioned envelope around every JSON document the CLI prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output<T> {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryMeta>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Output<T> {
    pub fn new(repository: RepositoryMeta, range: &DateRange, body: T) -> Self {
        Self {
            repository: Some(repository),
            ..Self::bare(range, body)
        }
    }

    /// Envelope for bodies that already carry their own `repository` section.
    pub fn bare(range: &DateRange, body: T) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository: None,
            since: range.since,
            until: range.until,
            body,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    FractionalMillis(f64),
    Other(serde::de::IgnoredAny),
}

// Numeric timestamps are epoch milliseconds. Anything unreadable becomes `None`
// so a single bad record cannot sink a load.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Text(text)) => {
            let parsed = parse_absolute(&text, false);
            if parsed.is_none() {
                tracing::warn!("ignoring unparseable commit timestamp {text:?}");
            }
            parsed
        }
        Some(RawTimestamp::Millis(ms)) => DateTime::<Utc>::from_timestamp_millis(ms),
        Some(RawTimestamp::FractionalMillis(ms)) if ms.is_finite() => {
            DateTime::<Utc>::from_timestamp_millis(ms.floor() as i64)
        }
        Some(RawTimestamp::FractionalMillis(_)) | Some(RawTimestamp::Other(_)) => {
            tracing::warn!("ignoring commit timestamp that is neither a string nor a number");
            None
        }
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hosting_api_shape() {
        let json = r#"{
            "sha": "abc1234def",
            "message": "Fix bug",
            "author": {"name": "Jane", "email": "jane@example.com", "avatar": "x"},
            "date": "2025-01-02T15:30:00Z",
            "url": "https://example.com/c/abc1234def",
            "stats": {
                "additions": 5, "deletions": 1, "total": 6,
                "files": [{"filename": "a.rs", "status": "modified", "additions": 5, "deletions": 1, "changes": 6}]
            }
        }"#;
        let commit: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(commit.id, "abc1234def");
        assert_eq!(commit.day().as_deref(), Some("2025-01-02"));
        assert_eq!(commit.additions(), 5);
        let file = commit.files().next().unwrap();
        assert_eq!(file.filename(), "a.rs");
        assert_eq!(file.line_counts(), (5, 1));
    }

    #[test]
    fn tolerates_missing_and_null_fields() {
        let json = r#"{"id": "x", "author": null, "stats": null, "timestamp": "garbage"}"#;
        let commit: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(commit.author, Author::default());
        assert!(commit.timestamp.is_none());
        assert!(commit.stats.is_none());
        assert_eq!(commit.files().count(), 0);
    }

    #[test]
    fn null_stat_fields_degrade_to_zero() {
        let json = r#"{"id": "n", "stats": {"additions": null, "deletions": 2, "files": null}}"#;
        let commit: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(commit.additions(), 0);
        assert_eq!(commit.deletions(), 2);
        assert_eq!(commit.files().count(), 0);

        let stats: CommitStats =
            serde_json::from_str(r#"{"files": [{"filename": null, "additions": 1}, "b.rs"]}"#).unwrap();
        assert_eq!(stats.files[0].filename(), "");
        assert_eq!(stats.files.len(), 2);
    }

    #[test]
    fn numeric_timestamps_are_epoch_millis() {
        let commit: CommitRecord =
            serde_json::from_str(r#"{"id": "m", "timestamp": 1735689600000}"#).unwrap();
        assert_eq!(commit.day().as_deref(), Some("2025-01-01"));

        let commit: CommitRecord =
            serde_json::from_str(r#"{"id": "f", "timestamp": 1735689600000.5}"#).unwrap();
        assert_eq!(commit.day().as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn odd_timestamp_types_become_none() {
        for raw in [r#"true"#, r#"{"seconds": 1}"#, r#"[1, 2]"#] {
            let json = format!(r#"{{"id": "o", "timestamp": {raw}, "message": "kept"}}"#);
            let commit: CommitRecord = serde_json::from_str(&json).unwrap();
            assert!(commit.timestamp.is_none(), "{raw}");
            assert_eq!(commit.message, "kept");
        }
    }

    #[test]
    fn mixed_file_entries_deserialize() {
        let json = r#"{"additions": 3, "files": ["README.md", {"filename": "lib.rs", "additions": 3}, {"filename": ""}]}"#;
        let stats: CommitStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.deletions, 0);
        assert!(matches!(stats.files[0], FileEntry::Path(_)));
        assert_eq!(stats.files[1].line_counts(), (3, 0));

        let commit = CommitRecord {
            id: "1".into(),
            message: String::new(),
            author: Author::default(),
            timestamp: None,
            stats: Some(stats),
            url: None,
        };
        assert_eq!(commit.files().count(), 2);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let t = DateTime::parse_from_rfc3339("2025-01-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let range = DateRange::new().with_since(t).with_until(t);
        assert!(range.contains(&t));
        assert!(!range.contains(&(t + chrono::Duration::seconds(1))));
        assert!(range.is_bounded());
        assert!(!DateRange::default().is_bounded());
    }
}
