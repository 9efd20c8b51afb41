//! Commit history scraped from reflog files, for repositories the object
//! database cannot be walked in (shallow copies, bare `.git` snapshots).
//!
//! Reflog entries carry no diff information, so every record comes back
//! without `stats`.

use crate::error::Result;
use crate::model::{Author, CommitRecord};
use chrono::DateTime;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const NULL_ID: &str = "0000000000000000000000000000000000000000";

/// One parsed reflog line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old_id: String,
    pub new_id: String,
    pub author: Author,
    pub seconds: i64,
    pub message: String,
}

/// Parse `<old> <new> <name> <<email>> <seconds> <tz>\t<message>`.
pub fn parse_line(line: &str) -> Option<ReflogEntry> {
    let (header, message) = line.split_once('\t')?;

    let mut parts = header.splitn(3, ' ');
    let old_id = parts.next()?;
    let new_id = parts.next()?;
    let rest = parts.next()?;

    if !is_hex_id(old_id) || !is_hex_id(new_id) {
        return None;
    }

    let open = rest.find('<')?;
    let close = open + rest[open..].find('>')?;
    let name = rest[..open].trim();
    let email = &rest[open + 1..close];

    let mut when = rest[close + 1..].split_whitespace();
    let seconds: i64 = when.next()?.parse().ok()?;
    let tz = when.next()?;
    if !is_tz_offset(tz) || when.next().is_some() || name.is_empty() {
        return None;
    }

    Some(ReflogEntry {
        old_id: old_id.to_string(),
        new_id: new_id.to_string(),
        author: Author {
            name: name.to_string(),
            email: email.to_string(),
        },
        seconds,
        message: strip_action(message).to_string(),
    })
}

/// Drop the `commit: ` / `commit (amend): ` style prefix git writes.
fn strip_action(message: &str) -> &str {
    if let Some(rest) = message.strip_prefix("commit: ") {
        return rest;
    }
    if let Some(rest) = message.strip_prefix("commit (") {
        if let Some((_, msg)) = rest.split_once("): ") {
            return msg;
        }
    }
    message
}

fn is_hex_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_tz_offset(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 5
        && (bytes[0] == b'+' || bytes[0] == b'-')
        && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// Turn reflog text into records: one per distinct new id, newest first.
/// Entries with equal timestamps keep later lines first. Lines that do not
/// parse are skipped.
pub fn parse_reflog(content: &str) -> Vec<CommitRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(entry) = parse_line(line) else {
            tracing::warn!(line = lineno + 1, "skipping malformed reflog line");
            continue;
        };
        if entry.new_id == NULL_ID || !seen.insert(entry.new_id.clone()) {
            continue;
        }
        records.push(CommitRecord {
            id: entry.new_id,
            message: entry.message,
            author: entry.author,
            timestamp: DateTime::from_timestamp(entry.seconds, 0),
            stats: None,
            url: None,
        });
    }

    sort_newest_first(&mut records);
    records
}

fn sort_newest_first(records: &mut [CommitRecord]) {
    records.reverse();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Read `logs/HEAD` and every branch log under `logs/refs/heads` in `git_dir`.
pub fn read_reflogs(git_dir: &Path) -> Result<Vec<CommitRecord>> {
    let logs = git_dir.join("logs");
    let mut files = Vec::new();

    let head = logs.join("HEAD");
    if head.is_file() {
        files.push(head);
    }
    collect_files(&logs.join("refs").join("heads"), &mut files)?;

    let mut content = String::new();
    for file in &files {
        tracing::debug!(path = %file.display(), "reading reflog");
        content.push_str(&std::fs::read_to_string(file)?);
        content.push('\n');
    }

    let records = parse_reflog(&content);
    tracing::info!(
        files = files.len(),
        commits = records.len(),
        "scraped reflog history"
    );
    Ok(records)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const A: &str = "1111111111111111111111111111111111111111";
    const B: &str = "2222222222222222222222222222222222222222";
    const C: &str = "3333333333333333333333333333333333333333";

    fn line(old: &str, new: &str, secs: i64, msg: &str) -> String {
        format!("{old} {new} Jane Doe <jane@example.com> {secs} +0200\t{msg}")
    }

    #[test]
    fn parses_commit_line() {
        let entry = parse_line(&line(A, B, 1_700_000_000, "commit: Add parser")).unwrap();
        assert_eq!(entry.old_id, A);
        assert_eq!(entry.new_id, B);
        assert_eq!(entry.author.name, "Jane Doe");
        assert_eq!(entry.author.email, "jane@example.com");
        assert_eq!(entry.seconds, 1_700_000_000);
        assert_eq!(entry.message, "Add parser");
    }

    #[test]
    fn strips_parenthesized_actions() {
        let entry = parse_line(&line(NULL_ID, A, 1, "commit (initial): First")).unwrap();
        assert_eq!(entry.message, "First");
        let entry = parse_line(&line(A, B, 1, "checkout: moving from main to dev")).unwrap();
        assert_eq!(entry.message, "checkout: moving from main to dev");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("not a reflog line").is_none());
        assert!(parse_line(&format!("{A} {B} Jane <j@e.com> nope +0000\tmsg")).is_none());
        assert!(parse_line(&format!("{A} {B} Jane j@e.com 12 +0000\tmsg")).is_none());
        assert!(parse_line(&format!("{A} {B} Jane <j@e.com> 12 +0000 msg")).is_none());
    }

    #[test]
    fn dedups_and_sorts_newest_first() {
        let content = [
            line(NULL_ID, A, 100, "commit (initial): one"),
            line(A, B, 300, "commit: two"),
            "garbage".to_string(),
            line(B, A, 400, "reset: moving to HEAD~1"),
            line(A, C, 200, "commit: three"),
        ]
        .join("\n");

        let records = parse_reflog(&content);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![B, C, A]);
        assert!(records.iter().all(|r| r.stats.is_none()));
        assert_eq!(records[2].message, "one");
    }

    #[test]
    fn same_second_entries_keep_later_lines_first() {
        let content = [line(NULL_ID, A, 100, "commit (initial): one"), line(A, B, 100, "commit: two")].join("\n");
        let records = parse_reflog(&content);
        assert_eq!(records[0].message, "two");
        assert_eq!(records[1].message, "one");
    }

    #[test]
    fn reads_head_and_branch_logs() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        std::fs::create_dir_all(logs.join("refs/heads/feature")).unwrap();
        std::fs::write(logs.join("HEAD"), line(NULL_ID, A, 100, "commit (initial): one")).unwrap();
        std::fs::write(logs.join("refs/heads/main"), line(NULL_ID, A, 100, "commit (initial): one")).unwrap();
        std::fs::write(logs.join("refs/heads/feature/x"), line(A, B, 200, "commit: two")).unwrap();

        let records = read_reflogs(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, B);
    }

    #[test]
    fn missing_logs_yield_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(read_reflogs(dir.path()).unwrap().is_empty());
    }
}
