use crate::error::{Result, ScopeError};
use crate::model::{Author, CommitRecord, CommitStats, DateRange, FileEntry, FileStat};
use crate::util::parse_instant;
use chrono::{DateTime, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    pub fn name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
    }

    pub fn remote_url(&self) -> Option<String> {
        self.repo
            .config_snapshot()
            .string("remote.origin.url")
            .map(|url| url.to_string())
    }

    pub fn current_branch(&self) -> Option<String> {
        self.repo
            .head_name()
            .ok()
            .flatten()
            .map(|name| name.shorten().to_string())
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let mut range = DateRange::new();

        let since_dt = since.map(|s| self.parse_commit_or_date(s, false)).transpose()?;
        let until_dt = until.map(|u| self.parse_commit_or_date(u, true)).transpose()?;

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(ScopeError::InvalidDate(format!(
                    "Invalid range: since ({s}) is after until ({u})"
                )));
            }
        }

        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }

        Ok(range)
    }

    fn parse_commit_or_date(&self, input: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
        if let Some(dt) = parse_instant(input, end_of_day) {
            return Ok(dt);
        }

        // Fallback to Git ref
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| ScopeError::Parse(format!("Invalid commit or date '{input}': {e}")))?;

        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| ScopeError::Parse(format!("Not a commit: {input}")))?;

        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| ScopeError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }

    /// Ids of every commit reachable from HEAD, newest first along each parent chain.
    pub fn commit_ids(&self, include_merges: bool) -> Result<Vec<String>> {
        let mut head = self.repo.head()?;
        if head.is_unborn() {
            return Ok(Vec::new());
        }
        let head_commit = head.peel_to_commit_in_place()?;

        let mut ids = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();

            if include_merges || parents.len() <= 1 {
                ids.push(commit_id.to_string());
            }

            stack.extend(parents);
        }

        Ok(ids)
    }

    /// Build records with per-file line statistics for the given commit ids.
    pub fn collect_commits(&self, ids: &[String], binary: bool) -> Result<Vec<CommitRecord>> {
        let pb = ProgressBar::new(ids.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:30}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Diffing commits");

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.commit_record(id, binary) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(commit = %id, error = %e, "skipping undecodable commit"),
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(records)
    }

    pub fn commit_record(&self, commit_id: &str, binary: bool) -> Result<CommitRecord> {
        let oid = ObjectId::from_hex(commit_id.as_bytes())
            .map_err(|e| ScopeError::Parse(format!("Invalid commit ID: {e}")))?;
        let commit = self.repo.find_commit(oid)?;

        let secs = commit.time()?.seconds;
        let timestamp = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ScopeError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

        let author = commit.author()?;
        let author = Author {
            name: author.name.to_string(),
            email: author.email.to_string(),
        };

        let message = commit.message()?;
        let mut full_message = message.title.to_string();
        if let Some(body) = message.body {
            full_message.push_str("\n\n");
            full_message.push_str(&body.to_string());
        }

        let commit_tree = commit.tree()?;
        let parent_tree = match commit.parent_ids().next() {
            Some(parent_id) => Some(self.repo.find_commit(parent_id)?.tree()?),
            None => None,
        };

        let changes: Vec<ChangeDetached> =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)?;

        let mut files = Vec::new();
        for change in changes {
            self.handle_change(change, binary, &mut files);
        }

        let (additions, deletions) = files.iter().fold((0, 0), |(a, d), f: &FileEntry| {
            let (fa, fd) = f.line_counts();
            (a + fa, d + fd)
        });

        Ok(CommitRecord {
            id: commit_id.to_string(),
            message: full_message,
            author,
            timestamp: Some(timestamp),
            stats: Some(CommitStats {
                additions,
                deletions,
                files,
            }),
            url: None,
        })
    }

    fn handle_change(&self, change: ChangeDetached, binary: bool, files: &mut Vec<FileEntry>) {
        match change {
            ChangeDetached::Addition { id, location, .. } => {
                if let Some((added, _)) = self.line_counts(None, Some(id), binary) {
                    files.push(file_entry(location.to_string(), added, 0, "added"));
                }
            }
            ChangeDetached::Deletion { id, location, .. } => {
                if let Some((_, deleted)) = self.line_counts(Some(id), None, binary) {
                    files.push(file_entry(location.to_string(), 0, deleted, "removed"));
                }
            }
            ChangeDetached::Modification {
                previous_id,
                id,
                location,
                ..
            } => {
                if let Some((added, deleted)) = self.line_counts(Some(previous_id), Some(id), binary) {
                    files.push(file_entry(location.to_string(), added, deleted, "modified"));
                }
            }
            // no rename detection: source and destination are two independent paths
            ChangeDetached::Rewrite {
                source_id,
                id,
                source_location,
                location,
                copy,
                ..
            } => {
                if let Some((added, deleted)) = self.line_counts(Some(source_id), Some(id), binary) {
                    let (status, source_deleted) = if copy { ("copied", 0) } else { ("renamed", deleted) };
                    files.push(file_entry(source_location.to_string(), 0, source_deleted, status));
                    files.push(file_entry(location.to_string(), added, 0, status));
                }
            }
        }
    }

    /// Inserted and deleted lines between two blobs, either of which may be absent.
    /// `None` when a blob cannot be read, or when it is binary and `binary` is off.
    fn line_counts(&self, old: Option<ObjectId>, new: Option<ObjectId>, binary: bool) -> Option<(u64, u64)> {
        let old = match old {
            Some(id) => Some(self.repo.find_object(id).ok()?),
            None => None,
        };
        let new = match new {
            Some(id) => Some(self.repo.find_object(id).ok()?),
            None => None,
        };

        let is_binary = old.iter().chain(new.iter()).any(is_binary_object);
        if is_binary {
            return binary.then_some((0, 0));
        }

        Some(count_line_changes(blob_text(old.as_ref()), blob_text(new.as_ref())))
    }
}

fn file_entry(filename: String, additions: u64, deletions: u64, status: &str) -> FileEntry {
    FileEntry::Detailed(FileStat {
        filename,
        additions: Some(additions),
        deletions: Some(deletions),
        status: Some(status.to_string()),
    })
}

fn is_binary_object(object: &gix::Object) -> bool {
    object.data.as_slice().iter().take(8192).any(|&b| b == 0)
}

fn blob_text<'a>(object: Option<&'a gix::Object<'_>>) -> &'a str {
    object
        .and_then(|o| std::str::from_utf8(o.data.as_slice()).ok())
        .unwrap_or("")
}

pub(crate) fn count_line_changes(old_text: &str, new_text: &str) -> (u64, u64) {
    let diff = TextDiff::from_lines(old_text, new_text);
    let mut added = 0u64;
    let mut deleted = 0u64;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}
