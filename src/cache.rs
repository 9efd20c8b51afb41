use crate::error::{Result, ScopeError};
use crate::model::{Author, CommitRecord, CommitStats, FileEntry, FileStat, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::{HashMap, HashSet};
use std::path::Path;

// SQLite caps bound parameters per statement
const ID_CHUNK: usize = 500;

pub struct Cache {
    conn: Connection,
}

impl Cache {
    /// Open (or create) `cache.db` inside `cache_dir`.
    pub fn open<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        std::fs::create_dir_all(cache_dir)?;
        let db_path = cache_dir.join("cache.db");
        tracing::debug!(path = %db_path.display(), "opening commit cache");
        let conn = Connection::open(&db_path)?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let mut cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS commits (
                id TEXT PRIMARY KEY,
                author_name TEXT NOT NULL,
                author_email TEXT NOT NULL,
                message TEXT NOT NULL,
                timestamp INTEGER,
                has_stats INTEGER NOT NULL,
                additions INTEGER NOT NULL,
                deletions INTEGER NOT NULL,
                url TEXT
            );
            CREATE TABLE IF NOT EXISTS files (
                commit_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                filename TEXT NOT NULL,
                detailed INTEGER NOT NULL,
                additions INTEGER,
                deletions INTEGER,
                status TEXT,
                PRIMARY KEY (commit_id, position),
                FOREIGN KEY (commit_id) REFERENCES commits(id)
            );
            CREATE INDEX IF NOT EXISTS idx_commits_timestamp ON commits(timestamp);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(ScopeError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    pub fn store_commits(&mut self, commits: &[CommitRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;

        {
            let mut insert_commit_stmt = tx.prepare(
                "INSERT OR REPLACE INTO commits
                 (id, author_name, author_email, message, timestamp, has_stats, additions, deletions, url)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            let mut delete_files_stmt = tx.prepare("DELETE FROM files WHERE commit_id = ?")?;
            let mut insert_file_stmt = tx.prepare(
                "INSERT INTO files (commit_id, position, filename, detailed, additions, deletions, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;

            for commit in commits {
                insert_commit_stmt.execute(params![
                    commit.id,
                    commit.author.name,
                    commit.author.email,
                    commit.message,
                    commit.timestamp.map(|ts| ts.timestamp()),
                    commit.stats.is_some(),
                    commit.additions() as i64,
                    commit.deletions() as i64,
                    commit.url,
                ])?;

                delete_files_stmt.execute(params![commit.id])?;

                let files = commit.stats.iter().flat_map(|s| s.files.iter());
                for (position, file) in files.enumerate() {
                    match file {
                        FileEntry::Path(path) => insert_file_stmt.execute(params![
                            commit.id,
                            position as i64,
                            path,
                            false,
                            None::<i64>,
                            None::<i64>,
                            None::<String>,
                        ])?,
                        FileEntry::Detailed(stat) => insert_file_stmt.execute(params![
                            commit.id,
                            position as i64,
                            stat.filename,
                            true,
                            stat.additions.map(|a| a as i64),
                            stat.deletions.map(|d| d as i64),
                            stat.status,
                        ])?,
                    };
                }
            }
        }

        tx.commit()?;
        tracing::debug!(commits = commits.len(), "stored commits in cache");
        Ok(())
    }

    /// Cached records for `ids`, in the order given. Unknown ids are skipped.
    pub fn get_commits(&self, ids: &[String]) -> Result<Vec<CommitRecord>> {
        let mut found: HashMap<String, CommitRecord> = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(ID_CHUNK) {
            let placeholders = placeholders(chunk.len());

            let query = format!(
                "SELECT id, author_name, author_email, message, timestamp, has_stats, additions, deletions, url
                 FROM commits WHERE id IN ({placeholders})"
            );
            let mut stmt = self.conn.prepare(&query)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(chunk.iter()), |row| {
                let ts: Option<i64> = row.get(4)?;
                let has_stats: bool = row.get(5)?;
                let additions: i64 = row.get(6)?;
                let deletions: i64 = row.get(7)?;
                Ok(CommitRecord {
                    id: row.get(0)?,
                    author: Author {
                        name: row.get(1)?,
                        email: row.get(2)?,
                    },
                    message: row.get(3)?,
                    timestamp: ts.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
                    stats: has_stats.then(|| CommitStats {
                        additions: additions.max(0) as u64,
                        deletions: deletions.max(0) as u64,
                        files: Vec::new(),
                    }),
                    url: row.get(8)?,
                })
            })?;
            for row in rows {
                let record = row?;
                found.insert(record.id.clone(), record);
            }

            let query = format!(
                "SELECT commit_id, filename, detailed, additions, deletions, status
                 FROM files WHERE commit_id IN ({placeholders})
                 ORDER BY commit_id, position"
            );
            let mut stmt = self.conn.prepare(&query)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(chunk.iter()), |row| {
                let commit_id: String = row.get(0)?;
                let filename: String = row.get(1)?;
                let detailed: bool = row.get(2)?;
                let entry = if detailed {
                    let additions: Option<i64> = row.get(3)?;
                    let deletions: Option<i64> = row.get(4)?;
                    FileEntry::Detailed(FileStat {
                        filename,
                        additions: additions.map(|a| a.max(0) as u64),
                        deletions: deletions.map(|d| d.max(0) as u64),
                        status: row.get(5)?,
                    })
                } else {
                    FileEntry::Path(filename)
                };
                Ok((commit_id, entry))
            })?;
            for row in rows {
                let (commit_id, entry) = row?;
                if let Some(stats) = found.get_mut(&commit_id).and_then(|c| c.stats.as_mut()) {
                    stats.files.push(entry);
                }
            }
        }

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    pub fn get_missing_commits(&self, all_commit_ids: &[String]) -> Result<Vec<String>> {
        if all_commit_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut existing: HashSet<String> = HashSet::new();
        for chunk in all_commit_ids.chunks(ID_CHUNK) {
            let query = format!(
                "SELECT id FROM commits WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&query)?;
            let ids = stmt
                .query_map(rusqlite::params_from_iter(chunk.iter()), |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            existing.extend(ids);
        }
        Ok(all_commit_ids
            .iter()
            .filter(|id| !existing.contains(*id))
            .cloned()
            .collect())
    }
}

fn placeholders(n: usize) -> String {
    std::iter::repeat_n("?", n).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{commit, commit_with_file_stats, commit_without_stats};
    use tempfile::TempDir;

    #[test]
    fn stored_commits_read_back_in_requested_order() {
        let mut cache = Cache::in_memory().unwrap();
        let mut with_paths = commit("a1", "a@e.com", "2025-01-01T10:00:00Z", 3, 1, &["x.rs", "y.md"]);
        with_paths.url = Some("https://example.com/a1".into());
        let detailed = commit_with_file_stats("b2", "b@e.com", "2025-01-02T10:00:00Z", &[("z.rs", 4, 2)]);
        let bare = commit_without_stats("c3", "c@e.com", "2025-01-03T10:00:00Z");
        let mut undated = commit("d4", "d@e.com", "2025-01-04T10:00:00Z", 0, 0, &[]);
        undated.timestamp = None;

        let all = vec![with_paths, detailed, bare, undated];
        cache.store_commits(&all).unwrap();

        let ids: Vec<String> = ["d4", "c3", "b2", "a1"].iter().map(|s| s.to_string()).collect();
        let loaded = cache.get_commits(&ids).unwrap();
        let expected: Vec<CommitRecord> = all.into_iter().rev().collect();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn missing_commits_are_reported() {
        let mut cache = Cache::in_memory().unwrap();
        cache
            .store_commits(&[commit("a1", "a@e.com", "2025-01-01T10:00:00Z", 1, 0, &[])])
            .unwrap();
        let ids = vec!["a1".to_string(), "b2".to_string()];
        assert_eq!(cache.get_missing_commits(&ids).unwrap(), vec!["b2".to_string()]);
        assert!(cache.get_missing_commits(&[]).unwrap().is_empty());
        assert_eq!(cache.get_commits(&ids).unwrap().len(), 1);
    }

    #[test]
    fn restoring_replaces_file_rows() {
        let mut cache = Cache::in_memory().unwrap();
        cache
            .store_commits(&[commit("a1", "a@e.com", "2025-01-01T10:00:00Z", 1, 0, &["old.rs", "gone.rs"])])
            .unwrap();
        cache
            .store_commits(&[commit("a1", "a@e.com", "2025-01-01T10:00:00Z", 1, 0, &["new.rs"])])
            .unwrap();
        let loaded = cache.get_commits(&["a1".to_string()]).unwrap();
        assert_eq!(loaded[0].files().map(|f| f.filename()).collect::<Vec<_>>(), vec!["new.rs"]);
    }

    #[test]
    fn reopening_keeps_data_and_rejects_foreign_schema() {
        let dir = TempDir::new().unwrap();
        {
            let mut cache = Cache::open(dir.path()).unwrap();
            cache
                .store_commits(&[commit("a1", "a@e.com", "2025-01-01T10:00:00Z", 1, 0, &[])])
                .unwrap();
        }
        let cache = Cache::open(dir.path()).unwrap();
        assert!(cache.get_missing_commits(&["a1".to_string()]).unwrap().is_empty());
        drop(cache);

        let conn = Connection::open(dir.path().join("cache.db")).unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        drop(conn);
        assert!(matches!(Cache::open(dir.path()), Err(ScopeError::Cache(_))));
    }
}
