use crate::model::CommitRecord;
use crate::util::file_extension;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const MOST_MODIFIED_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub modifications: u64,
    pub additions: u64,
    pub deletions: u64,
    /// Distinct author emails that touched the file.
    pub authors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeStats {
    pub extension: String,
    /// Distinct files with this extension.
    pub files: u64,
    pub modifications: u64,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeReport {
    pub most_modified_files: Vec<FileChange>,
    pub file_type_analysis: Vec<FileTypeStats>,
    pub total_unique_files: u64,
}

struct FileAccum<'a> {
    filename: &'a str,
    modifications: u64,
    additions: u64,
    deletions: u64,
    authors: HashSet<&'a str>,
}

struct ExtensionAccum<'a> {
    extension: String,
    files: HashSet<&'a str>,
    modifications: u64,
    additions: u64,
    deletions: u64,
}

/// Per-file and per-extension change counts. Paths are compared byte-for-byte.
pub fn analyze_file_changes(commits: &[CommitRecord]) -> FileChangeReport {
    let mut file_index: HashMap<&str, usize> = HashMap::new();
    let mut files: Vec<FileAccum> = Vec::new();
    let mut ext_index: HashMap<String, usize> = HashMap::new();
    let mut extensions: Vec<ExtensionAccum> = Vec::new();

    for commit in commits {
        let author = commit.author.email.as_str();

        for entry in commit.files() {
            let filename = entry.filename();
            let (added, deleted) = entry.line_counts();

            let slot = *file_index.entry(filename).or_insert_with(|| {
                files.push(FileAccum {
                    filename,
                    modifications: 0,
                    additions: 0,
                    deletions: 0,
                    authors: HashSet::new(),
                });
                files.len() - 1
            });
            let file = &mut files[slot];
            file.modifications += 1;
            file.additions = file.additions.saturating_add(added);
            file.deletions = file.deletions.saturating_add(deleted);
            file.authors.insert(author);

            let extension = file_extension(filename);
            let slot = match ext_index.get(&extension) {
                Some(&slot) => slot,
                None => {
                    ext_index.insert(extension.clone(), extensions.len());
                    extensions.push(ExtensionAccum {
                        extension,
                        files: HashSet::new(),
                        modifications: 0,
                        additions: 0,
                        deletions: 0,
                    });
                    extensions.len() - 1
                }
            };
            let ext = &mut extensions[slot];
            ext.files.insert(filename);
            ext.modifications += 1;
            ext.additions = ext.additions.saturating_add(added);
            ext.deletions = ext.deletions.saturating_add(deleted);
        }
    }

    let total_unique_files = files.len() as u64;

    let mut most_modified_files: Vec<FileChange> = files
        .into_iter()
        .map(|f| FileChange {
            filename: f.filename.to_string(),
            modifications: f.modifications,
            additions: f.additions,
            deletions: f.deletions,
            authors: f.authors.len() as u64,
        })
        .collect();
    most_modified_files.sort_by(|a, b| b.modifications.cmp(&a.modifications));
    most_modified_files.truncate(MOST_MODIFIED_LIMIT);

    let mut file_type_analysis: Vec<FileTypeStats> = extensions
        .into_iter()
        .map(|e| FileTypeStats {
            extension: e.extension,
            files: e.files.len() as u64,
            modifications: e.modifications,
            additions: e.additions,
            deletions: e.deletions,
        })
        .collect();
    file_type_analysis.sort_by(|a, b| b.modifications.cmp(&a.modifications));

    FileChangeReport {
        most_modified_files,
        file_type_analysis,
        total_unique_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{commit, commit_with_file_stats};

    #[test]
    fn counts_modifications_and_authors_per_file() {
        let commits = vec![
            commit("1", "a@e.com", "2025-01-01T00:00:00Z", 0, 0, &["src/lib.rs", "README"]),
            commit("2", "b@e.com", "2025-01-02T00:00:00Z", 0, 0, &["src/lib.rs"]),
            commit("3", "a@e.com", "2025-01-03T00:00:00Z", 0, 0, &["src/lib.rs"]),
        ];
        let report = analyze_file_changes(&commits);
        assert_eq!(report.total_unique_files, 2);

        let top = &report.most_modified_files[0];
        assert_eq!(top.filename, "src/lib.rs");
        assert_eq!(top.modifications, 3);
        assert_eq!(top.authors, 2);
        // bare paths carry no line counts
        assert_eq!((top.additions, top.deletions), (0, 0));

        let exts: Vec<&str> = report.file_type_analysis.iter().map(|e| e.extension.as_str()).collect();
        assert_eq!(exts, ["rs", "no-extension"]);
    }

    #[test]
    fn detailed_entries_feed_line_totals() {
        let commits = vec![
            commit_with_file_stats("1", "a@e.com", "2025-01-01T00:00:00Z", &[("a.rs", 10, 2), ("b.RS", 4, 0)]),
            commit_with_file_stats("2", "a@e.com", "2025-01-02T00:00:00Z", &[("a.rs", 1, 1)]),
        ];
        let report = analyze_file_changes(&commits);
        let a = report.most_modified_files.iter().find(|f| f.filename == "a.rs").unwrap();
        assert_eq!((a.modifications, a.additions, a.deletions), (2, 11, 3));

        assert_eq!(report.file_type_analysis.len(), 1);
        let rs = &report.file_type_analysis[0];
        assert_eq!((rs.files, rs.modifications, rs.additions, rs.deletions), (2, 3, 15, 3));
    }

    #[test]
    fn filenames_are_not_case_folded() {
        let commits = vec![
            commit("1", "a@e.com", "2025-01-01T00:00:00Z", 0, 0, &["a.JS"]),
            commit("2", "a@e.com", "2025-01-02T00:00:00Z", 0, 0, &["a.js"]),
        ];
        let report = analyze_file_changes(&commits);
        assert_eq!(report.total_unique_files, 2);
        assert_eq!(report.file_type_analysis.len(), 1);
        assert_eq!(report.file_type_analysis[0].extension, "js");
        assert_eq!(report.file_type_analysis[0].files, 2);
    }

    #[test]
    fn most_modified_is_capped_and_ordered() {
        let names: Vec<String> = (0..30).map(|i| format!("f{i}.txt")).collect();
        let mut commits = Vec::new();
        for (i, name) in names.iter().enumerate() {
            for _ in 0..(i % 4 + 1) {
                commits.push(commit("x", "a@e.com", "2025-01-01T00:00:00Z", 0, 0, &[name.as_str()]));
            }
        }
        let report = analyze_file_changes(&commits);
        assert_eq!(report.total_unique_files, 30);
        assert_eq!(report.most_modified_files.len(), MOST_MODIFIED_LIMIT);
        assert!(report
            .most_modified_files
            .windows(2)
            .all(|w| w[0].modifications >= w[1].modifications));
        // ties resolve by first appearance
        assert_eq!(report.most_modified_files[0].filename, "f3.txt");
        assert_eq!(report.most_modified_files[1].filename, "f7.txt");
    }
}
