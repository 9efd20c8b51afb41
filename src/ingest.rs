//! Commit lists supplied as JSON, either from a file or from stdin (`-`).

use crate::error::{Result, ScopeError};
use crate::model::CommitRecord;
use std::io::Read;
use std::path::Path;

/// Load a JSON array of commits from `path`, reading stdin when `path` is `-`.
pub fn load_commits(path: &Path) -> Result<Vec<CommitRecord>> {
    let (source_name, text) = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        ("<stdin>".to_string(), buf)
    } else {
        let text = std::fs::read_to_string(path).map_err(|e| ScopeError::Input {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })?;
        (path.display().to_string(), text)
    };

    parse_commits(&text, &source_name)
}

/// Parse a JSON commit list. A top-level object with a `commits` array is
/// accepted too, so saved hosting-API responses load without editing.
pub fn parse_commits(text: &str, source_name: &str) -> Result<Vec<CommitRecord>> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| ScopeError::Input {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })?;

    let list = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => match map.remove("commits") {
            Some(list @ serde_json::Value::Array(_)) => list,
            _ => {
                return Err(ScopeError::Input {
                    source_name: source_name.to_string(),
                    message: "expected an array of commits or an object with a `commits` array"
                        .to_string(),
                })
            }
        },
        other => {
            return Err(ScopeError::Input {
                source_name: source_name.to_string(),
                message: format!("expected an array of commits, found {}", kind(&other)),
            })
        }
    };

    let commits: Vec<CommitRecord> =
        serde_json::from_value(list).map_err(|e| ScopeError::Input {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

    tracing::info!(source = source_name, commits = commits.len(), "loaded commit input");
    Ok(commits)
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_native_and_hosting_shapes() {
        let text = r#"[
            {"id": "a1", "message": "one", "author": {"name": "A", "email": "a@e.com"},
             "timestamp": "2025-01-01T10:00:00Z", "stats": {"additions": 1, "deletions": 0, "files": ["x.rs"]}},
            {"sha": "b2", "message": "two", "author": {"name": "B", "email": "b@e.com"},
             "date": "2025-01-02T10:00:00Z", "stats": null}
        ]"#;
        let commits = parse_commits(text, "test").unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[1].id, "b2");
        assert!(commits[1].timestamp.is_some());
        assert!(commits[1].stats.is_none());
    }

    #[test]
    fn sparse_records_still_load() {
        let text = r#"[
            {"id": "s1", "author": {"name": "A", "email": "a@e.com"}, "timestamp": 1735689600000.5,
             "stats": {"additions": null, "deletions": 2, "files": null}},
            {"id": "s2", "timestamp": false, "stats": {"files": [{"filename": null}]}}
        ]"#;
        let commits = parse_commits(text, "t").unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].additions(), 0);
        assert_eq!(commits[0].deletions(), 2);
        assert_eq!(commits[0].day().as_deref(), Some("2025-01-01"));
        assert!(commits[1].timestamp.is_none());
        assert_eq!(commits[1].files().count(), 0);
    }

    #[test]
    fn accepts_wrapped_commit_list() {
        let commits = parse_commits(r#"{"repository": {}, "commits": [{"id": "x"}]}"#, "t").unwrap();
        assert_eq!(commits.len(), 1);
    }

    #[test]
    fn rejects_non_list_input() {
        let err = parse_commits("42", "numbers.json").unwrap_err();
        assert!(err.to_string().contains("numbers.json"));
        assert!(parse_commits("{not json", "bad").is_err());
        assert!(parse_commits(r#"{"items": []}"#, "obj").is_err());
    }

    #[test]
    fn loads_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"[{"id": "c3"}]"#).unwrap();
        let commits = load_commits(file.path()).unwrap();
        assert_eq!(commits[0].id, "c3");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_commits(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ScopeError::Input { .. }));
    }
}
