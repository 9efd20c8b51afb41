use crate::cli::ExportFormat;
use crate::collect::collect;
use crate::commands::windowed;
use crate::config::Config;
use crate::metrics::{analyze, RepositoryReport};
use crate::model::{CommitRecord, ExportRow, Output};
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use console::style;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_HEADERS: [&str; 7] = [
    "SHA",
    "Message",
    "Author",
    "Email",
    "Date",
    "Additions",
    "Deletions",
];

pub fn exec(config: &Config, format: ExportFormat, output: Option<&Path>) -> anyhow::Result<()> {
    let collected = collect(config)?;
    let now = Utc::now();

    let target = output.map(|p| resolve_target(p, format, now));
    let mut writer: Box<dyn Write> = match &target {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let written = match format {
        ExportFormat::Json => {
            let report = analyze(
                &collected.commits,
                collected.repository.clone(),
                &collected.range,
                now,
            );
            write_json(&mut writer, &Output::bare(&collected.range, &report))?;
            report.commits.len()
        }
        ExportFormat::Csv => {
            let commits = windowed(&collected);
            write_csv(&mut writer, &commits)?;
            commits.len()
        }
        ExportFormat::Ndjson => {
            let commits = windowed(&collected);
            write_ndjson(&mut writer, &commits)?;
            commits.len()
        }
    };
    writer.flush()?;

    if let Some(path) = target {
        eprintln!(
            "Exported {} commits to {}",
            style(written).cyan(),
            style(path.display()).bold()
        );
    }
    Ok(())
}

/// A directory target gets a dated default file name inside it.
fn resolve_target(path: &Path, format: ExportFormat, now: DateTime<Utc>) -> PathBuf {
    if path.is_dir() {
        path.join(default_file_name(format, now))
    } else {
        path.to_path_buf()
    }
}

pub fn default_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    let ext = match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
        ExportFormat::Ndjson => "ndjson",
    };
    format!("git-analysis-{}.{ext}", now.format("%Y-%m-%d"))
}

pub fn write_json<W: Write>(
    writer: &mut W,
    output: &Output<&RepositoryReport>,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, output)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_ndjson<W: Write>(writer: &mut W, commits: &[CommitRecord]) -> anyhow::Result<()> {
    for commit in commits {
        serde_json::to_writer(&mut *writer, &commit.export_row())?;
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_csv<W: Write>(writer: &mut W, commits: &[CommitRecord]) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADERS.join(","))?;
    for commit in commits {
        writeln!(writer, "{}", csv_row(&commit.export_row()))?;
    }
    Ok(())
}

fn csv_row(row: &ExportRow) -> String {
    let date = row
        .timestamp
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    [
        csv_field(&row.id),
        quote(&row.message),
        csv_field(&row.author_name),
        csv_field(&row.author_email),
        date,
        row.additions.to_string(),
        row.deletions.to_string(),
    ]
    .join(",")
}

// messages are always quoted; other fields only when they need it
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{at, commit, commit_without_stats, named};
    use pretty_assertions::assert_eq;

    fn render_csv(commits: &[CommitRecord]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, commits).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_commit() {
        let mut c = commit("abc123", "jane@example.com", "2025-01-02T15:30:00Z", 5, 1, &["a.rs"]);
        c.message = "Fix \"quoted\" bug, again\n\nbody".into();
        let c = named(c, "Doe, Jane");
        let bare = commit_without_stats("def456", "x@example.com", "2025-01-03T00:00:00Z");

        let out = render_csv(&[c, bare]);
        let expected = "SHA,Message,Author,Email,Date,Additions,Deletions\n\
            abc123,\"Fix \"\"quoted\"\" bug, again\n\nbody\",\"Doe, Jane\",jane@example.com,2025-01-02T15:30:00Z,5,1\n\
            def456,\"commit def456\",x,x@example.com,2025-01-03T00:00:00Z,0,0\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn undated_commit_leaves_date_empty() {
        let mut c = commit("a", "a@e.com", "2025-01-01T00:00:00Z", 0, 0, &[]);
        c.timestamp = None;
        let out = render_csv(&[c]);
        assert!(out.lines().nth(1).unwrap().contains(",a@e.com,,0,0"));
    }

    #[test]
    fn ndjson_writes_flat_rows() {
        let commits = vec![
            commit("a", "a@e.com", "2025-01-01T00:00:00Z", 2, 1, &["x"]),
            commit("b", "b@e.com", "2025-01-02T00:00:00Z", 0, 3, &[]),
        ];
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &commits).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<ExportRow> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].deletions, 3);
        assert_eq!(rows[0].author_email, "a@e.com");
    }

    #[test]
    fn default_file_name_is_dated() {
        let now = at("2025-06-30T12:00:00Z");
        assert_eq!(default_file_name(ExportFormat::Csv, now), "git-analysis-2025-06-30.csv");
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_target(dir.path(), ExportFormat::Json, now),
            dir.path().join("git-analysis-2025-06-30.json")
        );
    }
}
